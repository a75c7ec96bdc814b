//! Output file checks and report writing

use std::fmt::Write as _;
use std::path::Path;

use tracing::{info, warn};

use crate::domain::model::FormatList;
use crate::error::{YtCutError, YtCutResult};
use crate::output::{OverwritePolicy, ReportFormat, StateDump, VideoReport};

/// Output file writer
pub struct OutputWriter {
    overwrite: OverwritePolicy,
}

impl OutputWriter {
    pub fn new(overwrite: OverwritePolicy) -> Self {
        Self { overwrite }
    }

    /// Make sure the download may write to `path`
    pub fn prepare_output(&self, path: &Path) -> YtCutResult<()> {
        self.check_overwrite_policy(path)?;
        self.ensure_output_directory(path)
    }

    fn check_overwrite_policy(&self, path: &Path) -> YtCutResult<()> {
        if path.exists() {
            match self.overwrite {
                OverwritePolicy::Never => {
                    return Err(YtCutError::Io(std::io::Error::new(
                        std::io::ErrorKind::AlreadyExists,
                        format!(
                            "Output file {} exists, pass --force to overwrite it",
                            path.display()
                        ),
                    )));
                }
                OverwritePolicy::Always => {
                    warn!("File {} exists, will overwrite", path.display());
                }
            }
        }
        Ok(())
    }

    fn ensure_output_directory(&self, path: &Path) -> YtCutResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                info!("Creating output directory: {}", parent.display());
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    /// Write a pretty JSON snapshot of the job
    pub fn write_state_dump(&self, path: &Path, dump: &StateDump) -> YtCutResult<()> {
        self.ensure_output_directory(path)?;
        let json = serde_json::to_string_pretty(dump)?;
        std::fs::write(path, json)?;
        info!("State written to {}", path.display());
        Ok(())
    }

    /// Render video details in the requested format
    pub fn render_video(report: &VideoReport, format: ReportFormat) -> YtCutResult<String> {
        match format {
            ReportFormat::Json => Ok(serde_json::to_string_pretty(report)?),
            ReportFormat::Yaml => Ok(serde_yaml::to_string(report)?),
            ReportFormat::Text => {
                let mut text = String::new();
                let _ = writeln!(text, "Title:    {}", report.title);
                let _ = writeln!(text, "Channel:  {}", report.channel);
                let _ = writeln!(text, "Duration: {}", report.duration);
                if let Some(thumbnail) = &report.thumbnail {
                    let _ = writeln!(text, "Thumbnail: {}", thumbnail);
                }
                if let Some(start) = report.start_hint {
                    let _ = writeln!(text, "Link starts at: {}", start);
                }
                Ok(text)
            }
        }
    }

    /// One label per line
    pub fn render_formats(formats: &FormatList) -> String {
        formats
            .labels()
            .into_iter()
            .fold(String::new(), |mut text, label| {
                text.push_str(label);
                text.push('\n');
                text
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::*;

    fn report() -> VideoReport {
        VideoReport {
            url: "https://youtu.be/abc".to_string(),
            title: "A title".to_string(),
            channel: "A channel".to_string(),
            thumbnail: None,
            duration: CanonicalTime::from_seconds(125),
            start_hint: Some(CanonicalTime::from_seconds(30)),
        }
    }

    #[test]
    fn test_render_text() {
        let text = OutputWriter::render_video(&report(), ReportFormat::Text).unwrap();
        assert!(text.contains("Duration: 00:02:05"));
        assert!(text.contains("Link starts at: 00:00:30"));
        assert!(!text.contains("Thumbnail"));
    }

    #[test]
    fn test_render_json_and_yaml() {
        let json = OutputWriter::render_video(&report(), ReportFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["duration"], "00:02:05");

        let yaml = OutputWriter::render_video(&report(), ReportFormat::Yaml).unwrap();
        assert!(yaml.contains("channel: A channel"));
    }

    #[test]
    fn test_overwrite_guard() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.mp4");
        std::fs::write(&path, b"x").unwrap();

        assert!(OutputWriter::new(OverwritePolicy::Never).prepare_output(&path).is_err());
        assert!(OutputWriter::new(OverwritePolicy::Always).prepare_output(&path).is_ok());
    }

    #[test]
    fn test_prepare_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("clip.mp4");

        OutputWriter::new(OverwritePolicy::Never).prepare_output(&path).unwrap();
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_state_dump() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut dump = StateDump::new("https://youtu.be/abc", &ToolOptions::default());
        dump.interval = Some(Interval::new(
            CanonicalTime::from_seconds(10),
            CanonicalTime::from_seconds(20),
        ));
        OutputWriter::new(OverwritePolicy::Always)
            .write_state_dump(&path, &dump)
            .unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["link"], "https://youtu.be/abc");
        assert_eq!(value["interval"]["start"], "00:00:10");
        assert_eq!(value["options"]["video_codec"], "copy");
        assert!(value["timestamp"].is_string());
    }
}
