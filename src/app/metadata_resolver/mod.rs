// Metadata resolver - Queries the extraction tool for video details and formats

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::adapters::toml_config::TimeoutConfig;
use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::extractor_auth_args;
use crate::engine::progress::ProgressParser;
use crate::ports::*;
use crate::probe::records::{FormatRecord, InfoRecord, FORMAT_TEMPLATE, INFO_TEMPLATE};

/// Resolves a link to its metadata and selectable formats
pub struct MetadataResolver {
    runner: Arc<dyn ToolRunner>,
    tools: ToolPaths,
    options: ToolOptions,
    timeouts: TimeoutConfig,
}

impl MetadataResolver {
    pub fn new(
        runner: Arc<dyn ToolRunner>,
        tools: ToolPaths,
        options: ToolOptions,
        timeouts: TimeoutConfig,
    ) -> Self {
        Self {
            runner,
            tools,
            options,
            timeouts,
        }
    }

    /// Title, channel, thumbnail and duration of the video
    pub async fn request_info(&self, url: &str) -> Result<VideoRef, DomainError> {
        let mut args = extractor_auth_args(&self.options);
        args.extend(["--print".to_string(), INFO_TEMPLATE.to_string(), url.to_string()]);
        let command = ToolCommand::new(self.tools.yt_dlp.clone(), args);

        debug!("Requesting info for {}", url);
        let stdout = self.query(&command, self.timeouts.info()).await?;
        let record_text = stdout
            .lines()
            .find(|line| !line.trim().is_empty())
            .ok_or_else(|| failed(&command, "No metadata returned"))?;

        let video = InfoRecord::parse(record_text)
            .map_err(|e| failed(&command, &e.to_string()))?
            .into_video(url);

        info!(
            "Resolved '{}' by {} ({})",
            video.title, video.channel, video.duration
        );
        Ok(video)
    }

    /// Formats matching `filter`, labelled in the order the tool listed them
    pub async fn request_formats(
        &self,
        url: &str,
        filter: Option<&str>,
        prefer_avc: bool,
    ) -> Result<FormatList, DomainError> {
        let mut args = extractor_auth_args(&self.options);
        if prefer_avc {
            args.extend(["-S".to_string(), "vcodec:h264,acodec:mp3,quality".to_string()]);
        }
        if let Some(filter) = filter.map(str::trim).filter(|f| !f.is_empty()) {
            args.extend(["-f".to_string(), filter.to_string()]);
        }
        args.extend(["--print".to_string(), FORMAT_TEMPLATE.to_string(), url.to_string()]);
        let command = ToolCommand::new(self.tools.yt_dlp.clone(), args);

        debug!("Requesting formats for {}", url);
        let stdout = self.query(&command, self.timeouts.formats()).await?;
        let records = FormatRecord::parse_list(&stdout).map_err(|e| failed(&command, &e.to_string()))?;
        if records.is_empty() {
            return Err(failed(&command, "Process finished with errors"));
        }

        let formats = FormatList::from_descriptors(
            records.into_iter().map(FormatRecord::into_descriptor).collect(),
        );
        info!("Resolved {} formats", formats.len());
        Ok(formats)
    }

    /// Formats using the configured filter and sort preference
    pub async fn request_default_formats(&self, url: &str) -> Result<FormatList, DomainError> {
        let filter = self.options.format_filter.clone();
        self.request_formats(url, filter.as_deref(), self.options.prefer_avc)
            .await
    }

    async fn query(&self, command: &ToolCommand, timeout: Duration) -> Result<String, DomainError> {
        let output = self.runner.run_bounded(command, timeout).await?;
        Self::check_result(command, output)
    }

    /// Stdout of a successful run; tool errors become `ProcessFailed`
    fn check_result(command: &ToolCommand, output: CapturedOutput) -> Result<String, DomainError> {
        let stderr = output.stderr.trim();

        if ProgressParser::has_error(stderr) {
            return Err(failed(command, stderr));
        }
        if !output.exit.normal_exit {
            return Err(failed(
                command,
                &format!("Exit with error code {:?}. {}", output.exit.code, stderr),
            ));
        }
        if output.exit.code != Some(0) {
            let message = if stderr.is_empty() {
                "Process finished with errors"
            } else {
                stderr
            };
            return Err(failed(command, message));
        }

        if !stderr.is_empty() {
            warn!("{}", stderr);
        }
        debug!("{}", output.stdout);
        Ok(output.stdout)
    }
}

fn failed(command: &ToolCommand, message: &str) -> DomainError {
    DomainError::ProcessFailed {
        command: command.command_line(),
        message: message.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every bounded query with the same canned output
    struct CannedRunner {
        result: Result<CapturedOutput, DomainError>,
        commands: Mutex<Vec<ToolCommand>>,
    }

    impl CannedRunner {
        fn new(result: Result<CapturedOutput, DomainError>) -> Arc<Self> {
            Arc::new(Self {
                result,
                commands: Mutex::new(Vec::new()),
            })
        }

        fn stdout(stdout: &str) -> Arc<Self> {
            Self::new(Ok(CapturedOutput {
                stdout: stdout.to_string(),
                stderr: String::new(),
                exit: ExitReport {
                    code: Some(0),
                    normal_exit: true,
                },
            }))
        }

        fn last_args(&self) -> Vec<String> {
            self.commands.lock().unwrap().last().unwrap().args.clone()
        }
    }

    #[async_trait]
    impl ToolRunner for CannedRunner {
        async fn launch(
            &self,
            command: &ToolCommand,
            _capture: CaptureMode,
        ) -> Result<Box<dyn ProcessHandle>, DomainError> {
            Err(DomainError::LaunchFailed {
                command: command.command_line(),
                message: "not supported".to_string(),
            })
        }

        async fn run_bounded(
            &self,
            command: &ToolCommand,
            _timeout: Duration,
        ) -> Result<CapturedOutput, DomainError> {
            self.commands.lock().unwrap().push(command.clone());
            self.result.clone()
        }
    }

    fn resolver(runner: Arc<CannedRunner>, options: ToolOptions) -> MetadataResolver {
        MetadataResolver::new(runner, ToolPaths::default(), options, TimeoutConfig::default())
    }

    #[tokio::test]
    async fn test_request_info() {
        let runner = CannedRunner::stdout(
            "{\"channel\":\"NA\",\"uploader\":\"Real\",\"title\":\"T\",\"thumbnail\":\"https://t\",\"duration\":125}\n",
        );
        let options = ToolOptions {
            browser: Some("firefox".to_string()),
            ..ToolOptions::default()
        };

        let video = resolver(runner.clone(), options)
            .request_info("https://youtu.be/abc")
            .await
            .unwrap();

        assert_eq!(video.channel, "Real");
        assert_eq!(video.duration.to_string(), "00:02:05");
        assert_eq!(video.thumbnail.as_deref(), Some("https://t"));

        let args = runner.last_args();
        assert_eq!(&args[..3], &["--cookies-from-browser", "firefox", "--print"]);
        assert_eq!(args.last().unwrap(), "https://youtu.be/abc");
    }

    #[tokio::test]
    async fn test_request_formats() {
        let runner = CannedRunner::stdout(concat!(
            r#"{ "format_id": "22", "ext": "mp4", "resolution": "1280x720", "vbr": null, "tbr": 1500, "vcodec": "avc1", "acodec": "mp4a", "size": null, "format_note": "720p", "urls": "https://c" }, "#,
            "\n",
            r#"{ "format_id": "18", "ext": "mp4", "resolution": "640x360", "vbr": null, "vcodec": "avc1", "acodec": "mp4a", "size": null, "format_note": "360p", "urls": "https://d" }, "#,
            "\n",
        ));

        let formats = resolver(runner.clone(), ToolOptions::default())
            .request_formats("https://youtu.be/abc", Some("b*"), true)
            .await
            .unwrap();

        assert_eq!(formats.len(), 2);
        assert_eq!(formats.labels()[0], "01. 1280x720, mp4, avc1, mp4a, 720p");
        assert_eq!(formats.labels()[1], "02. 640x360, mp4, avc1, mp4a, 360p");

        let args = runner.last_args();
        assert_eq!(
            &args[..4],
            &["-S", "vcodec:h264,acodec:mp3,quality", "-f", "b*"]
        );
    }

    #[tokio::test]
    async fn test_empty_formats_is_failure() {
        let runner = CannedRunner::stdout("\n");
        let err = resolver(runner, ToolOptions::default())
            .request_formats("https://youtu.be/abc", None, false)
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProcessFailed { .. }));
    }

    #[tokio::test]
    async fn test_error_on_stderr_is_failure() {
        let runner = CannedRunner::new(Ok(CapturedOutput {
            stdout: String::new(),
            stderr: "ERROR: [youtube] abc: Video unavailable".to_string(),
            exit: ExitReport {
                code: Some(1),
                normal_exit: true,
            },
        }));

        let err = resolver(runner, ToolOptions::default())
            .request_info("https://youtu.be/abc")
            .await
            .unwrap_err();

        let text = err.to_string();
        assert!(text.contains("Video unavailable"));
        assert!(text.contains("yt-dlp"));
    }

    #[tokio::test]
    async fn test_abnormal_exit_is_failure() {
        let runner = CannedRunner::new(Ok(CapturedOutput {
            stdout: "{}".to_string(),
            stderr: String::new(),
            exit: ExitReport {
                code: None,
                normal_exit: false,
            },
        }));

        let err = resolver(runner, ToolOptions::default())
            .request_info("https://youtu.be/abc")
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Exit with error code"));
    }

    #[tokio::test]
    async fn test_timeout_is_passed_through() {
        let runner = CannedRunner::new(Err(DomainError::ProcessTimeout {
            command: "yt-dlp".to_string(),
        }));

        let err = resolver(runner, ToolOptions::default())
            .request_info("https://youtu.be/abc")
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::ProcessTimeout { .. }));
    }

    #[tokio::test]
    async fn test_warning_on_success_is_ignored() {
        let runner = CannedRunner::new(Ok(CapturedOutput {
            stdout: "{\"title\":\"T\",\"duration\":5}".to_string(),
            stderr: "WARNING: something minor".to_string(),
            exit: ExitReport {
                code: Some(0),
                normal_exit: true,
            },
        }));

        let video = resolver(runner, ToolOptions::default())
            .request_info("https://youtu.be/abc")
            .await
            .unwrap();
        assert_eq!(video.title, "T");
        assert_eq!(video.channel, VideoRef::DEFAULT_CHANNEL);
    }
}
