//! Output path utilities

use std::path::{Path, PathBuf};

use crate::domain::model::{FormatDescriptor, Interval};

/// Longest title kept in a suggested file name, in characters
const MAX_TITLE_CHARS: usize = 128;

/// Characters refused by at least one common filesystem
const INVALID_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Path utilities for output files
pub struct PathUtils;

impl PathUtils {
    /// Make a video title usable as a file name stem
    pub fn sanitize_title(title: &str) -> String {
        let cleaned: String = title
            .chars()
            .filter(|c| !c.is_control() && !INVALID_CHARS.contains(c))
            .take(MAX_TITLE_CHARS)
            .collect();

        // Windows refuses trailing dots and spaces
        let cleaned = cleaned.trim().trim_end_matches('.').trim_end();
        if cleaned.is_empty() {
            "video".to_string()
        } else {
            cleaned.to_string()
        }
    }

    /// `<title>_<resolution>_<start>-<end>.<ext>` inside `dir`
    pub fn suggest_file_name(
        dir: &Path,
        title: &str,
        format: &FormatDescriptor,
        interval: &Interval,
    ) -> PathBuf {
        let resolution = Self::sanitize_title(&format.resolution);
        let name = format!(
            "{}_{}{}.{}",
            Self::sanitize_title(title),
            resolution,
            interval.file_suffix(),
            format.output_extension()
        );
        dir.join(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::CanonicalTime;

    #[test]
    fn test_sanitize_title() {
        assert_eq!(PathUtils::sanitize_title("A/B: \"C\"?"), "AB C");
        assert_eq!(PathUtils::sanitize_title("  trailing... "), "trailing");
        assert_eq!(PathUtils::sanitize_title("???"), "video");
        assert_eq!(PathUtils::sanitize_title(&"x".repeat(300)).chars().count(), 128);
    }

    #[test]
    fn test_suggest_file_name() {
        let format = FormatDescriptor {
            id: "18".to_string(),
            resolution: "640x360".to_string(),
            extension: String::new(),
            bitrate: None,
            video_codec: None,
            audio_codec: None,
            size_bytes: None,
            note: None,
            source_urls: vec!["u".to_string()],
        };
        let interval = Interval::new(CanonicalTime::from_seconds(10), CanonicalTime::from_seconds(90));

        let path = PathUtils::suggest_file_name(Path::new("out"), "My: Video", &format, &interval);
        assert_eq!(path, Path::new("out").join("My Video_640x360_00.00.10-00.01.30.mp4"));
    }
}
