// Domain models - Core types and data structures

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;
use crate::utils::time::TimeCodec;
use crate::utils::format_bytes;

/// Whole-second time value, displayed as `HH:MM:SS`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct CanonicalTime(u64);

impl CanonicalTime {
    pub const ZERO: CanonicalTime = CanonicalTime(0);

    pub fn from_seconds(seconds: u64) -> Self {
        Self(seconds)
    }

    pub fn as_seconds(&self) -> u64 {
        self.0
    }

    /// Parse any accepted time text into its canonical value
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        TimeCodec::parse(text).map(Self)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for CanonicalTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&TimeCodec::format(self.0))
    }
}

impl FromStr for CanonicalTime {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<CanonicalTime> for String {
    fn from(time: CanonicalTime) -> Self {
        time.to_string()
    }
}

impl TryFrom<String> for CanonicalTime {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

/// A resolved remote video
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoRef {
    pub url: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: Option<String>,
    pub duration: CanonicalTime,
}

impl VideoRef {
    pub const DEFAULT_TITLE: &'static str = "Title";
    pub const DEFAULT_CHANNEL: &'static str = "Channel";

    /// Video with every metadata field at its default
    pub fn placeholder(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: Self::DEFAULT_TITLE.to_string(),
            channel: Self::DEFAULT_CHANNEL.to_string(),
            thumbnail: None,
            duration: CanonicalTime::ZERO,
        }
    }

    /// The interval covering the whole video
    pub fn full_interval(&self) -> Interval {
        Interval {
            start: CanonicalTime::ZERO,
            end: self.duration,
        }
    }
}

/// One selectable encoded-stream variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatDescriptor {
    pub id: String,
    pub resolution: String,
    pub extension: String,
    /// Average bitrate in kbit/s
    pub bitrate: Option<f64>,
    pub video_codec: Option<String>,
    pub audio_codec: Option<String>,
    pub size_bytes: Option<u64>,
    pub note: Option<String>,
    /// One combined stream, or video then audio
    pub source_urls: Vec<String>,
}

impl FormatDescriptor {
    pub const DEFAULT_EXTENSION: &'static str = "mp4";

    /// Human readable summary, absent fields left out
    pub fn describe(&self) -> String {
        let parts = [
            Some(self.resolution.clone()),
            Some(self.extension.clone()).filter(|ext| !ext.is_empty()),
            self.bitrate
                .filter(|vbr| *vbr >= 1.0)
                .map(|vbr| format!("{}kb/s", vbr as u64)),
            self.video_codec.clone(),
            self.audio_codec.clone(),
            self.size_bytes.map(format_bytes),
            self.note.clone(),
        ];

        parts
            .into_iter()
            .flatten()
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Extension to use for output files
    pub fn output_extension(&self) -> &str {
        if self.extension.is_empty() {
            Self::DEFAULT_EXTENSION
        } else {
            &self.extension
        }
    }
}

/// A format together with its selection label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormatEntry {
    pub label: String,
    pub format: FormatDescriptor,
}

/// Numbered list of formats resolved for one video
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FormatList {
    entries: Vec<FormatEntry>,
}

impl FormatList {
    /// Label formats as `01. <description>`, `02. ...` in the given order
    pub fn from_descriptors(formats: Vec<FormatDescriptor>) -> Self {
        let entries = formats
            .into_iter()
            .enumerate()
            .map(|(i, format)| FormatEntry {
                label: format!("{:02}. {}", i + 1, format.describe()),
                format,
            })
            .collect();
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FormatEntry> {
        self.entries.iter()
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    pub fn first(&self) -> Option<&FormatEntry> {
        self.entries.first()
    }

    /// Look up by exact label
    pub fn get(&self, label: &str) -> Option<&FormatEntry> {
        self.entries.iter().find(|e| e.label == label)
    }

    /// Look up by the 1-based number shown in the label
    pub fn by_number(&self, number: usize) -> Option<&FormatEntry> {
        number.checked_sub(1).and_then(|i| self.entries.get(i))
    }

    /// Resolve a user supplied key: a number, an exact label, or a format id
    pub fn select(&self, key: &str) -> Result<&FormatEntry, DomainError> {
        let key = key.trim();
        if let Ok(number) = key.parse::<usize>() {
            if let Some(entry) = self.by_number(number) {
                return Ok(entry);
            }
        }

        self.get(key)
            .or_else(|| self.entries.iter().find(|e| e.format.id == key))
            .ok_or_else(|| DomainError::UnknownFormat(key.to_string()))
    }
}

/// Requested cut `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Interval {
    pub start: CanonicalTime,
    pub end: CanonicalTime,
}

impl Interval {
    pub fn new(start: CanonicalTime, end: CanonicalTime) -> Self {
        Self { start, end }
    }

    /// Build from user text, canonicalizing both ends
    pub fn parse(start: &str, end: &str) -> Result<Self, DomainError> {
        Ok(Self {
            start: CanonicalTime::parse(start)?,
            end: CanonicalTime::parse(end)?,
        })
    }

    /// Clip length in seconds (zero for inverted intervals)
    pub fn length_seconds(&self) -> u64 {
        self.end.as_seconds().saturating_sub(self.start.as_seconds())
    }

    /// `_00.00.10-00.01.00`, used in suggested file names
    pub fn file_suffix(&self) -> String {
        format!(
            "_{}-{}",
            TimeCodec::file_fragment(self.start.as_seconds()),
            TimeCodec::file_fragment(self.end.as_seconds())
        )
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.start, self.end)
    }
}

/// Which streams end up in the output file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentSelection {
    pub include_video: bool,
    pub include_audio: bool,
}

impl Default for ContentSelection {
    fn default() -> Self {
        Self {
            include_video: true,
            include_audio: true,
        }
    }
}

impl ContentSelection {
    pub fn new(include_video: bool, include_audio: bool) -> Self {
        Self {
            include_video,
            include_audio,
        }
    }

    pub fn is_empty(&self) -> bool {
        !self.include_video && !self.include_audio
    }

    pub fn keeps_everything(&self) -> bool {
        self.include_video && self.include_audio
    }
}

/// Semantics of the numbers a running job reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProgressUnit {
    Percent,
    Seconds,
}

impl fmt::Display for ProgressUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProgressUnit::Percent => f.write_str("percent"),
            ProgressUnit::Seconds => f.write_str("seconds"),
        }
    }
}

/// Normalized progress signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub value: f64,
    pub unit: ProgressUnit,
}

impl ProgressEvent {
    pub fn percent(value: f64) -> Self {
        Self {
            value,
            unit: ProgressUnit::Percent,
        }
    }

    pub fn seconds(value: f64) -> Self {
        Self {
            value,
            unit: ProgressUnit::Seconds,
        }
    }

    /// Completion in `[0, 1]` for a clip of the given length
    pub fn fraction(&self, clip_seconds: u64) -> f64 {
        let fraction = match self.unit {
            ProgressUnit::Percent => self.value / 100.0,
            ProgressUnit::Seconds if clip_seconds == 0 => 0.0,
            ProgressUnit::Seconds => self.value / clip_seconds as f64,
        };
        fraction.clamp(0.0, 1.0)
    }
}

/// Lifecycle of one download job
#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Idle,
    Requesting,
    Running,
    Cancelling,
    Finished { ok: bool, error: Option<String> },
}

impl SessionState {
    /// A process is (or is about to be) attached
    pub fn is_busy(&self) -> bool {
        matches!(
            self,
            SessionState::Requesting | SessionState::Running | SessionState::Cancelling
        )
    }
}

/// What a session reports to its caller
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    Progress(ProgressEvent),
    Finished { ok: bool, error: Option<String> },
}

/// Everything needed to start one job
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub output: PathBuf,
    pub interval: Interval,
    pub format: FormatDescriptor,
    pub content: ContentSelection,
}

/// Fast container remux or precise re-encode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DownloadPath {
    Remux,
    Reencode,
}

/// A fully built external tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Printable command line for logs and error messages
    pub fn command_line(&self) -> String {
        let mut line = quote_arg(&self.program.to_string_lossy());
        for arg in &self.args {
            line.push(' ');
            line.push_str(&quote_arg(arg));
        }
        line
    }
}

impl fmt::Display for ToolCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.command_line())
    }
}

fn quote_arg(arg: &str) -> String {
    if !arg.is_empty() && !arg.chars().any(|c| c.is_whitespace() || c == '"' || c == '\'') {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\\''"))
    }
}

/// Locations of the two external executables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolPaths {
    pub yt_dlp: PathBuf,
    pub ffmpeg: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            yt_dlp: PathBuf::from("yt-dlp"),
            ffmpeg: PathBuf::from("ffmpeg"),
        }
    }
}

/// Browsers yt-dlp can borrow cookies from
pub const SUPPORTED_BROWSERS: &[&str] = &[
    "brave", "chrome", "chromium", "edge", "firefox", "opera", "safari", "vivaldi",
];

/// Video encoders offered to the user, with a short description
pub const KNOWN_VIDEO_CODECS: &[(&str, &str)] = &[
    ("copy", "Copy from source"),
    ("h264", "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10"),
    ("h264_nvenc", "H.264 with NVIDIA hardware acceleration"),
    ("mpeg4", "MPEG-4 part 2"),
];

/// Audio encoders offered to the user, with a short description
pub const KNOWN_AUDIO_CODECS: &[(&str, &str)] = &[
    ("copy", "Copy from source"),
    ("aac", "AAC (Advanced Audio Coding)"),
    ("mp3", "libmp3lame MP3 (MPEG audio layer 3)"),
];

/// Default `-f` expression for the formats query
pub const DEFAULT_FORMAT_FILTER: &str =
    "all[vcodec!=none]+ba/all[vcodec!=none][acodec!=none]/b*";

/// User options that shape tool invocations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolOptions {
    /// Browser to take cookies from, if any
    pub browser: Option<String>,
    /// Sort formats towards H.264/MP3 for editing software
    pub prefer_avc: bool,
    /// `-c:v` value, omitted when unset
    pub video_codec: Option<String>,
    /// `-c:a` value, omitted when unset
    pub audio_codec: Option<String>,
    /// Keep the source video bitrate when re-encoding
    pub keep_vbr: bool,
    /// Ask ffmpeg to write a report file
    pub ffmpeg_report: bool,
    /// Stop ffmpeg on the first error
    pub strict_errors: bool,
    /// Container for the remux path
    pub container: String,
    /// Quality selection expression for the formats query
    pub format_filter: Option<String>,
}

impl Default for ToolOptions {
    fn default() -> Self {
        Self {
            browser: None,
            prefer_avc: false,
            video_codec: Some("copy".to_string()),
            audio_codec: Some("copy".to_string()),
            keep_vbr: false,
            ffmpeg_report: false,
            strict_errors: true,
            container: "mp4".to_string(),
            format_filter: Some(DEFAULT_FORMAT_FILTER.to_string()),
        }
    }
}

impl ToolOptions {
    /// Configured video encoder targets an NVIDIA GPU
    pub fn uses_gpu_encoder(&self) -> bool {
        self.video_codec
            .as_deref()
            .map(|codec| codec.ends_with("_nvenc"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests;
