//! Report rendering and output file handling

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::model::{CanonicalTime, ContentSelection, Interval, ToolOptions, VideoRef};

pub mod writer;

/// How reports are printed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Text,
    Json,
    Yaml,
}

/// Overwrite policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverwritePolicy {
    /// Refuse to replace an existing file
    Never,
    /// Always overwrite
    Always,
}

/// Resolved video details as shown to the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoReport {
    pub url: String,
    pub title: String,
    pub channel: String,
    pub thumbnail: Option<String>,
    pub duration: CanonicalTime,
    /// Start position carried by the link itself
    pub start_hint: Option<CanonicalTime>,
}

impl VideoReport {
    pub fn new(video: &VideoRef, start_hint: Option<CanonicalTime>) -> Self {
        Self {
            url: video.url.clone(),
            title: video.title.clone(),
            channel: video.channel.clone(),
            thumbnail: video.thumbnail.clone(),
            duration: video.duration,
            start_hint,
        }
    }
}

/// Snapshot of a job written for diagnostics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateDump {
    pub timestamp: DateTime<Utc>,
    pub link: String,
    pub interval: Option<Interval>,
    pub save_path: Option<PathBuf>,
    pub format: Option<String>,
    pub content: ContentSelection,
    pub options: ToolOptions,
}

impl StateDump {
    pub fn new(link: impl Into<String>, options: &ToolOptions) -> Self {
        Self {
            timestamp: Utc::now(),
            link: link.into(),
            interval: None,
            save_path: None,
            format: None,
            content: ContentSelection::default(),
            options: options.clone(),
        }
    }
}
