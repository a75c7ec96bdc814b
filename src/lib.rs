//! YtCut CLI Library
//!
//! Downloads a time range of an online video. Metadata and format lists come
//! from yt-dlp; the download itself is either a yt-dlp remux of the whole
//! video or an ffmpeg cut straight from the remote stream URLs.

pub mod adapters;
pub mod app;
pub mod cli;
pub mod config_initialization;
pub mod domain;
pub mod engine;
pub mod error;
pub mod output;
pub mod ports;
pub mod probe;
pub mod utils;

// Re-export commonly used types
pub use domain::errors::DomainError;
pub use domain::model::{
    CanonicalTime, ContentSelection, DownloadPath, DownloadRequest, FormatDescriptor, FormatList,
    Interval, ProgressEvent, ProgressUnit, SessionEvent, SessionState, ToolCommand, ToolOptions,
    ToolPaths, VideoRef,
};
pub use error::{YtCutError, YtCutResult};
