//! Command-line argument definitions

use std::path::PathBuf;

use clap::Args;

use crate::output::ReportFormat;

/// Arguments for the info command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Video link
    pub url: String,

    /// Report format
    #[arg(long, value_enum, default_value = "text")]
    pub output: ReportFormat,

    /// Borrow cookies from this browser
    #[arg(long)]
    pub browser: Option<String>,
}

/// Arguments for the formats command
#[derive(Args, Debug)]
pub struct FormatsArgs {
    /// Video link
    pub url: String,

    /// yt-dlp format selection expression
    #[arg(long)]
    pub filter: Option<String>,

    /// Prefer H.264 video and MP3 audio
    #[arg(long)]
    pub prefer_avc: bool,

    /// Borrow cookies from this browser
    #[arg(long)]
    pub browser: Option<String>,
}

/// Arguments for the cut command
#[derive(Args, Debug)]
pub struct CutArgs {
    /// Video link
    pub url: String,

    /// Start time (seconds, MM:SS or HH:MM:SS)
    #[arg(long = "from", default_value = "0")]
    pub start: String,

    /// End time (seconds, MM:SS or HH:MM:SS; default: end of the video)
    #[arg(long = "to")]
    pub end: Option<String>,

    /// Format number or label as printed by `formats` (default: the first one)
    #[arg(short, long)]
    pub format: Option<String>,

    /// Output file path (default: derived from the title and the interval)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Leave the video stream out
    #[arg(long)]
    pub no_video: bool,

    /// Leave the audio stream out
    #[arg(long)]
    pub no_audio: bool,

    /// Borrow cookies from this browser
    #[arg(long)]
    pub browser: Option<String>,

    /// Video encoder for cuts (copy, h264, h264_nvenc, mpeg4, ...)
    #[arg(long)]
    pub video_codec: Option<String>,

    /// Audio encoder for cuts (copy, aac, mp3, ...)
    #[arg(long)]
    pub audio_codec: Option<String>,

    /// Keep the source video bitrate when re-encoding
    #[arg(long)]
    pub keep_vbr: bool,

    /// Prefer H.264 video and MP3 audio
    #[arg(long)]
    pub prefer_avc: bool,

    /// Ask ffmpeg to write a report file
    #[arg(long)]
    pub report: bool,

    /// Write the job state as JSON to this file
    #[arg(long)]
    pub dump_state: Option<PathBuf>,

    /// Overwrite an existing output file
    #[arg(long)]
    pub force: bool,

    /// Print progress as JSON lines
    #[arg(long)]
    pub json: bool,
}
