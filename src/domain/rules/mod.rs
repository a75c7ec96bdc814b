// Domain rules - Interval policy and tool invocation planning

use crate::domain::errors::*;
use crate::domain::model::*;

/// A ready-to-launch download job
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadPlan {
    pub path: DownloadPath,
    pub command: ToolCommand,
    pub unit: ProgressUnit,
}

/// Business rules for requested cuts
pub struct IntervalPolicy;

impl IntervalPolicy {
    /// Check `0 <= start < end <= duration`
    pub fn validate(interval: &Interval, duration: CanonicalTime) -> Result<(), DomainError> {
        if interval.end <= interval.start {
            return Err(DomainError::InvalidInterval(format!(
                "The initial value ({}) must be smaller than the final value ({})",
                interval.start, interval.end
            )));
        }
        if interval.end > duration {
            return Err(DomainError::InvalidInterval(format!(
                "The final value ({}) must not exceed the duration ({})",
                interval.end, duration
            )));
        }
        Ok(())
    }

    /// The interval covers the whole video
    pub fn is_full_span(interval: &Interval, duration: CanonicalTime) -> bool {
        interval.start.is_zero() && interval.end == duration
    }
}

/// Turns a download request into the external tool invocation that serves it
pub struct DownloadPlanner<'a> {
    tools: &'a ToolPaths,
    options: &'a ToolOptions,
}

impl<'a> DownloadPlanner<'a> {
    pub fn new(tools: &'a ToolPaths, options: &'a ToolOptions) -> Self {
        Self { tools, options }
    }

    /// Validate the request and build its command
    pub fn plan(&self, video: &VideoRef, request: &DownloadRequest) -> Result<DownloadPlan, DomainError> {
        if request.content.is_empty() {
            return Err(DomainError::NoContentSelected);
        }

        let source_count = request.format.source_urls.len();
        if !(1..=2).contains(&source_count) {
            return Err(DomainError::UnsupportedSourceShape { count: source_count });
        }

        IntervalPolicy::validate(&request.interval, video.duration)?;

        let full_span = IntervalPolicy::is_full_span(&request.interval, video.duration);
        if full_span && request.content.keeps_everything() {
            Ok(DownloadPlan {
                path: DownloadPath::Remux,
                command: self.remux_command(video, request),
                unit: ProgressUnit::Percent,
            })
        } else {
            Ok(DownloadPlan {
                path: DownloadPath::Reencode,
                command: self.reencode_command(video, request),
                unit: ProgressUnit::Seconds,
            })
        }
    }

    /// Let the extraction tool fetch the whole format and remux it
    fn remux_command(&self, video: &VideoRef, request: &DownloadRequest) -> ToolCommand {
        let mut args = extractor_auth_args(self.options);
        args.extend(["-f".to_string(), request.format.id.clone()]);
        if video.thumbnail.is_some() {
            args.push("--embed-thumbnail".to_string());
        }
        args.extend([
            "--remux-video".to_string(),
            self.options.container.clone(),
            "--ffmpeg-location".to_string(),
            self.tools.ffmpeg.to_string_lossy().into_owned(),
            "--newline".to_string(),
            "--force-overwrites".to_string(),
            "-o".to_string(),
            request.output.to_string_lossy().into_owned(),
            video.url.clone(),
        ]);

        ToolCommand::new(self.tools.yt_dlp.clone(), args)
    }

    /// Trim straight from the stream URLs with the transcoder
    fn reencode_command(&self, video: &VideoRef, request: &DownloadRequest) -> ToolCommand {
        let content = request.content;
        let mut args = Vec::new();

        if content.include_video && self.options.uses_gpu_encoder() {
            args.extend(
                ["-vsync", "0", "-hwaccel", "cuda", "-hwaccel_output_format", "cuda"]
                    .map(String::from),
            );
        }

        // Seeking to zero or bounding at the very end breaks the cut at the edges
        let mut trim = Vec::new();
        if !request.interval.start.is_zero() {
            trim.extend(["-ss".to_string(), request.interval.start.to_string()]);
        }
        if request.interval.end != video.duration {
            trim.extend(["-to".to_string(), request.interval.end.to_string()]);
        }
        for url in &request.format.source_urls {
            args.extend(trim.iter().cloned());
            args.extend(["-i".to_string(), url.clone()]);
        }

        if content.include_video {
            if let Some(codec) = non_empty(&self.options.video_codec) {
                args.extend(["-c:v".to_string(), codec.to_string()]);
            }
            if self.options.keep_vbr {
                if let Some(vbr) = request.format.bitrate.filter(|vbr| *vbr > 0.0) {
                    args.extend(["-b:v".to_string(), format!("{}K", vbr)]);
                }
            }
        } else {
            args.push("-vn".to_string());
        }

        if content.include_audio {
            if let Some(codec) = non_empty(&self.options.audio_codec) {
                args.extend(["-c:a".to_string(), codec.to_string()]);
            }
        } else {
            args.push("-an".to_string());
        }

        if self.options.ffmpeg_report {
            args.push("-report".to_string());
        }
        if self.options.strict_errors {
            args.push("-xerror".to_string());
        }
        args.extend(["-y".to_string(), request.output.to_string_lossy().into_owned()]);

        ToolCommand::new(self.tools.ffmpeg.clone(), args)
    }
}

/// `--cookies-from-browser` when a browser is configured
pub fn extractor_auth_args(options: &ToolOptions) -> Vec<String> {
    match non_empty(&options.browser) {
        Some(browser) => vec!["--cookies-from-browser".to_string(), browser.to_string()],
        None => Vec::new(),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
