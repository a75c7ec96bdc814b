//! Progress parsing and observers for CLI integration

use std::io::Write;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::model::{ProgressEvent, ProgressUnit};
use crate::ports::SessionObserver;
use crate::utils::time::TimeCodec;

/// `[download]  42.0% of ...` as printed by the extraction tool
static PERCENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]+\]\s+(\d+(?:\.\d+)?)%").expect("valid percent regex"));

/// `time=00:01:30.50` as printed by the transcoder
static TIME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"time=\s*(\d+:\d{2}:\d{2}(?:\.\d+)?)").expect("valid time regex"));

static ERROR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)error").expect("valid error regex"));

/// What a chunk of tool output turned out to be
#[derive(Debug, Clone, PartialEq)]
pub enum ChunkReading {
    Progress(ProgressEvent),
    Error(String),
    Ignored,
}

/// Recognizes progress and error reports in raw tool output
pub struct ProgressParser;

impl ProgressParser {
    /// Classify one chunk. A chunk may hold several updates; the latest wins.
    pub fn read_chunk(chunk: &str) -> ChunkReading {
        if let Some(value) = Self::last_capture(&PERCENT_RE, chunk).and_then(|m| m.parse::<f64>().ok()) {
            return ChunkReading::Progress(ProgressEvent::percent(value));
        }

        if let Some(value) =
            Self::last_capture(&TIME_RE, chunk).and_then(|m| TimeCodec::parse_transcoder_time(m).ok())
        {
            return ChunkReading::Progress(ProgressEvent::seconds(value));
        }

        if Self::has_error(chunk) {
            return ChunkReading::Error(chunk.to_string());
        }

        ChunkReading::Ignored
    }

    /// Case-insensitive `error` anywhere in the text
    pub fn has_error(text: &str) -> bool {
        ERROR_RE.is_match(text)
    }

    fn last_capture<'t>(re: &Regex, text: &'t str) -> Option<&'t str> {
        re.captures_iter(text)
            .last()
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }
}

/// Console progress observer for CLI usage
pub struct ConsoleProgressObserver {
    clip_seconds: u64,
    bar_length: usize,
}

impl ConsoleProgressObserver {
    pub fn new(clip_seconds: u64) -> Self {
        Self {
            clip_seconds,
            bar_length: 30,
        }
    }

    fn render(&self, event: &ProgressEvent) -> String {
        let fraction = event.fraction(self.clip_seconds);
        let filled = (fraction * self.bar_length as f64).round() as usize;
        let bar = "#".repeat(filled) + &"-".repeat(self.bar_length - filled);
        format!(
            "[{}] {:>5.1}% ({})",
            bar,
            fraction * 100.0,
            event.unit.describe(event.value)
        )
    }
}

impl SessionObserver for ConsoleProgressObserver {
    fn on_progress(&mut self, event: &ProgressEvent) {
        let mut stdout = std::io::stdout();
        let _ = write!(stdout, "\r{}", self.render(event));
        let _ = stdout.flush();
    }

    fn on_finished(&mut self, ok: bool, error: Option<&str>) {
        println!();
        if ok {
            println!("Download completed");
        } else {
            match error {
                Some(error) => println!("Download failed: {}", error.trim()),
                None => println!("Download failed or was cancelled"),
            }
        }
    }
}

/// JSON progress observer for structured output
pub struct JsonProgressObserver {
    clip_seconds: u64,
}

impl JsonProgressObserver {
    pub fn new(clip_seconds: u64) -> Self {
        Self { clip_seconds }
    }

    fn progress_event(&self, event: &ProgressEvent) -> serde_json::Value {
        serde_json::json!({
            "event": "progress",
            "value": event.value,
            "unit": event.unit,
            "fraction": event.fraction(self.clip_seconds),
            "timestamp": chrono::Utc::now().to_rfc3339()
        })
    }
}

impl SessionObserver for JsonProgressObserver {
    fn on_progress(&mut self, event: &ProgressEvent) {
        println!("{}", self.progress_event(event));
    }

    fn on_finished(&mut self, ok: bool, error: Option<&str>) {
        let event = serde_json::json!({
            "event": "finished",
            "ok": ok,
            "error": error,
            "timestamp": chrono::Utc::now().to_rfc3339()
        });
        println!("{}", event);
    }
}

impl ProgressUnit {
    /// Progress value written for humans
    pub fn describe(&self, value: f64) -> String {
        match self {
            ProgressUnit::Percent => format!("{:.1}%", value),
            ProgressUnit::Seconds => TimeCodec::format(value as u64),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percent_chunk() {
        assert_eq!(
            ProgressParser::read_chunk("[download]  42.0% of 10.00MiB at 1.00MiB/s ETA 00:05"),
            ChunkReading::Progress(ProgressEvent::percent(42.0))
        );
    }

    #[test]
    fn test_percent_chunk_takes_latest_update() {
        let chunk = "[download]  10.5% of 1MiB\n[download]  11.0% of 1MiB\n";
        assert_eq!(
            ProgressParser::read_chunk(chunk),
            ChunkReading::Progress(ProgressEvent::percent(11.0))
        );
    }

    #[test]
    fn test_time_chunk() {
        let chunk = "frame= 2250 fps=120 q=-1.0 size=   10240kB time=00:01:30.50 bitrate= 926.6kbits/s speed=4.8x";
        assert_eq!(
            ProgressParser::read_chunk(chunk),
            ChunkReading::Progress(ProgressEvent::seconds(90.5))
        );
    }

    #[test]
    fn test_error_chunk() {
        assert_eq!(
            ProgressParser::read_chunk("Error: network"),
            ChunkReading::Error("Error: network".to_string())
        );
        assert!(ProgressParser::has_error("HTTP ERROR 403"));
    }

    #[test]
    fn test_progress_wins_over_error_text() {
        let chunk = "time=00:00:05.00 error concealment active";
        assert_eq!(
            ProgressParser::read_chunk(chunk),
            ChunkReading::Progress(ProgressEvent::seconds(5.0))
        );
    }

    #[test]
    fn test_unrelated_chunk_is_ignored() {
        assert_eq!(
            ProgressParser::read_chunk("Input #0, mov,mp4,m4a,3gp,3g2,mj2, from 'x':"),
            ChunkReading::Ignored
        );
        assert_eq!(ProgressParser::read_chunk("time=N/A"), ChunkReading::Ignored);
    }

    #[test]
    fn test_console_render() {
        let observer = ConsoleProgressObserver::new(20);
        let line = observer.render(&ProgressEvent::seconds(10.0));
        assert!(line.ends_with(" 50.0% (00:00:10)"));
        assert_eq!(line.matches('#').count(), 15);
    }

    #[test]
    fn test_json_progress_event() {
        let observer = JsonProgressObserver::new(100);
        let value = observer.progress_event(&ProgressEvent::percent(25.0));
        assert_eq!(value["event"], "progress");
        assert_eq!(value["unit"], "percent");
        assert_eq!(value["fraction"], 0.25);
    }

    #[test]
    fn test_unit_describe() {
        assert_eq!(ProgressUnit::Percent.describe(42.0), "42.0%");
        assert_eq!(ProgressUnit::Seconds.describe(90.5), "00:01:30");
    }
}
