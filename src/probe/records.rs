//! Records printed by the extraction tool and their conversion to domain types

use serde::Deserialize;
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::domain::model::*;

/// Sentinel printed for fields the site did not provide
const MISSING: &str = "NA";

/// `--print` template for video metadata
pub const INFO_TEMPLATE: &str = concat!(
    r#"{ "channel": %(channel)j"#,
    r#", "uploader": %(uploader)j"#,
    r#", "title": %(title)j"#,
    r#", "thumbnail": %(thumbnail)j"#,
    r#", "duration": %(duration)j }"#,
);

/// `--print` template for one format, printed once per format
pub const FORMAT_TEMPLATE: &str = concat!(
    r#"{ "format_id": %(format_id)j"#,
    r#", "ext": %(ext)j"#,
    r#", "resolution": %(resolution)j"#,
    r#", "width": %(width)j"#,
    r#", "height": %(height)j"#,
    r#", "vbr": %(vbr)j"#,
    r#", "vcodec": %(vcodec)j"#,
    r#", "acodec": %(acodec)j"#,
    r#", "size": %(filesize,filesize_approx)j"#,
    r#", "format_note": %(format_note)j"#,
    r#", "urls": %(urls)j }, "#,
);

/// Raw metadata record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InfoRecord {
    #[serde(default)]
    pub channel: Option<Value>,
    #[serde(default)]
    pub uploader: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub thumbnail: Option<Value>,
    #[serde(default)]
    pub duration: Option<Value>,
}

impl InfoRecord {
    pub fn parse(text: &str) -> Result<Self, DomainError> {
        serde_json::from_str(text.trim())
            .map_err(|e| DomainError::InternalError(format!("Malformed metadata record: {}", e)))
    }

    /// Build the video description, falling back to defaults for missing fields
    pub fn into_video(self, url: &str) -> VideoRef {
        let channel = text_field(&self.channel)
            .or_else(|| text_field(&self.uploader))
            .unwrap_or_else(|| VideoRef::DEFAULT_CHANNEL.to_string());
        let title = text_field(&self.title).unwrap_or_else(|| VideoRef::DEFAULT_TITLE.to_string());
        let duration = number_field(&self.duration)
            .filter(|d| d.is_finite() && *d > 0.0)
            .map(|d| d as u64)
            .unwrap_or(0);

        VideoRef {
            url: url.to_string(),
            title,
            channel,
            thumbnail: text_field(&self.thumbnail),
            duration: CanonicalTime::from_seconds(duration),
        }
    }
}

/// Raw format record
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FormatRecord {
    #[serde(default)]
    pub format_id: Option<Value>,
    #[serde(default)]
    pub ext: Option<Value>,
    #[serde(default)]
    pub resolution: Option<Value>,
    #[serde(default)]
    pub width: Option<Value>,
    #[serde(default)]
    pub height: Option<Value>,
    #[serde(default)]
    pub vbr: Option<Value>,
    #[serde(default)]
    pub vcodec: Option<Value>,
    #[serde(default)]
    pub acodec: Option<Value>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default)]
    pub format_note: Option<Value>,
    #[serde(default)]
    pub urls: Option<Value>,
}

impl FormatRecord {
    /// Parse the concatenated `{...}, {...}, ` output of a formats query
    pub fn parse_list(text: &str) -> Result<Vec<Self>, DomainError> {
        let body = text.trim_end_matches(|c: char| c == ',' || c.is_whitespace());
        if body.trim().is_empty() {
            return Ok(Vec::new());
        }

        serde_json::from_str(&format!("[{}]", body))
            .map_err(|e| DomainError::InternalError(format!("Malformed format records: {}", e)))
    }

    /// `"audio only"`, the reported resolution, `WxH`, `Hp`, `Wx?` or `"unknown"`
    pub fn resolution_text(&self) -> String {
        let vcodec = text_field(&self.vcodec);
        let acodec = text_field(&self.acodec);
        if vcodec.as_deref() == Some("none") && acodec.as_deref() != Some("none") {
            return "audio only".to_string();
        }
        if let Some(resolution) = text_field(&self.resolution) {
            return resolution;
        }

        let width = number_field(&self.width).filter(|w| *w > 0.0).map(|w| w as u64);
        let height = number_field(&self.height).filter(|h| *h > 0.0).map(|h| h as u64);
        match (width, height) {
            (Some(w), Some(h)) => format!("{}x{}", w, h),
            (None, Some(h)) => format!("{}p", h),
            (Some(w), None) => format!("{}x?", w),
            (None, None) => "unknown".to_string(),
        }
    }

    pub fn into_descriptor(self) -> FormatDescriptor {
        let resolution = self.resolution_text();
        let codec = |value: &Option<Value>| text_field(value).filter(|c| c != "none");

        FormatDescriptor {
            id: text_field(&self.format_id).unwrap_or_default(),
            resolution,
            extension: text_field(&self.ext).unwrap_or_default(),
            bitrate: number_field(&self.vbr).filter(|b| *b > 0.0),
            video_codec: codec(&self.vcodec),
            audio_codec: codec(&self.acodec),
            size_bytes: number_field(&self.size).filter(|s| *s >= 0.0).map(|s| s as u64),
            note: text_field(&self.format_note),
            source_urls: text_field(&self.urls)
                .map(|urls| urls.split_whitespace().map(String::from).collect())
                .unwrap_or_default(),
        }
    }
}

/// Text value with `null`, `"NA"` and empty strings treated as absent
fn text_field(value: &Option<Value>) -> Option<String> {
    match value {
        Some(Value::String(s)) if !s.trim().is_empty() && s != MISSING => Some(s.clone()),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    }
}

/// Numeric value, accepting numbers printed as strings
fn number_field(value: &Option<Value>) -> Option<f64> {
    match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) if s != MISSING => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_falls_back_to_uploader() {
        let record = InfoRecord::parse(
            r#"{"channel":"NA","uploader":"Real","title":"T","thumbnail":"NA","duration":125}"#,
        )
        .unwrap();
        let video = record.into_video("https://x");

        assert_eq!(video.channel, "Real");
        assert_eq!(video.title, "T");
        assert_eq!(video.duration.to_string(), "00:02:05");
        assert!(video.thumbnail.is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let video = InfoRecord::parse(r#"{"channel":null,"title":"NA","duration":"NA"}"#)
            .unwrap()
            .into_video("https://x");

        assert_eq!(video.channel, VideoRef::DEFAULT_CHANNEL);
        assert_eq!(video.title, VideoRef::DEFAULT_TITLE);
        assert!(video.duration.is_zero());
    }

    #[test]
    fn test_fractional_duration_is_truncated() {
        let video = InfoRecord::parse(r#"{"duration":59.9}"#).unwrap().into_video("u");
        assert_eq!(video.duration.as_seconds(), 59);
    }

    #[test]
    fn test_malformed_info() {
        assert!(InfoRecord::parse("not json").is_err());
    }

    #[test]
    fn test_parse_format_list() {
        let text = concat!(
            r#"{ "format_id": "137+140", "ext": "mp4", "resolution": "1920x1080", "width": 1920, "height": 1080, "vbr": 2500.5, "vcodec": "avc1", "acodec": "mp4a", "size": 1048576, "format_note": "1080p", "urls": "https://v https://a" }, "#,
            "\n",
            r#"{ "format_id": "18", "ext": "mp4", "resolution": "NA", "width": 640, "height": 360, "vbr": "NA", "vcodec": "avc1", "acodec": "mp4a", "size": "NA", "format_note": "NA", "urls": "https://c" }, "#,
            "\n"
        );

        let formats: Vec<FormatDescriptor> = FormatRecord::parse_list(text)
            .unwrap()
            .into_iter()
            .map(FormatRecord::into_descriptor)
            .collect();

        assert_eq!(formats.len(), 2);
        assert_eq!(formats[0].id, "137+140");
        assert_eq!(formats[0].source_urls, vec!["https://v", "https://a"]);
        assert_eq!(formats[0].size_bytes, Some(1_048_576));
        assert_eq!(formats[1].resolution, "640x360");
        assert!(formats[1].bitrate.is_none());
        assert!(formats[1].note.is_none());
        assert_eq!(formats[1].source_urls.len(), 1);
    }

    #[test]
    fn test_empty_format_output() {
        assert!(FormatRecord::parse_list(" \n, ").unwrap().is_empty());
    }

    #[test]
    fn test_resolution_text() {
        let audio = FormatRecord {
            vcodec: Some(Value::from("none")),
            acodec: Some(Value::from("opus")),
            resolution: Some(Value::from("audio only")),
            ..FormatRecord::default()
        };
        assert_eq!(audio.resolution_text(), "audio only");
        assert!(audio.clone().into_descriptor().video_codec.is_none());

        let height_only = FormatRecord {
            height: Some(Value::from(720)),
            ..FormatRecord::default()
        };
        assert_eq!(height_only.resolution_text(), "720p");

        let width_only = FormatRecord {
            width: Some(Value::from(1280)),
            ..FormatRecord::default()
        };
        assert_eq!(width_only.resolution_text(), "1280x?");

        assert_eq!(FormatRecord::default().resolution_text(), "unknown");
    }
}
