// Unit tests for domain models

#[cfg(test)]
mod tests {
    use crate::domain::errors::*;
    use crate::domain::model::*;

    fn descriptor(id: &str) -> FormatDescriptor {
        FormatDescriptor {
            id: id.to_string(),
            resolution: "1920x1080".to_string(),
            extension: "mp4".to_string(),
            bitrate: Some(2500.7),
            video_codec: Some("avc1.640028".to_string()),
            audio_codec: Some("mp4a.40.2".to_string()),
            size_bytes: Some(126_353_408),
            note: Some("1080p".to_string()),
            source_urls: vec!["https://v".to_string(), "https://a".to_string()],
        }
    }

    #[test]
    fn test_canonical_time_display_and_parse() {
        let time = CanonicalTime::parse("2:05").unwrap();
        assert_eq!(time.as_seconds(), 125);
        assert_eq!(time.to_string(), "00:02:05");

        let parsed: CanonicalTime = "01:00:00".parse().unwrap();
        assert_eq!(parsed, CanonicalTime::from_seconds(3600));
    }

    #[test]
    fn test_canonical_time_rejects_bad_text() {
        let err = CanonicalTime::parse("soon").unwrap_err();
        assert!(matches!(err, DomainError::InvalidTime(_)));
    }

    #[test]
    fn test_canonical_time_serializes_as_text() {
        let json = serde_json::to_string(&CanonicalTime::from_seconds(90)).unwrap();
        assert_eq!(json, "\"00:01:30\"");

        let back: CanonicalTime = serde_json::from_str("\"00:01:30\"").unwrap();
        assert_eq!(back.as_seconds(), 90);
    }

    #[test]
    fn test_video_placeholder_defaults() {
        let video = VideoRef::placeholder("https://example.com/v");
        assert_eq!(video.title, "Title");
        assert_eq!(video.channel, "Channel");
        assert!(video.thumbnail.is_none());
        assert!(video.duration.is_zero());
    }

    #[test]
    fn test_describe_includes_present_fields() {
        let text = descriptor("137+140").describe();
        assert_eq!(
            text,
            "1920x1080, mp4, 2500kb/s, avc1.640028, mp4a.40.2, 120.50MiB, 1080p"
        );
    }

    #[test]
    fn test_describe_omits_absent_fields() {
        let mut format = descriptor("140");
        format.resolution = "audio only".to_string();
        format.bitrate = None;
        format.video_codec = None;
        format.size_bytes = None;
        format.note = None;
        assert_eq!(format.describe(), "audio only, mp4, mp4a.40.2");
    }

    #[test]
    fn test_output_extension_default() {
        let mut format = descriptor("18");
        format.extension.clear();
        assert_eq!(format.output_extension(), "mp4");
    }

    #[test]
    fn test_format_list_labels_are_numbered() {
        let list = FormatList::from_descriptors(vec![descriptor("a"), descriptor("b")]);
        let labels = list.labels();
        assert_eq!(labels.len(), 2);
        assert!(labels[0].starts_with("01. "));
        assert!(labels[1].starts_with("02. "));
    }

    #[test]
    fn test_format_list_lookup() {
        let list = FormatList::from_descriptors(vec![descriptor("a"), descriptor("b")]);

        assert_eq!(list.by_number(2).unwrap().format.id, "b");
        assert!(list.by_number(0).is_none());
        assert!(list.by_number(3).is_none());

        let label = list.labels()[0].to_string();
        assert_eq!(list.get(&label).unwrap().format.id, "a");

        assert_eq!(list.select("1").unwrap().format.id, "a");
        assert_eq!(list.select("b").unwrap().format.id, "b");
        assert_eq!(list.select(&label).unwrap().format.id, "a");
        assert!(matches!(
            list.select("42"),
            Err(DomainError::UnknownFormat(_))
        ));
    }

    #[test]
    fn test_interval_helpers() {
        let interval = Interval::parse("10", "1:00").unwrap();
        assert_eq!(interval.length_seconds(), 50);
        assert_eq!(interval.file_suffix(), "_00.00.10-00.01.00");
        assert_eq!(interval.to_string(), "00:00:10 - 00:01:00");

        let inverted = Interval::new(CanonicalTime::from_seconds(9), CanonicalTime::from_seconds(3));
        assert_eq!(inverted.length_seconds(), 0);
    }

    #[test]
    fn test_content_selection() {
        assert!(ContentSelection::default().keeps_everything());
        assert!(ContentSelection::new(false, false).is_empty());
        assert!(!ContentSelection::new(true, false).keeps_everything());
    }

    #[test]
    fn test_progress_fraction() {
        assert_eq!(ProgressEvent::percent(50.0).fraction(10), 0.5);
        assert_eq!(ProgressEvent::percent(150.0).fraction(10), 1.0);
        assert_eq!(ProgressEvent::seconds(5.0).fraction(20), 0.25);
        assert_eq!(ProgressEvent::seconds(5.0).fraction(0), 0.0);
    }

    #[test]
    fn test_session_state_busy() {
        assert!(!SessionState::Idle.is_busy());
        assert!(SessionState::Running.is_busy());
        assert!(SessionState::Cancelling.is_busy());
        assert!(!SessionState::Finished { ok: true, error: None }.is_busy());
    }

    #[test]
    fn test_command_line_quotes_spaces() {
        let command = ToolCommand::new(
            "ffmpeg",
            vec!["-i".to_string(), "my file.mp4".to_string()],
        );
        assert_eq!(command.command_line(), "ffmpeg -i 'my file.mp4'");
    }

    #[test]
    fn test_tool_options_defaults() {
        let options = ToolOptions::default();
        assert_eq!(options.video_codec.as_deref(), Some("copy"));
        assert!(options.strict_errors);
        assert!(!options.uses_gpu_encoder());

        let gpu = ToolOptions {
            video_codec: Some("h264_nvenc".to_string()),
            ..ToolOptions::default()
        };
        assert!(gpu.uses_gpu_encoder());
    }
}
