//! Video link validation utilities

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

use crate::domain::errors::DomainError;
use crate::domain::model::CanonicalTime;

/// `t=90` or `t=90s`
static START_PARAM_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)s*$").expect("valid start parameter regex"));

/// Video link validator
pub struct LinkValidator;

impl LinkValidator {
    /// Accept an absolute `http`/`https` link with a host
    pub fn validate(raw: &str) -> Result<Url, DomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(Self::invalid(raw, "the link is empty"));
        }

        let parsed = Url::parse(trimmed).map_err(|e| Self::invalid(raw, &e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(Self::invalid(
                raw,
                &format!("unsupported scheme '{}'", parsed.scheme()),
            ));
        }
        if parsed.host_str().map_or(true, str::is_empty) {
            return Err(Self::invalid(raw, "the link has no host"));
        }

        Ok(parsed)
    }

    /// Start position encoded in the `t` query parameter, if any
    pub fn start_hint(url: &Url) -> Option<CanonicalTime> {
        url.query_pairs()
            .find(|(key, _)| key == "t")
            .and_then(|(_, value)| {
                START_PARAM_RE
                    .captures(&value)
                    .and_then(|caps| caps.get(1))
                    .and_then(|m| m.as_str().parse::<u64>().ok())
            })
            .map(CanonicalTime::from_seconds)
    }

    fn invalid(url: &str, reason: &str) -> DomainError {
        DomainError::InvalidLink {
            url: url.to_string(),
            reason: reason.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_web_links() {
        let url = LinkValidator::validate("  https://www.youtube.com/watch?v=abc ").unwrap();
        assert_eq!(url.host_str(), Some("www.youtube.com"));
        assert!(LinkValidator::validate("http://youtu.be/abc").is_ok());
    }

    #[test]
    fn test_rejects_bad_links() {
        for link in ["", "   ", "not a link", "ftp://example.com/v", "file:///tmp/v.mp4"] {
            let err = LinkValidator::validate(link).unwrap_err();
            assert!(matches!(err, DomainError::InvalidLink { .. }), "{}", link);
        }
    }

    #[test]
    fn test_start_hint() {
        let url = Url::parse("https://youtu.be/abc?t=90").unwrap();
        assert_eq!(LinkValidator::start_hint(&url), Some(CanonicalTime::from_seconds(90)));

        let url = Url::parse("https://www.youtube.com/watch?v=abc&t=125s").unwrap();
        assert_eq!(LinkValidator::start_hint(&url).unwrap().to_string(), "00:02:05");

        let url = Url::parse("https://www.youtube.com/watch?v=abc&t=1m5s").unwrap();
        assert!(LinkValidator::start_hint(&url).is_none());

        let url = Url::parse("https://www.youtube.com/watch?v=abc").unwrap();
        assert!(LinkValidator::start_hint(&url).is_none());
    }
}
