//! Time parsing and formatting utilities

use crate::domain::errors::DomainError;

/// Characters accepted between time groups ("1:02:05", "1.02.05", "1'02", ...)
const DELIMITERS: &[char] = &[':', ',', '.', '\'', ' '];

/// Converts between human time text and whole seconds
pub struct TimeCodec;

impl TimeCodec {
    /// Parse a time string to seconds.
    ///
    /// Groups are read right to left as seconds, minutes, hours, each weighted
    /// by `60^n`. An empty group counts as zero, so `"1::05"` is 3605 seconds.
    pub fn parse(text: &str) -> Result<u64, DomainError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DomainError::InvalidTime(text.to_string()));
        }

        let mut total: u64 = 0;
        let mut weight: u64 = 1;
        for group in trimmed.split(DELIMITERS).rev() {
            let value = if group.is_empty() {
                0
            } else {
                group
                    .parse::<u64>()
                    .map_err(|_| DomainError::InvalidTime(text.to_string()))?
            };
            total = value
                .checked_mul(weight)
                .and_then(|v| total.checked_add(v))
                .ok_or_else(|| DomainError::InvalidTime(text.to_string()))?;
            weight = weight.saturating_mul(60);
        }

        Ok(total)
    }

    /// Format seconds as zero-padded `HH:MM:SS`
    pub fn format(seconds: u64) -> String {
        let minutes = seconds / 60;
        let hours = minutes / 60;
        format!("{:02}:{:02}:{:02}", hours, minutes % 60, seconds % 60)
    }

    /// Parse the `HH:MM:SS.ff` clock printed by ffmpeg, keeping fractions
    pub fn parse_transcoder_time(text: &str) -> Result<f64, DomainError> {
        let parts: Vec<&str> = text.trim().split(':').collect();
        if parts.len() != 3 {
            return Err(DomainError::InvalidTime(text.to_string()));
        }

        let mut values = [0.0f64; 3];
        for (slot, part) in values.iter_mut().zip(parts.iter()) {
            *slot = part
                .parse::<f64>()
                .map_err(|_| DomainError::InvalidTime(text.to_string()))?;
        }
        let [hours, minutes, seconds] = values;

        Ok((hours * 60.0 + minutes) * 60.0 + seconds)
    }

    /// Turn a canonical time into a file-name friendly fragment (`00.01.30`)
    pub fn file_fragment(seconds: u64) -> String {
        Self::format(seconds).replace(':', ".")
    }
}
