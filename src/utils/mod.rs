//! Common utilities and helpers

pub mod logging;
pub mod path;
pub mod time;

/// Binary size suffixes after the plain byte unit
const SIZE_SUFFIXES: &[&str] = &["KiB", "MiB", "GiB", "TiB", "PiB", "EiB", "ZiB", "YiB"];

/// Format a byte count with binary suffixes, e.g. `120.50MiB`
pub fn format_bytes(bytes: u64) -> String {
    let mut size = bytes as f64;
    let mut unit = "B";

    for suffix in SIZE_SUFFIXES {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = suffix;
    }

    format!("{:.2}{}", size, unit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(0), "0.00B");
        assert_eq!(format_bytes(512), "512.00B");
        assert_eq!(format_bytes(1024), "1.00KiB");
        assert_eq!(format_bytes(126_353_408), "120.50MiB");
        assert_eq!(format_bytes(3 * 1024 * 1024 * 1024), "3.00GiB");
    }
}
