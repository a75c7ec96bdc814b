// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::model::*;
use crate::error::{YtCutError, YtCutResult};
use crate::utils::logging::LoggingConfig;

/// File looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "ytcut.toml";

/// Prefix of environment overrides
pub const ENV_PREFIX: &str = "YTCUT_";

/// Bounded waits for metadata queries
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub info_secs: u64,
    pub formats_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            info_secs: 30,
            formats_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn info(&self) -> Duration {
        Duration::from_secs(self.info_secs)
    }

    pub fn formats(&self) -> Duration {
        Duration::from_secs(self.formats_secs)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub tools: ToolPaths,
    pub options: ToolOptions,
    pub timeouts: TimeoutConfig,
    pub logging: LoggingConfig,
}

/// TOML configuration adapter
pub struct TomlConfigAdapter;

impl TomlConfigAdapter {
    /// Parse configuration text
    pub fn parse(text: &str) -> YtCutResult<AppConfig> {
        let mut config: AppConfig = toml::from_str(text)?;
        normalize(&mut config);
        Ok(config)
    }

    /// Load the explicit file, else the first existing default location, else defaults
    pub fn load(explicit: Option<&Path>) -> YtCutResult<(AppConfig, Option<PathBuf>)> {
        if let Some(path) = explicit {
            return Ok((Self::load_file(path)?, Some(path.to_path_buf())));
        }

        for path in Self::default_locations() {
            if path.is_file() {
                return Ok((Self::load_file(&path)?, Some(path)));
            }
        }

        info!("No configuration file found, using defaults");
        Ok((AppConfig::default(), None))
    }

    fn load_file(path: &Path) -> YtCutResult<AppConfig> {
        info!("Loading configuration from: {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|source| YtCutError::ConfigFile {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Working directory first, then the per-user config directory
    pub fn default_locations() -> Vec<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = Self::user_config_dir() {
            locations.push(dir.join("ytcut").join("config.toml"));
        }
        locations
    }

    fn user_config_dir() -> Option<PathBuf> {
        if cfg!(windows) {
            std::env::var_os("APPDATA").map(PathBuf::from)
        } else {
            std::env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))
        }
    }

    /// Apply `YTCUT_*` variables from the process environment
    pub fn apply_environment(config: &mut AppConfig) -> YtCutResult<usize> {
        Self::apply_overrides(config, |name| std::env::var(name).ok())
    }

    /// Apply overrides from any variable source, returning how many were used
    pub fn apply_overrides<F>(config: &mut AppConfig, lookup: F) -> YtCutResult<usize>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{}{}", ENV_PREFIX, key));
        let mut applied = 0;

        if let Some(value) = var("YT_DLP") {
            config.tools.yt_dlp = PathBuf::from(value);
            applied += 1;
        }
        if let Some(value) = var("FFMPEG") {
            config.tools.ffmpeg = PathBuf::from(value);
            applied += 1;
        }
        if let Some(value) = var("BROWSER") {
            config.options.browser = Some(value);
            applied += 1;
        }
        if let Some(value) = var("VIDEO_CODEC") {
            config.options.video_codec = Some(value);
            applied += 1;
        }
        if let Some(value) = var("AUDIO_CODEC") {
            config.options.audio_codec = Some(value);
            applied += 1;
        }
        if let Some(value) = var("CONTAINER") {
            config.options.container = value;
            applied += 1;
        }
        if let Some(value) = var("PREFER_AVC") {
            config.options.prefer_avc = parse_flag("PREFER_AVC", &value)?;
            applied += 1;
        }
        if let Some(value) = var("KEEP_VBR") {
            config.options.keep_vbr = parse_flag("KEEP_VBR", &value)?;
            applied += 1;
        }
        if let Some(value) = var("INFO_TIMEOUT") {
            config.timeouts.info_secs = parse_number("INFO_TIMEOUT", &value)?;
            applied += 1;
        }
        if let Some(value) = var("FORMATS_TIMEOUT") {
            config.timeouts.formats_secs = parse_number("FORMATS_TIMEOUT", &value)?;
            applied += 1;
        }
        if let Some(value) = var("LOG_LEVEL") {
            config.logging.level = value.parse().map_err(|message| YtCutError::Config { message })?;
            applied += 1;
        }
        if let Some(value) = var("LOG_FORMAT") {
            config.logging.format = value.parse().map_err(|message| YtCutError::Config { message })?;
            applied += 1;
        }

        normalize(config);
        Ok(applied)
    }

    /// Reject values the tools would refuse anyway
    pub fn validate(config: &AppConfig) -> YtCutResult<()> {
        if let Some(browser) = &config.options.browser {
            if !SUPPORTED_BROWSERS.contains(&browser.as_str()) {
                return Err(YtCutError::Config {
                    message: format!(
                        "Unsupported browser '{}', expected one of: {}",
                        browser,
                        SUPPORTED_BROWSERS.join(", ")
                    ),
                });
            }
        }

        if config.options.container.trim().is_empty() {
            return Err(YtCutError::Config {
                message: "The remux container must not be empty".to_string(),
            });
        }

        if config.timeouts.info_secs == 0 || config.timeouts.formats_secs == 0 {
            return Err(YtCutError::Config {
                message: "Timeouts must be at least one second".to_string(),
            });
        }

        if let Some(codec) = &config.options.video_codec {
            if !KNOWN_VIDEO_CODECS.iter().any(|(name, _)| name == codec) {
                warn!("Video codec '{}' is not one of the known encoders", codec);
            }
        }
        if let Some(codec) = &config.options.audio_codec {
            if !KNOWN_AUDIO_CODECS.iter().any(|(name, _)| name == codec) {
                warn!("Audio codec '{}' is not one of the known encoders", codec);
            }
        }

        Ok(())
    }
}

/// Empty strings mean "not set"
fn normalize(config: &mut AppConfig) {
    for field in [
        &mut config.options.browser,
        &mut config.options.video_codec,
        &mut config.options.audio_codec,
        &mut config.options.format_filter,
    ] {
        if let Some(value) = field.as_mut() {
            *value = value.trim().to_string();
        }
        if field.as_deref() == Some("") {
            *field = None;
        }
    }
    if let Some(browser) = config.options.browser.as_mut() {
        *browser = browser.to_lowercase();
    }
}

fn parse_flag(key: &str, value: &str) -> YtCutResult<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(YtCutError::Config {
            message: format!("{}{} expects a boolean, got '{}'", ENV_PREFIX, key, other),
        }),
    }
}

fn parse_number(key: &str, value: &str) -> YtCutResult<u64> {
    value.trim().parse().map_err(|_| YtCutError::Config {
        message: format!("{}{} expects a number of seconds, got '{}'", ENV_PREFIX, key, value),
    })
}
