//! Configuration initialization and hierarchy management

use anyhow::{Context, Result};
use tracing::info;

use crate::adapters::{AppConfig, TomlConfigAdapter};
use crate::cli::{Cli, Commands};

/// Build the configuration with precedence: CLI > Env > File > Defaults
pub fn initialize_configuration_hierarchy(cli: &Cli) -> Result<AppConfig> {
    let (mut config, source) =
        TomlConfigAdapter::load(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(path) = &source {
        info!("Configuration file: {}", path.display());
    }

    let env_overrides = TomlConfigAdapter::apply_environment(&mut config)
        .context("Invalid environment override")?;
    if env_overrides > 0 {
        info!("Applied {} environment variable overrides", env_overrides);
    }

    let cli_overrides = apply_cli_configuration_overrides(&mut config, cli);
    if cli_overrides > 0 {
        info!("Applied {} CLI configuration overrides", cli_overrides);
    }

    TomlConfigAdapter::validate(&config)?;
    Ok(config)
}

/// Apply CLI argument overrides to configuration
pub fn apply_cli_configuration_overrides(config: &mut AppConfig, cli: &Cli) -> usize {
    let mut overrides = 0;
    let mut bump = || overrides += 1;

    if let Some(level) = cli.log_level {
        config.logging.level = level;
        bump();
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
        bump();
    }

    let options = &mut config.options;
    let browser = match &cli.command {
        Commands::Info(args) => args.browser.clone(),
        Commands::Formats(args) => {
            if let Some(filter) = &args.filter {
                options.format_filter = Some(filter.clone()).filter(|f| !f.trim().is_empty());
                bump();
            }
            if args.prefer_avc {
                options.prefer_avc = true;
                bump();
            }
            args.browser.clone()
        }
        Commands::Cut(args) => {
            if let Some(codec) = &args.video_codec {
                options.video_codec = Some(codec.clone()).filter(|c| !c.trim().is_empty());
                bump();
            }
            if let Some(codec) = &args.audio_codec {
                options.audio_codec = Some(codec.clone()).filter(|c| !c.trim().is_empty());
                bump();
            }
            if args.keep_vbr {
                options.keep_vbr = true;
                bump();
            }
            if args.prefer_avc {
                options.prefer_avc = true;
                bump();
            }
            if args.report {
                options.ffmpeg_report = true;
                bump();
            }
            args.browser.clone()
        }
    };
    if let Some(browser) = browser {
        let browser = browser.trim().to_lowercase();
        options.browser = (!browser.is_empty()).then_some(browser);
        bump();
    }

    overrides
}
