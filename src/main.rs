//! YtCut CLI
//!
//! Cuts a time range out of an online video using yt-dlp and ffmpeg.
//!
//! # Usage
//!
//! ```bash
//! ytcut info "https://www.youtube.com/watch?v=..."
//! ytcut formats "https://www.youtube.com/watch?v=..."
//! ytcut cut "https://www.youtube.com/watch?v=..." --from 00:01:00 --to 00:02:00 -f 1
//! ```

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use ytcut_cli::cli::{commands, Cli, Commands};
use ytcut_cli::config_initialization::initialize_configuration_hierarchy;
use ytcut_cli::utils::logging::LoggingSystem;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = initialize_configuration_hierarchy(&cli)?;

    let logging = LoggingSystem::new(config.logging.clone());
    logging
        .initialize()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;
    logging.log_system_info();

    info!("Working on {}", cli.command.url());

    let result = match cli.command {
        Commands::Info(args) => {
            info!("Executing info command");
            commands::info(&config, args).await
        }
        Commands::Formats(args) => {
            info!("Executing formats command");
            commands::formats(&config, args).await
        }
        Commands::Cut(args) => {
            info!("Executing cut command");
            commands::cut(&config, args).await
        }
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
