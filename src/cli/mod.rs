//! CLI module for YtCut
//!
//! This module handles command-line argument parsing and command execution.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::utils::logging::{LogFormat, LogLevel};

pub mod args;
pub mod commands;

/// YtCut CLI
///
/// Downloads a time range of an online video, either by remuxing the whole
/// video with yt-dlp or by cutting the remote streams with ffmpeg.
#[derive(Parser, Debug)]
#[command(name = "ytcut")]
#[command(about = "Cut a time range out of an online video")]
#[command(version)]
#[command(long_about = None)]
pub struct Cli {
    /// Configuration file (default: ./ytcut.toml, then the user config directory)
    #[arg(long, global = true, env = "YTCUT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Log output format
    #[arg(long, value_enum, global = true)]
    pub log_format: Option<LogFormat>,

    /// The command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show title, channel and duration of a video
    Info(args::InfoArgs),
    /// List the downloadable formats of a video
    Formats(args::FormatsArgs),
    /// Download a time range of a video
    Cut(args::CutArgs),
}

impl Commands {
    /// The video link every command works on
    pub fn url(&self) -> &str {
        match self {
            Commands::Info(args) => &args.url,
            Commands::Formats(args) => &args.url,
            Commands::Cut(args) => &args.url,
        }
    }
}
