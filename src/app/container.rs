use std::sync::Arc;

use tracing::info;

use crate::adapters::{AppConfig, TokioToolRunner, ToolLocator};
use crate::app::{download_session::DownloadSession, metadata_resolver::MetadataResolver};
use crate::domain::model::{ToolOptions, ToolPaths, VideoRef};
use crate::error::YtCutResult;
use crate::ports::ToolRunner;

pub trait AppContainer: Send + Sync {
    fn metadata_resolver(&self) -> Arc<MetadataResolver>;
    fn new_session(&self, video: VideoRef) -> DownloadSession;
    fn options(&self) -> &ToolOptions;
}

pub struct DefaultAppContainer {
    runner: Arc<dyn ToolRunner>,
    tools: ToolPaths,
    options: ToolOptions,
    metadata_resolver: Arc<MetadataResolver>,
}

impl DefaultAppContainer {
    /// Locate the tools and wire the real process runner
    pub fn new(config: &AppConfig) -> YtCutResult<Self> {
        let tools = ToolLocator::new().locate_all(&config.tools)?;
        info!(
            "Using yt-dlp at {} and ffmpeg at {}",
            tools.yt_dlp.display(),
            tools.ffmpeg.display()
        );
        Ok(Self::with_runner(Arc::new(TokioToolRunner::new()), tools, config))
    }

    /// Wire an arbitrary runner with already resolved tool paths
    pub fn with_runner(runner: Arc<dyn ToolRunner>, tools: ToolPaths, config: &AppConfig) -> Self {
        let metadata_resolver = Arc::new(MetadataResolver::new(
            Arc::clone(&runner),
            tools.clone(),
            config.options.clone(),
            config.timeouts.clone(),
        ));

        Self {
            runner,
            tools,
            options: config.options.clone(),
            metadata_resolver,
        }
    }
}

impl AppContainer for DefaultAppContainer {
    fn metadata_resolver(&self) -> Arc<MetadataResolver> {
        Arc::clone(&self.metadata_resolver)
    }

    fn new_session(&self, video: VideoRef) -> DownloadSession {
        DownloadSession::new(
            Arc::clone(&self.runner),
            self.tools.clone(),
            self.options.clone(),
            video,
        )
    }

    fn options(&self) -> &ToolOptions {
        &self.options
    }
}
