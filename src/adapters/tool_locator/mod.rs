//! External tool lookup
//!
//! An absolute path is used as-is. Bare names are searched on `PATH`, relative
//! paths in the working directory; both then fall back to the directory of the
//! running executable. Only executable files are accepted.

use std::path::{Path, PathBuf};

use tracing::debug;
use which::which;

use crate::domain::model::ToolPaths;
use crate::error::{YtCutError, YtCutResult};

/// Resolves tool names to executable paths
pub struct ToolLocator {
    app_dir: Option<PathBuf>,
}

impl ToolLocator {
    /// Locator that falls back to the directory of the current executable
    pub fn new() -> Self {
        let app_dir = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        Self { app_dir }
    }

    /// Locator with an explicit fallback directory
    pub fn with_app_dir(app_dir: impl Into<PathBuf>) -> Self {
        Self {
            app_dir: Some(app_dir.into()),
        }
    }

    pub fn locate(&self, tool: &Path) -> YtCutResult<PathBuf> {
        if tool.is_absolute() {
            return executable(tool).ok_or_else(|| not_found(tool));
        }

        if let Some(found) = executable(tool) {
            debug!("Found {}: {}", tool.display(), found.display());
            return Ok(found);
        }

        if let Some(dir) = &self.app_dir {
            for candidate in Self::candidates(dir, tool) {
                if let Some(found) = executable(&candidate) {
                    debug!("Found {} next to the application: {}", tool.display(), found.display());
                    return Ok(found);
                }
            }
        }

        Err(not_found(tool))
    }

    /// Resolve both tools
    pub fn locate_all(&self, tools: &ToolPaths) -> YtCutResult<ToolPaths> {
        Ok(ToolPaths {
            yt_dlp: self.locate(&tools.yt_dlp)?,
            ffmpeg: self.locate(&tools.ffmpeg)?,
        })
    }

    fn candidates(dir: &Path, tool: &Path) -> Vec<PathBuf> {
        let plain = dir.join(tool);
        if cfg!(windows) && tool.extension().is_none() {
            vec![plain.with_extension("exe"), plain]
        } else {
            vec![plain]
        }
    }
}

impl Default for ToolLocator {
    fn default() -> Self {
        Self::new()
    }
}

/// `PATH` lookup for bare names, an executable check for paths
fn executable(tool: &Path) -> Option<PathBuf> {
    which(tool).ok()
}

fn not_found(tool: &Path) -> YtCutError {
    YtCutError::ToolNotFound {
        name: tool.display().to_string(),
    }
}
