//! Command implementations

use std::path::Path;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::adapters::AppConfig;
use crate::app::container::{AppContainer, DefaultAppContainer};
use crate::cli::args::{CutArgs, FormatsArgs, InfoArgs};
use crate::domain::errors::DomainError;
use crate::domain::model::*;
use crate::domain::rules::IntervalPolicy;
use crate::engine::progress::{ConsoleProgressObserver, JsonProgressObserver};
use crate::output::writer::OutputWriter;
use crate::output::{OverwritePolicy, StateDump, VideoReport};
use crate::probe::LinkValidator;
use crate::utils::path::PathUtils;

/// Execute the info command
pub async fn info(config: &AppConfig, args: InfoArgs) -> Result<()> {
    let url = LinkValidator::validate(&args.url)?;
    let container = DefaultAppContainer::new(config)?;

    let video = container
        .metadata_resolver()
        .request_info(url.as_str())
        .await
        .context("Failed to resolve video metadata")?;

    let report = VideoReport::new(&video, LinkValidator::start_hint(&url));
    print!("{}", OutputWriter::render_video(&report, args.output)?);
    Ok(())
}

/// Execute the formats command
pub async fn formats(config: &AppConfig, args: FormatsArgs) -> Result<()> {
    let url = LinkValidator::validate(&args.url)?;
    let container = DefaultAppContainer::new(config)?;

    let formats = container
        .metadata_resolver()
        .request_default_formats(url.as_str())
        .await
        .context("Failed to list formats")?;

    print!("{}", OutputWriter::render_formats(&formats));
    Ok(())
}

/// Execute the cut command
pub async fn cut(config: &AppConfig, args: CutArgs) -> Result<()> {
    // Everything that can be checked offline is checked before the tools run
    let url = LinkValidator::validate(&args.url)?;
    let start = CanonicalTime::parse(&args.start).context("Invalid start time")?;
    let end = args
        .end
        .as_deref()
        .map(CanonicalTime::parse)
        .transpose()
        .context("Invalid end time")?;
    let content = ContentSelection::new(!args.no_video, !args.no_audio);
    if content.is_empty() {
        return Err(DomainError::NoContentSelected.into());
    }

    let container = DefaultAppContainer::new(config)?;
    let resolver = container.metadata_resolver();

    let video = resolver
        .request_info(url.as_str())
        .await
        .context("Failed to resolve video metadata")?;
    let interval = Interval::new(start, end.unwrap_or(video.duration));
    IntervalPolicy::validate(&interval, video.duration)?;

    let formats = resolver
        .request_default_formats(url.as_str())
        .await
        .context("Failed to list formats")?;
    let entry = match args.format.as_deref() {
        Some(key) => formats.select(key)?,
        None => formats
            .first()
            .ok_or_else(|| DomainError::UnknownFormat("no formats available".to_string()))?,
    };
    info!("Selected format {}", entry.label);

    let output = args.output.clone().unwrap_or_else(|| {
        PathUtils::suggest_file_name(Path::new("."), &video.title, &entry.format, &interval)
    });
    let policy = if args.force {
        OverwritePolicy::Always
    } else {
        OverwritePolicy::Never
    };
    let writer = OutputWriter::new(policy);
    writer.prepare_output(&output)?;

    if let Some(dump_path) = &args.dump_state {
        let mut dump = StateDump::new(url.as_str(), container.options());
        dump.interval = Some(interval);
        dump.save_path = Some(output.clone());
        dump.format = Some(entry.label.clone());
        dump.content = content;
        writer.write_state_dump(dump_path, &dump)?;
    }

    let request = DownloadRequest {
        output: output.clone(),
        interval,
        format: entry.format.clone(),
        content,
    };

    let mut session = container.new_session(video);
    if args.json {
        session.add_observer(Box::new(JsonProgressObserver::new(interval.length_seconds())));
    } else {
        session.add_observer(Box::new(ConsoleProgressObserver::new(interval.length_seconds())));
    }

    let path = session.start_download(request).await?;
    info!("Download running via {:?}", path);

    match session.wait_finished(ctrl_c()).await {
        Some(SessionEvent::Finished { ok: true, .. }) => {
            info!("Saved {}", output.display());
            Ok(())
        }
        Some(SessionEvent::Finished { ok: false, error }) => {
            let reason = error
                .map(|e| e.trim().to_string())
                .unwrap_or_else(|| "cancelled or exited with an error".to_string());
            Err(anyhow::anyhow!("Download failed: {}", reason))
        }
        _ => Err(anyhow::anyhow!("Download ended without a result")),
    }
}

/// Resolves on Ctrl-C; never resolves where the signal cannot be watched
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
