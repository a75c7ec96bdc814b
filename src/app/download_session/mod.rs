// Download session - Runs one download job at a time and reports its progress

use std::future::Future;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::domain::rules::DownloadPlanner;
use crate::engine::progress::{ChunkReading, ProgressParser};
use crate::ports::*;

/// State machine around a single external download process
pub struct DownloadSession {
    runner: Arc<dyn ToolRunner>,
    tools: ToolPaths,
    options: ToolOptions,
    video: VideoRef,
    state: SessionState,
    handle: Option<Box<dyn ProcessHandle>>,
    unit: ProgressUnit,
    clip_seconds: u64,
    pending_error: Option<String>,
    observers: Vec<Box<dyn SessionObserver>>,
}

impl DownloadSession {
    pub fn new(
        runner: Arc<dyn ToolRunner>,
        tools: ToolPaths,
        options: ToolOptions,
        video: VideoRef,
    ) -> Self {
        Self {
            runner,
            tools,
            options,
            video,
            state: SessionState::Idle,
            handle: None,
            unit: ProgressUnit::Seconds,
            clip_seconds: 0,
            pending_error: None,
            observers: Vec::new(),
        }
    }

    /// Register an observer; observers are notified in registration order
    pub fn add_observer(&mut self, observer: Box<dyn SessionObserver>) {
        self.observers.push(observer);
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn video(&self) -> &VideoRef {
        &self.video
    }

    /// Unit of the progress values of the current (or last) job
    pub fn progress_unit(&self) -> ProgressUnit {
        self.unit
    }

    /// Length of the clip being produced, in seconds
    pub fn clip_seconds(&self) -> u64 {
        self.clip_seconds
    }

    /// Plan and launch a job. Nothing is started when the request is invalid.
    pub async fn start_download(&mut self, request: DownloadRequest) -> Result<DownloadPath, DomainError> {
        if self.state.is_busy() {
            return Err(DomainError::InvalidState(
                "a download is already in progress".to_string(),
            ));
        }
        self.state = SessionState::Idle;

        let plan = DownloadPlanner::new(&self.tools, &self.options).plan(&self.video, &request)?;

        self.state = SessionState::Requesting;
        self.pending_error = None;
        info!(
            "Starting {:?} download of {} to {}",
            plan.path,
            request.interval,
            request.output.display()
        );
        debug!("Command: {}", plan.command);

        match self.runner.launch(&plan.command, CaptureMode::Merged).await {
            Ok(handle) => {
                self.handle = Some(handle);
                self.unit = plan.unit;
                self.clip_seconds = request.interval.length_seconds();
                self.state = SessionState::Running;
                Ok(plan.path)
            }
            Err(e) => {
                warn!("Failed to launch download: {}", e);
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    /// Pump process output until the next progress or finish event.
    ///
    /// Returns `None` when no job is attached.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        loop {
            let event = match self.handle.as_mut() {
                Some(handle) => handle.next_event().await,
                None => return None,
            };

            match event {
                Some(ProcessEvent::Output { text, .. }) => {
                    debug!("{}", text.trim_end());
                    match ProgressParser::read_chunk(&text) {
                        ChunkReading::Progress(progress) => {
                            for observer in &mut self.observers {
                                observer.on_progress(&progress);
                            }
                            return Some(SessionEvent::Progress(progress));
                        }
                        ChunkReading::Error(text) => self.pending_error = Some(text),
                        ChunkReading::Ignored => {}
                    }
                }
                Some(ProcessEvent::Exited(report)) => return Some(self.finish(report)),
                None => {
                    let report = self
                        .handle
                        .as_ref()
                        .and_then(|handle| handle.exit_status())
                        .unwrap_or(ExitReport {
                            code: None,
                            normal_exit: false,
                        });
                    return Some(self.finish(report));
                }
            }
        }
    }

    /// Stop the running job.
    ///
    /// When the process already exited, the job finishes right away and the
    /// `Finished` event is returned. Otherwise the process is killed and the
    /// event arrives through [`next_event`](Self::next_event).
    pub fn cancel(&mut self) -> Option<SessionEvent> {
        if !matches!(self.state, SessionState::Running | SessionState::Cancelling) {
            return None;
        }

        let exited = self.handle.as_ref().and_then(|handle| handle.exit_status());
        if let Some(report) = exited {
            return Some(self.finish(report));
        }

        if let Some(handle) = self.handle.as_mut() {
            info!("Cancelling download");
            handle.kill();
            self.state = SessionState::Cancelling;
        }
        None
    }

    /// Drive the job to its end, cancelling it once `cancel` resolves
    pub async fn wait_finished<F>(&mut self, cancel: F) -> Option<SessionEvent>
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(cancel);
        let mut cancel_requested = false;

        loop {
            let event = if cancel_requested {
                self.next_event().await
            } else {
                tokio::select! {
                    event = self.next_event() => event,
                    _ = &mut cancel => {
                        cancel_requested = true;
                        match self.cancel() {
                            Some(finished) => return Some(finished),
                            None => continue,
                        }
                    }
                }
            };

            match event {
                Some(finished @ SessionEvent::Finished { .. }) => return Some(finished),
                Some(SessionEvent::Progress(_)) => {}
                None => return None,
            }
        }
    }

    fn finish(&mut self, report: ExitReport) -> SessionEvent {
        self.handle = None;
        let ok = report.success();
        let pending = self.pending_error.take();
        let error = if ok { None } else { pending };

        if ok {
            info!("Download finished");
        } else {
            warn!(
                "Download failed (exit code {:?}, normal exit {})",
                report.code, report.normal_exit
            );
        }

        for observer in &mut self.observers {
            observer.on_finished(ok, error.as_deref());
        }
        self.state = SessionState::Finished {
            ok,
            error: error.clone(),
        };
        SessionEvent::Finished { ok, error }
    }
}
