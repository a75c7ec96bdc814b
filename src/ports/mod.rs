// Ports - Interface definitions (contracts)

use std::time::Duration;

use crate::domain::errors::*;
use crate::domain::model::*;
use async_trait::async_trait;

/// One of the two output pipes of a child process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Which child output the caller wants to see
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureMode {
    /// Both pipes, interleaved as chunks arrive
    Merged,
    /// A single pipe; the other one is discarded
    Only(OutputStream),
}

/// How a child process ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitReport {
    /// Exit code, absent when the process was terminated by a signal
    pub code: Option<i32>,
    /// The process exited on its own rather than crashing or being killed
    pub normal_exit: bool,
}

impl ExitReport {
    pub fn success(&self) -> bool {
        self.normal_exit && self.code == Some(0)
    }
}

/// Something observed on a running process
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessEvent {
    /// A decoded chunk of output
    Output { stream: OutputStream, text: String },
    /// Final event, sent after every output chunk was delivered
    Exited(ExitReport),
}

/// Result of a bounded query
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedOutput {
    pub stdout: String,
    pub stderr: String,
    pub exit: ExitReport,
}

/// Port for starting external tools
#[async_trait]
pub trait ToolRunner: Send + Sync {
    /// Start a command and stream its output as events
    async fn launch(
        &self,
        command: &ToolCommand,
        capture: CaptureMode,
    ) -> Result<Box<dyn ProcessHandle>, DomainError>;

    /// Run a short query to completion, giving up after `timeout`
    async fn run_bounded(
        &self,
        command: &ToolCommand,
        timeout: Duration,
    ) -> Result<CapturedOutput, DomainError>;
}

/// Live handle to a launched process
#[async_trait]
pub trait ProcessHandle: Send {
    /// Next event, `None` once `Exited` has been delivered
    async fn next_event(&mut self) -> Option<ProcessEvent>;

    /// Exit report if the process is no longer running
    fn exit_status(&self) -> Option<ExitReport>;

    /// Terminate the process; calling it again has no effect
    fn kill(&mut self);

    /// OS process id while it is known
    fn id(&self) -> Option<u32>;
}

/// Receives session notifications in the order they happen
pub trait SessionObserver: Send {
    fn on_progress(&mut self, event: &ProgressEvent);

    fn on_finished(&mut self, ok: bool, error: Option<&str>);
}
