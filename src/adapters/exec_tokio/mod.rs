//! Process execution adapter
//!
//! Runs the external tools as tokio child processes. Output is read in raw
//! chunks rather than lines, since progress updates from the tools are often
//! terminated by a carriage return only.

use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::errors::*;
use crate::domain::model::*;
use crate::ports::*;

const READ_BUFFER_SIZE: usize = 8192;

/// Upper bound for draining pipes after the child exited (grandchildren may keep them open)
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

/// Tool runner backed by `tokio::process`
#[derive(Debug, Clone, Default)]
pub struct TokioToolRunner;

impl TokioToolRunner {
    pub fn new() -> Self {
        Self
    }

    fn command(command: &ToolCommand) -> Command {
        let mut cmd = Command::new(&command.program);
        cmd.args(&command.args)
            .stdin(Stdio::null())
            .kill_on_drop(true);
        cmd
    }
}

#[async_trait]
impl ToolRunner for TokioToolRunner {
    async fn launch(
        &self,
        command: &ToolCommand,
        capture: CaptureMode,
    ) -> Result<Box<dyn ProcessHandle>, DomainError> {
        let (stdout, stderr) = match capture {
            CaptureMode::Merged => (Stdio::piped(), Stdio::piped()),
            CaptureMode::Only(OutputStream::Stdout) => (Stdio::piped(), Stdio::null()),
            CaptureMode::Only(OutputStream::Stderr) => (Stdio::null(), Stdio::piped()),
        };

        let mut cmd = Self::command(command);
        cmd.stdout(stdout).stderr(stderr);

        debug!("Launching: {}", command);
        let mut child = cmd.spawn().map_err(|e| DomainError::LaunchFailed {
            command: command.command_line(),
            message: e.to_string(),
        })?;
        let pid = child.id();

        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let mut readers = Vec::new();
        if let Some(out) = child.stdout.take() {
            readers.push(tokio::spawn(pump_output(out, OutputStream::Stdout, events_tx.clone())));
        }
        if let Some(err) = child.stderr.take() {
            readers.push(tokio::spawn(pump_output(err, OutputStream::Stderr, events_tx.clone())));
        }

        let (kill_tx, kill_rx) = oneshot::channel();
        let exit = Arc::new(OnceLock::new());
        tokio::spawn(supervise(child, kill_rx, readers, Arc::clone(&exit), events_tx));

        Ok(Box::new(TokioProcessHandle {
            events: events_rx,
            kill: Some(kill_tx),
            exit,
            pid,
            exited: false,
        }))
    }

    async fn run_bounded(
        &self,
        command: &ToolCommand,
        timeout: Duration,
    ) -> Result<CapturedOutput, DomainError> {
        let mut cmd = Self::command(command);
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        debug!("Running with {:?} timeout: {}", timeout, command);
        let child = cmd.spawn().map_err(|e| DomainError::LaunchFailed {
            command: command.command_line(),
            message: e.to_string(),
        })?;

        // On expiry the child future is dropped, which kills the process
        match tokio::time::timeout(timeout, child.wait_with_output()).await {
            Ok(Ok(output)) => Ok(CapturedOutput {
                stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit: exit_report(output.status),
            }),
            Ok(Err(e)) => Err(DomainError::ProcessFailed {
                command: command.command_line(),
                message: e.to_string(),
            }),
            Err(_) => Err(DomainError::ProcessTimeout {
                command: command.command_line(),
            }),
        }
    }
}

/// Handle to a process started by [`TokioToolRunner::launch`]
pub struct TokioProcessHandle {
    events: mpsc::UnboundedReceiver<ProcessEvent>,
    kill: Option<oneshot::Sender<()>>,
    exit: Arc<OnceLock<ExitReport>>,
    pid: Option<u32>,
    exited: bool,
}

#[async_trait]
impl ProcessHandle for TokioProcessHandle {
    async fn next_event(&mut self) -> Option<ProcessEvent> {
        if self.exited {
            return None;
        }
        let event = self.events.recv().await;
        if matches!(event, Some(ProcessEvent::Exited(_)) | None) {
            self.exited = true;
        }
        event
    }

    fn exit_status(&self) -> Option<ExitReport> {
        self.exit.get().copied()
    }

    fn kill(&mut self) {
        if let Some(kill) = self.kill.take() {
            debug!("Killing process {:?}", self.pid);
            let _ = kill.send(());
        }
    }

    fn id(&self) -> Option<u32> {
        self.pid
    }
}

/// Wait for exit (or a kill request), then report it after the output is drained
async fn supervise(
    mut child: Child,
    kill_rx: oneshot::Receiver<()>,
    readers: Vec<JoinHandle<()>>,
    exit: Arc<OnceLock<ExitReport>>,
    events: mpsc::UnboundedSender<ProcessEvent>,
) {
    // A dropped handle closes the channel and counts as a kill request
    let status = tokio::select! {
        status = child.wait() => status,
        _ = kill_rx => {
            if let Err(e) = child.start_kill() {
                warn!("Failed to kill child process: {}", e);
            }
            child.wait().await
        }
    };

    let report = match status {
        Ok(status) => exit_report(status),
        Err(e) => {
            warn!("Failed to wait for child process: {}", e);
            ExitReport {
                code: None,
                normal_exit: false,
            }
        }
    };
    let _ = exit.set(report);

    let deadline = tokio::time::Instant::now() + DRAIN_TIMEOUT;
    for reader in readers {
        let abort = reader.abort_handle();
        if tokio::time::timeout_at(deadline, reader).await.is_err() {
            warn!("Output pipe still open after exit, dropping the rest");
            abort.abort();
        }
    }

    let _ = events.send(ProcessEvent::Exited(report));
}

/// Forward decoded chunks of one pipe until it closes
async fn pump_output<R>(mut reader: R, stream: OutputStream, events: mpsc::UnboundedSender<ProcessEvent>)
where
    R: AsyncRead + Unpin,
{
    let mut buffer = vec![0u8; READ_BUFFER_SIZE];
    let mut decoder = ChunkDecoder::default();

    loop {
        match reader.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                let text = decoder.decode(&buffer[..n]);
                if !text.is_empty() && events.send(ProcessEvent::Output { stream, text }).is_err() {
                    return;
                }
            }
            Err(e) => {
                warn!("Error reading {:?}: {}", stream, e);
                break;
            }
        }
    }

    if let Some(text) = decoder.finish() {
        let _ = events.send(ProcessEvent::Output { stream, text });
    }
}

fn exit_report(status: ExitStatus) -> ExitReport {
    let code = status.code();
    ExitReport {
        code,
        normal_exit: code.is_some(),
    }
}

/// Lossy UTF-8 decoding that keeps a character split across reads intact
#[derive(Debug, Default)]
struct ChunkDecoder {
    pending: Vec<u8>,
}

impl ChunkDecoder {
    fn decode(&mut self, bytes: &[u8]) -> String {
        self.pending.extend_from_slice(bytes);
        let split = complete_prefix_len(&self.pending);
        let tail = self.pending.split_off(split);
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending = tail;
        text
    }

    fn finish(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            return None;
        }
        let text = String::from_utf8_lossy(&self.pending).into_owned();
        self.pending.clear();
        Some(text)
    }
}

/// Length of `bytes` without a trailing, still incomplete, UTF-8 sequence
fn complete_prefix_len(bytes: &[u8]) -> usize {
    let len = bytes.len();
    for back in 1..=len.min(4) {
        let byte = bytes[len - back];
        if byte & 0xC0 == 0x80 {
            continue;
        }
        let needed = match byte {
            0xF0..=0xFF => 4,
            0xE0..=0xEF => 3,
            0xC0..=0xDF => 2,
            _ => 1,
        };
        return if needed > back { len - back } else { len };
    }
    len
}
