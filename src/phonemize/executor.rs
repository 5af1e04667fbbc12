//! Subprocess execution behind a trait so backends can be tested without
//! external binaries.

use crate::error::{PhonorateError, Result};
use std::io::{Read, Write};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(5);
/// Minimum time granted to the pipe readers after the child exits under a timeout.
const PIPE_DRAIN_GRACE: Duration = Duration::from_millis(100);

/// Trait for executing system commands.
///
/// Object-safe, Send + Sync for use in concurrent contexts.
pub trait CommandExecutor: Send + Sync {
    /// Execute a command with arguments, optionally feeding `stdin`.
    ///
    /// Returns the stdout of the command on success.
    /// Returns an error if the command fails, is not found, or times out.
    fn execute(&self, command: &str, args: &[&str], stdin: Option<&str>) -> Result<String>;
}

/// Production command executor using std::process::Command.
#[derive(Debug, Clone, Default)]
pub struct SystemCommandExecutor {
    timeout: Option<Duration>,
}

impl SystemCommandExecutor {
    pub fn new() -> Self {
        Self { timeout: None }
    }

    /// Kill the child and fail if it runs longer than `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

impl CommandExecutor for SystemCommandExecutor {
    fn execute(&self, command: &str, args: &[&str], stdin: Option<&str>) -> Result<String> {
        let mut child = Command::new(command)
            .args(args)
            .stdin(if stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PhonorateError::PhonemizerNotFound {
                        binary: command.to_string(),
                    }
                } else {
                    PhonorateError::CommandFailed {
                        command: command.to_string(),
                        message: format!("failed to spawn: {}", e),
                    }
                }
            })?;

        // Stdin is written on its own thread while stdout drains.
        if let (Some(input), Some(mut pipe)) = (stdin, child.stdin.take()) {
            let input = input.to_string();
            thread::spawn(move || {
                pipe.write_all(input.as_bytes()).ok();
            });
        }

        let stdout_rx = drain(child.stdout.take());
        let stderr_rx = drain(child.stderr.take());

        let started_at = Instant::now();
        let status = wait_with_timeout(&mut child, command, started_at, self.timeout)?;
        let stdout = collect(&stdout_rx, command, started_at, self.timeout)?;
        let stderr = collect(&stderr_rx, command, started_at, self.timeout)?;

        if !status.success() {
            return Err(PhonorateError::CommandFailed {
                command: command.to_string(),
                message: format!(
                    "exited with {}: {}",
                    status,
                    String::from_utf8_lossy(&stderr).trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&stdout).to_string())
    }
}

fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<Vec<u8>> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = Vec::new();
            pipe.read_to_end(&mut buf).ok();
            tx.send(buf).ok();
        });
    }
    rx
}

/// Wait for a reader thread to hit EOF.
///
/// Without a timeout this blocks until every holder of the pipe (including
/// grandchildren) closes it. With a timeout the readers get whatever budget
/// is left, never less than [`PIPE_DRAIN_GRACE`].
fn collect(
    rx: &mpsc::Receiver<Vec<u8>>,
    command: &str,
    started_at: Instant,
    timeout: Option<Duration>,
) -> Result<Vec<u8>> {
    let Some(limit) = timeout else {
        return Ok(rx.recv().unwrap_or_default());
    };

    let remaining = limit
        .saturating_sub(started_at.elapsed())
        .max(PIPE_DRAIN_GRACE);
    match rx.recv_timeout(remaining) {
        Ok(buf) => Ok(buf),
        Err(RecvTimeoutError::Disconnected) => Ok(Vec::new()),
        Err(RecvTimeoutError::Timeout) => Err(timed_out(command, limit)),
    }
}

fn timed_out(command: &str, limit: Duration) -> PhonorateError {
    PhonorateError::PhonemizerTimeout {
        binary: command.to_string(),
        timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
    }
}

fn wait_with_timeout(
    child: &mut Child,
    command: &str,
    started_at: Instant,
    timeout: Option<Duration>,
) -> Result<std::process::ExitStatus> {
    let Some(limit) = timeout else {
        return Ok(child.wait()?);
    };

    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(status);
        }
        if started_at.elapsed() >= limit {
            child.kill().ok();
            child.wait().ok();
            return Err(timed_out(command, limit));
        }
        thread::sleep(POLL_INTERVAL);
    }
}
