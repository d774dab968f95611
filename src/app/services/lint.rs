//! External style-checker runner.
//!
//! The checker is a black box: a configured command with the file path
//! appended. Standard output and standard error are captured and joined into
//! one report. The run is bounded by the configured timeout; a child that
//! outlives it is killed.

use std::io::Read;
use std::path::Path;
use std::process::{Command, ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use crate::app::domain::settings::LintSettings;
use crate::app::infrastructure::error::LintError;

const POLL_INTERVAL: Duration = Duration::from_millis(20);

pub struct StyleChecker {
    settings: LintSettings,
}

impl StyleChecker {
    pub fn new(settings: LintSettings) -> Self {
        Self { settings }
    }

    pub fn forward_empty(&self) -> bool {
        self.settings.forward_empty
    }

    /// Configured command for the file's extension, if any.
    pub fn command_for(&self, path: &Path) -> Option<&[String]> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.settings
            .commands
            .get(&ext)
            .map(Vec::as_slice)
            .filter(|cmd| !cmd.is_empty())
    }

    /// Run the checker for `path`. `None` when no checker is configured for
    /// its extension.
    pub fn check(&self, path: &Path) -> Option<Result<String, LintError>> {
        let command = self.command_for(path)?;
        let timeout = Duration::from_secs(self.settings.timeout_secs);
        tracing::info!(command = ?command, path = %path.display(), "running style check");
        Some(run_with_timeout(command, path, timeout))
    }
}

/// Run `command path`, capturing both output streams, killing the child
/// after `timeout`.
pub fn run_with_timeout(command: &[String], path: &Path, timeout: Duration) -> Result<String, LintError> {
    let (program, args) = command.split_first().ok_or(LintError::EmptyCommand)?;

    let mut child = Command::new(program)
        .args(args)
        .arg(path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|source| LintError::Spawn {
            program: program.clone(),
            source,
        })?;

    let stdout = Capture::start(child.stdout.take());
    let stderr = Capture::start(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                tracing::warn!(program = %program, "style check timed out");
                // Grandchildren may still hold the pipes open, so take what
                // has arrived instead of waiting for the readers.
                return Err(LintError::Timeout {
                    program: program.clone(),
                    secs: timeout.as_secs(),
                    output: joined(stdout.snapshot(), stderr.snapshot()),
                });
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(source) => {
                let _ = child.kill();
                return Err(LintError::Wait {
                    program: program.clone(),
                    source,
                });
            }
        }
    };

    let output = joined(stdout.finish(), stderr.finish());
    if terminated_by_signal(&status) {
        return Err(LintError::Crashed {
            program: program.clone(),
            status: status.to_string(),
            output,
        });
    }
    tracing::debug!(program = %program, %status, bytes = output.len(), "style check finished");
    Ok(output)
}

fn joined(mut stdout: String, stderr: String) -> String {
    stdout.push_str(&stderr);
    stdout
}

/// A checker exiting non-zero just means it found problems; only a missing
/// exit code (killed by a signal) counts as a crash.
fn terminated_by_signal(status: &ExitStatus) -> bool {
    status.code().is_none()
}

/// Drains one pipe on a helper thread into a shared buffer.
struct Capture {
    buffer: Arc<Mutex<Vec<u8>>>,
    reader: Option<thread::JoinHandle<()>>,
}

impl Capture {
    fn start<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let reader = pipe.map(|mut pipe| {
            let sink = Arc::clone(&buffer);
            thread::spawn(move || {
                let mut chunk = [0u8; 4096];
                loop {
                    match pipe.read(&mut chunk) {
                        Ok(0) | Err(_) => break,
                        Ok(n) => {
                            if let Ok(mut buf) = sink.lock() {
                                buf.extend_from_slice(&chunk[..n]);
                            }
                        }
                    }
                }
            })
        });
        Self { buffer, reader }
    }

    fn snapshot(&self) -> String {
        self.buffer
            .lock()
            .map(|buf| String::from_utf8_lossy(&buf).into_owned())
            .unwrap_or_default()
    }

    fn finish(mut self) -> String {
        if let Some(reader) = self.reader.take() {
            let _ = reader.join();
        }
        self.snapshot()
    }
}
