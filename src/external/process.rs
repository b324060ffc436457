use crate::parser::ExecutionFailure;
use std::io::{self, Read, Write};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// How often a running process is polled for exit / timeout / cancellation
const POLL_INTERVAL: Duration = Duration::from_millis(5);

/// How long output readers may keep draining once the process is gone
const PIPE_GRACE: Duration = Duration::from_millis(500);

/// Cooperative cancellation flag shared with an in-flight parse
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What the caller gets back from a finished process
#[derive(Debug)]
pub(crate) struct ProcessOutput {
    pub status: ExitStatus,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

/// Why a run ended without a normal exit
#[derive(Debug)]
pub(crate) enum RunError {
    Failed {
        failure: ExecutionFailure,
        stderr: Vec<u8>,
    },
    Cancelled,
}

impl RunError {
    fn io(context: &str, e: io::Error) -> Self {
        RunError::Failed {
            failure: ExecutionFailure::Io(format!("{}: {}", context, e)),
            stderr: Vec::new(),
        }
    }
}

/// Owns the child process; dropping it kills and reaps a process still running.
///
/// On unix the child leads its own process group, so helpers it starts
/// (a shell wrapper around the real segmenter) are killed along with it.
struct ChildGuard {
    child: Child,
    reaped: bool,
}

impl ChildGuard {
    /// SIGKILL every process in the child's group
    fn kill_group(&self) {
        #[cfg(unix)]
        {
            let Ok(pgid) = libc::pid_t::try_from(self.child.id()) else {
                return;
            };
            // SAFETY: kill(2) only sends a signal; a negative pid addresses the group
            if unsafe { libc::kill(-pgid, libc::SIGKILL) } != 0 {
                debug!(error = %io::Error::last_os_error(), "process group already gone");
            }
        }
    }

    fn kill(&mut self) {
        if self.reaped {
            return;
        }
        self.kill_group();
        if let Err(e) = self.child.kill() {
            debug!(error = %e, "kill failed, process probably exited");
        }
        if let Err(e) = self.child.wait() {
            warn!(error = %e, "failed to reap external parser process");
        }
        self.reaped = true;
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        self.kill();
    }
}

/// Scoped resources for one invocation: the optional temp file lives
/// exactly as long as this value, so it is removed on every exit path
pub(crate) struct Invocation<'a> {
    binary: &'a Path,
    args: Vec<String>,
    stdin: Option<Vec<u8>>,
    _input_file: Option<NamedTempFile>,
}

impl<'a> Invocation<'a> {
    /// Text goes to stdin
    pub fn stdin(binary: &'a Path, args: &[String], text: &str) -> Self {
        Self {
            binary,
            args: args.to_vec(),
            stdin: Some(text.as_bytes().to_vec()),
            _input_file: None,
        }
    }

    /// Text goes to a fresh temp file whose path is appended as the last argument
    pub fn file(binary: &'a Path, args: &[String], text: &str) -> Result<Self, RunError> {
        let mut file =
            NamedTempFile::new().map_err(|e| RunError::io("failed to create temp file", e))?;
        file.write_all(text.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|e| RunError::io("failed to write temp file", e))?;

        let mut args = args.to_vec();
        args.push(file.path().to_string_lossy().into_owned());

        Ok(Self {
            binary,
            args,
            stdin: None,
            _input_file: Some(file),
        })
    }

    /// Path of the temp input file, if any
    #[cfg(test)]
    pub fn input_path(&self) -> Option<&Path> {
        self._input_file.as_ref().map(|f| f.path())
    }

    /// Spawn, feed input, and wait with a hard timeout
    pub fn run(&self, timeout: Duration, cancel: &CancelToken) -> Result<ProcessOutput, RunError> {
        let mut command = Command::new(self.binary);
        command
            .args(&self.args)
            .stdin(if self.stdin.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        let child = command.spawn().map_err(|e| RunError::Failed {
            failure: ExecutionFailure::Spawn(e.to_string()),
            stderr: Vec::new(),
        })?;
        let mut guard = ChildGuard {
            child,
            reaped: false,
        };
        debug!(binary = %self.binary.display(), pid = guard.child.id(), "spawned external parser");

        // Feed stdin from its own thread so a chatty process cannot deadlock us.
        // The thread is detached: it ends when the pipe closes.
        if let (Some(mut pipe), Some(payload)) = (guard.child.stdin.take(), &self.stdin) {
            let payload = payload.clone();
            thread::spawn(move || match pipe.write_all(&payload) {
                Err(e) if e.kind() != io::ErrorKind::BrokenPipe => {
                    debug!(error = %e, "failed to write stdin to external parser");
                }
                _ => {}
            });
        }
        let mut stdout = Drain::spawn(guard.child.stdout.take());
        let mut stderr = Drain::spawn(guard.child.stderr.take());

        let started = Instant::now();
        let outcome = loop {
            match guard.child.try_wait() {
                Ok(Some(status)) => {
                    guard.reaped = true;
                    break Ok(status);
                }
                Ok(None) => {}
                Err(e) => break Err(RunError::io("failed to poll process", e)),
            }
            if cancel.is_cancelled() {
                guard.kill();
                break Err(RunError::Cancelled);
            }
            if started.elapsed() >= timeout {
                warn!(binary = %self.binary.display(), ?timeout, "external parser timed out");
                guard.kill();
                break Err(RunError::Failed {
                    failure: ExecutionFailure::TimedOut(timeout),
                    stderr: Vec::new(),
                });
            }
            thread::sleep(POLL_INTERVAL);
        };
        // Reap before collecting output so the pipes close
        guard.kill();

        let mut complete = finish_pipes(&mut stdout, &mut stderr);
        if !complete {
            // Something the binary started still holds stdout/stderr
            warn!(binary = %self.binary.display(), "external parser left processes holding its output");
            guard.kill_group();
            complete = finish_pipes(&mut stdout, &mut stderr);
        }
        let stderr = stderr.into_bytes();

        match outcome {
            Ok(_) if !complete => Err(RunError::Failed {
                failure: ExecutionFailure::Io("output pipes still open after exit".to_string()),
                stderr,
            }),
            Ok(status) => Ok(ProcessOutput {
                status,
                stdout: stdout.into_bytes(),
                stderr,
            }),
            Err(RunError::Failed { failure, .. }) => Err(RunError::Failed { failure, stderr }),
            Err(RunError::Cancelled) => Err(RunError::Cancelled),
        }
    }
}

/// Wait a bounded time for both readers; true when both reached EOF
fn finish_pipes(stdout: &mut Drain, stderr: &mut Drain) -> bool {
    let deadline = Instant::now() + PIPE_GRACE;
    let out = stdout.finish_by(deadline);
    let err = stderr.finish_by(deadline);
    out && err
}

/// Output pipe read to EOF on a detached thread
struct Drain {
    rx: Option<Receiver<Vec<u8>>>,
    buf: Option<Vec<u8>>,
}

impl Drain {
    fn spawn<R: Read + Send + 'static>(pipe: Option<R>) -> Self {
        let Some(mut pipe) = pipe else {
            return Self {
                rx: None,
                buf: Some(Vec::new()),
            };
        };

        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut buf = Vec::new();
            if let Err(e) = pipe.read_to_end(&mut buf) {
                debug!(error = %e, "failed to read external parser output");
            }
            // The run may have given up on this pipe already
            let _ = tx.send(buf);
        });

        Self {
            rx: Some(rx),
            buf: None,
        }
    }

    fn finish_by(&mut self, deadline: Instant) -> bool {
        if self.buf.is_some() {
            return true;
        }
        let Some(rx) = &self.rx else {
            return true;
        };
        match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            Ok(buf) => self.buf = Some(buf),
            Err(RecvTimeoutError::Timeout) => return false,
            Err(RecvTimeoutError::Disconnected) => self.buf = Some(Vec::new()),
        }
        true
    }

    /// Whatever was collected; empty if the reader never finished
    fn into_bytes(self) -> Vec<u8> {
        self.buf.unwrap_or_default()
    }
}
