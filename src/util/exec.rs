use std::ffi::OsString;
use std::io;
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use anyhow::{anyhow, Context, Result};
use wait_timeout::ChildExt;

/// Subprocess execution for helper tools (version probes, `createrepo_c`) and
/// for the final runtime invocation.
///
/// A zero timeout waits without limit; captured runs pipe stdout/stderr, the
/// others inherit the parent's streams.
#[derive(Debug, Clone)]
pub struct ExecService {
    default_timeout: Duration,
}

impl ExecService {
    pub fn new(default_timeout: Duration) -> Self {
        Self { default_timeout }
    }

    /// Service for interactive children: inherited stdio, no timeout.
    pub fn interactive() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn run(&self, request: ExecRequest) -> Result<ExecOutput> {
        let mut cmd = request.to_command();

        if request.capture_output {
            cmd.stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());
        }

        let mut child = cmd.spawn().with_context(|| {
            format!(
                "failed to spawn {:?} with args {:?}",
                request.program, request.args
            )
        })?;

        // Drain both pipes while the child runs; a full pipe would block it.
        let stdout_reader = child.stdout.take().map(drain);
        let stderr_reader = child.stderr.take().map(drain);

        let started = Instant::now();
        let status = if self.default_timeout.is_zero() {
            child.wait().context("failed to wait for process")?
        } else {
            match child
                .wait_timeout(self.default_timeout)
                .context("failed to wait with timeout")?
            {
                Some(status) => status,
                None => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(anyhow!(
                        "command {:?} timed out after {:?}",
                        request.program,
                        self.default_timeout
                    ));
                }
            }
        };

        let stdout = collect(stdout_reader)?;
        let stderr = collect(stderr_reader)?;

        tracing::debug!(
            program = ?request.program,
            code = ?status.code(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "subprocess finished"
        );

        Ok(ExecOutput {
            status,
            stdout,
            stderr,
        })
    }

    /// Spawn and wait for a child with inherited stdio, returning its raw status.
    ///
    /// Spawn errors keep their io::ErrorKind so callers can map NotFound to 127.
    pub fn status(&self, request: &ExecRequest) -> io::Result<ExitStatus> {
        request.to_command().status()
    }
}

fn drain(mut stream: impl io::Read + Send + 'static) -> JoinHandle<io::Result<String>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf)?;
        Ok(String::from_utf8_lossy(&buf).into_owned())
    })
}

fn collect(reader: Option<JoinHandle<io::Result<String>>>) -> Result<String> {
    match reader {
        Some(handle) => handle
            .join()
            .map_err(|_| anyhow!("output reader thread panicked"))?
            .context("failed to read process output"),
        None => Ok(String::new()),
    }
}

impl Default for ExecService {
    fn default() -> Self {
        Self::new(Duration::from_secs(30))
    }
}

#[derive(Debug, Default, Clone)]
pub struct ExecRequest {
    program: OsString,
    args: Vec<OsString>,
    capture_output: bool,
}

impl ExecRequest {
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn capture_output(mut self, capture: bool) -> Self {
        self.capture_output = capture;
        self
    }

    fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

#[derive(Debug)]
pub struct ExecOutput {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_capture_stdout_and_status() {
        let out = ExecService::default()
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "echo hello; echo oops >&2; exit 3"])
                    .capture_output(true),
            )
            .expect("run sh");
        assert_eq!(out.status.code(), Some(3));
        assert_eq!(out.stdout.trim(), "hello");
        assert_eq!(out.stderr.trim(), "oops");
    }

    #[test]
    fn test_timeout_kills_child() {
        let err = ExecService::new(Duration::from_millis(100))
            .run(ExecRequest::new("sleep").arg("5").capture_output(true))
            .unwrap_err();
        assert!(err.to_string().contains("timed out"), "got: {err}");
    }

    #[test]
    fn test_status_missing_program_is_not_found() {
        let err = ExecService::interactive()
            .status(&ExecRequest::new("xcp-ng-dev-definitely-missing-binary"))
            .unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_large_stderr_does_not_block_the_child() {
        let started = Instant::now();
        let out = ExecService::new(Duration::from_secs(20))
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "head -c 200000 /dev/zero | tr '\\0' x >&2; exit 1"])
                    .capture_output(true),
            )
            .expect("run sh");
        assert_eq!(out.status.code(), Some(1));
        assert_eq!(out.stderr.len(), 200_000);
        assert!(out.stderr.chars().all(|c| c == 'x'));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_zero_timeout_waits_for_completion() {
        let out = ExecService::interactive()
            .run(
                ExecRequest::new("sh")
                    .args(["-c", "sleep 1; echo done"])
                    .capture_output(true),
            )
            .expect("run sh");
        assert!(out.status.success());
        assert_eq!(out.stdout.trim(), "done");
    }
}
