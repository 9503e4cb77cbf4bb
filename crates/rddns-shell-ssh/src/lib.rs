// # OpenSSH Remote Shell
//
// This crate provides a `RemoteShell` implementation that drives the
// system OpenSSH client.
//
// ## Architecture
//
// `connect()` authenticates once and leaves a control master running in the
// background (`ssh -M -f -N`). Commands are multiplexed over that master
// (`ssh -S <socket>`), and `close()` asks it to exit (`ssh -O exit`).
//
// The control socket and the master's log live in a private temporary
// directory owned by the session. If a session is dropped without
// `close()`, the master is told to exit from `Drop` and the directory is
// removed, so no connection outlives its session.
//
// ## Authentication
//
// Key-based only (`BatchMode=yes`, `IdentitiesOnly=yes`): the client never
// prompts. Unknown host keys are accepted on first contact and pinned
// afterwards (`StrictHostKeyChecking=accept-new`).

use async_trait::async_trait;
use rddns_core::traits::{CommandOutput, RemoteShell, ShellSession, ShellTarget};
use rddns_core::{Error, Result};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tempfile::TempDir;
use tokio::process::Command;

/// Default ssh client binary, resolved through `PATH`
const DEFAULT_SSH_PROGRAM: &str = "ssh";

/// Default TCP connect timeout
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(15);

/// Exit status ssh uses for its own (transport/auth) failures
const SSH_TRANSPORT_FAILURE: i32 = 255;

const SHELL_NAME: &str = "ssh";

/// Remote shell backed by the system OpenSSH client
#[derive(Debug, Clone)]
pub struct SshShell {
    /// ssh client binary
    program: PathBuf,
}

impl Default for SshShell {
    fn default() -> Self {
        Self::new()
    }
}

impl SshShell {
    /// Create a shell using `ssh` from `PATH`
    pub fn new() -> Self {
        Self {
            program: PathBuf::from(DEFAULT_SSH_PROGRAM),
        }
    }

    /// Use a specific ssh client binary
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }
}

#[async_trait]
impl RemoteShell for SshShell {
    async fn connect(&self, target: &ShellTarget) -> Result<Box<dyn ShellSession>> {
        let control_dir = tempfile::Builder::new()
            .prefix("rddns-ssh-")
            .tempdir()
            .map_err(|e| Error::connection(format!("Failed to create control directory: {}", e)))?;
        let control_path = control_dir.path().join("master.sock");
        let log_path = control_dir.path().join("master.log");

        tracing::debug!(
            host = %target.host,
            user = %target.username,
            "Starting ssh control master"
        );

        // -f backgrounds the master once authenticated, so the foreground
        // process exits as soon as the connection is usable (or has failed).
        let status = Command::new(&self.program)
            .args(master_args(
                target,
                &control_path,
                &log_path,
                DEFAULT_CONNECT_TIMEOUT,
            ))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .status()
            .await
            .map_err(|e| {
                Error::connection(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        if !status.success() {
            let log = std::fs::read_to_string(&log_path).unwrap_or_default();
            let detail = match log.trim() {
                "" => format!("ssh exited with {}", status),
                log => log.to_string(),
            };
            return Err(Error::connection(format!(
                "{}@{}: {}",
                target.username, target.host, detail
            )));
        }

        tracing::info!("Connected to {}@{}", target.username, target.host);

        Ok(Box::new(SshSession {
            program: self.program.clone(),
            host: target.host.clone(),
            control_path,
            control_dir,
            closed: false,
        }))
    }

    fn shell_name(&self) -> &'static str {
        SHELL_NAME
    }
}

/// A multiplexed session over a running control master
pub struct SshSession {
    program: PathBuf,
    host: String,
    control_path: PathBuf,
    /// Removed on drop, after the master has exited
    control_dir: TempDir,
    closed: bool,
}

impl std::fmt::Debug for SshSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SshSession")
            .field("host", &self.host)
            .field("control_dir", &self.control_dir.path())
            .field("closed", &self.closed)
            .finish()
    }
}

#[async_trait]
impl ShellSession for SshSession {
    /// Run `command` over the control master
    ///
    /// ssh reserves exit status 255 for its own failures, so a remote command
    /// that itself exits with 255 is reported as a connection error.
    async fn execute(&mut self, command: &str) -> Result<CommandOutput> {
        if self.closed {
            return Err(Error::connection("session already closed"));
        }

        tracing::debug!(host = %self.host, command, "Executing remote command");

        let output = Command::new(&self.program)
            .args(exec_args(&self.control_path, &self.host, command))
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| {
                Error::connection(format!(
                    "Failed to run {}: {}",
                    self.program.display(),
                    e
                ))
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        let exit_code = output.status.code();

        if exit_code == Some(SSH_TRANSPORT_FAILURE) {
            return Err(Error::connection(format!(
                "{}: {}",
                self.host,
                stderr.trim()
            )));
        }

        Ok(CommandOutput {
            stdout,
            stderr,
            exit_code,
        })
    }

    async fn close(mut self: Box<Self>) -> Result<()> {
        self.closed = true;

        let status = Command::new(&self.program)
            .args(exit_args(&self.control_path, &self.host))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await?;

        if !status.success() {
            return Err(Error::connection(format!(
                "ssh control master for {} did not exit cleanly ({})",
                self.host, status
            )));
        }

        tracing::debug!(host = %self.host, "Closed ssh session");
        Ok(())
    }
}

impl Drop for SshSession {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        tracing::warn!(host = %self.host, "ssh session dropped without close, stopping master");
        // Blocks briefly: `-O exit` only talks to the local control socket
        if let Err(e) = stop_master_blocking(&self.program, &self.control_path, &self.host) {
            tracing::warn!(host = %self.host, "Failed to stop ssh control master: {}", e);
        }
    }
}

/// Ask the control master to exit without an async runtime
fn stop_master_blocking(program: &Path, control_path: &Path, host: &str) -> Result<()> {
    let status = std::process::Command::new(program)
        .args(exit_args(control_path, host))
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;

    if !status.success() {
        return Err(Error::connection(format!(
            "ssh control master for {} did not exit cleanly ({})",
            host, status
        )));
    }
    Ok(())
}

/// Arguments that start a backgrounded control master
fn master_args(
    target: &ShellTarget,
    control_path: &Path,
    log_path: &Path,
    connect_timeout: Duration,
) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    args.push("-E".into());
    args.push(log_path.into());
    args.push("-S".into());
    args.push(control_path.into());
    args.extend(
        [
            "-M",
            "-f",
            "-N",
            "-o",
            "ControlPersist=yes",
            "-o",
            "BatchMode=yes",
            "-o",
            "IdentitiesOnly=yes",
            "-o",
            "StrictHostKeyChecking=accept-new",
            "-o",
        ]
        .map(OsString::from),
    );
    args.push(format!("ConnectTimeout={}", connect_timeout.as_secs().max(1)).into());
    args.push("-i".into());
    args.push(target.private_key.as_os_str().to_owned());
    args.push("-l".into());
    args.push(target.username.as_str().into());
    args.push("--".into());
    args.push(target.host.as_str().into());
    args
}

/// Arguments that run `command` over the control master
fn exec_args(control_path: &Path, host: &str, command: &str) -> Vec<OsString> {
    vec![
        "-S".into(),
        control_path.into(),
        "-o".into(),
        "BatchMode=yes".into(),
        "-T".into(),
        "--".into(),
        host.into(),
        command.into(),
    ]
}

/// Arguments that ask the control master to exit
fn exit_args(control_path: &Path, host: &str) -> Vec<OsString> {
    vec![
        "-S".into(),
        control_path.into(),
        "-O".into(),
        "exit".into(),
        "--".into(),
        host.into(),
    ]
}
