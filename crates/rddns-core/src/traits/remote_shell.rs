// # Remote Shell Trait
//
// Defines the interface for running a command on the router.
//
// ## Implementations
//
// - OpenSSH control-master session: `rddns-shell-ssh` crate
//
// ## Usage
//
// ```rust,ignore
// use rddns_core::traits::{RemoteShell, ShellTarget};
//
// let mut session = shell.connect(&target).await?;
// let output = session.execute("ip addr show dev eth0").await;
// session.close().await?;
// println!("{}", output?.stdout);
// ```

use async_trait::async_trait;
use std::path::PathBuf;

/// Where and as whom to open a remote shell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellTarget {
    /// Host name or address of the router
    pub host: String,
    /// Login name
    pub username: String,
    /// Private key used for authentication
    pub private_key: PathBuf,
}

/// Captured result of a remote command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Standard output, lossily decoded as UTF-8
    pub stdout: String,
    /// Standard error, lossily decoded as UTF-8
    pub stderr: String,
    /// Remote exit code, if the command exited normally
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    /// Whether the remote command reported success
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Factory for authenticated remote shell sessions
///
/// # Thread Safety
///
/// Implementations must be thread-safe and usable across async tasks.
#[async_trait]
pub trait RemoteShell: Send + Sync {
    /// Open an authenticated session to `target`
    ///
    /// # Returns
    ///
    /// - `Ok(session)`: An open session owned by the caller
    /// - `Err(Error::Connection)`: If the host is unreachable or authentication fails
    async fn connect(&self, target: &ShellTarget) -> Result<Box<dyn ShellSession>, crate::Error>;

    /// Get the shell implementation name (for logging/debugging)
    fn shell_name(&self) -> &'static str;
}

/// An open remote shell session
///
/// The session is a scoped resource: whoever obtains it from
/// [`RemoteShell::connect`] must call [`ShellSession::close`], on the error
/// path as well as the success path. Implementations should still release
/// their resources on drop if `close` is never reached.
#[async_trait]
pub trait ShellSession: Send {
    /// Run `command` and capture its output
    ///
    /// A non-zero remote exit code is not an error; it is reported through
    /// [`CommandOutput::exit_code`]. Transport failures are errors.
    ///
    /// A transport may reserve exit codes for itself. The OpenSSH session
    /// reports exit code 255 as a connection error, including when the
    /// remote command itself exited with 255.
    async fn execute(&mut self, command: &str) -> Result<CommandOutput, crate::Error>;

    /// Close the session and release its resources
    async fn close(self: Box<Self>) -> Result<(), crate::Error>;
}
