//! Core traits for the synchronizer
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RemoteShell`] / [`ShellSession`]: Run the interface-inspection command on the router
//! - [`DnsRegistrar`]: List and update DNS records via a registrar API

pub mod registrar;
pub mod remote_shell;

pub use registrar::DnsRegistrar;
pub use remote_shell::{CommandOutput, RemoteShell, ShellSession, ShellTarget};
