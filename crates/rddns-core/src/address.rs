//! Address extraction from interface-inspection output
//!
//! The router is asked for `ip addr show dev <interface>`; the first
//! `inet <dotted-quad>` in the output is taken as the external address.
//! The quad may be followed directly by whitespace or by a `/prefix` length.
//! Secondary addresses and `inet6` lines are ignored.

use crate::error::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static INET_ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"inet\s+((?:[0-9]{1,3}\.){3}[0-9]{1,3})(?:/[0-9]{1,2})?\s")
        .expect("address pattern is valid")
});

/// Build the remote command that prints the configuration of `interface`
pub fn interface_command(interface: &str) -> String {
    format!("ip addr show dev {}", interface)
}

/// Extract the first IPv4 address from `output`
///
/// The match is returned verbatim so that comparisons against record data
/// stay exact string comparisons.
///
/// # Errors
///
/// Returns [`Error::Parse`] when no `inet <address>` pattern is present.
pub fn extract_address(output: &str) -> Result<String> {
    INET_ADDRESS
        .captures(output)
        .and_then(|captures| captures.get(1))
        .map(|address| address.as_str().trim().to_string())
        .ok_or_else(|| Error::parse("no IPv4 address found in interface output"))
}
