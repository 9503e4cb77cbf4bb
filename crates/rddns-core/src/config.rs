//! Configuration types for the synchronizer
//!
//! Configuration is a JSON document loaded once at startup and never
//! mutated afterwards:
//!
//! ```json
//! {
//!   "domainName": "example.com",
//!   "accessToken": "dop_v1_...",
//!   "routerIP": "192.168.1.1",
//!   "routerUsername": "admin",
//!   "sshPrivateKeyLocation": "/home/me/.ssh/id_ed25519",
//!   "routerExternalInterfaceName": "eth0",
//!   "hostnames": ["@", "www"]
//! }
//! ```
//!
//! Hostnames are compared verbatim with the record names the registrar
//! reports. DigitalOcean reports names relative to the domain, with `@` for
//! the apex, so `www.example.com` is configured as `www`.

use crate::error::{Error, Result};
use crate::traits::ShellTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Default location of the configuration file, relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "./config/config.json";

/// Linux caps interface names at 15 bytes (IFNAMSIZ - 1)
const MAX_INTERFACE_NAME_LEN: usize = 15;

/// Main synchronizer configuration
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncConfig {
    /// Registrar domain that owns the records
    pub domain_name: String,

    /// Registrar API bearer token
    /// ⚠️ NEVER log this value
    pub access_token: String,

    /// Router address for the remote shell
    #[serde(rename = "routerIP")]
    pub router_ip: String,

    /// Remote shell login
    pub router_username: String,

    /// Private key used to authenticate against the router
    pub ssh_private_key_location: PathBuf,

    /// Interface whose address is published (e.g. "eth0", "ppp0")
    pub router_external_interface_name: String,

    /// Record names to keep in sync, in order, as the registrar names them
    pub hostnames: Vec<String>,
}

// Custom Debug implementation that hides the access token
impl fmt::Debug for SyncConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncConfig")
            .field("domain_name", &self.domain_name)
            .field("access_token", &"<REDACTED>")
            .field("router_ip", &self.router_ip)
            .field("router_username", &self.router_username)
            .field("ssh_private_key_location", &self.ssh_private_key_location)
            .field(
                "router_external_interface_name",
                &self.router_external_interface_name,
            )
            .field("hostnames", &self.hostnames)
            .finish()
    }
}

impl SyncConfig {
    /// Load configuration from a JSON file
    ///
    /// The result is not validated; call [`SyncConfig::validate`] before use.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "unable to read the config file {}: {}",
                path.display(),
                e
            ))
        })?;
        serde_json::from_str(&contents)
            .map_err(|e| Error::config(format!("invalid config {}: {}", path.display(), e)))
    }

    /// Parse configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| Error::config(format!("invalid config: {}", e)))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.domain_name.trim().is_empty() {
            return Err(Error::config("domainName cannot be empty"));
        }
        if self.access_token.trim().is_empty() {
            return Err(Error::config("accessToken cannot be empty"));
        }
        if self.router_ip.trim().is_empty() {
            return Err(Error::config("routerIP cannot be empty"));
        }
        if self.router_username.trim().is_empty() {
            return Err(Error::config("routerUsername cannot be empty"));
        }

        if !self.ssh_private_key_location.is_file() {
            return Err(Error::config(format!(
                "sshPrivateKeyLocation does not point to a file: {}",
                self.ssh_private_key_location.display()
            )));
        }

        validate_interface_name(&self.router_external_interface_name)?;

        if self.hostnames.is_empty() {
            return Err(Error::config("hostnames must contain at least one entry"));
        }

        let mut seen = HashSet::new();
        for hostname in &self.hostnames {
            if hostname.trim().is_empty() {
                return Err(Error::config("hostnames cannot contain empty entries"));
            }
            if !seen.insert(hostname.as_str()) {
                return Err(Error::config(format!("duplicate hostname: {}", hostname)));
            }
        }

        Ok(())
    }

    /// Remote shell coordinates for the router
    pub fn shell_target(&self) -> ShellTarget {
        ShellTarget {
            host: self.router_ip.clone(),
            username: self.router_username.clone(),
            private_key: self.ssh_private_key_location.clone(),
        }
    }
}

/// Interface names end up on a remote command line, so only plain
/// device-name characters are accepted.
fn validate_interface_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::config(
            "routerExternalInterfaceName cannot be empty",
        ));
    }

    if name.len() > MAX_INTERFACE_NAME_LEN {
        return Err(Error::config(format!(
            "routerExternalInterfaceName too long: {} chars (max {})",
            name.len(),
            MAX_INTERFACE_NAME_LEN
        )));
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '@' | '-'))
    {
        return Err(Error::config(format!(
            "routerExternalInterfaceName contains invalid characters: '{}'",
            name
        )));
    }

    Ok(())
}
