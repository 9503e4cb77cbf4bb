//! Test doubles and common utilities for synchronization contract tests
//!
//! The doubles keep their state behind `Arc`s so a test can keep a handle
//! after moving the double into the engine.

#![allow(dead_code)]

use rddns_core::error::{Error, Result};
use rddns_core::records::{DomainRecord, RecordId, RecordUpdate};
use rddns_core::traits::{CommandOutput, DnsRegistrar, RemoteShell, ShellSession, ShellTarget};
use rddns_core::SyncConfig;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Interface output for a router whose external address is `address`
pub fn interface_output(address: &str) -> String {
    format!(
        "2: eth0: <BROADCAST,MULTICAST,UP,LOWER_UP> mtu 1500 qdisc fq_codel state UP\n    \
         link/ether 52:54:00:12:34:56 brd ff:ff:ff:ff:ff:ff\n    \
         inet {}/24 brd 203.0.113.255 scope global dynamic eth0\n    \
         inet6 fe80::5054:ff:fe12:3456/64 scope link\n",
        address
    )
}

/// How the mock shell behaves
#[derive(Clone)]
pub enum ShellBehavior {
    /// Every command prints this output
    Output(String),
    /// connect() fails
    RefuseConnection,
    /// execute() fails after connecting
    FailCommand,
}

/// A RemoteShell that records every call
#[derive(Clone)]
pub struct MockShell {
    behavior: ShellBehavior,
    connect_count: Arc<AtomicUsize>,
    close_count: Arc<AtomicUsize>,
    commands: Arc<Mutex<Vec<String>>>,
    targets: Arc<Mutex<Vec<ShellTarget>>>,
}

impl MockShell {
    pub fn new(behavior: ShellBehavior) -> Self {
        Self {
            behavior,
            connect_count: Arc::new(AtomicUsize::new(0)),
            close_count: Arc::new(AtomicUsize::new(0)),
            commands: Arc::new(Mutex::new(Vec::new())),
            targets: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Shell whose router reports `address` on its interface
    pub fn with_address(address: &str) -> Self {
        Self::new(ShellBehavior::Output(interface_output(address)))
    }

    /// Get the number of times connect() succeeded or was attempted
    pub fn connect_count(&self) -> usize {
        self.connect_count.load(Ordering::SeqCst)
    }

    /// Get the number of sessions closed
    pub fn close_count(&self) -> usize {
        self.close_count.load(Ordering::SeqCst)
    }

    /// Commands executed, in order
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }

    /// Targets passed to connect(), in order
    pub fn targets(&self) -> Vec<ShellTarget> {
        self.targets.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl RemoteShell for MockShell {
    async fn connect(&self, target: &ShellTarget) -> Result<Box<dyn ShellSession>> {
        self.connect_count.fetch_add(1, Ordering::SeqCst);
        self.targets.lock().unwrap().push(target.clone());

        if let ShellBehavior::RefuseConnection = self.behavior {
            return Err(Error::connection("Permission denied (publickey)"));
        }

        Ok(Box::new(MockSession {
            shell: self.clone(),
        }))
    }

    fn shell_name(&self) -> &'static str {
        "mock"
    }
}

struct MockSession {
    shell: MockShell,
}

#[async_trait::async_trait]
impl ShellSession for MockSession {
    async fn execute(&mut self, command: &str) -> Result<CommandOutput> {
        self.shell.commands.lock().unwrap().push(command.to_string());

        match &self.shell.behavior {
            ShellBehavior::Output(stdout) => Ok(CommandOutput {
                stdout: stdout.clone(),
                stderr: String::new(),
                exit_code: Some(0),
            }),
            ShellBehavior::FailCommand => Err(Error::connection("connection reset by peer")),
            ShellBehavior::RefuseConnection => unreachable!("session never opened"),
        }
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.shell.close_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// An in-memory registrar whose records change when updated
#[derive(Clone)]
pub struct MockRegistrar {
    records: Arc<Mutex<Vec<DomainRecord>>>,
    failing_ids: Arc<Mutex<HashSet<RecordId>>>,
    list_count: Arc<AtomicUsize>,
    update_count: Arc<AtomicUsize>,
    fail_listing: bool,
}

impl MockRegistrar {
    pub fn new(records: Vec<DomainRecord>) -> Self {
        Self {
            records: Arc::new(Mutex::new(records)),
            failing_ids: Arc::new(Mutex::new(HashSet::new())),
            list_count: Arc::new(AtomicUsize::new(0)),
            update_count: Arc::new(AtomicUsize::new(0)),
            fail_listing: false,
        }
    }

    /// Registrar whose listing endpoint always fails
    pub fn unavailable() -> Self {
        Self {
            fail_listing: true,
            ..Self::new(Vec::new())
        }
    }

    /// Make every update of `id` fail
    pub fn fail_updates_for(&self, id: impl Into<RecordId>) {
        self.failing_ids.lock().unwrap().insert(id.into());
    }

    /// Current published records
    pub fn records(&self) -> Vec<DomainRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Get the number of times list_records() was called
    pub fn list_count(&self) -> usize {
        self.list_count.load(Ordering::SeqCst)
    }

    /// Get the number of times update_record() was called
    pub fn update_count(&self) -> usize {
        self.update_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsRegistrar for MockRegistrar {
    async fn list_records(&self) -> Result<Vec<DomainRecord>> {
        self.list_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing {
            return Err(Error::http("503 Service Unavailable"));
        }
        Ok(self.records())
    }

    async fn update_record(&self, id: &RecordId, update: &RecordUpdate) -> Result<DomainRecord> {
        self.update_count.fetch_add(1, Ordering::SeqCst);

        if self.failing_ids.lock().unwrap().contains(id) {
            return Err(Error::provider("mock", "422 Unprocessable Entity"));
        }

        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|record| record.id == *id)
            .ok_or_else(|| Error::not_found(format!("record {}", id)))?;

        record.record_type = update.record_type.clone();
        record.name = update.name.clone();
        record.data = update.data.clone();

        Ok(record.clone())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A valid configuration plus the key file it points at
///
/// Keep the returned key file alive for as long as the config is used.
pub fn test_config(hostnames: &[&str]) -> (SyncConfig, tempfile::NamedTempFile) {
    let key = tempfile::NamedTempFile::new().expect("create key file");

    let config = SyncConfig {
        domain_name: "example.com".to_string(),
        access_token: "test-token".to_string(),
        router_ip: "192.168.1.1".to_string(),
        router_username: "admin".to_string(),
        ssh_private_key_location: key.path().to_path_buf(),
        router_external_interface_name: "eth0".to_string(),
        hostnames: hostnames.iter().map(|h| h.to_string()).collect(),
    };

    (config, key)
}
