//! Synchronization engine
//!
//! The SyncEngine runs one synchronization pass:
//! - Reads the router's interface configuration via RemoteShell
//! - Extracts the current external address
//! - Lists the domain's records via DnsRegistrar
//! - Reconciles them against the configured hostnames
//! - Fans out corrective updates when anything drifted
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ip addr show   ┌──────────────┐   list / update   ┌──────────────┐
//! │ RemoteShell │ ───────────────▶ │  SyncEngine  │ ────────────────▶ │ DnsRegistrar │
//! └─────────────┘                  └──────────────┘                   └──────────────┘
//!                                         │
//!                                         ▼
//!                                  ┌─────────────┐
//!                                  │   Events    │
//!                                  │  (notify)   │
//!                                  └─────────────┘
//! ```
//!
//! ## Flow
//!
//! 1. Open a shell session, run the inspection command, close the session
//! 2. Extract the address from the command output
//! 3. Fetch the domain's records
//! 4. Reconcile; stop with `AllRecordsGood` if nothing drifted
//! 5. Update stale records concurrently and report the aggregate outcome

use crate::address::{extract_address, interface_command};
use crate::config::SyncConfig;
use crate::error::Result;
use crate::reconcile::find_mismatched_records;
use crate::traits::{DnsRegistrar, RemoteShell, ShellTarget};
use crate::updater::{UpdateOutcome, apply_updates};
use std::fmt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, info, warn};

/// Default capacity of the engine event channel
pub const DEFAULT_EVENT_CHANNEL_CAPACITY: usize = 64;

/// Final result of a synchronization pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// Every target record already held the current address
    AllRecordsGood,

    /// Every stale record was updated and confirmed
    AllRecordsFixed {
        /// Number of records updated
        updated: usize,
    },

    /// At least one stale record could not be confirmed
    UnableToFixAll {
        /// Number of updates attempted
        attempted: usize,
        /// Number of updates not confirmed
        failed: usize,
    },
}

impl SyncOutcome {
    /// Human-readable status line for this outcome
    pub fn message(&self) -> &'static str {
        match self {
            SyncOutcome::AllRecordsGood => "All records good! Nothing to do.",
            SyncOutcome::AllRecordsFixed { .. } => "All records fixed",
            SyncOutcome::UnableToFixAll { .. } => "Unable to fix all the records",
        }
    }

    /// Whether the published records match the address after this pass
    pub fn is_success(&self) -> bool {
        !matches!(self, SyncOutcome::UnableToFixAll { .. })
    }
}

impl fmt::Display for SyncOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Events emitted by the SyncEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncEvent {
    /// Current external address read from the router
    AddressDetected { address: String },

    /// Records listed from the registrar
    RecordsFetched { count: usize },

    /// A target record holds stale data
    MismatchFound {
        name: String,
        published: String,
        address: String,
    },

    /// A record update was confirmed
    RecordUpdated { name: String, address: String },

    /// A record update failed or was not confirmed
    RecordUpdateFailed { record_id: String, error: String },

    /// The pass finished
    Finished { outcome: SyncOutcome },
}

/// Core synchronization engine
///
/// ## Lifecycle
///
/// 1. Create with [`SyncEngine::new()`]
/// 2. Call [`SyncEngine::run()`] once per synchronization pass
/// 3. Drop to cleanup
///
/// The engine keeps no state between passes; running it twice against
/// unchanged external state is a no-op the second time.
pub struct SyncEngine {
    /// Remote shell used to inspect the router
    shell: Box<dyn RemoteShell>,

    /// Registrar holding the domain's records
    registrar: Box<dyn DnsRegistrar>,

    /// Router login coordinates
    target: ShellTarget,

    /// Interface whose address is published
    interface: String,

    /// Record names to keep in sync
    hostnames: Vec<String>,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<SyncEvent>,
}

impl SyncEngine {
    /// Create a new synchronization engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// The receiver may be dropped if events are not needed.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] if `config` fails validation.
    pub fn new(
        shell: Box<dyn RemoteShell>,
        registrar: Box<dyn DnsRegistrar>,
        config: &SyncConfig,
    ) -> Result<(Self, mpsc::Receiver<SyncEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(DEFAULT_EVENT_CHANNEL_CAPACITY);

        let engine = Self {
            shell,
            registrar,
            target: config.shell_target(),
            interface: config.router_external_interface_name.clone(),
            hostnames: config.hostnames.clone(),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run one synchronization pass
    ///
    /// # Returns
    ///
    /// - `Ok(SyncOutcome)`: The pass completed; individual update failures
    ///   are reported through [`SyncOutcome::UnableToFixAll`]
    /// - `Err(Error)`: Connection, parse, lookup or listing failure
    pub async fn run(&self) -> Result<SyncOutcome> {
        let address = self.current_address().await?;
        info!("Current address of {}: {}", self.interface, address);
        self.emit_event(SyncEvent::AddressDetected {
            address: address.clone(),
        });

        let records = self.registrar.list_records().await?;
        debug!(
            provider = self.registrar.provider_name(),
            "Fetched {} record(s)",
            records.len()
        );
        self.emit_event(SyncEvent::RecordsFetched {
            count: records.len(),
        });

        let mismatched = find_mismatched_records(&address, &records, &self.hostnames)?;
        for record in &mismatched {
            self.emit_event(SyncEvent::MismatchFound {
                name: record.name.clone(),
                published: record.data.clone(),
                address: address.clone(),
            });
        }

        let outcome = if mismatched.is_empty() {
            SyncOutcome::AllRecordsGood
        } else {
            info!("{} record(s) out of date", mismatched.len());
            let outcomes = apply_updates(self.registrar.as_ref(), &mismatched, &address).await;
            self.summarize(&outcomes, &address)
        };

        info!("{}", outcome);
        self.emit_event(SyncEvent::Finished { outcome });

        Ok(outcome)
    }

    /// Read the router's current external address
    ///
    /// The shell session is closed before this returns, whether or not the
    /// command succeeded.
    pub async fn current_address(&self) -> Result<String> {
        let stdout = self.read_interface().await?;
        extract_address(&stdout)
    }

    async fn read_interface(&self) -> Result<String> {
        debug!(
            shell = self.shell.shell_name(),
            "Connecting to {}@{}", self.target.username, self.target.host
        );
        let mut session = self.shell.connect(&self.target).await?;

        let result = session.execute(&interface_command(&self.interface)).await;

        if let Err(e) = session.close().await {
            warn!("Failed to close remote shell session: {}", e);
        }

        let output = result?;
        if !output.success() {
            warn!(
                exit_code = ?output.exit_code,
                stderr = %output.stderr.trim(),
                "Interface command reported failure"
            );
        }

        Ok(output.stdout)
    }

    fn summarize(&self, outcomes: &[UpdateOutcome], address: &str) -> SyncOutcome {
        let mut failed = 0;

        for outcome in outcomes {
            let error = match outcome {
                UpdateOutcome::Confirmed { record } => {
                    info!("Updated {} -> {}", record.name, address);
                    self.emit_event(SyncEvent::RecordUpdated {
                        name: record.name.clone(),
                        address: address.to_string(),
                    });
                    continue;
                }
                UpdateOutcome::Unconfirmed { returned_data, .. } => {
                    format!("registrar returned data {}", returned_data)
                }
                UpdateOutcome::Failed { error, .. } => error.to_string(),
            };

            failed += 1;
            self.emit_event(SyncEvent::RecordUpdateFailed {
                record_id: outcome.record_id().to_string(),
                error,
            });
        }

        if failed == 0 {
            SyncOutcome::AllRecordsFixed {
                updated: outcomes.len(),
            }
        } else {
            SyncOutcome::UnableToFixAll {
                attempted: outcomes.len(),
                failed,
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: SyncEvent) {
        match self.event_tx.try_send(event) {
            Ok(()) => {}
            // Nobody is listening
            Err(TrySendError::Closed(_)) => {}
            Err(TrySendError::Full(_)) => {
                warn!("Event channel full, dropping event");
            }
        }
    }
}
