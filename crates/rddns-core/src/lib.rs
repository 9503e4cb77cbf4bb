// # rddns-core
//
// Core library for the router-driven DDNS synchronizer.
//
// ## Architecture Overview
//
// One synchronization run reads the router's external address over a remote
// shell and brings a set of registrar-hosted DNS records in line with it:
//
// - **RemoteShell / ShellSession**: Traits for running a command on the router
// - **DnsRegistrar**: Trait for listing and updating DNS records via a registrar API
// - **address**: Extracts the IPv4 address from interface-inspection output
// - **reconcile**: Computes which target records are stale
// - **updater**: Fans out corrective updates and verifies each one
// - **SyncEngine**: Orchestrates a single run end to end
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from transports
// 2. **Plugin-Based**: Shell and registrar implementations live in their own crates
// 3. **Library-First**: A run can be embedded without the `rddns` binary
// 4. **Single-Shot**: No retries, no background tasks, no persisted state

pub mod address;
pub mod config;
pub mod engine;
pub mod error;
pub mod reconcile;
pub mod records;
pub mod traits;
pub mod updater;

// Re-export core types for convenience
pub use config::SyncConfig;
pub use engine::{SyncEngine, SyncEvent, SyncOutcome};
pub use error::{Error, Result};
pub use records::{DomainRecord, MismatchedRecord, RecordId, RecordUpdate};
pub use traits::{DnsRegistrar, RemoteShell, ShellSession};
