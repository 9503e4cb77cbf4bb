// # DNS Registrar Trait
//
// Defines the interface for reading and correcting DNS records via a
// registrar's REST API.
//
// ## Implementations
//
// - DigitalOcean: `rddns-provider-digitalocean` crate

use crate::records::{DomainRecord, RecordId, RecordUpdate};
use async_trait::async_trait;

/// Trait for registrar implementations
///
/// Implementations are scoped to a single domain and carry their own
/// credentials.
///
/// # Thread Safety
///
/// Implementations must be thread-safe: the updater issues several
/// `update_record` calls concurrently against the same instance.
///
/// # Single-Shot
///
/// Each method performs the API calls for one logical operation and returns.
/// No retries, no caching, no background tasks. Deciding *whether* a record
/// needs an update belongs to the reconciler, not the registrar.
#[async_trait]
pub trait DnsRegistrar: Send + Sync {
    /// List every DNS record of the domain, in registrar order
    async fn list_records(&self) -> Result<Vec<DomainRecord>, crate::Error>;

    /// Replace the record identified by `id` with `update`
    ///
    /// # Returns
    ///
    /// - `Ok(DomainRecord)`: The record as the registrar now reports it
    /// - `Err(Error)`: If the request failed
    async fn update_record(
        &self,
        id: &RecordId,
        update: &RecordUpdate,
    ) -> Result<DomainRecord, crate::Error>;

    /// Get the registrar name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
