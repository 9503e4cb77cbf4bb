//! Record updater
//!
//! Issues one corrective update per stale record. Updates target distinct
//! records, so they are dispatched together and gathered before the
//! results are aggregated. A failed request never aborts its siblings.

use crate::error::Error;
use crate::records::{DomainRecord, MismatchedRecord, RecordId};
use crate::traits::DnsRegistrar;
use futures::future::join_all;
use tracing::{error, info, warn};

/// Result of a single record update
#[derive(Debug)]
pub enum UpdateOutcome {
    /// The registrar reports the record now holds the address
    Confirmed {
        /// Record as returned by the registrar
        record: DomainRecord,
    },

    /// The request succeeded but the returned record holds other data
    Unconfirmed {
        id: RecordId,
        returned_data: String,
    },

    /// The request failed; no updated record exists
    Failed { id: RecordId, error: Error },
}

impl UpdateOutcome {
    /// Whether this update is confirmed
    pub fn is_confirmed(&self) -> bool {
        matches!(self, UpdateOutcome::Confirmed { .. })
    }

    /// ID of the record this outcome refers to
    pub fn record_id(&self) -> &RecordId {
        match self {
            UpdateOutcome::Confirmed { record } => &record.id,
            UpdateOutcome::Unconfirmed { id, .. } | UpdateOutcome::Failed { id, .. } => id,
        }
    }
}

/// Update every record in `mismatched` to `address`, concurrently
///
/// Outcomes are returned in the same order as `mismatched`.
pub async fn apply_updates(
    registrar: &dyn DnsRegistrar,
    mismatched: &[MismatchedRecord],
    address: &str,
) -> Vec<UpdateOutcome> {
    let requests = mismatched
        .iter()
        .map(|record| update_one(registrar, record, address));

    join_all(requests).await
}

/// Update every record in `mismatched` and report whether all were confirmed
///
/// Failed requests count as unconfirmed.
pub async fn fix_records(
    registrar: &dyn DnsRegistrar,
    mismatched: &[MismatchedRecord],
    address: &str,
) -> bool {
    apply_updates(registrar, mismatched, address)
        .await
        .iter()
        .all(UpdateOutcome::is_confirmed)
}

async fn update_one(
    registrar: &dyn DnsRegistrar,
    record: &MismatchedRecord,
    address: &str,
) -> UpdateOutcome {
    let update = record.corrected(address);

    info!(
        provider = registrar.provider_name(),
        id = %record.id,
        name = %record.name,
        from = %record.data,
        to = address,
        "Updating record"
    );

    match registrar.update_record(&record.id, &update).await {
        Ok(updated) if updated.data == address => UpdateOutcome::Confirmed { record: updated },
        Ok(updated) => {
            warn!(
                id = %record.id,
                name = %record.name,
                returned = %updated.data,
                expected = address,
                "Registrar returned unexpected record data"
            );
            UpdateOutcome::Unconfirmed {
                id: record.id.clone(),
                returned_data: updated.data,
            }
        }
        Err(e) => {
            let error = Error::update_request(&record.id, e.to_string());
            error!(name = %record.name, "{}", error);
            UpdateOutcome::Failed {
                id: record.id.clone(),
                error,
            }
        }
    }
}
