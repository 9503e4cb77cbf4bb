//! Record reconciliation
//!
//! Compares the desired state (the router's current address) against the
//! observed state (the registrar's records) and computes the corrective set.

use crate::error::{Error, Result};
use crate::records::{DomainRecord, MismatchedRecord};
use tracing::debug;

/// Find the target records whose data differs from `address`
///
/// For each hostname, in order, the first record whose name equals it
/// exactly is compared byte-for-byte against `address`. Records already
/// holding the address are left out of the result.
///
/// # Errors
///
/// Returns [`Error::Lookup`] for the first hostname with no matching record.
pub fn find_mismatched_records(
    address: &str,
    records: &[DomainRecord],
    hostnames: &[String],
) -> Result<Vec<MismatchedRecord>> {
    let mut mismatched = Vec::new();

    for hostname in hostnames {
        let record = records
            .iter()
            .find(|record| record.name == *hostname)
            .ok_or_else(|| Error::lookup(hostname))?;

        if record.data == address {
            debug!(name = %record.name, data = %record.data, "Record up to date");
            continue;
        }

        debug!(
            name = %record.name,
            id = %record.id,
            data = %record.data,
            address,
            "Record out of date"
        );
        mismatched.push(MismatchedRecord::from(record));
    }

    Ok(mismatched)
}
