//! Record reconciler
//!
//! The reconciler is responsible for:
//! - Fetching the records that currently match (domain, host, type)
//! - Deciding the minimum corrective action for the desired state
//! - Issuing that action through the DnsProvider
//! - Reporting the outcome as a single [`ReconcileResult`]
//!
//! ## Flow
//!
//! ```text
//! ┌──────────────┐   list_records   ┌──────────────┐
//! │ DesiredState │ ───────────────▶ │ DnsProvider  │
//! └──────────────┘                  └──────────────┘
//!         │                                 │
//!         │            ExistingRecord[]     │
//!         ▼ ◀───────────────────────────────┘
//! ┌──────────────┐
//! │    plan()    │── Add | Modify | Delete | Keep | Refuse
//! └──────────────┘
//!         │
//!         ▼
//!   at most one add or modify, or a sequence of deletes
//! ```
//!
//! ## Guarantees
//!
//! 1. A run never mixes add, modify and delete calls
//! 2. Several records that differ from the desired state are never modified
//!    on a guess; the run fails instead
//! 3. Deletes stop at the first failure; completed deletes are not undone
//! 4. Nothing is retried

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::record::{DesiredState, ExistingRecord, RecordState, normalize_records};
use crate::result::ReconcileResult;
use crate::traits::{DnsProvider, ProviderResponse};

pub const MSG_ADDED: &str = "Record added";
pub const MSG_UPDATED: &str = "Record updated";
pub const MSG_MATCHES: &str = "Record already exists and matches";
pub const MSG_EXISTS_AMONG_OTHERS: &str = "Record exists (among others)";
pub const MSG_NOT_FOUND: &str = "Record not found";
pub const MSG_NOT_FOUND_MATCHING_VALUE: &str = "Record not found (matching value)";
pub const MSG_DELETED: &str = "Records deleted";

/// Description fragment that marks an empty list rather than a failure
const NO_RECORDS_FOUND: &str = "no records found";

/// The corrective action for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// Create the record
    Add,
    /// Rewrite the single matching record
    Modify { record_id: String },
    /// Delete these records, in order
    Delete { record_ids: Vec<String> },
    /// Already in the desired state
    Keep { msg: &'static str },
    /// No safe action exists
    Refuse { reason: String },
}

/// Decide what to do, given the desired state and the current matches
pub fn plan(desired: &DesiredState, existing: &[ExistingRecord]) -> Plan {
    match desired.state {
        RecordState::Present => plan_present(desired, existing),
        RecordState::Absent => plan_absent(desired, existing),
    }
}

fn plan_present(desired: &DesiredState, existing: &[ExistingRecord]) -> Plan {
    match existing {
        [] => Plan::Add,
        [only] => {
            if desired.is_satisfied_by(only) {
                Plan::Keep { msg: MSG_MATCHES }
            } else {
                Plan::Modify {
                    record_id: only.id.clone(),
                }
            }
        }
        many => {
            if many.iter().any(|r| desired.is_satisfied_by(r)) {
                Plan::Keep {
                    msg: MSG_EXISTS_AMONG_OTHERS,
                }
            } else {
                Plan::Refuse {
                    reason: format!(
                        "Multiple records found for {} ({}) and none match the desired value and TTL; \
                         refusing to guess which one to update",
                        desired.fqdn(),
                        desired.record_type
                    ),
                }
            }
        }
    }
}

fn plan_absent(desired: &DesiredState, existing: &[ExistingRecord]) -> Plan {
    if existing.is_empty() {
        return Plan::Keep { msg: MSG_NOT_FOUND };
    }

    let record_ids: Vec<String> = match desired.value() {
        Some(value) => existing
            .iter()
            .filter(|r| r.record == value)
            .map(|r| r.id.clone())
            .collect(),
        None => existing.iter().map(|r| r.id.clone()).collect(),
    };

    if record_ids.is_empty() {
        Plan::Keep {
            msg: MSG_NOT_FOUND_MATCHING_VALUE,
        }
    } else {
        Plan::Delete { record_ids }
    }
}

/// Bring one record to its desired state
///
/// All errors are folded into the returned result.
pub async fn reconcile(desired: &DesiredState, provider: &dyn DnsProvider) -> ReconcileResult {
    if let Err(e) = desired.validate() {
        warn!("Rejecting desired state for {}: {}", desired.fqdn(), e);
        return ReconcileResult::failure(e.to_string());
    }

    info!(
        "Reconciling {} {} -> {} via {}",
        desired.record_type,
        desired.fqdn(),
        desired.state,
        provider.provider_name()
    );

    let existing = match fetch_existing(desired, provider).await {
        Ok(records) => records,
        Err(msg) => {
            warn!("{}", msg);
            return ReconcileResult::failure(msg);
        }
    };

    debug!("Found {} matching record(s)", existing.len());

    match plan(desired, &existing) {
        Plan::Add => {
            let value = desired.value().unwrap_or_default();
            info!("Adding {} {} -> {}", desired.record_type, desired.fqdn(), value);
            let response = provider
                .add_record(
                    &desired.domain,
                    &desired.record_type,
                    &desired.host,
                    value,
                    desired.ttl,
                    &desired.extras,
                )
                .await;
            mutation_result(response, MSG_ADDED, "Failed to add record")
        }
        Plan::Modify { record_id } => {
            let value = desired.value().unwrap_or_default();
            info!(
                "Updating record {} ({}) -> {} ttl {}",
                record_id,
                desired.fqdn(),
                value,
                desired.ttl
            );
            let response = provider
                .modify_record(
                    &desired.domain,
                    &record_id,
                    &desired.host,
                    value,
                    desired.ttl,
                    &desired.extras,
                )
                .await;
            mutation_result(response, MSG_UPDATED, "Failed to update record")
        }
        Plan::Delete { record_ids } => delete_sequentially(desired, provider, &record_ids).await,
        Plan::Keep { msg } => {
            info!("{}: {}", desired.fqdn(), msg);
            ReconcileResult::unchanged(msg)
        }
        Plan::Refuse { reason } => {
            warn!("{}", reason);
            ReconcileResult::failure(reason)
        }
    }
}

/// Fetch and normalize the current matches
///
/// A "no records found" error envelope is an empty result; any other error
/// is returned as the failure message.
async fn fetch_existing(
    desired: &DesiredState,
    provider: &dyn DnsProvider,
) -> std::result::Result<Vec<ExistingRecord>, String> {
    let payload = provider
        .list_records(&desired.domain, &desired.host, &desired.record_type)
        .await
        .map_err(|e| format!("Failed to list records: {}", e))?;

    if let Some(description) = list_error_description(&payload) {
        if description.to_lowercase().contains(NO_RECORDS_FOUND) {
            debug!("Provider reported no records: {}", description);
            return Ok(Vec::new());
        }
        return Err(format!("Failed to list records: {}", description));
    }

    Ok(normalize_records(&payload))
}

fn list_error_description(payload: &Value) -> Option<String> {
    let status = payload.get("status").and_then(Value::as_str)?;
    if !status.eq_ignore_ascii_case("failed") {
        return None;
    }

    Some(
        ProviderResponse::from_value(payload.clone())
            .description_or_unknown()
            .to_string(),
    )
}

fn mutation_result(
    response: Result<ProviderResponse>,
    success_msg: &str,
    failure_prefix: &str,
) -> ReconcileResult {
    match response {
        Ok(response) if response.is_success() => {
            info!("{}", success_msg);
            ReconcileResult::changed(success_msg, response.payload)
        }
        Ok(response) => {
            let msg = format!("{}: {}", failure_prefix, response.description_or_unknown());
            warn!("{}", msg);
            ReconcileResult::failure(msg)
        }
        Err(e) => {
            let msg = format!("{}: {}", failure_prefix, e);
            warn!("{}", msg);
            ReconcileResult::failure(msg)
        }
    }
}

/// Delete records one at a time, stopping at the first failure
async fn delete_sequentially(
    desired: &DesiredState,
    provider: &dyn DnsProvider,
    record_ids: &[String],
) -> ReconcileResult {
    let mut deleted = Vec::with_capacity(record_ids.len());

    for record_id in record_ids {
        info!("Deleting record {} ({})", record_id, desired.fqdn());

        let failure = match provider.delete_record(&desired.domain, record_id).await {
            Ok(response) if response.is_success() => {
                deleted.push(response.payload);
                continue;
            }
            Ok(response) => response.description_or_unknown().to_string(),
            Err(e) => e.to_string(),
        };

        let msg = format!("Failed to delete record {}: {}", record_id, failure);
        warn!(
            "{} ({} of {} deleted before failure)",
            msg,
            deleted.len(),
            record_ids.len()
        );
        return ReconcileResult::failure(msg).with_changed(!deleted.is_empty());
    }

    info!("Deleted {} record(s) for {}", deleted.len(), desired.fqdn());
    ReconcileResult::changed(MSG_DELETED, Value::Array(deleted))
}
