// # dnsrecord-core
//
// Core library for idempotent DNS record reconciliation.
//
// ## Architecture Overview
//
// This library provides everything needed to bring one DNS record to a
// desired state:
// - **DnsProvider**: Trait for listing and mutating records via provider APIs
// - **Request**: The JSON envelope carrying credentials and one action
// - **reconcile**: Compares current records to the desired state and issues
//   the minimum corrective calls
// - **run**: Parses a request and produces exactly one ReconcileResult
//
// ## Design Principles
//
// 1. **Idempotency**: Running the same request twice changes nothing the second time
// 2. **No guessing**: Ambiguous states fail instead of picking a record
// 3. **Library-First**: The binary is a thin shell around `run`
// 4. **Errors are results**: Nothing escapes `run` except a ReconcileResult

pub mod config;
pub mod error;
pub mod reconciler;
pub mod record;
pub mod request;
pub mod result;
pub mod runner;
pub mod traits;

// Re-export core types for convenience
pub use config::{AuthKind, Credentials, ProviderConfig};
pub use error::{Error, Result};
pub use reconciler::{Plan, plan, reconcile};
pub use record::{DesiredState, ExistingRecord, RecordExtras, RecordState};
pub use request::{Action, Request};
pub use result::{ReconcileResult, RecordSummary};
pub use runner::run;
pub use traits::{DnsProvider, DnsProviderFactory, ProviderResponse};
