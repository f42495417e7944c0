//! Request runner
//!
//! Turns one raw request into exactly one [`ReconcileResult`]. Input and
//! credential problems are reported before a provider is built, so no API
//! call is made for a request that cannot succeed.

use tracing::{debug, warn};

use crate::reconciler::reconcile;
use crate::request::{Action, Request};
use crate::result::{ReconcileResult, RecordSummary};
use crate::traits::DnsProviderFactory;

/// Run one request end to end
///
/// # Parameters
///
/// - `input`: The raw JSON request
/// - `factory`: Builds the provider once the request has been validated
pub async fn run(input: &str, factory: &dyn DnsProviderFactory) -> ReconcileResult {
    let request = match Request::parse(input) {
        Ok(request) => request,
        Err(e) => return reject(e),
    };
    debug!("Parsed request: {:?}", request);

    let config = match request.provider_config() {
        Ok(config) => config,
        Err(e) => return reject(e),
    };

    let action = match request.action() {
        Ok(action) => action,
        Err(e) => return reject(e),
    };

    match action {
        Action::EnsureRecord(desired) => {
            let summary = RecordSummary::from(&desired);

            let provider = match factory.create(&config) {
                Ok(provider) => provider,
                Err(e) => return reject(e).with_record(summary),
            };

            reconcile(&desired, provider.as_ref())
                .await
                .with_record(summary)
        }
    }
}

fn reject(error: crate::Error) -> ReconcileResult {
    warn!("Request rejected: {}", error);
    ReconcileResult::failure(error.to_string())
}
