use std::time::Duration;

use reqwest::{Client, StatusCode};
use tracing::trace;

use crate::{HarnessError, HarnessResult};

/// Upper bound for a single readiness request.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// HTTP client used for readiness probes.
///
/// Proxies are bypassed: the readiness URL is expected to be local.
pub fn probe_client() -> HarnessResult<Client> {
    Client::builder()
        .timeout(PROBE_TIMEOUT)
        .no_proxy()
        .build()
        .map_err(|e| HarnessError::HttpClient(e.to_string()))
}

/// A status that means "the server is up".
///
/// Anything below 400 counts, plus 401/403: a guarded app is still running.
pub fn is_ready_status(status: StatusCode) -> bool {
    status.as_u16() < 400 || matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

/// Returns `true` if `url` answers with a ready status.
///
/// Connection failures and timeouts mean "not ready yet".
pub async fn probe(client: &Client, url: &str) -> bool {
    match client.get(url).send().await {
        Ok(resp) => {
            let status = resp.status();
            trace!(%url, %status, "readiness probe answered");
            is_ready_status(status)
        }
        Err(e) => {
            trace!(%url, error = %e, "readiness probe failed");
            false
        }
    }
}
