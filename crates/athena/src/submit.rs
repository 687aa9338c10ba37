//! Query submission with bounded retries and exponential backoff.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::{AthenaError, GatewayError};
use crate::gateway::{QueryGateway, SubmitRequest};
use crate::wait::{backoff_delay_ms, sleep_or_cancel};

/// Submit `request`, retrying up to `max_retries` attempts in total.
///
/// A response without an execution id is treated exactly like a transport
/// failure. After failed attempt `n` (1-based) the submitter waits
/// `2^n * backoff_ms` before trying again; the last failure is returned
/// without waiting.
pub(crate) async fn submit_with_retry<G: QueryGateway + ?Sized>(
    gateway: &G,
    request: &SubmitRequest,
    backoff_ms: u64,
    max_retries: u32,
    cancel: &CancellationToken,
) -> Result<String, AthenaError> {
    let mut last_error: Option<GatewayError> = None;

    for attempt in 1..=max_retries {
        let outcome = gateway
            .submit_query(request)
            .await
            .and_then(|out| out.execution_handle.ok_or(GatewayError::MissingExecutionId));

        match outcome {
            Ok(query_id) => {
                debug!(query_id = %query_id, attempt, "Query submitted");
                return Ok(query_id);
            }
            Err(e) => {
                warn!(attempt, error = %e, "Start attempt failed");
                last_error = Some(e);
                if attempt < max_retries {
                    let wait_ms = backoff_delay_ms(attempt, backoff_ms);
                    debug!(wait_ms, "Retrying start");
                    sleep_or_cancel(wait_ms, cancel).await?;
                }
            }
        }
    }

    match last_error {
        Some(source) => {
            error!(attempts = max_retries, error = %source, "All start attempts failed");
            Err(AthenaError::Submission {
                attempts: max_retries,
                source,
            })
        }
        None => Err(AthenaError::NoAttempts),
    }
}
