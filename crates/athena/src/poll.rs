//! Completion polling.
//!
//! Each attempt waits `poll_interval_ms` and then issues exactly one status
//! request, so a check never happens immediately after submission. Only
//! SUCCEEDED, FAILED and CANCELLED end the loop early; every other state,
//! recognized or not, is treated as still running.

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use crate::error::AthenaError;
use crate::gateway::{ExecutionState, QueryGateway};
use crate::wait::sleep_or_cancel;

pub(crate) async fn await_completion<G: QueryGateway + ?Sized>(
    gateway: &G,
    query_id: &str,
    poll_interval_ms: u64,
    max_poll_attempts: u32,
    cancel: &CancellationToken,
) -> Result<(), AthenaError> {
    for attempt in 1..=max_poll_attempts {
        sleep_or_cancel(poll_interval_ms, cancel).await?;

        let report = gateway.get_status(query_id).await?.ok_or_else(|| {
            error!(query_id = %query_id, "No status returned");
            AthenaError::MissingStatusPayload {
                query_id: query_id.to_string(),
            }
        })?;

        debug!(query_id = %query_id, attempt, state = %report.state, "Polling query status");

        match report.state {
            ExecutionState::Succeeded => return Ok(()),
            ExecutionState::Failed => {
                let reason = report.reason.unwrap_or_else(|| "Query FAILED".to_string());
                error!(query_id = %query_id, reason = %reason, "Query failed");
                return Err(AthenaError::QueryFailed {
                    query_id: query_id.to_string(),
                    reason,
                });
            }
            ExecutionState::Cancelled => {
                let reason = report.reason.unwrap_or_else(|| "Query CANCELLED".to_string());
                warn!(query_id = %query_id, reason = %reason, "Query was cancelled");
                return Err(AthenaError::QueryCancelled {
                    query_id: query_id.to_string(),
                    reason,
                });
            }
            // Queued | Running | unknown
            _ => {}
        }
    }

    // The remote execution keeps running; we only stop waiting for it.
    warn!(
        query_id = %query_id,
        attempts = max_poll_attempts,
        "Polling timed out"
    );
    Err(AthenaError::PollingTimeout {
        query_id: query_id.to_string(),
        attempts: max_poll_attempts,
    })
}
