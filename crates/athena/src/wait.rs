use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::error::AthenaError;

/// Sleep for `ms`, returning early with [`AthenaError::Cancelled`] if the
/// token fires first.
pub(crate) async fn sleep_or_cancel(ms: u64, cancel: &CancellationToken) -> Result<(), AthenaError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AthenaError::Cancelled),
        _ = tokio::time::sleep(Duration::from_millis(ms)) => Ok(()),
    }
}

/// Delay after failed attempt `attempt` (1-based): `2^attempt * backoff_ms`,
/// saturating instead of overflowing.
pub(crate) fn backoff_delay_ms(attempt: u32, backoff_ms: u64) -> u64 {
    let factor = 1u64.checked_shl(attempt).unwrap_or(u64::MAX);
    factor.saturating_mul(backoff_ms)
}
