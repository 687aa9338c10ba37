//! Error types for the Athena query client.

use thiserror::Error;

/// Errors raised by a [`QueryGateway`](crate::gateway::QueryGateway) call.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// An AWS SDK error (stringified).
    #[error("AWS SDK error: {0}")]
    Sdk(String),

    /// The submit call succeeded but carried no execution id.
    #[error("No QueryExecutionId returned")]
    MissingExecutionId,
}

/// Errors that can occur while driving a query through its lifecycle.
#[derive(Debug, Error)]
pub enum AthenaError {
    /// Every submission attempt failed; carries the most recent failure.
    #[error("{source}")]
    Submission {
        attempts: u32,
        #[source]
        source: GatewayError,
    },

    /// `max_retries` was zero so nothing was submitted.
    #[error("No attempts were made")]
    NoAttempts,

    /// The status call returned no status object at all.
    #[error("No status returned for query {query_id}")]
    MissingStatusPayload { query_id: String },

    /// The query execution failed on the Athena side.
    #[error("{reason}")]
    QueryFailed { query_id: String, reason: String },

    /// The query was cancelled (either by a user or by Athena).
    #[error("{reason}")]
    QueryCancelled { query_id: String, reason: String },

    /// The query did not reach a terminal state within the poll budget.
    #[error("Polling timed out")]
    PollingTimeout { query_id: String, attempts: u32 },

    /// The client was constructed with invalid settings.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A non-retried gateway call (status or result page) failed.
    #[error(transparent)]
    Gateway(#[from] GatewayError),

    /// The caller's cancellation token fired while waiting.
    #[error("Operation cancelled by caller")]
    Cancelled,
}

impl AthenaError {
    /// Query execution id the error relates to, when known.
    pub fn query_id(&self) -> Option<&str> {
        match self {
            Self::MissingStatusPayload { query_id }
            | Self::QueryFailed { query_id, .. }
            | Self::QueryCancelled { query_id, .. }
            | Self::PollingTimeout { query_id, .. } => Some(query_id),
            _ => None,
        }
    }
}
