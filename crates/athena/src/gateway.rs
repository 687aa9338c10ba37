//! The remote query service seam.
//!
//! [`QueryGateway`] is the three-call contract the client drives: submit a
//! statement, report its status, and serve result pages. The AWS
//! implementation lives in [`crate::sdk`]; tests use scripted in-memory
//! gateways.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::GatewayError;

/// Input to a single submit call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmitRequest {
    pub sql: String,
    pub database: String,
    /// Where the engine writes its result files (an S3 URI for Athena).
    pub output_location: String,
}

/// Response from a submit call. A missing handle counts as a failed submit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmitOutput {
    pub execution_handle: Option<String>,
}

/// Execution state as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionState {
    Queued,
    Running,
    Succeeded,
    Failed,
    Cancelled,
    /// Any state string the client does not recognize.
    Unknown(String),
}

impl ExecutionState {
    /// Parse the gateway's state string (case-insensitive).
    pub fn parse(raw: &str) -> Self {
        match raw.to_ascii_uppercase().as_str() {
            "QUEUED" => Self::Queued,
            "RUNNING" => Self::Running,
            "SUCCEEDED" => Self::Succeeded,
            "FAILED" => Self::Failed,
            "CANCELLED" => Self::Cancelled,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Only SUCCEEDED, FAILED and CANCELLED are terminal. Everything else,
    /// unknown states included, counts as still running.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Cancelled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "QUEUED",
            Self::Running => "RUNNING",
            Self::Succeeded => "SUCCEEDED",
            Self::Failed => "FAILED",
            Self::Cancelled => "CANCELLED",
            Self::Unknown(raw) => raw,
        }
    }
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One status observation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusReport {
    pub state: ExecutionState,
    /// Human-readable explanation, surfaced on failure or cancellation.
    pub reason: Option<String>,
}

impl StatusReport {
    pub fn new(state: ExecutionState) -> Self {
        Self { state, reason: None }
    }

    pub fn with_reason(state: ExecutionState, reason: impl Into<String>) -> Self {
        Self {
            state,
            reason: Some(reason.into()),
        }
    }
}

/// One batch of result rows.
///
/// Cells are `None` for SQL NULL. `column_names` is only meaningful on the
/// first page of a result set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultPage {
    pub rows: Vec<Vec<Option<String>>>,
    #[serde(default)]
    pub column_names: Option<Vec<String>>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Remote query service contract consumed by the client.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    /// Start a query execution. May fail; a response without a handle is
    /// also treated as a failure by the caller.
    async fn submit_query(&self, request: &SubmitRequest) -> Result<SubmitOutput, GatewayError>;

    /// Report the status of an execution. `Ok(None)` means the service
    /// answered without a status object.
    async fn get_status(&self, execution_handle: &str)
        -> Result<Option<StatusReport>, GatewayError>;

    /// Fetch one result page. `cursor` is `None` for the first page and the
    /// previous page's `next_cursor` afterwards.
    async fn fetch_result_page(
        &self,
        execution_handle: &str,
        cursor: Option<&str>,
    ) -> Result<ResultPage, GatewayError>;
}

#[async_trait]
impl<T: QueryGateway + ?Sized> QueryGateway for Arc<T> {
    async fn submit_query(&self, request: &SubmitRequest) -> Result<SubmitOutput, GatewayError> {
        (**self).submit_query(request).await
    }

    async fn get_status(
        &self,
        execution_handle: &str,
    ) -> Result<Option<StatusReport>, GatewayError> {
        (**self).get_status(execution_handle).await
    }

    async fn fetch_result_page(
        &self,
        execution_handle: &str,
        cursor: Option<&str>,
    ) -> Result<ResultPage, GatewayError> {
        (**self).fetch_result_page(execution_handle, cursor).await
    }
}
