use serde::{Deserialize, Serialize};

use lakequery_core::Record;

use crate::client::{AthenaClient, DEFAULT_DESCRIPTION};
use crate::config::QueryOptions;
use crate::error::AthenaError;
use crate::gateway::QueryGateway;

// ---------------------------------------------------------------------------
// SQL producers
// ---------------------------------------------------------------------------

/// Something that turns a parameter object into SQL text.
///
/// Producers are pure: same params, same SQL, no side effects. Any
/// `Fn(&P) -> String` qualifies.
pub trait SqlProducer<P: ?Sized> {
    fn produce(&self, params: &P) -> String;
}

impl<P: ?Sized, F> SqlProducer<P> for F
where
    F: Fn(&P) -> String,
{
    fn produce(&self, params: &P) -> String {
        self(params)
    }
}

// ---------------------------------------------------------------------------
// Parameters
// ---------------------------------------------------------------------------

/// Whether a step expects rows back.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepMode {
    /// Fetch and parse result rows.
    #[default]
    Query,
    /// Run to completion only (DDL, `INSERT INTO ... SELECT`, etc.).
    Execute,
}

/// Parameters for a query step in a plan.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStepParams {
    /// SQL to run.
    pub sql: String,
    /// Database the SQL runs against.
    pub database: String,
    /// Human-readable label for logs (default: "Athena query").
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub mode: StepMode,
    /// Per-step retry/poll overrides.
    #[serde(default)]
    pub options: QueryOptions,
}

// ---------------------------------------------------------------------------
// Query Step
// ---------------------------------------------------------------------------

/// A single query node within a broader plan.
///
/// # Example JSON
/// ```json
/// {
///   "id": "weekly_traffic",
///   "params": {
///     "sql": "SELECT path, SUM(hits) AS hits FROM traffic GROUP BY path",
///     "database": "analytics",
///     "options": { "max_poll_attempts": 30 }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryStep {
    /// Step identifier from the plan.
    pub id: String,
    pub params: QueryStepParams,
}

/// What running a step produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StepOutput {
    Records { records: Vec<Record> },
    Executed { query_id: String },
}

impl QueryStep {
    pub fn new(id: impl Into<String>, params: QueryStepParams) -> Self {
        Self {
            id: id.into(),
            params,
        }
    }

    /// Build a query step whose SQL comes from a producer.
    pub fn from_producer<P: ?Sized>(
        id: impl Into<String>,
        database: impl Into<String>,
        producer: &impl SqlProducer<P>,
        params: &P,
    ) -> Self {
        Self::new(
            id,
            QueryStepParams {
                sql: producer.produce(params),
                database: database.into(),
                description: None,
                mode: StepMode::Query,
                options: QueryOptions::default(),
            },
        )
    }

    pub fn description(&self) -> &str {
        self.params.description.as_deref().unwrap_or(DEFAULT_DESCRIPTION)
    }

    /// Run the step against `client`.
    pub async fn run<G: QueryGateway>(
        &self,
        client: &AthenaClient<G>,
    ) -> Result<StepOutput, AthenaError> {
        let p = &self.params;
        match p.mode {
            StepMode::Query => {
                let records = client
                    .query(&p.sql, &p.database, self.description(), &p.options)
                    .await?;
                Ok(StepOutput::Records { records })
            }
            StepMode::Execute => {
                let query_id = client
                    .execute(&p.sql, &p.database, self.description(), &p.options)
                    .await?;
                Ok(StepOutput::Executed { query_id })
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
