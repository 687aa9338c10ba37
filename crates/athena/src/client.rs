//! Athena query execution client.
//!
//! Provides [`AthenaClient`] for running SQL through a [`QueryGateway`]:
//! submission with exponential-backoff retries, bounded completion polling,
//! and paginated result parsing into [`Record`]s.

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, Instrument};

use lakequery_core::Record;

use crate::config::{AthenaConfig, ClientOptions, QueryOptions};
use crate::error::AthenaError;
use crate::gateway::{QueryGateway, SubmitRequest};
use crate::poll::await_completion;
use crate::result::ResultReader;
use crate::sdk::AwsAthenaGateway;
use crate::submit::submit_with_retry;

/// Description used in logs when the caller has nothing better.
pub const DEFAULT_DESCRIPTION: &str = "Athena query";

/// Client for executing queries against Athena (or any [`QueryGateway`]).
///
/// Holds only read-only configuration after construction, so one instance
/// can serve concurrent calls; share it behind an `Arc`. Identical
/// concurrent queries are not coalesced.
pub struct AthenaClient<G: QueryGateway = AwsAthenaGateway> {
    gateway: G,
    output_location: String,
    options: ClientOptions,
}

impl<G: QueryGateway> std::fmt::Debug for AthenaClient<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AthenaClient")
            .field("output_location", &self.output_location)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

fn validate_output_location(output_location: &str) -> Result<(), AthenaError> {
    if output_location.trim().is_empty() {
        return Err(AthenaError::Config(
            "\"output_location\" is required".to_string(),
        ));
    }
    Ok(())
}

impl AthenaClient<AwsAthenaGateway> {
    /// Build a client backed by a fresh AWS Athena gateway.
    ///
    /// The output location is validated before any AWS configuration is
    /// loaded, so a misconfigured client fails without touching the network.
    pub async fn from_config(config: &AthenaConfig) -> Result<Self, AthenaError> {
        validate_output_location(&config.output_location)?;
        let gateway = AwsAthenaGateway::connect(&config.region, config.workgroup.clone()).await;
        Self::new(gateway, config.output_location.clone(), config.options)
    }
}

impl<G: QueryGateway> AthenaClient<G> {
    /// Create a client. Fails with [`AthenaError::Config`] when
    /// `output_location` is empty or blank; no gateway call is made.
    pub fn new(
        gateway: G,
        output_location: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, AthenaError> {
        let output_location = output_location.into();
        validate_output_location(&output_location)?;

        info!(
            output_location = %output_location,
            backoff_ms = options.backoff_ms,
            max_retries = options.max_retries,
            poll_interval_ms = options.poll_interval_ms,
            max_poll_attempts = options.max_poll_attempts,
            "AthenaClient initialised"
        );

        Ok(Self {
            gateway,
            output_location,
            options,
        })
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    pub fn output_location(&self) -> &str {
        &self.output_location
    }

    // -----------------------------------------------------------------------
    // Public API
    // -----------------------------------------------------------------------

    /// Run a statement that returns no rows (DDL and the like).
    ///
    /// Submits with retries, then polls until the execution succeeds.
    /// Returns the execution id for log correlation.
    pub async fn execute(
        &self,
        sql: &str,
        database: &str,
        description: &str,
        opts: &QueryOptions,
    ) -> Result<String, AthenaError> {
        self.execute_with_cancel(sql, database, description, opts, &CancellationToken::new())
            .await
    }

    /// [`execute`](Self::execute) that aborts any backoff or poll wait once
    /// `cancel` fires. The remote execution is not stopped.
    pub async fn execute_with_cancel(
        &self,
        sql: &str,
        database: &str,
        description: &str,
        opts: &QueryOptions,
        cancel: &CancellationToken,
    ) -> Result<String, AthenaError> {
        let span = info_span!("athena_execute", description = %description, database = %database);
        self.run_to_completion(sql, database, description, opts, cancel)
            .instrument(span)
            .await
    }

    /// Run a query and return every result row as a [`Record`], in order.
    pub async fn query(
        &self,
        sql: &str,
        database: &str,
        description: &str,
        opts: &QueryOptions,
    ) -> Result<Vec<Record>, AthenaError> {
        self.query_with_cancel(sql, database, description, opts, &CancellationToken::new())
            .await
    }

    /// [`query`](Self::query) with caller-controlled cancellation of waits.
    pub async fn query_with_cancel(
        &self,
        sql: &str,
        database: &str,
        description: &str,
        opts: &QueryOptions,
        cancel: &CancellationToken,
    ) -> Result<Vec<Record>, AthenaError> {
        let span = info_span!("athena_query", description = %description, database = %database);
        async {
            let query_id = self
                .run_to_completion(sql, database, description, opts, cancel)
                .await?;

            debug!(query_id = %query_id, "Fetching paginated results");
            self.results(&query_id).collect_records().await
        }
        .instrument(span)
        .await
    }

    /// Lazy reader over the results of an execution that has already
    /// succeeded.
    pub fn results(&self, query_id: &str) -> ResultReader<'_, G> {
        ResultReader::new(&self.gateway, query_id)
    }

    // -----------------------------------------------------------------------
    // Private helpers
    // -----------------------------------------------------------------------

    async fn run_to_completion(
        &self,
        sql: &str,
        database: &str,
        description: &str,
        opts: &QueryOptions,
        cancel: &CancellationToken,
    ) -> Result<String, AthenaError> {
        let resolved = self.options.resolve(opts);
        debug!(description = %description, "Executing");

        let request = SubmitRequest {
            sql: sql.to_string(),
            database: database.to_string(),
            output_location: self.output_location.clone(),
        };

        let query_id = submit_with_retry(
            &self.gateway,
            &request,
            resolved.backoff_ms,
            resolved.max_retries,
            cancel,
        )
        .await?;

        await_completion(
            &self.gateway,
            &query_id,
            resolved.poll_interval_ms,
            resolved.max_poll_attempts,
            cancel,
        )
        .await?;

        info!(query_id = %query_id, description = %description, "Query succeeded");
        Ok(query_id)
    }
}
