//! [`QueryGateway`] backed by the AWS SDK Athena client.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_athena::operation::get_query_execution::GetQueryExecutionOutput;
use aws_sdk_athena::operation::get_query_results::GetQueryResultsOutput;
use aws_sdk_athena::types::{QueryExecutionContext, ResultConfiguration};
use tracing::{debug, info};

use crate::error::GatewayError;
use crate::gateway::{
    ExecutionState, QueryGateway, ResultPage, StatusReport, SubmitOutput, SubmitRequest,
};

fn sdk_error(e: impl std::fmt::Display) -> GatewayError {
    GatewayError::Sdk(e.to_string())
}

/// Status carried by a `GetQueryExecution` response. `None` when the
/// response has no status block; a status without a state is reported as an
/// unknown, non-terminal state.
fn status_report(resp: &GetQueryExecutionOutput) -> Option<StatusReport> {
    let status = resp.query_execution().and_then(|qe| qe.status())?;
    let state = status
        .state()
        .map(|s| ExecutionState::parse(s.as_str()))
        .unwrap_or_else(|| ExecutionState::Unknown(String::new()));

    Some(StatusReport {
        state,
        reason: status.state_change_reason().map(str::to_string),
    })
}

/// Convert a `GetQueryResults` response into a gateway page. An empty column
/// list counts as no metadata.
fn result_page(resp: &GetQueryResultsOutput) -> ResultPage {
    let next_cursor = resp.next_token().map(str::to_string);
    let Some(result_set) = resp.result_set() else {
        return ResultPage {
            next_cursor,
            ..ResultPage::default()
        };
    };

    let column_names: Option<Vec<String>> = result_set.result_set_metadata().and_then(|meta| {
        let cols = meta.column_info();
        (!cols.is_empty()).then(|| cols.iter().map(|ci| ci.name().to_string()).collect())
    });

    let rows = result_set
        .rows()
        .iter()
        .map(|row| {
            row.data()
                .iter()
                .map(|datum| datum.var_char_value().map(str::to_string))
                .collect()
        })
        .collect();

    ResultPage {
        rows,
        column_names,
        next_cursor,
    }
}

/// Gateway that talks to AWS Athena.
pub struct AwsAthenaGateway {
    client: aws_sdk_athena::Client,
    workgroup: Option<String>,
}

impl AwsAthenaGateway {
    /// Load the default AWS credential chain for `region` and build a client.
    pub async fn connect(region: &str, workgroup: Option<String>) -> Self {
        let region = aws_sdk_athena::config::Region::new(region.to_string());
        let aws_cfg = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        info!(
            region = ?aws_cfg.region(),
            workgroup = workgroup.as_deref().unwrap_or("(default)"),
            "Athena gateway initialised"
        );

        Self::from_client(aws_sdk_athena::Client::new(&aws_cfg), workgroup)
    }

    /// Wrap an already-configured SDK client.
    pub fn from_client(client: aws_sdk_athena::Client, workgroup: Option<String>) -> Self {
        Self { client, workgroup }
    }
}

#[async_trait]
impl QueryGateway for AwsAthenaGateway {
    async fn submit_query(&self, request: &SubmitRequest) -> Result<SubmitOutput, GatewayError> {
        let resp = self
            .client
            .start_query_execution()
            .query_string(&request.sql)
            .query_execution_context(
                QueryExecutionContext::builder()
                    .database(&request.database)
                    .build(),
            )
            .result_configuration(
                ResultConfiguration::builder()
                    .output_location(&request.output_location)
                    .build(),
            )
            .set_work_group(self.workgroup.clone())
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(SubmitOutput {
            execution_handle: resp.query_execution_id().map(str::to_string),
        })
    }

    async fn get_status(
        &self,
        execution_handle: &str,
    ) -> Result<Option<StatusReport>, GatewayError> {
        let resp = self
            .client
            .get_query_execution()
            .query_execution_id(execution_handle)
            .send()
            .await
            .map_err(sdk_error)?;

        Ok(status_report(&resp))
    }

    async fn fetch_result_page(
        &self,
        execution_handle: &str,
        cursor: Option<&str>,
    ) -> Result<ResultPage, GatewayError> {
        let resp = self
            .client
            .get_query_results()
            .query_execution_id(execution_handle)
            .set_next_token(cursor.map(str::to_string))
            .send()
            .await
            .map_err(sdk_error)?;

        let page = result_page(&resp);
        debug!(
            query_id = %execution_handle,
            rows = page.rows.len(),
            has_next = page.next_cursor.is_some(),
            "Fetched Athena result page"
        );
        Ok(page)
    }
}
