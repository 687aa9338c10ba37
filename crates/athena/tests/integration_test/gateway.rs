//! Scripted gateway shared by the integration tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use lakequery_athena::*;
use tokio::time::Instant;

/// One recorded gateway call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit(SubmitRequest),
    Status(String),
    Page(Option<String>),
}

/// Gateway that replays scripted answers and logs every call with its time.
///
/// Status checks beyond the script report RUNNING. Pages are chained with
/// cursors `c1`, `c2`, ... by the gateway itself.
#[derive(Default)]
pub struct FakeAthena {
    submits: Mutex<VecDeque<Result<SubmitOutput, GatewayError>>>,
    statuses: Mutex<VecDeque<Option<StatusReport>>>,
    pages: Vec<ResultPage>,
    calls: Mutex<Vec<(Instant, Call)>>,
}

impl FakeAthena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn accept(self, handle: &str) -> Self {
        self.submits.lock().unwrap().push_back(Ok(SubmitOutput {
            execution_handle: Some(handle.to_string()),
        }));
        self
    }

    pub fn reject(self, msg: &str) -> Self {
        self.submits
            .lock()
            .unwrap()
            .push_back(Err(GatewayError::Sdk(msg.to_string())));
        self
    }

    pub fn report(self, state: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Some(StatusReport::new(ExecutionState::parse(state))));
        self
    }

    pub fn report_with_reason(self, state: &str, reason: &str) -> Self {
        self.statuses
            .lock()
            .unwrap()
            .push_back(Some(StatusReport::with_reason(ExecutionState::parse(state), reason)));
        self
    }

    /// Queue a page that carries column metadata.
    pub fn serve(self, columns: &[&str], rows: &[&[&str]]) -> Self {
        self.push_page(Some(columns.iter().map(|s| s.to_string()).collect()), rows)
    }

    /// Queue a page without column metadata.
    pub fn serve_bare(self, rows: &[&[&str]]) -> Self {
        self.push_page(None, rows)
    }

    fn push_page(mut self, column_names: Option<Vec<String>>, rows: &[&[&str]]) -> Self {
        self.pages.push(ResultPage {
            rows: rows
                .iter()
                .map(|r| r.iter().map(|v| Some(v.to_string())).collect())
                .collect(),
            column_names,
            next_cursor: None,
        });
        self
    }

    pub fn calls(&self) -> Vec<(Instant, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|(_, c)| pred(c)).count()
    }

    pub fn submits(&self) -> usize {
        self.count(|c| matches!(c, Call::Submit(_)))
    }

    pub fn status_checks(&self) -> usize {
        self.count(|c| matches!(c, Call::Status(_)))
    }

    pub fn page_fetches(&self) -> usize {
        self.count(|c| matches!(c, Call::Page(_)))
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((Instant::now(), call));
    }
}

#[async_trait]
impl QueryGateway for FakeAthena {
    async fn submit_query(&self, request: &SubmitRequest) -> Result<SubmitOutput, GatewayError> {
        self.record(Call::Submit(request.clone()));
        self.submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GatewayError::Sdk("no scripted submit".into())))
    }

    async fn get_status(
        &self,
        execution_handle: &str,
    ) -> Result<Option<StatusReport>, GatewayError> {
        self.record(Call::Status(execution_handle.to_string()));
        Ok(self
            .statuses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Some(StatusReport::new(ExecutionState::Running))))
    }

    async fn fetch_result_page(
        &self,
        _execution_handle: &str,
        cursor: Option<&str>,
    ) -> Result<ResultPage, GatewayError> {
        self.record(Call::Page(cursor.map(str::to_string)));
        let index = cursor
            .and_then(|c| c.strip_prefix('c'))
            .and_then(|n| n.parse::<usize>().ok())
            .unwrap_or(0);
        let mut page = self.pages.get(index).cloned().unwrap_or_default();
        if index + 1 < self.pages.len() {
            page.next_cursor = Some(format!("c{}", index + 1));
        }
        Ok(page)
    }
}
