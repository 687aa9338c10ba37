//! Paginated result retrieval and row parsing.
//!
//! [`ResultReader`] walks the gateway's result pages forward-only and turns
//! each page into [`Record`]s. The header is settled once, from the first
//! page that carries rows:
//!
//! - with column metadata, the metadata names are the header and the first
//!   row is dropped only if it repeats those names (exact or
//!   case-insensitive match);
//! - without metadata, the first row *is* the header and is always dropped.
//!
//! Every later row is data.

use futures::stream::{self, Stream};
use tracing::debug;

use lakequery_core::Record;

use crate::error::AthenaError;
use crate::gateway::{QueryGateway, ResultPage};

/// Header resolution state carried across pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeaderState {
    /// No rows seen yet. Holds column metadata if an empty page carried it.
    Pending(Option<Vec<String>>),
    /// Header known; all further rows are data.
    Resolved(Vec<String>),
}

impl Default for HeaderState {
    fn default() -> Self {
        Self::Pending(None)
    }
}

impl HeaderState {
    /// The resolved header, if any.
    pub fn columns(&self) -> Option<&[String]> {
        match self {
            Self::Resolved(cols) => Some(cols),
            Self::Pending(_) => None,
        }
    }
}

/// Whether `row` repeats `header` cell for cell, ignoring case.
/// A NULL cell or a cell past the header's width never matches.
fn is_header_echo(row: &[Option<String>], header: &[String]) -> bool {
    row.iter().enumerate().all(|(i, cell)| match (cell, header.get(i)) {
        (Some(value), Some(name)) => value == name || value.to_lowercase() == name.to_lowercase(),
        _ => false,
    })
}

/// Positional zip of header names with row cells. Cells past the header's
/// width are ignored; short rows yield fewer keys.
fn to_record(header: &[String], row: Vec<Option<String>>) -> Record {
    header.iter().cloned().zip(row).collect()
}

/// Parse one page into records, advancing `state`.
///
/// Pure: no I/O, no shared state beyond the header carried in `state`.
pub fn parse_page(page: ResultPage, state: &mut HeaderState) -> Vec<Record> {
    let ResultPage {
        rows, column_names, ..
    } = page;

    // An empty column list carries no header information.
    let column_names = column_names.filter(|names| !names.is_empty());
    if let HeaderState::Pending(slot) = state {
        if slot.is_none() {
            *slot = column_names;
        }
    }

    if rows.is_empty() {
        return Vec::new();
    }

    let mut rows = rows.into_iter().peekable();
    let header = match std::mem::take(state) {
        HeaderState::Resolved(header) => header,
        HeaderState::Pending(Some(names)) => {
            if rows.peek().is_some_and(|first| is_header_echo(first, &names)) {
                rows.next();
            }
            names
        }
        HeaderState::Pending(None) => rows
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(Option::unwrap_or_default)
            .collect(),
    };

    let records = rows.map(|row| to_record(&header, row)).collect();
    *state = HeaderState::Resolved(header);
    records
}

/// Forward-only, non-restartable reader over an execution's result pages.
pub struct ResultReader<'a, G: QueryGateway + ?Sized> {
    gateway: &'a G,
    query_id: String,
    cursor: Option<String>,
    header: HeaderState,
    done: bool,
    pages: usize,
    rows: usize,
}

impl<'a, G: QueryGateway + ?Sized> ResultReader<'a, G> {
    pub fn new(gateway: &'a G, query_id: impl Into<String>) -> Self {
        Self {
            gateway,
            query_id: query_id.into(),
            cursor: None,
            header: HeaderState::default(),
            done: false,
            pages: 0,
            rows: 0,
        }
    }

    /// Fetch and parse the next page. `Ok(None)` once the last page has been
    /// consumed.
    pub async fn next_batch(&mut self) -> Result<Option<Vec<Record>>, AthenaError> {
        if self.done {
            return Ok(None);
        }

        let page = self
            .gateway
            .fetch_result_page(&self.query_id, self.cursor.as_deref())
            .await?;

        self.pages += 1;
        self.rows += page.rows.len();
        debug!(
            query_id = %self.query_id,
            page = self.pages,
            rows = page.rows.len(),
            "Processing result page"
        );

        self.cursor = page.next_cursor.clone();
        self.done = self.cursor.is_none();

        Ok(Some(parse_page(page, &mut self.header)))
    }

    /// Adapt the reader into a stream of per-page record batches.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Record>, AthenaError>> + 'a {
        stream::try_unfold(self, |mut reader| async move {
            let batch = reader.next_batch().await?;
            Ok::<_, AthenaError>(batch.map(|batch| (batch, reader)))
        })
    }

    /// Drain every remaining page into one ordered list.
    pub async fn collect_records(mut self) -> Result<Vec<Record>, AthenaError> {
        let mut all = Vec::new();
        while let Some(batch) = self.next_batch().await? {
            all.extend(batch);
        }
        debug!(
            query_id = %self.query_id,
            pages = self.pages,
            total_rows = self.rows,
            records = all.len(),
            "Fetched all result pages"
        );
        Ok(all)
    }
}
