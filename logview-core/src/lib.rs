// Logview Library - Core log parsing and filtering functionality
//
// This library turns raw log text into a filterable table: it splits the
// content into logical (possibly multi-line) records, parses each record's
// head line into named fields under a configurable strategy, and supports
// searching, level and time-range filtering, pagination, and an "errors since
// a reference time" count over the result. File browsing, HTML rendering and
// the like are the caller's business; the engine is a pure function of the
// content and configuration it is handed.

use tracing::info;

pub mod aggregate;
pub mod error;
pub mod filter;
pub mod input;
pub mod pager;
pub mod parser;
pub mod splitter;
pub mod timefmt;

pub use aggregate::{count_recent_errors, ErrorCountQuery};
pub use error::ConfigError;
pub use filter::{filter_rows, FilterCriteria};
pub use input::{decode_content, read_log_content};
pub use pager::{paginate, Page};
pub use parser::{
    parse_records, ColumnSpec, LogTable, ParseStrategy, ParserConfig, SemanticType, TableRow,
    TRACEBACK_COLUMN,
};
pub use splitter::{split_records, RecordBoundaries};

/// Everything one table view needs besides the file content.
#[derive(Debug, Clone)]
pub struct ViewRequest {
    pub parser: ParserConfig,
    pub boundaries: RecordBoundaries,
    pub criteria: FilterCriteria,
    pub page_size: usize,
    pub page_number: usize,
}

/// A rendered view of one file: the column specs and the requested page of
/// filtered rows, plus the row counts the pager worked from.
#[derive(Debug, Clone)]
pub struct FileView {
    pub columns: Vec<ColumnSpec>,
    pub page: Page<TableRow>,
    pub total_rows: usize,
    pub matched_rows: usize,
}

/// Run the full pipeline over one file's content: split into records, parse
/// into rows, filter, and page. Configuration problems surface as
/// [`ConfigError`] before any partial output; individual malformed records
/// come back as degraded rows inside the page.
pub fn render_view(content: &str, request: &ViewRequest) -> Result<FileView, ConfigError> {
    let records = split_records(content, &request.boundaries);
    let table = parse_records(&records, &request.parser)?;
    let total_rows = table.rows.len();

    let rows = filter_rows(table.rows, &table.columns, &request.criteria)?;
    let matched_rows = rows.len();
    let page = paginate(rows, request.page_size, request.page_number)?;

    info!(
        "rendered page {}/{} ({} of {} rows matched)",
        page.number, page.total_pages, matched_rows, total_rows
    );
    Ok(FileView {
        columns: table.columns,
        page,
        total_rows,
        matched_rows,
    })
}

/// Split, parse and count recent errors in one call. The per-file number
/// behind an "issues since you last looked" badge.
pub fn errors_since(
    content: &str,
    parser: &ParserConfig,
    boundaries: &RecordBoundaries,
    query: &ErrorCountQuery,
) -> Result<usize, ConfigError> {
    let records = split_records(content, boundaries);
    let table = parse_records(&records, parser)?;
    count_recent_errors(&table.rows, &table.columns, query)
}
