use thiserror::Error;

/// Configuration problems that block an operation before any parsing begins.
///
/// Per-record parse failures are never reported through this type; they are
/// emitted as degraded rows so the raw content stays visible. Likewise a row
/// whose time column fails to parse is just excluded from time-based
/// filtering and counting.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid record boundary pattern '{pattern}': {source}")]
    BoundaryPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("invalid parser pattern '{pattern}': {source}")]
    ParserPattern {
        pattern: String,
        source: regex::Error,
    },
    #[error("{filter} filter requires a column typed '{semantic}', but none is configured")]
    MissingTypedColumn {
        filter: &'static str,
        semantic: &'static str,
    },
    #[error("invalid timestamp '{0}' in filter criteria")]
    Timestamp(String),
    #[error("unknown timezone '{0}'")]
    Timezone(String),
    #[error("page size must be a positive integer")]
    PageSize,
}
