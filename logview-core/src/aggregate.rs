use crate::error::ConfigError;
use crate::parser::{column_index, ColumnSpec, SemanticType, TableRow};
use crate::timefmt::resolve_in_zone;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tracing::debug;

/// Inputs for the "errors since a reference time" badge count.
#[derive(Debug, Clone)]
pub struct ErrorCountQuery {
    /// Rows at or after this instant are candidates.
    pub reference_time: DateTime<Utc>,
    /// IANA timezone name used to resolve offset-less row timestamps.
    pub timezone_name: String,
}

impl ErrorCountQuery {
    /// Build a query from caller-supplied strings. The reference timestamp
    /// accepts the same ISO-8601 shapes as row values; an offset-less value
    /// is wall clock in `timezone_name`.
    pub fn new(reference_time: &str, timezone_name: &str) -> Result<Self, ConfigError> {
        let tz: Tz = timezone_name
            .parse()
            .map_err(|_| ConfigError::Timezone(timezone_name.to_string()))?;
        let reference_time = resolve_in_zone(reference_time, tz)
            .ok_or_else(|| ConfigError::Timestamp(reference_time.to_string()))?;
        Ok(Self {
            reference_time,
            timezone_name: timezone_name.to_string(),
        })
    }
}

const ERROR_LEVELS: &[&str] = &["error", "critical"];

/// Count rows that are both recent (time >= reference) and of error or
/// critical severity.
///
/// Needs a time-typed and a level-typed column to mean anything; when either
/// is missing the count is simply 0, since the caller uses this to decorate
/// listings and files without those hints just have nothing to report. An
/// unknown timezone name, by contrast, is a configuration error. Row
/// timestamps that fail to parse (or fall in a DST gap) are skipped.
pub fn count_recent_errors(
    rows: &[TableRow],
    columns: &[ColumnSpec],
    query: &ErrorCountQuery,
) -> Result<usize, ConfigError> {
    let (Some(time_column), Some(level_column)) = (
        column_index(columns, SemanticType::Time),
        column_index(columns, SemanticType::Level),
    ) else {
        return Ok(0);
    };

    let tz: Tz = query
        .timezone_name
        .parse()
        .map_err(|_| ConfigError::Timezone(query.timezone_name.clone()))?;

    let count = rows
        .iter()
        .filter(|row| {
            let Some(level) = row.field(level_column) else {
                return false;
            };
            if !ERROR_LEVELS.contains(&level.to_lowercase().as_str()) {
                return false;
            }
            row.field(time_column)
                .and_then(|value| resolve_in_zone(value, tz))
                .is_some_and(|time| time >= query.reference_time)
        })
        .count();

    debug!(
        "{} errors at or after {} across {} rows",
        count, query.reference_time, rows.len()
    );
    Ok(count)
}
