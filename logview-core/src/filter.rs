use crate::error::ConfigError;
use crate::parser::{column_index, ColumnSpec, SemanticType, TableRow};
use crate::timefmt::parse_naive;
use chrono::NaiveDateTime;
use serde::Deserialize;
use tracing::debug;

/// One query's worth of filtering, as it arrives from the caller. All fields
/// optional; an empty criteria set keeps every row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring to look for in any field.
    pub search: Option<String>,
    /// Case-insensitive exact match against the level-typed column.
    pub level: Option<String>,
    /// Inclusive ISO-8601 lower bound against the time-typed column.
    pub time_from: Option<String>,
    /// Inclusive ISO-8601 upper bound against the time-typed column.
    pub time_to: Option<String>,
}

impl FilterCriteria {
    pub fn is_empty(&self) -> bool {
        self.search.is_none()
            && self.level.is_none()
            && self.time_from.is_none()
            && self.time_to.is_none()
    }
}

/// Filter parsed rows, preserving order.
///
/// Requesting a level or time filter against a column set that carries no
/// matching semantic tag is a configuration error, surfaced before any row is
/// inspected. A row whose time value will not parse is excluded from time
/// filtering rather than failing the query.
pub fn filter_rows(
    rows: Vec<TableRow>,
    columns: &[ColumnSpec],
    criteria: &FilterCriteria,
) -> Result<Vec<TableRow>, ConfigError> {
    if criteria.is_empty() {
        return Ok(rows);
    }

    let level_column = match &criteria.level {
        Some(_) => Some(column_index(columns, SemanticType::Level).ok_or(
            ConfigError::MissingTypedColumn {
                filter: "level",
                semantic: "level",
            },
        )?),
        None => None,
    };

    let time_column = if criteria.time_from.is_some() || criteria.time_to.is_some() {
        Some(
            column_index(columns, SemanticType::Time).ok_or(ConfigError::MissingTypedColumn {
                filter: "time range",
                semantic: "time",
            })?,
        )
    } else {
        None
    };

    let time_from = parse_bound(criteria.time_from.as_deref())?;
    let time_to = parse_bound(criteria.time_to.as_deref())?;

    let total = rows.len();
    let kept: Vec<TableRow> = rows
        .into_iter()
        .filter(|row| {
            if let Some(query) = &criteria.search {
                if !matches_search(row, query) {
                    return false;
                }
            }
            if let (Some(index), Some(wanted)) = (level_column, &criteria.level) {
                match row.field(index) {
                    Some(value) if value.eq_ignore_ascii_case(wanted) => {}
                    _ => return false,
                }
            }
            if let Some(index) = time_column {
                let Some(time) = row.field(index).and_then(parse_naive) else {
                    return false;
                };
                if time_from.is_some_and(|from| time < from) {
                    return false;
                }
                if time_to.is_some_and(|to| time > to) {
                    return false;
                }
            }
            true
        })
        .collect();

    debug!("filter kept {} of {} rows", kept.len(), total);
    Ok(kept)
}

fn parse_bound(bound: Option<&str>) -> Result<Option<NaiveDateTime>, ConfigError> {
    match bound {
        None => Ok(None),
        Some(value) => parse_naive(value)
            .map(Some)
            .ok_or_else(|| ConfigError::Timestamp(value.to_string())),
    }
}

fn matches_search(row: &TableRow, query: &str) -> bool {
    if query.is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    match row {
        TableRow::Fields(values) => values
            .iter()
            .any(|value| value.to_lowercase().contains(&query)),
        // Broken records stay findable through their diagnostic and raw text.
        TableRow::Degraded { message, raw } => {
            message.to_lowercase().contains(&query) || raw.to_lowercase().contains(&query)
        }
    }
}
