use crate::error::ConfigError;
use regex::Regex;
use tracing::debug;

/// Set of "new record starts here" patterns, compiled once as a single
/// anchored alternation. A line opens a new record when any pattern matches
/// at its start; the match does not have to consume the whole line.
#[derive(Debug, Clone)]
pub struct RecordBoundaries {
    pattern: Regex,
}

impl RecordBoundaries {
    pub fn new(patterns: &[String]) -> Result<Self, ConfigError> {
        // An empty alternation would match every line; make it match none.
        let source = if patterns.is_empty() {
            r"[^\s\S]".to_string()
        } else {
            let alternation = patterns
                .iter()
                .map(|p| format!("(?:{})", p))
                .collect::<Vec<_>>()
                .join("|");
            format!("^(?:{})", alternation)
        };
        let pattern = Regex::new(&source).map_err(|source| ConfigError::BoundaryPattern {
            pattern: patterns.join("|"),
            source,
        })?;
        Ok(Self { pattern })
    }

    pub fn starts_record(&self, line: &str) -> bool {
        self.pattern.is_match(line)
    }
}

/// Split raw log content into logical records.
///
/// A record is a maximal run of lines where only the first may match a
/// boundary pattern: the very first line always opens the first record, a
/// matching line later on closes the current record and opens the next, and
/// everything else (continuation lines, stack traces) is appended to the
/// record being accumulated.
pub fn split_records(content: &str, boundaries: &RecordBoundaries) -> Vec<String> {
    let mut records = Vec::new();
    let mut current: Vec<&str> = Vec::new();

    for line in content.lines() {
        if boundaries.starts_record(line) && !current.is_empty() {
            records.push(current.join("\n"));
            current = vec![line];
        } else {
            current.push(line);
        }
    }

    if !current.is_empty() {
        records.push(current.join("\n"));
    }

    debug!("split content into {} records", records.len());
    records
}
