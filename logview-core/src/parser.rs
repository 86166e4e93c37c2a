use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Display name of the synthetic trailing column every parsed table carries.
pub const TRACEBACK_COLUMN: &str = "Traceback";

/// Semantic tag telling the filters which parsed column to operate on,
/// independent of its display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SemanticType {
    Time,
    Level,
    #[default]
    Plain,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnSpec {
    pub name: String,
    #[serde(default, rename = "type")]
    pub semantic: SemanticType,
}

impl ColumnSpec {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            semantic: SemanticType::Plain,
        }
    }

    pub fn typed(name: impl Into<String>, semantic: SemanticType) -> Self {
        Self {
            name: name.into(),
            semantic,
        }
    }
}

/// How a record's head line is broken into field values. Each variant carries
/// only the fields its strategy needs, so an incomplete configuration (say, a
/// regex strategy without a pattern) cannot be expressed at all.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ParseStrategy {
    /// Split the head line on a literal separator string. No escaping.
    Separator { separator: String },
    /// The head line is a JSON object; values become fields in key order.
    Json,
    /// The head line must fully match the pattern; its capture groups, in
    /// order, become the field values.
    Regex { pattern: String },
}

/// Per-file parser configuration, supplied by the caller. `columns` may be
/// empty for the JSON strategy, in which case the keys of the first record
/// that parses provide the column names.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParserConfig {
    #[serde(flatten)]
    pub strategy: ParseStrategy,
    #[serde(default)]
    pub columns: Vec<ColumnSpec>,
}

/// One parsed record. A record that fails under the configured strategy is
/// not dropped: it degrades to a diagnostic message plus its raw text so
/// operators can still see what was in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "row", rename_all = "lowercase")]
pub enum TableRow {
    Fields(Vec<String>),
    Degraded { message: String, raw: String },
}

impl TableRow {
    /// Field at `index`, for typed-column lookups. Degraded rows carry no
    /// typed fields.
    pub fn field(&self, index: usize) -> Option<&str> {
        match self {
            TableRow::Fields(values) => values.get(index).map(String::as_str),
            TableRow::Degraded { .. } => None,
        }
    }
}

/// Parsed output of one file: column specs (always ending with the synthetic
/// traceback column) and one row per record.
#[derive(Debug, Clone, Serialize)]
pub struct LogTable {
    pub columns: Vec<ColumnSpec>,
    pub rows: Vec<TableRow>,
}

impl LogTable {
    /// Index of the first column tagged with `semantic`.
    pub fn column_index(&self, semantic: SemanticType) -> Option<usize> {
        column_index(&self.columns, semantic)
    }
}

pub fn column_index(columns: &[ColumnSpec], semantic: SemanticType) -> Option<usize> {
    columns.iter().position(|c| c.semantic == semantic)
}

enum CompiledStrategy {
    Separator(String),
    Json,
    Regex(Regex),
}

impl CompiledStrategy {
    fn new(strategy: &ParseStrategy) -> Result<Self, ConfigError> {
        Ok(match strategy {
            ParseStrategy::Separator { separator } => {
                CompiledStrategy::Separator(separator.clone())
            }
            ParseStrategy::Json => CompiledStrategy::Json,
            ParseStrategy::Regex { pattern } => {
                // Anchor both ends: the configured pattern must consume the
                // whole head line, not just a prefix.
                let full = format!("^(?:{})$", pattern);
                let regex = Regex::new(&full).map_err(|source| ConfigError::ParserPattern {
                    pattern: pattern.clone(),
                    source,
                })?;
                CompiledStrategy::Regex(regex)
            }
        })
    }
}

/// Parse split records into a table under the configured strategy.
///
/// Never fails on record content: a record the strategy cannot handle becomes
/// a [`TableRow::Degraded`] and parsing moves on. The only error case is a
/// configuration problem (an invalid regex pattern), surfaced before any
/// record is looked at.
pub fn parse_records(records: &[String], config: &ParserConfig) -> Result<LogTable, ConfigError> {
    let strategy = CompiledStrategy::new(&config.strategy)?;
    let mut columns = config.columns.clone();
    let mut rows = Vec::with_capacity(records.len());
    let mut degraded = 0usize;

    for record in records {
        let (head, tail) = match record.split_once('\n') {
            Some((head, tail)) => (head, tail),
            None => (record.as_str(), ""),
        };

        match parse_head(head, &strategy) {
            Ok(ParsedHead { names, mut values }) => {
                // JSON key order labels the columns when none are configured.
                // Later records with differing key sets are not reconciled;
                // their values land positionally under the original labels.
                if columns.is_empty() {
                    if let Some(names) = names {
                        columns = names.into_iter().map(ColumnSpec::plain).collect();
                    }
                }
                values.push(tail.to_string());
                rows.push(TableRow::Fields(values));
            }
            Err(message) => {
                degraded += 1;
                rows.push(TableRow::Degraded {
                    message: format!("Parse error: {}", message),
                    raw: record.clone(),
                });
            }
        }
    }

    if degraded > 0 {
        warn!("{} of {} records failed to parse", degraded, records.len());
    }
    debug!("parsed {} records into {} columns", rows.len(), columns.len() + 1);

    columns.push(ColumnSpec::plain(TRACEBACK_COLUMN));
    Ok(LogTable { columns, rows })
}

struct ParsedHead {
    /// Column names discovered from the record itself (JSON strategy only).
    names: Option<Vec<String>>,
    values: Vec<String>,
}

fn parse_head(head: &str, strategy: &CompiledStrategy) -> Result<ParsedHead, String> {
    match strategy {
        CompiledStrategy::Separator(separator) => Ok(ParsedHead {
            names: None,
            values: head.split(separator.as_str()).map(str::to_string).collect(),
        }),
        CompiledStrategy::Json => {
            // Double every backslash first so Windows paths and the like,
            // embedded unescaped in log messages, survive JSON decoding.
            let escaped = head.replace('\\', "\\\\");
            let object: serde_json::Map<String, serde_json::Value> =
                serde_json::from_str(&escaped).map_err(|e| e.to_string())?;

            let names = object.keys().cloned().collect();
            let values = object.values().map(stringify_json_value).collect();
            Ok(ParsedHead {
                names: Some(names),
                values,
            })
        }
        CompiledStrategy::Regex(regex) => {
            let captures = regex
                .captures(head)
                .ok_or_else(|| format!("regex did not match line: {}", head))?;
            let values = captures
                .iter()
                .skip(1)
                .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
                .collect();
            Ok(ParsedHead {
                names: None,
                values,
            })
        }
    }
}

fn stringify_json_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    fn separator_config(sep: &str, names: &[&str]) -> ParserConfig {
        ParserConfig {
            strategy: ParseStrategy::Separator {
                separator: sep.to_string(),
            },
            columns: names.iter().map(|n| ColumnSpec::plain(*n)).collect(),
        }
    }

    #[test]
    fn test_separator_strategy_splits_head_line() {
        let config = separator_config(" | ", &["Time", "Level", "Message"]);
        let table =
            parse_records(&records(&["2024-01-01 | INFO | started"]), &config).unwrap();

        assert_eq!(
            table.rows[0],
            TableRow::Fields(vec![
                "2024-01-01".to_string(),
                "INFO".to_string(),
                "started".to_string(),
                String::new(),
            ])
        );
    }

    #[test]
    fn test_separator_value_count() {
        let config = separator_config(",", &[]);
        let head = "a,b,,d";
        let table = parse_records(&records(&[head]), &config).unwrap();

        match &table.rows[0] {
            TableRow::Fields(values) => {
                // One value per segment plus the traceback field.
                assert_eq!(values.len(), head.matches(',').count() + 1 + 1);
            }
            other => panic!("expected fields, got {:?}", other),
        }
    }

    #[test]
    fn test_traceback_column_always_last() {
        let config = separator_config(" ", &["A", "B"]);
        let table = parse_records(&records(&["x y"]), &config).unwrap();

        assert_eq!(table.columns.last().unwrap().name, TRACEBACK_COLUMN);
        assert_eq!(table.columns.len(), 3);
    }

    #[test]
    fn test_tail_becomes_traceback_field() {
        let config = separator_config(" | ", &["Time", "Message"]);
        let record = "2024-01-01 | boom\nTraceback (most recent call last):\n  File \"x.py\"";
        let table = parse_records(&records(&[record]), &config).unwrap();

        assert_eq!(
            table.rows[0],
            TableRow::Fields(vec![
                "2024-01-01".to_string(),
                "boom".to_string(),
                "Traceback (most recent call last):\n  File \"x.py\"".to_string(),
            ])
        );
    }

    #[test]
    fn test_json_strategy_takes_names_from_first_record() {
        let config = ParserConfig {
            strategy: ParseStrategy::Json,
            columns: vec![],
        };
        let table = parse_records(&records(&[r#"{"a":1,"b":"x"}"#]), &config).unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", TRACEBACK_COLUMN]);
        assert_eq!(
            table.rows[0],
            TableRow::Fields(vec!["1".to_string(), "x".to_string(), String::new()])
        );
    }

    #[test]
    fn test_json_strategy_preserves_key_order() {
        let config = ParserConfig {
            strategy: ParseStrategy::Json,
            columns: vec![],
        };
        let table =
            parse_records(&records(&[r#"{"zeta":1,"alpha":2,"mid":3}"#]), &config).unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid", TRACEBACK_COLUMN]);
    }

    #[test]
    fn test_json_strategy_tolerates_raw_backslashes() {
        let config = ParserConfig {
            strategy: ParseStrategy::Json,
            columns: vec![],
        };
        // A Windows path pasted into a message without JSON escaping.
        let table = parse_records(
            &records(&[r#"{"msg":"open C:\logs\app.log failed"}"#]),
            &config,
        )
        .unwrap();

        match &table.rows[0] {
            TableRow::Fields(values) => assert_eq!(values[0], r"open C:\logs\app.log failed"),
            other => panic!("expected fields, got {:?}", other),
        }
    }

    #[test]
    fn test_json_key_drift_is_positional() {
        // Known limitation: later records with different keys are appended
        // positionally under the first record's labels.
        let config = ParserConfig {
            strategy: ParseStrategy::Json,
            columns: vec![],
        };
        let table = parse_records(
            &records(&[r#"{"a":1,"b":2}"#, r#"{"c":3,"d":4}"#]),
            &config,
        )
        .unwrap();

        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", TRACEBACK_COLUMN]);
        assert_eq!(
            table.rows[1],
            TableRow::Fields(vec!["3".to_string(), "4".to_string(), String::new()])
        );
    }

    #[test]
    fn test_invalid_json_degrades_record() {
        let config = ParserConfig {
            strategy: ParseStrategy::Json,
            columns: vec![],
        };
        let table = parse_records(&records(&["not json at all"]), &config).unwrap();

        match &table.rows[0] {
            TableRow::Degraded { message, raw } => {
                assert!(message.starts_with("Parse error: "));
                assert_eq!(raw, "not json at all");
            }
            other => panic!("expected degraded row, got {:?}", other),
        }
    }

    #[test]
    fn test_regex_strategy_capture_groups() {
        let config = ParserConfig {
            strategy: ParseStrategy::Regex {
                pattern: r"(\d+) (\w+)".to_string(),
            },
            columns: vec![ColumnSpec::plain("Code"), ColumnSpec::plain("Status")],
        };
        let table = parse_records(&records(&["42 ok"]), &config).unwrap();

        assert_eq!(
            table.rows[0],
            TableRow::Fields(vec!["42".to_string(), "ok".to_string(), String::new()])
        );
    }

    #[test]
    fn test_regex_must_match_full_line() {
        let config = ParserConfig {
            strategy: ParseStrategy::Regex {
                pattern: r"(\d+) (\w+)".to_string(),
            },
            columns: vec![],
        };
        // Prefix matches but the trailing text must fail the record.
        let table = parse_records(&records(&["42 ok trailing junk!"]), &config).unwrap();

        assert!(matches!(table.rows[0], TableRow::Degraded { .. }));
    }

    #[test]
    fn test_regex_non_match_degrades_not_empty_row() {
        let config = ParserConfig {
            strategy: ParseStrategy::Regex {
                pattern: r"(\d+) (\w+)".to_string(),
            },
            columns: vec![],
        };
        let table = parse_records(&records(&["no digits here"]), &config).unwrap();

        match &table.rows[0] {
            TableRow::Degraded { message, raw } => {
                assert!(message.contains("did not match"));
                assert_eq!(raw, "no digits here");
            }
            other => panic!("expected degraded row, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_regex_pattern_is_config_error() {
        let config = ParserConfig {
            strategy: ParseStrategy::Regex {
                pattern: "(unclosed".to_string(),
            },
            columns: vec![],
        };
        let err = parse_records(&records(&["anything"]), &config).unwrap_err();
        assert!(matches!(err, ConfigError::ParserPattern { .. }));
    }

    #[test]
    fn test_one_bad_record_does_not_stop_the_file() {
        let config = ParserConfig {
            strategy: ParseStrategy::Regex {
                pattern: r"(\d+) (\w+)".to_string(),
            },
            columns: vec![],
        };
        let table =
            parse_records(&records(&["1 ok", "broken line", "2 fine"]), &config).unwrap();

        assert_eq!(table.rows.len(), 3);
        assert!(matches!(table.rows[0], TableRow::Fields(_)));
        assert!(matches!(table.rows[1], TableRow::Degraded { .. }));
        assert!(matches!(table.rows[2], TableRow::Fields(_)));
    }

    #[test]
    fn test_json_value_stringification() {
        assert_eq!(stringify_json_value(&serde_json::json!("x")), "x");
        assert_eq!(stringify_json_value(&serde_json::json!(1)), "1");
        assert_eq!(stringify_json_value(&serde_json::json!(true)), "true");
        assert_eq!(stringify_json_value(&serde_json::json!(null)), "");
        assert_eq!(stringify_json_value(&serde_json::json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_column_index_by_semantic_type() {
        let config = ParserConfig {
            strategy: ParseStrategy::Separator {
                separator: " ".to_string(),
            },
            columns: vec![
                ColumnSpec::typed("When", SemanticType::Time),
                ColumnSpec::typed("Severity", SemanticType::Level),
                ColumnSpec::plain("Message"),
            ],
        };
        let table = parse_records(&records(&["t l m"]), &config).unwrap();

        assert_eq!(table.column_index(SemanticType::Time), Some(0));
        assert_eq!(table.column_index(SemanticType::Level), Some(1));
    }
}
