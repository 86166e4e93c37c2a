use anyhow::{Context, Result};
use logview_core::{ParserConfig, RecordBoundaries};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Viewer configuration file: which lines start a new record, and how to
/// break a record's head line into columns.
///
/// ```toml
/// record_start_patterns = ['\d{4}-\d{2}-\d{2}']
///
/// [parser]
/// type = "separator"
/// separator = " | "
/// columns = [
///     { name = "Time", type = "time" },
///     { name = "Level", type = "level" },
///     { name = "Message" },
/// ]
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct ViewerConfig {
    #[serde(default)]
    pub record_start_patterns: Vec<String>,
    pub parser: ParserConfig,
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        let config: ViewerConfig = toml::from_str(&text)
            .with_context(|| format!("invalid config file {}", path.display()))?;
        Ok(config)
    }

    pub fn boundaries(&self) -> Result<RecordBoundaries> {
        Ok(RecordBoundaries::new(&self.record_start_patterns)?)
    }
}
