use anyhow::{Context, Result};
use encoding_rs::WINDOWS_1252;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Read a log file into the single decoded text blob the engine consumes.
///
/// Log files are frequently not clean UTF-8: BOMs from Windows tooling,
/// Latin-1 bytes in legacy messages. Decode tolerantly so a stray byte never
/// blocks viewing the file: honor a BOM if present, try strict UTF-8, fall
/// back to Windows-1252 (a superset of ISO-8859-1 that accepts any byte).
pub fn read_log_content(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    debug!("read {} bytes from {}", data.len(), path.display());
    Ok(decode_content(&data))
}

pub fn decode_content(data: &[u8]) -> String {
    if let Some((encoding, _bom_len)) = encoding_rs::Encoding::for_bom(data) {
        info!("decoding content as {} via BOM", encoding.name());
        let (text, _, _) = encoding.decode(data);
        return text.into_owned();
    }

    match std::str::from_utf8(data) {
        Ok(text) => text.to_string(),
        Err(_) => {
            info!("decoding non-UTF-8 content as Windows-1252");
            let (text, _, _) = WINDOWS_1252.decode(data);
            text.into_owned()
        }
    }
}
