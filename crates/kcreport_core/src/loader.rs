use std::fs;
use std::path::Path;

use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{ReportError, ReportErrorCode};

/// Reads a JSON document that may carry non-JSON framing bytes (JSONP
/// callback wrappers, trailing garbage) around the object itself.
pub fn load_document(path: &Path) -> Result<JsonMap<String, JsonValue>, ReportError> {
    let bytes = fs::read(path).map_err(|e| {
        ReportError::new(
            ReportErrorCode::Io,
            format!("failed to read {}: {e}", path.display()),
        )
    })?;
    let body = strip_framing(&bytes)?;
    let value: JsonValue = serde_json::from_slice(body).map_err(|e| {
        ReportError::new(
            ReportErrorCode::Parse,
            format!("failed to parse {}: {e}", path.display()),
        )
    })?;
    match value {
        JsonValue::Object(map) => Ok(map),
        _ => Err(ReportError::new(
            ReportErrorCode::Parse,
            format!("{}: expected a top-level JSON object", path.display()),
        )),
    }
}

pub fn strip_framing(bytes: &[u8]) -> Result<&[u8], ReportError> {
    let start = bytes.iter().position(|&b| b == b'{');
    let end = bytes.iter().rposition(|&b| b == b'}');
    match (start, end) {
        (Some(start), Some(end)) if start <= end => Ok(&bytes[start..=end]),
        _ => Err(ReportError::new(
            ReportErrorCode::Parse,
            "input contains no JSON object",
        )),
    }
}
