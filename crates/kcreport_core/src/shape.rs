use serde_json::{Map as JsonMap, Value as JsonValue};

use crate::error::{ReportError, ReportErrorCode};

/// Nesting path to a record collection inside a parsed document. The
/// supported inputs differ only in whether the array sits directly under
/// the data key or one object level further down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionShape {
    pub data_key: &'static str,
    pub collection_key: Option<&'static str>,
}

pub const MASTER_SHIP_TYPES: CollectionShape = CollectionShape {
    data_key: "api_data",
    collection_key: Some("api_mst_stype"),
};

pub const MASTER_SHIPS: CollectionShape = CollectionShape {
    data_key: "api_data",
    collection_key: Some("api_mst_ship"),
};

pub const MASTER_SLOT_ITEMS: CollectionShape = CollectionShape {
    data_key: "api_data",
    collection_key: Some("api_mst_slotitem"),
};

pub const PORT_SHIPS: CollectionShape = CollectionShape {
    data_key: "api_data",
    collection_key: Some("api_ship"),
};

pub const SLOT_ITEM_LIST: CollectionShape = CollectionShape {
    data_key: "api_data",
    collection_key: None,
};

pub fn records<'a>(
    root: &'a JsonMap<String, JsonValue>,
    shape: &CollectionShape,
) -> Result<Vec<&'a JsonMap<String, JsonValue>>, ReportError> {
    let data = root
        .get(shape.data_key)
        .ok_or_else(|| missing_key(shape.data_key))?;

    let list = match shape.collection_key {
        Some(key) => {
            let inner = data
                .as_object()
                .ok_or_else(|| wrong_type(shape.data_key, "object", data))?;
            let value = inner.get(key).ok_or_else(|| missing_key(key))?;
            value.as_array().ok_or_else(|| wrong_type(key, "array", value))?
        }
        None => data
            .as_array()
            .ok_or_else(|| wrong_type(shape.data_key, "array", data))?,
    };

    let collection = shape.collection_key.unwrap_or(shape.data_key);
    let mut out = Vec::with_capacity(list.len());
    for (index, entry) in list.iter().enumerate() {
        let record = entry.as_object().ok_or_else(|| {
            ReportError::new(
                ReportErrorCode::Parse,
                format!("record {index} under {collection} is not an object"),
            )
        })?;
        out.push(record);
    }
    Ok(out)
}

pub fn require_value<'a>(
    record: &'a JsonMap<String, JsonValue>,
    key: &str,
) -> Result<&'a JsonValue, ReportError> {
    record.get(key).ok_or_else(|| missing_key(key))
}

pub fn require_i64(record: &JsonMap<String, JsonValue>, key: &str) -> Result<i64, ReportError> {
    let value = require_value(record, key)?;
    as_i64(value).ok_or_else(|| wrong_type(key, "integer", value))
}

pub fn require_str<'a>(
    record: &'a JsonMap<String, JsonValue>,
    key: &str,
) -> Result<&'a str, ReportError> {
    let value = require_value(record, key)?;
    value.as_str().ok_or_else(|| wrong_type(key, "string", value))
}

pub fn require_array<'a>(
    record: &'a JsonMap<String, JsonValue>,
    key: &str,
) -> Result<&'a [JsonValue], ReportError> {
    let value = require_value(record, key)?;
    value
        .as_array()
        .map(Vec::as_slice)
        .ok_or_else(|| wrong_type(key, "array", value))
}

/// Integral floats are accepted: upstream emitters decode every JSON
/// number as a double, so ids can arrive as `5.0`.
pub fn as_i64(value: &JsonValue) -> Option<i64> {
    let JsonValue::Number(number) = value else {
        return None;
    };
    if let Some(integer) = number.as_i64() {
        return Some(integer);
    }
    number
        .as_f64()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
}

fn missing_key(key: &str) -> ReportError {
    ReportError::new(ReportErrorCode::Parse, format!("missing required key {key}"))
}

fn wrong_type(key: &str, expected: &str, value: &JsonValue) -> ReportError {
    ReportError::new(
        ReportErrorCode::Parse,
        format!("{key} must be {expected}, got {}", type_label(value)),
    )
}

fn type_label(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
