use std::io::{self, Write};

use serde_json::Value as JsonValue;

use crate::error::{ReportError, ReportErrorCode};

/// Renders an arbitrary JSON tree as indented text for ad-hoc inspection.
/// Object keys are visited in sorted order so the same tree always dumps
/// to identical bytes.
pub fn dump_value<W: Write>(
    out: &mut W,
    label: &str,
    value: &JsonValue,
) -> Result<(), ReportError> {
    dump_level(out, label, value, 0).map_err(|e| {
        ReportError::new(ReportErrorCode::Io, format!("failed to write dump: {e}"))
    })
}

fn dump_level<W: Write>(
    out: &mut W,
    label: &str,
    value: &JsonValue,
    level: usize,
) -> io::Result<()> {
    let indent = "  ".repeat(level);
    match value {
        JsonValue::Object(map) => {
            writeln!(out, "{indent}{label} {{")?;
            let mut entries: Vec<(&String, &JsonValue)> = map.iter().collect();
            entries.sort_by_key(|(key, _)| *key);
            for (key, child) in entries {
                dump_level(out, key, child, level + 1)?;
            }
            writeln!(out, "{indent}}}")
        }
        JsonValue::Array(items) => {
            writeln!(out, "{indent}{label} [")?;
            for (index, item) in items.iter().enumerate() {
                dump_level(out, &format!("[{index}]"), item, level + 1)?;
            }
            writeln!(out, "{indent}]")
        }
        JsonValue::String(s) => writeln!(out, "{indent}{label} = {s}"),
        other => writeln!(out, "{indent}{label} = {other}"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::dump_value;

    fn dump_to_string(value: &serde_json::Value) -> String {
        let mut out = Vec::new();
        dump_value(&mut out, "home", value).expect("dump should write");
        String::from_utf8(out).expect("dump output should be utf-8")
    }

    #[test]
    fn renders_nested_tree_with_sorted_keys() {
        let value = json!({
            "b": [1, "two", null],
            "a": {"y": true, "x": 2},
        });
        let expected = "\
home {
  a {
    x = 2
    y = true
  }
  b [
    [0] = 1
    [1] = two
    [2] = null
  ]
}
";
        assert_eq!(dump_to_string(&value), expected);
    }

    #[test]
    fn renders_primitive_root() {
        let mut out = Vec::new();
        dump_value(&mut out, "home", &json!(42)).expect("dump should write");
        assert_eq!(String::from_utf8_lossy(&out), "home = 42\n");
    }

    #[test]
    fn dump_is_deterministic() {
        let value = json!({
            "z": {"k": 1, "a": [3, 2, 1]},
            "m": "text",
            "a": false,
        });
        assert_eq!(dump_to_string(&value), dump_to_string(&value));
    }
}
