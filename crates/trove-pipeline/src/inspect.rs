//! Raw-file inspection for diagnosing unexpected input shapes.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use trove_core::constants::INSPECT_PREVIEW_CHARS;
use trove_core::error::IngestError;

/// Top-level structure of a JSON document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JsonShape {
    Object {
        keys: Vec<String>,
        /// For each array-valued key, the keys of its first object element.
        first_item_keys: BTreeMap<String, Vec<String>>,
    },
    Array {
        len: usize,
        first_item_keys: Vec<String>,
    },
    Scalar(&'static str),
    Invalid {
        line: usize,
        column: usize,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileShape {
    pub path: PathBuf,
    pub size_bytes: u64,
    pub preview: String,
    pub shape: JsonShape,
}

/// Read `path` and describe its size, leading text and JSON structure.
///
/// A syntax error is reported in the shape, not as an error.
pub fn inspect_file(path: &Path) -> Result<FileShape, IngestError> {
    let text = fs::read_to_string(path).map_err(|e| IngestError::Read {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;

    let shape = match serde_json::from_str::<Value>(&text) {
        Ok(doc) => describe(&doc),
        Err(e) => JsonShape::Invalid { line: e.line(), column: e.column(), message: e.to_string() },
    };

    Ok(FileShape {
        path: path.to_path_buf(),
        size_bytes: text.len() as u64,
        preview: text.chars().take(INSPECT_PREVIEW_CHARS).collect(),
        shape,
    })
}

fn describe(doc: &Value) -> JsonShape {
    match doc {
        Value::Object(obj) => JsonShape::Object {
            keys: obj.keys().cloned().collect(),
            first_item_keys: obj
                .iter()
                .filter_map(|(k, v)| v.as_array().map(|items| (k.clone(), object_keys(items.first()))))
                .collect(),
        },
        Value::Array(items) => JsonShape::Array {
            len: items.len(),
            first_item_keys: object_keys(items.first()),
        },
        Value::Null => JsonShape::Scalar("null"),
        Value::Bool(_) => JsonShape::Scalar("bool"),
        Value::Number(_) => JsonShape::Scalar("number"),
        Value::String(_) => JsonShape::Scalar("string"),
    }
}

fn object_keys(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_object)
        .map(|obj| obj.keys().cloned().collect())
        .unwrap_or_default()
}

impl fmt::Display for FileShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "File: {}", self.path.display())?;
        writeln!(f, "Size: {} bytes", self.size_bytes)?;
        writeln!(f, "Preview: {}", self.preview)?;
        match &self.shape {
            JsonShape::Object { keys, first_item_keys } => {
                writeln!(f, "Type: object")?;
                writeln!(f, "Keys: {}", keys.join(", "))?;
                for (key, item_keys) in first_item_keys {
                    writeln!(f, "  {key}[0] keys: {}", item_keys.join(", "))?;
                }
            }
            JsonShape::Array { len, first_item_keys } => {
                writeln!(f, "Type: array ({len} items)")?;
                writeln!(f, "First item keys: {}", first_item_keys.join(", "))?;
            }
            JsonShape::Scalar(kind) => writeln!(f, "Type: {kind}")?,
            JsonShape::Invalid { line, column, message } => {
                writeln!(f, "Invalid JSON at line {line}, column {column}: {message}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write(dir: &Path, name: &str, body: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, body).unwrap();
        path
    }

    #[test]
    fn object_with_deposits_array() {
        let dir = tempfile::tempdir().unwrap();
        let body = r#"{"deposits": [{"id": "1", "amountUSD": "2"}], "meta": {"page": 1}, "empty": []}"#;
        let shape = inspect_file(&write(dir.path(), "raw.json", body)).unwrap();

        assert_eq!(shape.size_bytes, body.len() as u64);
        let JsonShape::Object { keys, first_item_keys } = shape.shape else {
            panic!("expected object");
        };
        assert_eq!(keys, vec!["deposits", "empty", "meta"]);
        assert_eq!(first_item_keys["deposits"], vec!["amountUSD", "id"]);
        assert!(first_item_keys["empty"].is_empty());
        assert!(!first_item_keys.contains_key("meta"));
    }

    #[test]
    fn preview_is_truncated() {
        let dir = tempfile::tempdir().unwrap();
        let body = format!("[{}]", vec!["1"; 300].join(","));
        let shape = inspect_file(&write(dir.path(), "big.json", &body)).unwrap();
        assert_eq!(shape.preview.chars().count(), INSPECT_PREVIEW_CHARS);
        assert_eq!(shape.shape, JsonShape::Array { len: 300, first_item_keys: vec![] });
    }

    #[test]
    fn syntax_error_reports_position() {
        let dir = tempfile::tempdir().unwrap();
        let shape = inspect_file(&write(dir.path(), "bad.json", "{\n  \"a\": ,\n}")).unwrap();
        match &shape.shape {
            JsonShape::Invalid { line, .. } => assert_eq!(*line, 2),
            other => panic!("unexpected shape {other:?}"),
        }
        assert!(shape.to_string().contains("line 2"));
    }

    #[test]
    fn unreadable_file_is_error() {
        let err = inspect_file(Path::new("/nonexistent/raw.json")).unwrap_err();
        assert!(matches!(err, IngestError::Read { .. }));
    }
}
