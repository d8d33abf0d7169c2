//! Override documents
//!
//! Override files are parsed into a `serde_json::Value` so the merge only
//! deals with one document model. The format follows the file extension:
//! `.toml`, `.json`, anything else is read as YAML.

use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;

use super::error::ConfigError;

/// Supported override file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Yaml,
    Toml,
    Json,
}

impl DocumentFormat {
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .as_deref()
        {
            Some("toml") => DocumentFormat::Toml,
            Some("json") => DocumentFormat::Json,
            _ => DocumentFormat::Yaml,
        }
    }
}

/// A parsed override file
#[derive(Debug, Clone)]
pub struct LoadedDocument {
    pub value: Value,

    /// SHA-256 digest of the raw file bytes
    pub digest: String,
}

/// Read and parse an override file, returning the document and its digest
pub fn load_document(path: &Path) -> Result<LoadedDocument, ConfigError> {
    let bytes = fs::read(path)?;

    let mut hasher = Sha256::new();
    hasher.update(&bytes);
    let digest = hex::encode(hasher.finalize());

    let contents = String::from_utf8(bytes)
        .map_err(|e| ConfigError::ParseError(format!("Invalid UTF-8 in {}: {}", path.display(), e)))?;

    let value = parse_document(&contents, DocumentFormat::from_path(path))?;
    Ok(LoadedDocument { value, digest })
}

/// Parse override text in the given format.
///
/// An empty or whitespace-only document parses to `null`, which merges as a
/// no-op.
pub fn parse_document(contents: &str, format: DocumentFormat) -> Result<Value, ConfigError> {
    if contents.trim().is_empty() {
        return Ok(Value::Null);
    }

    match format {
        DocumentFormat::Yaml => serde_yaml::from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("YAML parse error: {}", e))),
        DocumentFormat::Json => serde_json::from_str(contents)
            .map_err(|e| ConfigError::ParseError(format!("JSON parse error: {}", e))),
        DocumentFormat::Toml => {
            let toml_value: toml::Value = toml::from_str(contents)
                .map_err(|e| ConfigError::ParseError(format!("TOML parse error: {}", e)))?;
            Ok(toml_to_json(toml_value))
        }
    }
}

/// Convert TOML Value to JSON Value
fn toml_to_json(toml: toml::Value) -> Value {
    match toml {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(i) => Value::Number(i.into()),
        toml::Value::Float(f) => serde_json::Number::from_f64(f)
            .map(Value::Number)
            .unwrap_or(Value::Null),
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(arr) => Value::Array(arr.into_iter().map(toml_to_json).collect()),
        toml::Value::Table(table) => Value::Object(
            table
                .into_iter()
                .map(|(k, v)| (k, toml_to_json(v)))
                .collect(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::Builder;

    #[test]
    fn test_format_from_extension() {
        assert_eq!(DocumentFormat::from_path(Path::new("a.yml")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.YAML")), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.toml")), DocumentFormat::Toml);
        assert_eq!(DocumentFormat::from_path(Path::new("a.json")), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path(Path::new("cfg")), DocumentFormat::Yaml);
    }

    #[test]
    fn test_parse_yaml() {
        let text = "EXP_DIR: res50\nTRAIN:\n  SCALES: [600, 800]\n  LEARNING_RATE: 0.01\n";
        let value = parse_document(text, DocumentFormat::Yaml).unwrap();

        assert_eq!(value["EXP_DIR"], "res50");
        assert_eq!(value["TRAIN"]["SCALES"], json!([600, 800]));
        assert!(value["TRAIN"]["LEARNING_RATE"].is_f64());
    }

    #[test]
    fn test_parse_toml() {
        let text = "EXP_DIR = \"res50\"\n[TRAIN]\nGAMMA = 0.5\nBATCH_SIZE = 256\n";
        let value = parse_document(text, DocumentFormat::Toml).unwrap();

        assert_eq!(value["TRAIN"]["GAMMA"], json!(0.5));
        assert_eq!(value["TRAIN"]["BATCH_SIZE"], json!(256));
    }

    #[test]
    fn test_empty_document_is_null() {
        assert_eq!(parse_document("  \n", DocumentFormat::Yaml).unwrap(), Value::Null);
    }

    #[test]
    fn test_parse_error() {
        let err = parse_document("TRAIN: [1, 2", DocumentFormat::Yaml).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_load_document_digest() {
        let mut temp = Builder::new().suffix(".json").tempfile().unwrap();
        write!(temp, "{{\"RNG_SEED\": 5}}").unwrap();

        let doc = load_document(temp.path()).unwrap();
        assert_eq!(doc.value, json!({"RNG_SEED": 5}));
        assert_eq!(doc.digest.len(), 64);
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_document(Path::new("/nonexistent/override.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
