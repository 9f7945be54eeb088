use super::types::Document;
use super::validate::validate_document;
use crate::error::DocumentError;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

/// Options for [`load_document`].
#[derive(Debug, Clone, Copy, Default)]
pub struct LoadOptions {
    /// Skip the oas3 deserialization check and the `$ref` resolution check.
    pub skip_validation: bool,
}

/// Drop path-item keys that are neither HTTP verbs nor standard fields.
///
/// oas3 rejects unknown keys on path items, so vendor tooling that adds
/// its own entries would otherwise fail validation.
fn strip_unknown_verbs(val: &mut Value) {
    const METHODS: [&str; 8] = ["get", "post", "put", "delete", "patch", "options", "head", "trace"];

    if let Some(Value::Object(paths_map)) = val.get_mut("paths") {
        for item in paths_map.values_mut() {
            if let Value::Object(obj) = item {
                let keys: Vec<String> = obj.keys().cloned().collect();
                for k in keys {
                    let lk = k.to_ascii_lowercase();
                    let keep = match lk.as_str() {
                        "summary" | "description" | "servers" | "parameters" | "$ref" => true,
                        m if METHODS.contains(&m) => true,
                        _ => k.starts_with("x-"),
                    };
                    if !keep {
                        debug!(key = %k, "dropping unknown path item key");
                        obj.remove(&k);
                    }
                }
            }
        }
    }
}

fn check_version(value: &Value) -> Result<(), DocumentError> {
    if let Some(version) = value.get("openapi").and_then(Value::as_str) {
        if version.starts_with("3.") {
            return Ok(());
        }
        return Err(DocumentError::UnsupportedVersion {
            version: version.to_string(),
        });
    }
    let version = value
        .get("swagger")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string();
    Err(DocumentError::UnsupportedVersion { version })
}

/// Parse document text (YAML or JSON) into a normalized [`Document`].
pub fn parse_document(
    content: &str,
    origin: &Path,
    options: &LoadOptions,
) -> Result<Document, DocumentError> {
    let is_yaml = origin
        .extension()
        .map(|s| s == "yaml" || s == "yml")
        .unwrap_or(false);
    let mut value: Value = if is_yaml {
        serde_yaml::from_str(content).map_err(|e| DocumentError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        serde_json::from_str(content).map_err(|e| DocumentError::Parse {
            path: origin.to_path_buf(),
            message: e.to_string(),
        })?
    };

    check_version(&value)?;
    strip_unknown_verbs(&mut value);

    if options.skip_validation {
        debug!("skipping document validation");
    } else {
        validate_document(&value)?;
    }

    Ok(Document::from_value(value))
}

/// Load an OpenAPI 3 document from a YAML or JSON file.
pub fn load_document(path: &Path, options: &LoadOptions) -> Result<Document, DocumentError> {
    let content = std::fs::read_to_string(path).map_err(|source| DocumentError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = parse_document(&content, path, options)?;
    info!(
        path = %path.display(),
        title = doc.title().unwrap_or_default(),
        operations = doc.operations().len(),
        "loaded document"
    );
    Ok(doc)
}
