use crate::error::DocumentError;
use serde_json::Value;
use std::fmt;
use tracing::warn;

/// A single problem found while validating a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub location: String,
    pub kind: String,
    pub message: String,
}

impl ValidationIssue {
    pub fn new(
        location: impl Into<String>,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ValidationIssue {
            location: location.into(),
            kind: kind.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.kind, self.location, self.message)
    }
}

/// Print issues to stderr in a human readable block.
pub fn print_issues(issues: &[ValidationIssue]) {
    eprintln!(
        "\n❌ OpenAPI document validation failed. {} issue(s) found:\n",
        issues.len()
    );
    for issue in issues {
        eprintln!("{issue}");
    }
    eprintln!("\nFix the document or pass --skip-validation.\n");
}

fn escape_pointer_segment(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

/// Collect every `$ref` that is external or does not resolve.
pub fn collect_ref_issues(root: &Value) -> Vec<ValidationIssue> {
    fn walk(root: &Value, value: &Value, location: &mut String, issues: &mut Vec<ValidationIssue>) {
        match value {
            Value::Object(map) => {
                if let Some(target) = map.get("$ref").and_then(Value::as_str) {
                    match target.strip_prefix('#') {
                        Some(fragment) => {
                            if root.pointer(fragment).is_none() {
                                issues.push(ValidationIssue::new(
                                    location.as_str(),
                                    "UnresolvedReference",
                                    format!("'{target}' does not resolve"),
                                ));
                            }
                        }
                        None => issues.push(ValidationIssue::new(
                            location.as_str(),
                            "ExternalReference",
                            format!("'{target}' points outside the document; bundle it first"),
                        )),
                    }
                }
                for (key, child) in map {
                    let len = location.len();
                    location.push('/');
                    location.push_str(&escape_pointer_segment(key));
                    walk(root, child, location, issues);
                    location.truncate(len);
                }
            }
            Value::Array(items) => {
                for (i, child) in items.iter().enumerate() {
                    let len = location.len();
                    location.push('/');
                    location.push_str(&i.to_string());
                    walk(root, child, location, issues);
                    location.truncate(len);
                }
            }
            _ => {}
        }
    }

    let mut issues = Vec::new();
    let mut location = String::from("#");
    walk(root, root, &mut location, &mut issues);
    issues
}

/// Validate a raw document value.
///
/// The document must deserialize as an `oas3` OpenAPI 3 model and every
/// internal `$ref` must resolve.
pub fn validate_document(value: &Value) -> Result<(), DocumentError> {
    serde_json::from_value::<oas3::OpenApiV3Spec>(value.clone()).map_err(|e| {
        DocumentError::Invalid {
            message: e.to_string(),
        }
    })?;

    let issues = collect_ref_issues(value);
    if issues.is_empty() {
        return Ok(());
    }
    for issue in &issues {
        warn!(location = %issue.location, kind = %issue.kind, "{}", issue.message);
    }
    Err(DocumentError::Validation { issues })
}
