use serde_json::Value;
use std::fmt;

pub const SCHEMAS_PREFIX: &str = "#/components/schemas/";
pub const RESPONSES_PREFIX: &str = "#/components/responses/";
pub const PARAMETERS_PREFIX: &str = "#/components/parameters/";
pub const REQUEST_BODIES_PREFIX: &str = "#/components/requestBodies/";

/// Pointer prefixes the resolver knows how to follow.
pub const KNOWN_PREFIXES: [&str; 4] = [
    SCHEMAS_PREFIX,
    RESPONSES_PREFIX,
    PARAMETERS_PREFIX,
    REQUEST_BODIES_PREFIX,
];

/// HTTP methods that produce operation roots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    /// Scan order for a path item.
    pub const ALL: [HttpMethod; 5] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Lowercase key as it appears in a path item (and in operation ids).
    pub fn key(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Patch => "patch",
            HttpMethod::Delete => "delete",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.key().eq_ignore_ascii_case(key))
    }

    /// Methods that carry a request body.
    pub fn is_write(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }

    /// GET operations become `Query` fields, everything else `Mutation`.
    pub fn is_query(&self) -> bool {
        matches!(self, HttpMethod::Get)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One operation found while scanning `paths`.
#[derive(Debug, Clone)]
pub struct OperationEntry {
    pub method: HttpMethod,
    pub path: String,
    pub operation: Value,
    /// Parameters declared on the path item, shared by all its operations.
    pub shared_parameters: Vec<Value>,
}

/// An OpenAPI 3 document that has already been loaded and normalized.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
}

impl Document {
    pub fn from_value(root: Value) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Value {
        &self.root
    }

    pub fn title(&self) -> Option<&str> {
        self.root.pointer("/info/title").and_then(Value::as_str)
    }

    /// URL of the first declared server, if any.
    pub fn base_url(&self) -> Option<&str> {
        self.root.pointer("/servers/0/url").and_then(Value::as_str)
    }

    /// Resolve a ref pointer to the schema, response, parameter or request
    /// body it addresses.
    ///
    /// Only the well-known component prefixes are followed; anything else
    /// resolves to `None`.
    pub fn lookup(&self, pointer: &str) -> Option<&Value> {
        if !KNOWN_PREFIXES.iter().any(|p| pointer.starts_with(p)) {
            return None;
        }
        pointer
            .strip_prefix('#')
            .and_then(|fragment| self.root.pointer(fragment))
    }

    /// Every supported operation in document order.
    pub fn operations(&self) -> Vec<OperationEntry> {
        let mut entries = Vec::new();
        let Some(paths) = self.root.get("paths").and_then(Value::as_object) else {
            return entries;
        };
        for (path, item) in paths {
            let shared_parameters = item
                .get("parameters")
                .and_then(Value::as_array)
                .cloned()
                .unwrap_or_default();
            for method in HttpMethod::ALL {
                if let Some(operation) = item.get(method.key()).filter(|v| v.is_object()) {
                    entries.push(OperationEntry {
                        method,
                        path: path.clone(),
                        operation: operation.clone(),
                        shared_parameters: shared_parameters.clone(),
                    });
                }
            }
        }
        entries
    }
}

/// Short name of a component pointer (`#/components/schemas/Pet` -> `Pet`).
pub fn component_name(pointer: &str) -> &str {
    KNOWN_PREFIXES
        .iter()
        .find_map(|p| pointer.strip_prefix(p))
        .unwrap_or(pointer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_lookup_known_prefixes_only() {
        let doc = Document::from_value(json!({
            "components": {
                "schemas": { "Pet": { "type": "object" } },
                "parameters": { "Limit": { "name": "limit", "in": "query" } }
            },
            "info": { "title": "x" }
        }));
        assert!(doc.lookup("#/components/schemas/Pet").is_some());
        assert!(doc.lookup("#/components/parameters/Limit").is_some());
        assert!(doc.lookup("#/components/schemas/Missing").is_none());
        assert!(doc.lookup("#/info").is_none());
    }

    #[test]
    fn test_operations_in_document_order() {
        let doc = Document::from_value(json!({
            "paths": {
                "/b": { "post": {}, "get": {} },
                "/a": { "delete": {}, "parameters": [{ "name": "x", "in": "query" }] }
            }
        }));
        let ops: Vec<_> = doc
            .operations()
            .into_iter()
            .map(|e| format!("{} {}", e.method, e.path))
            .collect();
        assert_eq!(ops, vec!["GET /b", "POST /b", "DELETE /a"]);
        assert_eq!(doc.operations()[2].shared_parameters.len(), 1);
    }

    #[test]
    fn test_component_name() {
        assert_eq!(component_name("#/components/schemas/Pet"), "Pet");
        assert_eq!(component_name("#/components/responses/NotFound"), "NotFound");
        assert_eq!(component_name("Other"), "Other");
    }
}
