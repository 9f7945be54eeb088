//! # Naming Module
//!
//! Turns raw identifiers from the source document (component names,
//! property keys, parameter names, operation ids, URL paths) into GraphQL
//! names.
//!
//! Names are produced by small [`Pipeline`]s of [`NameStep`]s; each step is
//! a pure `String -> String` transform and the pipeline runs them in order.
//!
//! | Pipeline | Input | Output |
//! |---|---|---|
//! | [`type_name`] | `#/components/schemas/pet-store.Item` | `PetStoreItem` |
//! | [`field_name`] | `first_name`, `@type`, `items[]` | `firstName`, `type`, `items` |
//! | [`operation_name`] | `GET /pets/{petId}` | `getPetsByPetId` |
//!
//! Fields whose GraphQL name differs from the JSON key are aliased in
//! selection bodies by [`selection_field`].

mod pipeline;

pub use pipeline::*;

use crate::document::HttpMethod;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier regex should be valid"));

/// Placeholder used for fields whose name is reserved by GraphQL.
pub const RESERVED_PLACEHOLDER: &str = "reservedField";

static TYPE_NAME: Lazy<Pipeline> = Lazy::new(|| {
    Pipeline::new()
        .then(StripRefPrefix)
        .then(ReplaceBrackets)
        .then(DropInvalidChars)
        .then(SplitWords)
        .then(JoinCase::Pascal)
        .then(LeadingDigitGuard)
});

static FIELD_NAME: Lazy<Pipeline> = Lazy::new(|| {
    Pipeline::new()
        .then(ReplaceBrackets)
        .then(DropInvalidChars)
        .then(SplitWords)
        .then(JoinCase::Camel)
        .then(LeadingDigitGuard)
});

/// GraphQL type name for a component or synthesized name.
pub fn type_name(raw: &str) -> String {
    let name = TYPE_NAME.run(raw);
    if name.is_empty() {
        "Anonymous".to_string()
    } else {
        name
    }
}

/// GraphQL field or argument name for a JSON key or parameter name.
pub fn field_name(raw: &str) -> String {
    let name = FIELD_NAME.run(raw);
    if name.is_empty() {
        "value".to_string()
    } else {
        name
    }
}

/// Root field name for an operation.
///
/// The `operationId` wins when present; otherwise the name is built from
/// the method and the path, with `{param}` segments rendered as `ByParam`.
pub fn operation_name(method: HttpMethod, path: &str, operation_id: Option<&str>) -> String {
    if let Some(id) = operation_id.filter(|id| !id.trim().is_empty()) {
        return field_name(id);
    }
    let mut raw = String::from(method.key());
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        raw.push(' ');
        match segment.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            Some(param) => {
                raw.push_str("by ");
                raw.push_str(param);
            }
            None => raw.push_str(segment),
        }
    }
    field_name(&raw)
}

pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER.is_match(name)
}

/// Whether a raw enum value can be emitted as a GraphQL enum value.
pub fn is_enum_value(value: &str) -> bool {
    is_identifier(value) && !matches!(value, "true" | "false" | "null")
}

/// A field name after the reserved-name guard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardedName {
    pub name: String,
    /// Trailing comment explaining a substitution.
    pub comment: Option<String>,
}

/// Replace names reserved by GraphQL introspection (`__` prefix).
pub fn guard_reserved(raw: &str) -> GuardedName {
    if raw.starts_with("__") {
        return GuardedName {
            name: RESERVED_PLACEHOLDER.to_string(),
            comment: Some(format!("\"{raw}\" is a reserved name")),
        };
    }
    GuardedName {
        name: field_name(raw),
        comment: None,
    }
}

/// Render one selection entry mapping a GraphQL field to a JSON key.
///
/// Keys that are not plain identifiers (`:`, `-`, `.`, a leading `@`,
/// whitespace) are quoted.
pub fn selection_field(graphql_name: &str, json_name: &str) -> String {
    if graphql_name == json_name {
        json_name.to_string()
    } else if is_identifier(json_name) {
        format!("{graphql_name}: {json_name}")
    } else {
        format!("{graphql_name}: \"{}\"", json_name.replace('"', "\\\""))
    }
}

/// Render one body entry mapping a JSON key to an argument field.
pub fn body_field(json_name: &str, graphql_name: &str) -> String {
    if graphql_name == json_name {
        json_name.to_string()
    } else if is_identifier(json_name) {
        format!("{json_name}: {graphql_name}")
    } else {
        format!("\"{}\": {graphql_name}", json_name.replace('"', "\\\""))
    }
}

/// Return `name`, or `name2`, `name3`, ... when already taken.
pub fn unique_name(seen: &mut HashSet<String>, name: &str) -> String {
    if seen.insert(name.to_string()) {
        return name.to_string();
    }
    let mut counter = 2;
    loop {
        let candidate = format!("{name}{counter}");
        if seen.insert(candidate.clone()) {
            tracing::warn!(name, candidate = %candidate, "duplicate name, using suffix");
            return candidate;
        }
        counter += 1;
    }
}
