//! Error types for document loading, graph construction and selection.

use serde_json::Value;
use std::path::PathBuf;
use thiserror::Error;

use crate::document::ValidationIssue;

/// Failures at the document loader boundary.
///
/// These are fatal for the whole run and are surfaced to the caller
/// unmodified (wrapped in [`GenError::Document`]).
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unsupported document version '{version}': only OpenAPI 3.x is supported")]
    UnsupportedVersion { version: String },

    #[error("document is not a valid OpenAPI 3 description: {message}")]
    Invalid { message: String },

    #[error("document validation failed with {} issue(s)", issues.len())]
    Validation { issues: Vec<ValidationIssue> },
}

/// Errors raised by the graph, the selection resolver and the generator.
#[derive(Debug, Error)]
pub enum GenError {
    #[error(transparent)]
    Document(#[from] DocumentError),

    /// A schema fragment maps to no node variant.
    #[error("unsupported schema kind at {path}: {schema}")]
    UnsupportedSchemaKind { schema: Value, path: String },

    /// A `$ref` pointer has no target in the document.
    #[error("missing reference {pointer} (from {path})")]
    MissingReference { pointer: String, path: String },

    /// A selection path segment matched no child.
    #[error(
        "selection path not found: {path} (matched up to '{matched}', available: [{}])",
        available.join(", ")
    )]
    PathNotFound {
        path: String,
        matched: String,
        available: Vec<String>,
    },

    /// A root field was requested for a node that is not an operation.
    #[error("{path} is not an operation")]
    NotAnOperation { path: String },

    #[error("invalid selections file {path}: {message}")]
    Selections { path: PathBuf, message: String },

    #[error("template rendering failed: {0}")]
    Template(#[from] minijinja::Error),
}

impl GenError {
    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Document(DocumentError::Io { .. }) | Self::Selections { .. } => 3,
            Self::Document(_) => 2,
            _ => 1,
        }
    }
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
