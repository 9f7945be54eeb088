//! Shared state of one generation run.
//!
//! The [`Context`] travels alongside the [`Graph`](crate::graph::Graph)
//! through visitation, consolidation and emission. It answers "am I inside
//! a Body/Param/Response/Composed?" from its visitation stack, keeps the
//! registries that drive deduplication and pruning, and resolves ref
//! pointers against the [`Document`].

use crate::document::Document;
use crate::error::{GenError, Result};
use crate::graph::{KindTag, NodeId, PATH_DELIMITER};
use indexmap::{IndexMap, IndexSet};
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::warn;

/// One entry of the visitation stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub node: NodeId,
    pub tag: KindTag,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WarningKind {
    /// An ancestor would have been re-added; a circular placeholder was linked.
    CircularReference,
    /// No JSON response content; a `{ success: Boolean }` response was used.
    SyntheticResponse,
    /// An array without an item schema; a JSON placeholder element was used.
    MissingItems,
    /// Enum values that are not valid GraphQL names; emitted as `String`.
    EnumFallback,
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::CircularReference => "CircularReference",
            WarningKind::SyntheticResponse => "SyntheticResponse",
            WarningKind::MissingItems => "MissingItems",
            WarningKind::EnumFallback => "EnumFallback",
        };
        f.write_str(s)
    }
}

/// A recoverable condition that was substituted in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    pub location: String,
    pub kind: WarningKind,
    pub message: String,
}

/// Every `>`-prefix of a set of requested paths.
#[derive(Debug, Clone, Default)]
pub struct SelectionFilter {
    prefixes: HashSet<String>,
}

impl SelectionFilter {
    pub fn new<S: AsRef<str>>(paths: &[S]) -> Self {
        let mut prefixes = HashSet::new();
        for path in paths {
            let path = path.as_ref();
            for (i, c) in path.char_indices() {
                if c == PATH_DELIMITER {
                    prefixes.insert(path[..i].to_string());
                }
            }
            prefixes.insert(path.to_string());
        }
        Self { prefixes }
    }

    /// Whether `path` is a prefix of (or equal to) a requested path.
    pub fn allows(&self, path: &str) -> bool {
        self.prefixes.contains(path)
    }
}

/// Registries and the visitation stack for one run.
pub struct Context<'doc> {
    doc: &'doc Document,
    stack: Vec<Frame>,
    /// Component-backed nodes and their component names.
    types: IndexMap<NodeId, String>,
    generated: IndexSet<String>,
    ref_counts: HashMap<String, i64>,
    consumed: HashMap<NodeId, HashSet<NodeId>>,
    absorbed: HashSet<NodeId>,
    filter: Option<SelectionFilter>,
    warnings: Vec<Warning>,
}

impl<'doc> Context<'doc> {
    pub fn new(doc: &'doc Document) -> Self {
        Self {
            doc,
            stack: Vec::new(),
            types: IndexMap::new(),
            generated: IndexSet::new(),
            ref_counts: HashMap::new(),
            consumed: HashMap::new(),
            absorbed: HashSet::new(),
            filter: None,
            warnings: Vec::new(),
        }
    }

    pub fn document(&self) -> &'doc Document {
        self.doc
    }

    /// Resolve a ref pointer; `from` is the root path of the referencing node.
    pub fn lookup(&self, pointer: &str, from: &str) -> Result<&'doc Value> {
        self.doc
            .lookup(pointer)
            .ok_or_else(|| GenError::MissingReference {
                pointer: pointer.to_string(),
                path: from.to_string(),
            })
    }

    pub fn enter(&mut self, node: NodeId, tag: KindTag) {
        self.stack.push(Frame { node, tag });
    }

    pub fn leave(&mut self) {
        self.stack.pop();
    }

    /// Whether any frame on the stack has the given kind.
    pub fn in_context_of(&self, tag: KindTag) -> bool {
        self.stack.iter().any(|f| f.tag == tag)
    }

    pub fn register_type(&mut self, name: &str, node: NodeId) {
        self.types.insert(node, name.to_string());
    }

    /// First node registered under `name`.
    pub fn named_type(&self, name: &str) -> Option<NodeId> {
        self.types
            .iter()
            .find(|(_, registered)| registered.as_str() == name)
            .map(|(node, _)| *node)
    }

    pub fn registered_name(&self, node: NodeId) -> Option<&str> {
        self.types.get(&node).map(String::as_str)
    }

    /// Record `key` as emitted; `false` when it already was.
    pub fn mark_generated(&mut self, key: &str) -> bool {
        self.generated.insert(key.to_string())
    }

    pub fn is_generated(&self, key: &str) -> bool {
        self.generated.contains(key)
    }

    pub fn add_ref(&mut self, pointer: &str) {
        *self.ref_counts.entry(pointer.to_string()).or_insert(0) += 1;
    }

    pub fn release_ref(&mut self, pointer: &str) {
        if let Some(count) = self.ref_counts.get_mut(pointer) {
            *count -= 1;
        }
    }

    pub fn ref_count(&self, pointer: &str) -> i64 {
        self.ref_counts.get(pointer).copied().unwrap_or(0)
    }

    /// Record the branches consumed by consolidating `node`.
    pub fn absorb(&mut self, node: NodeId, branches: HashSet<NodeId>) {
        self.absorbed.extend(branches.iter().copied());
        self.consumed.insert(node, branches);
    }

    pub fn is_absorbed(&self, node: NodeId) -> bool {
        self.absorbed.contains(&node)
    }

    pub fn consumed_by(&self, node: NodeId) -> Option<&HashSet<NodeId>> {
        self.consumed.get(&node)
    }

    pub fn set_filter(&mut self, filter: SelectionFilter) {
        self.filter = Some(filter);
    }

    pub fn filter(&self) -> Option<&SelectionFilter> {
        self.filter.as_ref()
    }

    pub fn warn(&mut self, location: impl Into<String>, kind: WarningKind, message: impl Into<String>) {
        let warning = Warning {
            location: location.into(),
            kind,
            message: message.into(),
        };
        warn!(location = %warning.location, kind = %warning.kind, "{}", warning.message);
        self.warnings.push(warning);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }
}
