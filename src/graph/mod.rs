//! # Graph Module
//!
//! The node graph mirrors the parts of the source document that a run
//! touches: operations at the roots, then parameters, bodies, responses,
//! references, schemas and properties below them.
//!
//! ## Arena
//!
//! Nodes live in a [`Graph`] arena and are addressed by [`NodeId`] handles.
//! A node owns its `children` (by handle) and keeps a non-owning `parent`
//! handle that is only used for path computation and upward walks.
//!
//! ## Lifecycle
//!
//! Operation roots are created eagerly by [`Graph::from_document`]. All
//! other nodes are created lazily by [`visit`]/[`expand`] the first time a
//! caller descends into that part of the document, so a run over a large
//! document only pays for what its selection touches.
//!
//! ## Cycles
//!
//! Every non-property node carries its lineage: the ids of its ancestors.
//! Before a child is linked, its id is checked against the parent's
//! lineage; a hit links a [`NodeKind::CircularRef`] instead, so the graph
//! is always a finite tree.
//!
//! ```text
//! get:/pets/{petId}
//! ├── param:petId
//! │   └── scalar:[getPetById.petId]
//! └── res:200
//!     └── ref:#/components/schemas/Pet
//!         └── obj:Pet
//!             ├── prop:scalar:id
//!             ├── prop:obj:owner
//!             │   └── ref:#/components/schemas/Person
//!             └── prop:circ:parent
//!                 └── circular:ref:#/components/schemas/Pet
//! ```

mod consolidate;
mod factory;
mod node;
mod visit;

pub use consolidate::*;
pub use factory::*;
pub use node::*;
pub use visit::*;

use crate::document::{Document, SCHEMAS_PREFIX};
use crate::naming;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Abbreviated form of the schemas pointer prefix used in path text.
pub const SCHEMAS_ABBREV: &str = "#/c/s/";

/// Path segment delimiter.
pub const PATH_DELIMITER: char = '>';

/// Abbreviate a node id for use in selection path text.
pub fn abbreviate_id(id: &str) -> String {
    id.replace(SCHEMAS_PREFIX, SCHEMAS_ABBREV)
}

/// Undo [`abbreviate_id`].
pub fn expand_id(segment: &str) -> String {
    segment.replace(SCHEMAS_ABBREV, SCHEMAS_PREFIX)
}

/// Arena of nodes plus the list of operation roots.
#[derive(Debug, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    roots: Vec<NodeId>,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create one Operation root per supported method per path.
    pub fn from_document(doc: &Document) -> Self {
        let mut graph = Graph::new();
        let mut seen = HashSet::new();
        for entry in doc.operations() {
            let operation_id = entry.operation.get("operationId").and_then(|v| v.as_str());
            let name = naming::unique_name(
                &mut seen,
                &naming::operation_name(entry.method, &entry.path, operation_id),
            );
            graph.add_root(NewNode {
                kind: NodeKind::Operation {
                    method: entry.method,
                    path: entry.path.clone(),
                    shared_parameters: entry.shared_parameters,
                },
                scope: name.clone(),
                name,
                discriminant: entry.path,
                schema: entry.operation,
            });
        }
        tracing::debug!(roots = graph.roots.len(), "created operation roots");
        graph
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    /// Root whose id equals `op_id` (abbreviated or not).
    pub fn find_root(&self, op_id: &str) -> Option<NodeId> {
        let wanted = expand_id(op_id);
        self.roots
            .iter()
            .copied()
            .find(|r| self.node(*r).id() == wanted)
    }

    /// Child of `parent` whose id equals `child_id` (abbreviated or not).
    pub fn find_child(&self, parent: NodeId, child_id: &str) -> Option<NodeId> {
        let wanted = expand_id(child_id);
        self.node(parent)
            .children
            .iter()
            .copied()
            .find(|c| self.node(*c).id() == wanted)
    }

    pub fn add_root(&mut self, new: NewNode) -> NodeId {
        let id = self.alloc(None, new);
        self.roots.push(id);
        id
    }

    /// Allocate a node and append it to `parent.children`.
    pub fn attach(&mut self, parent: NodeId, new: NewNode) -> NodeId {
        let id = self.alloc(Some(parent), new);
        self.nodes[parent.0].children.push(id);
        id
    }

    fn alloc(&mut self, parent: Option<NodeId>, new: NewNode) -> NodeId {
        let id = NodeId(self.nodes.len());
        let inherited = parent.map(|p| Rc::clone(&self.nodes[p.0].lineage));
        let lineage = if matches!(new.kind, NodeKind::Property { .. }) {
            inherited.unwrap_or_default()
        } else {
            let mut map: HashMap<String, NodeId> =
                inherited.map(|l| (*l).clone()).unwrap_or_default();
            map.insert(new.id(), id);
            Rc::new(map)
        };
        self.nodes.push(Node {
            kind: new.kind,
            name: new.name,
            parent,
            children: Vec::new(),
            props: Default::default(),
            visited: false,
            consolidated: false,
            schema: new.schema,
            discriminant: new.discriminant,
            scope: new.scope,
            lineage,
        });
        id
    }

    /// Ancestor of `parent` (or `parent` itself) carrying `id`, if any.
    pub fn lineage_hit(&self, parent: NodeId, id: &str) -> Option<NodeId> {
        self.node(parent).lineage.get(id).copied()
    }

    /// Parent chain of `id`, nearest first.
    pub fn ancestors(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut cursor = self.node(id).parent;
        while let Some(p) = cursor {
            out.push(p);
            cursor = self.node(p).parent;
        }
        out
    }

    /// Nearest operation root above (or at) `id`.
    pub fn root_of(&self, id: NodeId) -> NodeId {
        self.ancestors(id).last().copied().unwrap_or(id)
    }

    /// Selection path text from the root to `id`.
    pub fn path_of(&self, id: NodeId) -> String {
        let mut chain = self.ancestors(id);
        chain.reverse();
        chain.push(id);
        chain
            .iter()
            .map(|n| abbreviate_id(&self.node(*n).id()))
            .collect::<Vec<_>>()
            .join(&PATH_DELIMITER.to_string())
    }

    /// Follow Reference and Property wrappers down to the node that
    /// carries the shape, without visiting anything.
    pub fn target_of(&self, id: NodeId) -> NodeId {
        let mut cursor = id;
        loop {
            let node = self.node(cursor);
            match node.kind {
                NodeKind::Reference { .. }
                | NodeKind::Property {
                    kind: PropKind::Object | PropKind::Composed | PropKind::Enum | PropKind::Circular,
                    ..
                } => match node.children.first() {
                    Some(child) => cursor = *child,
                    None => return cursor,
                },
                _ => return cursor,
            }
        }
    }
}
