use super::{resolve_leaves, SelectionPath};
use crate::context::{Context, SelectionFilter};
use crate::error::Result;
use crate::graph::{Graph, NodeId, NodeKind, PropKind};
use indexmap::IndexSet;
use std::collections::HashSet;
use tracing::{debug, info};

/// Everything the generator needs to know about one selection.
#[derive(Debug, Default, Clone)]
pub struct Collection {
    /// Concrete leaf paths, deduplicated, in selection order.
    pub paths: IndexSet<String>,
    pub leaves: IndexSet<NodeId>,
    /// Every node on a selected path.
    pub selected: HashSet<NodeId>,
    /// Operation roots touched by the selection, in root order.
    pub operations: IndexSet<NodeId>,
    /// Object, Composed, Union and CircularRef nodes that need their own
    /// declaration.
    pub containers: IndexSet<NodeId>,
    pub enums: IndexSet<NodeId>,
}

impl Collection {
    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selected.contains(&id)
    }
}

/// Turns selection strings into concrete leaf paths and the set of
/// container types that must be emitted for them.
#[derive(Debug, Default)]
pub struct Collector {
    collection: Collection,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve every path and gather containers; installs the resulting
    /// selection filter on the context.
    pub fn collect<S: AsRef<str>>(
        mut self,
        graph: &mut Graph,
        ctx: &mut Context<'_>,
        selections: &[S],
    ) -> Result<Collection> {
        for raw in selections {
            let path = SelectionPath::parse(raw.as_ref());
            if path.is_empty() {
                continue;
            }
            let leaves = resolve_leaves(graph, ctx, &path)?;
            debug!(path = %path, leaves = leaves.len(), "resolved selection");
            for leaf in leaves {
                self.add_leaf(graph, leaf);
            }
        }

        let mut operations: Vec<NodeId> = self.collection.operations.drain(..).collect();
        operations.sort_by_key(|op| graph.roots().iter().position(|r| r == op));
        self.collection.operations = operations.into_iter().collect();

        let paths: Vec<&String> = self.collection.paths.iter().collect();
        ctx.set_filter(SelectionFilter::new(&paths));
        info!(
            paths = self.collection.paths.len(),
            operations = self.collection.operations.len(),
            containers = self.collection.containers.len(),
            "collected selection"
        );
        Ok(self.collection)
    }

    fn add_leaf(&mut self, graph: &Graph, leaf: NodeId) {
        let c = &mut self.collection;
        c.paths.insert(graph.path_of(leaf));
        c.leaves.insert(leaf);
        c.operations.insert(graph.root_of(leaf));

        let mut chain = graph.ancestors(leaf);
        chain.reverse();
        chain.push(leaf);
        for id in chain {
            c.selected.insert(id);
            let node = graph.node(id);
            if node.is_container() {
                c.containers.insert(id);
            }
            if matches!(node.kind, NodeKind::Enum { .. }) {
                c.enums.insert(id);
            }
        }
        // Enum properties wrap their enum node.
        if let Some(PropKind::Enum) = graph.node(leaf).prop_kind() {
            let target = graph.target_of(leaf);
            if matches!(graph.node(target).kind, NodeKind::Enum { .. }) {
                c.enums.insert(target);
            }
        }
    }
}

/// Abbreviated ids of every operation root.
pub fn list_paths(graph: &Graph) -> Vec<String> {
    graph
        .roots()
        .iter()
        .map(|r| crate::graph::abbreviate_id(&graph.node(*r).id()))
        .collect()
}
