//! Flattening of allOf/oneOf branches into one field set.

use super::{compare_names, visit, Graph, KindTag, NodeId, NodeKind};
use crate::context::Context;
use crate::error::Result;
use indexmap::IndexMap;
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Merge the properties of every branch of a Composed or Union node into
/// its `props`.
///
/// Branches are walked breadth first starting at the node's non-property
/// children, descending through references and nested composition. The
/// first branch to define a name wins. While a selection filter is active
/// (and the node is not part of a request argument) only properties on a
/// requested path are kept.
///
/// Runs once per node; later calls return the branches recorded the first
/// time.
pub fn consolidate(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<HashSet<NodeId>> {
    if graph.node(id).consolidated {
        return Ok(ctx.consumed_by(id).cloned().unwrap_or_default());
    }
    visit(graph, ctx, id)?;
    graph.node_mut(id).consolidated = true;

    let filtered = ctx.filter().is_some()
        && !ctx.in_context_of(KindTag::Body)
        && !ctx.in_context_of(KindTag::Param);

    let mut merged: IndexMap<String, NodeId> = IndexMap::new();
    let mut consumed = HashSet::new();
    let mut queue: VecDeque<NodeId> = graph
        .node(id)
        .children
        .iter()
        .copied()
        .filter(|c| !graph.node(*c).is_property())
        .collect();

    while let Some(branch) = queue.pop_front() {
        if !consumed.insert(branch) {
            continue;
        }
        visit(graph, ctx, branch)?;
        let node = graph.node(branch);
        if let NodeKind::Reference { pointer } = &node.kind {
            let pointer = pointer.clone();
            ctx.release_ref(&pointer);
        }
        let node = graph.node(branch);
        for (name, prop) in &node.props {
            if filtered {
                let allowed = ctx
                    .filter()
                    .is_some_and(|f| f.allows(&graph.path_of(*prop)));
                if !allowed {
                    continue;
                }
            }
            merged.entry(name.clone()).or_insert(*prop);
        }
        if matches!(
            node.kind,
            NodeKind::Reference { .. } | NodeKind::Composed | NodeKind::Union
        ) {
            queue.extend(
                node.children
                    .iter()
                    .copied()
                    .filter(|c| !graph.node(*c).is_property()),
            );
        }
    }

    merged.sort_by(|a, _, b, _| compare_names(a, b));
    debug!(
        node = %graph.node(id).id(),
        branches = consumed.len(),
        fields = merged.len(),
        "consolidated"
    );
    graph.node_mut(id).props = merged;
    ctx.absorb(id, consumed.clone());
    Ok(consumed)
}
