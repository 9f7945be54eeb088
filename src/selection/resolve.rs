use super::{SelectionPath, Wildcard};
use crate::context::Context;
use crate::error::{GenError, Result};
use crate::graph::{abbreviate_id, expand, Graph, KindTag, NodeId, PATH_DELIMITER};

fn not_found(graph: &Graph, path: &SelectionPath, matched: &[String], at: Option<NodeId>) -> GenError {
    let available = match at {
        Some(node) => graph
            .node(node)
            .children
            .iter()
            .map(|c| abbreviate_id(&graph.node(*c).id()))
            .collect(),
        None => graph
            .roots()
            .iter()
            .map(|r| abbreviate_id(&graph.node(*r).id()))
            .collect(),
    };
    GenError::PathNotFound {
        path: path.to_string(),
        matched: matched.join(&PATH_DELIMITER.to_string()),
        available,
    }
}

/// Resolve the concrete part of `path` to one node, expanding lazily on the
/// way down.
pub fn resolve(graph: &mut Graph, ctx: &mut Context<'_>, path: &SelectionPath) -> Result<NodeId> {
    let mut segments = path.segments.iter();
    let first = segments
        .next()
        .ok_or_else(|| not_found(graph, path, &[], None))?;
    let mut current = graph
        .find_root(first)
        .ok_or_else(|| not_found(graph, path, &[], None))?;
    let mut matched = vec![first.clone()];
    for segment in segments {
        expand(graph, ctx, current)?;
        current = graph
            .find_child(current, segment)
            .ok_or_else(|| not_found(graph, path, &matched, Some(current)))?;
        matched.push(segment.clone());
    }
    Ok(current)
}

/// Leaves under `from`, expanding every non-leaf on the way.
///
/// Request arguments (Param and Body subtrees) are always emitted in full
/// and are never entered.
pub fn expand_wildcard(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    from: NodeId,
    wildcard: Wildcard,
) -> Result<Vec<NodeId>> {
    let mut leaves = Vec::new();
    walk(graph, ctx, from, wildcard, &mut leaves)?;
    Ok(leaves)
}

fn walk(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    id: NodeId,
    wildcard: Wildcard,
    leaves: &mut Vec<NodeId>,
) -> Result<()> {
    if graph.node(id).is_leaf() {
        leaves.push(id);
        return Ok(());
    }
    for child in expand(graph, ctx, id)? {
        let node = graph.node(child);
        match node.tag() {
            KindTag::Param | KindTag::Body => continue,
            KindTag::Property if wildcard == Wildcard::Direct && !node.is_leaf() => continue,
            _ => walk(graph, ctx, child, wildcard, leaves)?,
        }
    }
    Ok(())
}

/// Concrete leaf handles selected by one path.
///
/// A concrete path that stops at a non-leaf selects everything below it.
pub fn resolve_leaves(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    path: &SelectionPath,
) -> Result<Vec<NodeId>> {
    let target = resolve(graph, ctx, path)?;
    match path.wildcard {
        Some(wildcard) => expand_wildcard(graph, ctx, target, wildcard),
        None if graph.node(target).is_leaf() => Ok(vec![target]),
        None => expand_wildcard(graph, ctx, target, Wildcard::Deep),
    }
}
