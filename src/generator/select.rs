//! Second pass: selection bodies for `@connect`.
//!
//! The response selection mirrors the selected paths: one line per leaf
//! field, a nested block per structured field. Fields whose GraphQL name
//! differs from the JSON key are aliased; circular fields leave a comment
//! behind. The request body mapping is the inverse: JSON keys taken from
//! `$args.<input>`.

use super::types::visible_fields;
use crate::graph::{Graph, NodeId, NodeKind, PropKind};
use crate::naming;
use crate::selection::Collection;

const INDENT: &str = "  ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    /// JSON response -> GraphQL fields
    Response,
    /// GraphQL input -> JSON request body
    Body,
}

/// Follow references and array wrappers to the node that carries fields.
fn element_target(graph: &Graph, id: NodeId) -> NodeId {
    let mut cursor = graph.target_of(id);
    loop {
        let node = graph.node(cursor);
        let is_array = matches!(
            node.kind,
            NodeKind::Array
                | NodeKind::Property {
                    kind: PropKind::Array,
                    ..
                }
        );
        match node.children.first() {
            Some(item) if is_array => cursor = graph.target_of(*item),
            _ => return cursor,
        }
    }
}

fn is_structured(graph: &Graph, id: NodeId) -> bool {
    matches!(
        graph.node(id).kind,
        NodeKind::Object { synthetic: false } | NodeKind::Composed | NodeKind::Union
    )
}

fn is_circular(graph: &Graph, id: NodeId) -> bool {
    matches!(
        graph.node(id).kind,
        NodeKind::CircularRef { .. }
            | NodeKind::Property {
                kind: PropKind::Circular,
                ..
            }
    )
}

fn write_fields(
    graph: &Graph,
    collection: Option<&Collection>,
    container: NodeId,
    depth: usize,
    direction: Direction,
    lines: &mut Vec<String>,
) {
    let indent = INDENT.repeat(depth);
    for field in visible_fields(graph, container, collection) {
        let Some(name) = field.name else {
            lines.push(format!("{indent}# Circular reference: {}", field.json_name));
            continue;
        };
        let head = match direction {
            Direction::Response => naming::selection_field(&name, &field.json_name),
            Direction::Body => naming::body_field(&field.json_name, &name),
        };
        let target = element_target(graph, field.prop);
        if is_circular(graph, target) {
            lines.push(format!("{indent}# Circular reference: {}", field.json_name));
        } else if is_structured(graph, target) {
            lines.push(format!("{indent}{head} {{"));
            write_fields(graph, collection, target, depth + 1, direction, lines);
            lines.push(format!("{indent}}}"));
        } else {
            match field.comment {
                Some(comment) => lines.push(format!("{indent}{head} # {comment}")),
                None => lines.push(format!("{indent}{head}")),
            }
        }
    }
}

/// Selection lines for an operation's response.
pub fn response_selection(graph: &Graph, collection: &Collection, response: NodeId) -> Vec<String> {
    let node = graph.node(response);
    if let NodeKind::Response {
        synthetic: true, ..
    } = node.kind
    {
        return vec!["success: $(true)".to_string()];
    }
    let Some(&schema) = node.children.first() else {
        return vec!["$".to_string()];
    };
    let target = element_target(graph, schema);
    if is_circular(graph, target) {
        return vec!["# Circular reference".to_string()];
    }
    if !is_structured(graph, target) {
        return vec!["$".to_string()];
    }
    let mut lines = Vec::new();
    write_fields(graph, Some(collection), target, 0, Direction::Response, &mut lines);
    lines
}

/// Body mapping lines for a request body bound to argument `arg`.
pub fn body_selection(graph: &Graph, body: NodeId, arg: &str) -> Vec<String> {
    let Some(&schema) = graph.node(body).children.first() else {
        return vec![format!("$args.{arg}")];
    };
    let target = element_target(graph, schema);
    if !is_structured(graph, target) {
        return vec![format!("$args.{arg}")];
    }
    let mut lines = vec![format!("$args.{arg} {{")];
    write_fields(graph, None, target, 1, Direction::Body, &mut lines);
    lines.push("}".to_string());
    lines
}
