//! Turning one raw schema fragment into one node.

use super::{Graph, NewNode, NodeId, NodeKind, PropKind, ScalarType};
use crate::context::{Context, WarningKind};
use crate::document::component_name;
use crate::error::{GenError, Result};
use serde_json::{json, Value};
use std::collections::HashSet;

/// Structural shape of a schema fragment, before any node exists for it.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Ref(String),
    Array,
    Composed,
    Union,
    Object { synthetic: bool },
    Enum(Vec<String>),
    Scalar(ScalarType),
    Unknown,
}

/// The effective `type` keyword. OpenAPI 3.1 type arrays yield their first
/// non-`null` entry.
pub fn schema_type(schema: &Value) -> Option<&str> {
    match schema.get("type")? {
        Value::String(s) => Some(s.as_str()),
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .find(|t| *t != "null"),
        _ => None,
    }
}

fn has_branches(schema: &Value, key: &str) -> bool {
    schema
        .get(key)
        .and_then(Value::as_array)
        .is_some_and(|a| !a.is_empty())
}

fn declares_properties(schema: &Value) -> bool {
    schema
        .get("properties")
        .and_then(Value::as_object)
        .is_some_and(|p| !p.is_empty())
}

/// Classify a schema fragment.
pub fn classify(schema: &Value) -> Shape {
    if let Some(pointer) = schema.get("$ref").and_then(Value::as_str) {
        return Shape::Ref(pointer.to_string());
    }
    let ty = schema_type(schema);
    if ty == Some("array") || (ty.is_none() && schema.get("items").is_some()) {
        return Shape::Array;
    }
    if ty.is_none() || ty == Some("object") {
        if has_branches(schema, "allOf") {
            return Shape::Composed;
        }
        if has_branches(schema, "oneOf") || has_branches(schema, "anyOf") {
            return Shape::Union;
        }
        if ty == Some("object") || schema.get("properties").is_some() {
            return Shape::Object {
                synthetic: !declares_properties(schema),
            };
        }
    }
    if let Some(values) = schema.get("enum").and_then(Value::as_array) {
        return Shape::Enum(
            values
                .iter()
                .filter(|v| !v.is_null())
                .map(|v| match v {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect(),
        );
    }
    match ty.and_then(ScalarType::from_type) {
        Some(scalar) => Shape::Scalar(scalar),
        None => Shape::Unknown,
    }
}

/// Name, scope and discriminant for a schema node created under `parent`.
fn child_naming(graph: &Graph, parent: NodeId) -> (String, String, String) {
    let node = graph.node(parent);
    let (name, scope) = match &node.kind {
        NodeKind::Reference { pointer } => {
            let name = component_name(pointer).to_string();
            return (name.clone(), name.clone(), name);
        }
        NodeKind::Property { .. } | NodeKind::Param { .. } => {
            (node.name.clone(), node.scope.clone())
        }
        NodeKind::Response { .. } | NodeKind::Body { .. } => {
            (node.scope.clone(), node.scope.clone())
        }
        NodeKind::Array => (node.name.clone(), format!("{}[]", node.scope)),
        NodeKind::Composed | NodeKind::Union => (
            node.name.clone(),
            format!("{}#{}", node.scope, node.children.len()),
        ),
        _ => (node.name.clone(), node.scope.clone()),
    };
    let discriminant = format!("[{scope}]");
    (name, scope, discriminant)
}

/// Link `new` under `parent`, or a [`NodeKind::CircularRef`] when its id
/// already appears among the parent's ancestors.
pub fn attach_checked(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    parent: NodeId,
    new: NewNode,
) -> NodeId {
    let id = new.id();
    if let Some(ancestor) = graph.lineage_hit(parent, &id) {
        ctx.warn(
            graph.path_of(parent),
            WarningKind::CircularReference,
            format!("{id} is already an ancestor, linking a circular reference"),
        );
        return graph.attach(
            parent,
            NewNode {
                kind: NodeKind::CircularRef { target: ancestor },
                name: new.name,
                discriminant: id,
                scope: new.scope,
                schema: new.schema,
            },
        );
    }
    if let NodeKind::Reference { pointer } = &new.kind {
        ctx.add_ref(pointer);
    }
    graph.attach(parent, new)
}

fn placeholder_items(graph: &Graph, ctx: &mut Context<'_>, parent: NodeId) {
    ctx.warn(
        graph.path_of(parent),
        WarningKind::MissingItems,
        "array declares no items, using a JSON placeholder element",
    );
}

/// Build the node for `schema` under `parent`.
///
/// Arrays build their element eagerly; every other structured variant
/// builds its children when visited.
pub fn from_schema(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    parent: NodeId,
    schema: &Value,
) -> Result<NodeId> {
    let (name, scope, discriminant) = child_naming(graph, parent);
    let kind = match classify(schema) {
        Shape::Ref(pointer) => {
            let new = NewNode {
                name: component_name(&pointer).to_string(),
                discriminant: pointer.clone(),
                kind: NodeKind::Reference { pointer },
                scope,
                schema: schema.clone(),
            };
            return Ok(attach_checked(graph, ctx, parent, new));
        }
        Shape::Array => NodeKind::Array,
        Shape::Composed => NodeKind::Composed,
        Shape::Union => NodeKind::Union,
        Shape::Object { synthetic } => NodeKind::Object { synthetic },
        Shape::Enum(values) => NodeKind::Enum { values },
        Shape::Scalar(ty) => NodeKind::Scalar {
            ty,
            placeholder: false,
        },
        Shape::Unknown => {
            return Err(GenError::UnsupportedSchemaKind {
                schema: schema.clone(),
                path: graph.path_of(parent),
            })
        }
    };
    let is_array = matches!(kind, NodeKind::Array);
    let component = matches!(graph.node(parent).kind, NodeKind::Reference { .. });
    let id = attach_checked(
        graph,
        ctx,
        parent,
        NewNode {
            kind,
            name,
            discriminant,
            scope,
            schema: schema.clone(),
        },
    );
    if component && !matches!(graph.node(id).kind, NodeKind::CircularRef { .. }) {
        let name = graph.node(id).name.clone();
        ctx.register_type(&name, id);
    }
    if is_array && matches!(graph.node(id).kind, NodeKind::Array) {
        match schema.get("items").filter(|i| i.is_object()) {
            Some(items) => {
                from_schema(graph, ctx, id, items)?;
            }
            None => {
                placeholder_items(graph, ctx, id);
                let (name, scope, discriminant) = child_naming(graph, id);
                graph.attach(
                    id,
                    NewNode {
                        kind: NodeKind::Scalar {
                            ty: ScalarType::Json,
                            placeholder: true,
                        },
                        name,
                        discriminant,
                        scope,
                        schema: json!({}),
                    },
                );
            }
        }
    }
    Ok(id)
}

/// Follow `$ref` chains to the first non-reference fragment.
fn peek_target<'doc>(
    ctx: &Context<'doc>,
    pointer: &str,
    from: &str,
) -> Result<&'doc Value> {
    let mut seen = HashSet::new();
    let mut target = ctx.lookup(pointer, from)?;
    while let Some(next) = target.get("$ref").and_then(Value::as_str) {
        if !seen.insert(next.to_string()) {
            break;
        }
        target = ctx.lookup(next, from)?;
    }
    Ok(target)
}

/// Build a Property named `name` under `owner`.
///
/// `owner` is either an Object (the property is one of its fields) or an
/// array Property (the property describes its element).
pub fn from_prop(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    owner: NodeId,
    name: &str,
    schema: &Value,
    required: bool,
) -> Result<NodeId> {
    build_prop(graph, ctx, owner, name, schema, required, &mut Vec::new())
}

/// Array elements are built eagerly and never pass through a Reference
/// node, so the pointers followed along one element chain are tracked here.
fn build_prop(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    owner: NodeId,
    name: &str,
    schema: &Value,
    required: bool,
    followed: &mut Vec<(String, NodeId)>,
) -> Result<NodeId> {
    let pointer = schema.get("$ref").and_then(Value::as_str);
    let hit = pointer.and_then(|p| followed.iter().find(|(seen, _)| seen == p));
    if let Some(&(_, ancestor)) = hit {
        return Ok(circular_element(graph, ctx, owner, name, schema, ancestor));
    }
    let owner_node = graph.node(owner);
    let scope = if owner_node.is_property() {
        format!("{}[]", owner_node.scope)
    } else {
        format!("{}.{}", owner_node.scope, name)
    };

    // The fragment whose shape decides the property kind, and the fragment
    // the wrapped node (if any) is built from.
    let shape = classify(schema);
    let (shape, shape_schema) = match shape {
        Shape::Ref(ref pointer) => {
            let target = peek_target(ctx, pointer, &graph.path_of(owner))?;
            (classify(target), target.clone())
        }
        other => (other, schema.clone()),
    };
    let via_ref = schema.get("$ref").is_some();

    let kind = match &shape {
        Shape::Scalar(ty) => PropKind::Scalar {
            ty: *ty,
            placeholder: false,
        },
        Shape::Object { synthetic: true } | Shape::Unknown | Shape::Ref(_) => PropKind::Scalar {
            ty: ScalarType::Json,
            placeholder: false,
        },
        Shape::Array => PropKind::Array,
        Shape::Object { synthetic: false } => PropKind::Object,
        Shape::Composed | Shape::Union => PropKind::Composed,
        Shape::Enum(_) => PropKind::Enum,
    };

    let prop = graph.attach(
        owner,
        NewNode {
            kind: NodeKind::Property { kind, required },
            name: name.to_string(),
            discriminant: name.to_string(),
            scope,
            schema: if via_ref { shape_schema.clone() } else { schema.clone() },
        },
    );

    match kind {
        PropKind::Scalar { .. } | PropKind::Circular => {}
        PropKind::Array => match shape_schema.get("items").filter(|i| i.is_object()) {
            Some(items) => {
                if let Some(pointer) = pointer {
                    followed.push((pointer.to_string(), prop));
                }
                let built = build_prop(graph, ctx, prop, name, items, false, followed);
                if pointer.is_some() {
                    followed.pop();
                }
                built?;
            }
            None => {
                placeholder_items(graph, ctx, prop);
                graph.attach(
                    prop,
                    NewNode {
                        kind: NodeKind::Property {
                            kind: PropKind::Scalar {
                                ty: ScalarType::Json,
                                placeholder: true,
                            },
                            required: false,
                        },
                        name: name.to_string(),
                        discriminant: name.to_string(),
                        scope: format!("{}[]", graph.node(prop).scope),
                        schema: json!({}),
                    },
                );
            }
        },
        PropKind::Object | PropKind::Composed | PropKind::Enum => {
            let child = from_schema(graph, ctx, prop, schema)?;
            if matches!(graph.node(child).kind, NodeKind::CircularRef { .. }) {
                graph.node_mut(prop).kind = NodeKind::Property {
                    kind: PropKind::Circular,
                    required,
                };
            }
        }
    }
    Ok(prop)
}

/// Element property closing a cycle of array components.
fn circular_element(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    owner: NodeId,
    name: &str,
    schema: &Value,
    ancestor: NodeId,
) -> NodeId {
    ctx.warn(
        graph.path_of(owner),
        WarningKind::CircularReference,
        format!(
            "{} is already an ancestor, linking a circular reference",
            graph.node(ancestor).id()
        ),
    );
    let scope = format!("{}[]", graph.node(owner).scope);
    let prop = graph.attach(
        owner,
        NewNode {
            kind: NodeKind::Property {
                kind: PropKind::Circular,
                required: false,
            },
            name: name.to_string(),
            discriminant: name.to_string(),
            scope: scope.clone(),
            schema: schema.clone(),
        },
    );
    graph.attach(
        prop,
        NewNode {
            kind: NodeKind::CircularRef { target: ancestor },
            name: name.to_string(),
            discriminant: graph.node(ancestor).id(),
            scope,
            schema: schema.clone(),
        },
    );
    prop
}
