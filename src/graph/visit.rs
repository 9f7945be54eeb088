//! Lazy, idempotent resolution of nodes.
//!
//! [`visit`] materializes the children of one node the first time it is
//! called and is a no-op afterwards. [`expand`] is the entry point used by
//! path resolution and the interactive picker: visit, then hand back the
//! children.

use super::{
    compare_names, from_prop, from_schema, Graph, KindTag, NewNode, NodeId, NodeKind,
    ParamLocation, PropKind,
};
use crate::context::{Context, WarningKind};
use crate::error::Result;
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};
use std::collections::HashSet;
use tracing::{debug, trace};

static JSON_CONTENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^application/(.+\+)?json(;.*)?$").expect("json content regex should be valid")
});

/// Status used for the substituted response.
pub const SYNTHETIC_STATUS: &str = "success";

/// Schema of the substituted `{ success: Boolean }` response.
pub fn synthetic_response_schema() -> Value {
    json!({
        "type": "object",
        "properties": { "success": { "type": "boolean" } }
    })
}

/// Whether a media type is JSON (`application/json`, `application/hal+json`, ...).
pub fn is_json_media_type(media_type: &str) -> bool {
    JSON_CONTENT.is_match(&media_type.to_ascii_lowercase())
}

/// Schema of the first JSON media type of a `content` map.
fn json_media_schema(holder: &Value) -> Option<&Value> {
    holder
        .get("content")?
        .as_object()?
        .iter()
        .find(|(media_type, _)| is_json_media_type(media_type))
        .and_then(|(_, media)| media.get("schema"))
}

/// Follow a `$ref` on a parameter, request body or response object.
fn resolve_component(ctx: &Context<'_>, raw: &Value, from: &str) -> Result<Value> {
    let mut current = raw;
    let mut seen = HashSet::new();
    while let Some(pointer) = current.get("$ref").and_then(Value::as_str) {
        if !seen.insert(pointer.to_string()) {
            break;
        }
        current = ctx.lookup(pointer, from)?;
    }
    Ok(current.clone())
}

/// Materialize the children of `id`. Calling it again is a no-op.
pub fn visit(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    if graph.node(id).visited {
        return Ok(());
    }
    graph.node_mut(id).visited = true;
    let tag = graph.node(id).tag();
    ctx.enter(id, tag);
    let result = match tag {
        KindTag::Operation => visit_operation(graph, ctx, id),
        KindTag::Param => visit_param(graph, ctx, id),
        KindTag::Body | KindTag::Response => visit_payload(graph, ctx, id),
        KindTag::Reference => visit_reference(graph, ctx, id),
        KindTag::Object => visit_object(graph, ctx, id),
        KindTag::Composed => visit_branches(graph, ctx, id, &["allOf"]),
        KindTag::Union => visit_branches(graph, ctx, id, &["oneOf", "anyOf"]),
        KindTag::Array | KindTag::Property => visit_children(graph, ctx, id),
        KindTag::Scalar | KindTag::Enum | KindTag::CircularRef => Ok(()),
    };
    ctx.leave();
    trace!(node = %graph.node(id).id(), children = graph.node(id).children.len(), "visited");
    result
}

/// Visit `id` and return its children.
pub fn expand(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<Vec<NodeId>> {
    visit(graph, ctx, id)?;
    Ok(graph.node(id).children.clone())
}

/// Like [`Graph::target_of`], visiting wrappers on the way down.
pub fn resolve_target(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<NodeId> {
    let mut cursor = id;
    loop {
        visit(graph, ctx, cursor)?;
        let node = graph.node(cursor);
        let follow = match node.kind {
            NodeKind::Reference { .. } => true,
            NodeKind::Property { kind, .. } => matches!(
                kind,
                PropKind::Object | PropKind::Composed | PropKind::Enum | PropKind::Circular
            ),
            _ => false,
        };
        match node.children.first() {
            Some(child) if follow => cursor = *child,
            _ => return Ok(cursor),
        }
    }
}

fn visit_children(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    for child in graph.node(id).children.clone() {
        visit(graph, ctx, child)?;
    }
    Ok(())
}

fn visit_reference(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    let NodeKind::Reference { pointer } = &graph.node(id).kind else {
        return Ok(());
    };
    let pointer = pointer.clone();
    let target = ctx.lookup(&pointer, &graph.path_of(id))?;
    let child = from_schema(graph, ctx, id, target)?;
    visit(graph, ctx, child)
}

fn visit_object(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    let schema = graph.node(id).schema.clone();
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return Ok(());
    };
    let required: HashSet<&str> = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();
    let mut names: Vec<&String> = properties.keys().collect();
    names.sort_by(|a, b| compare_names(a, b));
    for name in names {
        let prop = from_prop(
            graph,
            ctx,
            id,
            name,
            &properties[name.as_str()],
            required.contains(name.as_str()),
        )?;
        graph.node_mut(id).props.insert(name.clone(), prop);
    }
    Ok(())
}

fn visit_branches(
    graph: &mut Graph,
    ctx: &mut Context<'_>,
    id: NodeId,
    keys: &[&str],
) -> Result<()> {
    let schema = graph.node(id).schema.clone();
    let mut branches: Vec<Value> = keys
        .iter()
        .find_map(|k| schema.get(*k).and_then(Value::as_array).filter(|a| !a.is_empty()))
        .cloned()
        .unwrap_or_default();
    // Properties declared next to the branches form one more branch.
    if let Some(properties) = schema.get("properties").filter(|p| p.is_object()) {
        let mut inline = json!({ "type": "object", "properties": properties });
        if let Some(required) = schema.get("required") {
            inline["required"] = required.clone();
        }
        branches.push(inline);
    }
    for branch in &branches {
        let child = from_schema(graph, ctx, id, branch)?;
        visit(graph, ctx, child)?;
    }
    Ok(())
}

/// Path-item parameters merged with operation parameters; the operation
/// wins on equal name and location.
fn merge_parameters(
    ctx: &Context<'_>,
    shared: &[Value],
    own: Option<&Value>,
    from: &str,
) -> Result<Vec<Value>> {
    let mut merged: IndexMap<(String, String), Value> = IndexMap::new();
    let own = own.and_then(Value::as_array).into_iter().flatten();
    for raw in shared.iter().chain(own) {
        let param = resolve_component(ctx, raw, from)?;
        let name = param.get("name").and_then(Value::as_str).unwrap_or_default();
        let location = param.get("in").and_then(Value::as_str).unwrap_or("query");
        if name.is_empty() {
            continue;
        }
        merged.insert((name.to_string(), location.to_string()), param);
    }
    Ok(merged.into_values().collect())
}

/// Status of the response to use: `200`, other `2XX` ascending, `default`.
fn choose_status(responses: &Value) -> Option<String> {
    let map = responses.as_object()?;
    if map.contains_key("200") {
        return Some("200".to_string());
    }
    let mut success: Vec<&String> = map.keys().filter(|k| k.starts_with('2')).collect();
    success.sort();
    success
        .first()
        .map(|s| s.to_string())
        .or_else(|| map.contains_key("default").then(|| "default".to_string()))
}

fn visit_operation(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    let node = graph.node(id);
    let NodeKind::Operation {
        method,
        shared_parameters,
        ..
    } = &node.kind
    else {
        return Ok(());
    };
    let method = *method;
    let shared = shared_parameters.clone();
    let operation = node.schema.clone();
    let op_name = node.name.clone();
    let from = graph.path_of(id);

    for param in merge_parameters(ctx, &shared, operation.get("parameters"), &from)? {
        let name = param
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let location =
            ParamLocation::parse(param.get("in").and_then(Value::as_str).unwrap_or("query"));
        if location == ParamLocation::Cookie {
            debug!(operation = %from, param = %name, "skipping cookie parameter");
            continue;
        }
        let required = location == ParamLocation::Path
            || param.get("required").and_then(Value::as_bool).unwrap_or(false);
        let child = graph.attach(
            id,
            NewNode {
                kind: NodeKind::Param { location, required },
                scope: format!("{op_name}.{name}"),
                discriminant: name.clone(),
                name,
                schema: param,
            },
        );
        visit(graph, ctx, child)?;
    }

    if method.is_write() {
        if let Some(raw) = operation.get("requestBody") {
            let body = resolve_component(ctx, raw, &from)?;
            match json_media_schema(&body) {
                Some(schema) => {
                    let required = body.get("required").and_then(Value::as_bool).unwrap_or(false);
                    let child = graph.attach(
                        id,
                        NewNode {
                            kind: NodeKind::Body { required },
                            name: format!("{op_name}Input"),
                            discriminant: "request".to_string(),
                            scope: format!("{op_name}Input"),
                            schema: schema.clone(),
                        },
                    );
                    visit(graph, ctx, child)?;
                }
                None => debug!(operation = %from, "request body has no JSON content, skipping"),
            }
        }
    }

    let responses = operation.get("responses").cloned().unwrap_or(Value::Null);
    let chosen = match choose_status(&responses) {
        Some(status) => {
            let response = resolve_component(ctx, &responses[status.as_str()], &from)?;
            json_media_schema(&response).map(|schema| (status, schema.clone()))
        }
        None => None,
    };
    let (status, schema, synthetic) = match chosen {
        Some((status, schema)) => (status, schema, false),
        None => {
            ctx.warn(
                from.clone(),
                WarningKind::SyntheticResponse,
                "no JSON success response, substituting { success: Boolean }",
            );
            (SYNTHETIC_STATUS.to_string(), synthetic_response_schema(), true)
        }
    };
    let child = graph.attach(
        id,
        NewNode {
            kind: NodeKind::Response {
                status: status.clone(),
                synthetic,
            },
            name: format!("{op_name}Response"),
            discriminant: status,
            scope: format!("{op_name}Response"),
            schema,
        },
    );
    visit(graph, ctx, child)
}

fn visit_param(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    let param = graph.node(id).schema.clone();
    let schema = param
        .get("schema")
        .or_else(|| json_media_schema(&param))
        .cloned()
        .unwrap_or_else(|| json!({ "type": "string" }));
    let child = from_schema(graph, ctx, id, &schema)?;
    visit(graph, ctx, child)
}

fn visit_payload(graph: &mut Graph, ctx: &mut Context<'_>, id: NodeId) -> Result<()> {
    let schema = graph.node(id).schema.clone();
    let child = from_schema(graph, ctx, id, &schema)?;
    visit(graph, ctx, child)
}
