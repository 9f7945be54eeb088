//! Type names and collision handling.
//!
//! Every declaration starts from its base name (the component name, or a
//! name synthesized from the owning property or operation). When several
//! declarations with different shapes want the same name, the later ones
//! are prefixed with the names of their ancestors until unique; a numeric
//! suffix is the last resort. Declarations with identical shapes share one
//! name and are emitted once.

use super::types::{DeclKind, TypeDecl, TypeRef};
use crate::context::Context;
use crate::graph::{Graph, NodeKind};
use crate::naming;
use std::collections::{HashMap, HashSet};

/// Names that generated types may never take.
const RESERVED_TYPE_NAMES: [&str; 8] = [
    "Query", "Mutation", "JSON", "String", "Int", "Float", "Boolean", "ID",
];

/// Final name per declaration, and whether it is emitted.
#[derive(Debug, Clone)]
pub struct TypeNames {
    pub names: Vec<String>,
    /// `false` for declarations sharing the name of an identical earlier one
    pub primary: Vec<bool>,
}

impl TypeNames {
    pub fn render(&self, ty: &TypeRef) -> String {
        match ty {
            TypeRef::Scalar(scalar) => scalar.graphql_name().to_string(),
            TypeRef::Named(index) => self.names[*index].clone(),
            TypeRef::List(inner) => format!("[{}]", self.render(inner)),
        }
    }
}

fn type_key(decls: &[TypeDecl], ty: &TypeRef) -> String {
    match ty {
        TypeRef::Scalar(scalar) => scalar.graphql_name().to_string(),
        TypeRef::Named(index) => decls[*index].key.clone(),
        TypeRef::List(inner) => format!("[{}]", type_key(decls, inner)),
    }
}

/// Structural fingerprint used to detect identical declarations.
fn signature(decls: &[TypeDecl], decl: &TypeDecl) -> String {
    match &decl.kind {
        DeclKind::Enum { values } => format!("enum {}", values.join(" ")),
        DeclKind::Object { fields } => {
            let mut out = String::from(if decl.input { "input" } else { "type" });
            for field in fields {
                out.push(' ');
                out.push_str(&field.json_name);
                out.push(':');
                out.push_str(&type_key(decls, &field.ty));
                if field.required {
                    out.push('!');
                }
            }
            out
        }
    }
}

/// Candidate names for `decl`, most preferred first.
pub fn candidates(graph: &Graph, decl: &TypeDecl) -> Vec<String> {
    let mut out = vec![decl.base.clone()];
    let mut words: Vec<String> = Vec::new();
    for ancestor in graph.ancestors(decl.node) {
        let node = graph.node(ancestor);
        let word = match node.kind {
            NodeKind::Object { synthetic: false }
            | NodeKind::Composed
            | NodeKind::Union
            | NodeKind::Operation { .. } => naming::type_name(&node.name),
            _ => continue,
        };
        if words.last() == Some(&word) || decl.base.starts_with(&word) {
            continue;
        }
        words.push(word);
    }
    let mut prefix = String::new();
    for word in words {
        prefix = format!("{word}{prefix}");
        out.push(format!("{prefix}{}", decl.base));
    }
    out
}

pub fn assign_names(graph: &Graph, ctx: &Context<'_>, decls: &[TypeDecl]) -> TypeNames {
    let mut names = vec![String::new(); decls.len()];
    let mut primary = vec![true; decls.len()];
    let mut taken: HashSet<String> = RESERVED_TYPE_NAMES.iter().map(|s| s.to_string()).collect();
    let mut shapes: HashMap<(String, String), usize> = HashMap::new();

    let mut order: Vec<usize> = (0..decls.len()).collect();
    // Declarations named after a component keep their names first.
    order.sort_by_key(|i| (ctx.registered_name(decls[*i].node).is_none(), *i));

    for index in order {
        let decl = &decls[index];
        let shape = (decl.base.clone(), signature(decls, decl));
        if let Some(&earlier) = shapes.get(&shape) {
            names[index] = names[earlier].clone();
            primary[index] = false;
            continue;
        }
        let name = candidates(graph, decl)
            .into_iter()
            .find(|c| !taken.contains(c))
            .unwrap_or_else(|| {
                let mut counter = 2;
                while taken.contains(&format!("{}{counter}", decl.base)) {
                    counter += 1;
                }
                format!("{}{counter}", decl.base)
            });
        if name != decl.base {
            tracing::debug!(base = %decl.base, name = %name, "renamed colliding type");
        }
        taken.insert(name.clone());
        shapes.insert(shape, index);
        names[index] = name;
    }
    TypeNames { names, primary }
}
