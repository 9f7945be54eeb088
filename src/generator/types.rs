use crate::context::{Context, WarningKind};
use crate::document::HttpMethod;
use crate::error::{GenError, Result};
use crate::graph::{
    compare_names, consolidate, expand, resolve_target, schema_type, visit, Graph, KindTag,
    NodeId, NodeKind, ParamLocation, PropKind, ScalarType,
};
use crate::naming;
use crate::selection::Collection;
use indexmap::IndexSet;
use std::collections::{HashMap, HashSet};
use tracing::debug;

/// Which side of an operation a type describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Response data, emitted as `type` with selected fields only.
    Output,
    /// Arguments, emitted as `input` with every field.
    Input,
}

/// GraphQL type of a field or argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Scalar(ScalarType),
    /// Index into the declaration list.
    Named(usize),
    List(Box<TypeRef>),
}

#[derive(Debug, Clone)]
pub struct FieldDecl {
    /// Key in the upstream JSON
    pub json_name: String,
    /// GraphQL field name
    pub name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub description: Option<String>,
    /// Trailing comment (reserved name, placeholder element type)
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub enum DeclKind {
    Enum { values: Vec<String> },
    Object { fields: Vec<FieldDecl> },
}

/// One `enum`, `type` or `input` declaration.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    /// First node that produced the declaration
    pub node: NodeId,
    /// Node id, plus `/input` for input objects; nodes sharing a key merge
    pub key: String,
    /// Name before collision handling
    pub base: String,
    pub input: bool,
    pub kind: DeclKind,
    pub description: Option<String>,
}

/// Argument of a root field.
#[derive(Debug, Clone)]
pub struct ArgDecl {
    pub name: String,
    /// `None` for the request body argument.
    pub location: Option<ParamLocation>,
    /// Parameter name as sent upstream
    pub wire_name: String,
    pub ty: TypeRef,
    pub required: bool,
    pub description: Option<String>,
}

/// One `Query` or `Mutation` field.
#[derive(Debug, Clone)]
pub struct OperationDecl {
    pub node: NodeId,
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    pub description: Option<String>,
    pub args: Vec<ArgDecl>,
    pub returns: TypeRef,
    pub response: Option<NodeId>,
    /// Body node and the name of its argument.
    pub body: Option<(NodeId, String)>,
    /// Trailing comment of the root field.
    pub comment: Option<String>,
}

/// A property of a container as it appears in the output.
#[derive(Debug, Clone)]
pub struct VisibleField {
    pub json_name: String,
    pub prop: NodeId,
    /// GraphQL name; `None` for circular fields, which are not emitted.
    pub name: Option<String>,
    pub comment: Option<String>,
}

/// Properties of `container` in emission order with their GraphQL names.
///
/// `collection` limits the result to selected properties.
pub fn visible_fields(
    graph: &Graph,
    container: NodeId,
    collection: Option<&Collection>,
) -> Vec<VisibleField> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for (json_name, prop) in &graph.node(container).props {
        if collection.is_some_and(|c| !c.is_selected(*prop)) {
            continue;
        }
        let circular = matches!(graph.node(*prop).prop_kind(), Some(PropKind::Circular));
        let (name, comment) = if circular {
            (None, None)
        } else {
            let guarded = naming::guard_reserved(json_name);
            let name = naming::unique_name(&mut seen, &guarded.name);
            (Some(name), guarded.comment)
        };
        out.push(VisibleField {
            json_name: json_name.clone(),
            prop: *prop,
            name,
            comment,
        });
    }
    out
}

const PLACEHOLDER_COMMENT: &str = "element type could not be derived";

/// Whether an array (schema or property) bottoms out in a placeholder element.
fn has_placeholder(graph: &Graph, id: NodeId) -> bool {
    let mut cursor = graph.target_of(id);
    loop {
        let node = graph.node(cursor);
        match &node.kind {
            NodeKind::Scalar { placeholder, .. }
            | NodeKind::Property {
                kind: PropKind::Scalar { placeholder, .. },
                ..
            } => return *placeholder,
            NodeKind::Array
            | NodeKind::Property {
                kind: PropKind::Array,
                ..
            } => match node.children.first() {
                Some(item) => cursor = graph.target_of(*item),
                None => return false,
            },
            _ => return false,
        }
    }
}

/// Whether `id` sits below a Param or Body.
pub fn in_arguments(graph: &Graph, id: NodeId) -> bool {
    graph
        .ancestors(id)
        .iter()
        .any(|a| matches!(graph.node(*a).tag(), KindTag::Param | KindTag::Body))
}

/// First pass: builds declarations bottom-up so referenced types precede
/// the types referencing them.
pub struct TypeBuilder<'a, 'doc> {
    graph: &'a mut Graph,
    ctx: &'a mut Context<'doc>,
    collection: &'a Collection,
    decls: Vec<TypeDecl>,
    index: HashMap<String, usize>,
    uses_json: bool,
    fallbacks: HashSet<NodeId>,
}

impl<'a, 'doc> TypeBuilder<'a, 'doc> {
    pub fn new(graph: &'a mut Graph, ctx: &'a mut Context<'doc>, collection: &'a Collection) -> Self {
        Self {
            graph,
            ctx,
            collection,
            decls: Vec::new(),
            index: HashMap::new(),
            uses_json: false,
            fallbacks: HashSet::new(),
        }
    }

    /// Declarations in emission order, and whether `JSON` is referenced.
    pub fn finish(self) -> (Vec<TypeDecl>, bool) {
        (self.decls, self.uses_json)
    }

    /// Named component absorbed by consolidation with no references left.
    fn is_pruned(&self, id: NodeId) -> bool {
        if !self.ctx.is_absorbed(id) {
            return false;
        }
        let remaining = match self.graph.node(id).parent.map(|p| &self.graph.node(p).kind) {
            Some(NodeKind::Reference { pointer }) => self.ctx.ref_count(pointer),
            _ => 0,
        };
        remaining <= 0
    }

    /// Declare every collected container reachable as response data.
    pub fn declare_containers(&mut self) -> Result<()> {
        let collection = self.collection;
        for &id in &collection.containers {
            if matches!(self.graph.node(id).kind, NodeKind::CircularRef { .. })
                || in_arguments(self.graph, id)
            {
                continue;
            }
            if self.is_pruned(id) {
                debug!(node = %self.graph.node(id).id(), "skipping absorbed type");
                continue;
            }
            self.node_type(id, Mode::Output)?;
        }
        Ok(())
    }

    /// Root field for one operation, declaring argument and result types.
    pub fn operation(&mut self, op: NodeId) -> Result<OperationDecl> {
        let children = expand(self.graph, self.ctx, op)?;
        let node = self.graph.node(op);
        let NodeKind::Operation { method, path, .. } = &node.kind else {
            return Err(GenError::NotAnOperation {
                path: self.graph.path_of(op),
            });
        };
        let mut decl = OperationDecl {
            node: op,
            name: node.name.clone(),
            method: *method,
            path: path.clone(),
            description: node
                .schema
                .get("summary")
                .or_else(|| node.schema.get("description"))
                .and_then(|v| v.as_str())
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty()),
            args: Vec::new(),
            returns: TypeRef::Scalar(ScalarType::Json),
            response: None,
            body: None,
            comment: None,
        };

        self.ctx.enter(op, KindTag::Operation);
        let mut seen = HashSet::new();
        for child in children {
            let node = self.graph.node(child);
            let first = node.children.first().copied();
            match node.kind {
                NodeKind::Param { location, required } => {
                    let wire_name = node.name.clone();
                    let description = node.description().map(str::to_string);
                    self.ctx.enter(child, KindTag::Param);
                    let ty = match first {
                        Some(schema) => self.node_type(schema, Mode::Input)?,
                        None => None,
                    };
                    self.ctx.leave();
                    decl.args.push(ArgDecl {
                        name: naming::unique_name(&mut seen, &naming::field_name(&wire_name)),
                        location: Some(location),
                        wire_name,
                        ty: ty.unwrap_or(TypeRef::Scalar(ScalarType::String)),
                        required,
                        description,
                    });
                }
                NodeKind::Body { required } => {
                    self.ctx.enter(child, KindTag::Body);
                    let ty = match first {
                        Some(schema) => self.node_type(schema, Mode::Input)?,
                        None => None,
                    };
                    self.ctx.leave();
                    if first.is_some_and(|schema| has_placeholder(self.graph, schema)) {
                        decl.comment = Some(format!("input {PLACEHOLDER_COMMENT}"));
                    }
                    let name = naming::unique_name(&mut seen, "input");
                    let ty = ty.unwrap_or_else(|| self.scalar(ScalarType::Json));
                    decl.args.push(ArgDecl {
                        name: name.clone(),
                        location: None,
                        wire_name: name.clone(),
                        ty,
                        required,
                        description: None,
                    });
                    decl.body = Some((child, name));
                }
                NodeKind::Response { .. } => {
                    let ty = match first {
                        Some(schema) => self.node_type(schema, Mode::Output)?,
                        None => None,
                    };
                    decl.returns = ty.unwrap_or_else(|| self.scalar(ScalarType::Json));
                    decl.response = Some(child);
                    if first.is_some_and(|schema| has_placeholder(self.graph, schema)) {
                        decl.comment = Some(PLACEHOLDER_COMMENT.to_string());
                    }
                }
                _ => {}
            }
        }
        self.ctx.leave();
        Ok(decl)
    }

    fn scalar(&mut self, ty: ScalarType) -> TypeRef {
        if ty == ScalarType::Json {
            self.uses_json = true;
        }
        TypeRef::Scalar(ty)
    }

    /// GraphQL type of a schema node; `None` for circular references.
    pub fn node_type(&mut self, id: NodeId, mode: Mode) -> Result<Option<TypeRef>> {
        let target = resolve_target(self.graph, self.ctx, id)?;
        let node = self.graph.node(target);
        match &node.kind {
            NodeKind::Scalar { ty, .. } => {
                let ty = *ty;
                Ok(Some(self.scalar(ty)))
            }
            NodeKind::Enum { values } => {
                let values = values.clone();
                Ok(Some(self.enum_type(target, values)))
            }
            NodeKind::Object { synthetic: true } => Ok(Some(self.scalar(ScalarType::Json))),
            NodeKind::Object { .. } | NodeKind::Composed | NodeKind::Union => {
                self.object_type(target, mode)
            }
            NodeKind::Array => match node.children.first().copied() {
                Some(item) => Ok(self
                    .node_type(item, mode)?
                    .map(|t| TypeRef::List(Box::new(t)))),
                None => Ok(Some(TypeRef::List(Box::new(self.scalar(ScalarType::Json))))),
            },
            NodeKind::CircularRef { .. } => Ok(None),
            _ => Ok(Some(self.scalar(ScalarType::Json))),
        }
    }

    fn prop_type(&mut self, prop: NodeId, mode: Mode) -> Result<Option<TypeRef>> {
        visit(self.graph, self.ctx, prop)?;
        let node = self.graph.node(prop);
        let child = node.children.first().copied();
        match (node.prop_kind(), child) {
            (Some(PropKind::Scalar { ty, .. }), _) => Ok(Some(self.scalar(ty))),
            (Some(PropKind::Circular) | None, _) => Ok(None),
            (Some(PropKind::Array), Some(item)) => Ok(self
                .prop_type(item, mode)?
                .map(|t| TypeRef::List(Box::new(t)))),
            (Some(_), Some(child)) => self.node_type(child, mode),
            (Some(_), None) => Ok(Some(self.scalar(ScalarType::Json))),
        }
    }

    fn object_type(&mut self, target: NodeId, mode: Mode) -> Result<Option<TypeRef>> {
        if matches!(self.graph.node(target).kind, NodeKind::Composed | NodeKind::Union) {
            consolidate(self.graph, self.ctx, target)?;
        } else {
            visit(self.graph, self.ctx, target)?;
        }
        let collection = match mode {
            Mode::Output => Some(self.collection),
            Mode::Input => None,
        };
        let mut fields = Vec::new();
        for field in visible_fields(self.graph, target, collection) {
            let Some(name) = field.name else { continue };
            let Some(ty) = self.prop_type(field.prop, mode)? else {
                continue;
            };
            let node = self.graph.node(field.prop);
            let comment = if has_placeholder(self.graph, field.prop) {
                Some(PLACEHOLDER_COMMENT.to_string())
            } else {
                field.comment
            };
            fields.push(FieldDecl {
                json_name: field.json_name,
                name,
                ty,
                required: matches!(node.kind, NodeKind::Property { required: true, .. }),
                description: node.description().map(str::to_string),
                comment,
            });
        }
        if fields.is_empty() {
            return Ok(Some(self.scalar(ScalarType::Json)));
        }
        Ok(Some(self.declare(target, mode, DeclKind::Object { fields })))
    }

    fn enum_type(&mut self, target: NodeId, values: Vec<String>) -> TypeRef {
        let values: Vec<String> = values.into_iter().collect::<IndexSet<_>>().into_iter().collect();
        if !values.is_empty() && values.iter().all(|v| naming::is_enum_value(v)) {
            return self.declare(target, Mode::Output, DeclKind::Enum { values });
        }
        if self.fallbacks.insert(target) {
            self.ctx.warn(
                self.graph.path_of(target),
                WarningKind::EnumFallback,
                "enum values are not valid GraphQL names, using the underlying scalar",
            );
        }
        let ty = schema_type(&self.graph.node(target).schema)
            .and_then(ScalarType::from_type)
            .unwrap_or(ScalarType::String);
        TypeRef::Scalar(ty)
    }

    fn declare(&mut self, target: NodeId, mode: Mode, kind: DeclKind) -> TypeRef {
        let node = self.graph.node(target);
        let input = mode == Mode::Input && matches!(kind, DeclKind::Object { .. });
        let key = if input {
            format!("{}/input", node.id())
        } else {
            node.id()
        };
        if !self.ctx.mark_generated(&key) {
            if let Some(&existing) = self.index.get(&key) {
                merge(&mut self.decls[existing].kind, kind);
                return TypeRef::Named(existing);
            }
        }
        let mut base = naming::type_name(&node.name);
        if input && !base.ends_with("Input") {
            base.push_str("Input");
        }
        let index = self.decls.len();
        self.decls.push(TypeDecl {
            node: target,
            key: key.clone(),
            base,
            input,
            kind,
            description: node.description().map(str::to_string),
        });
        self.index.insert(key, index);
        TypeRef::Named(index)
    }
}

/// Add the fields of `incoming` missing from `existing`.
fn merge(existing: &mut DeclKind, incoming: DeclKind) {
    if let (DeclKind::Object { fields }, DeclKind::Object { fields: new }) = (existing, incoming) {
        let mut added = false;
        for field in new {
            if !fields.iter().any(|f| f.json_name == field.json_name) {
                fields.push(field);
                added = true;
            }
        }
        if added {
            fields.sort_by(|a, b| compare_names(&a.json_name, &b.json_name));
        }
    }
}
