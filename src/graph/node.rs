use crate::document::HttpMethod;
use indexmap::IndexMap;
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Stable handle of a node in the [`Graph`](super::Graph) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(super) usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Scalar types the output schema can express.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarType {
    String,
    Int,
    Float,
    Boolean,
    /// Opaque JSON value.
    Json,
}

impl ScalarType {
    /// Map a JSON Schema `type` keyword.
    pub fn from_type(ty: &str) -> Option<Self> {
        match ty {
            "string" => Some(ScalarType::String),
            "integer" => Some(ScalarType::Int),
            "number" => Some(ScalarType::Float),
            "boolean" => Some(ScalarType::Boolean),
            _ => None,
        }
    }

    pub fn graphql_name(&self) -> &'static str {
        match self {
            ScalarType::String => "String",
            ScalarType::Int => "Int",
            ScalarType::Float => "Float",
            ScalarType::Boolean => "Boolean",
            ScalarType::Json => "JSON",
        }
    }
}

/// Shape of a [`NodeKind::Property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PropKind {
    Scalar { ty: ScalarType, placeholder: bool },
    Object,
    Array,
    Enum,
    Composed,
    Circular,
}

impl PropKind {
    fn label(&self) -> &'static str {
        match self {
            PropKind::Scalar { .. } => "prop:scalar",
            PropKind::Object => "prop:obj",
            PropKind::Array => "prop:array",
            PropKind::Enum => "prop:enum",
            PropKind::Composed => "prop:comp",
            PropKind::Circular => "prop:circ",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamLocation {
    Path,
    Query,
    Header,
    Cookie,
}

impl ParamLocation {
    pub fn parse(s: &str) -> Self {
        match s.to_ascii_lowercase().as_str() {
            "path" => ParamLocation::Path,
            "header" => ParamLocation::Header,
            "cookie" => ParamLocation::Cookie,
            _ => ParamLocation::Query,
        }
    }
}

/// Discriminant of a [`NodeKind`] without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindTag {
    Scalar,
    Enum,
    Object,
    Array,
    Reference,
    Composed,
    Union,
    CircularRef,
    Operation,
    Param,
    Body,
    Response,
    Property,
}

/// The closed set of node variants.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Scalar {
        ty: ScalarType,
        /// Stand-in for an element type that could not be derived.
        placeholder: bool,
    },
    Enum {
        values: Vec<String>,
    },
    Object {
        /// No declared `properties`.
        synthetic: bool,
    },
    Array,
    Reference {
        pointer: String,
    },
    /// `allOf`
    Composed,
    /// `oneOf` / `anyOf`
    Union,
    CircularRef {
        /// The ancestor this edge would have re-entered.
        target: NodeId,
    },
    Operation {
        method: HttpMethod,
        path: String,
        shared_parameters: Vec<Value>,
    },
    Param {
        location: ParamLocation,
        required: bool,
    },
    Body {
        required: bool,
    },
    Response {
        status: String,
        synthetic: bool,
    },
    Property {
        kind: PropKind,
        required: bool,
    },
}

impl NodeKind {
    pub fn tag(&self) -> KindTag {
        match self {
            NodeKind::Scalar { .. } => KindTag::Scalar,
            NodeKind::Enum { .. } => KindTag::Enum,
            NodeKind::Object { .. } => KindTag::Object,
            NodeKind::Array => KindTag::Array,
            NodeKind::Reference { .. } => KindTag::Reference,
            NodeKind::Composed => KindTag::Composed,
            NodeKind::Union => KindTag::Union,
            NodeKind::CircularRef { .. } => KindTag::CircularRef,
            NodeKind::Operation { .. } => KindTag::Operation,
            NodeKind::Param { .. } => KindTag::Param,
            NodeKind::Body { .. } => KindTag::Body,
            NodeKind::Response { .. } => KindTag::Response,
            NodeKind::Property { .. } => KindTag::Property,
        }
    }

    /// The `<kind>` half of a node id.
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Scalar { .. } => "scalar",
            NodeKind::Enum { .. } => "enum",
            NodeKind::Object { .. } => "obj",
            NodeKind::Array => "array",
            NodeKind::Reference { .. } => "ref",
            NodeKind::Composed => "comp",
            NodeKind::Union => "union",
            NodeKind::CircularRef { .. } => "circular",
            NodeKind::Operation { method, .. } => method.key(),
            NodeKind::Param { .. } => "param",
            NodeKind::Body { .. } => "body",
            NodeKind::Response { .. } => "res",
            NodeKind::Property { kind, .. } => kind.label(),
        }
    }
}

/// Build a `"<kind>:<discriminant>"` id.
pub fn format_id(kind: &NodeKind, discriminant: &str) -> String {
    format!("{}:{}", kind.label(), discriminant)
}

/// Case-insensitive name order with a case-sensitive tie break.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Ids of non-property ancestors (self included) with their handles.
pub type Lineage = Rc<HashMap<String, NodeId>>;

/// One vertex of the type graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    /// Display name; synthesized for anonymous schemas.
    pub name: String,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// Fields of an Object, or the consolidated fields of a Composed/Union.
    pub props: IndexMap<String, NodeId>,
    pub visited: bool,
    pub consolidated: bool,
    /// The raw fragment this node was built from.
    pub schema: Value,
    pub(super) discriminant: String,
    pub(super) scope: String,
    pub(super) lineage: Lineage,
}

impl Node {
    pub fn id(&self) -> String {
        format_id(&self.kind, &self.discriminant)
    }

    pub fn tag(&self) -> KindTag {
        self.kind.tag()
    }

    pub fn discriminant(&self) -> &str {
        &self.discriminant
    }

    /// Dotted property chain from the nearest named ancestor.
    pub fn scope(&self) -> &str {
        &self.scope
    }

    pub fn is_property(&self) -> bool {
        matches!(self.kind, NodeKind::Property { .. })
    }

    pub fn prop_kind(&self) -> Option<PropKind> {
        match self.kind {
            NodeKind::Property { kind, .. } => Some(kind),
            _ => None,
        }
    }

    /// Terminal node of a selection path.
    pub fn is_leaf(&self) -> bool {
        match &self.kind {
            NodeKind::Scalar { .. } | NodeKind::Enum { .. } | NodeKind::CircularRef { .. } => true,
            NodeKind::Object { synthetic } => *synthetic,
            NodeKind::Property { kind, .. } => matches!(
                kind,
                PropKind::Scalar { .. } | PropKind::Enum | PropKind::Circular
            ),
            _ => false,
        }
    }

    /// A non-leaf that is emitted as its own type.
    pub fn is_container(&self) -> bool {
        match &self.kind {
            NodeKind::Object { synthetic } => !*synthetic,
            NodeKind::Composed | NodeKind::Union | NodeKind::CircularRef { .. } => true,
            _ => false,
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.schema
            .get("description")
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Everything needed to allocate a node.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub kind: NodeKind,
    pub name: String,
    pub discriminant: String,
    pub scope: String,
    pub schema: Value,
}

impl NewNode {
    pub fn id(&self) -> String {
        format_id(&self.kind, &self.discriminant)
    }
}
