//! Intermediate representation: the shared data model
//!
//! The extractor turns a route tree into a [`PathNode`] tree. Both the code
//! generator and the OpenAPI generator consume it; neither mutates it.
//!
//! ## Example IR (JSON dump)
//!
//! ```json
//! {
//!   "name": "",
//!   "kind": "root",
//!   "endpoints": [],
//!   "middleware": [],
//!   "children": [
//!     {
//!       "name": "users",
//!       "kind": "static",
//!       "endpoints": [
//!         {
//!           "method": "GET",
//!           "path": [{ "name": "users", "kind": "static" }],
//!           "body": { "name": "ListUsers", "import": "github.com/acme/users", "fields": [] },
//!           "response": { "name": "UserList", "import": "github.com/acme/users", "fields": [] },
//!           "handler": {
//!             "name": "List",
//!             "import": "github.com/acme/users",
//!             "receiver": { "name": "Service", "pointer": true }
//!           }
//!         }
//!       ]
//!     }
//!   ]
//! }
//! ```

use crate::error::Result;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP methods an endpoint can bind
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of a route-tree vertex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PathKind {
    Root,
    Static,
    Param,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::Root => write!(f, "root"),
            PathKind::Static => write!(f, "static"),
            PathKind::Param => write!(f, "param"),
        }
    }
}

/// How path variables are written in a URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ParamStyle {
    /// `/users/:id`
    #[default]
    Colon,
    /// `/users/{id}`
    Braces,
}

/// One segment of an endpoint's path
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct PathSegment {
    pub name: String,
    pub kind: PathKind,
}

impl PathSegment {
    /// Render this segment; the root renders to nothing
    pub fn render(&self, style: ParamStyle) -> String {
        match (self.kind, style) {
            (PathKind::Root, _) => String::new(),
            (PathKind::Static, _) => self.name.clone(),
            (PathKind::Param, ParamStyle::Colon) => format!(":{}", self.name),
            (PathKind::Param, ParamStyle::Braces) => format!("{{{}}}", self.name),
        }
    }
}

/// Render a segment chain as a URL path; an empty chain is `/`
pub fn render_path(segments: &[PathSegment], style: ParamStyle) -> String {
    let mut url = String::new();
    for segment in segments.iter().filter(|s| s.kind != PathKind::Root) {
        url.push('/');
        url.push_str(&segment.render(style));
    }
    if url.is_empty() {
        url.push('/');
    }
    url
}

/// One route-tree vertex after extraction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct PathNode {
    /// Segment literal (param name for `Param`, empty for the root)
    #[serde(default)]
    pub name: String,
    pub kind: PathKind,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    /// Root-to-node accumulated middleware
    #[serde(default)]
    pub middleware: Vec<HandlerRef>,
    #[serde(default)]
    pub children: Vec<PathNode>,
}

impl PathNode {
    /// Iterate the tree parent-before-children, in declaration order
    pub fn walk(&self) -> Walk<'_> {
        Walk { stack: vec![self] }
    }

    /// Every endpoint in traversal order, paired with its owning node
    pub fn endpoints(&self) -> impl Iterator<Item = (&PathNode, &Endpoint)> {
        self.walk()
            .flat_map(|node| node.endpoints.iter().map(move |e| (node, e)))
    }

    /// Serialize the IR as pretty JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load an IR dump
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Pre-order iterator over a [`PathNode`] tree
pub struct Walk<'a> {
    stack: Vec<&'a PathNode>,
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a PathNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

/// One (method, handler) binding on a [`PathNode`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Endpoint {
    pub method: Method,
    /// Segment chain from the root, root excluded
    pub path: Vec<PathSegment>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    /// Opaque authorization scopes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub authorization: Vec<String>,
    pub body: Data,
    pub response: Data,
    pub handler: HandlerRef,
    /// Endpoint-local middleware, runs after the path-level chain
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<HandlerRef>,
}

impl Endpoint {
    pub fn url(&self, style: ParamStyle) -> String {
        render_path(&self.path, style)
    }

    pub fn is_get(&self) -> bool {
        self.method == Method::Get
    }
}

/// Schema of one record type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Data {
    pub name: String,
    /// Originating module path, empty for built-ins
    #[serde(default)]
    pub import: String,
    #[serde(default)]
    pub fields: Vec<Field>,
}

/// Integer widths as declared on the record member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum IntType {
    I8,
    I16,
    I32,
    I64,
    Isize,
    U8,
    U16,
    U32,
    U64,
    Usize,
}

impl IntType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IntType::I8 => "i8",
            IntType::I16 => "i16",
            IntType::I32 => "i32",
            IntType::I64 => "i64",
            IntType::Isize => "isize",
            IntType::U8 => "u8",
            IntType::U16 => "u16",
            IntType::U32 => "u32",
            IntType::U64 => "u64",
            IntType::Usize => "usize",
        }
    }

    pub fn is_signed(&self) -> bool {
        matches!(
            self,
            IntType::I8 | IntType::I16 | IntType::I32 | IntType::I64 | IntType::Isize
        )
    }
}

/// Kind of a [`Field`]; pointers are always resolved to the pointee
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    String,
    Integer(IntType),
    Array,
    Record,
    Map,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Bool => write!(f, "bool"),
            FieldKind::String => write!(f, "string"),
            FieldKind::Integer(int) => write!(f, "{}", int.as_str()),
            FieldKind::Array => write!(f, "array"),
            FieldKind::Record => write!(f, "record"),
            FieldKind::Map => write!(f, "map"),
        }
    }
}

/// Wire-transport location of a request field
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Json,
    Query,
    Path,
    Header,
    Cookie,
}

impl Role {
    /// Roles accepted by the explicit role tag
    pub const EXPLICIT: [Role; 4] = [Role::Path, Role::Query, Role::Header, Role::Cookie];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Json => "JSON",
            Role::Query => "QUERY",
            Role::Path => "PATH",
            Role::Header => "HEADER",
            Role::Cookie => "COOKIE",
        }
    }

    /// Case-insensitive lookup of a role token
    pub fn parse(token: &str) -> Option<Role> {
        match token.to_ascii_uppercase().as_str() {
            "JSON" => Some(Role::Json),
            "QUERY" => Some(Role::Query),
            "PATH" => Some(Role::Path),
            "HEADER" => Some(Role::Header),
            "COOKIE" => Some(Role::Cookie),
            _ => None,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a field travels and under which name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct Serialization {
    pub role: Role,
    pub name: String,
}

/// Validation token that marks a field mandatory
pub const REQUIRED: &str = "required";

/// One leaf or composite member of a [`Data`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Field {
    #[serde(default)]
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub serialization: Option<Serialization>,
    /// Opaque validation rule tokens, in tag order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub validation: Vec<String>,
    /// Array: element schema. Record: members. Map: `key` then `value`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subfields: Vec<Field>,
}

impl Field {
    pub fn role(&self) -> Option<Role> {
        self.serialization.as_ref().map(|s| s.role)
    }

    /// Serialized name when present, else the declared name
    pub fn wire_name(&self) -> &str {
        self.serialization
            .as_ref()
            .map(|s| s.name.as_str())
            .unwrap_or(&self.name)
    }

    pub fn is_required(&self) -> bool {
        self.validation.iter().any(|v| v == REQUIRED)
    }
}

/// Enclosing type of a bound method
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema,
)]
pub struct Receiver {
    pub name: String,
    /// Method is declared on a pointer to the type
    #[serde(default)]
    pub pointer: bool,
}

/// Identity of a handler or middleware function
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct HandlerRef {
    pub name: String,
    pub import: String,
    /// Present iff the function is a bound method
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Receiver>,
}

impl HandlerRef {
    /// A free function
    pub fn function(import: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            import: import.into(),
            receiver: None,
        }
    }

    /// A method bound to `receiver`
    pub fn method(
        import: impl Into<String>,
        receiver: impl Into<String>,
        pointer: bool,
        name: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            import: import.into(),
            receiver: Some(Receiver {
                name: receiver.into(),
                pointer,
            }),
        }
    }
}

impl fmt::Display for HandlerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.receiver {
            Some(r) if r.pointer => write!(f, "{}.(*{}).{}", self.import, r.name, self.name),
            Some(r) => write!(f, "{}.{}.{}", self.import, r.name, self.name),
            None => write!(f, "{}.{}", self.import, self.name),
        }
    }
}
