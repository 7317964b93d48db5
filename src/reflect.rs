//! Type descriptions for handler signatures and record types
//!
//! The extractor never inspects live values. Every request/response record
//! describes itself through [`Reflect`], and every handler or middleware is
//! registered with an [`FnInfo`] carrying its identity and signature.
//!
//! ```
//! use routespec::reflect::{Reflect, TypeInfo};
//!
//! struct GetUser {
//!     id: String,
//!     verbose: Option<bool>,
//! }
//!
//! impl Reflect for GetUser {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::record("GetUser", "github.com/acme/users")
//!             .field("ID", String::type_info(), r#"as:"id,path" validate:"required""#)
//!             .field("Verbose", Option::<bool>::type_info(), r#"as:"verbose,query""#)
//!     }
//! }
//! ```
//!
//! Recursive record types are not supported: `type_info()` is evaluated eagerly.

use crate::ir::{HandlerRef, IntType};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Types that can describe their own structure
pub trait Reflect {
    fn type_info() -> TypeInfo;
}

/// Structural description of one type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeInfo {
    /// Declared name, e.g. `GetUser` or `i64`
    pub name: String,
    /// Declaring module path, empty for built-ins
    pub module: String,
    pub shape: Shape,
}

/// What a type is made of
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    Bool,
    String,
    Int(IntType),
    /// Floating point; described so extraction can reject it
    Float,
    Char,
    Unit,
    /// One level of indirection
    Pointer(Box<TypeInfo>),
    /// Growable sequence
    Slice(Box<TypeInfo>),
    /// Fixed-length sequence
    Array(Box<TypeInfo>, usize),
    Map(Box<TypeInfo>, Box<TypeInfo>),
    Record(Vec<FieldInfo>),
    /// Request-scoped context capability (first handler input)
    Context,
    /// Error capability (last handler output)
    Error,
}

/// One member of a record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldInfo {
    pub name: String,
    pub ty: TypeInfo,
    pub tags: Tags,
    /// Anonymous member whose fields belong to the parent
    pub embedded: bool,
}

impl TypeInfo {
    fn builtin(name: &str, shape: Shape) -> Self {
        Self {
            name: name.to_string(),
            module: String::new(),
            shape,
        }
    }

    /// An empty record; add members with [`TypeInfo::field`] and [`TypeInfo::embed`]
    pub fn record(name: impl Into<String>, module: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            module: module.into(),
            shape: Shape::Record(Vec::new()),
        }
    }

    /// Append a named member. Non-record types ignore the call.
    pub fn field(mut self, name: impl Into<String>, ty: TypeInfo, tags: impl Into<Tags>) -> Self {
        if let Shape::Record(fields) = &mut self.shape {
            fields.push(FieldInfo {
                name: name.into(),
                ty,
                tags: tags.into(),
                embedded: false,
            });
        }
        self
    }

    /// Append an anonymous embedded member
    pub fn embed(mut self, ty: TypeInfo) -> Self {
        if let Shape::Record(fields) = &mut self.shape {
            let mut named = &ty;
            while let Shape::Pointer(inner) = &named.shape {
                named = inner;
            }
            fields.push(FieldInfo {
                name: named.name.clone(),
                ty,
                tags: Tags::default(),
                embedded: true,
            });
        }
        self
    }

    pub fn pointer(to: TypeInfo) -> Self {
        Self::builtin("", Shape::Pointer(Box::new(to)))
    }

    pub fn context() -> Self {
        Self::builtin("context", Shape::Context)
    }

    pub fn error() -> Self {
        Self::builtin("error", Shape::Error)
    }

    pub fn is_record(&self) -> bool {
        matches!(self.shape, Shape::Record(_))
    }
}

impl fmt::Display for TypeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::Pointer(inner) => write!(f, "*{}", inner),
            Shape::Slice(elem) => write!(f, "[]{}", elem),
            Shape::Array(elem, len) => write!(f, "[{}]{}", len, elem),
            Shape::Map(key, value) => write!(f, "map[{}]{}", key, value),
            Shape::Record(_) if !self.module.is_empty() => {
                let package = self.module.rsplit('/').next().unwrap_or(&self.module);
                write!(f, "{}.{}", package, self.name)
            }
            _ => f.write_str(&self.name),
        }
    }
}

impl Reflect for bool {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("bool", Shape::Bool)
    }
}

impl Reflect for String {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("string", Shape::String)
    }
}

impl Reflect for char {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("char", Shape::Char)
    }
}

impl Reflect for () {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("()", Shape::Unit)
    }
}

macro_rules! reflect_int {
    ($($ty:ty => $int:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                fn type_info() -> TypeInfo {
                    TypeInfo::builtin(IntType::$int.as_str(), Shape::Int(IntType::$int))
                }
            }
        )*
    };
}

reflect_int! {
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    isize => Isize,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
    usize => Usize,
}

impl Reflect for f32 {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("f32", Shape::Float)
    }
}

impl Reflect for f64 {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("f64", Shape::Float)
    }
}

impl<T: Reflect> Reflect for Vec<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("", Shape::Slice(Box::new(T::type_info())))
    }
}

impl<T: Reflect, const N: usize> Reflect for [T; N] {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin("", Shape::Array(Box::new(T::type_info()), N))
    }
}

impl<K: Reflect, V: Reflect, S> Reflect for HashMap<K, V, S> {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin(
            "",
            Shape::Map(Box::new(K::type_info()), Box::new(V::type_info())),
        )
    }
}

impl<K: Reflect, V: Reflect> Reflect for BTreeMap<K, V> {
    fn type_info() -> TypeInfo {
        TypeInfo::builtin(
            "",
            Shape::Map(Box::new(K::type_info()), Box::new(V::type_info())),
        )
    }
}

impl<T: Reflect> Reflect for Box<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::pointer(T::type_info())
    }
}

impl<T: Reflect> Reflect for Option<T> {
    fn type_info() -> TypeInfo {
        TypeInfo::pointer(T::type_info())
    }
}

/// Ordered `key → value` metadata attached to a record member
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tags(Vec<(String, String)>);

impl Tags {
    /// Parse the compact `key:"value" key2:"value2"` form.
    ///
    /// Malformed fragments end the scan; whatever parsed so far is kept.
    pub fn parse(raw: &str) -> Self {
        let mut tags = Vec::new();
        let mut rest = raw;
        loop {
            rest = rest.trim_start();
            let Some(colon) = rest.find(':') else { break };
            let key = &rest[..colon];
            if key.is_empty() || key.contains(|c: char| c.is_whitespace() || c == '"') {
                break;
            }
            let Some(quoted) = rest[colon + 1..].strip_prefix('"') else {
                break;
            };
            let Some((value, len)) = read_quoted(quoted) else {
                break;
            };
            tags.push((key.to_string(), value));
            rest = &quoted[len + 1..];
        }
        Self(tags)
    }

    /// First value for `key`; an empty value counts as absent
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .filter(|v| !v.is_empty())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Read up to the closing quote; returns the unescaped value and the
/// byte length consumed before the closing quote.
fn read_quoted(s: &str) -> Option<(String, usize)> {
    let mut value = String::new();
    let mut escaped = false;
    for (i, c) in s.char_indices() {
        match c {
            _ if escaped => {
                value.push(c);
                escaped = false;
            }
            '\\' => escaped = true,
            '"' => return Some((value, i)),
            _ => value.push(c),
        }
    }
    None
}

impl From<&str> for Tags {
    fn from(raw: &str) -> Self {
        Tags::parse(raw)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Tags {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// How a function value identifies itself
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FnIdentity {
    /// Import path, optional receiver and name supplied by the caller
    Declared(HandlerRef),
    /// Fully qualified symbol, e.g. `github.com/acme/users.(*Service).Get`
    Qualified(String),
}

impl fmt::Display for FnIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FnIdentity::Declared(handler) => write!(f, "{}", handler),
            FnIdentity::Qualified(name) => f.write_str(name),
        }
    }
}

impl From<HandlerRef> for FnIdentity {
    fn from(handler: HandlerRef) -> Self {
        FnIdentity::Declared(handler)
    }
}

impl From<&str> for FnIdentity {
    fn from(name: &str) -> Self {
        FnIdentity::Qualified(name.to_string())
    }
}

impl From<String> for FnIdentity {
    fn from(name: String) -> Self {
        FnIdentity::Qualified(name)
    }
}

/// A function value: identity plus signature
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FnInfo {
    pub identity: FnIdentity,
    pub inputs: Vec<TypeInfo>,
    pub outputs: Vec<TypeInfo>,
}

impl FnInfo {
    /// A function with no inputs or outputs yet
    pub fn new(identity: impl Into<FnIdentity>) -> Self {
        Self {
            identity: identity.into(),
            inputs: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// A handler with the canonical `(context, *Req) -> (*Res, error)` shape
    pub fn handler<Req: Reflect, Res: Reflect>(identity: impl Into<FnIdentity>) -> Self {
        Self::new(identity)
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(Req::type_info()))
            .output(TypeInfo::pointer(Res::type_info()))
            .output(TypeInfo::error())
    }

    /// Middleware only needs an identity
    pub fn middleware(identity: impl Into<FnIdentity>) -> Self {
        Self::new(identity)
    }

    pub fn input(mut self, ty: TypeInfo) -> Self {
        self.inputs.push(ty);
        self
    }

    pub fn output(mut self, ty: TypeInfo) -> Self {
        self.outputs.push(ty);
        self
    }

    /// Signature in `fn(a, b) -> (c, d)` form
    pub fn signature(&self) -> String {
        let join = |types: &[TypeInfo]| {
            types
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };
        format!("fn({}) -> ({})", join(&self.inputs), join(&self.outputs))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Inner;
    impl Reflect for Inner {
        fn type_info() -> TypeInfo {
            TypeInfo::record("Inner", "github.com/acme/shared").field(
                "Tenant",
                String::type_info(),
                r#"as:"x-tenant,header""#,
            )
        }
    }

    #[test]
    fn test_tags_parse_compact_form() {
        let tags = Tags::parse(r#"json:"name,omitempty" as:"id,path" validate:"required,uuid""#);
        assert_eq!(tags.get("json"), Some("name,omitempty"));
        assert_eq!(tags.get("as"), Some("id,path"));
        assert_eq!(tags.get("validate"), Some("required,uuid"));
        assert_eq!(tags.get("xml"), None);
    }

    #[test]
    fn test_tags_empty_value_is_absent() {
        let tags = Tags::parse(r#"as:"" json:"name""#);
        assert_eq!(tags.get("as"), None);
        assert_eq!(tags.get("json"), Some("name"));
    }

    #[test]
    fn test_tags_malformed_tail_is_dropped() {
        let tags = Tags::parse(r#"json:"name" broken validate:"required""#);
        assert_eq!(tags.get("json"), Some("name"));
        assert_eq!(tags.get("validate"), None);

        let unterminated = Tags::parse(r#"json:"name"#);
        assert!(unterminated.is_empty());
    }

    #[test]
    fn test_tags_escaped_quote() {
        let tags = Tags::parse(r#"doc:"say \"hi\"""#);
        assert_eq!(tags.get("doc"), Some(r#"say "hi""#));
    }

    #[test]
    fn test_option_and_box_are_single_pointers() {
        let ti = Option::<Box<String>>::type_info();
        let Shape::Pointer(inner) = &ti.shape else {
            panic!("expected pointer, got {:?}", ti.shape);
        };
        assert!(matches!(inner.shape, Shape::Pointer(_)));
        assert_eq!(ti.to_string(), "**string");
    }

    #[test]
    fn test_record_builder_and_display() {
        let ti = TypeInfo::record("Req", "github.com/acme/users")
            .embed(Inner::type_info())
            .field("Tags", Vec::<String>::type_info(), "")
            .field("Meta", HashMap::<String, i64>::type_info(), r#"json:"meta""#);
        let Shape::Record(fields) = &ti.shape else {
            panic!("expected record");
        };
        assert_eq!(fields.len(), 3);
        assert!(fields[0].embedded);
        assert_eq!(fields[1].ty.to_string(), "[]string");
        assert_eq!(fields[2].ty.to_string(), "map[string]i64");
        assert_eq!(ti.to_string(), "users.Req");
    }

    #[test]
    fn test_handler_signature() {
        let f = FnInfo::handler::<Inner, Inner>("github.com/acme/users.Get");
        assert_eq!(
            f.signature(),
            "fn(context, *shared.Inner) -> (*shared.Inner, error)"
        );
        assert!(FnInfo::middleware("github.com/acme/mw.Log").inputs.is_empty());
    }
}
