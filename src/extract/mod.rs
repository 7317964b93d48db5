//! Schema extraction: route tree → IR
//!
//! Walks the input tree depth-first, validating every handler signature,
//! resolving function identities and turning request/response records into
//! [`Data`](crate::ir::Data) schemas. Middleware accumulates root-to-leaf; each
//! child receives its own copy of the parent chain.
//!
//! Any failure aborts the run; errors carry the path, field or handler they
//! were raised on.

mod fields;
mod identity;
mod signature;

pub use identity::{parse_qualified_name, resolve_identity};

use crate::error::{Error, Result};
use crate::ir::{render_path, Endpoint, HandlerRef, Method, ParamStyle, PathKind, PathNode, PathSegment};
use crate::reflect::FnInfo;
use crate::route::{EndpointDef, Route};

/// Extract the IR from a route tree with the default tag keys
pub fn extract(route: &Route) -> Result<PathNode> {
    Extractor::new().extract(route)
}

/// Schema extractor
pub struct Extractor {
    config: ExtractorConfig,
}

/// Tag keys read from record members
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Explicit `name,role` tag
    pub role_tag: String,
    /// Conventional name tag, implies the JSON role
    pub name_tag: String,
    /// Comma-separated validation rules
    pub validate_tag: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            role_tag: "as".to_string(),
            name_tag: "json".to_string(),
            validate_tag: "validate".to_string(),
        }
    }
}

impl Extractor {
    pub fn new() -> Self {
        Self {
            config: ExtractorConfig::default(),
        }
    }

    pub fn with_config(config: ExtractorConfig) -> Self {
        Self { config }
    }

    /// Extract the IR; the top node must be the root
    pub fn extract(&self, route: &Route) -> Result<PathNode> {
        let kind = route.segment().kind;
        if kind != PathKind::Root {
            return Err(Error::bad_value("top-level path kind", kind, PathKind::Root));
        }
        let node = self.traverse(route, &[], &[], 0)?;
        tracing::debug!(
            endpoints = node.endpoints().count(),
            "route tree extracted"
        );
        Ok(node)
    }

    fn traverse(
        &self,
        route: &Route,
        parent_path: &[PathSegment],
        parent_middleware: &[HandlerRef],
        depth: usize,
    ) -> Result<PathNode> {
        let segment = route.segment();
        if depth > 0 && segment.kind == PathKind::Root {
            return Err(Error::bad_value("nested path kind", PathKind::Root, "static|param")
                .failed_on("parse path", render_path(parent_path, ParamStyle::Colon)));
        }

        let mut path = parent_path.to_vec();
        if segment.kind != PathKind::Root {
            path.push(PathSegment {
                name: segment.name.clone(),
                kind: segment.kind,
            });
        }

        let mut endpoints = Vec::new();
        for (method, def) in route.endpoints() {
            let endpoint = self.endpoint(method, def, &path).map_err(|e| {
                e.failed_on(
                    "parse endpoint",
                    format!("{} {}", method, render_path(&path, ParamStyle::Colon)),
                )
            })?;
            endpoints.push(endpoint);
        }

        let own = middleware(route.middleware()).map_err(|e| e.failed("parse middleware"))?;
        let mut accumulated = Vec::with_capacity(parent_middleware.len() + own.len());
        accumulated.extend_from_slice(parent_middleware);
        accumulated.extend(own);

        let children = route
            .children()
            .iter()
            .map(|child| self.traverse(child, &path, &accumulated, depth + 1))
            .collect::<Result<Vec<_>>>()?;

        Ok(PathNode {
            name: segment.name.clone(),
            kind: segment.kind,
            endpoints,
            middleware: accumulated,
            children,
        })
    }

    fn endpoint(&self, method: Method, def: &EndpointDef, path: &[PathSegment]) -> Result<Endpoint> {
        let handler = resolve_identity(&def.handler.identity)
            .map_err(|e| e.failed("parse function identifiers"))?;

        let (request, response) = signature::check(&def.handler).map_err(|e| Error::Signature {
            got: def.handler.signature(),
            source: Box::new(e),
        })?;

        let body = fields::data(request, &self.config)
            .map_err(|e| e.failed_on("parse body", &request.name))?;
        let response_data = fields::data(response, &self.config)
            .map_err(|e| e.failed_on("parse response", &response.name))?;

        let local = middleware(&def.middleware).map_err(|e| e.failed("parse endpoint middleware"))?;

        tracing::trace!(%method, handler = %handler, "endpoint extracted");
        Ok(Endpoint {
            method,
            path: path.to_vec(),
            description: def.description.clone(),
            authorization: def.authorization.clone(),
            body,
            response: response_data,
            handler,
            middleware: local,
        })
    }
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new()
    }
}

fn middleware(fns: &[FnInfo]) -> Result<Vec<HandlerRef>> {
    fns.iter()
        .map(|f| {
            resolve_identity(&f.identity)
                .map_err(|e| e.failed_on("parse middleware function", f.identity.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::ir::{FieldKind, Role};
    use crate::reflect::{Reflect, TypeInfo};

    struct GetUser;
    impl Reflect for GetUser {
        fn type_info() -> TypeInfo {
            TypeInfo::record("GetUser", "github.com/acme/users")
                .field("ID", String::type_info(), r#"as:"id,path" validate:"required""#)
        }
    }

    struct User;
    impl Reflect for User {
        fn type_info() -> TypeInfo {
            TypeInfo::record("User", "github.com/acme/users")
                .field("Name", String::type_info(), r#"json:"name""#)
        }
    }

    fn handler(name: &str) -> FnInfo {
        FnInfo::handler::<GetUser, User>(format!("github.com/acme/users.(*Service).{}", name))
    }

    fn mw(name: &str) -> FnInfo {
        FnInfo::middleware(format!("github.com/acme/mw.{}", name))
    }

    #[test]
    fn test_extract_builds_paths_and_endpoints() {
        let mut root = Route::root();
        root.static_path("users").param("id").get(handler("Get"), "Fetch a user");

        let ir = extract(&root).unwrap();
        let (node, ep) = ir.endpoints().next().unwrap();
        assert_eq!(node.name, "id");
        assert_eq!(ep.url(ParamStyle::Colon), "/users/:id");
        assert_eq!(ep.description, "Fetch a user");
        assert_eq!(ep.body.name, "GetUser");
        assert_eq!(ep.body.import, "github.com/acme/users");
        assert_eq!(ep.body.fields[0].role(), Some(Role::Path));
        assert_eq!(ep.response.fields[0].kind, FieldKind::String);
        assert_eq!(ep.handler.receiver.as_ref().map(|r| r.pointer), Some(true));
    }

    #[test]
    fn test_middleware_accumulates_by_copy() {
        let mut root = Route::root();
        root.use_middleware(mw("Logger"));
        let users = root.static_path("users");
        users.use_middleware(mw("Auth"));
        users.get(handler("List"), "");
        root.static_path("health").get(handler("Health"), "");

        let ir = extract(&root).unwrap();
        let names = |n: &PathNode| n.middleware.iter().map(|m| m.name.clone()).collect::<Vec<_>>();
        assert_eq!(names(&ir), vec!["Logger"]);
        assert_eq!(names(&ir.children[0]), vec!["Logger", "Auth"]);
        assert_eq!(names(&ir.children[1]), vec!["Logger"]);
    }

    #[test]
    fn test_top_node_must_be_root() {
        let mut root = Route::root();
        let users = root.static_path("users").clone();
        let err = extract(&users).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::InputShape);
    }

    #[test]
    fn test_nested_root_is_rejected() {
        let mut root = Route::root();
        root.static_path("v1").push_child("", PathKind::Root);
        let err = extract(&root).unwrap_err();
        assert!(err.to_string().contains("nested path kind"), "{}", err);
    }

    #[test]
    fn test_signature_error_names_endpoint() {
        let mut root = Route::root();
        let bad = FnInfo::new("github.com/acme/users.Broken")
            .input(TypeInfo::context())
            .input(TypeInfo::pointer(GetUser::type_info()))
            .input(TypeInfo::pointer(GetUser::type_info()))
            .output(TypeInfo::pointer(User::type_info()))
            .output(TypeInfo::error());
        root.static_path("users").post(bad, "");

        let err = extract(&root).unwrap_err();
        assert!(err.is_signature_mismatch());
        let msg = err.to_string();
        assert!(msg.starts_with(r#"failed "parse endpoint", on "POST /users""#), "{}", msg);
        assert!(msg.contains(r#"incorrect "parameter number": "3", required: "2""#), "{}", msg);
    }

    #[test]
    fn test_anonymous_middleware_is_rejected() {
        let mut root = Route::root();
        root.use_middleware(FnInfo::middleware("main.func1"));
        let err = extract(&root).unwrap_err();
        assert!(matches!(err.root_cause(), Error::AnonymousHandler(_)));
        assert!(err.to_string().starts_with(r#"failed "parse middleware""#));
    }

    #[test]
    fn test_custom_tag_keys() {
        struct Q;
        impl Reflect for Q {
            fn type_info() -> TypeInfo {
                TypeInfo::record("Q", "github.com/acme/q")
                    .field("Page", u32::type_info(), r#"in:"page,query" rules:"required,min=1""#)
            }
        }
        let mut root = Route::root();
        root.get(FnInfo::handler::<Q, Q>("github.com/acme/q.Search"), "");
        let extractor = Extractor::with_config(ExtractorConfig {
            role_tag: "in".into(),
            name_tag: "json".into(),
            validate_tag: "rules".into(),
        });
        let ir = extractor.extract(&root).unwrap();
        let field = &ir.endpoints[0].body.fields[0];
        assert_eq!(field.role(), Some(Role::Query));
        assert_eq!(field.validation, vec!["required", "min=1"]);
    }
}
