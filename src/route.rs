//! Input route tree
//!
//! A minimal fluent builder for the tree the extractor consumes.
//!
//! ```
//! use routespec::reflect::{FnInfo, Reflect, TypeInfo};
//! use routespec::route::Route;
//!
//! struct Empty;
//! impl Reflect for Empty {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::record("Empty", "github.com/acme/api")
//!     }
//! }
//!
//! let mut root = Route::root();
//! root.use_middleware(FnInfo::middleware("github.com/acme/mw.Logger"));
//! root.static_path("users")
//!     .param("id")
//!     .get(FnInfo::handler::<Empty, Empty>("github.com/acme/api.GetUser"), "Fetch one user")
//!     .authz(["users:read"]);
//! assert_eq!(root.children().len(), 1);
//! ```

use crate::ir::{Method, PathKind};
use crate::reflect::FnInfo;
use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

/// One vertex segment of the input tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub kind: PathKind,
}

/// Handler bound to one method on a route
#[derive(Debug, Clone)]
pub struct EndpointDef {
    pub handler: FnInfo,
    pub description: String,
    pub authorization: Vec<String>,
    pub middleware: Vec<FnInfo>,
}

impl EndpointDef {
    pub fn new(handler: FnInfo, description: impl Into<String>) -> Self {
        Self {
            handler,
            description: description.into(),
            authorization: Vec::new(),
            middleware: Vec::new(),
        }
    }

    /// Attach authorization scopes
    pub fn authz<I, S>(&mut self, scopes: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.authorization.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Endpoint-local middleware, run after the route's own chain
    pub fn middleware<I>(&mut self, fns: I) -> &mut Self
    where
        I: IntoIterator<Item = FnInfo>,
    {
        self.middleware.extend(fns);
        self
    }
}

/// A node of the input tree
#[derive(Debug, Clone)]
pub struct Route {
    segment: Segment,
    endpoints: BTreeMap<Method, EndpointDef>,
    middleware: Vec<FnInfo>,
    children: Vec<Route>,
}

impl Route {
    pub fn root() -> Self {
        Self::with_segment(String::new(), PathKind::Root)
    }

    fn with_segment(name: String, kind: PathKind) -> Self {
        Self {
            segment: Segment { name, kind },
            endpoints: BTreeMap::new(),
            middleware: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Append a literal child segment and return it
    pub fn static_path(&mut self, name: impl Into<String>) -> &mut Route {
        self.child(name.into(), PathKind::Static)
    }

    /// Append a path-variable child segment and return it
    pub fn param(&mut self, name: impl Into<String>) -> &mut Route {
        self.child(name.into(), PathKind::Param)
    }

    fn child(&mut self, name: String, kind: PathKind) -> &mut Route {
        let idx = self.children.len();
        self.children.push(Route::with_segment(name, kind));
        &mut self.children[idx]
    }

    /// Bind `handler` to `method`, replacing any earlier binding
    pub fn handle(
        &mut self,
        method: Method,
        handler: FnInfo,
        description: impl Into<String>,
    ) -> &mut EndpointDef {
        let def = EndpointDef::new(handler, description);
        match self.endpoints.entry(method) {
            Entry::Occupied(mut slot) => {
                slot.insert(def);
                slot.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(def),
        }
    }

    pub fn get(&mut self, handler: FnInfo, description: impl Into<String>) -> &mut EndpointDef {
        self.handle(Method::Get, handler, description)
    }

    pub fn post(&mut self, handler: FnInfo, description: impl Into<String>) -> &mut EndpointDef {
        self.handle(Method::Post, handler, description)
    }

    pub fn put(&mut self, handler: FnInfo, description: impl Into<String>) -> &mut EndpointDef {
        self.handle(Method::Put, handler, description)
    }

    pub fn patch(&mut self, handler: FnInfo, description: impl Into<String>) -> &mut EndpointDef {
        self.handle(Method::Patch, handler, description)
    }

    pub fn delete(&mut self, handler: FnInfo, description: impl Into<String>) -> &mut EndpointDef {
        self.handle(Method::Delete, handler, description)
    }

    /// Append node-level middleware, inherited by every descendant
    pub fn use_middleware(&mut self, mw: FnInfo) -> &mut Route {
        self.middleware.push(mw);
        self
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    /// Endpoints in method order
    pub fn endpoints(&self) -> impl Iterator<Item = (Method, &EndpointDef)> {
        self.endpoints.iter().map(|(m, e)| (*m, e))
    }

    pub fn middleware(&self) -> &[FnInfo] {
        &self.middleware
    }

    pub fn children(&self) -> &[Route] {
        &self.children
    }

    /// Escape hatch for building trees the builder cannot, e.g. a nested root
    pub fn push_child(&mut self, name: impl Into<String>, kind: PathKind) -> &mut Route {
        self.child(name.into(), kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mw(name: &str) -> FnInfo {
        FnInfo::middleware(format!("github.com/acme/mw.{}", name))
    }

    #[test]
    fn test_endpoints_are_method_ordered() {
        let mut root = Route::root();
        root.delete(mw("D"), "");
        root.get(mw("G"), "");
        root.post(mw("P"), "");
        let methods: Vec<Method> = root.endpoints().map(|(m, _)| m).collect();
        assert_eq!(methods, vec![Method::Get, Method::Post, Method::Delete]);
    }

    #[test]
    fn test_same_method_replaces() {
        let mut root = Route::root();
        root.get(mw("First"), "first").authz(["a"]);
        root.get(mw("Second"), "second");
        let (_, def) = root.endpoints().next().unwrap();
        assert_eq!(def.description, "second");
        assert!(def.authorization.is_empty());
        assert_eq!(root.endpoints().count(), 1);
    }

    #[test]
    fn test_children_keep_insertion_order() {
        let mut root = Route::root();
        root.static_path("b");
        root.static_path("a");
        root.param("id");
        let names: Vec<&str> = root
            .children()
            .iter()
            .map(|c| c.segment().name.as_str())
            .collect();
        assert_eq!(names, vec!["b", "a", "id"]);
        assert_eq!(root.children()[2].segment().kind, PathKind::Param);
    }

    #[test]
    fn test_endpoint_options() {
        let mut root = Route::root();
        root.static_path("orders")
            .post(mw("Create"), "Create an order")
            .authz(["orders:write", "admin"])
            .middleware([mw("RateLimit")]);
        let orders = &root.children()[0];
        let (method, def) = orders.endpoints().next().unwrap();
        assert_eq!(method, Method::Post);
        assert_eq!(def.authorization, vec!["orders:write", "admin"]);
        assert_eq!(def.middleware.len(), 1);
    }
}
