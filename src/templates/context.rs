//! Template context structures
//!
//! Flattens the IR and symbol table into plain serializable views, so
//! templates only do iteration and string placement.

use crate::error::Result;
use crate::ir::{Data, Endpoint, PathNode, Role};
use crate::render::{Conventions, RenderOptions};
use crate::symbols::SymbolTable;
use serde::Serialize;
use std::collections::BTreeMap;

/// Context for registration template rendering
#[derive(Debug, Clone, Serialize)]
pub struct RegistrationContext {
    /// Package of the generated file
    pub package: String,
    /// Validation library import path
    pub validate_import: String,
    /// Unaliased imports the registration function itself needs
    pub setup_imports: Vec<String>,
    /// Aliased imports, sorted by path
    pub imports: Vec<ImportView>,
    /// Receiver parameters, sorted by (import, name, pointer)
    pub receivers: Vec<ReceiverView>,
    /// Endpoints in tree order
    pub endpoints: Vec<EndpointView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImportView {
    pub ident: String,
    pub import: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReceiverView {
    pub ident: String,
    pub import: String,
    /// Alias of the package declaring the receiver type
    pub import_ident: String,
    pub name: String,
    pub pointer: bool,
}

/// View of one endpoint
#[derive(Debug, Clone, Serialize)]
pub struct EndpointView {
    /// Canonical method, e.g. `GET`
    pub method: String,
    /// Method in the framework's casing
    pub method_ident: String,
    pub path: String,
    pub is_get: bool,
    pub description: String,
    pub authorization: Vec<String>,
    /// Path-level then endpoint-level middleware, as `alias.Name`
    pub middleware: Vec<String>,
    pub handler_ident: String,
    pub handler_name: String,
    /// `alias.Type` of the request record
    pub body_type: String,
    pub response_type: String,
    pub request_params: Vec<ParamView>,
    pub response_params: Vec<ParamView>,
}

/// One field moved between the record and the wire
#[derive(Debug, Clone, Serialize)]
pub struct ParamView {
    pub name: String,
    pub wire_name: String,
    pub role: Role,
    pub accessor: String,
}

impl RegistrationContext {
    pub fn build(root: &PathNode, symbols: &SymbolTable, options: &RenderOptions) -> Result<Self> {
        let imports = symbols
            .imports()
            .map(|(import, ident)| ImportView {
                ident: ident.to_string(),
                import: import.to_string(),
            })
            .collect();

        let receivers = symbols
            .receivers()
            .map(|(key, ident)| {
                Ok(ReceiverView {
                    ident: ident.to_string(),
                    import: key.import.clone(),
                    import_ident: symbols.import_ident(&key.import)?.to_string(),
                    name: key.name.clone(),
                    pointer: key.pointer,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let endpoints = root
            .endpoints()
            .map(|(node, ep)| EndpointView::build(node, ep, symbols, &options.conventions))
            .collect::<Result<Vec<_>>>()?;

        let mut setup_imports = options.framework_imports.clone();
        setup_imports.push(options.validate_import.clone());

        Ok(Self {
            package: options.package.clone(),
            validate_import: options.validate_import.clone(),
            setup_imports,
            imports,
            receivers,
            endpoints,
        })
    }
}

impl EndpointView {
    fn build(
        node: &PathNode,
        ep: &Endpoint,
        symbols: &SymbolTable,
        conv: &Conventions,
    ) -> Result<Self> {
        let middleware = node
            .middleware
            .iter()
            .chain(&ep.middleware)
            .map(|mw| Ok(format!("{}.{}", symbols.handler_ident(mw)?, mw.name)))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            method: ep.method.to_string(),
            method_ident: conv.method_case.apply(ep.method),
            path: ep.url(conv.param_style),
            is_get: ep.is_get(),
            description: ep.description.clone(),
            authorization: ep.authorization.clone(),
            middleware,
            handler_ident: symbols.handler_ident(&ep.handler)?.to_string(),
            handler_name: ep.handler.name.clone(),
            body_type: type_ref(&ep.body, symbols)?,
            response_type: type_ref(&ep.response, symbols)?,
            request_params: params(&ep.body, &conv.request_accessors, None),
            response_params: params(
                &ep.response,
                &conv.response_accessors,
                Some(&conv.cookie_header),
            ),
        })
    }
}

/// `alias.Name`, or the bare name for built-ins
fn type_ref(data: &Data, symbols: &SymbolTable) -> Result<String> {
    if data.import.is_empty() {
        return Ok(data.name.clone());
    }
    Ok(format!("{}.{}", symbols.import_ident(&data.import)?, data.name))
}

fn params(
    data: &Data,
    accessors: &BTreeMap<Role, String>,
    cookie_header: Option<&String>,
) -> Vec<ParamView> {
    data.fields
        .iter()
        .filter_map(|field| {
            let ser = field.serialization.as_ref()?;
            let accessor = accessors.get(&ser.role)?;
            let wire_name = match (ser.role, cookie_header) {
                (Role::Cookie, Some(header)) => header.clone(),
                _ => ser.name.clone(),
            };
            Some(ParamView {
                name: field.name.clone(),
                wire_name,
                role: ser.role,
                accessor: accessor.clone(),
            })
        })
        .collect()
}
