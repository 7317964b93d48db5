//! OpenAPI 3.1 document generation
//!
//! A structural conversion of the IR: one path item per node with
//! endpoints, one operation per endpoint. Maps lose their key type and
//! become plain objects.

pub mod types;

pub use types::*;

use crate::error::Result;
use crate::ir::{render_path, Data, Endpoint, Field, FieldKind, Method, ParamStyle, PathNode, PathSegment, Role};
use std::collections::BTreeMap;

pub const DEFAULT_TITLE: &str = "API Specification";
pub const DEFAULT_VERSION: &str = "1.0.0";
const SUCCESS_STATUS: &str = "200";
const SUCCESS_DESCRIPTION: &str = "Successful response";

/// Render the document as 2-space-indented JSON with a trailing newline
pub fn generate(ir: &PathNode, title: &str, version: &str, server_url: &str) -> Result<String> {
    let doc = document(ir, title, version, server_url);
    let mut json = serde_json::to_string_pretty(&doc)?;
    json.push('\n');
    tracing::debug!(paths = doc.paths.len(), "openapi document generated");
    Ok(json)
}

/// Build the document; blank title/version fall back to defaults
pub fn document(ir: &PathNode, title: &str, version: &str, server_url: &str) -> OpenApi {
    let mut paths = BTreeMap::new();
    collect_paths(ir, &mut Vec::new(), &mut paths);

    let servers = if server_url.trim().is_empty() {
        Vec::new()
    } else {
        vec![Server {
            url: server_url.to_string(),
        }]
    };

    OpenApi {
        openapi: OPENAPI_VERSION.to_string(),
        info: Info {
            title: or_default(title, DEFAULT_TITLE),
            version: or_default(version, DEFAULT_VERSION),
        },
        servers,
        paths,
    }
}

fn or_default(value: &str, default: &str) -> String {
    if value.trim().is_empty() {
        default.to_string()
    } else {
        value.to_string()
    }
}

fn collect_paths(
    node: &PathNode,
    trail: &mut Vec<PathSegment>,
    paths: &mut BTreeMap<String, PathItem>,
) {
    trail.push(PathSegment {
        name: node.name.clone(),
        kind: node.kind,
    });

    if !node.endpoints.is_empty() {
        let item = paths
            .entry(render_path(trail, ParamStyle::Braces))
            .or_default();
        for ep in &node.endpoints {
            let slot = match ep.method {
                Method::Get => &mut item.get,
                Method::Post => &mut item.post,
                Method::Put => &mut item.put,
                Method::Patch => &mut item.patch,
                Method::Delete => &mut item.delete,
            };
            *slot = Some(operation(ep));
        }
    }

    for child in &node.children {
        collect_paths(child, trail, paths);
    }
    trail.pop();
}

fn operation(ep: &Endpoint) -> Operation {
    let parameters = ep
        .body
        .fields
        .iter()
        .filter_map(|field| {
            let (location, required) = match field.role()? {
                Role::Path => ("path", true),
                Role::Query => ("query", field.is_required()),
                _ => return None,
            };
            Some(Parameter {
                name: field.wire_name().to_string(),
                location: location.to_string(),
                required,
                schema: field_schema(field),
            })
        })
        .collect();

    let request_body = if ep.is_get() {
        None
    } else {
        let schema = data_schema(&ep.body, |f| {
            !matches!(f.role(), Some(Role::Path) | Some(Role::Query))
        });
        (!schema.properties.is_empty()).then(|| RequestBody {
            required: true,
            content: json_content(schema),
        })
    };

    let response = Response {
        description: SUCCESS_DESCRIPTION.to_string(),
        content: json_content(data_schema(&ep.response, |_| true)),
    };

    Operation {
        summary: ep.handler.name.clone(),
        operation_id: ep.handler.name.clone(),
        description: ep.description.clone(),
        parameters,
        request_body,
        responses: BTreeMap::from([(SUCCESS_STATUS.to_string(), response)]),
    }
}

fn json_content(schema: Schema) -> BTreeMap<String, MediaType> {
    BTreeMap::from([(JSON_MEDIA_TYPE.to_string(), MediaType { schema })])
}

/// Object schema of the fields `keep` accepts
fn data_schema(data: &Data, keep: impl Fn(&Field) -> bool) -> Schema {
    object_schema(data.fields.iter().filter(|f| keep(f)))
}

fn object_schema<'a>(fields: impl Iterator<Item = &'a Field>) -> Schema {
    let mut schema = Schema::of_type("object");
    for field in fields {
        let name = field.wire_name().to_string();
        if field.is_required() {
            schema.required.push(name.clone());
        }
        schema.properties.insert(name, field_schema(field));
    }
    schema
}

/// Schema of one field
pub fn field_schema(field: &Field) -> Schema {
    match field.kind {
        FieldKind::String => Schema::of_type("string"),
        FieldKind::Integer(_) => Schema::of_type("integer"),
        FieldKind::Bool => Schema::of_type("boolean"),
        FieldKind::Array => Schema {
            items: Some(Box::new(
                field
                    .subfields
                    .first()
                    .map(field_schema)
                    .unwrap_or_else(|| Schema::of_type("string")),
            )),
            ..Schema::of_type("array")
        },
        FieldKind::Record => object_schema(field.subfields.iter()),
        // key typing is not expressible, values are dropped with it
        FieldKind::Map => Schema::of_type("object"),
    }
}
