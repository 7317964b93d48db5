//! OpenAPI document generation over the user service

mod common;

use common::*;
use pretty_assertions::assert_eq;
use routespec::{generate_openapi, OpenApiConfig};
use serde_json::{json, Value};

fn document() -> Value {
    let config = OpenApiConfig {
        title: "Complex User API".into(),
        version: "2.0.0".into(),
        server_url: "https://api.example.com".into(),
        ..OpenApiConfig::default()
    };
    let text = generate_openapi(&user_routes(), &config).unwrap();
    assert!(text.ends_with("}\n"));
    serde_json::from_str(&text).unwrap()
}

#[test]
fn test_info_and_servers() {
    let doc = document();
    assert_eq!(doc["openapi"], "3.1.0");
    assert_eq!(doc["info"], json!({"title": "Complex User API", "version": "2.0.0"}));
    assert_eq!(doc["servers"], json!([{"url": "https://api.example.com"}]));
}

#[test]
fn test_paths_only_for_nodes_with_endpoints() {
    let doc = document();
    let paths: Vec<&String> = doc["paths"].as_object().unwrap().keys().collect();
    assert_eq!(paths, vec!["/", "/login", "/users/{id}"]);
}

#[test]
fn test_list_users_query_parameters() {
    let doc = document();
    let get = &doc["paths"]["/"]["get"];
    assert_eq!(get["operationId"], "ListUsers");
    assert_eq!(get["summary"], "ListUsers");
    assert_eq!(
        get["parameters"],
        json!([
            {"name": "limit", "in": "query", "schema": {"type": "integer"}},
            {"name": "offset", "in": "query", "schema": {"type": "integer"}},
        ])
    );
    assert!(get.get("requestBody").is_none());

    let schema = &get["responses"]["200"]["content"]["application/json"]["schema"];
    assert_eq!(schema["type"], "object");
    assert_eq!(schema["properties"]["users"]["type"], "array");
    assert_eq!(schema["properties"]["users"]["items"]["type"], "object");
    assert_eq!(
        schema["properties"]["users"]["items"]["properties"]["roles"],
        json!({"type": "object"})
    );
}

#[test]
fn test_create_user_request_body() {
    let doc = document();
    let post = &doc["paths"]["/"]["post"];
    assert_eq!(post["description"], "Create a user");
    assert!(post.get("parameters").is_none());

    let body = &post["requestBody"];
    assert_eq!(body["required"], true);
    let schema = &body["content"]["application/json"]["schema"];
    assert_eq!(schema["required"], json!(["name", "email"]));
    assert_eq!(
        schema["properties"]["address"],
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string"},
                "street": {"type": "string"},
            }
        })
    );
}

#[test]
fn test_update_user_path_parameter_and_body() {
    let doc = document();
    let put = &doc["paths"]["/users/{id}"]["put"];
    assert_eq!(
        put["parameters"],
        json!([{"name": "id", "in": "path", "required": true, "schema": {"type": "string"}}])
    );
    let props = put["requestBody"]["content"]["application/json"]["schema"]["properties"]
        .as_object()
        .unwrap();
    let names: Vec<&String> = props.keys().collect();
    assert_eq!(names, vec!["address", "name"]);
}

#[test]
fn test_delete_has_no_request_body() {
    let doc = document();
    let delete = &doc["paths"]["/users/{id}"]["delete"];
    // the only request field is the path parameter
    assert!(delete.get("requestBody").is_none());
    assert_eq!(
        delete["responses"]["200"],
        json!({
            "description": "Successful response",
            "content": {"application/json": {"schema": {"type": "object"}}}
        })
    );
}

#[test]
fn test_response_keeps_header_and_cookie_fields() {
    let doc = document();
    let schema = &doc["paths"]["/login"]["post"]["responses"]["200"]["content"]["application/json"]["schema"];
    let names: Vec<&String> = schema["properties"].as_object().unwrap().keys().collect();
    assert_eq!(names, vec!["name", "session", "x-trace"]);
}

#[test]
fn test_defaults_without_server() {
    let text = generate_openapi(&user_routes(), &OpenApiConfig::default()).unwrap();
    let doc: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(doc["info"]["title"], "API Specification");
    assert_eq!(doc["info"]["version"], "1.0.0");
    assert!(doc.get("servers").is_none());
}
