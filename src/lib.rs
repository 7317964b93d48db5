// Production-quality lints
#![warn(
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
// Deny truly dangerous patterns
#![deny(clippy::mem_forget)]
// Allow common patterns in library code
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc)]

//! # routespec: route trees to registration code and OpenAPI
//!
//! A route tree describes HTTP endpoints: nested path segments, handlers
//! with typed request/response records, middleware and authorization
//! scopes. routespec turns that tree into two artifacts:
//!
//! - **Registration code** wiring each handler into a web framework,
//!   rendered through a swappable template (Go Fiber by default)
//! - **An OpenAPI 3.1 document** describing the same endpoints
//!
//! ## Quick Start
//!
//! ```rust
//! use routespec::reflect::{FnInfo, Reflect, TypeInfo};
//! use routespec::{generate_openapi, OpenApiConfig, Route};
//!
//! struct GetUser;
//! impl Reflect for GetUser {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::record("GetUser", "github.com/acme/api")
//!             .field("ID", String::type_info(), r#"json:"id" as:"id,path""#)
//!     }
//! }
//!
//! struct User;
//! impl Reflect for User {
//!     fn type_info() -> TypeInfo {
//!         TypeInfo::record("User", "github.com/acme/api")
//!             .field("Name", String::type_info(), r#"json:"name" validate:"required""#)
//!     }
//! }
//!
//! let mut root = Route::root();
//! root.static_path("users")
//!     .param("id")
//!     .get(FnInfo::handler::<GetUser, User>("github.com/acme/api.GetUser"), "Fetch one user");
//!
//! let doc = generate_openapi(&root, &OpenApiConfig::default())?;
//! assert!(doc.contains(r#""/users/{id}""#));
//! # Ok::<(), routespec::Error>(())
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Route tree ──► extract ──► IR (PathNode) ──┬──► SymbolTable ──► render ──► registration source
//!                                            └──► openapi ──► OpenAPI JSON
//! ```
//!
//! The IR is serializable, so the `routespec` binary can render dumps
//! produced elsewhere.

// Input and model
pub mod error;
pub mod ir;
pub mod reflect;
pub mod route;

// Pipeline stages
pub mod extract;
pub mod openapi;
pub mod render;
pub mod symbols;
pub mod templates;

// Configuration and entry points
pub mod config;
pub mod generate;

// Re-exports
pub use config::{GenConfig, OpenApiConfig, RegistrationConfig};
pub use error::{Error, ErrorCategory, Result};
pub use extract::{extract, Extractor, ExtractorConfig};
pub use generate::{generate, generate_openapi, generate_registration, Artifacts};
pub use ir::{Data, Endpoint, Field, FieldKind, HandlerRef, Method, PathKind, PathNode, Role};
pub use reflect::{FnIdentity, FnInfo, Reflect, Tags, TypeInfo};
pub use render::{render, Conventions, RenderOptions, Renderer};
pub use route::{EndpointDef, Route};
pub use symbols::{SymbolCollector, SymbolTable};
pub use templates::TemplateSource;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
