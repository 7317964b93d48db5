//! Registration code generation
//!
//! Renders the IR through a MiniJinja template. The per-endpoint views are
//! shaped by [`Conventions`], so the same IR can target frameworks with
//! different method casing, path-parameter syntax and accessor functions.
//!
//! ```
//! use routespec::ir::{Method, ParamStyle};
//! use routespec::render::{Conventions, MethodCase};
//!
//! let conv = Conventions::fiber();
//! assert_eq!(conv.method_case.apply(Method::Delete), "Delete");
//! assert_eq!(conv.param_style, ParamStyle::Colon);
//! ```

use crate::error::Result;
use crate::ir::{Method, ParamStyle, PathNode, Role};
use crate::symbols::SymbolTable;
use crate::templates::context::RegistrationContext;
use crate::templates::{self, TemplateError, TemplateSource};
use minijinja::Environment;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How HTTP methods are spelled in generated calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MethodCase {
    /// `Get`
    #[default]
    Title,
    /// `GET`
    Upper,
    /// `get`
    Lower,
}

impl MethodCase {
    pub fn apply(&self, method: Method) -> String {
        let upper = method.as_str();
        match self {
            MethodCase::Upper => upper.to_string(),
            MethodCase::Lower => upper.to_ascii_lowercase(),
            MethodCase::Title => {
                let (first, rest) = upper.split_at(1);
                format!("{}{}", first, rest.to_ascii_lowercase())
            }
        }
    }
}

/// Target-framework conventions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Conventions {
    pub method_case: MethodCase,
    pub param_style: ParamStyle,
    /// Accessor reading a request field, per role. Roles without one are
    /// left to body decoding.
    pub request_accessors: BTreeMap<Role, String>,
    /// Accessor writing a response field back, per role
    pub response_accessors: BTreeMap<Role, String>,
    /// Header name used when a response cookie is written
    pub cookie_header: String,
}

impl Conventions {
    /// Go Fiber v2, matching the embedded template
    pub fn fiber() -> Self {
        Self {
            method_case: MethodCase::Title,
            param_style: ParamStyle::Colon,
            request_accessors: BTreeMap::from([
                (Role::Path, "c.Params".to_string()),
                (Role::Query, "c.Query".to_string()),
                (Role::Header, "c.Get".to_string()),
            ]),
            response_accessors: BTreeMap::from([
                (Role::Header, "c.Set".to_string()),
                (Role::Cookie, "c.Set".to_string()),
            ]),
            cookie_header: "set-cookie".to_string(),
        }
    }
}

impl Default for Conventions {
    fn default() -> Self {
        Self::fiber()
    }
}

fn default_package() -> String {
    "apispec".to_string()
}

fn default_validate_import() -> String {
    "github.com/go-playground/validator/v10".to_string()
}

fn default_framework_imports() -> Vec<String> {
    vec!["github.com/gofiber/fiber/v2".to_string()]
}

/// Values the template needs beyond the IR
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct RenderOptions {
    /// Package the generated file belongs to
    #[serde(default = "default_package")]
    pub package: String,
    /// Validation library import
    #[serde(default = "default_validate_import")]
    pub validate_import: String,
    /// Framework imports emitted before the validation import
    #[serde(default = "default_framework_imports")]
    pub framework_imports: Vec<String>,
    #[serde(default)]
    pub conventions: Conventions,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            package: default_package(),
            validate_import: default_validate_import(),
            framework_imports: default_framework_imports(),
            conventions: Conventions::default(),
        }
    }
}

/// Render registration code in one shot
pub fn render(
    ir: &PathNode,
    symbols: &SymbolTable,
    source: &TemplateSource,
    options: &RenderOptions,
) -> Result<String> {
    Renderer::new(source, options.clone())?.render(ir, symbols)
}

/// Reusable renderer; keeps its engine and output buffer between calls
pub struct Renderer {
    env: Environment<'static>,
    template: String,
    options: RenderOptions,
    buffer: Vec<u8>,
}

impl Renderer {
    pub fn new(source: &TemplateSource, options: RenderOptions) -> Result<Self> {
        Ok(Self {
            env: templates::engine_for(source)?,
            template: source.name().to_string(),
            options,
            buffer: Vec::new(),
        })
    }

    pub fn render(&mut self, ir: &PathNode, symbols: &SymbolTable) -> Result<String> {
        let ctx = RegistrationContext::build(ir, symbols, &self.options)?;

        self.buffer.clear();
        templates::render_to(&self.env, &self.template, &ctx, &mut self.buffer)?;
        let text = std::str::from_utf8(&self.buffer)
            .map_err(|e| TemplateError::Render(format!("output is not UTF-8: {}", e)))?;

        for ep in &ctx.endpoints {
            tracing::info!(
                method = %ep.method,
                path = %ep.path,
                handler = %ep.handler_name,
                "endpoint generated"
            );
        }
        Ok(text.to_string())
    }
}
