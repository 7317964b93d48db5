//! Template engine for registration code
//!
//! Uses MiniJinja. The reference Go Fiber template is embedded in the
//! binary; a custom template can be supplied as source text and replaces it
//! for one engine instance.
//!
//! Engines run with strict undefined behaviour: a typo in a template is a
//! render error, not silently empty output.

pub mod context;
pub mod filters;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use serde::Serialize;
use std::io::Write;
use std::path::Path;
use std::sync::OnceLock;
use thiserror::Error;

// Embedded templates (compiled into binary)
mod embedded {
    pub const FIBER: &str = include_str!("../../templates/fiber.go.jinja");

    pub fn lookup(name: &str) -> Option<&'static str> {
        match name {
            super::FIBER_TEMPLATE => Some(FIBER),
            _ => None,
        }
    }
}

/// Name of the embedded Go Fiber registration template
pub const FIBER_TEMPLATE: &str = "fiber.go.jinja";

/// Where the registration template comes from
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TemplateSource {
    /// The embedded reference template
    #[default]
    Embedded,
    /// Caller-supplied template text
    Inline { name: String, source: String },
}

impl TemplateSource {
    /// Read a template file; its file name becomes the template name
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let source = std::fs::read_to_string(path)
            .map_err(|e| TemplateError::Io(format!("Failed to read {}: {}", path.display(), e)))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "custom.jinja".to_string());
        Ok(TemplateSource::Inline { name, source })
    }

    /// Template name to look up in the engine
    pub fn name(&self) -> &str {
        match self {
            TemplateSource::Embedded => FIBER_TEMPLATE,
            TemplateSource::Inline { name, .. } => name,
        }
    }
}

/// Template engine singleton
static ENGINE: OnceLock<Environment<'static>> = OnceLock::new();

/// Build an engine that serves embedded templates
fn init_engine() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_undefined_behavior(UndefinedBehavior::Strict);
    env.set_auto_escape_callback(|_| AutoEscape::None);
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.set_keep_trailing_newline(true);

    filters::register_filters(&mut env);

    // Embedded sources are parsed on first use, so a broken one surfaces
    // as a TemplateError instead of a panic here.
    env.set_loader(|name| Ok(embedded::lookup(name).map(str::to_string)));
    env
}

/// Get the global template engine
pub fn engine() -> &'static Environment<'static> {
    ENGINE.get_or_init(init_engine)
}

/// An engine able to render `source`
pub fn engine_for(source: &TemplateSource) -> Result<Environment<'static>, TemplateError> {
    match source {
        TemplateSource::Embedded => Ok(engine().clone()),
        TemplateSource::Inline { name, source } => engine_with_override(name, source.clone()),
    }
}

/// Create an engine where `name` resolves to `source`, shadowing any
/// embedded template of the same name
pub fn engine_with_override(name: &str, source: String) -> Result<Environment<'static>, TemplateError> {
    let mut env = init_engine();
    env.add_template_owned(name.to_string(), source)
        .map_err(|e| TemplateError::Parse(name.to_string(), e.to_string()))?;
    Ok(env)
}

/// Render `name` with `ctx` into `out`
pub fn render_to<W: Write>(
    env: &Environment<'_>,
    name: &str,
    ctx: &impl Serialize,
    out: W,
) -> Result<(), TemplateError> {
    let template = env.get_template(name).map_err(|e| match e.kind() {
        minijinja::ErrorKind::TemplateNotFound => TemplateError::TemplateNotFound(name.to_string()),
        _ => TemplateError::Parse(name.to_string(), e.to_string()),
    })?;
    template
        .render_to_write(ctx, out)
        .map(|_| ())
        .map_err(|e| TemplateError::Render(format!("{:#}", e)))
}

/// Template errors
#[derive(Debug, Clone, Error)]
pub enum TemplateError {
    #[error("Template not found: {0}")]
    TemplateNotFound(String),

    #[error("Template parse error for {0}: {1}")]
    Parse(String, String),

    #[error("Template render error: {0}")]
    Render(String),

    #[error("IO error: {0}")]
    Io(String),
}
