//! CLI command implementations

use super::util::{load_config, read_ir};
use routespec::config::GenConfig;
use routespec::generate::{openapi_from_ir, registration_from_ir, write_output};
use routespec::symbols::SymbolTable;
use routespec::Result;
use std::path::{Path, PathBuf};

pub fn cmd_render(
    ir: &Path,
    config: Option<&Path>,
    template: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<()> {
    let ir = read_ir(ir)?;
    let mut registration = load_config(config)?.registration;
    if template.is_some() {
        registration.template = template;
    }
    if output.is_some() {
        registration.output = output;
    }

    let source = registration_from_ir(&ir, &registration)?;
    write_output(registration.output.as_deref(), &source)
}

/// Command-line values that win over the config file
#[derive(Debug, Default)]
pub struct OpenApiOverrides {
    pub title: Option<String>,
    pub version: Option<String>,
    pub server_url: Option<String>,
    pub output: Option<PathBuf>,
}

pub fn cmd_openapi(ir: &Path, config: Option<&Path>, overrides: OpenApiOverrides) -> Result<()> {
    let ir = read_ir(ir)?;
    let mut openapi = load_config(config)?.openapi;
    if let Some(title) = overrides.title {
        openapi.title = title;
    }
    if let Some(version) = overrides.version {
        openapi.version = version;
    }
    if let Some(url) = overrides.server_url {
        openapi.server_url = url;
    }
    if overrides.output.is_some() {
        openapi.output = overrides.output;
    }

    let doc = openapi_from_ir(&ir, &openapi)?;
    write_output(openapi.output.as_deref(), &doc)
}

pub fn cmd_symbols(ir: &Path) -> Result<()> {
    let ir = read_ir(ir)?;
    let symbols = SymbolTable::allocate(&ir);
    let mut json = serde_json::to_string_pretty(&symbols.dump())?;
    json.push('\n');
    write_output(None, &json)
}

pub fn cmd_schema() -> Result<()> {
    let mut schema = GenConfig::json_schema()?;
    schema.push('\n');
    write_output(None, &schema)
}
