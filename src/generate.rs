//! Pipeline entry points: extract → allocate → render
//!
//! ```no_run
//! use routespec::config::GenConfig;
//! use routespec::route::Route;
//!
//! let routes = Route::root();
//! let config = GenConfig::load(std::path::Path::new("routespec.yaml"))?;
//! routespec::generate(&routes, &config)?.write(&config)?;
//! # Ok::<(), routespec::Error>(())
//! ```

use crate::config::{GenConfig, OpenApiConfig, RegistrationConfig};
use crate::error::Result;
use crate::extract::extract;
use crate::ir::PathNode;
use crate::openapi;
use crate::render::Renderer;
use crate::route::Route;
use crate::symbols::SymbolTable;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Registration source for `routes`
pub fn generate_registration(routes: &Route, config: &RegistrationConfig) -> Result<String> {
    let ir = extract(routes)?;
    registration_from_ir(&ir, config)
}

/// OpenAPI document for `routes`
pub fn generate_openapi(routes: &Route, config: &OpenApiConfig) -> Result<String> {
    let ir = extract(routes)?;
    openapi_from_ir(&ir, config)
}

/// Registration source for an already extracted IR
pub fn registration_from_ir(ir: &PathNode, config: &RegistrationConfig) -> Result<String> {
    let symbols = SymbolTable::allocate(ir);
    let source = config.template_source()?;
    Renderer::new(&source, config.render.clone())?.render(ir, &symbols)
}

/// OpenAPI document for an already extracted IR
pub fn openapi_from_ir(ir: &PathNode, config: &OpenApiConfig) -> Result<String> {
    openapi::generate(ir, &config.title, &config.version, &config.server_url)
}

/// Every enabled artifact, fully rendered
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Artifacts {
    pub registration: Option<String>,
    pub openapi: Option<String>,
}

/// Extract once and render every enabled artifact
pub fn generate(routes: &Route, config: &GenConfig) -> Result<Artifacts> {
    let ir = extract(routes)?;
    generate_from_ir(&ir, config)
}

pub fn generate_from_ir(ir: &PathNode, config: &GenConfig) -> Result<Artifacts> {
    let registration = if config.registration.enabled {
        Some(registration_from_ir(ir, &config.registration)?)
    } else {
        None
    };
    let openapi = if config.openapi.enabled {
        Some(openapi_from_ir(ir, &config.openapi)?)
    } else {
        None
    };
    Ok(Artifacts {
        registration,
        openapi,
    })
}

impl Artifacts {
    /// Write each artifact to its configured path, or stdout when it has none.
    ///
    /// Files are staged beside their targets and only renamed into place once
    /// every staged write has succeeded.
    pub fn write(&self, config: &GenConfig) -> Result<()> {
        let outputs = [
            (config.registration.output.as_deref(), self.registration.as_deref()),
            (config.openapi.output.as_deref(), self.openapi.as_deref()),
        ];

        let mut staged = Vec::new();
        for (path, text) in outputs {
            if let (Some(p), Some(t)) = (path, text) {
                staged.push((stage(p, t)?, p, t.len()));
            }
        }
        for (file, path, bytes) in staged {
            commit(file, path, bytes)?;
        }

        for (path, text) in outputs {
            if let (None, Some(t)) = (path, text) {
                write_output(None, t)?;
            }
        }
        Ok(())
    }
}

/// Write to a file (creating parent directories) or stdout
pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(p) => commit(stage(p, content)?, p, content.len()),
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(content.as_bytes())?;
            stdout.flush()?;
            Ok(())
        }
    }
}

/// Temp file in the target's directory holding `content`; removed on drop
fn stage(path: &Path, content: &str) -> Result<NamedTempFile> {
    let dir = match path.parent().filter(|d| !d.as_os_str().is_empty()) {
        Some(parent) => {
            std::fs::create_dir_all(parent)?;
            parent
        }
        None => Path::new("."),
    };
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.flush()?;
    Ok(file)
}

fn commit(file: NamedTempFile, path: &Path, bytes: usize) -> Result<()> {
    file.persist(path).map_err(|e| e.error)?;
    tracing::info!(path = %path.display(), bytes, "wrote artifact");
    Ok(())
}
