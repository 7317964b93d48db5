//! CLI utility helpers

use routespec::config::GenConfig;
use routespec::ir::PathNode;
use routespec::{Error, Result};
use std::io::Read;
use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Install the stderr log subscriber; `RUST_LOG` wins over `-v`
pub fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    // a second install (tests) is harmless
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Read an IR dump from a file, or stdin for `-`
pub fn read_ir(path: &Path) -> Result<PathNode> {
    let json = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path).map_err(Error::Io)?
    };
    PathNode::from_json(&json).map_err(|e| e.failed_on("load ir", path.display().to_string()))
}

/// Explicit config file, else `./routespec.yaml`, else defaults
pub fn load_config(path: Option<&Path>) -> Result<GenConfig> {
    if let Some(path) = path {
        return GenConfig::load(path);
    }
    let cwd = std::env::current_dir()?;
    Ok(GenConfig::load_from_dir(&cwd)?.unwrap_or_default())
}
