//! routespec configuration
//!
//! Handles loading of `routespec.yaml`:
//!
//! ```yaml
//! version: 1
//! registration:
//!   output: gen/register.go
//!   package: api
//!   conventions:
//!     method_case: title
//! openapi:
//!   output: gen/openapi.json
//!   title: Users API
//!   version: 2.0.0
//!   server_url: https://api.example.com
//! ```

use crate::error::{Error, Result};
use crate::openapi::{DEFAULT_TITLE, DEFAULT_VERSION};
use crate::render::RenderOptions;
use crate::templates::TemplateSource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Conventional config file name
pub const CONFIG_FILE: &str = "routespec.yaml";

/// Supported config schema version
pub const CONFIG_VERSION: u32 = 1;

/// Root configuration (`routespec.yaml`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenConfig {
    /// Schema version for migrations
    #[serde(default = "default_version")]
    pub version: u32,

    /// Registration code output
    #[serde(default)]
    pub registration: RegistrationConfig,

    /// OpenAPI document output
    #[serde(default)]
    pub openapi: OpenApiConfig,
}

fn default_version() -> u32 {
    CONFIG_VERSION
}

fn default_true() -> bool {
    true
}

impl Default for GenConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            registration: RegistrationConfig::default(),
            openapi: OpenApiConfig::default(),
        }
    }
}

/// Registration code settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegistrationConfig {
    /// Generate this artifact
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output file; stdout when absent
    #[serde(default)]
    pub output: Option<PathBuf>,

    /// Custom template file replacing the embedded Go Fiber one
    #[serde(default)]
    pub template: Option<PathBuf>,

    #[serde(flatten)]
    pub render: RenderOptions,
}

impl Default for RegistrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: None,
            template: None,
            render: RenderOptions::default(),
        }
    }
}

impl RegistrationConfig {
    /// Resolve the configured template
    pub fn template_source(&self) -> Result<TemplateSource> {
        match &self.template {
            Some(path) => Ok(TemplateSource::from_file(path)?),
            None => Ok(TemplateSource::Embedded),
        }
    }
}

/// OpenAPI document settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct OpenApiConfig {
    /// Generate this artifact
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Output file; stdout when absent
    #[serde(default)]
    pub output: Option<PathBuf>,

    #[serde(default = "default_title")]
    pub title: String,

    /// API version reported in `info.version`
    #[serde(default = "default_api_version")]
    pub version: String,

    /// Single server entry; omitted when empty
    #[serde(default)]
    pub server_url: String,
}

fn default_title() -> String {
    DEFAULT_TITLE.to_string()
}

fn default_api_version() -> String {
    DEFAULT_VERSION.to_string()
}

impl Default for OpenApiConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            output: None,
            title: default_title(),
            version: default_api_version(),
            server_url: String::new(),
        }
    }
}

impl GenConfig {
    /// Parse and validate YAML text
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: GenConfig = serde_norway::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(Error::Io)?;
        Self::from_yaml(&content).map_err(|e| e.failed_on("load config", path.display().to_string()))
    }

    /// Load `routespec.yaml` from a directory, if present
    pub fn load_from_dir(dir: &Path) -> Result<Option<Self>> {
        let config_file = dir.join(CONFIG_FILE);
        if !config_file.exists() {
            return Ok(None);
        }
        Self::load(&config_file).map(Some)
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(Error::Config(format!(
                "Unsupported {} version: {}",
                CONFIG_FILE, self.version
            )));
        }
        Ok(())
    }

    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_norway::to_string(self)?)
    }

    /// JSON Schema of the config file
    pub fn json_schema() -> Result<String> {
        let schema = schemars::schema_for!(GenConfig);
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}
