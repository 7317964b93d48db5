//! CLI command definitions
//!
//! Every command reads a serialized IR dump (see `PathNode::to_json`):
//! - `render`: registration source through the configured template
//! - `openapi`: OpenAPI 3.1 document
//! - `symbols`: allocated import/receiver tables
//! - `schema`: JSON Schema of `routespec.yaml`

pub mod commands;
pub mod util;

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub use commands::{cmd_openapi, cmd_render, cmd_schema, cmd_symbols};

/// Generate HTTP handler registration code and OpenAPI documents from a route IR
#[derive(Debug, Parser)]
#[command(name = "routespec", version, about, long_about = None)]
pub struct Cli {
    /// Raise log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Render registration code
    Render {
        /// IR dump (JSON); `-` reads stdin
        #[arg(long)]
        ir: PathBuf,

        /// Config file (default: ./routespec.yaml when present)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Template file replacing the embedded one
        #[arg(short, long)]
        template: Option<PathBuf>,

        /// Output file (default: config output, else stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Render the OpenAPI document
    Openapi {
        /// IR dump (JSON); `-` reads stdin
        #[arg(long)]
        ir: PathBuf,

        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Document title (`info.title`)
        #[arg(long)]
        title: Option<String>,

        /// Document version (`info.version`)
        #[arg(long)]
        api_version: Option<String>,

        #[arg(long)]
        server_url: Option<String>,

        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print allocated import and receiver identifiers as JSON
    Symbols {
        #[arg(long)]
        ir: PathBuf,
    },
    /// Print the JSON Schema of routespec.yaml
    Schema,
}

impl Cli {
    pub fn run(self) -> routespec::Result<()> {
        match self.command {
            Commands::Render {
                ir,
                config,
                template,
                output,
            } => cmd_render(&ir, config.as_deref(), template, output),
            Commands::Openapi {
                ir,
                config,
                title,
                api_version,
                server_url,
                output,
            } => cmd_openapi(
                &ir,
                config.as_deref(),
                commands::OpenApiOverrides {
                    title,
                    version: api_version,
                    server_url,
                    output,
                },
            ),
            Commands::Symbols { ir } => cmd_symbols(&ir),
            Commands::Schema => cmd_schema(),
        }
    }
}
