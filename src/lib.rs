#![forbid(unsafe_code)]
#![deny(unused_must_use)]
#![deny(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro
)]

//! Angular / TypeScript client generator for OpenAPI 3.x and Swagger 2.0 documents.
//!
//! The library entry point is [`generate`], which renders a parsed
//! [`OpenApiSpec`] into an in-memory set of files. [`generate_client`] adds
//! the filesystem around it, and [`run_cli`] is the `ngen` command line.

use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod api_generator;
mod cli;
pub mod openapi;

pub use api_generator::{GenerateRequest, GenerateSummary, OutputSelection, generate_client, write_client};
pub use openapi::{
    GenerateError, GeneratedClient, GeneratedFile, GeneratorConfig, OpenApiSpec, ResponseKind, Warning,
    generate,
};

#[derive(Parser)]
#[command(
    name = "ngen",
    version,
    about = "Generate Angular services and models from OpenAPI documents"
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the Angular client for an API description
    Generate(cli::generate::GenerateArgs),
}

/// Parse `args` (program name first) and run the selected command.
/// Returns the process exit code.
pub fn run_cli(args: Vec<String>) -> i32 {
    match Cli::try_parse_from(args) {
        Ok(cli) => match cli.command {
            Some(Commands::Generate(args)) => cli::generate::run(args),
            None => {
                let mut cmd = Cli::command();
                let _ = cmd.print_help();
                println!();
                0
            }
        },
        Err(e) => {
            let code = e.exit_code();
            let _ = e.print();
            code
        }
    }
}

/// Install the stderr subscriber.
///
/// `NGEN_LOG` controls the filter: "trace", "debug", "info", "warn", "error"
/// (scoped to this crate) or a full filter spec like "openapi_ngen=debug".
pub fn init_tracing() {
    let crate_root = module_path!().to_string();

    let filter = match std::env::var("NGEN_LOG") {
        Ok(level) if is_plain_level(&level) => {
            format!("{crate_root}={level}")
        }
        Ok(spec) => spec,
        Err(_) => format!("{crate_root}=info"),
    };

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
