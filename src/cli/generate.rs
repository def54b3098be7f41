use clap::Args;
use std::path::PathBuf;
use tracing::warn;

use crate::api_generator::{GenerateRequest, OutputSelection, generate_client};
use crate::cli::run_command;

const DEFAULT_OUTPUT_DIR: &str = "generated";

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    #[arg(
        short = 'i',
        long = "input",
        value_name = "SPEC",
        help = "OpenAPI 3.x or Swagger 2.0 document (JSON, or YAML by extension)"
    )]
    pub input: PathBuf,
    #[arg(
        short = 'o',
        long = "output",
        value_name = "DIR",
        default_value = DEFAULT_OUTPUT_DIR,
        help = "Directory the Angular client is written into"
    )]
    pub output: PathBuf,
    #[arg(long = "config", value_name = "FILE", help = "Generator configuration (TOML or JSON)")]
    pub config: Option<PathBuf>,
    #[arg(long = "types-only", conflicts_with = "services_only", help = "Only write models/index.ts")]
    pub types_only: bool,
    #[arg(long = "services-only", help = "Only write the services directory")]
    pub services_only: bool,
    #[arg(long = "deny-warnings", help = "Exit with an error when any warning was reported")]
    pub deny_warnings: bool,
}

impl GenerateArgs {
    fn selection(&self) -> OutputSelection {
        if self.types_only {
            OutputSelection::TypesOnly
        } else if self.services_only {
            OutputSelection::ServicesOnly
        } else {
            OutputSelection::All
        }
    }
}

pub fn run(args: GenerateArgs) -> i32 {
    run_command(|| run_inner(&args))
}

fn run_inner(args: &GenerateArgs) -> Result<(), String> {
    let request = GenerateRequest {
        input: args.input.clone(),
        output: args.output.clone(),
        config: args.config.clone(),
        selection: args.selection(),
    };

    let summary = generate_client(&request).map_err(|err| err.to_string())?;

    println!(
        "Generated {} files in {}",
        summary.written.len(),
        args.output.display()
    );

    if !summary.warnings.is_empty() {
        if args.deny_warnings {
            return Err(format!(
                "{} warnings reported and --deny-warnings is set",
                summary.warnings.len()
            ));
        }
        warn!(count = summary.warnings.len(), "Generation finished with warnings.");
    }

    Ok(())
}
