//! Filesystem bracket around the generator: load the API description and
//! configuration, generate the client, write the files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::openapi::ir::{MODELS_INDEX, SERVICES_DIR};
use crate::openapi::{GenerateError, GeneratedClient, GeneratedFile, GeneratorConfig, OpenApiSpec, Warning, generate};

/// Which part of the generated client is written to disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputSelection {
    /// Models and services.
    #[default]
    All,
    /// Only `models/index.ts`.
    TypesOnly,
    /// Only the `services/` directory.
    ServicesOnly,
}

impl OutputSelection {
    fn includes(self, file: &GeneratedFile) -> bool {
        match self {
            Self::All => true,
            Self::TypesOnly => file.path == Path::new(MODELS_INDEX),
            Self::ServicesOnly => file.path.starts_with(SERVICES_DIR),
        }
    }
}

/// Inputs of one generation run against the filesystem.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    /// API description file (JSON, or YAML by extension).
    pub input: PathBuf,
    /// Directory the client is written into.
    pub output: PathBuf,
    /// Optional TOML/JSON configuration file.
    pub config: Option<PathBuf>,
    /// Part of the client to write.
    pub selection: OutputSelection,
}

/// Result of a completed run.
#[derive(Debug, Clone)]
pub struct GenerateSummary {
    /// Paths of the written files below the output directory, in write order.
    pub written: Vec<PathBuf>,
    /// Recoverable issues reported while generating.
    pub warnings: Vec<Warning>,
}

/// Load, generate and write the client described by `request`.
pub fn generate_client(request: &GenerateRequest) -> Result<GenerateSummary, GenerateError> {
    let config = match &request.config {
        Some(path) => {
            debug!(config = %path.display(), "Loading generator configuration.");
            GeneratorConfig::load(path)?
        }
        None => GeneratorConfig::default(),
    };

    debug!(input = %request.input.display(), "Loading API description.");
    let spec = OpenApiSpec::load(&request.input)?;

    let client = generate(&spec, &config)?;
    let written = write_client(&client, &request.output, request.selection)?;

    info!(
        output = %request.output.display(),
        files = written.len(),
        warnings = client.warnings.len(),
        "Angular client generated."
    );

    Ok(GenerateSummary {
        written,
        warnings: client.warnings,
    })
}

/// Write the selected files of a generated client below `out_dir`.
pub fn write_client(
    client: &GeneratedClient,
    out_dir: &Path,
    selection: OutputSelection,
) -> Result<Vec<PathBuf>, GenerateError> {
    let mut written = Vec::new();

    for file in client.files.iter().filter(|file| selection.includes(file)) {
        let path = out_dir.join(&file.path);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| GenerateError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        fs::write(&path, &file.contents).map_err(|source| GenerateError::Write {
            path: path.clone(),
            source,
        })?;

        debug!(
            path = %path.display(),
            bytes = file.contents.len(),
            "Wrote generated file."
        );
        written.push(path);
    }

    Ok(written)
}
