//! Angular client emitter for OpenAPI documents.
//!
//! This module is a thin wrapper around the IR-based code generation.
//! The pipeline is:
//! 1. Parse: JSON/YAML -> OpenApiSpec (done by the caller)
//! 2. Normalize: OpenApiSpec -> ApiIR (all OpenAPI logic resolved)
//! 3. Codegen: ApiIR -> TsModule per file (TypeScript AST)
//! 4. Emit: TsModule -> String (via Emit trait)

use std::path::PathBuf;

use tracing::debug;

use crate::openapi::config::GeneratorConfig;
use crate::openapi::error::{GenerateError, Warning};
use crate::openapi::ir::{Emit, codegen_files, normalize_spec};
use crate::openapi::spec::OpenApiSpec;

/// One rendered file, relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory, e.g. `services/pets.service.ts`.
    pub path: PathBuf,
    /// Rendered TypeScript source.
    pub contents: String,
}

/// Everything produced by one run.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedClient {
    /// Models first, then services, then the support modules.
    pub files: Vec<GeneratedFile>,
    /// Recoverable issues, in the order they were reported.
    pub warnings: Vec<Warning>,
}

impl GeneratedClient {
    /// Rendered contents of a file, by relative path.
    pub fn file(&self, path: &str) -> Option<&str> {
        self.files
            .iter()
            .find(|file| file.path == PathBuf::from(path))
            .map(|file| file.contents.as_str())
    }
}

/// Generate the Angular client for a parsed document.
pub fn generate(spec: &OpenApiSpec, config: &GeneratorConfig) -> Result<GeneratedClient, GenerateError> {
    let api_ir = normalize_spec(spec, config)?;

    let files: Vec<GeneratedFile> = codegen_files(&api_ir, config)
        .into_iter()
        .map(|file| GeneratedFile {
            path: PathBuf::from(file.path),
            contents: file.module.emit(),
        })
        .collect();
    debug!(files = files.len(), "Rendered client files.");

    Ok(GeneratedClient {
        files,
        warnings: api_ir.warnings,
    })
}
