//! Intermediate Representation for OpenAPI to Angular client generation.
//!
//! This module defines a three-layer architecture:
//! 1. API-level IR: operation descriptors, groups and method shapes
//! 2. TypeScript AST IR: types, registry entries, classes and statements
//! 3. Emission: AST to TypeScript code strings via the `Emit` trait
//!
//! The separation allows:
//! - All OpenAPI corner cases resolved in normalization
//! - Code generation builds structured AST (testable)
//! - Emission is purely mechanical string building
//!
//! ## Module Structure
//!
//! - `schema`: raw schemas -> `SchemaNode` tagged union
//! - `registry`: named type definitions in first-registration order
//! - `resolve`: `SchemaNode` -> `TsType`, registering named types
//! - `extract`: operation descriptors and grouping
//! - `classify`: media type -> response handling mode
//! - `synth`: operation descriptor -> method shape
//! - `normalize`: the pipeline, spec -> `ApiIR`
//! - `codegen`: `ApiIR` -> TypeScript modules
//! - `emit`: TypeScript AST -> code strings
//! - `utils`: naming utilities shared across modules

pub mod api;
pub mod classify;
mod codegen;
mod emit;
pub mod extract;
mod normalize;
pub mod registry;
pub mod resolve;
pub mod schema;
pub mod synth;
pub mod types;
pub mod utils;

// Re-export the main entry points
pub use codegen::{MODELS_INDEX, ModuleFile, SERVICES_DIR, codegen_files};
pub use emit::Emit;
pub use normalize::normalize_spec;
