//! OpenAPI / Swagger to Angular client generation.
//!
//! [`generate`] turns a parsed [`OpenApiSpec`] into a set of TypeScript
//! files: one models module, one injectable service per operation group,
//! and the shared request-options and injection-token modules.
//! Recoverable problems are returned as [`Warning`]s next to the files.

pub mod config;
mod emitter;
pub mod error;
pub mod ir;
pub mod spec;

pub use config::{GeneratorConfig, ResponseKind};
pub use emitter::{GeneratedClient, GeneratedFile, generate};
pub use error::{GenerateError, Warning};
pub use spec::OpenApiSpec;
