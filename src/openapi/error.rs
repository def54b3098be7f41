//! Fatal errors and recoverable warnings for a generation run.

use std::fmt;
use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::warn;

/// Errors that abort the current generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The API description file could not be read.
    #[error("failed to read API description {}: {source}", .path.display())]
    Read {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },

    /// The API description file is not valid JSON/YAML for the expected shape.
    #[error("failed to parse API description {}: {message}", .path.display())]
    Parse {
        /// File that was being parsed.
        path: PathBuf,
        /// Parser message.
        message: String,
    },

    /// The configuration file could not be read or parsed.
    #[error("invalid configuration {}: {message}", .path.display())]
    Config {
        /// Configuration file.
        path: PathBuf,
        /// Reader or parser message.
        message: String,
    },

    /// The configured operation-id separator does not form a valid pattern.
    #[error("invalid operation id separator '{separator}': {source}")]
    InvalidSeparator {
        /// Configured separator.
        separator: String,
        /// Pattern compile error.
        source: regex::Error,
    },

    /// A method-name transform is configured but the operation has no operationId.
    #[error(
        "operation ({method}) {path} has no operationId, which the configured method-name transform requires"
    )]
    MissingOperationId {
        /// Upper-case HTTP verb.
        method: String,
        /// Path template.
        path: String,
    },

    /// A generated file could not be written.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// A recoverable issue attached to the entity it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// Affected entity: a schema name, `METHOD /path`, or a parameter.
    pub subject: String,
    /// What was substituted and why.
    pub message: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.subject, self.message)
    }
}

/// Accumulates warnings for one run, logging each as it is recorded.
#[derive(Debug, Default)]
pub struct Diagnostics {
    warnings: Vec<Warning>,
}

impl Diagnostics {
    /// Record a warning against `subject`.
    pub fn warn(&mut self, subject: impl Into<String>, message: impl Into<String>) {
        let warning = Warning {
            subject: subject.into(),
            message: message.into(),
        };
        warn!(subject = %warning.subject, "{}", warning.message);
        self.warnings.push(warning);
    }

    /// Warnings recorded so far, in order.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Move recorded warnings out of another accumulator.
    pub fn absorb(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    /// Consume the accumulator.
    pub fn into_warnings(self) -> Vec<Warning> {
        self.warnings
    }
}
