//! CLI/operational errors.
//!
//! These are distinct from the pipeline's own per-pack diagnostics
//! (`ulpcl_core::diagnostics::Diagnostic`): they are process-fatal,
//! arise outside any single pack's compilation, and map to the catch-all
//! exit codes in `spec.md` §6.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum UlpclError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid argument: {0}")]
    Validation(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

pub type Result<T> = std::result::Result<T, UlpclError>;
