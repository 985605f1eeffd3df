//! Error types for recipe resolution and step execution.

use std::path::PathBuf;
use thiserror::Error;

use crate::settings::Os;

pub type RecipeResult<T> = Result<T, RecipeError>;

/// A recipe could not be resolved into a runnable configuration.
///
/// Everything in here is detectable before a single external command
/// runs, and the resolver is expected to surface it that early.
#[derive(Debug, Error)]
pub enum RecipeError {
    #[error("architecture '{0}' is not supported by this recipe")]
    UnsupportedArch(String),

    #[error("compiler '{compiler}' is not supported on {os}")]
    UnsupportedCompiler { os: Os, compiler: String },

    #[error("unknown option '{0}' for this recipe revision")]
    UnknownOption(String),

    #[error("option '{0}' does not exist for this configuration")]
    OptionNotApplicable(String),

    #[error("invalid value '{value}' for option '{option}' (allowed: {allowed})")]
    InvalidOptionValue {
        option: String,
        value: String,
        allowed: String,
    },

    #[error("unknown recipe revision '{0}'")]
    UnknownRevision(String),

    #[error("an OpenSSL root directory is required for this configuration")]
    OpensslRootRequired,

    #[error("manifest not found: {0}")]
    ManifestNotFound(PathBuf),

    #[error("invalid manifest: {0}")]
    InvalidManifest(String),

    #[error("failed to parse manifest: {0}")]
    ManifestParse(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl RecipeError {
    pub fn unknown_option(name: impl Into<String>) -> Self {
        RecipeError::UnknownOption(name.into())
    }

    pub fn invalid_manifest(reason: impl Into<String>) -> Self {
        RecipeError::InvalidManifest(reason.into())
    }
}

pub type RunResult<T> = Result<T, RunError>;

/// An external command could not be started or exited unsuccessfully.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("command exited with status {code}: {command}")]
    CommandFailed { command: String, code: i32 },

    #[error("command terminated by signal: {command}")]
    CommandKilled { command: String },

    #[error("failed to spawn command '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("required tool '{0}' was not found on PATH")]
    ToolNotFound(String),
}
