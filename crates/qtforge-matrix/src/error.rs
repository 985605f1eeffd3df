//! Error types for matrix expansion and CI environment access.

use thiserror::Error;

use qtforge_recipe::RecipeError;

pub type MatrixResult<T> = Result<T, MatrixError>;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("platform '{0}' has no matrix driver (expected Windows or Macos)")]
    UnsupportedPlatform(String),

    #[error("required environment variable '{0}' is not set")]
    MissingEnv(String),

    #[error("could not determine the CI branch; set QTFORGE_BRANCH")]
    BranchUnknown,

    #[error("invalid remote '{entry}': {reason}")]
    InvalidRemote { entry: String, reason: String },

    #[error("invalid stable branch pattern '{pattern}': {reason}")]
    InvalidBranchPattern { pattern: String, reason: String },

    #[error("invalid channel '{0}' (expected 'stable' or 'testing')")]
    InvalidChannel(String),

    #[error("invalid value '{value}' in {variable}")]
    InvalidEnvValue { variable: String, value: String },

    #[error(transparent)]
    Recipe(#[from] RecipeError),
}

impl MatrixError {
    pub fn missing_env(name: impl Into<String>) -> Self {
        MatrixError::MissingEnv(name.into())
    }

    pub fn invalid_remote(entry: impl Into<String>, reason: impl Into<String>) -> Self {
        MatrixError::InvalidRemote {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_env_value(variable: impl Into<String>, value: impl Into<String>) -> Self {
        MatrixError::InvalidEnvValue {
            variable: variable.into(),
            value: value.into(),
        }
    }
}
