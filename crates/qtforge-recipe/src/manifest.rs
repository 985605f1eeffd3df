//! Recipe manifest (`qtforge.toml`) parsing and lookup.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{RecipeError, RecipeResult};
use crate::identity::PackageIdentity;
use crate::options::OptionSet;
use crate::rules::RuleRevision;

/// File name the manifest is looked up under.
pub const MANIFEST_FILE: &str = "qtforge.toml";

const DEFAULT_SOURCE_URL: &str = "https://code.qt.io/qt/qt5.git";

/// The recipe manifest: what to package and under which rule revision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub package: PackageMetadata,
    pub recipe: RecipeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackageMetadata {
    /// Package name as published, e.g. `qt`.
    pub name: String,
    pub version: semver::Version,
    /// Account the package is published under.
    pub user: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license: Option<String>,
    /// Upstream git repository the sources come from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecipeConfig {
    /// Rule table the recipe follows.
    pub revision: RuleRevision,
    /// Requested option values, merged over the revision defaults.
    #[serde(default)]
    pub options: OptionSet,
}

impl Manifest {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> RecipeResult<Manifest> {
        let manifest: Manifest = toml::from_str(content)?;
        manifest.validate()?;
        Ok(manifest)
    }

    pub fn from_file(path: &Path) -> RecipeResult<Manifest> {
        let content = fs::read_to_string(path).map_err(|err| {
            if err.kind() == std::io::ErrorKind::NotFound {
                RecipeError::ManifestNotFound(path.to_path_buf())
            } else {
                RecipeError::Io(err)
            }
        })?;
        Manifest::from_str(&content)
    }

    /// Locate and parse a manifest by walking up from `start`.
    ///
    /// Returns the manifest together with the path it was loaded from.
    pub fn find(start: &Path) -> RecipeResult<(Manifest, PathBuf)> {
        let mut dir = Some(start);
        while let Some(current) = dir {
            let candidate = current.join(MANIFEST_FILE);
            if candidate.is_file() {
                return Ok((Manifest::from_file(&candidate)?, candidate));
            }
            dir = current.parent();
        }
        Err(RecipeError::ManifestNotFound(start.join(MANIFEST_FILE)))
    }

    pub fn validate(&self) -> RecipeResult<()> {
        validate_identifier("package.name", &self.package.name)?;
        validate_identifier("package.user", &self.package.user)?;
        Ok(())
    }

    pub fn identity(&self) -> PackageIdentity {
        PackageIdentity::new(
            self.package.name.clone(),
            self.package.version.clone(),
            self.package.user.clone(),
        )
    }

    /// Upstream repository, falling back to the canonical Qt mirror.
    pub fn source_url(&self) -> &str {
        self.package.url.as_deref().unwrap_or(DEFAULT_SOURCE_URL)
    }
}

fn validate_identifier(field: &str, value: &str) -> RecipeResult<()> {
    if value.is_empty() {
        return Err(RecipeError::invalid_manifest(format!("{field} is empty")));
    }
    let valid = value
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '+' | '-'));
    if !valid {
        return Err(RecipeError::invalid_manifest(format!(
            "{field} '{value}' contains characters outside [a-zA-Z0-9_.+-]"
        )));
    }
    Ok(())
}
