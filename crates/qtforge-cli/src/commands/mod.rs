//! CLI subcommands.

pub mod build;
pub mod plan;
pub mod source;
pub mod upload;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use qtforge_recipe::{Manifest, Os};

/// Load the manifest from an explicit path, or search upward from the
/// current directory.
pub(crate) fn load_manifest(path: Option<&Path>) -> Result<(Manifest, PathBuf)> {
    match path {
        Some(path) => {
            let manifest = Manifest::from_file(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            Ok((manifest, path.to_path_buf()))
        }
        None => {
            let cwd = std::env::current_dir()
                .context("failed to determine the current directory")?;
            Ok(Manifest::find(&cwd)?)
        }
    }
}

/// Parse a host override, or detect the platform we are running on.
pub(crate) fn resolve_host(value: Option<&str>) -> Result<Os> {
    match value {
        Some(name) => {
            Os::from_str(name).with_context(|| format!("unknown host platform '{name}'"))
        }
        None => Os::host().with_context(|| {
            format!(
                "host operating system '{}' is not supported",
                std::env::consts::OS
            )
        }),
    }
}
