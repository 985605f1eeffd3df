//! Build plan expansion.
//!
//! Turns host platform, manifest, and CI environment into the ordered
//! list of variants one run will build. Expansion is pure given a
//! [`CiEnv`], so the whole matrix is checkable before anything runs.

use serde::Serialize;
use std::path::PathBuf;

use qtforge_recipe::{
    build_steps, default_jobs, resolve, stage_sources, Arch, BuildStep, BuildType, Manifest,
    OptionSet, Os, Requirement, RuleRevision, Settings, StepContext,
};

use crate::channel::{effective_channel, Channel};
use crate::env::{vars, CiEnv};
use crate::error::{MatrixError, MatrixResult};

/// Workspace layout and knobs the planner needs besides the manifest
/// and environment.
#[derive(Debug, Clone)]
pub struct PlanConfig {
    /// Directory holding (or destined to hold) the `qt` checkout.
    pub source_dir: PathBuf,
    /// Parent of the per-variant build directories.
    pub build_dir: PathBuf,
    /// Parent of the per-variant install prefixes.
    pub prefix: PathBuf,
    /// Overrides QT_OPENSSL_ROOT from the environment.
    pub openssl_root: Option<PathBuf>,
    /// Overrides the detected parallelism.
    pub jobs: Option<usize>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        PlanConfig {
            source_dir: PathBuf::from("."),
            build_dir: PathBuf::from("build"),
            prefix: PathBuf::from("build/package"),
            openssl_root: None,
            jobs: None,
        }
    }
}

/// One fully resolved cell of the build matrix.
#[derive(Debug, Clone, Serialize)]
pub struct BuildVariant {
    /// Short unique name, also the variant's directory name.
    pub label: String,
    pub settings: Settings,
    pub options: OptionSet,
    pub requirements: Vec<Requirement>,
    /// Debug variants stage the sources next to the binaries.
    pub stage_sources: bool,
    /// configure, build, install, and for universal builds the merge.
    pub steps: Vec<BuildStep>,
}

/// Everything one CI run will build and publish.
#[derive(Debug, Clone, Serialize)]
pub struct BuildPlan {
    /// Package reference including the resolved channel.
    pub reference: String,
    pub channel: Channel,
    pub revision: RuleRevision,
    pub host: Os,
    pub variants: Vec<BuildVariant>,
}

impl BuildPlan {
    /// Expand the matrix for `host`.
    pub fn expand(
        host: Os,
        manifest: &Manifest,
        env: &CiEnv,
        config: &PlanConfig,
    ) -> MatrixResult<BuildPlan> {
        let revision = manifest.recipe.revision;
        let channel = effective_channel(env)?;
        let mut identity = manifest.identity();
        if let Some(user) = env.username() {
            identity = identity.with_user(user);
        }
        let reference = identity.reference(channel.as_str());

        let mut cells = enumerate(host, env)?;
        cells.retain(keep_variant);
        if host == Os::Macos {
            cells = expand_os_versions(cells, &env.macos_versions());
        }

        let openssl_root = config.openssl_root.clone().or_else(|| env.openssl_root());
        let jobs = config.jobs.unwrap_or_else(default_jobs);

        let mut variants = Vec::with_capacity(cells.len());
        for settings in cells {
            let label = variant_label(&settings);
            let build_dir = config.build_dir.join(&label);
            let prefix = config.prefix.join(&label);
            let resolved = resolve(revision, &settings, &manifest.recipe.options)?;
            let ctx = StepContext {
                source_dir: &config.source_dir,
                build_dir: &build_dir,
                prefix: &prefix,
                openssl_root: openssl_root.as_deref(),
                jobs,
                make_program: None,
            };
            let steps = build_steps(revision, &settings, &resolved, &ctx)?;
            variants.push(BuildVariant {
                label,
                options: resolved.options().clone(),
                requirements: resolved.requirements().to_vec(),
                stage_sources: stage_sources(&settings),
                steps,
                settings,
            });
        }

        Ok(BuildPlan {
            reference,
            channel,
            revision,
            host,
            variants,
        })
    }

    pub fn len(&self) -> usize {
        self.variants.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variants.is_empty()
    }
}

fn enumerate(host: Os, env: &CiEnv) -> MatrixResult<Vec<Settings>> {
    let (compiler, versions) = match host {
        Os::Windows => ("Visual Studio", env.require_list(vars::VISUAL_VERSIONS)?),
        Os::Macos => ("apple-clang", env.require_list(vars::APPLE_CLANG_VERSIONS)?),
        other => return Err(MatrixError::UnsupportedPlatform(other.to_string())),
    };
    let archs = env.archs()?;
    let build_types = env.build_types()?;

    let mut cells = Vec::new();
    for version in &versions {
        for &arch in &archs {
            for &build_type in &build_types {
                let settings = Settings::new(host, arch, compiler, version.as_str(), build_type);
                if host == Os::Windows {
                    for runtime in runtimes_for(build_type) {
                        cells.push(settings.clone().with_runtime(*runtime));
                    }
                } else {
                    cells.push(settings);
                }
            }
        }
    }
    Ok(cells)
}

/// Visual Studio runtimes paired with a build type. Debug gets the
/// d-suffixed ones.
fn runtimes_for(build_type: BuildType) -> &'static [&'static str] {
    match build_type {
        BuildType::Release => &["MD", "MT"],
        BuildType::Debug => &["MDd", "MTd"],
    }
}

/// Static runtimes are never packaged.
const EXCLUDED_RUNTIMES: &[&str] = &["MT", "MTd"];

fn keep_variant(settings: &Settings) -> bool {
    match &settings.runtime {
        Some(runtime) => !EXCLUDED_RUNTIMES.contains(&runtime.as_str()),
        None => true,
    }
}

/// Replicate every cell once per requested macOS version. With versions
/// present the original cells are replaced, so M cells and N versions
/// yield exactly M*N.
fn expand_os_versions(cells: Vec<Settings>, versions: &[String]) -> Vec<Settings> {
    if versions.is_empty() {
        return cells;
    }
    let mut expanded = Vec::with_capacity(cells.len() * versions.len());
    for settings in &cells {
        for version in versions {
            expanded.push(settings.clone().with_os_version(version.as_str()));
        }
    }
    expanded
}

fn variant_label(settings: &Settings) -> String {
    let mut parts = vec![
        settings.compiler_version.replace(' ', ""),
        settings.arch.to_string(),
        settings.build_type.as_str().to_lowercase(),
    ];
    if let Some(runtime) = &settings.runtime {
        parts.push(runtime.to_lowercase());
    }
    if let Some(version) = &settings.os_version {
        parts.push(format!("macos{version}"));
    }
    parts.join("-")
}
