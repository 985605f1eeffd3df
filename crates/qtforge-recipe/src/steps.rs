//! Rendering a resolved variant into runnable external commands.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use crate::configure::{configure_command, ConfigurePaths};
use crate::error::RecipeResult;
use crate::manifest::Manifest;
use crate::resolver::ResolvedOptions;
use crate::rules::{BuildTool, RuleRevision};
use crate::settings::{Arch, BuildType, Os, Settings};

/// One external command, fully rendered ahead of execution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BuildStep {
    pub program: String,
    pub args: Vec<String>,
    /// Extra environment on top of the inherited one.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub env: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,
}

impl BuildStep {
    pub fn new<I, S>(program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        BuildStep {
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
            cwd: None,
        }
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn with_cwd(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cwd = Some(dir.into());
        self
    }

    /// Single-line rendering used by dry runs and error messages.
    pub fn command_line(&self) -> String {
        let mut parts: Vec<String> = self
            .env
            .iter()
            .map(|(key, value)| format!("{key}={value}"))
            .collect();
        parts.push(self.program.clone());
        for arg in &self.args {
            if arg.chars().any(char::is_whitespace) {
                parts.push(format!("\"{arg}\""));
            } else {
                parts.push(arg.clone());
            }
        }
        parts.join(" ")
    }
}

impl fmt::Display for BuildStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.command_line())
    }
}

/// Directories and knobs step assembly needs.
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    /// Directory holding (or destined to hold) the `qt` checkout.
    pub source_dir: &'a Path,
    /// Directory configure and the build tool run in.
    pub build_dir: &'a Path,
    /// Install prefix for the finished libraries.
    pub prefix: &'a Path,
    /// Root of an OpenSSL installation, where the recipe needs one.
    pub openssl_root: Option<&'a Path>,
    pub jobs: usize,
    /// Overrides the Windows make tool. `None` picks jom when it is
    /// on PATH and nmake otherwise.
    pub make_program: Option<&'a str>,
}

/// Parallelism used when the caller does not pin a job count.
pub fn default_jobs() -> usize {
    std::thread::available_parallelism()
        .map(NonZeroUsize::get)
        .unwrap_or(1)
}

/// Debug packages carry the sources next to the binaries so debuggers
/// can resolve them.
pub fn stage_sources(settings: &Settings) -> bool {
    settings.build_type == BuildType::Debug
}

/// Commands that materialize the Qt sources under `<source_dir>/qt`.
pub fn source_steps(manifest: &Manifest, source_dir: &Path) -> Vec<BuildStep> {
    let checkout = source_dir.join("qt");
    let tag = format!("v{}", manifest.package.version);
    vec![
        BuildStep::new("git", ["clone", manifest.source_url(), "qt"]).with_cwd(source_dir),
        BuildStep::new("git", vec!["checkout".to_string(), tag]).with_cwd(&checkout),
        BuildStep::new("perl", ["init-repository"]).with_cwd(&checkout),
    ]
}

/// Render the full configure/build/install sequence for one variant.
///
/// Universal macOS variants fan out into one sub-build per architecture
/// and end with a merge of the per-arch install trees.
pub fn build_steps(
    revision: RuleRevision,
    settings: &Settings,
    resolved: &ResolvedOptions,
    ctx: &StepContext<'_>,
) -> RecipeResult<Vec<BuildStep>> {
    let universal = settings.os == Os::Macos
        && resolved.contains("universal")
        && resolved.bool_value("universal")?;
    if universal {
        universal_steps(revision, settings, resolved, ctx)
    } else {
        variant_steps(revision, settings, resolved, ctx, ctx.build_dir, ctx.prefix, None)
    }
}

const UNIVERSAL_ARCHS: [Arch; 2] = [Arch::X86_64, Arch::Armv8];

fn universal_steps(
    revision: RuleRevision,
    settings: &Settings,
    resolved: &ResolvedOptions,
    ctx: &StepContext<'_>,
) -> RecipeResult<Vec<BuildStep>> {
    let mut steps = Vec::new();
    let mut arch_prefixes = Vec::new();
    for arch in UNIVERSAL_ARCHS {
        let mut arch_settings = settings.clone();
        arch_settings.arch = arch;
        let build_dir = ctx.build_dir.join(format!("qt-{arch}"));
        let prefix = suffixed_path(ctx.prefix, arch.as_str());
        steps.extend(variant_steps(
            revision,
            &arch_settings,
            resolved,
            ctx,
            &build_dir,
            &prefix,
            Some(arch),
        )?);
        arch_prefixes.push(prefix);
    }
    let mut merge_args = vec![ctx.prefix.display().to_string()];
    merge_args.extend(arch_prefixes.iter().map(|prefix| prefix.display().to_string()));
    steps.push(BuildStep::new("makeuniversal", merge_args).with_cwd(ctx.build_dir));
    Ok(steps)
}

fn variant_steps(
    revision: RuleRevision,
    settings: &Settings,
    resolved: &ResolvedOptions,
    ctx: &StepContext<'_>,
    build_dir: &Path,
    prefix: &Path,
    macos_arch: Option<Arch>,
) -> RecipeResult<Vec<BuildStep>> {
    let paths = ConfigurePaths {
        source_dir: ctx.source_dir,
        prefix,
        openssl_root: ctx.openssl_root,
        macos_arch,
    };
    let configure = configure_command(revision, settings, resolved, &paths)?.with_cwd(build_dir);
    let mut steps = vec![configure];
    steps.extend(compile_steps(revision, settings, ctx, build_dir));
    Ok(steps)
}

fn compile_steps(
    revision: RuleRevision,
    settings: &Settings,
    ctx: &StepContext<'_>,
    build_dir: &Path,
) -> Vec<BuildStep> {
    let jobs = ctx.jobs.to_string();
    match revision.table().build_tool {
        BuildTool::Cmake => vec![
            BuildStep::new("cmake", ["--build", ".", "--parallel", jobs.as_str()])
                .with_cwd(build_dir),
            BuildStep::new("cmake", ["--install", "."]).with_cwd(build_dir),
        ],
        BuildTool::Make if settings.os == Os::Windows => {
            let program = ctx
                .make_program
                .map(str::to_string)
                .unwrap_or_else(windows_make_program);
            let mut build = BuildStep::new(program.as_str(), Vec::<String>::new()).with_cwd(build_dir);
            if supports_job_flag(&program) {
                build.args.push(format!("-j{}", ctx.jobs));
            }
            vec![
                build,
                BuildStep::new(program.as_str(), ["install"]).with_cwd(build_dir),
            ]
        }
        BuildTool::Make => vec![
            BuildStep::new("make", [format!("-j{}", ctx.jobs)]).with_cwd(build_dir),
            BuildStep::new("make", ["install"]).with_cwd(build_dir),
        ],
    }
}

/// jom drives parallel builds when installed; nmake is the fallback and
/// takes no job flag.
fn windows_make_program() -> String {
    if which::which("jom").is_ok() {
        "jom".to_string()
    } else {
        "nmake".to_string()
    }
}

fn supports_job_flag(program: &str) -> bool {
    !program.contains("nmake")
}

fn suffixed_path(path: &Path, suffix: &str) -> PathBuf {
    let mut os_string = path.as_os_str().to_os_string();
    os_string.push(format!("-{suffix}"));
    PathBuf::from(os_string)
}
