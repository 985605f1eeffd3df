//! Qt recipe logic.
//!
//! Everything needed to turn a platform descriptor plus a `qtforge.toml`
//! manifest into runnable build commands: versioned rule tables, option
//! resolution, configure argument assembly, and step execution.
//!
//! The split matters: resolution and assembly are pure and fully
//! testable, while [`runner::StepRunner`] is the only place external
//! processes are spawned.

pub mod configure;
pub mod error;
pub mod identity;
pub mod manifest;
pub mod options;
pub mod resolver;
pub mod rules;
pub mod runner;
pub mod settings;
pub mod steps;

pub use configure::{configure_command, ConfigurePaths};
pub use error::{RecipeError, RecipeResult, RunError, RunResult};
pub use identity::PackageIdentity;
pub use manifest::{Manifest, PackageMetadata, RecipeConfig, MANIFEST_FILE};
pub use options::{OptionSet, OptionValue, Requirement, RequirementKind};
pub use resolver::{resolve, ResolvedOptions};
pub use rules::{BuildTool, OptionKind, OptionRule, PrefixStyle, RuleRevision, RuleTable};
pub use runner::StepRunner;
pub use settings::{Arch, BuildType, Os, Settings};
pub use steps::{
    build_steps, default_jobs, source_steps, stage_sources, BuildStep, StepContext,
};
