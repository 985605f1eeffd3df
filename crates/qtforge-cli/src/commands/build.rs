//! The `build` command: run every variant of the plan, fail fast.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use qtforge_matrix::{BuildPlan, CiEnv, PlanConfig};
use qtforge_recipe::StepRunner;

use super::{load_manifest, resolve_host};

pub struct BuildArgs {
    pub manifest: Option<PathBuf>,
    pub host: Option<String>,
    pub variant: Option<usize>,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub prefix: PathBuf,
    pub openssl_root: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub dry_run: bool,
    pub verbose: bool,
}

pub fn run(args: BuildArgs) -> Result<()> {
    let (manifest, manifest_path) = load_manifest(args.manifest.as_deref())?;
    let host = resolve_host(args.host.as_deref())?;
    let env = CiEnv::from_env();
    let config = PlanConfig {
        source_dir: args.source_dir,
        build_dir: args.build_dir,
        prefix: args.prefix,
        openssl_root: args.openssl_root,
        jobs: args.jobs,
    };

    let plan = BuildPlan::expand(host, &manifest, &env, &config).with_context(|| {
        format!(
            "failed to expand the build plan from {}",
            manifest_path.display()
        )
    })?;
    if plan.is_empty() {
        bail!("the expanded plan contains no variants");
    }
    if let Some(wanted) = args.variant {
        if wanted >= plan.len() {
            bail!(
                "variant index {wanted} is out of range (plan has {} variants)",
                plan.len()
            );
        }
    }

    let runner = StepRunner::new()
        .with_verbose(args.verbose)
        .with_dry_run(args.dry_run);

    println!("Building {}", plan.reference);
    let mut built = 0usize;
    for (index, variant) in plan.variants.iter().enumerate() {
        if let Some(wanted) = args.variant {
            if wanted != index {
                continue;
            }
        }
        println!();
        println!("[{}/{}] {}", index + 1, plan.len(), variant.settings);
        if variant.stage_sources {
            println!("    sources will be staged into the package");
        }
        runner.check_tools(&variant.steps)?;
        runner
            .run_all(&variant.steps)
            .with_context(|| format!("variant '{}' failed", variant.label))?;
        if !args.dry_run {
            println!("  \u{2713} {}", variant.label);
        }
        built += 1;
    }

    println!();
    println!("\u{2713} {built} variant(s) processed for {}", plan.reference);
    Ok(())
}
