//! The `plan` command: expand and display the build matrix.

use anyhow::{Context, Result};
use std::path::PathBuf;

use qtforge_matrix::{BuildPlan, CiEnv, PlanConfig};

use super::{load_manifest, resolve_host};

pub struct PlanArgs {
    pub manifest: Option<PathBuf>,
    pub host: Option<String>,
    pub json: bool,
    pub source_dir: PathBuf,
    pub build_dir: PathBuf,
    pub prefix: PathBuf,
    pub openssl_root: Option<PathBuf>,
    pub jobs: Option<usize>,
}

pub fn run(args: PlanArgs) -> Result<()> {
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

    if args.json {
        println!("{}", serde_json::to_string_pretty(&plan)?);
        return Ok(());
    }

    println!("Build plan for {}", plan.reference);
    println!(
        "  revision {}, host {}, {} variant(s)",
        plan.revision,
        plan.host,
        plan.len()
    );
    for (index, variant) in plan.variants.iter().enumerate() {
        println!();
        println!("[{index}] {}  ({})", variant.settings, variant.label);
        if !variant.options.is_empty() {
            println!("    options: {}", variant.options);
        }
        for requirement in &variant.requirements {
            println!("    requires: {requirement}");
        }
        if variant.stage_sources {
            println!("    stages sources into the package");
        }
        for step in &variant.steps {
            println!("    $ {step}");
        }
    }
    Ok(())
}
