//! The `source` command: fetch the Qt sources.

use anyhow::{bail, Result};
use std::path::PathBuf;

use qtforge_recipe::{source_steps, StepRunner};

use super::load_manifest;

pub struct SourceArgs {
    pub manifest: Option<PathBuf>,
    pub source_dir: PathBuf,
    pub dry_run: bool,
    pub verbose: bool,
}

pub fn run(args: SourceArgs) -> Result<()> {
    let (manifest, _) = load_manifest(args.manifest.as_deref())?;
    let checkout = args.source_dir.join("qt");
    if checkout.exists() && !args.dry_run {
        bail!(
            "{} already exists; remove it to fetch fresh sources",
            checkout.display()
        );
    }

    let runner = StepRunner::new()
        .with_verbose(args.verbose)
        .with_dry_run(args.dry_run);
    let steps = source_steps(&manifest, &args.source_dir);
    runner.check_tools(&steps)?;
    runner.run_all(&steps)?;

    if !args.dry_run {
        println!(
            "\u{2713} {} {} sources ready in {}",
            manifest.package.name,
            manifest.package.version,
            checkout.display()
        );
    }
    Ok(())
}
