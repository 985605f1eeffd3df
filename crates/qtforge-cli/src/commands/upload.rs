//! The `upload` command: publish the reference to the remotes.

use anyhow::{bail, Context, Result};
use std::path::PathBuf;

use qtforge_matrix::{effective_channel, masked_command_line, upload_steps, CiEnv};
use qtforge_recipe::StepRunner;

use super::load_manifest;

pub struct UploadArgs {
    pub manifest: Option<PathBuf>,
    pub remote: Option<String>,
    pub dry_run: bool,
    pub verbose: bool,
}

pub fn run(args: UploadArgs) -> Result<()> {
    let (manifest, _) = load_manifest(args.manifest.as_deref())?;
    let env = CiEnv::from_env();
    let channel = effective_channel(&env)?;
    let mut identity = manifest.identity();
    if let Some(user) = env.username() {
        identity = identity.with_user(user);
    }
    let reference = identity.reference(channel.as_str());

    let mut remotes = env
        .remotes()
        .context("CONAN_REMOTES must list upload targets as url@verify_ssl@name")?;
    if let Some(wanted) = &args.remote {
        remotes.retain(|remote| &remote.name == wanted);
        if remotes.is_empty() {
            bail!("remote '{wanted}' is not listed in CONAN_REMOTES");
        }
    }

    // The runner stays quiet; command echoing happens here so password
    // arguments are always masked.
    let runner = StepRunner::new();

    println!("Uploading {reference}");
    for remote in &remotes {
        let credentials = env.credentials_for(remote, &identity.user)?;
        let steps = upload_steps(&reference, remote, &credentials);
        println!();
        println!("-> {} ({})", remote.name, remote.url);
        for step in &steps {
            if args.dry_run {
                println!("[dry-run] {}", masked_command_line(step));
                continue;
            }
            if args.verbose {
                println!("+ {}", masked_command_line(step));
            }
            runner
                .run(step)
                .with_context(|| format!("upload to '{}' failed", remote.name))?;
        }
        if !args.dry_run {
            println!("  \u{2713} {}", remote.name);
        }
    }
    Ok(())
}
