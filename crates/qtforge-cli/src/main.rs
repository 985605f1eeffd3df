//! qtforge command-line interface.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

use commands::{build, plan, source, upload};

/// Qt packaging driver.
///
/// Expands the recipe in qtforge.toml against the CI environment into a
/// build plan, runs the builds variant by variant, and uploads the
/// published reference to the configured remotes.
#[derive(Parser)]
#[command(name = "qtforge", version, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved build plan without running anything
    #[command(visible_alias = "p")]
    Plan {
        /// Path to qtforge.toml (default: search upward from the cwd)
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Plan for another host platform instead of the detected one
        #[arg(long, value_name = "OS")]
        host: Option<String>,
        /// Emit the plan as JSON
        #[arg(long, env = "QTFORGE_JSON")]
        json: bool,
        /// Directory holding the qt checkout
        #[arg(long, value_name = "DIR", default_value = ".")]
        source_dir: PathBuf,
        /// Parent directory for per-variant build trees
        #[arg(long, value_name = "DIR", default_value = "build")]
        build_dir: PathBuf,
        /// Parent directory for per-variant install prefixes
        #[arg(long, value_name = "DIR", default_value = "build/package")]
        prefix: PathBuf,
        /// OpenSSL installation root (default: QT_OPENSSL_ROOT)
        #[arg(long, value_name = "DIR")]
        openssl_root: Option<PathBuf>,
        /// Parallel build jobs (default: all cores)
        #[arg(long, short = 'j', value_name = "N")]
        jobs: Option<usize>,
    },

    /// Fetch the Qt sources: clone, checkout, init-repository
    Source {
        /// Path to qtforge.toml (default: search upward from the cwd)
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Directory to place the qt checkout in
        #[arg(long, value_name = "DIR", default_value = ".")]
        source_dir: PathBuf,
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
        /// Echo each command before it runs
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Build every variant in the plan, stopping at the first failure
    #[command(visible_alias = "b")]
    Build {
        /// Path to qtforge.toml (default: search upward from the cwd)
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Plan for another host platform (useful with --dry-run)
        #[arg(long, value_name = "OS")]
        host: Option<String>,
        /// Build only the variant with this index in the plan
        #[arg(long, value_name = "INDEX")]
        variant: Option<usize>,
        /// Directory holding the qt checkout
        #[arg(long, value_name = "DIR", default_value = ".")]
        source_dir: PathBuf,
        /// Parent directory for per-variant build trees
        #[arg(long, value_name = "DIR", default_value = "build")]
        build_dir: PathBuf,
        /// Parent directory for per-variant install prefixes
        #[arg(long, value_name = "DIR", default_value = "build/package")]
        prefix: PathBuf,
        /// OpenSSL installation root (default: QT_OPENSSL_ROOT)
        #[arg(long, value_name = "DIR")]
        openssl_root: Option<PathBuf>,
        /// Parallel build jobs (default: all cores)
        #[arg(long, short = 'j', value_name = "N")]
        jobs: Option<usize>,
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
        /// Echo each command before it runs
        #[arg(long, short = 'v')]
        verbose: bool,
    },

    /// Upload the built reference to the configured remotes
    #[command(visible_alias = "u")]
    Upload {
        /// Path to qtforge.toml (default: search upward from the cwd)
        #[arg(long, value_name = "FILE")]
        manifest: Option<PathBuf>,
        /// Upload to this remote only (default: all in CONAN_REMOTES)
        #[arg(long, value_name = "NAME")]
        remote: Option<String>,
        /// Print the commands instead of running them
        #[arg(long)]
        dry_run: bool,
        /// Echo each command before it runs
        #[arg(long, short = 'v')]
        verbose: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Plan {
            manifest,
            host,
            json,
            source_dir,
            build_dir,
            prefix,
            openssl_root,
            jobs,
        } => plan::run(plan::PlanArgs {
            manifest,
            host,
            json,
            source_dir,
            build_dir,
            prefix,
            openssl_root,
            jobs,
        }),
        Commands::Source {
            manifest,
            source_dir,
            dry_run,
            verbose,
        } => source::run(source::SourceArgs {
            manifest,
            source_dir,
            dry_run,
            verbose,
        }),
        Commands::Build {
            manifest,
            host,
            variant,
            source_dir,
            build_dir,
            prefix,
            openssl_root,
            jobs,
            dry_run,
            verbose,
        } => build::run(build::BuildArgs {
            manifest,
            host,
            variant,
            source_dir,
            build_dir,
            prefix,
            openssl_root,
            jobs,
            dry_run,
            verbose,
        }),
        Commands::Upload {
            manifest,
            remote,
            dry_run,
            verbose,
        } => upload::run(upload::UploadArgs {
            manifest,
            remote,
            dry_run,
            verbose,
        }),
    }
}
