//! Sequential execution of build steps.

use std::collections::BTreeSet;
use std::fs;
use std::process::Command;

use crate::error::{RunError, RunResult};
use crate::steps::BuildStep;

/// Runs build steps one at a time, stopping at the first failure.
///
/// Output is not captured: configure and the build tools stream straight
/// to the caller's stdout/stderr, which is what CI logs want.
#[derive(Debug, Clone, Copy, Default)]
pub struct StepRunner {
    verbose: bool,
    dry_run: bool,
}

impl StepRunner {
    pub fn new() -> Self {
        StepRunner::default()
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    /// Verify every PATH-resolved program exists before running anything.
    ///
    /// Programs with a path separator are skipped: scripts inside the
    /// checkout only exist after the source step has run.
    pub fn check_tools(&self, steps: &[BuildStep]) -> RunResult<()> {
        if self.dry_run {
            return Ok(());
        }
        let mut seen = BTreeSet::new();
        for step in steps {
            let program = step.program.as_str();
            if program.contains('/') || program.contains('\\') {
                continue;
            }
            if seen.insert(program) && which::which(program).is_err() {
                return Err(RunError::ToolNotFound(program.to_string()));
            }
        }
        Ok(())
    }

    /// Run one step to completion.
    pub fn run(&self, step: &BuildStep) -> RunResult<()> {
        let command_line = step.command_line();
        if self.dry_run {
            println!("[dry-run] {command_line}");
            return Ok(());
        }
        if self.verbose {
            println!("+ {command_line}");
        }

        let mut command = Command::new(&step.program);
        command.args(&step.args);
        for (key, value) in &step.env {
            command.env(key, value);
        }
        if let Some(cwd) = &step.cwd {
            fs::create_dir_all(cwd).map_err(|source| RunError::SpawnFailed {
                command: command_line.clone(),
                source,
            })?;
            command.current_dir(cwd);
        }

        let status = command.status().map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                RunError::ToolNotFound(step.program.clone())
            } else {
                RunError::SpawnFailed {
                    command: command_line.clone(),
                    source,
                }
            }
        })?;

        match status.code() {
            Some(0) => Ok(()),
            Some(code) => Err(RunError::CommandFailed {
                command: command_line,
                code,
            }),
            None => Err(RunError::CommandKilled {
                command: command_line,
            }),
        }
    }

    /// Run steps in order. The first failure aborts the rest.
    pub fn run_all(&self, steps: &[BuildStep]) -> RunResult<()> {
        for step in steps {
            self.run(step)?;
        }
        Ok(())
    }
}
