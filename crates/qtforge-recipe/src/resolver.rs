//! Option resolution.
//!
//! Turns a platform descriptor plus requested options into the effective
//! option set and dependency list for one variant. Resolution is pure:
//! no environment reads, no filesystem, no subprocesses, so every
//! configuration error surfaces before any external command runs.

use serde::Serialize;

use crate::error::{RecipeError, RecipeResult};
use crate::options::{OptionSet, OptionValue, Requirement};
use crate::rules::{supported_compilers, RuleRevision};
use crate::settings::{Arch, Settings};

/// Output of [`resolve`]: the effective options and the requirements
/// they induce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedOptions {
    options: OptionSet,
    requirements: Vec<Requirement>,
}

impl ResolvedOptions {
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    /// Look up an option that must exist for this configuration.
    ///
    /// Reading an option outside the effective domain is a recipe bug,
    /// not a missing default, so it errors instead of substituting one.
    pub fn get(&self, name: &str) -> RecipeResult<&OptionValue> {
        self.options
            .get(name)
            .ok_or_else(|| RecipeError::OptionNotApplicable(name.to_string()))
    }

    pub fn bool_value(&self, name: &str) -> RecipeResult<bool> {
        match self.get(name)? {
            OptionValue::Bool(value) => Ok(*value),
            OptionValue::Str(value) => Err(RecipeError::InvalidOptionValue {
                option: name.to_string(),
                value: value.clone(),
                allowed: "true, false".to_string(),
            }),
        }
    }

    pub fn str_value(&self, name: &str) -> RecipeResult<&str> {
        match self.get(name)? {
            OptionValue::Str(value) => Ok(value),
            OptionValue::Bool(value) => Err(RecipeError::InvalidOptionValue {
                option: name.to_string(),
                value: value.to_string(),
                allowed: "a string value".to_string(),
            }),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.options.contains(name)
    }
}

/// Resolve requested options against a revision's rule table.
///
/// Requested options that exist in the revision but not on this
/// platform are dropped silently, mirroring how the recipes delete
/// per-platform options. Unknown names and out-of-domain values are
/// errors. In-domain options that were not requested get their table
/// default.
pub fn resolve(
    revision: RuleRevision,
    settings: &Settings,
    requested: &OptionSet,
) -> RecipeResult<ResolvedOptions> {
    if settings.arch == Arch::X86 {
        return Err(RecipeError::UnsupportedArch(Arch::X86.to_string()));
    }
    if !supported_compilers(settings.os).contains(&settings.compiler.as_str()) {
        return Err(RecipeError::UnsupportedCompiler {
            os: settings.os,
            compiler: settings.compiler.clone(),
        });
    }

    let table = revision.table();
    let mut options = OptionSet::new();

    for (name, value) in requested.iter() {
        let rule = table
            .option(name)
            .ok_or_else(|| RecipeError::unknown_option(name))?;
        if !rule.applies_to(settings.os) {
            continue;
        }
        rule.validate(value)?;
        options.set(name, value.clone());
    }

    for rule in table.options_for(settings.os) {
        if !options.contains(rule.name) {
            options.set(rule.name, rule.default_value());
        }
    }

    let mut requirements: Vec<Requirement> = table
        .base_build_requires
        .iter()
        .copied()
        .map(Requirement::build_time)
        .collect();
    if table.ssl_runtime_oses.contains(&settings.os) {
        requirements.push(Requirement::build_time(table.openssl_reference));
    }
    if let Some(mode) = options.str_value("openssl") {
        let reference = table.openssl_reference;
        let requirement = match mode {
            "yes" => Some(Requirement::build_time(reference)),
            "linked" => Some(Requirement::link_time(reference)),
            _ => None,
        };
        if let Some(requirement) = requirement {
            requirements.push(
                requirement
                    .with_option("shared", "True")
                    .with_option("no_zlib", "True"),
            );
        }
    }

    Ok(ResolvedOptions {
        options,
        requirements,
    })
}
