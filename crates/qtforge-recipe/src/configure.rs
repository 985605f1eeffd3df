//! Assembly of the Qt configure invocation.

use std::path::Path;

use crate::error::{RecipeError, RecipeResult};
use crate::resolver::ResolvedOptions;
use crate::rules::{PrefixStyle, RuleRevision, RuleTable};
use crate::settings::{Arch, Os, Settings};
use crate::steps::BuildStep;

/// Filesystem inputs the configure step depends on.
#[derive(Debug, Clone, Copy)]
pub struct ConfigurePaths<'a> {
    /// Directory holding the `qt` checkout.
    pub source_dir: &'a Path,
    /// Install prefix for the finished libraries.
    pub prefix: &'a Path,
    /// Root of an OpenSSL installation, for variants that need one.
    pub openssl_root: Option<&'a Path>,
    /// Pins CMAKE_OSX_ARCHITECTURES in universal sub-builds.
    pub macos_arch: Option<Arch>,
}

/// Assemble the configure invocation for one resolved variant.
///
/// Argument order is fixed: common flags first, then platform flags,
/// then option-derived flags, and install/prefix arguments last. The
/// script name follows the variant OS, so Windows variants always call
/// `configure.bat` and everything else calls `configure`.
pub fn configure_command(
    revision: RuleRevision,
    settings: &Settings,
    resolved: &ResolvedOptions,
    paths: &ConfigurePaths<'_>,
) -> RecipeResult<BuildStep> {
    let table = revision.table();
    let program = paths
        .source_dir
        .join("qt")
        .join(settings.os.configure_script());

    let mut step = BuildStep::new(
        program.display().to_string(),
        table.common_flags.iter().copied(),
    );

    platform_flags(table, settings, &mut step);
    option_flags(table, settings, resolved, paths, &mut step)?;
    install_flags(table, settings, paths, &mut step)?;

    Ok(step)
}

fn platform_flags(table: &RuleTable, settings: &Settings, step: &mut BuildStep) {
    if settings.os == Os::Linux {
        step.args
            .extend(table.linux_platform_flags.iter().map(|flag| flag.to_string()));
        for module in table.linux_skip_modules {
            step.args.push("-skip".to_string());
            step.args.push(module.to_string());
        }
    }
    if table.ssl_runtime_oses.contains(&settings.os) {
        step.args.push("-openssl-runtime".to_string());
    }
}

fn option_flags(
    table: &RuleTable,
    settings: &Settings,
    resolved: &ResolvedOptions,
    paths: &ConfigurePaths<'_>,
    step: &mut BuildStep,
) -> RecipeResult<()> {
    // The table gates every read, so options outside the platform
    // domain are never touched.
    if option_applies(table, "framework", settings.os) {
        let flag = if resolved.bool_value("framework")? {
            "-framework"
        } else {
            "-no-framework"
        };
        step.args.push(flag.to_string());
    }

    if option_applies(table, "opengl", settings.os) {
        let mode = resolved.str_value("opengl")?;
        step.args.push("-opengl".to_string());
        step.args.push(mode.to_string());
        // ANGLE only exists in the Windows renderer stack
        if mode == "dynamic" && settings.os == Os::Windows {
            step.args.push("-angle".to_string());
            step.env
                .insert("QT_ANGLE_PLATFORM".to_string(), "d3d11".to_string());
        }
    }

    if option_applies(table, "openssl", settings.os) {
        match resolved.str_value("openssl")? {
            "yes" => {
                let root = required_openssl_root(paths)?;
                step.args.push("-openssl".to_string());
                step.args.push("-I".to_string());
                step.args.push(root.join("include").display().to_string());
            }
            "linked" => {
                let root = required_openssl_root(paths)?;
                step.args.push("-openssl-linked".to_string());
                step.args.push("-I".to_string());
                step.args.push(root.join("include").display().to_string());
                step.args.push("-L".to_string());
                step.args.push(root.join("lib").display().to_string());
            }
            _ => step.args.push("-no-openssl".to_string()),
        }
    }

    Ok(())
}

fn install_flags(
    table: &RuleTable,
    settings: &Settings,
    paths: &ConfigurePaths<'_>,
    step: &mut BuildStep,
) -> RecipeResult<()> {
    match table.prefix_style {
        PrefixStyle::ConfigureFlag => {
            if settings.os == Os::Macos {
                if let Some(version) = &settings.os_version {
                    step.args
                        .push(format!("QMAKE_MACOSX_DEPLOYMENT_TARGET={version}"));
                }
            }
            step.args.push("-prefix".to_string());
            step.args.push(paths.prefix.display().to_string());
        }
        PrefixStyle::CmakeDefinitions => {
            step.args.push("--".to_string());
            step.args.push("-DBUILD_SHARED_LIBS=YES".to_string());
            step.args
                .push(format!("-DCMAKE_INSTALL_PREFIX={}", paths.prefix.display()));
            step.args
                .push(format!("-DCMAKE_BUILD_TYPE={}", settings.build_type));
            if settings.os == Os::Macos {
                if let Some(version) = &settings.os_version {
                    step.args
                        .push(format!("-DCMAKE_OSX_DEPLOYMENT_TARGET={version}"));
                }
                if let Some(arch) = paths.macos_arch {
                    step.args
                        .push(format!("-DCMAKE_OSX_ARCHITECTURES={}", arch.cmake_osx_name()));
                }
            }
            if table.ssl_runtime_oses.contains(&settings.os) {
                let root = required_openssl_root(paths)?;
                step.args
                    .push(format!("-DOPENSSL_ROOT_DIR={}", root.display()));
            }
        }
    }
    Ok(())
}

fn option_applies(table: &RuleTable, name: &str, os: Os) -> bool {
    table
        .option(name)
        .map_or(false, |rule| rule.applies_to(os))
}

fn required_openssl_root<'a>(paths: &ConfigurePaths<'a>) -> RecipeResult<&'a Path> {
    paths.openssl_root.ok_or(RecipeError::OpensslRootRequired)
}
