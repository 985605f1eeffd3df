//! Platform settings describing a single build variant.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Operating system a variant is built on and for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum Os {
    Windows,
    Macos,
    Linux,
}

impl Os {
    pub fn as_str(&self) -> &'static str {
        match self {
            Os::Windows => "Windows",
            Os::Macos => "Macos",
            Os::Linux => "Linux",
        }
    }

    /// Parse a user-facing name. Accepts any casing.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Os> {
        match s.to_ascii_lowercase().as_str() {
            "windows" => Some(Os::Windows),
            "macos" | "darwin" => Some(Os::Macos),
            "linux" => Some(Os::Linux),
            _ => None,
        }
    }

    /// Operating system of the current process.
    pub fn host() -> Option<Os> {
        Os::from_str(std::env::consts::OS)
    }

    pub fn all() -> &'static [Os] {
        &[Os::Windows, Os::Macos, Os::Linux]
    }

    /// Name of the configure entry point shipped with the Qt sources.
    /// Follows the variant OS, not the machine the planner runs on.
    pub fn configure_script(&self) -> &'static str {
        match self {
            Os::Windows => "configure.bat",
            Os::Macos | Os::Linux => "configure",
        }
    }
}

impl fmt::Display for Os {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Processor architecture of a variant.
#[allow(non_camel_case_types)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Arch {
    X86,
    X86_64,
    Armv8,
}

impl Arch {
    pub fn as_str(&self) -> &'static str {
        match self {
            Arch::X86 => "x86",
            Arch::X86_64 => "x86_64",
            Arch::Armv8 => "armv8",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Arch> {
        match s.to_ascii_lowercase().as_str() {
            "x86" => Some(Arch::X86),
            "x86_64" | "amd64" => Some(Arch::X86_64),
            "armv8" | "arm64" | "aarch64" => Some(Arch::Armv8),
            _ => None,
        }
    }

    /// Spelling CMake expects in CMAKE_OSX_ARCHITECTURES.
    pub fn cmake_osx_name(&self) -> &'static str {
        match self {
            Arch::X86 => "i386",
            Arch::X86_64 => "x86_64",
            Arch::Armv8 => "arm64",
        }
    }
}

impl fmt::Display for Arch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Debug or release build of the Qt libraries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum BuildType {
    Debug,
    Release,
}

impl BuildType {
    pub fn as_str(&self) -> &'static str {
        match self {
            BuildType::Debug => "Debug",
            BuildType::Release => "Release",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<BuildType> {
        match s.to_ascii_lowercase().as_str() {
            "debug" => Some(BuildType::Debug),
            "release" => Some(BuildType::Release),
            _ => None,
        }
    }

    pub fn all() -> &'static [BuildType] {
        &[BuildType::Release, BuildType::Debug]
    }
}

impl fmt::Display for BuildType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Full platform descriptor for one cell of the build matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Settings {
    pub os: Os,
    pub arch: Arch,
    pub compiler: String,
    pub compiler_version: String,
    /// Minimum OS version the variant targets. Set by macOS matrix
    /// expansion, absent everywhere else.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub os_version: Option<String>,
    pub build_type: BuildType,
    /// Visual Studio runtime library (MD, MDd, MT, MTd). Windows only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<String>,
}

impl Settings {
    pub fn new(
        os: Os,
        arch: Arch,
        compiler: impl Into<String>,
        compiler_version: impl Into<String>,
        build_type: BuildType,
    ) -> Self {
        Settings {
            os,
            arch,
            compiler: compiler.into(),
            compiler_version: compiler_version.into(),
            os_version: None,
            build_type,
            runtime: None,
        }
    }

    pub fn with_runtime(mut self, runtime: impl Into<String>) -> Self {
        self.runtime = Some(runtime.into());
        self
    }

    pub fn with_os_version(mut self, version: impl Into<String>) -> Self {
        self.os_version = Some(version.into());
        self
    }
}

impl fmt::Display for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            self.compiler, self.compiler_version, self.arch, self.build_type
        )?;
        if let Some(runtime) = &self.runtime {
            write!(f, "/{runtime}")?;
        }
        if let Some(version) = &self.os_version {
            write!(f, " (macOS {version})")?;
        }
        Ok(())
    }
}
