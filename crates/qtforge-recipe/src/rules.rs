//! Versioned rule tables.
//!
//! Every Qt release line the project has packaged differs in which options
//! exist, which platforms they apply to, and which configure flags are
//! passed. Those differences live here as data, one table per revision,
//! so the resolver and the step assembly stay generic.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{RecipeError, RecipeResult};
use crate::options::OptionValue;
use crate::settings::Os;

/// Identifies the rule set for one packaged Qt release line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleRevision {
    /// Qt 5.6 era: Windows-centric, qmake-driven configure.
    Qt56,
    /// Qt 5.15 era: Windows and Linux options, qtwebengine skipped.
    Qt515,
    /// Qt 6.2 era: CMake-driven configure, universal macOS binaries.
    Qt62,
}

impl RuleRevision {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleRevision::Qt56 => "qt56",
            RuleRevision::Qt515 => "qt515",
            RuleRevision::Qt62 => "qt62",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> RecipeResult<RuleRevision> {
        match s.to_ascii_lowercase().as_str() {
            "qt56" => Ok(RuleRevision::Qt56),
            "qt515" => Ok(RuleRevision::Qt515),
            "qt62" => Ok(RuleRevision::Qt62),
            _ => Err(RecipeError::UnknownRevision(s.to_string())),
        }
    }

    pub fn all() -> &'static [RuleRevision] {
        &[RuleRevision::Qt56, RuleRevision::Qt515, RuleRevision::Qt62]
    }

    /// The rule table for this revision.
    pub fn table(&self) -> &'static RuleTable {
        match self {
            RuleRevision::Qt56 => &QT56,
            RuleRevision::Qt515 => &QT515,
            RuleRevision::Qt62 => &QT62,
        }
    }
}

impl fmt::Display for RuleRevision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Shape of one option's domain.
#[derive(Debug, Clone, Copy)]
pub enum OptionKind {
    Bool {
        default: bool,
    },
    Choice {
        values: &'static [&'static str],
        default: &'static str,
    },
}

/// One option of a revision: its name, the platforms it exists on, and
/// the values it accepts.
#[derive(Debug, Clone, Copy)]
pub struct OptionRule {
    pub name: &'static str,
    pub oses: &'static [Os],
    pub kind: OptionKind,
}

impl OptionRule {
    pub fn applies_to(&self, os: Os) -> bool {
        self.oses.contains(&os)
    }

    pub fn default_value(&self) -> OptionValue {
        match self.kind {
            OptionKind::Bool { default } => OptionValue::Bool(default),
            OptionKind::Choice { default, .. } => OptionValue::from(default),
        }
    }

    /// Check a requested value against the domain.
    pub fn validate(&self, value: &OptionValue) -> RecipeResult<()> {
        match (&self.kind, value) {
            (OptionKind::Bool { .. }, OptionValue::Bool(_)) => Ok(()),
            (OptionKind::Choice { values, .. }, OptionValue::Str(s))
                if values.contains(&s.as_str()) =>
            {
                Ok(())
            }
            _ => Err(RecipeError::InvalidOptionValue {
                option: self.name.to_string(),
                value: value.to_string(),
                allowed: self.allowed_values(),
            }),
        }
    }

    fn allowed_values(&self) -> String {
        match self.kind {
            OptionKind::Bool { .. } => "true, false".to_string(),
            OptionKind::Choice { values, .. } => values.join(", "),
        }
    }
}

/// How the install prefix reaches the build system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixStyle {
    /// `-prefix <dir>` understood by the qmake-era configure.
    ConfigureFlag,
    /// `-- -DCMAKE_...=...` definitions after the argument separator.
    CmakeDefinitions,
}

/// Tool driving compilation once configure has run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildTool {
    /// make on Unix, jom (or nmake) on Windows.
    Make,
    /// `cmake --build` / `cmake --install`.
    Cmake,
}

/// Everything revision-specific, as plain data.
#[derive(Debug)]
pub struct RuleTable {
    pub options: &'static [OptionRule],
    /// Flags every platform gets, in order, before anything else.
    pub common_flags: &'static [&'static str],
    /// Platform selection flags appended on Linux.
    pub linux_platform_flags: &'static [&'static str],
    /// Qt modules skipped on Linux, each rendered as `-skip <module>`.
    pub linux_skip_modules: &'static [&'static str],
    /// Platforms that get `-openssl-runtime` and an OpenSSL build
    /// requirement without any openssl option existing.
    pub ssl_runtime_oses: &'static [Os],
    /// Build requirements shared by every platform.
    pub base_build_requires: &'static [&'static str],
    /// OpenSSL package reference used by this release line.
    pub openssl_reference: &'static str,
    pub prefix_style: PrefixStyle,
    pub build_tool: BuildTool,
}

impl RuleTable {
    pub fn option(&self, name: &str) -> Option<&OptionRule> {
        self.options.iter().find(|rule| rule.name == name)
    }

    /// Options that exist on the given platform.
    pub fn options_for(&self, os: Os) -> impl Iterator<Item = &OptionRule> {
        self.options.iter().filter(move |rule| rule.applies_to(os))
    }
}

static QT56: RuleTable = RuleTable {
    options: &[
        OptionRule {
            name: "opengl",
            oses: &[Os::Windows],
            kind: OptionKind::Choice {
                values: &["desktop", "dynamic"],
                default: "desktop",
            },
        },
        OptionRule {
            name: "openssl",
            oses: &[Os::Windows],
            kind: OptionKind::Choice {
                values: &["no", "yes", "linked"],
                default: "no",
            },
        },
        OptionRule {
            name: "framework",
            oses: &[Os::Macos],
            kind: OptionKind::Bool { default: false },
        },
    ],
    common_flags: &[
        "-opensource",
        "-confirm-license",
        "-nomake",
        "examples",
        "-nomake",
        "tests",
        "-silent",
    ],
    linux_platform_flags: &[],
    linux_skip_modules: &[],
    ssl_runtime_oses: &[],
    base_build_requires: &[],
    openssl_reference: "OpenSSL/1.0.2l@conan/stable",
    prefix_style: PrefixStyle::ConfigureFlag,
    build_tool: BuildTool::Make,
};

static QT515: RuleTable = RuleTable {
    options: &[
        OptionRule {
            name: "opengl",
            oses: &[Os::Windows, Os::Linux],
            kind: OptionKind::Choice {
                values: &["desktop", "dynamic"],
                default: "desktop",
            },
        },
        OptionRule {
            name: "openssl",
            oses: &[Os::Windows, Os::Linux],
            kind: OptionKind::Choice {
                values: &["no", "yes", "linked"],
                default: "no",
            },
        },
        OptionRule {
            name: "framework",
            oses: &[Os::Macos],
            kind: OptionKind::Bool { default: false },
        },
    ],
    common_flags: &[
        "-opensource",
        "-confirm-license",
        "-nomake",
        "examples",
        "-nomake",
        "tests",
        "-silent",
    ],
    linux_platform_flags: &["-platform", "linux-clang"],
    linux_skip_modules: &["qtwebengine"],
    ssl_runtime_oses: &[],
    base_build_requires: &[],
    openssl_reference: "openssl/1.1.1g",
    prefix_style: PrefixStyle::ConfigureFlag,
    build_tool: BuildTool::Make,
};

static QT62: RuleTable = RuleTable {
    options: &[
        OptionRule {
            name: "framework",
            oses: &[Os::Macos],
            kind: OptionKind::Bool { default: false },
        },
        OptionRule {
            name: "universal",
            oses: &[Os::Macos],
            kind: OptionKind::Bool { default: false },
        },
    ],
    common_flags: &[
        "-no-sql-mysql",
        "-no-sql-sqlite",
        "-no-dbus",
        "-nomake",
        "tests",
        "-nomake",
        "examples",
        "-opensource",
        "-confirm-license",
    ],
    linux_platform_flags: &["-no-opengl", "-platform", "linux-clang"],
    linux_skip_modules: &["qtdoc", "qttools", "qttranslations", "qtquick3d"],
    ssl_runtime_oses: &[Os::Windows, Os::Linux],
    base_build_requires: &["ninja/1.10.2"],
    openssl_reference: "openssl/1.1.1g",
    prefix_style: PrefixStyle::CmakeDefinitions,
    build_tool: BuildTool::Cmake,
};

/// Compilers the recipe accepts per platform.
pub fn supported_compilers(os: Os) -> &'static [&'static str] {
    match os {
        Os::Windows => &["Visual Studio"],
        Os::Macos => &["apple-clang"],
        Os::Linux => &["clang", "gcc"],
    }
}
