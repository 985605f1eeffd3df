//! Typed access to the CI environment.
//!
//! Every environment variable the driver reads is named here once, and
//! all reads go through [`CiEnv`] so tests can inject a fixed
//! environment instead of mutating the process.

use std::collections::BTreeMap;
use std::path::PathBuf;

use qtforge_recipe::{Arch, BuildType};

use crate::error::{MatrixError, MatrixResult};
use crate::remotes::{Credentials, Remote};

/// Environment variables the driver understands.
pub mod vars {
    /// Branch override, consulted before any CI-provided name.
    pub const BRANCH: &str = "QTFORGE_BRANCH";
    /// Branch names set by the CI systems we run on, in consult order.
    pub const CI_BRANCH_VARS: &[&str] =
        &["GITHUB_REF_NAME", "TRAVIS_BRANCH", "APPVEYOR_REPO_BRANCH"];
    /// Glob matched against the branch to pick the stable channel.
    pub const STABLE_BRANCH_PATTERN: &str = "CONAN_STABLE_BRANCH_PATTERN";
    pub const CHANNEL: &str = "CONAN_CHANNEL";
    pub const USERNAME: &str = "CONAN_USERNAME";
    pub const ARCHS: &str = "CONAN_ARCHS";
    pub const BUILD_TYPES: &str = "CONAN_BUILD_TYPES";
    pub const VISUAL_VERSIONS: &str = "CONAN_VISUAL_VERSIONS";
    pub const APPLE_CLANG_VERSIONS: &str = "CONAN_APPLE_CLANG_VERSIONS";
    /// macOS deployment targets; each variant is replicated per entry.
    pub const MACOS_VERSIONS: &str = "QT_MACOS_VERSIONS";
    /// Root of the OpenSSL installation configure links against.
    pub const OPENSSL_ROOT: &str = "QT_OPENSSL_ROOT";
    /// Comma-separated `url@verify_ssl@name` upload targets.
    pub const REMOTES: &str = "CONAN_REMOTES";
    pub const LOGIN_USERNAME: &str = "CONAN_LOGIN_USERNAME";
    pub const PASSWORD: &str = "CONAN_PASSWORD";
}

/// Snapshot of the environment the driver runs under.
#[derive(Debug, Clone, Default)]
pub struct CiEnv {
    vars: BTreeMap<String, String>,
}

impl CiEnv {
    /// Capture the real process environment.
    pub fn from_env() -> Self {
        CiEnv {
            vars: std::env::vars().collect(),
        }
    }

    /// Fixed environment for tests and embedding.
    pub fn from_map<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        CiEnv {
            vars: vars
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }

    /// A set-but-empty variable counts as unset.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn require(&self, name: &str) -> MatrixResult<&str> {
        self.get(name).ok_or_else(|| MatrixError::missing_env(name))
    }

    /// Comma-separated list, entries trimmed, empties dropped.
    pub fn list(&self, name: &str) -> Vec<String> {
        self.get(name)
            .map(|value| {
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|entry| !entry.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Like [`CiEnv::list`] but the variable must yield at least one entry.
    pub fn require_list(&self, name: &str) -> MatrixResult<Vec<String>> {
        let entries = self.list(name);
        if entries.is_empty() {
            return Err(MatrixError::missing_env(name));
        }
        Ok(entries)
    }

    /// Branch the run is building, from the override or the CI systems.
    pub fn branch(&self) -> Option<&str> {
        std::iter::once(vars::BRANCH)
            .chain(vars::CI_BRANCH_VARS.iter().copied())
            .find_map(|name| self.get(name))
    }

    pub fn username(&self) -> Option<&str> {
        self.get(vars::USERNAME)
    }

    pub fn channel_override(&self) -> Option<&str> {
        self.get(vars::CHANNEL)
    }

    pub fn stable_branch_pattern(&self) -> &str {
        self.get(vars::STABLE_BRANCH_PATTERN).unwrap_or("master")
    }

    pub fn archs(&self) -> MatrixResult<Vec<Arch>> {
        let entries = self.list(vars::ARCHS);
        if entries.is_empty() {
            return Ok(vec![Arch::X86_64]);
        }
        entries
            .iter()
            .map(|entry| {
                Arch::from_str(entry)
                    .ok_or_else(|| MatrixError::invalid_env_value(vars::ARCHS, entry))
            })
            .collect()
    }

    pub fn build_types(&self) -> MatrixResult<Vec<BuildType>> {
        let entries = self.list(vars::BUILD_TYPES);
        if entries.is_empty() {
            return Ok(BuildType::all().to_vec());
        }
        entries
            .iter()
            .map(|entry| {
                BuildType::from_str(entry)
                    .ok_or_else(|| MatrixError::invalid_env_value(vars::BUILD_TYPES, entry))
            })
            .collect()
    }

    pub fn macos_versions(&self) -> Vec<String> {
        self.list(vars::MACOS_VERSIONS)
    }

    pub fn openssl_root(&self) -> Option<PathBuf> {
        self.get(vars::OPENSSL_ROOT).map(PathBuf::from)
    }

    pub fn remotes(&self) -> MatrixResult<Vec<Remote>> {
        self.require(vars::REMOTES)?
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(Remote::parse)
            .collect()
    }

    /// Credentials for one remote.
    ///
    /// The password comes from `CONAN_PASSWORD_<NAME>` (name uppercased,
    /// dashes to underscores) or plain `CONAN_PASSWORD`. The login falls
    /// back the same way, then to `default_login`.
    pub fn credentials_for(
        &self,
        remote: &Remote,
        default_login: &str,
    ) -> MatrixResult<Credentials> {
        let key = remote.env_key();
        let password_var = format!("{}_{}", vars::PASSWORD, key);
        let password = self
            .get(&password_var)
            .or_else(|| self.get(vars::PASSWORD))
            .ok_or(MatrixError::MissingEnv(password_var))?;
        let login = self
            .get(&format!("{}_{}", vars::LOGIN_USERNAME, key))
            .or_else(|| self.get(vars::LOGIN_USERNAME))
            .unwrap_or(default_login);
        Ok(Credentials {
            login: login.to_string(),
            password: password.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_counts_as_unset() {
        let env = CiEnv::from_map([("CONAN_CHANNEL", "")]);
        assert_eq!(env.channel_override(), None);
        assert!(env.require("CONAN_CHANNEL").is_err());
    }

    #[test]
    fn test_list_trims_and_drops_empties() {
        let env = CiEnv::from_map([(vars::MACOS_VERSIONS, " 10.14, 10.15 ,,11.0 ")]);
        assert_eq!(env.macos_versions(), vec!["10.14", "10.15", "11.0"]);
    }

    #[test]
    fn test_branch_consult_order() {
        let env = CiEnv::from_map([
            ("TRAVIS_BRANCH", "travis"),
            ("QTFORGE_BRANCH", "override"),
            ("GITHUB_REF_NAME", "github"),
        ]);
        assert_eq!(env.branch(), Some("override"));

        let env = CiEnv::from_map([
            ("TRAVIS_BRANCH", "travis"),
            ("GITHUB_REF_NAME", "github"),
        ]);
        assert_eq!(env.branch(), Some("github"));

        let env = CiEnv::from_map([("APPVEYOR_REPO_BRANCH", "appveyor")]);
        assert_eq!(env.branch(), Some("appveyor"));

        assert_eq!(CiEnv::default().branch(), None);
    }

    #[test]
    fn test_archs_default_and_parse() {
        assert_eq!(CiEnv::default().archs().unwrap(), vec![Arch::X86_64]);

        let env = CiEnv::from_map([(vars::ARCHS, "x86_64,armv8")]);
        assert_eq!(env.archs().unwrap(), vec![Arch::X86_64, Arch::Armv8]);

        let env = CiEnv::from_map([(vars::ARCHS, "sparc")]);
        assert!(matches!(
            env.archs(),
            Err(MatrixError::InvalidEnvValue { .. })
        ));
    }

    #[test]
    fn test_build_types_default_covers_both() {
        assert_eq!(
            CiEnv::default().build_types().unwrap(),
            vec![BuildType::Release, BuildType::Debug]
        );

        let env = CiEnv::from_map([(vars::BUILD_TYPES, "release")]);
        assert_eq!(env.build_types().unwrap(), vec![BuildType::Release]);
    }

    #[test]
    fn test_credentials_per_remote_key() {
        let remote = Remote {
            url: "https://api.example.com".to_string(),
            verify_ssl: true,
            name: "my-remote".to_string(),
        };
        let env = CiEnv::from_map([
            ("CONAN_PASSWORD_MY_REMOTE", "sekrit"),
            ("CONAN_LOGIN_USERNAME", "shared-login"),
        ]);
        let credentials = env.credentials_for(&remote, "amusic").unwrap();
        assert_eq!(credentials.password, "sekrit");
        assert_eq!(credentials.login, "shared-login");
    }

    #[test]
    fn test_credentials_fall_back_to_default_login() {
        let remote = Remote {
            url: "https://api.example.com".to_string(),
            verify_ssl: true,
            name: "origin".to_string(),
        };
        let env = CiEnv::from_map([("CONAN_PASSWORD", "sekrit")]);
        let credentials = env.credentials_for(&remote, "amusic").unwrap();
        assert_eq!(credentials.login, "amusic");

        let missing = env.credentials_for(
            &Remote {
                url: "https://other.example.com".to_string(),
                verify_ssl: true,
                name: "other".to_string(),
            },
            "amusic",
        );
        assert!(missing.is_ok(), "plain CONAN_PASSWORD applies to every remote");

        let err = CiEnv::default()
            .credentials_for(&remote, "amusic")
            .unwrap_err();
        assert!(matches!(err, MatrixError::MissingEnv(name) if name == "CONAN_PASSWORD_ORIGIN"));
    }
}
