//! Package identity and reference formatting.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Who a built package belongs to, minus the channel.
///
/// The channel is decided per CI run, so it stays a parameter of
/// [`PackageIdentity::reference`] instead of a field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageIdentity {
    pub name: String,
    pub version: semver::Version,
    pub user: String,
}

impl PackageIdentity {
    pub fn new(name: impl Into<String>, version: semver::Version, user: impl Into<String>) -> Self {
        PackageIdentity {
            name: name.into(),
            version,
            user: user.into(),
        }
    }

    /// Replace the publishing account, e.g. from a CI override.
    pub fn with_user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Full package reference: `name/version@user/channel`.
    pub fn reference(&self, channel: &str) -> String {
        format!("{}/{}@{}/{}", self.name, self.version, self.user, channel)
    }
}

impl fmt::Display for PackageIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.name, self.version, self.user)
    }
}
