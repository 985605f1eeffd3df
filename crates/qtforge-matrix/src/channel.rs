//! Channel resolution from branch names.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::env::CiEnv;
use crate::error::{MatrixError, MatrixResult};

/// Publishing channel of a package reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Stable,
    Testing,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Stable => "stable",
            Channel::Testing => "testing",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> MatrixResult<Channel> {
        match s.to_ascii_lowercase().as_str() {
            "stable" => Ok(Channel::Stable),
            "testing" => Ok(Channel::Testing),
            _ => Err(MatrixError::InvalidChannel(s.to_string())),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Channel a branch publishes to: stable when the branch matches the
/// pattern, testing otherwise.
pub fn resolve_channel(branch: &str, stable_pattern: &str) -> MatrixResult<Channel> {
    let regex = glob_to_regex(stable_pattern)?;
    if regex.is_match(branch) {
        Ok(Channel::Stable)
    } else {
        Ok(Channel::Testing)
    }
}

/// Effective channel for a CI run.
///
/// A branch matching the stable pattern always wins. Otherwise an
/// explicit CONAN_CHANNEL override applies, and the final fallback is
/// testing. Without a branch, the override must be present.
pub fn effective_channel(env: &CiEnv) -> MatrixResult<Channel> {
    if let Some(branch) = env.branch() {
        if resolve_channel(branch, env.stable_branch_pattern())? == Channel::Stable {
            return Ok(Channel::Stable);
        }
        return match env.channel_override() {
            Some(value) => Channel::from_str(value),
            None => Ok(Channel::Testing),
        };
    }
    match env.channel_override() {
        Some(value) => Channel::from_str(value),
        None => Err(MatrixError::BranchUnknown),
    }
}

/// Translate a shell-style glob into an anchored regex. `*` matches any
/// run of characters, `?` a single character, everything else is
/// literal.
fn glob_to_regex(pattern: &str) -> MatrixResult<Regex> {
    let mut expr = String::with_capacity(pattern.len() + 8);
    expr.push('^');
    for c in pattern.chars() {
        match c {
            '*' => expr.push_str(".*"),
            '?' => expr.push('.'),
            c => expr.push_str(&regex::escape(&c.to_string())),
        }
    }
    expr.push('$');
    Regex::new(&expr).map_err(|err| MatrixError::InvalidBranchPattern {
        pattern: pattern.to_string(),
        reason: err.to_string(),
    })
}
