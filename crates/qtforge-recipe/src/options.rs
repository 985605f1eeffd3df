//! Option values, option sets, and the package requirements they induce.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Value of a single recipe option.
///
/// Options are either boolean switches (framework, universal) or
/// closed string choices (opengl, openssl).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Str(String),
}

impl OptionValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            OptionValue::Bool(value) => Some(*value),
            OptionValue::Str(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            OptionValue::Bool(_) => None,
            OptionValue::Str(value) => Some(value),
        }
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        OptionValue::Bool(value)
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        OptionValue::Str(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        OptionValue::Str(value)
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            // conan spells booleans True/False in package metadata
            OptionValue::Bool(true) => write!(f, "True"),
            OptionValue::Bool(false) => write!(f, "False"),
            OptionValue::Str(value) => write!(f, "{value}"),
        }
    }
}

/// Named option values, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet(BTreeMap<String, OptionValue>);

impl OptionSet {
    pub fn new() -> Self {
        OptionSet(BTreeMap::new())
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<OptionValue>) {
        self.0.insert(name.into(), value.into());
    }

    /// Builder-style insert for literals in tests and defaults.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.set(name, value);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.0.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn bool_value(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(OptionValue::as_bool)
    }

    pub fn str_value(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(OptionValue::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (name, value) in self.iter() {
            if !first {
                write!(f, " ")?;
            }
            write!(f, "{name}={value}")?;
            first = false;
        }
        Ok(())
    }
}

/// When a required package must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequirementKind {
    /// Needed while building Qt, not linked into it.
    BuildTime,
    /// Linked into the produced libraries.
    LinkTime,
}

impl RequirementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequirementKind::BuildTime => "build-time",
            RequirementKind::LinkTime => "link-time",
        }
    }
}

impl fmt::Display for RequirementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A package this variant depends on, with options forced downstream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// Package reference, e.g. `openssl/1.1.1g`.
    pub reference: String,
    pub kind: RequirementKind,
    /// Option assignments propagated to the dependency.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub options: Vec<(String, String)>,
}

impl Requirement {
    pub fn build_time(reference: impl Into<String>) -> Self {
        Requirement {
            reference: reference.into(),
            kind: RequirementKind::BuildTime,
            options: Vec::new(),
        }
    }

    pub fn link_time(reference: impl Into<String>) -> Self {
        Requirement {
            reference: reference.into(),
            kind: RequirementKind::LinkTime,
            options: Vec::new(),
        }
    }

    pub fn with_option(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.options.push((name.into(), value.into()));
        self
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.reference, self.kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_option_value_display() {
        assert_eq!(OptionValue::Bool(true).to_string(), "True");
        assert_eq!(OptionValue::Bool(false).to_string(), "False");
        assert_eq!(OptionValue::from("dynamic").to_string(), "dynamic");
    }

    #[test]
    fn test_option_set_accessors() {
        let options = OptionSet::new()
            .with("framework", false)
            .with("opengl", "desktop");
        assert_eq!(options.bool_value("framework"), Some(false));
        assert_eq!(options.str_value("opengl"), Some("desktop"));
        assert_eq!(options.bool_value("opengl"), None);
        assert!(!options.contains("openssl"));
        assert_eq!(options.len(), 2);
    }

    #[test]
    fn test_option_set_is_ordered_by_name() {
        let options = OptionSet::new()
            .with("universal", true)
            .with("framework", false);
        let names: Vec<&str> = options.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["framework", "universal"]);
        assert_eq!(options.to_string(), "framework=False universal=True");
    }

    #[test]
    fn test_option_set_from_toml() {
        let options: OptionSet = toml::from_str(
            r#"
            opengl = "dynamic"
            framework = false
            "#,
        )
        .unwrap();
        assert_eq!(options.str_value("opengl"), Some("dynamic"));
        assert_eq!(options.bool_value("framework"), Some(false));
    }

    #[test]
    fn test_requirement_builders() {
        let requirement = Requirement::link_time("openssl/1.1.1g")
            .with_option("shared", "True")
            .with_option("no_zlib", "True");
        assert_eq!(requirement.kind, RequirementKind::LinkTime);
        assert_eq!(requirement.options.len(), 2);
        assert_eq!(requirement.to_string(), "openssl/1.1.1g (link-time)");
    }
}
