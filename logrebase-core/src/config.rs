//! Resolver and planner settings, read from TOML.

use serde::Deserialize;
use std::path::Path;

/// Subject prefixes git's `--autosquash` acts on. Always rejected.
pub const AUTOSQUASH_MARKERS: [&str; 2] = ["fixup!", "squash!"];

/// What to do when the walk reaches a commit without parents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RootPolicy {
    /// Treat a root like a merge: the walk is rejected.
    #[default]
    Reject,
    /// Accept a root when it is the target itself.
    Accept,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ResolverConfig {
    pub root_policy: RootPolicy,
    /// Subject prefixes rejected on top of [`AUTOSQUASH_MARKERS`]
    #[serde(alias = "autosquash_prefixes")]
    pub extra_autosquash_prefixes: Vec<String>,
    /// Plan through a revision walk when the commit graph can't be used
    pub fallback: bool,
    /// Maximum number of commits loaded into the graph
    pub graph_limit: Option<usize>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            root_policy: RootPolicy::default(),
            extra_autosquash_prefixes: Vec::new(),
            fallback: true,
            graph_limit: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

impl ResolverConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&text)
    }

    /// Whether `subject` starts with an autosquash marker or one of the
    /// configured extra prefixes
    pub fn is_autosquash(&self, subject: &str) -> bool {
        AUTOSQUASH_MARKERS.iter().any(|marker| subject.starts_with(marker))
            || self
                .extra_autosquash_prefixes
                .iter()
                .any(|prefix| subject.starts_with(prefix.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ResolverConfig::from_toml_str("").unwrap();
        assert_eq!(config, ResolverConfig::default());
        assert_eq!(config.root_policy, RootPolicy::Reject);
        assert!(config.fallback);
        assert!(config.is_autosquash("fixup! Fix bug"));
        assert!(config.is_autosquash("squash! Fix bug"));
        assert!(!config.is_autosquash("amend! Fix bug"));
        assert!(!config.is_autosquash("Fix fixup! handling"));
    }

    #[test]
    fn test_overrides() {
        let config = ResolverConfig::from_toml_str(
            r#"
root_policy = "accept"
extra_autosquash_prefixes = ["amend!"]
fallback = false
graph_limit = 5000
"#,
        )
        .unwrap();

        assert_eq!(config.root_policy, RootPolicy::Accept);
        assert!(config.is_autosquash("amend! Fix bug"));
        assert!(config.is_autosquash("fixup! Fix bug"));
        assert!(!config.fallback);
        assert_eq!(config.graph_limit, Some(5000));
    }

    #[test]
    fn test_empty_prefix_list_keeps_markers() {
        let config = ResolverConfig::from_toml_str("autosquash_prefixes = []").unwrap();
        assert!(config.extra_autosquash_prefixes.is_empty());
        assert!(config.is_autosquash("fixup! Fix bug"));
        assert!(config.is_autosquash("squash! Fix bug"));
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let err = ResolverConfig::from_toml_str("roots = true").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = ResolverConfig::load(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
