use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default maximum number of boolean clauses a parsed query may expand to.
pub const DEFAULT_MAX_CLAUSES: usize = 2048;

/// Boolean operator applied between bare query terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DefaultOperator {
    #[default]
    Or,
    And,
}

/// Search configuration, read once at startup and passed into the executor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Directory holding the on-disk index.
    pub index_dir: PathBuf,

    /// Default boolean operator between bare terms.
    #[serde(default)]
    pub default_operator: DefaultOperator,

    /// Maximum boolean-clause count before a query is rejected as too broad.
    #[serde(default = "default_max_clauses")]
    pub max_clauses: usize,
}

fn default_max_clauses() -> usize {
    DEFAULT_MAX_CLAUSES
}

impl SearchConfig {
    /// Create a configuration with defaults for everything but the index location.
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            default_operator: DefaultOperator::default(),
            max_clauses: DEFAULT_MAX_CLAUSES,
        }
    }

    /// Load a configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SearchConfig::new("/tmp/index");
        assert_eq!(config.default_operator, DefaultOperator::Or);
        assert_eq!(config.max_clauses, DEFAULT_MAX_CLAUSES);
    }

    #[test]
    fn test_from_json() {
        let config: SearchConfig =
            serde_json::from_str(r#"{"index_dir": "/var/index", "default_operator": "AND"}"#)
                .unwrap();
        assert_eq!(config.index_dir, PathBuf::from("/var/index"));
        assert_eq!(config.default_operator, DefaultOperator::And);
        assert_eq!(config.max_clauses, DEFAULT_MAX_CLAUSES);
    }
}
