//! Conversion limits.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bounds applied to every conversion run through a [`Context`].
///
/// [`Context`]: crate::engine::Context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Deepest nesting of composite values accepted in either direction.
    pub max_depth: usize,
    /// Let every format ignore option keys it does not declare.
    pub allow_extra_options: bool,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: 200,
            allow_extra_options: false,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid limits: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("max_depth must be at least 1")]
    ZeroDepth,
}

impl Limits {
    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        let limits: Limits = serde_json::from_str(text)?;
        if limits.max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        Ok(limits)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_keys_take_defaults() {
        let limits = Limits::from_json(r#"{"max_depth": 8}"#).unwrap();
        assert_eq!(limits.max_depth, 8);
        assert!(!limits.allow_extra_options);
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(matches!(
            Limits::from_json(r#"{"max_depth": 0}"#),
            Err(ConfigError::ZeroDepth)
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"allow_extra_options": true}}"#).unwrap();
        let limits = Limits::load(file.path()).unwrap();
        assert!(limits.allow_extra_options);
        assert_eq!(limits.max_depth, Limits::default().max_depth);
    }

    #[test]
    fn test_load_missing_file() {
        let err = Limits::load("/nonexistent/limits.json").unwrap_err();
        assert!(err.to_string().starts_with("failed to read /nonexistent/limits.json"));
    }
}
