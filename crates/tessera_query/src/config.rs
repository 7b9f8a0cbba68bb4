//! # Query Configuration
//!
//! Loaded once at startup from TOML:
//!
//! ```toml
//! validation = "strict"
//! reuse_all_results_for_any = true
//! local_cache = true
//! chunk_capacity = 256
//! ```
//!
//! Every key is optional; unknown keys are rejected.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{BuildResult, QueryError};
use tessera_core::DEFAULT_CHUNK_CAPACITY;

/// How query construction treats entries it cannot use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Validation {
    /// Drop them and log a warning.
    #[default]
    Lenient,
    /// Fail construction with [`QueryError::UnrecognizedEntry`].
    Strict,
}

/// Tuning knobs for queries and the world that runs them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueryConfig {
    /// Treatment of unusable constraint entries by `try_build`.
    pub validation: Validation,
    /// Let an Any check pass when the same key is already known to pass as All.
    pub reuse_all_results_for_any: bool,
    /// Keep a per-query archetype -> verdict map in front of the shared cache.
    pub local_cache: bool,
    /// Entities per chunk for archetypes created by a `World`.
    pub chunk_capacity: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            validation: Validation::Lenient,
            reuse_all_results_for_any: true,
            local_cache: true,
            chunk_capacity: DEFAULT_CHUNK_CAPACITY,
        }
    }
}

impl QueryConfig {
    /// Strict validation, everything else default.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            validation: Validation::Strict,
            ..Self::default()
        }
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Config`] on malformed TOML, unknown keys, or a
    /// zero chunk capacity.
    pub fn from_toml_str(text: &str) -> BuildResult<Self> {
        let config: Self = toml::from_str(text).map_err(|e| QueryError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Io`] if the file cannot be read, otherwise as
    /// [`QueryConfig::from_toml_str`].
    pub fn from_toml_file(path: impl AsRef<Path>) -> BuildResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| QueryError::Io(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Rejects values no world can run with.
    pub(crate) fn validate(&self) -> BuildResult<()> {
        if self.chunk_capacity == 0 {
            return Err(QueryError::Config(
                "chunk_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
