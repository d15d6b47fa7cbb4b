// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec configuration.
//!
//! Supports both programmatic and file-based configuration.
//!
//! ```toml
//! [limits]
//! max_depth = 128
//! max_vector_len = 1048576
//!
//! # Types published by an upgraded package resolve to the original package.
//! [[aliases]]
//! from = "0x6a1f"
//! to = "0x9bc2"
//! ```

use crate::types::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Default ceiling for type and value nesting.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Default ceiling for vector and string lengths.
pub const DEFAULT_MAX_VECTOR_LEN: usize = 1 << 20;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Resource ceilings applied while parsing and decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    /// Maximum nesting of type expressions and decoded values.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Maximum element count of a vector (bytes for strings).
    #[serde(default = "default_max_vector_len")]
    pub max_vector_len: usize,
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_max_vector_len() -> usize {
    DEFAULT_MAX_VECTOR_LEN
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_vector_len: DEFAULT_MAX_VECTOR_LEN,
        }
    }
}

/// Maps a historical package address onto its canonical address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageAlias {
    /// Address as it appears in observed type strings.
    pub from: String,
    /// Address every comparison is made against.
    pub to: String,
}

impl PackageAlias {
    /// Create a new alias.
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

/// Engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodecConfig {
    /// Depth and size ceilings.
    #[serde(default)]
    pub limits: Limits,

    /// Package-version aliases.
    #[serde(default)]
    pub aliases: Vec<PackageAlias>,
}

impl CodecConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Add an alias.
    pub fn with_alias(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.aliases.push(PackageAlias::new(from, to));
        self
    }

    /// Replace the limits.
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth must be at least 1".into()));
        }
        if self.limits.max_vector_len == 0 {
            return Err(ConfigError::Invalid(
                "max_vector_len must be at least 1".into(),
            ));
        }

        for (i, alias) in self.aliases.iter().enumerate() {
            let from = alias.from.parse::<Address>().map_err(|_| {
                ConfigError::Invalid(format!("Alias {} has invalid source '{}'", i, alias.from))
            })?;
            let to = alias.to.parse::<Address>().map_err(|_| {
                ConfigError::Invalid(format!("Alias {} has invalid target '{}'", i, alias.to))
            })?;
            if from == to {
                return Err(ConfigError::Invalid(format!(
                    "Alias {} maps {} onto itself",
                    i, alias.from
                )));
            }
        }

        Ok(())
    }
}
