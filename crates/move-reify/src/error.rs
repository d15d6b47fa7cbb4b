// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Error types for type resolution and codec operations.
//!
//! Every variant is terminal: a failure means malformed input or a schema
//! error, never a transient condition worth retrying.

use crate::config::ConfigError;
use thiserror::Error;

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, ReifyError>;

/// Errors produced while parsing, resolving, decoding or encoding.
#[derive(Debug, Error)]
pub enum ReifyError {
    #[error("malformed type '{input}' at byte {position}: {reason}")]
    MalformedType {
        input: String,
        position: usize,
        reason: String,
    },

    #[error("unknown type: {0}")]
    UnknownType(String),

    #[error("type {0} is already registered with a different declaration")]
    DuplicateRegistration(String),

    #[error("invalid declaration of {type_name}: {reason}")]
    InvalidDeclaration { type_name: String, reason: String },

    #[error("type {type_name} expects {expected} type arguments, got {found}")]
    ArityMismatch {
        type_name: String,
        expected: usize,
        found: usize,
    },

    #[error("type argument mismatch at position {position}: expected {expected}, observed {observed}")]
    ArgumentMismatch {
        position: usize,
        expected: String,
        observed: String,
    },

    #[error("truncated input at offset {offset}: need {need} bytes, have {have}")]
    TruncatedInput {
        offset: usize,
        need: usize,
        have: usize,
    },

    #[error("{remaining} trailing bytes after decoding {type_name}")]
    TrailingBytes { type_name: String, remaining: usize },

    #[error("invalid discriminant {index} for {type_name} ({variant_count} variants) at offset {offset}")]
    InvalidDiscriminant {
        type_name: String,
        index: u64,
        variant_count: usize,
        offset: usize,
    },

    #[error("type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    #[error("unknown variant '{variant}' for {type_name}")]
    UnknownVariant { type_name: String, variant: String },

    #[error("missing field '{field}' at '{path}'")]
    MissingField { path: String, field: String },

    #[error("invalid value at '{path}': {reason}")]
    InvalidValue { path: String, reason: String },

    #[error("nesting depth exceeds limit of {limit}")]
    DepthExceeded { limit: usize },

    #[error("length {actual} exceeds limit of {limit} at '{path}'")]
    SizeExceeded {
        path: String,
        limit: usize,
        actual: usize,
    },

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl ReifyError {
    pub(crate) fn malformed(input: &str, position: usize, reason: impl Into<String>) -> Self {
        Self::MalformedType {
            input: input.to_string(),
            position,
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid(path: &str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            path: display_path(path),
            reason: reason.into(),
        }
    }

    pub(crate) fn mismatch(path: &str, expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            path: display_path(path),
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Field paths are built as `a.b[2].c`; the root renders as `$`.
pub(crate) fn display_path(path: &str) -> String {
    if path.is_empty() {
        "$".to_string()
    } else {
        path.to_string()
    }
}
