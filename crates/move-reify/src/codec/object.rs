// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! On-chain object envelope.

use crate::error::{ReifyError, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Object data as fetched from a node: the full type string plus a BCS
/// payload, tagged JSON content, or both.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectData {
    #[serde(default)]
    pub object_id: Option<String>,

    /// Full instantiated type string as observed on chain.
    #[serde(rename = "type")]
    pub type_string: String,

    /// Base64 BCS payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bcs: Option<String>,

    /// Tagged JSON content (`{type, fields}`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<Value>,
}

impl ObjectData {
    /// Envelope carrying a BCS payload.
    pub fn with_bcs(type_string: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            object_id: None,
            type_string: type_string.into(),
            bcs: Some(STANDARD.encode(bytes)),
            content: None,
        }
    }

    /// Envelope carrying tagged JSON content.
    pub fn with_content(type_string: impl Into<String>, content: Value) -> Self {
        Self {
            object_id: None,
            type_string: type_string.into(),
            bcs: None,
            content: Some(content),
        }
    }

    /// Parse an envelope from JSON.
    pub fn from_json(json: &Value) -> Result<Self> {
        Self::deserialize(json)
            .map_err(|e| ReifyError::invalid("", format!("invalid object envelope: {}", e)))
    }

    /// Decoded BCS payload, if any.
    pub fn bcs_bytes(&self) -> Result<Option<Vec<u8>>> {
        self.bcs
            .as_deref()
            .map(|b64| {
                STANDARD
                    .decode(b64)
                    .map_err(|e| ReifyError::invalid("bcs", format!("invalid base64: {}", e)))
            })
            .transpose()
    }
}
