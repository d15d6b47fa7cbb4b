// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reified codecs.
//!
//! A [`Reified`] pairs a resolved [`TypeDescriptor`] with the registry that
//! produced it and exposes every wire form:
//!
//! - BCS binary ([`Reified::decode_binary`], [`Reified::encode_binary`])
//! - tagged node JSON ([`Reified::decode_tagged`])
//! - canonical plain JSON ([`Reified::decode_plain`], [`Reified::encode_json`])
//! - object envelopes ([`Reified::from_object`])

mod bcs;
pub mod descriptor;
mod json;
mod object;
mod schema;
mod tagged;

pub use descriptor::{FieldLayout, Layout, StringKind, TypeDescriptor, VariantLayout};
pub use object::ObjectData;
pub use schema::Schema;

use crate::error::{ReifyError, Result};
use crate::registry::TypeRegistry;
use crate::value::DecodedValue;
use serde_json::Value;
use std::sync::Arc;

/// A resolved type bound to its registry.
#[derive(Debug, Clone)]
pub struct Reified<'r> {
    registry: &'r TypeRegistry,
    descriptor: Arc<TypeDescriptor>,
}

impl<'r> Reified<'r> {
    pub(crate) fn new(registry: &'r TypeRegistry, descriptor: Arc<TypeDescriptor>) -> Self {
        Self {
            registry,
            descriptor,
        }
    }

    /// The underlying descriptor.
    pub fn descriptor(&self) -> &Arc<TypeDescriptor> {
        &self.descriptor
    }

    /// Uninstantiated canonical name.
    pub fn type_name(&self) -> &str {
        self.descriptor.type_name()
    }

    /// Full canonical type string, phantom arguments included.
    pub fn type_string(&self) -> &str {
        self.descriptor.type_string()
    }

    /// Type argument strings.
    pub fn type_args(&self) -> Vec<String> {
        self.descriptor.type_arg_strings()
    }

    /// Per-argument phantom flags.
    pub fn is_phantom(&self) -> &[bool] {
        self.descriptor.is_phantom()
    }

    /// Decode BCS bytes. Every byte must be consumed.
    pub fn decode_binary(&self, bytes: &[u8]) -> Result<DecodedValue> {
        bcs::decode(self.registry, &self.descriptor, bytes)
    }

    /// Encode to BCS bytes.
    pub fn encode_binary(&self, value: &DecodedValue) -> Result<Vec<u8>> {
        bcs::encode(self.registry, &self.descriptor, value)
    }

    /// Decode node RPC JSON (`{type, fields}` at every level).
    pub fn decode_tagged(&self, json: &Value) -> Result<DecodedValue> {
        tagged::decode(self.registry, &self.descriptor, json)
    }

    /// Decode canonical JSON (`$typeName`/`$typeArgs` at the root only).
    pub fn decode_plain(&self, json: &Value) -> Result<DecodedValue> {
        json::decode(self.registry, &self.descriptor, json)
    }

    /// Encode to canonical JSON.
    pub fn encode_json(&self, value: &DecodedValue) -> Result<Value> {
        json::encode(self.registry, &self.descriptor, value)
    }

    /// Binary layout description.
    pub fn schema(&self) -> Result<Schema> {
        schema::build(self.registry, &self.descriptor)
    }

    /// Whether `type_string` names exactly this instantiation after
    /// normalisation. Unparsable strings never match.
    pub fn matches(&self, type_string: &str) -> bool {
        self.registry
            .parse(type_string)
            .map(|expr| self.registry.aliases().canonicalize(&expr).to_string())
            .is_ok_and(|canonical| canonical == self.type_string())
    }

    /// Check an observed type string against this instantiation.
    ///
    /// A different head is `TypeMismatch`; differing arguments are reported
    /// at the first mismatching position.
    pub fn check_type(&self, observed: &str) -> Result<()> {
        check_observed_type(self.registry, &self.descriptor, observed, "")
    }

    /// Decode an object envelope, preferring its BCS payload.
    pub fn from_object(&self, object: &ObjectData) -> Result<DecodedValue> {
        self.check_type(&object.type_string)?;
        if let Some(bytes) = object.bcs_bytes()? {
            log::trace!(
                "[Reified] Decoding {} bytes of {}",
                bytes.len(),
                self.type_string()
            );
            return self.decode_binary(&bytes);
        }
        match &object.content {
            Some(content) => self.decode_tagged(content),
            None => Err(ReifyError::MissingField {
                path: "$".into(),
                field: "bcs".into(),
            }),
        }
    }

    /// [`Reified::from_object`] on raw JSON.
    pub fn from_object_json(&self, json: &Value) -> Result<DecodedValue> {
        self.from_object(&ObjectData::from_json(json)?)
    }
}

pub(crate) fn field_path(path: &str, field: &str) -> String {
    if path.is_empty() {
        field.to_string()
    } else {
        format!("{}.{}", path, field)
    }
}

pub(crate) fn index_path(path: &str, index: usize) -> String {
    format!("{}[{}]", path, index)
}

/// Compare `observed` (any spelling) against `descriptor`.
pub(crate) fn check_observed_type(
    registry: &TypeRegistry,
    descriptor: &TypeDescriptor,
    observed: &str,
    path: &str,
) -> Result<()> {
    let expr = registry.aliases().canonicalize(&registry.parse(observed)?);
    if expr.base_name() != descriptor.type_name() {
        return Err(ReifyError::mismatch(
            path,
            descriptor.type_string(),
            expr.to_string(),
        ));
    }
    let observed_args: Vec<String> = expr.type_args().iter().map(ToString::to_string).collect();
    check_type_args(descriptor, &observed_args)
}

/// Compare canonical argument strings position by position.
pub(crate) fn check_type_args(descriptor: &TypeDescriptor, observed: &[String]) -> Result<()> {
    let expected = descriptor.type_args();
    if expected.len() != observed.len() {
        return Err(ReifyError::ArityMismatch {
            type_name: descriptor.type_name().to_string(),
            expected: expected.len(),
            found: observed.len(),
        });
    }
    for (position, (exp, obs)) in expected.iter().zip(observed).enumerate() {
        if exp.type_string() != obs {
            return Err(ReifyError::ArgumentMismatch {
                position,
                expected: exp.type_string().to_string(),
                observed: obs.clone(),
            });
        }
    }
    Ok(())
}

/// JSON kind name, used in mismatch errors.
pub(crate) fn json_kind(json: &Value) -> &'static str {
    match json {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
