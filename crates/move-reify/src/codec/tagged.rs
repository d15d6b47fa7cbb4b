// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Tagged JSON as returned by node RPC.
//!
//! Every struct is `{ "type": "<full type>", "fields": { ... } }` with
//! snake_case field names; enums add `"variant"`. An embedded `type` is
//! checked against the expected instantiation.

use crate::codec::descriptor::{FieldLayout, Layout, TypeDescriptor, OPTION_TYPE};
use crate::codec::json::{decode_string, primitive_from_json};
use crate::codec::{check_observed_type, field_path, index_path, json_kind};
use crate::config::Limits;
use crate::error::{display_path, ReifyError, Result};
use crate::registry::TypeRegistry;
use crate::value::{DecodedValue, Fields};
use serde_json::{Map, Value};

const TYPE_KEY: &str = "type";
const FIELDS_KEY: &str = "fields";
const VARIANT_KEY: &str = "variant";
const OPTION_VEC_KEY: &str = "vec";

/// Decode tagged JSON as `descriptor`.
pub(crate) fn decode(
    registry: &TypeRegistry,
    descriptor: &TypeDescriptor,
    json: &Value,
) -> Result<DecodedValue> {
    let mut decoder = TaggedDecoder {
        registry,
        limits: registry.limits(),
        depth: 0,
    };
    decoder.decode_value(descriptor, json, "")
}

fn missing(path: &str, field: &str) -> ReifyError {
    ReifyError::MissingField {
        path: display_path(path),
        field: field.to_string(),
    }
}

struct TaggedDecoder<'a> {
    registry: &'a TypeRegistry,
    limits: Limits,
    depth: usize,
}

impl TaggedDecoder<'_> {
    fn decode_value(
        &mut self,
        desc: &TypeDescriptor,
        json: &Value,
        path: &str,
    ) -> Result<DecodedValue> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(ReifyError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        let value = self.decode_layout(desc, json, path)?;
        self.depth -= 1;
        Ok(value)
    }

    fn decode_layout(
        &mut self,
        desc: &TypeDescriptor,
        json: &Value,
        path: &str,
    ) -> Result<DecodedValue> {
        match desc.layout() {
            Layout::Primitive(p) => primitive_from_json(*p, json, path),
            Layout::Vector(elem) => {
                let items = json
                    .as_array()
                    .ok_or_else(|| ReifyError::mismatch(path, desc.type_string(), json_kind(json)))?;
                self.decode_items(elem, items, path).map(DecodedValue::Vector)
            }
            Layout::Option(elem) => self.decode_option(desc, elem, json, path),
            Layout::String(kind) => decode_string(*kind, json, path, &self.limits),
            Layout::Struct(layout) => {
                let obj = self.tagged_object(desc, json, path)?;
                let fields = match obj.get(FIELDS_KEY) {
                    Some(Value::Object(fields)) => fields,
                    Some(other) => {
                        return Err(ReifyError::mismatch(path, "object", json_kind(other)))
                    }
                    None => return Err(missing(path, FIELDS_KEY)),
                };
                Ok(DecodedValue::Struct(self.decode_fields(layout, fields, path)?))
            }
            Layout::Enum(variants) => {
                let obj = self.tagged_object(desc, json, path)?;
                let name = obj
                    .get(VARIANT_KEY)
                    .ok_or_else(|| missing(path, VARIANT_KEY))?
                    .as_str()
                    .ok_or_else(|| ReifyError::invalid(path, "variant must be a string"))?;
                let variant = variants.iter().find(|v| v.name == name).ok_or_else(|| {
                    ReifyError::UnknownVariant {
                        type_name: desc.type_string().to_string(),
                        variant: name.to_string(),
                    }
                })?;
                let empty = Map::new();
                let fields = match obj.get(FIELDS_KEY) {
                    Some(Value::Object(fields)) => fields,
                    None | Some(Value::Null) => &empty,
                    Some(other) => {
                        return Err(ReifyError::mismatch(path, "object", json_kind(other)))
                    }
                };
                Ok(DecodedValue::Variant {
                    name: variant.name.clone(),
                    fields: self.decode_fields(&variant.fields, fields, path)?,
                })
            }
            Layout::Phantom => Err(ReifyError::invalid(
                path,
                format!("phantom type {} has no layout", desc.type_string()),
            )),
        }
    }

    /// The object form of a struct or enum, with its embedded type checked.
    fn tagged_object<'j>(
        &self,
        desc: &TypeDescriptor,
        json: &'j Value,
        path: &str,
    ) -> Result<&'j Map<String, Value>> {
        let obj = json
            .as_object()
            .ok_or_else(|| ReifyError::mismatch(path, desc.type_string(), json_kind(json)))?;
        if let Some(observed) = obj.get(TYPE_KEY) {
            let observed = observed
                .as_str()
                .ok_or_else(|| ReifyError::invalid(path, "type must be a string"))?;
            check_observed_type(self.registry, desc, observed, path)?;
        }
        Ok(obj)
    }

    fn decode_items(
        &mut self,
        elem: &TypeDescriptor,
        items: &[Value],
        path: &str,
    ) -> Result<Vec<DecodedValue>> {
        if items.len() > self.limits.max_vector_len {
            return Err(ReifyError::SizeExceeded {
                path: display_path(path),
                limit: self.limits.max_vector_len,
                actual: items.len(),
            });
        }
        let mut out = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            out.push(self.decode_value(elem, item, &index_path(path, i))?);
        }
        Ok(out)
    }

    /// `null`, the bare inner value, or `{type: Option<..>, fields: {vec: [..]}}`.
    fn decode_option(
        &mut self,
        desc: &TypeDescriptor,
        elem: &TypeDescriptor,
        json: &Value,
        path: &str,
    ) -> Result<DecodedValue> {
        if json.is_null() {
            return Ok(DecodedValue::absent());
        }
        if let Some(vec) = self.option_vec(desc, json, path)? {
            let mut items = self.decode_items(elem, vec, path)?;
            return match items.len() {
                0 => Ok(DecodedValue::absent()),
                1 => Ok(DecodedValue::some(items.remove(0))),
                n => Err(ReifyError::invalid(
                    path,
                    format!("option holds {} elements", n),
                )),
            };
        }
        Ok(DecodedValue::some(self.decode_value(elem, json, path)?))
    }

    fn option_vec<'j>(
        &self,
        desc: &TypeDescriptor,
        json: &'j Value,
        path: &str,
    ) -> Result<Option<&'j Vec<Value>>> {
        let Some(obj) = json.as_object() else {
            return Ok(None);
        };
        let Some(observed) = obj.get(TYPE_KEY).and_then(Value::as_str) else {
            return Ok(None);
        };
        let expr = self.registry.parse(observed)?;
        if expr.base_name() != OPTION_TYPE {
            return Ok(None);
        }
        check_observed_type(self.registry, desc, observed, path)?;
        obj.get(FIELDS_KEY)
            .and_then(|f| f.get(OPTION_VEC_KEY))
            .and_then(Value::as_array)
            .map(Some)
            .ok_or_else(|| missing(path, "fields.vec"))
    }

    fn decode_fields(
        &mut self,
        layout: &[FieldLayout],
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<Fields> {
        let mut fields = Fields::new();
        for field in layout {
            let json = obj.get(&field.name).ok_or_else(|| missing(path, &field.name))?;
            let desc = self.registry.resolve_canonical(&field.ty)?;
            let value = self.decode_value(&desc, json, &field_path(path, &field.name))?;
            fields.insert(field.name.clone(), value);
        }
        Ok(fields)
    }
}
