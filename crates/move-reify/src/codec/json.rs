// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Canonical (plain) JSON.
//!
//! Only the root object carries `$typeName` and `$typeArgs`; nested values
//! are positional and keyed by camelCase field names. Enums add `$kind`.
//! Integers of 64 bits and wider travel as decimal strings. An option is
//! `null` or its value, except that an option whose element is itself an
//! option is written as a 0/1-element array.

use crate::codec::descriptor::{FieldLayout, Layout, StringKind, TypeDescriptor};
use crate::codec::{check_observed_type, check_type_args, field_path, index_path, json_kind};
use crate::config::Limits;
use crate::error::{display_path, ReifyError, Result};
use crate::registry::TypeRegistry;
use crate::types::{Address, Primitive};
use crate::value::{DecodedValue, Fields, U256};
use serde_json::{Map, Value};

pub(crate) const TYPE_NAME_KEY: &str = "$typeName";
pub(crate) const TYPE_ARGS_KEY: &str = "$typeArgs";
pub(crate) const KIND_KEY: &str = "$kind";

/// Encode `value` as canonical JSON.
pub(crate) fn encode(
    registry: &TypeRegistry,
    descriptor: &TypeDescriptor,
    value: &DecodedValue,
) -> Result<Value> {
    let mut encoder = JsonEncoder {
        registry,
        limits: registry.limits(),
        depth: 0,
    };
    let mut json = encoder.encode_value(value, descriptor, "")?;

    if let Value::Object(map) = &mut json {
        if descriptor.is_datatype() {
            let mut root = Map::new();
            root.insert(
                TYPE_NAME_KEY.into(),
                Value::String(descriptor.type_name().to_string()),
            );
            root.insert(
                TYPE_ARGS_KEY.into(),
                Value::Array(
                    descriptor
                        .type_arg_strings()
                        .into_iter()
                        .map(Value::String)
                        .collect(),
                ),
            );
            root.append(map);
            return Ok(Value::Object(root));
        }
    }
    Ok(json)
}

/// Decode canonical JSON produced by [`encode`] (or an equivalent writer).
pub(crate) fn decode(
    registry: &TypeRegistry,
    descriptor: &TypeDescriptor,
    json: &Value,
) -> Result<DecodedValue> {
    if descriptor.is_datatype() {
        check_root_tag(registry, descriptor, json)?;
    }
    let mut decoder = JsonDecoder {
        registry,
        limits: registry.limits(),
        depth: 0,
    };
    decoder.decode_value(descriptor, json, "")
}

fn check_root_tag(registry: &TypeRegistry, descriptor: &TypeDescriptor, json: &Value) -> Result<()> {
    let obj = json
        .as_object()
        .ok_or_else(|| ReifyError::mismatch("", descriptor.type_string(), json_kind(json)))?;

    let type_name = obj
        .get(TYPE_NAME_KEY)
        .ok_or_else(|| missing("", TYPE_NAME_KEY))?
        .as_str()
        .ok_or_else(|| ReifyError::invalid("", "$typeName must be a string"))?;

    let args = match obj.get(TYPE_ARGS_KEY) {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| {
                let s = item
                    .as_str()
                    .ok_or_else(|| ReifyError::invalid("", "$typeArgs entries must be strings"))?;
                registry.compress(s)
            })
            .collect::<Result<Vec<_>>>()?,
        Some(other) => {
            return Err(ReifyError::invalid(
                "",
                format!("$typeArgs must be an array, found {}", json_kind(other)),
            ))
        }
    };

    // `$typeName` is uninstantiated; compare heads, then arguments.
    check_observed_type(registry, &head_only(descriptor), type_name, "")?;
    check_type_args(descriptor, &args)
}

/// The descriptor's head with no arguments, for comparing `$typeName`.
fn head_only(descriptor: &TypeDescriptor) -> TypeDescriptor {
    TypeDescriptor::new(
        descriptor.type_name().to_string(),
        Vec::new(),
        Vec::new(),
        Layout::Phantom,
    )
}

fn is_option(desc: &TypeDescriptor) -> bool {
    matches!(desc.layout(), Layout::Option(_))
}

fn missing(path: &str, field: &str) -> ReifyError {
    ReifyError::MissingField {
        path: display_path(path),
        field: field.to_string(),
    }
}

fn enter(depth: &mut usize, limits: &Limits) -> Result<()> {
    *depth += 1;
    if *depth > limits.max_depth {
        return Err(ReifyError::DepthExceeded {
            limit: limits.max_depth,
        });
    }
    Ok(())
}

/// Decode a primitive from JSON. Shared with the tagged form.
///
/// Small integers are numbers; 64-bit and wider are decimal strings, with
/// exact numbers also accepted.
pub(crate) fn primitive_from_json(p: Primitive, json: &Value, path: &str) -> Result<DecodedValue> {
    let out_of_range = || ReifyError::invalid(path, format!("{} out of range for {}", json, p));
    match p {
        Primitive::Bool => json
            .as_bool()
            .map(DecodedValue::Bool)
            .ok_or_else(|| ReifyError::mismatch(path, "bool", json_kind(json))),
        Primitive::U8 => {
            let v = json_u64(json, p, path)?;
            u8::try_from(v).map(DecodedValue::U8).map_err(|_| out_of_range())
        }
        Primitive::U16 => {
            let v = json_u64(json, p, path)?;
            u16::try_from(v).map(DecodedValue::U16).map_err(|_| out_of_range())
        }
        Primitive::U32 => {
            let v = json_u64(json, p, path)?;
            u32::try_from(v).map(DecodedValue::U32).map_err(|_| out_of_range())
        }
        Primitive::U64 => json_u64(json, p, path).map(DecodedValue::U64),
        Primitive::U128 => match json {
            Value::String(s) => s
                .parse::<u128>()
                .map(DecodedValue::U128)
                .map_err(|e| ReifyError::invalid(path, format!("invalid u128 '{}': {}", s, e))),
            _ => json_u64(json, p, path).map(|v| DecodedValue::U128(u128::from(v))),
        },
        Primitive::U256 => match json {
            Value::String(s) if !s.is_empty() => U256::from_dec_str(s)
                .map(DecodedValue::U256)
                .map_err(|e| ReifyError::invalid(path, format!("invalid u256 '{}': {:?}", s, e))),
            Value::String(_) => Err(ReifyError::invalid(path, "empty u256 string")),
            _ => json_u64(json, p, path).map(|v| DecodedValue::U256(U256::from(v))),
        },
        Primitive::Address | Primitive::Signer => {
            let s = json
                .as_str()
                .ok_or_else(|| ReifyError::mismatch(path, "address", json_kind(json)))?;
            s.parse::<Address>()
                .map(DecodedValue::Address)
                .map_err(|e| ReifyError::invalid(path, format!("invalid address '{}': {}", s, e)))
        }
    }
}

fn json_u64(json: &Value, p: Primitive, path: &str) -> Result<u64> {
    match json {
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| ReifyError::invalid(path, format!("{} is not an exact {}", n, p))),
        Value::String(s) => s
            .parse::<u64>()
            .map_err(|e| ReifyError::invalid(path, format!("invalid {} '{}': {}", p, s, e))),
        other => Err(ReifyError::mismatch(path, p.keyword(), json_kind(other))),
    }
}

fn primitive_to_json(p: Primitive, value: &DecodedValue, path: &str) -> Result<Value> {
    Ok(match (p, value) {
        (Primitive::Bool, DecodedValue::Bool(v)) => Value::Bool(*v),
        (Primitive::U8, DecodedValue::U8(v)) => Value::from(*v),
        (Primitive::U16, DecodedValue::U16(v)) => Value::from(*v),
        (Primitive::U32, DecodedValue::U32(v)) => Value::from(*v),
        (Primitive::U64, DecodedValue::U64(v)) => Value::String(v.to_string()),
        (Primitive::U128, DecodedValue::U128(v)) => Value::String(v.to_string()),
        (Primitive::U256, DecodedValue::U256(v)) => Value::String(v.to_string()),
        (Primitive::Address | Primitive::Signer, DecodedValue::Address(a)) => {
            Value::String(a.to_hex_literal())
        }
        (_, other) => return Err(ReifyError::mismatch(path, p.keyword(), other.kind_name())),
    })
}

struct JsonEncoder<'a> {
    registry: &'a TypeRegistry,
    limits: Limits,
    depth: usize,
}

impl JsonEncoder<'_> {
    fn encode_value(
        &mut self,
        value: &DecodedValue,
        desc: &TypeDescriptor,
        path: &str,
    ) -> Result<Value> {
        enter(&mut self.depth, &self.limits)?;
        let json = self.encode_layout(value, desc, path)?;
        self.depth -= 1;
        Ok(json)
    }

    fn encode_layout(
        &mut self,
        value: &DecodedValue,
        desc: &TypeDescriptor,
        path: &str,
    ) -> Result<Value> {
        match (desc.layout(), value) {
            (Layout::Primitive(p), _) => primitive_to_json(*p, value, path),
            (Layout::Vector(elem), DecodedValue::Vector(items)) => {
                let mut out = Vec::with_capacity(items.len());
                for (i, item) in items.iter().enumerate() {
                    out.push(self.encode_value(item, elem, &index_path(path, i))?);
                }
                Ok(Value::Array(out))
            }
            // An option of an option nests as a 0/1-element array so that
            // `Some(None)` stays distinct from `None`.
            (Layout::Option(elem), DecodedValue::Option(inner)) if is_option(elem) => {
                match inner {
                    None => Ok(Value::Array(Vec::new())),
                    Some(inner) => Ok(Value::Array(vec![self.encode_value(inner, elem, path)?])),
                }
            }
            (Layout::Option(elem), DecodedValue::Option(inner)) => match inner {
                None => Ok(Value::Null),
                Some(inner) => self.encode_value(inner, elem, path),
            },
            (Layout::String(kind), DecodedValue::String(s)) => {
                if *kind == StringKind::Ascii && !s.is_ascii() {
                    return Err(ReifyError::invalid(path, "non-ASCII byte in ascii string"));
                }
                Ok(Value::String(s.clone()))
            }
            (Layout::Struct(layout), DecodedValue::Struct(fields)) => {
                Ok(Value::Object(self.encode_fields(layout, fields, path)?))
            }
            (Layout::Enum(variants), DecodedValue::Variant { name, fields }) => {
                let variant = variants.iter().find(|v| v.name == *name).ok_or_else(|| {
                    ReifyError::UnknownVariant {
                        type_name: desc.type_string().to_string(),
                        variant: name.clone(),
                    }
                })?;
                let mut map = Map::new();
                map.insert(KIND_KEY.into(), Value::String(name.clone()));
                map.append(&mut self.encode_fields(&variant.fields, fields, path)?);
                Ok(Value::Object(map))
            }
            (Layout::Phantom, _) => Err(ReifyError::invalid(
                path,
                format!("phantom type {} has no layout", desc.type_string()),
            )),
            (_, other) => Err(ReifyError::mismatch(
                path,
                desc.type_string(),
                other.kind_name(),
            )),
        }
    }

    fn encode_fields(
        &mut self,
        layout: &[FieldLayout],
        fields: &Fields,
        path: &str,
    ) -> Result<Map<String, Value>> {
        let mut map = Map::new();
        for field in layout {
            let value = fields.get(&field.name).ok_or_else(|| missing(path, &field.name))?;
            let desc = self.registry.resolve_canonical(&field.ty)?;
            let json = self.encode_value(value, &desc, &field_path(path, &field.name))?;
            map.insert(field.json_name.clone(), json);
        }
        Ok(map)
    }
}

struct JsonDecoder<'a> {
    registry: &'a TypeRegistry,
    limits: Limits,
    depth: usize,
}

impl JsonDecoder<'_> {
    fn decode_value(
        &mut self,
        desc: &TypeDescriptor,
        json: &Value,
        path: &str,
    ) -> Result<DecodedValue> {
        enter(&mut self.depth, &self.limits)?;
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
                Ok(DecodedValue::Vector(out))
            }
            Layout::Option(elem) if is_option(elem) => match json {
                Value::Array(items) if items.is_empty() => Ok(DecodedValue::absent()),
                Value::Array(items) if items.len() == 1 => {
                    Ok(DecodedValue::some(self.decode_value(elem, &items[0], path)?))
                }
                Value::Array(items) => Err(ReifyError::invalid(
                    path,
                    format!("nested option array has {} elements", items.len()),
                )),
                other => Err(ReifyError::mismatch(path, desc.type_string(), json_kind(other))),
            },
            Layout::Option(elem) => match json {
                Value::Null => Ok(DecodedValue::absent()),
                other => Ok(DecodedValue::some(self.decode_value(elem, other, path)?)),
            },
            Layout::String(kind) => decode_string(*kind, json, path, &self.limits),
            Layout::Struct(layout) => {
                let obj = json
                    .as_object()
                    .ok_or_else(|| ReifyError::mismatch(path, desc.type_string(), json_kind(json)))?;
                Ok(DecodedValue::Struct(self.decode_fields(layout, obj, path)?))
            }
            Layout::Enum(variants) => {
                let obj = json
                    .as_object()
                    .ok_or_else(|| ReifyError::mismatch(path, desc.type_string(), json_kind(json)))?;
                let kind = obj
                    .get(KIND_KEY)
                    .ok_or_else(|| missing(path, KIND_KEY))?
                    .as_str()
                    .ok_or_else(|| ReifyError::invalid(path, "$kind must be a string"))?;
                let variant = variants.iter().find(|v| v.name == kind).ok_or_else(|| {
                    ReifyError::UnknownVariant {
                        type_name: desc.type_string().to_string(),
                        variant: kind.to_string(),
                    }
                })?;
                Ok(DecodedValue::Variant {
                    name: variant.name.clone(),
                    fields: self.decode_fields(&variant.fields, obj, path)?,
                })
            }
            Layout::Phantom => Err(ReifyError::invalid(
                path,
                format!("phantom type {} has no layout", desc.type_string()),
            )),
        }
    }

    fn decode_fields(
        &mut self,
        layout: &[FieldLayout],
        obj: &Map<String, Value>,
        path: &str,
    ) -> Result<Fields> {
        let mut fields = Fields::new();
        for field in layout {
            let json = obj
                .get(&field.json_name)
                .ok_or_else(|| missing(path, &field.json_name))?;
            let desc = self.registry.resolve_canonical(&field.ty)?;
            let value = self.decode_value(&desc, json, &field_path(path, &field.name))?;
            fields.insert(field.name.clone(), value);
        }
        Ok(fields)
    }
}

/// Decode a JSON string into a Move string. Shared with the tagged form.
pub(crate) fn decode_string(
    kind: StringKind,
    json: &Value,
    path: &str,
    limits: &Limits,
) -> Result<DecodedValue> {
    let s = json
        .as_str()
        .ok_or_else(|| ReifyError::mismatch(path, "string", json_kind(json)))?;
    if s.len() > limits.max_vector_len {
        return Err(ReifyError::SizeExceeded {
            path: display_path(path),
            limit: limits.max_vector_len,
            actual: s.len(),
        });
    }
    if kind == StringKind::Ascii && !s.is_ascii() {
        return Err(ReifyError::invalid(path, "non-ASCII byte in ascii string"));
    }
    Ok(DecodedValue::String(s.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{EnumDecl, StructDecl};
    use serde_json::json;

    fn registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry
            .register_all([
                StructDecl::new("0x2::balance::Balance")
                    .phantom_param("T")
                    .field("value", "u64")
                    .build()
                    .unwrap(),
                StructDecl::new("0x7::vault::Vault")
                    .phantom_param("T")
                    .field("owner_addr", "address")
                    .field("locked_balance", "0x2::balance::Balance<T>")
                    .field("note", "0x1::option::Option<0x1::string::String>")
                    .build()
                    .unwrap(),
                EnumDecl::new("0x7::vault::Status")
                    .variant("Open", &[])
                    .variant("Closed", &[("closed_at", "u64")])
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        registry
    }

    fn vault_value() -> DecodedValue {
        DecodedValue::Struct(
            Fields::new()
                .with("owner_addr", Address::from_u64(0xab))
                .with(
                    "locked_balance",
                    Fields::new().with("value", 18_446_744_073_709_551_615u64),
                )
                .with("note", None::<String>),
        )
    }

    #[test]
    fn test_encode_root_struct() {
        let registry = registry();
        let vault = registry.reified("0x7::vault::Vault<0x2::sui::SUI>").unwrap();
        let json = vault.encode_json(&vault_value()).unwrap();

        assert_eq!(json["$typeName"], "0x7::vault::Vault");
        assert_eq!(json["$typeArgs"], json!(["0x2::sui::SUI"]));
        assert_eq!(
            json["ownerAddr"],
            "0x00000000000000000000000000000000000000000000000000000000000000ab"
        );
        // Nested structs carry no type tag.
        assert_eq!(json["lockedBalance"], json!({ "value": "18446744073709551615" }));
        assert_eq!(json["note"], Value::Null);
    }

    #[test]
    fn test_root_keys_follow_declaration_order() {
        let registry = registry();
        let vault = registry.reified("0x7::vault::Vault<0x2::sui::SUI>").unwrap();
        let json = vault.encode_json(&vault_value()).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            vec!["$typeName", "$typeArgs", "ownerAddr", "lockedBalance", "note"]
        );
    }

    #[test]
    fn test_decode_plain_round_trip() {
        let registry = registry();
        let vault = registry.reified("0x7::vault::Vault<0x2::sui::SUI>").unwrap();
        let json = vault.encode_json(&vault_value()).unwrap();
        assert_eq!(vault.decode_plain(&json).unwrap(), vault_value());
    }

    #[test]
    fn test_decode_plain_checks_root_tag() {
        let registry = registry();
        let vault = registry.reified("0x7::vault::Vault<0x2::sui::SUI>").unwrap();
        let mut json = vault.encode_json(&vault_value()).unwrap();

        json["$typeArgs"] = json!(["0x3::foo::BAR"]);
        assert!(matches!(
            vault.decode_plain(&json),
            Err(ReifyError::ArgumentMismatch { position: 0, .. })
        ));

        json["$typeArgs"] = json!(["0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI"]);
        assert!(vault.decode_plain(&json).is_ok());

        json["$typeName"] = json!("0x7::vault::Other");
        assert!(matches!(
            vault.decode_plain(&json),
            Err(ReifyError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_decode_plain_missing_field() {
        let registry = registry();
        let vault = registry.reified("0x7::vault::Vault<0x2::sui::SUI>").unwrap();
        let mut json = vault.encode_json(&vault_value()).unwrap();
        json.as_object_mut().unwrap().remove("ownerAddr");
        let err = vault.decode_plain(&json).unwrap_err();
        assert!(matches!(err, ReifyError::MissingField { ref field, .. } if field == "ownerAddr"));
    }

    #[test]
    fn test_enum_root_and_kind() {
        let registry = registry();
        let status = registry.reified("0x7::vault::Status").unwrap();
        let value = DecodedValue::Variant {
            name: "Closed".into(),
            fields: Fields::new().with("closed_at", 7u64),
        };
        let json = status.encode_json(&value).unwrap();
        assert_eq!(json["$kind"], "Closed");
        assert_eq!(json["closedAt"], "7");
        assert_eq!(json["$typeArgs"], json!([]));
        assert_eq!(status.decode_plain(&json).unwrap(), value);

        let bad = json!({ "$typeName": "0x7::vault::Status", "$kind": "Frozen" });
        assert!(matches!(
            status.decode_plain(&bad),
            Err(ReifyError::UnknownVariant { .. })
        ));
    }

    #[test]
    fn test_primitive_from_json_rules() {
        assert_eq!(
            primitive_from_json(Primitive::U8, &json!(255), "").unwrap(),
            DecodedValue::U8(255)
        );
        assert!(primitive_from_json(Primitive::U8, &json!(256), "").is_err());
        assert_eq!(
            primitive_from_json(Primitive::U64, &json!(5), "").unwrap(),
            DecodedValue::U64(5)
        );
        assert_eq!(
            primitive_from_json(Primitive::U128, &json!("340282366920938463463374607431768211455"), "")
                .unwrap(),
            DecodedValue::U128(u128::MAX)
        );
        assert!(primitive_from_json(Primitive::U64, &json!(1.5), "").is_err());
        assert!(matches!(
            primitive_from_json(Primitive::Bool, &json!("true"), "x"),
            Err(ReifyError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_u256_from_json() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        assert_eq!(
            primitive_from_json(Primitive::U256, &json!(max), "").unwrap(),
            DecodedValue::U256(U256::MAX)
        );
        assert_eq!(
            primitive_from_json(Primitive::U256, &json!("18446744073709551616"), "").unwrap(),
            DecodedValue::U256(U256::from(u128::from(u64::MAX) + 1))
        );
        assert_eq!(
            primitive_from_json(Primitive::U256, &json!(7), "").unwrap(),
            DecodedValue::U256(U256::from(7u64))
        );
        let too_big = format!("{}0", max);
        for bad in ["", "-1", "12a", too_big.as_str()] {
            assert!(matches!(
                primitive_from_json(Primitive::U256, &json!(bad), "x"),
                Err(ReifyError::InvalidValue { .. })
            ));
        }
    }

    #[test]
    fn test_non_datatype_root_is_bare() {
        let registry = registry();
        let v = registry.reified("vector<u64>").unwrap();
        let value = DecodedValue::from(vec![1u64, 2]);
        let json = v.encode_json(&value).unwrap();
        assert_eq!(json, json!(["1", "2"]));
        assert_eq!(v.decode_plain(&json).unwrap(), value);
    }
}
