// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! BCS encoding/decoding driven by type descriptors.
//!
//! Fixed-width integers are little-endian, lengths and enum variant indices
//! are ULEB128, struct fields follow declaration order without padding.

use crate::codec::descriptor::{FieldLayout, Layout, StringKind, TypeDescriptor};
use crate::codec::{field_path, index_path};
use crate::config::Limits;
use crate::error::{display_path, ReifyError, Result};
use crate::registry::TypeRegistry;
use crate::types::{Address, Primitive};
use crate::value::{DecodedValue, Fields, U256};

/// BCS caps sequence lengths at `u32::MAX`, so at most five ULEB128 bytes.
const MAX_ULEB128_BYTES: usize = 5;

/// Decode `bytes` as a value of `descriptor`. The whole input must be used.
pub(crate) fn decode(
    registry: &TypeRegistry,
    descriptor: &TypeDescriptor,
    bytes: &[u8],
) -> Result<DecodedValue> {
    let mut decoder = BcsDecoder::new(registry, bytes);
    let value = decoder.decode_value(descriptor, "")?;
    if decoder.remaining() > 0 {
        return Err(ReifyError::TrailingBytes {
            type_name: descriptor.type_string().to_string(),
            remaining: decoder.remaining(),
        });
    }
    Ok(value)
}

/// Encode `value` as `descriptor`.
pub(crate) fn encode(
    registry: &TypeRegistry,
    descriptor: &TypeDescriptor,
    value: &DecodedValue,
) -> Result<Vec<u8>> {
    let mut encoder = BcsEncoder::new(registry);
    encoder.encode_value(value, descriptor, "")?;
    Ok(encoder.into_bytes())
}

/// Write a ULEB128 length or variant index.
pub(crate) fn write_uleb128(buffer: &mut Vec<u8>, mut value: u64) {
    while value >= 0x80 {
        buffer.push((value as u8 & 0x7f) | 0x80);
        value >>= 7;
    }
    buffer.push(value as u8);
}

struct BcsDecoder<'a> {
    registry: &'a TypeRegistry,
    limits: Limits,
    buffer: &'a [u8],
    offset: usize,
    depth: usize,
}

impl<'a> BcsDecoder<'a> {
    fn new(registry: &'a TypeRegistry, buffer: &'a [u8]) -> Self {
        Self {
            registry,
            limits: registry.limits(),
            buffer,
            offset: 0,
            depth: 0,
        }
    }

    fn remaining(&self) -> usize {
        self.buffer.len().saturating_sub(self.offset)
    }

    fn read_bytes(&mut self, count: usize) -> Result<&'a [u8]> {
        if count > self.remaining() {
            return Err(ReifyError::TruncatedInput {
                offset: self.offset,
                need: count,
                have: self.remaining(),
            });
        }
        let slice = &self.buffer[self.offset..self.offset + count];
        self.offset += count;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    fn read_uleb128(&mut self, path: &str) -> Result<u64> {
        let mut value: u64 = 0;
        for i in 0..MAX_ULEB128_BYTES {
            let byte = self.read_array::<1>()?[0];
            let digit = u64::from(byte & 0x7f);
            value |= digit << (7 * i);
            if byte & 0x80 == 0 {
                if i > 0 && digit == 0 {
                    return Err(ReifyError::invalid(path, "non-canonical ULEB128 encoding"));
                }
                if value > u64::from(u32::MAX) {
                    return Err(ReifyError::invalid(path, "ULEB128 value exceeds u32"));
                }
                return Ok(value);
            }
        }
        Err(ReifyError::invalid(path, "ULEB128 value exceeds u32"))
    }

    fn read_len(&mut self, path: &str) -> Result<usize> {
        let len = self.read_uleb128(path)? as usize;
        if len > self.limits.max_vector_len {
            return Err(ReifyError::SizeExceeded {
                path: display_path(path),
                limit: self.limits.max_vector_len,
                actual: len,
            });
        }
        Ok(len)
    }

    fn decode_value(&mut self, desc: &TypeDescriptor, path: &str) -> Result<DecodedValue> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(ReifyError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        let value = self.decode_layout(desc, path)?;
        self.depth -= 1;
        Ok(value)
    }

    fn decode_layout(&mut self, desc: &TypeDescriptor, path: &str) -> Result<DecodedValue> {
        match desc.layout() {
            Layout::Primitive(p) => self.decode_primitive(*p, path),
            Layout::Vector(elem) => {
                let len = self.read_len(path)?;
                if let Layout::Primitive(Primitive::U8) = elem.layout() {
                    let bytes = self.read_bytes(len)?;
                    return Ok(DecodedValue::Vector(
                        bytes.iter().copied().map(DecodedValue::U8).collect(),
                    ));
                }
                // Every element takes at least one byte.
                let mut items = Vec::with_capacity(len.min(self.remaining()));
                for i in 0..len {
                    items.push(self.decode_value(elem, &index_path(path, i))?);
                }
                Ok(DecodedValue::Vector(items))
            }
            Layout::Option(elem) => match self.read_uleb128(path)? {
                0 => Ok(DecodedValue::absent()),
                1 => Ok(DecodedValue::some(self.decode_value(elem, path)?)),
                n => Err(ReifyError::invalid(
                    path,
                    format!("option holds {} elements", n),
                )),
            },
            Layout::String(kind) => {
                let len = self.read_len(path)?;
                let bytes = self.read_bytes(len)?;
                let s = std::str::from_utf8(bytes)
                    .map_err(|e| ReifyError::invalid(path, format!("invalid UTF-8: {}", e)))?;
                if *kind == StringKind::Ascii && !s.is_ascii() {
                    return Err(ReifyError::invalid(path, "non-ASCII byte in ascii string"));
                }
                Ok(DecodedValue::String(s.to_string()))
            }
            Layout::Struct(fields) => Ok(DecodedValue::Struct(self.decode_fields(fields, path)?)),
            Layout::Enum(variants) => {
                let offset = self.offset;
                let index = self.read_uleb128(path)?;
                let variant = variants.get(index as usize).ok_or_else(|| {
                    ReifyError::InvalidDiscriminant {
                        type_name: desc.type_string().to_string(),
                        index,
                        variant_count: variants.len(),
                        offset,
                    }
                })?;
                Ok(DecodedValue::Variant {
                    name: variant.name.clone(),
                    fields: self.decode_fields(&variant.fields, path)?,
                })
            }
            Layout::Phantom => Err(ReifyError::invalid(
                path,
                format!("phantom type {} has no layout", desc.type_string()),
            )),
        }
    }

    fn decode_fields(&mut self, fields: &[FieldLayout], path: &str) -> Result<Fields> {
        let mut out = Fields::new();
        for field in fields {
            let desc = self.registry.resolve_canonical(&field.ty)?;
            let value = self.decode_value(&desc, &field_path(path, &field.name))?;
            out.insert(field.name.clone(), value);
        }
        Ok(out)
    }

    fn decode_primitive(&mut self, p: Primitive, path: &str) -> Result<DecodedValue> {
        Ok(match p {
            Primitive::Bool => match self.read_array::<1>()?[0] {
                0 => DecodedValue::Bool(false),
                1 => DecodedValue::Bool(true),
                b => {
                    return Err(ReifyError::invalid(
                        path,
                        format!("bool byte must be 0 or 1, got {}", b),
                    ))
                }
            },
            Primitive::U8 => DecodedValue::U8(self.read_array::<1>()?[0]),
            Primitive::U16 => DecodedValue::U16(u16::from_le_bytes(self.read_array()?)),
            Primitive::U32 => DecodedValue::U32(u32::from_le_bytes(self.read_array()?)),
            Primitive::U64 => DecodedValue::U64(u64::from_le_bytes(self.read_array()?)),
            Primitive::U128 => DecodedValue::U128(u128::from_le_bytes(self.read_array()?)),
            Primitive::U256 => {
                DecodedValue::U256(U256::from_little_endian(&self.read_array::<32>()?))
            }
            Primitive::Address | Primitive::Signer => {
                DecodedValue::Address(Address::new(self.read_array()?))
            }
        })
    }
}

struct BcsEncoder<'a> {
    registry: &'a TypeRegistry,
    limits: Limits,
    buffer: Vec<u8>,
    depth: usize,
}

impl<'a> BcsEncoder<'a> {
    fn new(registry: &'a TypeRegistry) -> Self {
        Self {
            registry,
            limits: registry.limits(),
            buffer: Vec::new(),
            depth: 0,
        }
    }

    fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    fn write_len(&mut self, len: usize, path: &str) -> Result<()> {
        if len > self.limits.max_vector_len {
            return Err(ReifyError::SizeExceeded {
                path: display_path(path),
                limit: self.limits.max_vector_len,
                actual: len,
            });
        }
        write_uleb128(&mut self.buffer, len as u64);
        Ok(())
    }

    fn encode_value(
        &mut self,
        value: &DecodedValue,
        desc: &TypeDescriptor,
        path: &str,
    ) -> Result<()> {
        self.depth += 1;
        if self.depth > self.limits.max_depth {
            return Err(ReifyError::DepthExceeded {
                limit: self.limits.max_depth,
            });
        }
        self.encode_layout(value, desc, path)?;
        self.depth -= 1;
        Ok(())
    }

    fn encode_layout(
        &mut self,
        value: &DecodedValue,
        desc: &TypeDescriptor,
        path: &str,
    ) -> Result<()> {
        match (desc.layout(), value) {
            (Layout::Primitive(p), _) => self.encode_primitive(value, *p, path),
            (Layout::Vector(elem), DecodedValue::Vector(items)) => {
                self.write_len(items.len(), path)?;
                for (i, item) in items.iter().enumerate() {
                    self.encode_value(item, elem, &index_path(path, i))?;
                }
                Ok(())
            }
            (Layout::Option(elem), DecodedValue::Option(inner)) => match inner {
                None => {
                    self.buffer.push(0);
                    Ok(())
                }
                Some(inner) => {
                    self.buffer.push(1);
                    self.encode_value(inner, elem, path)
                }
            },
            (Layout::String(kind), DecodedValue::String(s)) => {
                if *kind == StringKind::Ascii && !s.is_ascii() {
                    return Err(ReifyError::invalid(path, "non-ASCII byte in ascii string"));
                }
                self.write_len(s.len(), path)?;
                self.buffer.extend_from_slice(s.as_bytes());
                Ok(())
            }
            (Layout::Struct(layout), DecodedValue::Struct(fields)) => {
                self.encode_fields(layout, fields, path)
            }
            (Layout::Enum(variants), DecodedValue::Variant { name, fields }) => {
                let (index, variant) = variants
                    .iter()
                    .enumerate()
                    .find(|(_, v)| v.name == *name)
                    .ok_or_else(|| ReifyError::UnknownVariant {
                        type_name: desc.type_string().to_string(),
                        variant: name.clone(),
                    })?;
                write_uleb128(&mut self.buffer, index as u64);
                self.encode_fields(&variant.fields, fields, path)
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

    fn encode_fields(&mut self, layout: &[FieldLayout], fields: &Fields, path: &str) -> Result<()> {
        for field in layout {
            let value = fields.get(&field.name).ok_or_else(|| ReifyError::MissingField {
                path: display_path(path),
                field: field.name.clone(),
            })?;
            let desc = self.registry.resolve_canonical(&field.ty)?;
            self.encode_value(value, &desc, &field_path(path, &field.name))?;
        }
        if fields.len() != layout.len() {
            if let Some((extra, _)) = fields
                .iter()
                .find(|(name, _)| !layout.iter().any(|f| f.name == *name))
            {
                return Err(ReifyError::invalid(
                    path,
                    format!("unexpected field '{}'", extra),
                ));
            }
        }
        Ok(())
    }

    fn encode_primitive(&mut self, value: &DecodedValue, p: Primitive, path: &str) -> Result<()> {
        match (p, value) {
            (Primitive::Bool, DecodedValue::Bool(v)) => self.buffer.push(u8::from(*v)),
            (Primitive::U8, DecodedValue::U8(v)) => self.buffer.push(*v),
            (Primitive::U16, DecodedValue::U16(v)) => self.buffer.extend(&v.to_le_bytes()),
            (Primitive::U32, DecodedValue::U32(v)) => self.buffer.extend(&v.to_le_bytes()),
            (Primitive::U64, DecodedValue::U64(v)) => self.buffer.extend(&v.to_le_bytes()),
            (Primitive::U128, DecodedValue::U128(v)) => self.buffer.extend(&v.to_le_bytes()),
            (Primitive::U256, DecodedValue::U256(v)) => {
                let mut bytes = [0u8; 32];
                v.to_little_endian(&mut bytes);
                self.buffer.extend(&bytes)
            }
            (Primitive::Address | Primitive::Signer, DecodedValue::Address(a)) => {
                self.buffer.extend(a.as_bytes())
            }
            (_, other) => return Err(ReifyError::mismatch(path, p.keyword(), other.kind_name())),
        }
        Ok(())
    }
}
