// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Binary layout schema.

use crate::codec::descriptor::{FieldLayout, Layout, StringKind, TypeDescriptor};
use crate::error::{ReifyError, Result};
use crate::registry::TypeRegistry;
use crate::types::Primitive;

/// BCS layout of a type, fully expanded.
///
/// A type reached again while it is still being expanded is cut short with
/// [`Schema::Recursive`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Schema {
    Primitive(Primitive),
    String(StringKind),
    Vector(Box<Schema>),
    Option(Box<Schema>),
    Struct {
        type_name: String,
        fields: Vec<(String, Schema)>,
    },
    Enum {
        type_name: String,
        variants: Vec<(String, Vec<(String, Schema)>)>,
    },
    /// Back-reference to an enclosing type.
    Recursive(String),
}

impl Schema {
    /// Encoded size when it does not depend on the value.
    pub fn fixed_size(&self) -> Option<usize> {
        match self {
            Self::Primitive(p) => Some(p.size()),
            Self::Struct { fields, .. } => fields.iter().map(|(_, s)| s.fixed_size()).sum(),
            Self::String(_) | Self::Vector(_) | Self::Option(_) | Self::Enum { .. } => None,
            Self::Recursive(_) => None,
        }
    }
}

pub(crate) fn build(registry: &TypeRegistry, descriptor: &TypeDescriptor) -> Result<Schema> {
    let mut builder = SchemaBuilder {
        registry,
        stack: Vec::new(),
    };
    builder.build(descriptor)
}

struct SchemaBuilder<'a> {
    registry: &'a TypeRegistry,
    /// Datatypes currently being expanded.
    stack: Vec<String>,
}

impl SchemaBuilder<'_> {
    fn build(&mut self, desc: &TypeDescriptor) -> Result<Schema> {
        let limit = self.registry.limits().max_depth;
        if self.stack.len() >= limit {
            return Err(ReifyError::DepthExceeded { limit });
        }

        Ok(match desc.layout() {
            Layout::Primitive(p) => Schema::Primitive(*p),
            Layout::String(kind) => Schema::String(*kind),
            Layout::Vector(elem) => Schema::Vector(Box::new(self.build(elem)?)),
            Layout::Option(elem) => Schema::Option(Box::new(self.build(elem)?)),
            Layout::Struct(fields) => {
                let type_name = desc.type_string().to_string();
                if self.stack.contains(&type_name) {
                    return Ok(Schema::Recursive(type_name));
                }
                self.stack.push(type_name.clone());
                let fields = self.build_fields(fields)?;
                self.stack.pop();
                Schema::Struct { type_name, fields }
            }
            Layout::Enum(variants) => {
                let type_name = desc.type_string().to_string();
                if self.stack.contains(&type_name) {
                    return Ok(Schema::Recursive(type_name));
                }
                self.stack.push(type_name.clone());
                let variants = variants
                    .iter()
                    .map(|v| Ok((v.name.clone(), self.build_fields(&v.fields)?)))
                    .collect::<Result<Vec<_>>>()?;
                self.stack.pop();
                Schema::Enum {
                    type_name,
                    variants,
                }
            }
            Layout::Phantom => {
                return Err(ReifyError::invalid(
                    "",
                    format!("phantom type {} has no layout", desc.type_string()),
                ))
            }
        })
    }

    fn build_fields(&mut self, fields: &[FieldLayout]) -> Result<Vec<(String, Schema)>> {
        fields
            .iter()
            .map(|f| {
                let desc = self.registry.resolve_canonical(&f.ty)?;
                Ok((f.name.clone(), self.build(&desc)?))
            })
            .collect()
    }
}
