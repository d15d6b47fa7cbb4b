// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Reified type descriptors.

use crate::types::{compose, Primitive, TypeExpr};
use heck::ToLowerCamelCase;
use std::sync::Arc;

/// `0x1::option::Option`.
pub const OPTION_TYPE: &str = "0x1::option::Option";
/// `0x1::string::String`.
pub const UTF8_STRING_TYPE: &str = "0x1::string::String";
/// `0x1::ascii::String`.
pub const ASCII_STRING_TYPE: &str = "0x1::ascii::String";

/// Names handled structurally, never looked up in the registry table.
pub fn is_builtin(type_name: &str) -> bool {
    matches!(type_name, OPTION_TYPE | UTF8_STRING_TYPE | ASCII_STRING_TYPE)
}

/// String flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringKind {
    Utf8,
    Ascii,
}

/// A field of one instantiation. `ty` is fully concrete and resolved on use,
/// so recursive types never expand eagerly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldLayout {
    /// Declared (snake_case) name, used by BCS and tagged JSON.
    pub name: String,
    /// camelCase name, used by canonical JSON.
    pub json_name: String,
    /// Concrete field type.
    pub ty: TypeExpr,
}

impl FieldLayout {
    pub(crate) fn new(name: &str, ty: TypeExpr) -> Self {
        Self {
            name: name.to_string(),
            json_name: to_camel_case(name),
            ty,
        }
    }
}

/// One enum variant of one instantiation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantLayout {
    pub name: String,
    pub fields: Vec<FieldLayout>,
}

/// How values of a type are laid out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    Primitive(Primitive),
    Vector(Arc<TypeDescriptor>),
    Option(Arc<TypeDescriptor>),
    String(StringKind),
    Struct(Vec<FieldLayout>),
    Enum(Vec<VariantLayout>),
    /// Phantom argument: identity only, no layout.
    Phantom,
}

/// One instantiated type.
///
/// Invariant: `is_phantom.len() == type_args.len()`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor {
    type_name: String,
    type_args: Vec<Arc<TypeDescriptor>>,
    is_phantom: Vec<bool>,
    layout: Layout,
    type_string: String,
}

impl TypeDescriptor {
    pub(crate) fn new(
        type_name: String,
        type_args: Vec<Arc<TypeDescriptor>>,
        is_phantom: Vec<bool>,
        layout: Layout,
    ) -> Self {
        debug_assert_eq!(type_args.len(), is_phantom.len());
        let arg_strings: Vec<&str> = type_args.iter().map(|a| a.type_string()).collect();
        let type_string = if type_name == "vector" {
            format!("vector<{}>", arg_strings.join(", "))
        } else {
            compose(&type_name, &arg_strings)
        };
        Self {
            type_name,
            type_args,
            is_phantom,
            layout,
            type_string,
        }
    }

    /// Descriptor for a primitive.
    pub fn primitive(p: Primitive) -> Self {
        Self::new(
            p.keyword().to_string(),
            Vec::new(),
            Vec::new(),
            Layout::Primitive(p),
        )
    }

    /// Descriptor for `vector<elem>`.
    pub fn vector(elem: Arc<TypeDescriptor>) -> Self {
        Self::new(
            "vector".to_string(),
            vec![elem.clone()],
            vec![false],
            Layout::Vector(elem),
        )
    }

    /// Descriptor for `0x1::option::Option<elem>`.
    pub fn option(elem: Arc<TypeDescriptor>) -> Self {
        Self::new(
            OPTION_TYPE.to_string(),
            vec![elem.clone()],
            vec![false],
            Layout::Option(elem),
        )
    }

    /// Descriptor for a built-in string type.
    pub fn string(kind: StringKind) -> Self {
        let name = match kind {
            StringKind::Utf8 => UTF8_STRING_TYPE,
            StringKind::Ascii => ASCII_STRING_TYPE,
        };
        Self::new(name.to_string(), Vec::new(), Vec::new(), Layout::String(kind))
    }

    /// Uninstantiated canonical name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Type arguments, phantom ones included.
    pub fn type_args(&self) -> &[Arc<TypeDescriptor>] {
        &self.type_args
    }

    /// Per-argument phantom flags.
    pub fn is_phantom(&self) -> &[bool] {
        &self.is_phantom
    }

    /// Layout driving the codecs.
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    /// Full canonical instantiated type string.
    pub fn type_string(&self) -> &str {
        &self.type_string
    }

    /// Argument type strings, as emitted in `$typeArgs`.
    pub fn type_arg_strings(&self) -> Vec<String> {
        self.type_args
            .iter()
            .map(|a| a.type_string().to_string())
            .collect()
    }

    /// Whether values are JSON objects carrying `$typeName` at the root.
    pub fn is_datatype(&self) -> bool {
        matches!(self.layout, Layout::Struct(_) | Layout::Enum(_))
    }
}

/// `balance_value` -> `balanceValue`. Leading underscores are kept.
pub(crate) fn to_camel_case(name: &str) -> String {
    let body = name.trim_start_matches('_');
    let prefix = &name[..name.len() - body.len()];
    format!("{}{}", prefix, body.to_lower_camel_case())
}
