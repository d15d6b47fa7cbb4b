// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Decoded value tree.
//!
//! Every decode entry point (BCS, tagged JSON, plain JSON) produces this
//! one representation, and both encoders consume it.

pub use ethereum_types::U256;

use crate::types::Address;

/// Struct or variant fields in declaration order. Keys are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, DecodedValue)>);

impl Fields {
    /// Create an empty field list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a field, keeping first-insertion order.
    pub fn insert(&mut self, name: impl Into<String>, value: DecodedValue) {
        let name = name.into();
        match self.0.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<DecodedValue>) -> Self {
        self.insert(name, value.into());
        self
    }

    /// Get a field by name.
    pub fn get(&self, name: &str) -> Option<&DecodedValue> {
        self.0.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Get a mutable field by name.
    pub fn get_mut(&mut self, name: &str) -> Option<&mut DecodedValue> {
        self.0.iter_mut().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &DecodedValue)> {
        self.0.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Same names mapped to equal values, regardless of order.
    pub fn same_entries(&self, other: &Fields) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(name, value)| other.get(name).is_some_and(|o| value.same_shape(o)))
    }
}

impl FromIterator<(String, DecodedValue)> for Fields {
    fn from_iter<I: IntoIterator<Item = (String, DecodedValue)>>(iter: I) -> Self {
        let mut fields = Self::new();
        for (name, value) in iter {
            fields.insert(name, value);
        }
        fields
    }
}

/// A decoded Move value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodedValue {
    // Primitives
    Bool(bool),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    U128(u128),
    U256(U256),
    Address(Address),

    // Built-in library types
    String(String),

    // Composites
    Vector(Vec<DecodedValue>),
    Struct(Fields),
    Variant { name: String, fields: Fields },

    /// `Option<T>`: `None` is the absent state, distinct from any zero value.
    Option(Option<Box<DecodedValue>>),
}

impl DecodedValue {
    /// The absent value of an optional type.
    pub fn absent() -> Self {
        Self::Option(None)
    }

    /// A present optional value.
    pub fn some(value: DecodedValue) -> Self {
        Self::Option(Some(Box::new(value)))
    }

    /// Check if value is the absent optional.
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Option(None))
    }

    /// Short name of the value kind, used in mismatch errors.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Bool(_) => "bool",
            Self::U8(_) => "u8",
            Self::U16(_) => "u16",
            Self::U32(_) => "u32",
            Self::U64(_) => "u64",
            Self::U128(_) => "u128",
            Self::U256(_) => "u256",
            Self::Address(_) => "address",
            Self::String(_) => "string",
            Self::Vector(_) => "vector",
            Self::Struct(_) => "struct",
            Self::Variant { .. } => "variant",
            Self::Option(_) => "option",
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Any unsigned integer up to 64 bits, widened.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::U8(v) => Some(u64::from(*v)),
            Self::U16(v) => Some(u64::from(*v)),
            Self::U32(v) => Some(u64::from(*v)),
            Self::U64(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u128(&self) -> Option<u128> {
        match self {
            Self::U128(v) => Some(*v),
            Self::U256(v) if v.bits() <= 128 => Some(v.low_u128()),
            Self::U256(_) => None,
            other => other.as_u64().map(u128::from),
        }
    }

    pub fn as_address(&self) -> Option<&Address> {
        match self {
            Self::Address(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_vector(&self) -> Option<&[DecodedValue]> {
        match self {
            Self::Vector(v) => Some(v),
            _ => None,
        }
    }

    /// Inner value of a present optional.
    pub fn as_option(&self) -> Option<Option<&DecodedValue>> {
        match self {
            Self::Option(v) => Some(v.as_deref()),
            _ => None,
        }
    }

    /// Struct or variant fields.
    pub fn fields(&self) -> Option<&Fields> {
        match self {
            Self::Struct(fields) | Self::Variant { fields, .. } => Some(fields),
            _ => None,
        }
    }

    /// Try to get struct or variant field.
    pub fn get_field(&self, name: &str) -> Option<&DecodedValue> {
        self.fields()?.get(name)
    }

    /// Get enum variant name.
    pub fn variant_name(&self) -> Option<&str> {
        match self {
            Self::Variant { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Structural equality that ignores field order.
    pub fn same_shape(&self, other: &DecodedValue) -> bool {
        match (self, other) {
            (Self::Struct(a), Self::Struct(b)) => a.same_entries(b),
            (
                Self::Variant { name: na, fields: fa },
                Self::Variant { name: nb, fields: fb },
            ) => na == nb && fa.same_entries(fb),
            (Self::Vector(a), Self::Vector(b)) => {
                a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.same_shape(y))
            }
            (Self::Option(Some(a)), Self::Option(Some(b))) => a.same_shape(b),
            _ => self == other,
        }
    }
}

// Conversion traits
impl From<bool> for DecodedValue {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}

impl From<u8> for DecodedValue {
    fn from(v: u8) -> Self {
        Self::U8(v)
    }
}

impl From<u16> for DecodedValue {
    fn from(v: u16) -> Self {
        Self::U16(v)
    }
}

impl From<u32> for DecodedValue {
    fn from(v: u32) -> Self {
        Self::U32(v)
    }
}

impl From<u64> for DecodedValue {
    fn from(v: u64) -> Self {
        Self::U64(v)
    }
}

impl From<u128> for DecodedValue {
    fn from(v: u128) -> Self {
        Self::U128(v)
    }
}

impl From<U256> for DecodedValue {
    fn from(v: U256) -> Self {
        Self::U256(v)
    }
}

impl From<Address> for DecodedValue {
    fn from(v: Address) -> Self {
        Self::Address(v)
    }
}

impl From<String> for DecodedValue {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

impl From<&str> for DecodedValue {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<Fields> for DecodedValue {
    fn from(v: Fields) -> Self {
        Self::Struct(v)
    }
}

impl<T: Into<DecodedValue>> From<Vec<T>> for DecodedValue {
    fn from(v: Vec<T>) -> Self {
        Self::Vector(v.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<DecodedValue>> From<Option<T>> for DecodedValue {
    fn from(v: Option<T>) -> Self {
        Self::Option(v.map(|inner| Box::new(inner.into())))
    }
}
