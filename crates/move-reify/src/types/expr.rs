// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Structured type expressions.

use crate::types::Address;
use std::fmt;

/// Primitive Move types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    Bool,
    U8,
    U16,
    U32,
    U64,
    U128,
    U256,
    Address,
    Signer,
}

impl Primitive {
    /// Every primitive, in keyword order.
    pub const ALL: [Primitive; 9] = [
        Self::Bool,
        Self::U8,
        Self::U16,
        Self::U32,
        Self::U64,
        Self::U128,
        Self::U256,
        Self::Address,
        Self::Signer,
    ];

    /// Look up a primitive by its keyword.
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.keyword() == word)
    }

    /// The keyword as written in type strings.
    pub fn keyword(&self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::U8 => "u8",
            Self::U16 => "u16",
            Self::U32 => "u32",
            Self::U64 => "u64",
            Self::U128 => "u128",
            Self::U256 => "u256",
            Self::Address => "address",
            Self::Signer => "signer",
        }
    }

    /// Fixed BCS width in bytes.
    pub fn size(&self) -> usize {
        match self {
            Self::Bool | Self::U8 => 1,
            Self::U16 => 2,
            Self::U32 => 4,
            Self::U64 => 8,
            Self::U128 => 16,
            Self::U256 | Self::Address | Self::Signer => 32,
        }
    }

    /// Integers wider than 53 bits travel as decimal strings in JSON.
    pub fn is_wide_integer(&self) -> bool {
        matches!(self, Self::U64 | Self::U128 | Self::U256)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A parsed type expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeExpr {
    /// Primitive type.
    Primitive(Primitive),
    /// `vector<T>`.
    Vector(Box<TypeExpr>),
    /// Contract-defined type, possibly generic.
    Named {
        address: Address,
        module: String,
        name: String,
        type_args: Vec<TypeExpr>,
    },
    /// Reference to the declaring type's own parameter (declarations only).
    Param(u16),
}

impl TypeExpr {
    /// Shorthand for a named type.
    pub fn named(
        address: Address,
        module: impl Into<String>,
        name: impl Into<String>,
        type_args: Vec<TypeExpr>,
    ) -> Self {
        Self::Named {
            address,
            module: module.into(),
            name: name.into(),
            type_args,
        }
    }

    /// Shorthand for `vector<inner>`.
    pub fn vector(inner: TypeExpr) -> Self {
        Self::Vector(Box::new(inner))
    }

    /// Uninstantiated name: `0x2::coin::Coin` for named types, the keyword
    /// for primitives and `vector` for vectors.
    pub fn base_name(&self) -> String {
        match self {
            Self::Primitive(p) => p.keyword().to_string(),
            Self::Vector(_) => "vector".to_string(),
            Self::Named {
                address,
                module,
                name,
                ..
            } => format!("{}::{}::{}", address.short_hex(), module, name),
            Self::Param(i) => format!("#{}", i),
        }
    }

    /// Type arguments (the element type for vectors).
    pub fn type_args(&self) -> &[TypeExpr] {
        match self {
            Self::Named { type_args, .. } => type_args,
            Self::Vector(inner) => std::slice::from_ref(inner.as_ref()),
            Self::Primitive(_) | Self::Param(_) => &[],
        }
    }

    /// Whether the expression references declaration parameters.
    pub fn has_params(&self) -> bool {
        match self {
            Self::Param(_) => true,
            Self::Primitive(_) => false,
            Self::Vector(inner) => inner.has_params(),
            Self::Named { type_args, .. } => type_args.iter().any(Self::has_params),
        }
    }

    /// Replace every `Param(i)` with `args[i]`.
    ///
    /// Returns `None` when a parameter index is out of range.
    pub fn substitute(&self, args: &[TypeExpr]) -> Option<TypeExpr> {
        Some(match self {
            Self::Param(i) => args.get(usize::from(*i))?.clone(),
            Self::Primitive(p) => Self::Primitive(*p),
            Self::Vector(inner) => Self::vector(inner.substitute(args)?),
            Self::Named {
                address,
                module,
                name,
                type_args,
            } => Self::Named {
                address: *address,
                module: module.clone(),
                name: name.clone(),
                type_args: type_args
                    .iter()
                    .map(|a| a.substitute(args))
                    .collect::<Option<Vec<_>>>()?,
            },
        })
    }

    /// Nesting depth (a primitive has depth 1).
    pub fn depth(&self) -> usize {
        self.walk_depth(usize::MAX)
    }

    /// Whether nesting goes deeper than `limit`. Stops at the first node
    /// past the limit and uses no recursion, so hand-built expressions of
    /// any depth are safe to check.
    pub fn exceeds_depth(&self, limit: usize) -> bool {
        self.walk_depth(limit) > limit
    }

    /// Maximum depth, or the first depth found above `limit`.
    fn walk_depth(&self, limit: usize) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1usize)];
        while let Some((expr, depth)) = stack.pop() {
            if depth > limit {
                return depth;
            }
            deepest = deepest.max(depth);
            stack.extend(expr.type_args().iter().map(|arg| (arg, depth + 1)));
        }
        deepest
    }
}

impl From<Primitive> for TypeExpr {
    fn from(p: Primitive) -> Self {
        Self::Primitive(p)
    }
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Vector(inner) => write!(f, "vector<{}>", inner),
            Self::Named { type_args, .. } if !type_args.is_empty() => {
                write!(f, "{}<", self.base_name())?;
                for (i, arg) in type_args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            _ => f.write_str(&self.base_name()),
        }
    }
}
