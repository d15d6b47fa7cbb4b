// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type string normalisation.
//!
//! Two type strings name the same on-chain type when they are equal after
//! [`compress_with`]: addresses lose their zero padding and historical
//! package addresses are rewritten to their canonical address.

use crate::config::PackageAlias;
use crate::error::{ReifyError, Result};
use crate::types::{parse, Address, TypeExpr};
use std::collections::HashMap;
use std::fmt;

/// Historical-to-canonical package address table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PackageAliases {
    map: HashMap<Address, Address>,
}

impl PackageAliases {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from configuration entries.
    pub fn from_config(aliases: &[PackageAlias]) -> Result<Self> {
        let mut table = Self::new();
        for alias in aliases {
            let from = parse_address(&alias.from)?;
            let to = parse_address(&alias.to)?;
            table.insert(from, to);
        }
        Ok(table)
    }

    /// Map `from` onto `to`.
    pub fn insert(&mut self, from: Address, to: Address) {
        self.map.insert(from, to);
    }

    /// Canonical address for `address` (itself when not aliased).
    pub fn resolve(&self, address: &Address) -> Address {
        self.map.get(address).copied().unwrap_or(*address)
    }

    /// Number of aliases.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns `true` if no aliases are configured.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Rewrite every address inside `expr` to its canonical form.
    pub fn canonicalize(&self, expr: &TypeExpr) -> TypeExpr {
        match expr {
            TypeExpr::Primitive(_) | TypeExpr::Param(_) => expr.clone(),
            TypeExpr::Vector(inner) => TypeExpr::vector(self.canonicalize(inner)),
            TypeExpr::Named {
                address,
                module,
                name,
                type_args,
            } => TypeExpr::Named {
                address: self.resolve(address),
                module: module.clone(),
                name: name.clone(),
                type_args: type_args.iter().map(|a| self.canonicalize(a)).collect(),
            },
        }
    }
}

fn parse_address(literal: &str) -> Result<Address> {
    literal
        .parse::<Address>()
        .map_err(|e| ReifyError::malformed(literal, 0, e.to_string()))
}

/// Strip address zero padding from every literal in `type_string`.
///
/// ```
/// use move_reify::types::compress;
///
/// let long = "0x0000000000000000000000000000000000000000000000000000000000000002::coin::Coin<0x0000000000000000000000000000000000000000000000000000000000000002::sui::SUI>";
/// assert_eq!(compress(long)?, "0x2::coin::Coin<0x2::sui::SUI>");
/// # Ok::<(), move_reify::ReifyError>(())
/// ```
pub fn compress(type_string: &str) -> Result<String> {
    compress_with(type_string, &PackageAliases::default())
}

/// [`compress`] plus package-version alias rewriting.
pub fn compress_with(type_string: &str, aliases: &PackageAliases) -> Result<String> {
    let expr = parse(type_string)?;
    Ok(aliases.canonicalize(&expr).to_string())
}

/// Full 64-digit form of an address literal.
pub fn normalize_address(literal: &str) -> Result<String> {
    Ok(parse_address(literal)?.to_hex_literal())
}

/// Render `base_name<arg, arg>`; no brackets when `type_args` is empty.
pub fn compose<T: fmt::Display>(base_name: &str, type_args: &[T]) -> String {
    if type_args.is_empty() {
        return base_name.to_string();
    }
    let args: Vec<String> = type_args.iter().map(ToString::to_string).collect();
    format!("{}<{}>", base_name, args.join(", "))
}

/// Split a type string into its uninstantiated name and type arguments.
pub fn decompose(type_string: &str) -> Result<(String, Vec<TypeExpr>)> {
    let expr = parse(type_string)?;
    let base = expr.base_name();
    let args = match expr {
        TypeExpr::Named { type_args, .. } => type_args,
        TypeExpr::Vector(inner) => vec![*inner],
        TypeExpr::Primitive(_) | TypeExpr::Param(_) => Vec::new(),
    };
    Ok((base, args))
}
