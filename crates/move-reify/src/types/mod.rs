// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type expressions: parsing, rendering and normalisation.

mod address;
mod expr;
mod normalize;
mod parser;

pub use address::{Address, AddressError, ADDRESS_LENGTH};
pub use expr::{Primitive, TypeExpr};
pub use normalize::{
    compose, compress, compress_with, decompose, normalize_address, PackageAliases,
};
pub use parser::{parse, parse_declared, parse_with_depth};
