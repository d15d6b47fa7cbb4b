// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Move Type Reification
//!
//! Resolves textual Move type descriptions at runtime and decodes or
//! encodes values of those types.
//!
//! # Features
//!
//! - **Type Parsing**: `0x2::coin::Coin<0x2::sui::SUI>` into a [`TypeExpr`] tree
//! - **Normalisation**: address compression and package-version aliases
//! - **Registry**: struct/enum declarations with phantom type parameters
//! - **Codecs**: BCS binary, tagged node JSON, canonical JSON
//!
//! # Quick Start
//!
//! ```
//! use move_reify::{DecodedValue, StructDecl, TypeRegistry};
//!
//! let registry = TypeRegistry::new();
//! registry.register(
//!     StructDecl::new("0x2::balance::Balance")
//!         .phantom_param("T")
//!         .field("value", "u64")
//!         .build()?,
//! )?;
//!
//! let balance = registry.reified("0x2::balance::Balance<0x2::sui::SUI>")?;
//! let value = balance.decode_binary(&1000u64.to_le_bytes())?;
//! assert_eq!(value.get_field("value"), Some(&DecodedValue::U64(1000)));
//!
//! let json = balance.encode_json(&value)?;
//! assert_eq!(json["$typeArgs"][0], "0x2::sui::SUI");
//! assert_eq!(json["value"], "1000");
//! # Ok::<(), move_reify::ReifyError>(())
//! ```
//!
//! # Configuration File
//!
//! ```toml
//! [limits]
//! max_depth = 128
//! max_vector_len = 1048576
//!
//! [[aliases]]
//! from = "0x6a1f"
//! to = "0x9bc2"
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod registry;
pub mod types;
pub mod value;

pub use codec::{ObjectData, Reified, Schema, TypeDescriptor};
pub use config::{CodecConfig, ConfigError, Limits, PackageAlias};
pub use error::{ReifyError, Result};
pub use registry::{EnumDecl, StructDecl, TypeDecl, TypeRegistry};
pub use types::{compose, compress, decompose, parse, Address, Primitive, TypeExpr};
pub use value::{DecodedValue, Fields, U256};
