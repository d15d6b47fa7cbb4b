// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! 32-byte account addresses.

use std::fmt;
use std::str::FromStr;

/// Address length in bytes.
pub const ADDRESS_LENGTH: usize = 32;

/// A Move account address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address([u8; ADDRESS_LENGTH]);

/// Address parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    MissingPrefix,
    Empty,
    TooLong(usize),
    InvalidHex,
}

impl fmt::Display for AddressError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingPrefix => write!(f, "address must start with 0x"),
            Self::Empty => write!(f, "address has no hex digits"),
            Self::TooLong(n) => write!(f, "address has {} hex digits, max 64", n),
            Self::InvalidHex => write!(f, "address contains non-hex characters"),
        }
    }
}

impl std::error::Error for AddressError {}

impl Address {
    /// The zero address.
    pub const ZERO: Self = Self([0; ADDRESS_LENGTH]);

    /// Create from raw bytes.
    pub const fn new(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Address with a small integer value (`0x1`, `0x2`, ...).
    pub fn from_u64(value: u64) -> Self {
        let mut bytes = [0u8; ADDRESS_LENGTH];
        bytes[ADDRESS_LENGTH - 8..].copy_from_slice(&value.to_be_bytes());
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Full 64-digit lowercase hex form with `0x` prefix.
    pub fn to_hex_literal(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Hex form without leading zero padding (`0x2`).
    pub fn short_hex(&self) -> String {
        let full = hex::encode(self.0);
        let trimmed = full.trim_start_matches('0');
        if trimmed.is_empty() {
            "0x0".to_string()
        } else {
            format!("0x{}", trimmed)
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .ok_or(AddressError::MissingPrefix)?;
        if digits.is_empty() {
            return Err(AddressError::Empty);
        }
        if digits.len() > ADDRESS_LENGTH * 2 {
            return Err(AddressError::TooLong(digits.len()));
        }

        let padded = format!("{:0>64}", digits);
        let mut bytes = [0u8; ADDRESS_LENGTH];
        hex::decode_to_slice(padded, &mut bytes).map_err(|_| AddressError::InvalidHex)?;
        Ok(Self(bytes))
    }
}

impl From<[u8; ADDRESS_LENGTH]> for Address {
    fn from(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }
}
