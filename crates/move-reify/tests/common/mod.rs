// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared declarations for integration tests.

#![allow(dead_code)]

use move_reify::{EnumDecl, StructDecl, TypeDecl, TypeRegistry};

pub const SUI: &str = "0x2::sui::SUI";
pub const BAR: &str = "0x3::foo::BAR";

pub fn sui_framework() -> Vec<TypeDecl> {
    vec![
        StructDecl::new("0x2::object::UID")
            .field("id", "address")
            .build()
            .unwrap(),
        StructDecl::new("0x2::balance::Balance")
            .phantom_param("T")
            .field("value", "u64")
            .build()
            .unwrap(),
        StructDecl::new("0x2::coin::Coin")
            .phantom_param("T")
            .field("id", "0x2::object::UID")
            .field("balance", "0x2::balance::Balance<T>")
            .build()
            .unwrap(),
        StructDecl::new("0x2::sui::SUI")
            .field("dummy_field", "bool")
            .build()
            .unwrap(),
    ]
}

pub fn market() -> Vec<TypeDecl> {
    vec![
        EnumDecl::new("0x9::market::Side")
            .variant("Bid", &[("price", "u64")])
            .variant("Ask", &[("price", "u64")])
            .build()
            .unwrap(),
        StructDecl::new("0x9::market::Order")
            .param("Q")
            .phantom_param("Base")
            .field("order_id", "u128")
            .field("side", "0x9::market::Side")
            .field("quantity", "Q")
            .field("fills", "vector<Q>")
            .field("memo", "0x1::option::Option<0x1::string::String>")
            .field("tag", "0x1::ascii::String")
            .build()
            .unwrap(),
        EnumDecl::new("0x9::market::Tree")
            .param("T")
            .variant("Leaf", &[("value", "T")])
            .variant(
                "Node",
                &[
                    ("left", "0x9::market::Tree<T>"),
                    ("right", "0x9::market::Tree<T>"),
                ],
            )
            .build()
            .unwrap(),
        StructDecl::new("0x9::market::Link")
            .field("next", "0x1::option::Option<0x9::market::Link>")
            .build()
            .unwrap(),
    ]
}

/// Registry with the framework and market modules loaded.
pub fn registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry.register_all(sui_framework()).unwrap();
    registry.register_all(market()).unwrap();
    registry
}

pub fn coin_type(arg: &str) -> String {
    format!("0x2::coin::Coin<{}>", arg)
}
