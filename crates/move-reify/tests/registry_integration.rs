// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Registry population, concurrency and file configuration.

mod common;

use common::{coin_type, sui_framework, SUI};
use move_reify::{CodecConfig, ConfigError, Limits, ReifyError, StructDecl, TypeRegistry};
use std::io::Write;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn racing_registration_inserts_once() {
    let registry = Arc::new(TypeRegistry::new());
    let inits = Arc::new(AtomicUsize::new(0));

    std::thread::scope(|s| {
        for _ in 0..16 {
            let registry = Arc::clone(&registry);
            let inits = Arc::clone(&inits);
            s.spawn(move || {
                registry
                    .register_module("0x2::framework", |r| {
                        inits.fetch_add(1, Ordering::SeqCst);
                        r.register_all(sui_framework())
                    })
                    .unwrap();
                // Every caller sees a fully populated module afterwards.
                let coin = registry.reified(&coin_type(SUI)).unwrap();
                assert_eq!(coin.type_name(), "0x2::coin::Coin");
            });
        }
    });

    assert_eq!(inits.load(Ordering::SeqCst), 1);
    assert_eq!(registry.len(), 4);
}

#[test]
fn racing_identical_declarations_all_succeed() {
    let registry = TypeRegistry::new();
    std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                s.spawn(|| {
                    registry.register(
                        StructDecl::new("0x4::pool::Pool")
                            .field("reserve", "u64")
                            .build()
                            .unwrap(),
                    )
                })
            })
            .collect();
        for handle in handles {
            assert!(handle.join().unwrap().is_ok());
        }
    });
    assert_eq!(registry.type_names(), vec!["0x4::pool::Pool".to_string()]);
}

#[test]
fn config_file_drives_limits_and_aliases() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(
        file,
        r#"
[limits]
max_depth = 8
max_vector_len = 4

[[aliases]]
from = "0x00000000000000000000000000000000000000000000000000000000000000aa"
to = "0x2"
"#
    )
    .unwrap();

    let config = CodecConfig::from_file(file.path()).unwrap();
    assert_eq!(
        config.limits,
        Limits {
            max_depth: 8,
            max_vector_len: 4
        }
    );

    let registry = TypeRegistry::with_config(config).unwrap();
    registry.register_all(sui_framework()).unwrap();

    // Historical package address resolves to the canonical one.
    let coin = registry.reified("0xaa::coin::Coin<0xaa::sui::SUI>").unwrap();
    assert_eq!(coin.type_string(), "0x2::coin::Coin<0x2::sui::SUI>");
    assert!(coin.matches("0x2::coin::Coin<0xaa::sui::SUI>"));

    let v = registry.reified("vector<u8>").unwrap();
    assert!(v.decode_binary(&[4, 1, 2, 3, 4]).is_ok());
    assert!(matches!(
        v.decode_binary(&[5, 1, 2, 3, 4, 5]),
        Err(ReifyError::SizeExceeded { limit: 4, actual: 5, .. })
    ));

    let nested = format!("{}u8{}", "vector<".repeat(8), ">".repeat(8));
    assert!(matches!(
        registry.reified(&nested),
        Err(ReifyError::DepthExceeded { limit: 8 })
    ));
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[limits]\nmax_depth = 0").unwrap();
    assert!(matches!(
        CodecConfig::from_file(file.path()),
        Err(ConfigError::Invalid(_))
    ));

    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "[limits\nmax_depth = 3").unwrap();
    assert!(matches!(
        CodecConfig::from_file(file.path()),
        Err(ConfigError::Toml(_))
    ));

    assert!(matches!(
        CodecConfig::from_file("/nonexistent/move-reify.toml"),
        Err(ConfigError::Io(_))
    ));

    let bad = CodecConfig::default().with_alias("0x1", "0x1");
    assert!(matches!(
        TypeRegistry::with_config(bad),
        Err(ReifyError::Config(ConfigError::Invalid(_)))
    ));
}

#[test]
fn global_registry_is_shared() {
    let a = TypeRegistry::global();
    let b = TypeRegistry::global();
    assert!(std::ptr::eq(a, b));

    a.register(
        StructDecl::new("0x77::global::Marker")
            .field("flag", "bool")
            .build()
            .unwrap(),
    )
    .unwrap();
    assert!(b.contains("0x77::global::Marker"));
    assert!(TypeRegistry::init_global(CodecConfig::default()).is_err());
}
