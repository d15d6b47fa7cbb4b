// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec registry.
//!
//! Maps uninstantiated type names to their declarations and turns concrete
//! type expressions into [`TypeDescriptor`]s. Resolved instantiations are
//! cached; only successful resolutions are stored.
//!
//! # Example
//!
//! ```
//! use move_reify::{StructDecl, TypeRegistry};
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
//! assert_eq!(balance.type_string(), "0x2::balance::Balance<0x2::sui::SUI>");
//! # Ok::<(), move_reify::ReifyError>(())
//! ```

mod decl;

pub use decl::{
    EnumBuilder, EnumDecl, FieldDecl, StructBuilder, StructDecl, TypeDecl, TypeParam, VariantDecl,
};

use crate::codec::descriptor::{
    is_builtin, FieldLayout, Layout, StringKind, TypeDescriptor, VariantLayout, ASCII_STRING_TYPE,
    OPTION_TYPE, UTF8_STRING_TYPE,
};
use crate::codec::Reified;
use crate::config::{CodecConfig, ConfigError, Limits};
use crate::error::{ReifyError, Result};
use crate::types::{parse_with_depth, PackageAliases, TypeExpr};
use dashmap::DashMap;
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static GLOBAL: OnceLock<TypeRegistry> = OnceLock::new();

/// Outcome of a module's registration closure, shared by racing callers.
type ModuleInit = Arc<OnceLock<std::result::Result<(), String>>>;

/// Registry of contract type declarations.
pub struct TypeRegistry {
    decls: RwLock<HashMap<String, Arc<TypeDecl>>>,
    /// Grows with every distinct instantiation seen; see [`Self::clear_cache`].
    cache: DashMap<String, Arc<TypeDescriptor>>,
    modules: Mutex<HashMap<String, ModuleInit>>,
    config: CodecConfig,
    aliases: PackageAliases,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.len())
            .field("cached", &self.cache.len())
            .field("limits", &self.config.limits)
            .field("aliases", &self.aliases.len())
            .finish()
    }
}

impl TypeRegistry {
    /// Create an empty registry with default limits and no aliases.
    pub fn new() -> Self {
        Self {
            decls: RwLock::new(HashMap::new()),
            cache: DashMap::new(),
            modules: Mutex::new(HashMap::new()),
            config: CodecConfig::default(),
            aliases: PackageAliases::new(),
        }
    }

    /// Create an empty registry from a validated configuration.
    pub fn with_config(config: CodecConfig) -> Result<Self> {
        config.validate()?;
        let aliases = PackageAliases::from_config(&config.aliases)?;
        log::debug!(
            "[TypeRegistry] Created with max_depth={} max_vector_len={} aliases={}",
            config.limits.max_depth,
            config.limits.max_vector_len,
            aliases.len()
        );
        Ok(Self {
            decls: RwLock::new(HashMap::new()),
            cache: DashMap::new(),
            modules: Mutex::new(HashMap::new()),
            config,
            aliases,
        })
    }

    /// Process-wide registry.
    ///
    /// Uses the configuration passed to [`TypeRegistry::init_global`] if that
    /// ran first, defaults otherwise.
    pub fn global() -> &'static TypeRegistry {
        GLOBAL.get_or_init(|| {
            log::info!("[TypeRegistry] Global registry initialized with defaults");
            TypeRegistry::new()
        })
    }

    /// Configure the process-wide registry. Fails once it already exists.
    pub fn init_global(config: CodecConfig) -> Result<&'static TypeRegistry> {
        let registry = Self::with_config(config)?;
        GLOBAL.set(registry).map_err(|_| {
            ConfigError::Invalid("global registry is already initialized".into())
        })?;
        log::info!("[TypeRegistry] Global registry initialized from configuration");
        Ok(Self::global())
    }

    /// Active configuration.
    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    /// Active limits.
    pub fn limits(&self) -> Limits {
        self.config.limits
    }

    /// Package-version aliases.
    pub fn aliases(&self) -> &PackageAliases {
        &self.aliases
    }

    /// Register a declaration.
    ///
    /// Registering an equal declaration again is a no-op; a different
    /// declaration under the same name is rejected.
    pub fn register(&self, decl: TypeDecl) -> Result<()> {
        let decl = decl.canonicalize(&self.aliases);
        let name = decl.name();
        if is_builtin(&name) {
            return Err(ReifyError::InvalidDeclaration {
                type_name: name,
                reason: "built-in type cannot be redeclared".into(),
            });
        }

        let mut decls = self.decls.write();
        match decls.get(&name) {
            Some(existing) if **existing == decl => {
                log::trace!("[TypeRegistry] {} already registered", name);
                Ok(())
            }
            Some(_) => {
                log::warn!(
                    "[TypeRegistry] Rejected conflicting declaration of {}",
                    name
                );
                Err(ReifyError::DuplicateRegistration(name))
            }
            None => {
                log::debug!(
                    "[TypeRegistry] Registered {} (arity {})",
                    name,
                    decl.arity()
                );
                decls.insert(name, Arc::new(decl));
                Ok(())
            }
        }
    }

    /// Register every declaration, stopping at the first failure.
    pub fn register_all<I>(&self, decls: I) -> Result<()>
    where
        I: IntoIterator<Item = TypeDecl>,
    {
        for decl in decls {
            self.register(decl)?;
        }
        Ok(())
    }

    /// Run a module's registration closure at most once.
    ///
    /// Concurrent callers for the same module block until the first one
    /// finishes and then observe its outcome.
    pub fn register_module<F>(&self, module: &str, init: F) -> Result<()>
    where
        F: FnOnce(&TypeRegistry) -> Result<()>,
    {
        let cell = {
            let mut modules = self.modules.lock();
            modules.entry(module.to_string()).or_default().clone()
        };

        let outcome = cell.get_or_init(|| {
            log::debug!("[TypeRegistry] Registering module {}", module);
            init(self).map_err(|e| e.to_string())
        });

        outcome.clone().map_err(|reason| ReifyError::InvalidDeclaration {
            type_name: module.to_string(),
            reason,
        })
    }

    /// Whether `type_name` (uninstantiated) is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.decls.read().contains_key(type_name)
    }

    /// Declaration registered under `type_name`.
    pub fn lookup(&self, type_name: &str) -> Option<Arc<TypeDecl>> {
        self.decls.read().get(type_name).cloned()
    }

    /// Number of registered declarations.
    pub fn len(&self) -> usize {
        self.decls.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.decls.read().is_empty()
    }

    /// Registered names, sorted.
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.decls.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of cached instantiations.
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Drop every cached instantiation. Declarations stay registered and
    /// descriptors already handed out remain valid.
    ///
    /// The cache is unbounded: callers resolving type strings from
    /// untrusted input should clear it periodically.
    pub fn clear_cache(&self) {
        log::debug!("[TypeRegistry] Clearing {} cached instantiations", self.cache.len());
        self.cache.clear();
    }

    /// Parse, normalise and resolve a type string.
    pub fn reified(&self, type_string: &str) -> Result<Reified<'_>> {
        let expr = self.parse(type_string)?;
        let descriptor = self.resolve(&expr)?;
        Ok(Reified::new(self, descriptor))
    }

    /// Resolve an already-parsed expression.
    pub fn reified_expr(&self, expr: &TypeExpr) -> Result<Reified<'_>> {
        let descriptor = self.resolve(expr)?;
        Ok(Reified::new(self, descriptor))
    }

    /// Parse with this registry's depth limit.
    pub fn parse(&self, type_string: &str) -> Result<TypeExpr> {
        parse_with_depth(type_string, self.config.limits.max_depth)
    }

    /// `compress` with this registry's aliases.
    pub fn compress(&self, type_string: &str) -> Result<String> {
        Ok(self.aliases.canonicalize(&self.parse(type_string)?).to_string())
    }

    /// Resolve a concrete expression to its descriptor.
    pub fn resolve(&self, expr: &TypeExpr) -> Result<Arc<TypeDescriptor>> {
        let limit = self.config.limits.max_depth;
        if expr.exceeds_depth(limit) {
            return Err(ReifyError::DepthExceeded { limit });
        }
        let canonical = self.aliases.canonicalize(expr);
        self.resolve_at(&canonical, 0)
    }

    /// Resolve an expression that is already canonical (field types and
    /// arguments of resolved descriptors).
    pub(crate) fn resolve_canonical(&self, expr: &TypeExpr) -> Result<Arc<TypeDescriptor>> {
        self.resolve_at(expr, 0)
    }

    fn enter(&self, depth: usize) -> Result<()> {
        let limit = self.config.limits.max_depth;
        if depth >= limit {
            return Err(ReifyError::DepthExceeded { limit });
        }
        Ok(())
    }

    fn resolve_at(&self, expr: &TypeExpr, depth: usize) -> Result<Arc<TypeDescriptor>> {
        self.enter(depth)?;

        let key = expr.to_string();
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.value().clone());
        }
        log::trace!("[TypeRegistry] Resolving {}", key);

        let descriptor = match expr {
            TypeExpr::Param(i) => {
                return Err(ReifyError::malformed(
                    &key,
                    0,
                    format!("unbound type parameter #{}", i),
                ))
            }
            TypeExpr::Primitive(p) => TypeDescriptor::primitive(*p),
            TypeExpr::Vector(inner) => TypeDescriptor::vector(self.resolve_at(inner, depth + 1)?),
            TypeExpr::Named { type_args, .. } => {
                let name = expr.base_name();
                match name.as_str() {
                    OPTION_TYPE => {
                        check_arity(&name, 1, type_args.len())?;
                        TypeDescriptor::option(self.resolve_at(&type_args[0], depth + 1)?)
                    }
                    UTF8_STRING_TYPE => {
                        check_arity(&name, 0, type_args.len())?;
                        TypeDescriptor::string(StringKind::Utf8)
                    }
                    ASCII_STRING_TYPE => {
                        check_arity(&name, 0, type_args.len())?;
                        TypeDescriptor::string(StringKind::Ascii)
                    }
                    _ => self.instantiate(&name, type_args, depth)?,
                }
            }
        };

        let descriptor = Arc::new(descriptor);
        self.cache.insert(key, descriptor.clone());
        log::debug!("[TypeRegistry] Cached {}", descriptor.type_string());
        Ok(descriptor)
    }

    fn instantiate(
        &self,
        name: &str,
        type_args: &[TypeExpr],
        depth: usize,
    ) -> Result<TypeDescriptor> {
        let decl = self
            .lookup(name)
            .ok_or_else(|| ReifyError::UnknownType(name.to_string()))?;
        check_arity(name, decl.arity(), type_args.len())?;

        let mask = decl.phantom_mask();
        let mut args = Vec::with_capacity(type_args.len());
        for (arg, phantom) in type_args.iter().zip(&mask) {
            let resolved = if *phantom {
                self.resolve_phantom(arg, depth + 1)?
            } else {
                self.resolve_at(arg, depth + 1)?
            };
            args.push(resolved);
        }

        let substitute = |fields: &[FieldDecl]| -> Result<Vec<FieldLayout>> {
            fields
                .iter()
                .map(|f| {
                    let ty = f.ty.substitute(type_args).ok_or_else(|| {
                        ReifyError::InvalidDeclaration {
                            type_name: name.to_string(),
                            reason: format!("field '{}' references an unknown parameter", f.name),
                        }
                    })?;
                    Ok(FieldLayout::new(&f.name, ty))
                })
                .collect()
        };

        let layout = match decl.as_ref() {
            TypeDecl::Struct(s) => Layout::Struct(substitute(s.fields())?),
            TypeDecl::Enum(e) => Layout::Enum(
                e.variants()
                    .iter()
                    .map(|v| {
                        Ok(VariantLayout {
                            name: v.name.clone(),
                            fields: substitute(&v.fields)?,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
        };

        Ok(TypeDescriptor::new(name.to_string(), args, mask, layout))
    }

    /// Phantom arguments carry identity only. They must be well-formed and,
    /// when the head is known, have the right arity; unknown heads are fine.
    fn resolve_phantom(&self, expr: &TypeExpr, depth: usize) -> Result<Arc<TypeDescriptor>> {
        self.enter(depth)?;

        let (name, args) = match expr {
            TypeExpr::Param(i) => {
                return Err(ReifyError::malformed(
                    &expr.to_string(),
                    0,
                    format!("unbound type parameter #{}", i),
                ))
            }
            TypeExpr::Primitive(_) => (expr.base_name(), Vec::new()),
            TypeExpr::Vector(inner) => ("vector".to_string(), vec![inner.as_ref().clone()]),
            TypeExpr::Named { type_args, .. } => {
                let name = expr.base_name();
                let expected = match name.as_str() {
                    OPTION_TYPE => Some(1),
                    UTF8_STRING_TYPE | ASCII_STRING_TYPE => Some(0),
                    _ => self.lookup(&name).map(|d| d.arity()),
                };
                if let Some(expected) = expected {
                    check_arity(&name, expected, type_args.len())?;
                }
                (name, type_args.clone())
            }
        };

        let resolved = args
            .iter()
            .map(|a| self.resolve_phantom(a, depth + 1))
            .collect::<Result<Vec<_>>>()?;
        let flags = vec![true; resolved.len()];
        Ok(Arc::new(TypeDescriptor::new(
            name,
            resolved,
            flags,
            Layout::Phantom,
        )))
    }
}

fn check_arity(type_name: &str, expected: usize, found: usize) -> Result<()> {
    if expected != found {
        return Err(ReifyError::ArityMismatch {
            type_name: type_name.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_MAX_DEPTH;
    use crate::types::Primitive;

    fn coin_registry() -> TypeRegistry {
        let registry = TypeRegistry::new();
        registry
            .register_all([
                StructDecl::new("0x2::balance::Balance")
                    .phantom_param("T")
                    .field("value", "u64")
                    .build()
                    .unwrap(),
                StructDecl::new("0x2::coin::Coin")
                    .phantom_param("T")
                    .field("id", "address")
                    .field("balance", "0x2::balance::Balance<T>")
                    .build()
                    .unwrap(),
                StructDecl::new("0x2::sui::SUI")
                    .field("dummy_field", "bool")
                    .build()
                    .unwrap(),
            ])
            .unwrap();
        registry
    }

    #[test]
    fn test_resolve_builtins_without_registration() {
        let registry = TypeRegistry::new();
        let desc = registry
            .reified("0x1::option::Option<vector<0x1::string::String>>")
            .unwrap();
        assert_eq!(
            desc.type_string(),
            "0x1::option::Option<vector<0x1::string::String>>"
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn test_resolve_generic_struct() {
        let registry = coin_registry();
        let coin = registry.reified("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        let desc = coin.descriptor();
        assert_eq!(desc.type_name(), "0x2::coin::Coin");
        assert_eq!(desc.is_phantom(), &[true]);
        assert_eq!(desc.type_args()[0].layout(), &Layout::Phantom);

        match desc.layout() {
            Layout::Struct(fields) => {
                assert_eq!(fields[1].ty.to_string(), "0x2::balance::Balance<0x2::sui::SUI>");
            }
            other => panic!("unexpected layout {:?}", other),
        }
    }

    #[test]
    fn test_unknown_phantom_argument_is_allowed() {
        let registry = coin_registry();
        let coin = registry.reified("0x2::coin::Coin<0xdead::fake::FAKE>").unwrap();
        assert_eq!(coin.type_string(), "0x2::coin::Coin<0xdead::fake::FAKE>");
    }

    #[test]
    fn test_unknown_and_arity_errors() {
        let registry = coin_registry();
        assert!(matches!(
            registry.reified("0x9::nope::Nope"),
            Err(ReifyError::UnknownType(name)) if name == "0x9::nope::Nope"
        ));
        assert!(matches!(
            registry.reified("0x2::coin::Coin"),
            Err(ReifyError::ArityMismatch { expected: 1, found: 0, .. })
        ));
        assert!(matches!(
            registry.reified("0x1::option::Option<u8, u8>"),
            Err(ReifyError::ArityMismatch { .. })
        ));
        // Known phantom head with the wrong arity.
        assert!(matches!(
            registry.reified("0x2::coin::Coin<0x2::balance::Balance>"),
            Err(ReifyError::ArityMismatch { .. })
        ));
    }

    #[test]
    fn test_register_idempotent_and_conflicting() {
        let registry = coin_registry();
        let same = StructDecl::new("0x2::sui::SUI")
            .field("dummy_field", "bool")
            .build()
            .unwrap();
        registry.register(same).unwrap();
        assert_eq!(registry.len(), 3);

        let different = StructDecl::new("0x2::sui::SUI")
            .field("dummy_field", "u8")
            .build()
            .unwrap();
        assert!(matches!(
            registry.register(different),
            Err(ReifyError::DuplicateRegistration(_))
        ));
    }

    #[test]
    fn test_builtin_cannot_be_registered() {
        let registry = TypeRegistry::new();
        let decl = StructDecl::new("0x1::string::String")
            .field("bytes", "vector<u8>")
            .build()
            .unwrap();
        assert!(matches!(
            registry.register(decl),
            Err(ReifyError::InvalidDeclaration { .. })
        ));
    }

    #[test]
    fn test_cache_serves_same_descriptor() {
        let registry = coin_registry();
        let a = registry.resolve(&registry.parse("0x2::coin::Coin<0x2::sui::SUI>").unwrap()).unwrap();
        let b = registry
            .resolve(
                &registry
                    .parse("0x0000000000000000000000000000000000000000000000000000000000000002::coin::Coin<0x2::sui::SUI>")
                    .unwrap(),
            )
            .unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(registry.cached_len() >= 1);
    }

    #[test]
    fn test_failed_resolution_is_not_cached() {
        let registry = TypeRegistry::new();
        assert!(registry.reified("vector<0x3::x::Y>").is_err());
        assert_eq!(registry.cached_len(), 0);
    }

    #[test]
    fn test_aliases_apply_to_declarations_and_lookups() {
        let config = CodecConfig::default().with_alias("0xa", "0xb");
        let registry = TypeRegistry::with_config(config).unwrap();
        registry
            .register(StructDecl::new("0xa::pool::Pool").field("n", "u8").build().unwrap())
            .unwrap();
        assert!(registry.contains("0xb::pool::Pool"));

        let pool = registry.reified("0xa::pool::Pool").unwrap();
        assert_eq!(pool.type_string(), "0xb::pool::Pool");
    }

    #[test]
    fn test_register_module_runs_once() {
        let registry = TypeRegistry::new();
        let mut calls = 0;
        registry
            .register_module("0x2::sui", |r| {
                calls += 1;
                r.register(
                    StructDecl::new("0x2::sui::SUI")
                        .field("dummy_field", "bool")
                        .build()?,
                )
            })
            .unwrap();
        registry
            .register_module("0x2::sui", |_| panic!("module initialized twice"))
            .unwrap();
        assert_eq!(calls, 1);
        assert!(registry.contains("0x2::sui::SUI"));
    }

    #[test]
    fn test_register_module_failure_is_sticky() {
        let registry = TypeRegistry::new();
        let first = registry.register_module("broken", |_| {
            Err(ReifyError::UnknownType("0x1::x::Y".into()))
        });
        assert!(first.is_err());
        assert!(registry.register_module("broken", |_| Ok(())).is_err());
    }

    #[test]
    fn test_depth_limit_applies_to_resolution() {
        let config = CodecConfig::default().with_limits(Limits {
            max_depth: 3,
            max_vector_len: 16,
        });
        let registry = TypeRegistry::with_config(config).unwrap();
        assert!(registry.reified("vector<vector<u8>>").is_ok());
        assert!(matches!(
            registry.resolve(&TypeExpr::vector(TypeExpr::vector(TypeExpr::vector(
                Primitive::U8.into()
            )))),
            Err(ReifyError::DepthExceeded { limit: 3 })
        ));
    }

    #[test]
    fn test_deep_hand_built_expression_is_rejected_up_front() {
        let registry = TypeRegistry::new();
        let mut expr = TypeExpr::from(Primitive::U8);
        for _ in 0..10_000 {
            expr = TypeExpr::vector(expr);
        }
        assert!(expr.exceeds_depth(DEFAULT_MAX_DEPTH));
        assert!(matches!(
            registry.resolve(&expr),
            Err(ReifyError::DepthExceeded { .. })
        ));
        assert_eq!(registry.cached_len(), 0);
    }

    #[test]
    fn test_compress_uses_configured_depth() {
        let config = CodecConfig::default().with_limits(Limits {
            max_depth: 3,
            max_vector_len: 16,
        });
        let registry = TypeRegistry::with_config(config).unwrap();
        assert_eq!(
            registry.compress("vector<vector<u8>>").unwrap(),
            "vector<vector<u8>>"
        );
        assert!(matches!(
            registry.compress("vector<vector<vector<vector<u8>>>>"),
            Err(ReifyError::DepthExceeded { limit: 3 })
        ));
    }

    #[test]
    fn test_clear_cache_keeps_declarations() {
        let registry = coin_registry();
        let before = registry.reified("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        assert!(registry.cached_len() > 0);

        registry.clear_cache();
        assert_eq!(registry.cached_len(), 0);
        assert_eq!(before.type_string(), "0x2::coin::Coin<0x2::sui::SUI>");

        let after = registry.reified("0x2::coin::Coin<0x2::sui::SUI>").unwrap();
        assert_eq!(after.type_string(), before.type_string());
        assert!(registry.cached_len() > 0);
    }

    #[test]
    fn test_param_is_rejected() {
        let registry = TypeRegistry::new();
        assert!(matches!(
            registry.resolve(&TypeExpr::Param(0)),
            Err(ReifyError::MalformedType { .. })
        ));
    }
}
