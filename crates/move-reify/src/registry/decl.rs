// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Contract type declarations and their fluent builders.
//!
//! A declaration is the registry's codec factory: given concrete type
//! arguments it yields the field layout of one instantiation.

use crate::codec::descriptor::to_camel_case;
use crate::error::{ReifyError, Result};
use crate::types::{parse, parse_declared, PackageAliases, TypeExpr};
use std::collections::HashSet;

/// A declared type parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    /// Parameter name as used in field types.
    pub name: String,
    /// Phantom parameters affect identity only, never layout.
    pub phantom: bool,
}

/// A declared field. `ty` may reference the owner's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: String,
    pub ty: TypeExpr,
}

/// Struct declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructDecl {
    head: TypeExpr,
    type_params: Vec<TypeParam>,
    fields: Vec<FieldDecl>,
}

/// One enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariantDecl {
    pub name: String,
    pub fields: Vec<FieldDecl>,
}

/// Enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumDecl {
    head: TypeExpr,
    type_params: Vec<TypeParam>,
    variants: Vec<VariantDecl>,
}

/// A registrable declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeDecl {
    Struct(StructDecl),
    Enum(EnumDecl),
}

impl StructDecl {
    /// Start building a struct declaration, e.g. `"0x2::coin::Coin"`.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: impl Into<String>) -> StructBuilder {
        StructBuilder {
            name: name.into(),
            params: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Declared fields in order.
    pub fn fields(&self) -> &[FieldDecl] {
        &self.fields
    }
}

impl EnumDecl {
    /// Start building an enum declaration.
    #[allow(clippy::new_ret_no_self)]
    pub fn new(name: impl Into<String>) -> EnumBuilder {
        EnumBuilder {
            name: name.into(),
            params: Vec::new(),
            variants: Vec::new(),
        }
    }

    /// Declared variants in index order.
    pub fn variants(&self) -> &[VariantDecl] {
        &self.variants
    }
}

impl TypeDecl {
    fn head(&self) -> &TypeExpr {
        match self {
            Self::Struct(s) => &s.head,
            Self::Enum(e) => &e.head,
        }
    }

    /// Uninstantiated name (`0x2::coin::Coin`).
    pub fn name(&self) -> String {
        self.head().base_name()
    }

    /// Declared type parameters.
    pub fn type_params(&self) -> &[TypeParam] {
        match self {
            Self::Struct(s) => &s.type_params,
            Self::Enum(e) => &e.type_params,
        }
    }

    /// Number of type parameters.
    pub fn arity(&self) -> usize {
        self.type_params().len()
    }

    /// Per-parameter phantom flags.
    pub fn phantom_mask(&self) -> Vec<bool> {
        self.type_params().iter().map(|p| p.phantom).collect()
    }

    /// Rewrite the name and every field type through `aliases`.
    pub(crate) fn canonicalize(&self, aliases: &PackageAliases) -> Self {
        let fields = |fields: &[FieldDecl]| -> Vec<FieldDecl> {
            fields
                .iter()
                .map(|f| FieldDecl {
                    name: f.name.clone(),
                    ty: aliases.canonicalize(&f.ty),
                })
                .collect()
        };

        match self {
            Self::Struct(s) => Self::Struct(StructDecl {
                head: aliases.canonicalize(&s.head),
                type_params: s.type_params.clone(),
                fields: fields(&s.fields),
            }),
            Self::Enum(e) => Self::Enum(EnumDecl {
                head: aliases.canonicalize(&e.head),
                type_params: e.type_params.clone(),
                variants: e
                    .variants
                    .iter()
                    .map(|v| VariantDecl {
                        name: v.name.clone(),
                        fields: fields(&v.fields),
                    })
                    .collect(),
            }),
        }
    }
}

impl From<StructDecl> for TypeDecl {
    fn from(s: StructDecl) -> Self {
        Self::Struct(s)
    }
}

impl From<EnumDecl> for TypeDecl {
    fn from(e: EnumDecl) -> Self {
        Self::Enum(e)
    }
}

/// Builder for struct declarations.
#[derive(Debug)]
pub struct StructBuilder {
    name: String,
    params: Vec<TypeParam>,
    fields: Vec<(String, String)>,
}

impl StructBuilder {
    /// Add an ordinary type parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(TypeParam {
            name: name.into(),
            phantom: false,
        });
        self
    }

    /// Add a phantom type parameter.
    pub fn phantom_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(TypeParam {
            name: name.into(),
            phantom: true,
        });
        self
    }

    /// Add a field; `ty` is a type string that may name the parameters.
    pub fn field(mut self, name: impl Into<String>, ty: impl Into<String>) -> Self {
        self.fields.push((name.into(), ty.into()));
        self
    }

    /// Parse and validate the declaration.
    pub fn build(self) -> Result<TypeDecl> {
        let head = parse_head(&self.name)?;
        let name = head.base_name();
        check_params(&name, &self.params)?;
        let fields = build_fields(&name, &self.params, &self.fields)?;
        Ok(TypeDecl::Struct(StructDecl {
            head,
            type_params: self.params,
            fields,
        }))
    }
}

/// Builder for enum declarations.
#[derive(Debug)]
pub struct EnumBuilder {
    name: String,
    params: Vec<TypeParam>,
    variants: Vec<(String, Vec<(String, String)>)>,
}

impl EnumBuilder {
    /// Add an ordinary type parameter.
    pub fn param(mut self, name: impl Into<String>) -> Self {
        self.params.push(TypeParam {
            name: name.into(),
            phantom: false,
        });
        self
    }

    /// Add a phantom type parameter.
    pub fn phantom_param(mut self, name: impl Into<String>) -> Self {
        self.params.push(TypeParam {
            name: name.into(),
            phantom: true,
        });
        self
    }

    /// Add a variant. Its index is its position in declaration order.
    pub fn variant(mut self, name: impl Into<String>, fields: &[(&str, &str)]) -> Self {
        self.variants.push((
            name.into(),
            fields
                .iter()
                .map(|(n, t)| ((*n).to_string(), (*t).to_string()))
                .collect(),
        ));
        self
    }

    /// Parse and validate the declaration.
    pub fn build(self) -> Result<TypeDecl> {
        let head = parse_head(&self.name)?;
        let name = head.base_name();
        check_params(&name, &self.params)?;

        if self.variants.is_empty() {
            return Err(invalid(&name, "enum declares no variants"));
        }
        let mut seen = HashSet::new();
        let mut variants = Vec::with_capacity(self.variants.len());
        for (variant, fields) in &self.variants {
            if !seen.insert(variant.as_str()) {
                return Err(invalid(&name, format!("duplicate variant '{}'", variant)));
            }
            variants.push(VariantDecl {
                name: variant.clone(),
                fields: build_fields(&name, &self.params, fields)?,
            });
        }

        Ok(TypeDecl::Enum(EnumDecl {
            head,
            type_params: self.params,
            variants,
        }))
    }
}

fn invalid(type_name: &str, reason: impl Into<String>) -> ReifyError {
    ReifyError::InvalidDeclaration {
        type_name: type_name.to_string(),
        reason: reason.into(),
    }
}

fn parse_head(name: &str) -> Result<TypeExpr> {
    let head = parse(name)?;
    match &head {
        TypeExpr::Named { type_args, .. } if type_args.is_empty() => Ok(head),
        _ => Err(invalid(name, "expected an uninstantiated address::module::Name")),
    }
}

fn check_params(type_name: &str, params: &[TypeParam]) -> Result<()> {
    let mut seen = HashSet::new();
    for p in params {
        if !seen.insert(p.name.as_str()) {
            return Err(invalid(type_name, format!("duplicate type parameter '{}'", p.name)));
        }
    }
    Ok(())
}

fn build_fields(
    type_name: &str,
    params: &[TypeParam],
    raw: &[(String, String)],
) -> Result<Vec<FieldDecl>> {
    let names: Vec<String> = params.iter().map(|p| p.name.clone()).collect();
    let mut seen = HashSet::new();
    let mut json_names = HashSet::new();
    let mut fields = Vec::with_capacity(raw.len());

    for (name, ty) in raw {
        if !seen.insert(name.as_str()) {
            return Err(invalid(type_name, format!("duplicate field '{}'", name)));
        }
        // Canonical JSON keys must stay unique.
        let json_name = to_camel_case(name);
        if !json_names.insert(json_name.clone()) {
            return Err(invalid(
                type_name,
                format!("field '{}' collides with another field as JSON key '{}'", name, json_name),
            ));
        }
        let ty = parse_declared(ty, &names)?;
        check_phantom_usage(type_name, params, name, &ty)?;
        fields.push(FieldDecl {
            name: name.clone(),
            ty,
        });
    }
    Ok(fields)
}

/// A phantom parameter may not be a field's layout: neither the field type
/// itself nor a vector element. Inside named type arguments the callee's
/// own mask decides, which is checked at resolution.
fn check_phantom_usage(
    type_name: &str,
    params: &[TypeParam],
    field: &str,
    ty: &TypeExpr,
) -> Result<()> {
    let mut current = ty;
    loop {
        match current {
            TypeExpr::Param(i) => {
                let param = &params[usize::from(*i)];
                if param.phantom {
                    return Err(invalid(
                        type_name,
                        format!(
                            "phantom parameter '{}' used as layout of field '{}'",
                            param.name, field
                        ),
                    ));
                }
                return Ok(());
            }
            TypeExpr::Vector(inner) => current = inner,
            _ => return Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Primitive;

    #[test]
    fn test_build_generic_struct() {
        let decl = StructDecl::new("0x0002::coin::Coin")
            .phantom_param("T")
            .field("id", "0x2::object::UID")
            .field("balance", "0x2::balance::Balance<T>")
            .build()
            .unwrap();

        assert_eq!(decl.name(), "0x2::coin::Coin");
        assert_eq!(decl.arity(), 1);
        assert_eq!(decl.phantom_mask(), vec![true]);
        match &decl {
            TypeDecl::Struct(s) => {
                assert_eq!(s.fields()[1].ty.type_args(), &[TypeExpr::Param(0)]);
            }
            TypeDecl::Enum(_) => panic!("expected struct"),
        }
    }

    #[test]
    fn test_build_enum() {
        let decl = EnumDecl::new("0x5::shape::Shape")
            .param("T")
            .variant("Empty", &[])
            .variant("Point", &[("x", "T"), ("y", "T")])
            .build()
            .unwrap();

        match decl {
            TypeDecl::Enum(e) => {
                assert_eq!(e.variants().len(), 2);
                assert!(e.variants()[0].fields.is_empty());
                assert_eq!(e.variants()[1].fields[0].ty, TypeExpr::Param(0));
            }
            TypeDecl::Struct(_) => panic!("expected enum"),
        }
    }

    #[test]
    fn test_rejects_bad_declarations() {
        // Instantiated name.
        assert!(StructDecl::new("0x2::coin::Coin<u8>").build().is_err());
        // Primitive name.
        assert!(StructDecl::new("u8").build().is_err());
        // Duplicate field.
        assert!(StructDecl::new("0x1::a::A")
            .field("x", "u8")
            .field("x", "u16")
            .build()
            .is_err());
        // Unknown parameter name.
        assert!(StructDecl::new("0x1::a::A").field("x", "T").build().is_err());
        // Duplicate parameter.
        assert!(StructDecl::new("0x1::a::A")
            .param("T")
            .param("T")
            .build()
            .is_err());
        // Enum without variants.
        assert!(EnumDecl::new("0x1::a::E").build().is_err());
        // Duplicate variant.
        assert!(EnumDecl::new("0x1::a::E")
            .variant("A", &[])
            .variant("A", &[])
            .build()
            .is_err());
    }

    #[test]
    fn test_rejects_colliding_json_keys() {
        let err = StructDecl::new("0x1::a::A")
            .field("a_b", "u8")
            .field("aB", "u8")
            .build();
        assert!(matches!(
            err,
            Err(ReifyError::InvalidDeclaration { ref reason, .. }) if reason.contains("'aB'")
        ));

        let err = EnumDecl::new("0x1::a::E")
            .variant("V", &[("max_fee", "u64"), ("maxFee", "u64")])
            .build();
        assert!(matches!(err, Err(ReifyError::InvalidDeclaration { .. })));

        // Leading underscores keep keys apart.
        assert!(StructDecl::new("0x1::a::A")
            .field("_value", "u8")
            .field("value", "u8")
            .build()
            .is_ok());
    }

    #[test]
    fn test_phantom_parameter_cannot_be_layout() {
        let err = StructDecl::new("0x1::a::A")
            .phantom_param("T")
            .field("items", "vector<T>")
            .build();
        assert!(matches!(err, Err(ReifyError::InvalidDeclaration { .. })));

        let err = EnumDecl::new("0x1::a::E")
            .phantom_param("T")
            .variant("V", &[("inner", "T")])
            .build();
        assert!(matches!(err, Err(ReifyError::InvalidDeclaration { .. })));
    }

    #[test]
    fn test_canonicalize_rewrites_addresses() {
        let decl = StructDecl::new("0xa::pool::Pool")
            .field("lp", "0xa::pool::LP")
            .field("n", "u64")
            .build()
            .unwrap();

        let mut aliases = PackageAliases::new();
        aliases.insert(
            crate::types::Address::from_u64(0xa),
            crate::types::Address::from_u64(0xb),
        );
        let canonical = decl.canonicalize(&aliases);
        assert_eq!(canonical.name(), "0xb::pool::Pool");
        match canonical {
            TypeDecl::Struct(s) => {
                assert_eq!(s.fields()[0].ty.to_string(), "0xb::pool::LP");
                assert_eq!(s.fields()[1].ty, TypeExpr::Primitive(Primitive::U64));
            }
            TypeDecl::Enum(_) => panic!("expected struct"),
        }
    }
}
