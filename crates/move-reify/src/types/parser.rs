// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Type-Expression Parser
//!
//! Recursive-descent parser for canonical Move type strings.
//!
//! # Supported Syntax
//!
//! ```text
//! type       ::= primitive | "vector<" type ">" | named
//! primitive  ::= "bool" | "u8" | "u16" | "u32" | "u64" | "u128" | "u256"
//!              | "address" | "signer"
//! named      ::= address "::" ident "::" ident [ "<" type ("," type)* ">" ]
//! address    ::= "0x" hexdigit+
//! ```
//!
//! Whitespace is allowed around `<`, `>` and `,` only. Parsing is purely
//! structural: arity and existence are checked by the registry.

use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{ReifyError, Result};
use crate::types::{Address, Primitive, TypeExpr};
use std::str::FromStr;

/// Token types for the lexer.
#[derive(Debug, Clone, PartialEq)]
enum Token {
    Identifier(String),
    Address(Address),
    ColonColon,
    Lt,
    Gt,
    Comma,
    Eof,
}

struct Lexer<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self { input, pos: 0 }
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn next_char(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn prev_char(&self) -> Option<char> {
        self.input[..self.pos].chars().next_back()
    }

    fn error(&self, position: usize, reason: impl Into<String>) -> ReifyError {
        ReifyError::malformed(self.input, position, reason)
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_whitespace() {
                self.next_char();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let start = self.pos;
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                self.next_char();
            } else {
                break;
            }
        }
        self.input[start..self.pos].to_string()
    }

    fn read_address(&mut self) -> Result<Token> {
        let start = self.pos;
        self.pos += 2; // consume "0x"
        while let Some(ch) = self.peek_char() {
            if ch.is_ascii_hexdigit() {
                self.next_char();
            } else {
                break;
            }
        }
        if matches!(self.peek_char(), Some(c) if c.is_ascii_alphanumeric() || c == '_') {
            return Err(self.error(self.pos, "invalid character in address literal"));
        }

        let literal = &self.input[start..self.pos];
        literal
            .parse::<Address>()
            .map(Token::Address)
            .map_err(|e| self.error(start, e.to_string()))
    }

    /// Returns the next token and the byte offset it starts at.
    fn next_token(&mut self) -> Result<(Token, usize)> {
        self.skip_whitespace();
        let start = self.pos;

        let ch = match self.peek_char() {
            Some(c) => c,
            None => return Ok((Token::Eof, start)),
        };

        let token = match ch {
            '<' => {
                self.next_char();
                Token::Lt
            }
            '>' => {
                self.next_char();
                Token::Gt
            }
            ',' => {
                self.next_char();
                Token::Comma
            }
            ':' => {
                if matches!(self.prev_char(), Some(c) if c.is_ascii_whitespace()) {
                    return Err(self.error(start, "whitespace before '::'"));
                }
                self.next_char();
                if self.next_char() != Some(':') {
                    return Err(self.error(start, "expected '::'"));
                }
                if matches!(self.peek_char(), Some(c) if c.is_ascii_whitespace()) {
                    return Err(self.error(self.pos, "whitespace after '::'"));
                }
                Token::ColonColon
            }
            '0' if self.input[self.pos..].starts_with("0x") => self.read_address()?,
            c if c.is_ascii_alphabetic() || c == '_' => Token::Identifier(self.read_identifier()),
            c => return Err(self.error(start, format!("unexpected character '{}'", c))),
        };

        Ok((token, start))
    }
}

/// Parser for type expressions.
struct Parser<'a> {
    input: &'a str,
    lexer: Lexer<'a>,
    current: Token,
    current_pos: usize,
    depth: usize,
    max_depth: usize,
    params: &'a [String],
}

impl<'a> Parser<'a> {
    fn new(input: &'a str, max_depth: usize, params: &'a [String]) -> Result<Self> {
        let mut lexer = Lexer::new(input);
        let (current, current_pos) = lexer.next_token()?;
        Ok(Self {
            input,
            lexer,
            current,
            current_pos,
            depth: 0,
            max_depth,
            params,
        })
    }

    fn advance(&mut self) -> Result<()> {
        let (token, pos) = self.lexer.next_token()?;
        self.current = token;
        self.current_pos = pos;
        Ok(())
    }

    fn error(&self, reason: impl Into<String>) -> ReifyError {
        ReifyError::malformed(self.input, self.current_pos, reason)
    }

    fn expect(&mut self, token: Token, what: &str) -> Result<()> {
        if self.current != token {
            return Err(self.error(format!("expected {}, got {:?}", what, self.current)));
        }
        self.advance()
    }

    fn expect_identifier(&mut self, what: &str) -> Result<String> {
        match &self.current {
            Token::Identifier(name) => {
                let name = name.clone();
                self.advance()?;
                Ok(name)
            }
            other => Err(self.error(format!("expected {}, got {:?}", what, other))),
        }
    }

    fn parse_complete(&mut self) -> Result<TypeExpr> {
        let expr = self.parse_type()?;
        if self.current != Token::Eof {
            return Err(self.error(format!("unexpected trailing {:?}", self.current)));
        }
        Ok(expr)
    }

    fn parse_type(&mut self) -> Result<TypeExpr> {
        self.depth += 1;
        if self.depth > self.max_depth {
            return Err(ReifyError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let expr = match self.current.clone() {
            Token::Identifier(word) => self.parse_keyword(&word)?,
            Token::Address(address) => {
                self.advance()?;
                self.parse_named(address)?
            }
            other => return Err(self.error(format!("expected type, got {:?}", other))),
        };

        self.depth -= 1;
        Ok(expr)
    }

    fn parse_keyword(&mut self, word: &str) -> Result<TypeExpr> {
        if let Some(p) = Primitive::from_keyword(word) {
            self.advance()?;
            return Ok(TypeExpr::Primitive(p));
        }

        if word == "vector" {
            self.advance()?;
            self.expect(Token::Lt, "'<' after vector")?;
            let inner = self.parse_type()?;
            self.expect(Token::Gt, "'>' closing vector")?;
            return Ok(TypeExpr::vector(inner));
        }

        if let Some(index) = self.params.iter().position(|p| p == word) {
            self.advance()?;
            let index = u16::try_from(index).map_err(|_| self.error("too many type parameters"))?;
            return Ok(TypeExpr::Param(index));
        }

        Err(self.error(format!("unknown type keyword '{}'", word)))
    }

    fn parse_named(&mut self, address: Address) -> Result<TypeExpr> {
        self.expect(Token::ColonColon, "'::' after address")?;
        let module = self.expect_identifier("module name")?;
        self.expect(Token::ColonColon, "'::' after module")?;
        let name = self.expect_identifier("type name")?;

        let mut type_args = Vec::new();
        if self.current == Token::Lt {
            self.advance()?;
            loop {
                type_args.push(self.parse_type()?);
                match self.current {
                    Token::Comma => self.advance()?,
                    Token::Gt => {
                        self.advance()?;
                        break;
                    }
                    _ => return Err(self.error("expected ',' or '>' in type arguments")),
                }
            }
        }

        Ok(TypeExpr::Named {
            address,
            module,
            name,
            type_args,
        })
    }
}

/// Parse a type string with the default depth limit.
///
/// # Example
///
/// ```
/// use move_reify::types::{parse, TypeExpr};
///
/// let expr = parse("vector<0x2::coin::Coin<0x2::sui::SUI>>")?;
/// assert!(matches!(expr, TypeExpr::Vector(_)));
/// # Ok::<(), move_reify::ReifyError>(())
/// ```
pub fn parse(type_string: &str) -> Result<TypeExpr> {
    parse_with_depth(type_string, DEFAULT_MAX_DEPTH)
}

/// Parse a type string, failing with `DepthExceeded` beyond `max_depth`.
pub fn parse_with_depth(type_string: &str, max_depth: usize) -> Result<TypeExpr> {
    let trimmed = type_string.trim();
    if trimmed.is_empty() {
        return Err(ReifyError::malformed(type_string, 0, "empty type string"));
    }
    Parser::new(trimmed, max_depth, &[])?.parse_complete()
}

/// Parse a field type inside a declaration, where bare identifiers naming
/// one of `params` become [`TypeExpr::Param`].
pub fn parse_declared(type_string: &str, params: &[String]) -> Result<TypeExpr> {
    let trimmed = type_string.trim();
    if trimmed.is_empty() {
        return Err(ReifyError::malformed(type_string, 0, "empty type string"));
    }
    Parser::new(trimmed, DEFAULT_MAX_DEPTH, params)?.parse_complete()
}

impl FromStr for TypeExpr {
    type Err = ReifyError;

    fn from_str(s: &str) -> Result<Self> {
        parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(addr: u64, module: &str, name: &str, args: Vec<TypeExpr>) -> TypeExpr {
        TypeExpr::named(Address::from_u64(addr), module, name, args)
    }

    #[test]
    fn test_parse_primitives() {
        for p in Primitive::ALL {
            assert_eq!(parse(p.keyword()).unwrap(), TypeExpr::Primitive(p));
        }
    }

    #[test]
    fn test_parse_vector() {
        let expr = parse("vector<vector<u8>>").unwrap();
        assert_eq!(
            expr,
            TypeExpr::vector(TypeExpr::vector(Primitive::U8.into()))
        );
    }

    #[test]
    fn test_parse_named_without_args() {
        let expr = parse("0x2::sui::SUI").unwrap();
        assert_eq!(expr, named(2, "sui", "SUI", vec![]));
    }

    #[test]
    fn test_parse_nested_args_not_split_naively() {
        let expr =
            parse("0x2::dynamic_field::Field<0x1::option::Option<vector<u8>>, 0x2::coin::Coin<0x2::sui::SUI>>")
                .unwrap();
        let args = expr.type_args();
        assert_eq!(args.len(), 2);
        assert_eq!(args[0].to_string(), "0x1::option::Option<vector<u8>>");
        assert_eq!(args[1].to_string(), "0x2::coin::Coin<0x2::sui::SUI>");
    }

    #[test]
    fn test_parse_long_address_and_whitespace() {
        let expr = parse(
            "0x0000000000000000000000000000000000000000000000000000000000000002::table::Table< address , u64 >",
        )
        .unwrap();
        assert_eq!(
            expr,
            named(
                2,
                "table",
                "Table",
                vec![Primitive::Address.into(), Primitive::U64.into()]
            )
        );
    }

    #[test]
    fn test_parse_errors() {
        let cases = [
            "",
            "u512",
            "vector",
            "vector<>",
            "vector<u8",
            "0x2::coin",
            "0x2::coin::Coin<>",
            "0x2::coin::Coin<u8,>",
            "0x2 ::coin::Coin",
            "0x2:: coin::Coin",
            "0xzz::a::B",
            "u8 u8",
            "u8<u8>",
            "2::a::B",
        ];
        for case in cases {
            let result = parse(case);
            assert!(
                matches!(result, Err(ReifyError::MalformedType { .. })),
                "{:?} should be malformed, got {:?}",
                case,
                result
            );
        }
    }

    #[test]
    fn test_error_reports_position() {
        match parse("vector<u8;>") {
            Err(ReifyError::MalformedType { position, .. }) => assert_eq!(position, 9),
            other => panic!("expected malformed, got {:?}", other),
        }
    }

    #[test]
    fn test_depth_guard() {
        let deep = format!("{}u8{}", "vector<".repeat(10_000), ">".repeat(10_000));
        assert!(matches!(
            parse(&deep),
            Err(ReifyError::DepthExceeded { limit }) if limit == DEFAULT_MAX_DEPTH
        ));

        let shallow = format!("{}u8{}", "vector<".repeat(3), ">".repeat(3));
        assert!(parse_with_depth(&shallow, 4).is_ok());
        assert!(parse_with_depth(&shallow, 3).is_err());
    }

    #[test]
    fn test_parse_declared_params() {
        let params = vec!["K".to_string(), "V".to_string()];
        let expr = parse_declared("vector<0x2::table::Entry<K, V>>", &params).unwrap();
        let entry = named(2, "table", "Entry", vec![TypeExpr::Param(0), TypeExpr::Param(1)]);
        assert_eq!(expr, TypeExpr::vector(entry));

        // Parameters are not accepted in instantiated strings.
        assert!(parse("vector<K>").is_err());
    }
}
