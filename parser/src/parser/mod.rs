//! Parser for selection fragments.
//!
//! This module is organized into submodules by parsing category:
//! - `selection`: Fragment headers, selection sets and fields
//! - `value`: Argument values (scalars, enums, lists and objects)

mod selection;
mod value;

use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::{Lexer, Token, TokenKind};

// ==================== PARSER STATE ====================

/// Parser state.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    /// Create a new parser from source text.
    pub fn new(input: &str) -> ParseResult<Self> {
        let tokens = Lexer::new(input).tokenize()?;
        Ok(Self { tokens, pos: 0 })
    }
}

// ==================== TOKEN HELPERS ====================

impl Parser {
    pub(crate) fn peek(&self) -> &Token {
        self.tokens.get(self.pos).unwrap_or_else(|| {
            self.tokens
                .last()
                .expect("tokens should always end with EOF")
        })
    }

    pub(crate) fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    pub(crate) fn check(&self, kind: &TokenKind) -> bool {
        std::mem::discriminant(&self.peek().kind) == std::mem::discriminant(kind)
    }

    pub(crate) fn check_name(&self, name: &str) -> bool {
        matches!(&self.peek().kind, TokenKind::Name(s) if s == name)
    }

    pub(crate) fn expect(&mut self, kind: &TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            let token = self.peek();
            Err(ParseError::unexpected_token(
                token.span,
                kind.name(),
                token.kind.name(),
            ))
        }
    }

    pub(crate) fn expect_name(&mut self) -> ParseResult<String> {
        match self.peek().kind.clone() {
            TokenKind::Name(name) => {
                self.advance();
                Ok(name)
            }
            _ => {
                let token = self.peek();
                Err(ParseError::unexpected_token(
                    token.span,
                    "name",
                    token.kind.name(),
                ))
            }
        }
    }

    pub(crate) fn span_from(&self, start: Span) -> Span {
        let end_token = if self.pos > 0 {
            &self.tokens[self.pos - 1]
        } else {
            self.peek()
        };
        Span::new(start.start, end_token.span.end, start.line, start.column)
    }

    pub(crate) fn expect_eof(&self) -> ParseResult<()> {
        if self.check(&TokenKind::Eof) {
            Ok(())
        } else {
            let token = self.peek();
            Err(ParseError::unexpected_token(
                token.span,
                "end of input",
                token.kind.name(),
            ))
        }
    }
}

// ==================== PUBLIC API ====================

/// Parse a fragment: an optional `fragment Name on Node` header followed by a
/// selection set.
pub fn parse_fragment(input: &str) -> ParseResult<Fragment> {
    let mut parser = Parser::new(input)?;
    let fragment = parser.parse_fragment()?;
    parser.expect_eof()?;
    Ok(fragment)
}

/// Parse a bare selection set, e.g. `{ id title }`.
pub fn parse_selection_set(input: &str) -> ParseResult<SelectionSet> {
    parse_fragment(input).map(|fragment| fragment.selection_set)
}

// ==================== TESTS ====================
