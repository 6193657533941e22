//! Fragment, selection set and field parsing.

use super::Parser;
use crate::ast::*;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;

impl Parser {
    /// Parse `[fragment Name [on Node]] { ... }`.
    pub fn parse_fragment(&mut self) -> ParseResult<Fragment> {
        let mut name = None;
        let mut type_condition = None;

        if self.check_name("fragment") {
            self.advance();
            name = Some(self.expect_name()?);
            if self.check_name("on") {
                self.advance();
                type_condition = Some(self.expect_name()?);
            }
        }

        let selection_set = self.parse_selection_set()?;
        Ok(Fragment {
            name,
            type_condition,
            selection_set,
        })
    }

    /// Parse `{ field+ }`.
    pub fn parse_selection_set(&mut self) -> ParseResult<SelectionSet> {
        let start = self.expect(&TokenKind::LBrace)?.span;

        let mut fields = vec![self.parse_field()?];
        while !self.check(&TokenKind::RBrace) {
            fields.push(self.parse_field()?);
        }
        self.expect(&TokenKind::RBrace)?;

        Ok(SelectionSet {
            fields,
            span: self.span_from(start),
        })
    }

    /// Parse `[alias:] name [(arguments)] [{ ... }]`.
    fn parse_field(&mut self) -> ParseResult<Field> {
        let start = self.peek().span;
        let first = self.expect_name()?;

        let (alias, name) = if self.check(&TokenKind::Colon) {
            self.advance();
            (Some(first), self.expect_name()?)
        } else {
            (None, first)
        };

        let arguments = if self.check(&TokenKind::LParen) {
            self.parse_arguments()?
        } else {
            serde_json::Map::new()
        };

        let selection_set = if self.check(&TokenKind::LBrace) {
            Some(self.parse_selection_set()?)
        } else {
            None
        };

        Ok(Field {
            alias,
            name,
            arguments,
            selection_set,
            span: self.span_from(start),
        })
    }

    /// Parse `( name: value ... )`.
    fn parse_arguments(&mut self) -> ParseResult<serde_json::Map<String, serde_json::Value>> {
        self.expect(&TokenKind::LParen)?;

        let mut arguments = serde_json::Map::new();
        while !self.check(&TokenKind::RParen) {
            let span = self.peek().span;
            let name = self.expect_name()?;
            self.expect(&TokenKind::Colon)?;
            let value = self.parse_value()?;
            if arguments.insert(name.clone(), value).is_some() {
                return Err(ParseError::duplicate_argument(span, &name));
            }
        }
        self.expect(&TokenKind::RParen)?;

        Ok(arguments)
    }
}
