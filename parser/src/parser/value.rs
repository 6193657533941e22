//! Argument value parsing.
//!
//! Values are read straight into JSON: enum literals (bare names such as
//! `createdAt_DESC`) become strings, which is what the input grammars expect.

use super::Parser;
use crate::error::{ParseError, ParseResult};
use crate::lexer::TokenKind;
use serde_json::Value;

impl Parser {
    pub(crate) fn parse_value(&mut self) -> ParseResult<Value> {
        let token = self.advance();
        match token.kind {
            TokenKind::Int(n) => Ok(Value::from(n)),
            TokenKind::Float(f) => serde_json::Number::from_f64(f)
                .map(Value::Number)
                .ok_or_else(|| ParseError::new("float must be finite", token.span)),
            TokenKind::String(s) => Ok(Value::String(s)),
            TokenKind::Name(name) => Ok(match name.as_str() {
                "null" => Value::Null,
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(name),
            }),
            TokenKind::LBracket => {
                let mut items = Vec::new();
                while !self.check(&TokenKind::RBracket) {
                    items.push(self.parse_value()?);
                }
                self.expect(&TokenKind::RBracket)?;
                Ok(Value::Array(items))
            }
            TokenKind::LBrace => {
                let mut fields = serde_json::Map::new();
                while !self.check(&TokenKind::RBrace) {
                    let span = self.peek().span;
                    let key = self.expect_name()?;
                    self.expect(&TokenKind::Colon)?;
                    let value = self.parse_value()?;
                    if fields.insert(key.clone(), value).is_some() {
                        return Err(ParseError::new(
                            format!("key '{}' is given more than once", key),
                            span,
                        ));
                    }
                }
                self.expect(&TokenKind::RBrace)?;
                Ok(Value::Object(fields))
            }
            other => Err(ParseError::unexpected_token(
                token.span,
                "value",
                other.name(),
            )),
        }
    }
}
