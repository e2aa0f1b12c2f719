//! Precedence-climbing parser. The parser itself only knows about
//! parentheses; everything else is dispatched through the
//! [`KeywordRegistry`], whose factories consume their own arguments.

use std::str::FromStr;

use crate::error::{end_span, ParseError, SelectionError, SpanExt};
use crate::expr::Expr;
use crate::keyword::{BinaryOp, KeywordKind, KeywordRegistry};
use crate::lexer::{tokenize, Token};

pub struct Parser<'a> {
    src: &'a str,
    tokens: Vec<Token<'a>>,
    pos: usize,
    registry: &'a KeywordRegistry,
}

impl<'a> Parser<'a> {
    pub fn new(registry: &'a KeywordRegistry, src: &'a str) -> Self {
        Self {
            src,
            tokens: tokenize(src),
            pos: 0,
            registry,
        }
    }

    /// Parse a complete query. Tokens left over after the top-level
    /// expression are an error.
    pub fn parse(registry: &'a KeywordRegistry, src: &'a str) -> Result<Expr, SelectionError> {
        let mut parser = Self::new(registry, src);
        let expr = parser.parse_expression(0)?;
        match parser.peek() {
            Some(token) => Err(parser.unexpected(token)),
            None => Ok(expr),
        }
    }

    pub fn src(&self) -> &'a str {
        self.src
    }

    pub fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    pub fn next_token(&mut self) -> Option<Token<'a>> {
        let token = self.peek()?;
        self.pos += 1;
        Some(token)
    }

    /// Consume the argument list of a leaf keyword: every following token up
    /// to the next keyword, operator or parenthesis.
    pub fn take_values(&mut self) -> Vec<Token<'a>> {
        let mut values = Vec::new();
        while let Some(token) = self.peek() {
            if self.registry.is_keyword(token.text) {
                break;
            }
            values.push(token);
            self.pos += 1;
        }
        values
    }

    /// Like [`Parser::take_values`], for keywords that need at least one value.
    pub fn require_values(&mut self, keyword: Token<'_>) -> Result<Vec<Token<'a>>, SelectionError> {
        let values = self.take_values();
        if values.is_empty() {
            return Err(ParseError::MissingArgument {
                keyword: keyword.text.to_string(),
                span: keyword.to_source_span(),
                src: self.src.to_string(),
            }
            .into());
        }
        Ok(values)
    }

    /// Consume one token and read it as a number.
    pub fn next_number<T: FromStr>(
        &mut self,
        keyword: Token<'_>,
        expected: &str,
    ) -> Result<T, SelectionError> {
        let token = self.next_token().ok_or_else(|| ParseError::MissingArgument {
            keyword: keyword.text.to_string(),
            span: keyword.to_source_span(),
            src: self.src.to_string(),
        })?;
        self.number(token, expected)
    }

    pub fn number<T: FromStr>(&self, token: Token<'_>, expected: &str) -> Result<T, SelectionError> {
        token
            .text
            .parse::<T>()
            .map_err(|_| self.invalid_number(token, expected))
    }

    pub fn invalid_number(&self, token: Token<'_>, expected: &str) -> SelectionError {
        ParseError::InvalidNumber {
            token: token.text.to_string(),
            expected: expected.to_string(),
            span: token.to_source_span(),
            src: self.src.to_string(),
        }
        .into()
    }

    pub fn unexpected(&self, token: Token<'_>) -> SelectionError {
        ParseError::UnexpectedToken {
            token: token.text.to_string(),
            span: token.to_source_span(),
            src: self.src.to_string(),
        }
        .into()
    }

    /// Parse a primary, then fold in binary operators binding at least as
    /// tightly as `min_precedence`. Operators of equal precedence associate
    /// to the left.
    pub fn parse_expression(&mut self, min_precedence: u8) -> Result<Expr, SelectionError> {
        let registry = self.registry;
        let mut lhs = self.parse_primary()?;

        while let Some(token) = self.peek() {
            let (precedence, op) = match registry.get(token.text) {
                Some(kw) => match kw.kind {
                    KeywordKind::Binary(op) => (kw.precedence, op),
                    _ => break,
                },
                None => break,
            };
            if precedence < min_precedence {
                break;
            }
            self.pos += 1;
            let rhs = self.parse_expression(precedence + 1)?;
            lhs = match op {
                BinaryOp::And => Expr::and(lhs, rhs),
                BinaryOp::Or => Expr::or(lhs, rhs),
            };
        }

        Ok(lhs)
    }

    fn parse_primary(&mut self) -> Result<Expr, SelectionError> {
        let registry = self.registry;
        let token = self.next_token().ok_or_else(|| ParseError::UnexpectedEnd {
            expected: "a selection".to_string(),
            span: end_span(self.src),
            src: self.src.to_string(),
        })?;

        if token.is_open_paren() {
            let inner = self.parse_expression(0)?;
            return match self.next_token() {
                Some(close) if close.is_close_paren() => Ok(inner),
                Some(other) => Err(self.unexpected(other)),
                None => Err(ParseError::UnbalancedParenthesis {
                    span: token.to_source_span(),
                    src: self.src.to_string(),
                }
                .into()),
            };
        }
        if token.is_close_paren() {
            return Err(self.unexpected(token));
        }

        match registry.get(token.text) {
            Some(kw) => match &kw.kind {
                KeywordKind::Leaf(factory) | KeywordKind::Unary(factory) => factory(self, token),
                KeywordKind::Binary(_) => Err(self.unexpected(token)),
            },
            None => Err(ParseError::UnknownKeyword {
                token: token.text.to_string(),
                span: token.to_source_span(),
                src: self.src.to_string(),
            }
            .into()),
        }
    }
}
