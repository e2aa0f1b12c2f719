//! Keyword registry: maps every token that may start a primary (or join two
//! expressions) to a descriptor carrying its precedence and node factory.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::{EvalError, KeywordError, SelectionError, SpanExt};
use crate::expr::Expr;
use crate::lexer::Token;
use crate::parser::Parser;
use crate::predicate::{Axis, CmpOp, Field, IdRange, KnownSet, Pattern, Predicate, SsKind};

/// Builds a node once its keyword has been consumed. Factories pull their
/// own arguments (and, for unary operators, their child) from the parser.
pub type NodeFactory =
    Arc<dyn Fn(&mut Parser<'_>, Token<'_>) -> Result<Expr, SelectionError> + Send + Sync>;

pub fn node_factory<F>(f: F) -> NodeFactory
where
    F: Fn(&mut Parser<'_>, Token<'_>) -> Result<Expr, SelectionError> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub const LEAF_PRECEDENCE: u8 = 0;
pub const NOT_PRECEDENCE: u8 = 5;
pub const BYRES_PRECEDENCE: u8 = 1;
pub const AROUND_PRECEDENCE: u8 = 1;
pub const BOOLEAN_PRECEDENCE: u8 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    And,
    Or,
}

#[derive(Clone)]
pub enum KeywordKind {
    Leaf(NodeFactory),
    Unary(NodeFactory),
    Binary(BinaryOp),
}

#[derive(Clone)]
pub struct Keyword {
    pub precedence: u8,
    pub kind: KeywordKind,
}

impl Keyword {
    pub fn leaf(factory: NodeFactory) -> Self {
        Self {
            precedence: LEAF_PRECEDENCE,
            kind: KeywordKind::Leaf(factory),
        }
    }

    pub fn unary(precedence: u8, factory: NodeFactory) -> Self {
        Self {
            precedence,
            kind: KeywordKind::Unary(factory),
        }
    }

    pub fn binary(precedence: u8, op: BinaryOp) -> Self {
        Self {
            precedence,
            kind: KeywordKind::Binary(op),
        }
    }
}

impl fmt::Debug for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.kind {
            KeywordKind::Leaf(_) => "leaf".to_string(),
            KeywordKind::Unary(_) => "unary".to_string(),
            KeywordKind::Binary(op) => format!("{:?}", op),
        };
        f.debug_struct("Keyword")
            .field("precedence", &self.precedence)
            .field("kind", &kind)
            .finish()
    }
}

/// Tokens installed by [`KeywordRegistry::with_builtins`]. They can be neither
/// registered nor unregistered.
pub const BUILTIN_KEYWORDS: &[&str] = &[
    "all",
    "nothing",
    "empty",
    "not",
    "byres",
    "resid",
    "name",
    "type",
    "atomid",
    "resname",
    "chain",
    "model",
    "ss",
    "protein",
    "nucleic",
    "backbone",
    "sidechain",
    "water",
    "ligand",
    "ions",
    "nucleicbackbone",
    "nucleicbase",
    "nucleicsugar",
    "prop",
    "around",
    "within",
    "insphere",
    "and",
    "or",
];

pub fn is_builtin(token: &str) -> bool {
    BUILTIN_KEYWORDS.contains(&token)
}

/// Dynamic keywords must be usable as a single token.
pub fn validate_keyword(token: &str) -> Result<(), KeywordError> {
    if token.is_empty() || token.chars().any(|c| c.is_whitespace() || c == '(' || c == ')') {
        return Err(KeywordError::Forbidden(token.to_string()));
    }
    if is_builtin(token) {
        return Err(KeywordError::Reserved(token.to_string()));
    }
    Ok(())
}

#[derive(Clone, Default)]
pub struct KeywordRegistry {
    keywords: HashMap<String, Keyword>,
}

impl fmt::Debug for KeywordRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tokens: Vec<&str> = self.tokens().collect();
        tokens.sort_unstable();
        f.debug_struct("KeywordRegistry")
            .field("keywords", &tokens)
            .finish()
    }
}

impl KeywordRegistry {
    pub fn with_builtins() -> Self {
        let mut registry = Self::default();

        registry.install("all", Keyword::leaf(constant(Predicate::All)));
        registry.install("nothing", Keyword::leaf(constant(Predicate::Nothing)));
        registry.install("empty", Keyword::leaf(constant(Predicate::Nothing)));

        registry.install("name", Keyword::leaf(field(Field::AtomName)));
        registry.install("type", Keyword::leaf(field(Field::AtomType)));
        registry.install("resname", Keyword::leaf(field(Field::ResidueName)));
        registry.install("chain", Keyword::leaf(field(Field::ChainName)));
        registry.install("model", Keyword::leaf(field(Field::ModelName)));

        registry.install("resid", Keyword::leaf(ids(Predicate::ResidueId)));
        registry.install("atomid", Keyword::leaf(ids(Predicate::AtomId)));
        registry.install("ss", Keyword::leaf(node_factory(secondary_structure)));
        registry.install("prop", Keyword::leaf(node_factory(property)));
        registry.install("insphere", Keyword::leaf(node_factory(in_sphere)));

        for set in KnownSet::ALL {
            registry.install(set.keyword(), Keyword::leaf(constant(Predicate::Known(set))));
        }

        registry.install(
            "not",
            Keyword::unary(
                NOT_PRECEDENCE,
                node_factory(|p: &mut Parser<'_>, _| Ok(Expr::not(p.parse_expression(NOT_PRECEDENCE)?))),
            ),
        );
        registry.install(
            "byres",
            Keyword::unary(
                BYRES_PRECEDENCE,
                node_factory(|p: &mut Parser<'_>, _| {
                    Ok(Expr::byres(p.parse_expression(BYRES_PRECEDENCE)?))
                }),
            ),
        );
        for spelling in ["around", "within"] {
            registry.install(
                spelling,
                Keyword::unary(AROUND_PRECEDENCE, node_factory(around)),
            );
        }

        registry.install("and", Keyword::binary(BOOLEAN_PRECEDENCE, BinaryOp::And));
        registry.install("or", Keyword::binary(BOOLEAN_PRECEDENCE, BinaryOp::Or));

        registry
    }

    fn install(&mut self, token: &str, keyword: Keyword) {
        self.keywords.insert(token.to_string(), keyword);
    }

    pub fn get(&self, token: &str) -> Option<&Keyword> {
        self.keywords.get(token)
    }

    /// Any registered token, plus the parentheses.
    pub fn is_keyword(&self, token: &str) -> bool {
        token == "(" || token == ")" || self.keywords.contains_key(token)
    }

    /// Binary operators only.
    pub fn is_operator(&self, token: &str) -> bool {
        matches!(
            self.get(token),
            Some(Keyword {
                kind: KeywordKind::Binary(_),
                ..
            })
        )
    }

    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.keywords.keys().map(String::as_str)
    }

    /// Register a dynamic leaf keyword, replacing any dynamic keyword already
    /// using `token`.
    pub fn register_keyword(&mut self, token: &str, factory: NodeFactory) -> Result<(), KeywordError> {
        validate_keyword(token)?;
        self.install(token, Keyword::leaf(factory));
        Ok(())
    }

    pub fn unregister_keyword(&mut self, token: &str) -> Result<Option<Keyword>, KeywordError> {
        if is_builtin(token) {
            return Err(KeywordError::Reserved(token.to_string()));
        }
        Ok(self.keywords.remove(token))
    }
}

/// Leaf written as a bare keyword standing for a fixed field match, as used
/// for structure names and named selections.
pub fn fixed_field(field: Field, value: &str) -> NodeFactory {
    constant(Predicate::Field {
        field,
        patterns: vec![Pattern::Exact(value.to_string())],
    })
}

fn constant(predicate: Predicate) -> NodeFactory {
    node_factory(move |_: &mut Parser<'_>, _| Ok(Expr::Predicate(predicate.clone())))
}

fn field(field: Field) -> NodeFactory {
    node_factory(move |p: &mut Parser<'_>, kw| {
        let patterns = p
            .require_values(kw)?
            .iter()
            .map(|t| Pattern::parse(t.text))
            .collect();
        Ok(Expr::Predicate(Predicate::Field { field, patterns }))
    })
}

fn ids(make: fn(Vec<IdRange>) -> Predicate) -> NodeFactory {
    node_factory(move |p: &mut Parser<'_>, kw| {
        let values = p.require_values(kw)?;
        let mut ranges = Vec::with_capacity(values.len());
        for token in values {
            match IdRange::parse(token.text) {
                Some(range) => ranges.push(range),
                None => return Err(p.invalid_number(token, "an id or a lower:upper range")),
            }
        }
        Ok(Expr::Predicate(make(ranges)))
    })
}

fn secondary_structure(p: &mut Parser<'_>, kw: Token<'_>) -> Result<Expr, SelectionError> {
    let values = p.require_values(kw)?;
    if let Some(extra) = values.get(1) {
        return Err(p.unexpected(*extra));
    }
    let value = values[0];
    let kind = SsKind::parse(value.text).ok_or_else(|| EvalError::UnknownSecondaryStructure {
        value: value.text.to_string(),
        span: value.to_source_span(),
        src: p.src().to_string(),
    })?;
    Ok(Expr::Predicate(Predicate::SecondaryStructure(kind)))
}

fn is_operator_char(c: char) -> bool {
    matches!(c, '<' | '>' | '=' | '!')
}

/// Whether `text` holds an operator followed by a non-empty operand.
fn is_complete_comparison(text: &str) -> bool {
    match text.find(is_operator_char) {
        Some(start) => !text[start..].trim_start_matches(is_operator_char).is_empty(),
        None => false,
    }
}

/// `prop <axis> <op> <value>`, with the operator optionally glued to either
/// operand and the operands optionally reversed (`prop 5 < x`). Spans one to
/// three tokens; any value after the comparison is rejected.
fn property(p: &mut Parser<'_>, kw: Token<'_>) -> Result<Expr, SelectionError> {
    let values = p.require_values(kw)?;
    let used = (1..=values.len().min(3))
        .find(|&n| is_complete_comparison(&values[..n].iter().map(|t| t.text).collect::<String>()))
        .unwrap_or_else(|| values.len().min(3));
    if let Some(extra) = values.get(used) {
        return Err(p.unexpected(*extra));
    }
    let values = &values[..used];

    let first = values[0];
    let last = values[values.len() - 1];
    let span = (first.offset, last.offset + last.text.len() - first.offset);
    let text: String = values.iter().map(|t| t.text).collect();

    let start = text.find(is_operator_char).ok_or_else(|| EvalError::UnknownOperator {
        operator: text.clone(),
        span: span.into(),
        src: p.src().to_string(),
    })?;
    let len = text[start..]
        .find(|c: char| !is_operator_char(c))
        .unwrap_or(text.len() - start);
    let symbol = &text[start..start + len];
    let op = CmpOp::from_symbol(symbol).ok_or_else(|| EvalError::UnknownOperator {
        operator: symbol.to_string(),
        span: span.into(),
        src: p.src().to_string(),
    })?;

    let (lhs, rhs) = (&text[..start], &text[start + len..]);
    let (property, value, op) = if lhs.parse::<f64>().is_ok() {
        (rhs, lhs, op.mirrored())
    } else {
        (lhs, rhs, op)
    };

    let axis = Axis::parse(property).ok_or_else(|| EvalError::UnknownProperty {
        property: property.to_string(),
        span: span.into(),
        src: p.src().to_string(),
    })?;
    let value = p.number::<f64>(
        Token {
            text: value,
            offset: first.offset,
        },
        "a number",
    )?;

    Ok(Expr::Predicate(Predicate::Property { axis, op, value }))
}

fn in_sphere(p: &mut Parser<'_>, kw: Token<'_>) -> Result<Expr, SelectionError> {
    let x = p.next_number(kw, "a coordinate")?;
    let y = p.next_number(kw, "a coordinate")?;
    let z = p.next_number(kw, "a coordinate")?;
    let radius = p.next_number(kw, "a radius")?;
    Ok(Expr::Predicate(Predicate::InSphere {
        center: [x, y, z],
        radius,
    }))
}

fn around(p: &mut Parser<'_>, kw: Token<'_>) -> Result<Expr, SelectionError> {
    let radius = p.next_number(kw, "a radius")?;
    let inner = p.parse_expression(AROUND_PRECEDENCE)?;
    Ok(Expr::around(radius, inner))
}
