use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::lexer::Token;

/// Error returned by a selection query. Parse failures and evaluation
/// failures both abort the whole query.
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum SelectionError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Eval(#[from] EvalError),
}

#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum ParseError {
    #[error("Unknown keyword: {token}")]
    #[diagnostic(
        code(molsel::unknown_keyword),
        help("Keywords are case-sensitive; named selections and structures must be registered before the query")
    )]
    UnknownKeyword {
        token: String,
        #[label("unknown keyword")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unexpected token: {token}")]
    #[diagnostic(code(molsel::unexpected_token))]
    UnexpectedToken {
        token: String,
        #[label("not expected here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unexpected end of selection, expected {expected}")]
    #[diagnostic(code(molsel::unexpected_end))]
    UnexpectedEnd {
        expected: String,
        #[label("selection ends here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Missing argument for '{keyword}'")]
    #[diagnostic(
        code(molsel::missing_argument),
        help("This keyword needs at least one value, e.g. 'name CA'")
    )]
    MissingArgument {
        keyword: String,
        #[label("expects a value")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unbalanced parenthesis")]
    #[diagnostic(code(molsel::unbalanced_parenthesis), help("Add the matching ')'"))]
    UnbalancedParenthesis {
        #[label("opened here")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Expected {expected}, found: {token}")]
    #[diagnostic(code(molsel::invalid_number))]
    InvalidNumber {
        token: String,
        expected: String,
        #[label("invalid value")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },
}

#[allow(dead_code)] // Fields are used by miette's derive macros
#[derive(Debug, Clone, Diagnostic, Error)]
pub enum EvalError {
    #[error("Unknown property: {property}")]
    #[diagnostic(code(molsel::unknown_property), help("Valid properties: x, y, z"))]
    UnknownProperty {
        property: String,
        #[label("unknown property")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unknown comparison operator: {operator}")]
    #[diagnostic(
        code(molsel::unknown_operator),
        help("Valid operators: <, >, <=, >=, ==, !=")
    )]
    UnknownOperator {
        operator: String,
        #[label("unknown operator")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Unknown secondary structure: {value}")]
    #[diagnostic(
        code(molsel::unknown_secondary_structure),
        help("Valid values: helix, H, sheet, S, coil, C")
    )]
    UnknownSecondaryStructure {
        value: String,
        #[label("unknown secondary structure")]
        span: SourceSpan,
        #[source_code]
        src: String,
    },

    #[error("Selection '{name}' is not defined")]
    #[diagnostic(code(molsel::undefined_selection))]
    UndefinedSelection { name: String },
}

/// Errors raised while changing the keyword inventory of a session.
#[derive(Debug, Clone, PartialEq, Eq, Diagnostic, Error)]
pub enum KeywordError {
    #[error("'{0}' is a predefined keyword")]
    #[diagnostic(code(molsel::reserved_keyword))]
    Reserved(String),

    #[error("'{0}' contains forbidden characters")]
    #[diagnostic(
        code(molsel::forbidden_keyword),
        help("Keywords cannot be empty or contain whitespace or parentheses")
    )]
    Forbidden(String),

    #[error("Selection '{0}' does not exist")]
    #[diagnostic(code(molsel::unknown_selection))]
    UnknownSelection(String),

    #[error("'{0}' is the name of a loaded structure")]
    #[diagnostic(code(molsel::structure_name))]
    StructureName(String),
}

pub trait SpanExt {
    fn to_source_span(&self) -> SourceSpan;
}

impl SpanExt for Token<'_> {
    #[inline]
    fn to_source_span(&self) -> SourceSpan {
        (self.offset, self.text.len()).into()
    }
}

/// Zero-width span pointing at the end of `src`, for errors at end of input.
pub(crate) fn end_span(src: &str) -> SourceSpan {
    (src.len(), 0).into()
}
