pub mod frame;

use std::fmt::{self, Display};

use recursion::CollapsibleExt;

use crate::expr::frame::ExprFrame;
use crate::predicate::Predicate;

/// Atom selection expression: boolean and residue/spatial operators over
/// [`Predicate`] leaves.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Not(Box<Self>),
    /// Whole residues of the atoms selected by the child.
    ByResidue(Box<Self>),
    And(Box<Self>, Box<Self>),
    Or(Box<Self>, Box<Self>),
    /// Atoms within `radius` of any atom selected by `inner`.
    Around { radius: f64, inner: Box<Self> },
    Predicate(Predicate),
}

impl Expr {
    pub fn and(a: Self, b: Self) -> Self {
        Self::And(Box::new(a), Box::new(b))
    }
    pub fn or(a: Self, b: Self) -> Self {
        Self::Or(Box::new(a), Box::new(b))
    }
    pub fn not(a: Self) -> Self {
        Self::Not(Box::new(a))
    }
    pub fn byres(a: Self) -> Self {
        Self::ByResidue(Box::new(a))
    }
    pub fn around(radius: f64, inner: Self) -> Self {
        Self::Around {
            radius,
            inner: Box::new(inner),
        }
    }

    /// Number of nodes in the tree, leaves included.
    pub fn node_count(&self) -> usize {
        self.collapse_frames(|frame: ExprFrame<'_, usize>| match frame {
            ExprFrame::Predicate(_) => 1,
            ExprFrame::Not(x) | ExprFrame::ByResidue(x) => x + 1,
            ExprFrame::Around { inner, .. } => inner + 1,
            ExprFrame::And(a, b) | ExprFrame::Or(a, b) => a + b + 1,
        })
    }

    fn is_leaf(&self) -> bool {
        matches!(self, Self::Predicate(_))
    }
}

/// Operand position: anything but a leaf is parenthesized so that the
/// output parses back to the same tree regardless of precedence.
struct Operand<'a>(&'a Expr);

impl Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_leaf() {
            write!(f, "{}", self.0)
        } else {
            write!(f, "({})", self.0)
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Not(a) => write!(f, "not {}", Operand(a)),
            Self::ByResidue(a) => write!(f, "byres {}", Operand(a)),
            Self::And(a, b) => write!(f, "{} and {}", Operand(a), Operand(b)),
            Self::Or(a, b) => write!(f, "{} or {}", Operand(a), Operand(b)),
            Self::Around { radius, inner } => write!(f, "around {} {}", radius, Operand(inner)),
            Self::Predicate(p) => write!(f, "{}", p),
        }
    }
}
