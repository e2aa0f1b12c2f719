use super::Expr;
use crate::predicate::Predicate;
use recursion::{Collapsible, MappableFrame, PartiallyApplied};

/// Single layer of a borrowed [`Expr`], used to write folds over the tree
/// without explicit recursion.
#[derive(Debug)]
pub enum ExprFrame<'a, X> {
    Predicate(&'a Predicate),
    Not(X),
    ByResidue(X),
    And(X, X),
    Or(X, X),
    Around { radius: f64, inner: X },
}

impl<'a> MappableFrame for ExprFrame<'a, PartiallyApplied> {
    type Frame<X> = ExprFrame<'a, X>;

    fn map_frame<A, B>(input: Self::Frame<A>, mut f: impl FnMut(A) -> B) -> Self::Frame<B> {
        use ExprFrame::*;
        match input {
            Predicate(p) => Predicate(p),
            Not(a) => Not(f(a)),
            ByResidue(a) => ByResidue(f(a)),
            And(a, b) => And(f(a), f(b)),
            Or(a, b) => Or(f(a), f(b)),
            Around { radius, inner } => Around {
                radius,
                inner: f(inner),
            },
        }
    }
}

impl<'a> Collapsible for &'a Expr {
    type FrameToken = ExprFrame<'a, PartiallyApplied>;

    fn into_frame(self) -> ExprFrame<'a, Self> {
        match self {
            Expr::Predicate(p) => ExprFrame::Predicate(p),
            Expr::Not(x) => ExprFrame::Not(x),
            Expr::ByResidue(x) => ExprFrame::ByResidue(x),
            Expr::And(a, b) => ExprFrame::And(a, b),
            Expr::Or(a, b) => ExprFrame::Or(a, b),
            Expr::Around { radius, inner } => ExprFrame::Around {
                radius: *radius,
                inner,
            },
        }
    }
}
