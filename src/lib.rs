//! Atom selection language for molecular structures.
//!
//! A query such as `protein and not backbone` or `around 5 resname LIG` is
//! tokenized, parsed through a [`KeywordRegistry`] into an [`Expr`] tree and
//! evaluated against an [`AtomPool`], yielding the indices of the selected
//! atoms.
//!
//! ```
//! use molsel::{AtomPool, QuerySession};
//!
//! let pool = AtomPool::builder()
//!     .residue("ALA", 1)
//!     .atom("N", "N", [0.0, 0.0, 0.0])
//!     .atom("CA", "C", [1.5, 0.0, 0.0])
//!     .build();
//!
//! let session = QuerySession::default();
//! let selected = session.evaluate("protein and name CA", &pool).unwrap();
//! assert_eq!(selected.into_iter().collect::<Vec<_>>(), vec![1]);
//! ```

pub mod atom;
pub mod config;
pub mod error;
pub mod eval;
pub mod expr;
pub mod keyword;
pub mod lexer;
pub mod parser;
pub mod predicate;
pub mod session;
pub mod spatial;

pub use atom::{Atom, AtomPool, AtomSet, AtomUid, PoolBuilder, Residue, SecondaryStructure};
pub use config::Config;
pub use error::{EvalError, KeywordError, ParseError, SelectionError};
pub use expr::Expr;
pub use keyword::KeywordRegistry;
pub use predicate::Predicate;
pub use session::QuerySession;

/// Evaluate `query` against `pool` with the built-in vocabulary only.
pub fn evaluate(query: &str, pool: &AtomPool) -> Result<AtomSet, SelectionError> {
    QuerySession::default().evaluate(query, pool)
}
