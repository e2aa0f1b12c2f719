use std::collections::{HashMap, HashSet};

use recursion::CollapsibleExt;
use slog::{debug, Logger};

use crate::atom::{AtomPool, AtomSet, AtomUid};
use crate::config::Config;
use crate::error::EvalError;
use crate::expr::frame::ExprFrame;
use crate::expr::Expr;
use crate::predicate::{Field, Pattern, Predicate};
use crate::spatial;

/// Everything besides the tree that an evaluation reads.
#[derive(Debug, Clone, Copy)]
pub struct EvalContext<'a> {
    pub pool: &'a AtomPool,
    pub config: &'a Config,
    /// Named selections, as the uids of their member atoms.
    pub selections: &'a HashMap<String, HashSet<AtomUid>>,
}

/// Evaluate `expr` bottom-up. Every node sees the same `candidates`, so `not`
/// complements and `byres` expands within the candidate set only.
pub fn eval(
    logger: &Logger,
    ctx: &EvalContext<'_>,
    expr: &Expr,
    candidates: &AtomSet,
) -> Result<AtomSet, EvalError> {
    let selected = expr.try_collapse_frames(|frame| match frame {
        ExprFrame::Predicate(p) => eval_predicate(ctx, p, candidates),
        ExprFrame::Not(x) => Ok(candidates.difference(&x).copied().collect()),
        ExprFrame::And(a, b) => Ok(a.intersection(&b).copied().collect()),
        ExprFrame::Or(mut a, b) => {
            a.extend(b);
            Ok(a)
        }
        ExprFrame::ByResidue(x) => {
            let residues: HashSet<usize> = x.iter().map(|&i| ctx.pool.atom(i).residue).collect();
            Ok(candidates
                .iter()
                .copied()
                .filter(|&i| residues.contains(&ctx.pool.atom(i).residue))
                .collect())
        }
        ExprFrame::Around { radius, inner } => Ok(spatial::within_radius(
            logger, ctx.config, ctx.pool, candidates, &inner, radius,
        )),
    })?;

    debug!(logger, "evaluated selection";
        "nodes" => expr.node_count(), "candidates" => candidates.len(), "selected" => selected.len());

    Ok(selected)
}

fn eval_predicate(
    ctx: &EvalContext<'_>,
    predicate: &Predicate,
    candidates: &AtomSet,
) -> Result<AtomSet, EvalError> {
    let pool = ctx.pool;
    match predicate {
        Predicate::Nothing => Ok(AtomSet::new()),
        Predicate::All => Ok(candidates.clone()),
        Predicate::Field {
            field: Field::Selection,
            patterns,
        } => {
            let members = selection_members(ctx, patterns)?;
            Ok(candidates
                .iter()
                .copied()
                .filter(|&i| members.iter().any(|m| m.contains(&pool.atom(i).uid)))
                .collect())
        }
        Predicate::InSphere { center, radius } => {
            Ok(spatial::in_sphere(ctx.config, pool, candidates, center, *radius))
        }
        other => Ok(candidates
            .iter()
            .copied()
            .filter(|&i| other.test_atom(pool, i).unwrap_or(false))
            .collect()),
    }
}

/// Member sets of the named selections matched by `patterns`. An exact name
/// must refer to a defined selection.
fn selection_members<'a>(
    ctx: &EvalContext<'a>,
    patterns: &[Pattern],
) -> Result<Vec<&'a HashSet<AtomUid>>, EvalError> {
    let mut members = Vec::new();
    for pattern in patterns {
        match pattern {
            Pattern::Exact(name) => {
                let set = ctx
                    .selections
                    .get(name)
                    .ok_or_else(|| EvalError::UndefinedSelection { name: name.clone() })?;
                members.push(set);
            }
            Pattern::Prefix(_) => members.extend(
                ctx.selections
                    .iter()
                    .filter(|(name, _)| pattern.matches(name))
                    .map(|(_, set)| set),
            ),
        }
    }
    Ok(members)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keyword::KeywordRegistry;
    use crate::parser::Parser;

    fn two_residues() -> AtomPool {
        AtomPool::builder()
            .structure("s")
            .chain("A")
            .residue("ALA", 1)
            .atom("N", "N", [0.0, 0.0, 0.0])
            .atom("CA", "C", [1.5, 0.0, 0.0])
            .atom("CB", "C", [1.5, 1.5, 0.0])
            .residue("GLY", 2)
            .atom("N", "N", [3.0, 0.0, 0.0])
            .atom("CA", "C", [4.5, 0.0, 0.0])
            .build()
    }

    fn run(
        pool: &AtomPool,
        selections: &HashMap<String, HashSet<AtomUid>>,
        query: &str,
        candidates: &AtomSet,
    ) -> Result<AtomSet, EvalError> {
        let logger = Logger::root(slog::Discard, slog::o!());
        let config = Config::default();
        let ctx = EvalContext {
            pool,
            config: &config,
            selections,
        };
        let registry = {
            let mut r = KeywordRegistry::with_builtins();
            for name in selections.keys() {
                r.register_keyword(name, crate::keyword::fixed_field(Field::Selection, name))
                    .unwrap();
            }
            r
        };
        let expr = Parser::parse(&registry, query).unwrap();
        eval(&logger, &ctx, &expr, candidates)
    }

    fn set(ids: &[usize]) -> AtomSet {
        ids.iter().copied().collect()
    }

    #[test]
    fn not_complements_within_candidates() {
        let pool = two_residues();
        let candidates = set(&[0, 1, 3]);
        let got = run(&pool, &HashMap::new(), "not name CA", &candidates).unwrap();
        assert_eq!(got, set(&[0, 3]));
    }

    #[test]
    fn byres_expands_within_candidates() {
        let pool = two_residues();
        let all = pool.all();
        assert_eq!(run(&pool, &HashMap::new(), "byres name CB", &all).unwrap(), set(&[0, 1, 2]));
        let partial = set(&[1, 2, 3]);
        assert_eq!(run(&pool, &HashMap::new(), "byres name CB", &partial).unwrap(), set(&[1, 2]));
    }

    #[test]
    fn named_selection_membership() {
        let pool = two_residues();
        let mut selections = HashMap::new();
        // uids start at 1
        selections.insert("site".to_string(), [2, 5].into_iter().collect::<HashSet<AtomUid>>());
        assert_eq!(run(&pool, &selections, "site", &pool.all()).unwrap(), set(&[1, 4]));
        assert_eq!(run(&pool, &selections, "site and resname GLY", &pool.all()).unwrap(), set(&[4]));
    }

    #[test]
    fn undefined_selection_fails() {
        let pool = two_residues();
        let logger = Logger::root(slog::Discard, slog::o!());
        let config = Config::default();
        let selections = HashMap::new();
        let ctx = EvalContext {
            pool: &pool,
            config: &config,
            selections: &selections,
        };
        let expr = Expr::Predicate(Predicate::Field {
            field: Field::Selection,
            patterns: vec![Pattern::Exact("gone".into())],
        });
        let err = eval(&logger, &ctx, &expr, &pool.all()).unwrap_err();
        assert!(matches!(err, EvalError::UndefinedSelection { name } if name == "gone"));
    }

    #[test]
    fn around_and_sphere() {
        let pool = two_residues();
        let all = pool.all();
        assert_eq!(run(&pool, &HashMap::new(), "around 1.5 name CB", &all).unwrap(), set(&[1, 2]));
        assert_eq!(run(&pool, &HashMap::new(), "around 5 nothing", &all).unwrap(), AtomSet::new());
        assert_eq!(run(&pool, &HashMap::new(), "insphere 3 0 0 1.5", &all).unwrap(), set(&[1, 3, 4]));
    }
}
