//! Query session: the keyword registry kept in sync with the loaded
//! structures and the named selections, plus engine configuration and the
//! logger every query reports to.

use std::collections::{BTreeSet, HashMap, HashSet};

use slog::{debug, o, warn, Drain, Logger};

use crate::atom::{AtomPool, AtomSet, AtomUid};
use crate::config::Config;
use crate::error::{EvalError, KeywordError, SelectionError};
use crate::eval::{eval, EvalContext};
use crate::expr::Expr;
use crate::keyword::{fixed_field, validate_keyword, KeywordRegistry, NodeFactory};
use crate::parser::Parser;
use crate::predicate::Field;

/// Human readable logger writing to stderr.
pub fn terminal_logger() -> Logger {
    let decorator = slog_term::PlainSyncDecorator::new(std::io::stderr());
    let drain = slog_term::FullFormat::new(decorator).build().fuse();
    Logger::root(drain, o!())
}

#[derive(Debug)]
pub struct QuerySession {
    logger: Logger,
    config: Config,
    registry: KeywordRegistry,
    selections: HashMap<String, HashSet<AtomUid>>,
    /// keyword -> selection it stands for
    selection_keywords: HashMap<String, String>,
    structures: BTreeSet<String>,
}

impl Default for QuerySession {
    fn default() -> Self {
        Self::new(Logger::root(slog::Discard, o!()))
    }
}

impl QuerySession {
    pub fn new(logger: Logger) -> Self {
        Self::with_config(logger, Config::default())
    }

    pub fn with_config(logger: Logger, config: Config) -> Self {
        Self {
            logger,
            config,
            registry: KeywordRegistry::with_builtins(),
            selections: HashMap::new(),
            selection_keywords: HashMap::new(),
            structures: BTreeSet::new(),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &KeywordRegistry {
        &self.registry
    }

    /// Define (or redefine) the named selection `name` and make it usable as
    /// a keyword.
    pub fn define_selection(
        &mut self,
        name: &str,
        members: impl IntoIterator<Item = AtomUid>,
    ) -> Result<(), KeywordError> {
        validate_keyword(name)?;
        if self.structures.contains(name) {
            return Err(KeywordError::StructureName(name.to_string()));
        }
        self.selections
            .insert(name.to_string(), members.into_iter().collect());
        self.bind_selection_keyword(name, name)
    }

    /// Define a named selection from the result of a query over `pool`.
    pub fn define_selection_from(
        &mut self,
        name: &str,
        pool: &AtomPool,
        atoms: &AtomSet,
    ) -> Result<(), KeywordError> {
        self.define_selection(name, pool.uids_of(atoms))
    }

    /// Expose the existing selection `selection` under the keyword `keyword`.
    pub fn alias_selection(&mut self, keyword: &str, selection: &str) -> Result<(), KeywordError> {
        validate_keyword(keyword)?;
        if self.structures.contains(keyword) {
            return Err(KeywordError::StructureName(keyword.to_string()));
        }
        if !self.selections.contains_key(selection) {
            return Err(KeywordError::UnknownSelection(selection.to_string()));
        }
        self.bind_selection_keyword(keyword, selection)
    }

    fn bind_selection_keyword(&mut self, keyword: &str, selection: &str) -> Result<(), KeywordError> {
        self.registry
            .register_keyword(keyword, fixed_field(Field::Selection, selection))?;
        self.selection_keywords
            .insert(keyword.to_string(), selection.to_string());
        Ok(())
    }

    pub fn selection(&self, name: &str) -> Option<&HashSet<AtomUid>> {
        self.selections.get(name)
    }

    pub fn selections(&self) -> impl Iterator<Item = &str> {
        self.selections.keys().map(String::as_str)
    }

    /// Drop a named selection together with every keyword pointing at it.
    /// Returns whether the selection existed.
    pub fn remove_selection(&mut self, name: &str) -> bool {
        let existed = self.selections.remove(name).is_some();
        let keywords: Vec<String> = self
            .selection_keywords
            .iter()
            .filter(|(_, target)| target.as_str() == name)
            .map(|(keyword, _)| keyword.clone())
            .collect();
        for keyword in keywords {
            self.selection_keywords.remove(&keyword);
            // a loaded structure owns a shadowed token
            if !self.structures.contains(&keyword) {
                self.drop_keyword(&keyword);
            }
        }
        existed
    }

    fn drop_keyword(&mut self, token: &str) {
        if let Err(e) = self.registry.unregister_keyword(token) {
            warn!(self.logger, "failed to unregister keyword";
                "keyword" => token, "error" => %e);
        }
    }

    /// Make the structure `name` selectable by its bare name. A selection
    /// keyword with the same token is shadowed until the structure is removed.
    pub fn add_structure(&mut self, name: &str) -> Result<(), KeywordError> {
        validate_keyword(name)?;
        if let Some(selection) = self.selection_keywords.get(name) {
            warn!(self.logger, "structure name shadows a selection keyword";
                "keyword" => name, "selection" => %selection);
        }
        self.registry
            .register_keyword(name, fixed_field(Field::StructureName, name))?;
        self.structures.insert(name.to_string());
        Ok(())
    }

    /// Returns whether the structure was loaded. A selection keyword the
    /// structure shadowed becomes usable again.
    pub fn remove_structure(&mut self, name: &str) -> bool {
        if !self.structures.remove(name) {
            return false;
        }
        match self.selection_keywords.get(name).cloned() {
            Some(selection) => {
                debug!(self.logger, "restoring shadowed selection keyword";
                    "keyword" => name, "selection" => %selection);
                if let Err(e) = self
                    .registry
                    .register_keyword(name, fixed_field(Field::Selection, &selection))
                {
                    warn!(self.logger, "failed to restore selection keyword";
                        "keyword" => name, "error" => %e);
                }
            }
            None => self.drop_keyword(name),
        }
        true
    }

    pub fn structures(&self) -> impl Iterator<Item = &str> {
        self.structures.iter().map(String::as_str)
    }

    /// First of `base_2`, `base_3`, ... that names neither a selection nor a
    /// keyword.
    pub fn unique_selection_name(&self, base: &str) -> String {
        (2..)
            .map(|n| format!("{}_{}", base, n))
            .find(|name| !self.selections.contains_key(name) && !self.registry.is_keyword(name))
            .unwrap_or_else(|| base.to_string())
    }

    /// Register a custom leaf keyword.
    pub fn register_keyword(&mut self, token: &str, factory: NodeFactory) -> Result<(), KeywordError> {
        if self.structures.contains(token) {
            return Err(KeywordError::StructureName(token.to_string()));
        }
        self.registry.register_keyword(token, factory)?;
        self.selection_keywords.remove(token);
        Ok(())
    }

    /// Returns whether a keyword was removed.
    pub fn unregister_keyword(&mut self, token: &str) -> Result<bool, KeywordError> {
        let removed = self.registry.unregister_keyword(token)?.is_some();
        self.selection_keywords.remove(token);
        self.structures.remove(token);
        Ok(removed)
    }

    pub fn is_keyword(&self, token: &str) -> bool {
        self.registry.is_keyword(token)
    }

    pub fn is_operator(&self, token: &str) -> bool {
        self.registry.is_operator(token)
    }

    pub fn parse(&self, query: &str) -> Result<Expr, SelectionError> {
        let expr = Parser::parse(&self.registry, query)?;
        debug!(self.logger, "parsed selection"; "query" => query, "expr" => %expr);
        Ok(expr)
    }

    /// Evaluate an already parsed expression over every atom of `pool`.
    pub fn evaluate_expr(&self, expr: &Expr, pool: &AtomPool) -> Result<AtomSet, EvalError> {
        let ctx = EvalContext {
            pool,
            config: &self.config,
            selections: &self.selections,
        };
        eval(&self.logger, &ctx, expr, &pool.all())
    }

    pub fn evaluate(&self, query: &str, pool: &AtomPool) -> Result<AtomSet, SelectionError> {
        let logger = self.logger.new(o!("query" => query.to_string()));
        let expr = Parser::parse(&self.registry, query)?;
        debug!(logger, "parsed selection"; "expr" => %expr);

        let ctx = EvalContext {
            pool,
            config: &self.config,
            selections: &self.selections,
        };
        Ok(eval(&logger, &ctx, &expr, &pool.all())?)
    }
}
