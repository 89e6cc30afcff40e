//! Reading plain names as terms, and dispatching queries to rules or facts.
//!
//! A leading `_` marks a variable. Integer text reads as an integer. Any
//! other name is a rule if one was learned under it, a relation if a stored
//! fact uses it, and a constant otherwise.

use crate::engine::Subgoal;
use crate::error::Result;
use crate::knowledge::KnowledgeBase;
use crate::solutions::Solutions;
use crate::term::{Atom, Constant, Fact, Relation, Term, Variable};

/// Marks a variable name in text, e.g. `_who`.
pub const VARIABLE_SENTINEL: char = '_';

/// What a bare name refers to in a knowledge base.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// `_name`
    Variable(Variable),
    /// A learned rule
    Rule(Relation),
    /// A relation used by a stored fact
    Relation(Relation),
    /// Anything else
    Constant(Constant),
}

/// Conversion into a [`Term`], interning names through a knowledge base.
pub trait IntoTerm {
    /// Build the term.
    fn into_term(self, kb: &KnowledgeBase) -> Term;
}

impl IntoTerm for &str {
    fn into_term(self, kb: &KnowledgeBase) -> Term {
        kb.term(self)
    }
}

impl IntoTerm for String {
    fn into_term(self, kb: &KnowledgeBase) -> Term {
        kb.term(&self)
    }
}

impl IntoTerm for Term {
    fn into_term(self, _: &KnowledgeBase) -> Term {
        self
    }
}

impl IntoTerm for &Term {
    fn into_term(self, _: &KnowledgeBase) -> Term {
        self.clone()
    }
}

impl IntoTerm for Constant {
    fn into_term(self, _: &KnowledgeBase) -> Term {
        Term::Constant(self)
    }
}

impl IntoTerm for Variable {
    fn into_term(self, _: &KnowledgeBase) -> Term {
        Term::Variable(self)
    }
}

impl IntoTerm for i64 {
    fn into_term(self, _: &KnowledgeBase) -> Term {
        Term::Integer(self)
    }
}

impl IntoTerm for Atom {
    fn into_term(self, _: &KnowledgeBase) -> Term {
        Term::from(self)
    }
}

impl KnowledgeBase {
    /// Read a fact argument: `_x` is a variable, `42` an integer, anything
    /// else a constant.
    pub fn term(&self, text: &str) -> Term {
        if let Some(name) = text.strip_prefix(VARIABLE_SENTINEL) {
            return Term::Variable(self.variable(name));
        }
        match text.parse::<i64>() {
            Ok(value) => Term::Integer(value),
            Err(_) => Term::Constant(self.constant(text)),
        }
    }

    /// Decide what a bare name refers to.
    pub fn resolve(&self, name: &str) -> Resolved {
        if let Some(var) = name.strip_prefix(VARIABLE_SENTINEL) {
            return Resolved::Variable(self.variable(var));
        }
        if let Some((rule, _)) = self.rules.get_key_value(name) {
            return Resolved::Rule(rule.clone());
        }
        match self.facts().iter().map(Fact::relation).find(|relation| relation.name() == name) {
            Some(relation) => Resolved::Relation(relation.clone()),
            None => Resolved::Constant(self.constant(name)),
        }
    }

    /// Find bindings for `predicate(args...)`: a rule match if a rule has
    /// that name, a fact match otherwise.
    ///
    /// # Errors
    ///
    /// Errors raised by rule clauses.
    pub fn ask<T: IntoTerm>(
        &self,
        predicate: &str,
        args: impl IntoIterator<Item = T>,
    ) -> Result<Solutions> {
        let terms: Vec<Term> = args.into_iter().map(|arg| arg.into_term(self)).collect();
        match self.resolve(predicate) {
            Resolved::Rule(rule) => self.match_entry(&rule, &terms, false),
            _ => Ok(self.match_fact(&self.fact(predicate, terms), false)),
        }
    }

    /// Test `predicate(args...)` for use in a clause body: a rule query if a
    /// rule has that name, a fact query otherwise.
    ///
    /// # Errors
    ///
    /// Errors raised by rule clauses.
    pub fn check<T: IntoTerm>(
        &self,
        predicate: &str,
        args: impl IntoIterator<Item = T>,
    ) -> Result<Subgoal> {
        let terms: Vec<Term> = args.into_iter().map(|arg| arg.into_term(self)).collect();
        let relation = self.relation(predicate);
        self.check_relation(&relation, terms)
    }

    pub(crate) fn check_relation(&self, relation: &Relation, terms: Vec<Term>) -> Result<Subgoal> {
        if let Resolved::Rule(rule) = self.resolve(relation.name()) {
            return self.query_rule(rule.name(), &terms);
        }
        let fact = if terms.is_empty() {
            Fact::Nullary(relation.clone())
        } else {
            Fact::from(Atom::new(relation.clone(), terms))
        };
        Ok(self.query(&fact))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::OpenQuery;

    #[test]
    fn test_term_reading() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.term("_who"), Term::Variable(kb.variable("who")));
        assert_eq!(kb.term("42"), Term::Integer(42));
        assert_eq!(kb.term("-3"), Term::Integer(-3));
        assert_eq!(kb.term("alice"), Term::Constant(kb.constant("alice")));
    }

    #[test]
    fn test_resolution_precedence() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("mother", ["alice", "lea"]));
        kb.learn("parent", |_, _| Ok(vec![]));

        assert_eq!(kb.resolve("_x"), Resolved::Variable(kb.variable("x")));
        assert_eq!(kb.resolve("parent"), Resolved::Rule(kb.relation("parent")));
        assert_eq!(kb.resolve("mother"), Resolved::Relation(kb.relation("mother")));
        assert_eq!(kb.resolve("alice"), Resolved::Constant(kb.constant("alice")));
        assert_eq!(kb.resolve("nobody"), Resolved::Constant(kb.constant("nobody")));
    }

    #[test]
    fn test_rule_shadows_relation() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["a", "b"]));
        kb.learn("likes", |_, _| Ok(vec![Subgoal::Bool(false)]));
        assert_eq!(kb.resolve("likes"), Resolved::Rule(kb.relation("likes")));
        assert_eq!(kb.ask("likes", ["a", "b"]).unwrap(), Solutions::Failed);
    }

    #[test]
    fn test_ask_and_check_on_facts() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["mary", "james"]));
        kb.insert(kb.fact("sunny", Vec::<Term>::new()));

        assert_eq!(kb.ask("likes", ["mary", "_who"]).unwrap().to_string(), "[{who: james}]");
        assert_eq!(kb.ask("sunny", Vec::<Term>::new()).unwrap(), Solutions::Proven);
        assert_eq!(kb.check("likes", ["mary", "james"]).unwrap(), Subgoal::Bool(true));
        assert!(kb.check("likes", ["mary", "_who"]).unwrap().is_open());
        assert_eq!(kb.check("rainy", Vec::<Term>::new()).unwrap(), Subgoal::Bool(false));
    }

    #[test]
    fn test_check_follows_name_resolution() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["a", "b"]));
        assert_eq!(kb.resolve("likes"), Resolved::Relation(kb.relation("likes")));
        assert_eq!(kb.check("likes", ["a", "b"]).unwrap(), Subgoal::Bool(true));

        kb.learn("likes", |_, _| Ok(vec![Subgoal::Bool(false)]));
        assert_eq!(kb.check("likes", ["a", "b"]).unwrap(), Subgoal::Bool(false));
        assert!(matches!(
            kb.check("likes", ["a", "_who"]).unwrap(),
            Subgoal::Open(OpenQuery::Rule { .. })
        ));

        // neither a rule nor a stored relation: a plain fact test that fails
        assert_eq!(kb.resolve("hates"), Resolved::Constant(kb.constant("hates")));
        assert_eq!(kb.check("hates", ["a", "b"]).unwrap(), Subgoal::Bool(false));
        assert_eq!(kb.ask("hates", ["a", "_who"]).unwrap(), Solutions::Failed);
    }

    #[test]
    fn test_mixed_argument_kinds() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("age", [kb.term("bob"), Term::Integer(42)]));
        assert_eq!(
            kb.ask("age", [kb.term("_who"), Term::Integer(42)]).unwrap().to_string(),
            "[{who: bob}]"
        );
    }
}
