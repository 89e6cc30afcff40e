//! Declarative clauses.
//!
//! A [`ClauseTemplate`] is a rule body written as data: literals over the
//! rule's parameters and fixed terms. It is the form programs read from text
//! are lowered to, and it can be built fluently with [`ClauseBuilder`]:
//!
//! ```
//! use rulog::KnowledgeBase;
//!
//! let mut kb = KnowledgeBase::new();
//! kb.insert(kb.atom("mother", ["alice", "lea"]));
//! kb.insert(kb.atom("mother", ["lea", "alberta"]));
//! kb.clause("grandmother", ["x", "y"])
//!     .when("mother", ["x", "_z"])
//!     .when("mother", ["_z", "y"])
//!     .learn();
//!
//! let found = kb.ask("grandmother", ["alice", "_who"]).unwrap();
//! assert_eq!(found.to_string(), "[{who: alberta}]");
//! ```

use std::rc::Rc;

use crate::engine::{Clause, Subgoal};
use crate::error::{Error, Result};
use crate::knowledge::KnowledgeBase;
use crate::term::{Atom, Relation, Term};

/// A clause argument before the rule's arguments are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pattern {
    /// The rule argument at this position
    Param(usize),
    /// A fixed term, which may be a variable
    Term(Term),
    /// A compound built from other patterns
    Compound(Relation, Vec<Pattern>),
}

impl Pattern {
    fn instantiate(&self, rule: &Relation, args: &[Term]) -> Result<Term> {
        match self {
            Pattern::Param(index) => args.get(*index).cloned().ok_or_else(|| {
                Error::Clause(format!(
                    "{rule} has no parameter {index} (called with {} argument(s))",
                    args.len()
                ))
            }),
            Pattern::Term(term) => Ok(term.clone()),
            Pattern::Compound(predicate, parts) => {
                let terms = instantiate_all(parts, rule, args)?;
                Ok(Term::Compound(Rc::new(Atom::new(predicate.clone(), terms))))
            }
        }
    }
}

fn instantiate_all(patterns: &[Pattern], rule: &Relation, args: &[Term]) -> Result<Vec<Term>> {
    patterns
        .iter()
        .map(|pattern| pattern.instantiate(rule, args))
        .collect()
}

/// One condition in a clause body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Literal {
    /// The fact or rule holds
    Holds(Relation, Vec<Pattern>),
    /// The fact or rule does not hold
    Fails(Relation, Vec<Pattern>),
    /// The two terms differ
    Distinct(Pattern, Pattern),
}

impl Literal {
    fn evaluate(&self, kb: &KnowledgeBase, rule: &Relation, args: &[Term]) -> Result<Subgoal> {
        match self {
            Literal::Holds(predicate, patterns) => {
                kb.check_relation(predicate, instantiate_all(patterns, rule, args)?)
            }
            Literal::Fails(predicate, patterns) => Ok(kb
                .check_relation(predicate, instantiate_all(patterns, rule, args)?)?
                .negate()),
            Literal::Distinct(left, right) => {
                let left = left.instantiate(rule, args)?;
                let right = right.instantiate(rule, args)?;
                Ok(Subgoal::Bool(left != right))
            }
        }
    }
}

/// A rule body made of literals over the rule's parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClauseTemplate {
    rule: Relation,
    arity: usize,
    body: Vec<Literal>,
}

impl ClauseTemplate {
    /// A clause for `rule` taking `arity` arguments.
    #[must_use]
    pub fn new(rule: Relation, arity: usize, body: Vec<Literal>) -> Self {
        Self { rule, arity, body }
    }

    /// The rule this clause belongs to
    #[must_use]
    pub fn rule(&self) -> &Relation {
        &self.rule
    }

    /// Number of arguments the clause expects
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The body literals, in order
    #[must_use]
    pub fn body(&self) -> &[Literal] {
        &self.body
    }
}

impl Clause for ClauseTemplate {
    fn evaluate(&self, kb: &KnowledgeBase, args: &[Term]) -> Result<Vec<Subgoal>> {
        if args.len() != self.arity {
            return Err(Error::Arity {
                rule: self.rule.name().to_string(),
                expected: self.arity,
                found: args.len(),
            });
        }
        self.body
            .iter()
            .map(|literal| literal.evaluate(kb, &self.rule, args))
            .collect()
    }
}

/// Fluent construction of a [`ClauseTemplate`].
///
/// Argument text naming a parameter refers to that rule argument; other
/// text is read with [`KnowledgeBase::term`].
#[derive(Debug)]
pub struct ClauseBuilder<'kb> {
    kb: &'kb mut KnowledgeBase,
    rule: Relation,
    params: Vec<String>,
    body: Vec<Literal>,
}

impl KnowledgeBase {
    /// Start a clause for the rule `rule` with the given parameter names.
    pub fn clause<P: Into<String>>(
        &mut self,
        rule: &str,
        params: impl IntoIterator<Item = P>,
    ) -> ClauseBuilder<'_> {
        let rule = self.relation(rule);
        ClauseBuilder {
            kb: self,
            rule,
            params: params.into_iter().map(Into::into).collect(),
            body: Vec::new(),
        }
    }
}

impl ClauseBuilder<'_> {
    /// The pattern for one argument text.
    #[must_use]
    pub fn pattern(&self, text: &str) -> Pattern {
        match self.params.iter().position(|param| param == text) {
            Some(index) => Pattern::Param(index),
            None => Pattern::Term(self.kb.term(text)),
        }
    }

    fn patterns<A: AsRef<str>>(&self, args: impl IntoIterator<Item = A>) -> Vec<Pattern> {
        args.into_iter().map(|arg| self.pattern(arg.as_ref())).collect()
    }

    /// Require `predicate(args...)` to hold.
    #[must_use]
    pub fn when<A: AsRef<str>>(mut self, predicate: &str, args: impl IntoIterator<Item = A>) -> Self {
        let literal = Literal::Holds(self.kb.relation(predicate), self.patterns(args));
        self.body.push(literal);
        self
    }

    /// Require `predicate(args...)` not to hold.
    #[must_use]
    pub fn unless<A: AsRef<str>>(mut self, predicate: &str, args: impl IntoIterator<Item = A>) -> Self {
        let literal = Literal::Fails(self.kb.relation(predicate), self.patterns(args));
        self.body.push(literal);
        self
    }

    /// Require two arguments to differ.
    #[must_use]
    pub fn distinct(mut self, left: &str, right: &str) -> Self {
        let literal = Literal::Distinct(self.pattern(left), self.pattern(right));
        self.body.push(literal);
        self
    }

    /// Append an already-built literal.
    #[must_use]
    pub fn literal(mut self, literal: Literal) -> Self {
        self.body.push(literal);
        self
    }

    /// The finished template, without learning it.
    #[must_use]
    pub fn build(self) -> ClauseTemplate {
        ClauseTemplate::new(self.rule, self.params.len(), self.body)
    }

    /// Add the clause to its rule.
    pub fn learn(self) {
        let ClauseBuilder {
            kb,
            rule,
            params,
            body,
        } = self;
        let name = rule.name().to_string();
        kb.learn_clause(&name, ClauseTemplate::new(rule, params.len(), body));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::solutions::Solutions;

    fn philosophers() -> KnowledgeBase {
        let mut kb = KnowledgeBase::new();
        for (teacher, student) in [
            ("socrates", "plato"),
            ("cratylus", "plato"),
            ("plato", "aristotle"),
            ("aristotle", "alexander"),
        ] {
            kb.insert(kb.atom("teacher", [teacher, student]));
        }
        kb.clause("disciple", ["x", "y"]).when("teacher", ["y", "x"]).learn();
        kb.clause("follower", ["x", "y"]).when("disciple", ["x", "y"]).learn();
        kb.clause("follower", ["x", "y"])
            .when("disciple", ["x", "_z"])
            .when("follower", ["_z", "y"])
            .learn();
        kb
    }

    #[test]
    fn test_templates_match_closures() {
        let kb = philosophers();
        assert_eq!(
            kb.ask("follower", ["_who", "socrates"]).unwrap().to_string(),
            "[{who: plato}, {who: aristotle}]"
        );
        assert_eq!(
            kb.ask("follower", ["aristotle", "_who"]).unwrap().to_string(),
            "[{who: socrates}, {who: plato}, {who: cratylus}]"
        );
        assert!(kb.rule_applies("follower", &[kb.term("aristotle"), kb.term("socrates")]).unwrap());
    }

    #[test]
    fn test_negation_and_distinct() {
        let mut kb = KnowledgeBase::new();
        for fruit in ["apples", "oranges", "plums"] {
            kb.insert(kb.atom("fruit", [fruit]));
        }
        for (owner, thing) in [("alice", "apples"), ("dan", "money")] {
            kb.insert(kb.atom("has", [owner, thing]));
        }
        kb.clause("has_something_else", ["x"])
            .when("has", ["x", "_z"])
            .unless("fruit", ["_z"])
            .learn();
        assert_eq!(
            kb.ask("has_something_else", ["_who"]).unwrap().to_string(),
            "[{who: dan}]"
        );

        kb.clause("pair", ["x", "y"])
            .when("fruit", ["x"])
            .when("fruit", ["y"])
            .distinct("x", "y")
            .learn();
        assert!(!kb.rule_applies("pair", &[kb.term("plums"), kb.term("plums")]).unwrap());
        assert!(kb.rule_applies("pair", &[kb.term("plums"), kb.term("apples")]).unwrap());
    }

    #[test]
    fn test_nullary_literal() {
        let mut kb = KnowledgeBase::with_config(EngineConfig::atoms_only());
        kb.insert(kb.atom("person", ["ann"]));
        kb.clause("outdoors", ["x"]).when("person", ["x"]).when("sunny", Vec::<&str>::new()).learn();
        assert_eq!(kb.ask("outdoors", ["_who"]).unwrap(), Solutions::Failed);

        kb.insert(kb.fact("sunny", Vec::<Term>::new()));
        assert_eq!(kb.ask("outdoors", ["_who"]).unwrap().to_string(), "[{who: ann}]");
    }

    #[test]
    fn test_compound_pattern() {
        let mut kb = KnowledgeBase::with_config(EngineConfig::atoms_only());
        let date = kb.atom("date", ["may", "5"]);
        kb.insert(Atom::new(kb.relation("born"), [kb.term("alice"), date.into()]));

        let builder = kb.clause("born_in", ["who", "month"]);
        let month = Pattern::Compound(
            builder.kb.relation("date"),
            vec![builder.pattern("month"), builder.pattern("_day")],
        );
        let born = builder.kb.relation("born");
        builder
            .literal(Literal::Holds(born, vec![Pattern::Param(0), month]))
            .learn();

        assert!(kb.rule_applies("born_in", &[kb.term("alice"), kb.term("may")]).unwrap());
        assert!(!kb.rule_applies("born_in", &[kb.term("alice"), kb.term("june")]).unwrap());
    }

    #[test]
    fn test_arity_is_checked() {
        let mut kb = KnowledgeBase::new();
        kb.clause("mortal", ["x"]).when("human", ["x"]).learn();
        let err = kb
            .rule_applies("mortal", &[kb.term("a"), kb.term("b")])
            .unwrap_err();
        assert_eq!(
            err,
            Error::Arity {
                rule: "mortal".to_string(),
                expected: 1,
                found: 2
            }
        );
    }

    #[test]
    fn test_parameter_index_out_of_range() {
        let kb = KnowledgeBase::new();
        let template = ClauseTemplate::new(
            kb.relation("mortal"),
            1,
            vec![Literal::Holds(kb.relation("human"), vec![Pattern::Param(3)])],
        );
        let err = template.evaluate(&kb, &[kb.term("socrates")]).unwrap_err();
        assert_eq!(
            err,
            Error::Clause("mortal has no parameter 3 (called with 1 argument(s))".to_string())
        );
    }

    #[test]
    fn test_build_without_learning() {
        let mut kb = KnowledgeBase::new();
        let template = kb.clause("mortal", ["x"]).when("human", ["x"]).build();
        assert_eq!(template.arity(), 1);
        assert_eq!(template.body().len(), 1);
        assert_eq!(template.rule().name(), "mortal");
        assert!(!kb.has_rule("mortal"));
    }
}
