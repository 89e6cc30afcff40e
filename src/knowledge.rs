//! The knowledge base: stored facts, learned rules and the derived domain.

use indexmap::{IndexMap, IndexSet};
use log::info;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::config::EngineConfig;
use crate::engine::{Clause, Goal, OpenQuery, Rule, Subgoal};
use crate::error::Result;
use crate::resolve::IntoTerm;
use crate::solutions::Solutions;
use crate::symbol::{Symbol, SymbolTable};
use crate::term::{Atom, Constant, Fact, Relation, Term, Variable};

type Emitter = Box<dyn Fn(&str)>;

/// Facts, rules and the state the resolver keeps between queries.
///
/// The knowledge base is single-threaded: it is mutated between queries
/// (`insert`, `learn`, `clear`) and read during them. Interior mutability is
/// limited to the symbol table, the rule-match memo, the in-flight goal set
/// and the emitted-message transcript.
pub struct KnowledgeBase {
    pub(crate) config: EngineConfig,
    symbols: RefCell<SymbolTable>,
    facts: Vec<Fact>,
    pub(crate) rules: IndexMap<Relation, Rule>,
    pub(crate) memo: RefCell<IndexMap<Goal, Solutions>>,
    pub(crate) active: RefCell<IndexSet<Goal>>,
    transcript: RefCell<Vec<String>>,
    emitter: Option<Emitter>,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for KnowledgeBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KnowledgeBase")
            .field("config", &self.config)
            .field("facts", &self.facts)
            .field("rules", &self.rules)
            .field("memo_entries", &self.memo.borrow().len())
            .field("emitter", &self.emitter.is_some())
            .finish_non_exhaustive()
    }
}

impl KnowledgeBase {
    /// Create an empty knowledge base with the default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an empty knowledge base with the given configuration
    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            symbols: RefCell::new(SymbolTable::new()),
            facts: Vec::new(),
            rules: IndexMap::new(),
            memo: RefCell::new(IndexMap::new()),
            active: RefCell::new(IndexSet::new()),
            transcript: RefCell::new(Vec::new()),
            emitter: None,
        }
    }

    /// The active configuration
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn intern(&self, name: &str) -> Symbol {
        self.symbols.borrow_mut().intern(name)
    }

    /// The constant called `name`. Same name, same constant.
    pub fn constant(&self, name: &str) -> Constant {
        Constant::new(self.intern(name))
    }

    /// The variable called `name` (without any `_` sentinel).
    pub fn variable(&self, name: &str) -> Variable {
        Variable::new(self.intern(name))
    }

    /// The relation called `name`.
    pub fn relation(&self, name: &str) -> Relation {
        Relation::new(self.intern(name))
    }

    /// Build a relational fact. Argument text is read with [`KnowledgeBase::term`].
    pub fn atom<T: IntoTerm>(&self, predicate: &str, args: impl IntoIterator<Item = T>) -> Atom {
        let terms: Vec<Term> = args.into_iter().map(|arg| arg.into_term(self)).collect();
        Atom::new(self.relation(predicate), terms)
    }

    /// Build a fact; no arguments gives a nullary fact.
    pub fn fact<T: IntoTerm>(&self, predicate: &str, args: impl IntoIterator<Item = T>) -> Fact {
        let atom = self.atom(predicate, args);
        if atom.terms.is_empty() {
            Fact::Nullary(atom.predicate)
        } else {
            Fact::from(atom)
        }
    }

    /// Store a fact. Duplicates are kept.
    pub fn insert(&mut self, fact: impl Into<Fact>) {
        self.facts.push(fact.into());
        self.invalidate();
    }

    /// Add a clause to the rule called `name`, creating the rule on first use.
    ///
    /// Clauses are tried in the order they were learned.
    pub fn learn<F>(&mut self, name: &str, clause: F)
    where
        F: Fn(&KnowledgeBase, &[Term]) -> Result<Vec<Subgoal>> + 'static,
    {
        self.learn_clause(name, clause);
    }

    /// Add any [`Clause`] implementation to the rule called `name`.
    pub fn learn_clause(&mut self, name: &str, clause: impl Clause + 'static) {
        let relation = self.relation(name);
        self.rules
            .entry(relation.clone())
            .or_insert_with(|| Rule::new(relation))
            .push(Box::new(clause));
        self.invalidate();
    }

    /// Forget every fact, rule, cached result and emitted message.
    ///
    /// Interned names are kept.
    pub fn clear(&mut self) {
        self.facts.clear();
        self.rules.clear();
        self.transcript.get_mut().clear();
        self.invalidate();
    }

    /// Drop every cached rule-match result.
    pub fn reset_cache(&self) {
        self.memo.borrow_mut().clear();
    }

    // cached answers are not recomputed when facts or rules change
    fn invalidate(&mut self) {
        self.memo.get_mut().clear();
    }

    /// Number of cached rule-match results.
    #[must_use]
    pub fn cached_results(&self) -> usize {
        self.memo.borrow().len()
    }

    /// Stored facts in insertion order.
    #[must_use]
    pub fn facts(&self) -> &[Fact] {
        &self.facts
    }

    /// Test a fact: ground facts give a boolean, facts with variables give
    /// an open query to be solved later.
    #[must_use]
    pub fn query(&self, fact: &Fact) -> Subgoal {
        match fact {
            Fact::Atom(atom) if !atom.is_ground() => Subgoal::Open(OpenQuery::Fact {
                atom: Rc::clone(atom),
                negated: false,
            }),
            ground => Subgoal::Bool(self.holds(ground)),
        }
    }

    /// Whether an identical fact is stored.
    #[must_use]
    pub fn holds(&self, fact: &Fact) -> bool {
        self.facts.iter().any(|stored| stored == fact)
    }

    pub(crate) fn holds_atom(&self, atom: &Atom) -> bool {
        self.facts
            .iter()
            .any(|stored| matches!(stored, Fact::Atom(stored) if **stored == *atom))
    }

    /// Whether a rule called `name` has been learned.
    #[must_use]
    pub fn has_rule(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// The rule called `name`.
    #[must_use]
    pub fn find_rule(&self, name: &str) -> Option<&Rule> {
        self.rules.get(name)
    }

    /// Relations used by stored facts, in order of first use.
    #[must_use]
    pub fn relations(&self) -> Vec<Relation> {
        let relations: IndexSet<&Relation> = self.facts.iter().map(Fact::relation).collect();
        relations.into_iter().cloned().collect()
    }

    /// Everything a free variable may be bound to.
    ///
    /// For each stored fact in insertion order: its constants and integers
    /// (looking inside compound arguments), then the fact itself when
    /// `quantify_over_facts` is set. Duplicates keep their first position.
    #[must_use]
    pub fn domain(&self) -> Vec<Term> {
        let mut domain = IndexSet::new();
        for fact in &self.facts {
            if let Fact::Atom(atom) = fact {
                atom.collect_objects(&mut domain);
                if self.config.quantify_over_facts {
                    domain.insert(Term::Compound(Rc::clone(atom)));
                }
            }
        }
        domain.into_iter().collect()
    }

    /// Record a human-readable message from a rule body.
    ///
    /// The message is logged, kept in the transcript and passed to the
    /// emitter hook if one is set. Always holds.
    pub fn emit(&self, message: impl Into<String>) -> Subgoal {
        let message = message.into();
        info!("{message}");
        if let Some(emitter) = &self.emitter {
            emitter(&message);
        }
        self.transcript.borrow_mut().push(message);
        Subgoal::Bool(true)
    }

    /// Install a hook called with every emitted message.
    pub fn set_emitter(&mut self, emitter: impl Fn(&str) + 'static) {
        self.emitter = Some(Box::new(emitter));
    }

    /// Messages emitted so far.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.transcript.borrow().clone()
    }

    /// Messages emitted so far, clearing the transcript.
    pub fn take_messages(&self) -> Vec<String> {
        std::mem::take(&mut *self.transcript.borrow_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn rendered(terms: &[Term]) -> Vec<String> {
        terms.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_ground_fact_round_trip() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["bob", "alice"]));

        assert!(kb.holds(&kb.fact("likes", ["bob", "alice"])));
        assert!(!kb.holds(&kb.fact("likes", ["alice", "bob"])));
        assert!(!kb.holds(&kb.fact("loves", ["bob", "alice"])));
    }

    #[test]
    fn test_nullary_facts() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.fact("sunny", Vec::<Term>::new()));
        kb.insert(kb.fact("logic_programming_is_cool", Vec::<Term>::new()));

        assert_eq!(kb.query(&kb.fact("sunny", Vec::<Term>::new())), Subgoal::Bool(true));
        assert_eq!(kb.query(&kb.fact("rainy", Vec::<Term>::new())), Subgoal::Bool(false));
        assert!(kb.domain().is_empty());
    }

    #[test]
    fn test_query_with_variables_is_open() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["mary", "james"]));

        let subgoal = kb.query(&kb.fact("likes", ["mary", "_who"]));
        assert!(matches!(
            subgoal,
            Subgoal::Open(OpenQuery::Fact { negated: false, .. })
        ));
    }

    #[test]
    fn test_duplicates_are_stored() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["a", "b"]));
        kb.insert(kb.atom("likes", ["a", "b"]));
        assert_eq!(kb.facts().len(), 2);
        assert_eq!(rendered(&kb.domain()), vec!["a", "b", "likes(a, b)"]);
    }

    #[test]
    fn test_domain_order_and_nesting() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("mother", ["alice", "lea"]));
        let date = kb.atom("date", ["may", "5"]);
        kb.insert(Atom::new(kb.relation("born"), [kb.term("alice"), date.into()]));

        assert_eq!(
            rendered(&kb.domain()),
            vec![
                "alice",
                "lea",
                "mother(alice, lea)",
                "may",
                "5",
                "born(alice, date(may, 5))"
            ]
        );
    }

    #[test]
    fn test_domain_without_facts() {
        let mut kb = KnowledgeBase::with_config(EngineConfig::atoms_only());
        kb.insert(kb.atom("mother", ["alice", "lea"]));
        kb.insert(kb.atom("mother", ["lea", "alberta"]));
        assert_eq!(rendered(&kb.domain()), vec!["alice", "lea", "alberta"]);
    }

    #[test]
    fn test_rules_accumulate_clauses() {
        let mut kb = KnowledgeBase::new();
        assert!(!kb.has_rule("parent"));
        kb.learn("parent", |_, _| Ok(vec![Subgoal::Bool(false)]));
        kb.learn("parent", |_, _| Ok(vec![Subgoal::Bool(true)]));

        assert!(kb.has_rule("parent"));
        assert_eq!(kb.find_rule("parent").map(Rule::len), Some(2));
        assert!(kb.find_rule("ancestor").is_none());
    }

    #[test]
    fn test_clear_resets_everything_but_names() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("likes", ["a", "b"]));
        kb.learn("friends", |_, _| Ok(vec![]));
        kb.emit("hello");

        kb.clear();
        assert!(kb.facts().is_empty());
        assert!(!kb.has_rule("friends"));
        assert!(kb.messages().is_empty());
        assert_eq!(kb.constant("a"), kb.constant("a"));
    }

    #[test]
    fn test_relations_in_first_use_order() {
        let mut kb = KnowledgeBase::new();
        kb.insert(kb.atom("mother", ["a", "b"]));
        kb.insert(kb.atom("father", ["c", "d"]));
        kb.insert(kb.atom("mother", ["e", "f"]));
        let names: Vec<String> = kb.relations().iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["mother", "father"]);
    }

    #[test]
    fn test_emit_records_and_forwards() {
        let seen = Rc::new(Cell::new(0));
        let counter = Rc::clone(&seen);
        let mut kb = KnowledgeBase::new();
        kb.set_emitter(move |_| counter.set(counter.get() + 1));

        assert_eq!(kb.emit("Move top disk from left to center."), Subgoal::Bool(true));
        assert_eq!(seen.get(), 1);
        assert_eq!(kb.take_messages(), vec!["Move top disk from left to center."]);
        assert!(kb.messages().is_empty());
    }
}
