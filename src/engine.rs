use log::{debug, trace};
use std::fmt;
use std::ops::Not;
use std::rc::Rc;

use crate::error::{Error, Result};
use crate::knowledge::KnowledgeBase;
use crate::matcher::bind_slots;
use crate::solutions::{Binding, Solutions};
use crate::term::{Atom, Relation, Term};

/// One element of a clause body: already decided, or a query still to solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subgoal {
    /// A condition that was decided while the clause was evaluated
    Bool(bool),
    /// A query with free variables, solved by the resolver
    Open(OpenQuery),
}

impl Subgoal {
    /// The logical complement. Open queries flip their polarity.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            Subgoal::Bool(holds) => Subgoal::Bool(!holds),
            Subgoal::Open(query) => Subgoal::Open(query.negate()),
        }
    }

    /// The decided value, if the subgoal is closed.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Subgoal::Bool(holds) => Some(*holds),
            Subgoal::Open(_) => None,
        }
    }

    /// Whether the subgoal still has to be solved.
    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Subgoal::Open(_))
    }
}

impl Not for Subgoal {
    type Output = Subgoal;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl From<bool> for Subgoal {
    fn from(holds: bool) -> Self {
        Subgoal::Bool(holds)
    }
}

impl From<OpenQuery> for Subgoal {
    fn from(query: OpenQuery) -> Self {
        Subgoal::Open(query)
    }
}

impl From<Solutions> for Subgoal {
    fn from(solutions: Solutions) -> Self {
        Subgoal::Bool(solutions.is_success())
    }
}

/// A fact or rule query that still has free variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OpenQuery {
    /// Match a relational fact against the stored facts
    Fact {
        /// The pattern, containing at least one variable
        atom: Rc<Atom>,
        /// Look for bindings under which the fact does not hold
        negated: bool,
    },
    /// Match a rule
    Rule {
        /// The rule to solve
        rule: Relation,
        /// Argument slots, some of them variables
        args: Vec<Term>,
        /// Look for bindings under which the rule does not apply
        negated: bool,
    },
}

impl OpenQuery {
    /// The same query with its polarity flipped.
    #[must_use]
    pub fn negate(self) -> Self {
        match self {
            OpenQuery::Fact { atom, negated } => OpenQuery::Fact {
                atom,
                negated: !negated,
            },
            OpenQuery::Rule {
                rule,
                args,
                negated,
            } => OpenQuery::Rule {
                rule,
                args,
                negated: !negated,
            },
        }
    }

    /// Whether the query looks for failing bindings.
    #[must_use]
    pub fn is_negated(&self) -> bool {
        match self {
            OpenQuery::Fact { negated, .. } | OpenQuery::Rule { negated, .. } => *negated,
        }
    }

    /// Solve the query as a new top-level call.
    ///
    /// # Errors
    ///
    /// Propagates errors raised by rule clauses.
    pub fn solve(&self, kb: &KnowledgeBase) -> Result<Solutions> {
        match self {
            OpenQuery::Fact { atom, negated } => Ok(kb.match_atom(atom, *negated)),
            OpenQuery::Rule {
                rule,
                args,
                negated,
            } => kb.match_entry(rule, args, *negated),
        }
    }
}

impl Not for OpenQuery {
    type Output = OpenQuery;

    fn not(self) -> Self::Output {
        self.negate()
    }
}

impl fmt::Display for OpenQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_negated() {
            f.write_str("not ")?;
        }
        match self {
            OpenQuery::Fact { atom, .. } => write!(f, "{atom}"),
            OpenQuery::Rule { rule, args, .. } => write_call(f, rule, args),
        }
    }
}

fn write_call(f: &mut fmt::Formatter<'_>, rule: &Relation, args: &[Term]) -> fmt::Result {
    write!(f, "{rule}(")?;
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{arg}")?;
    }
    f.write_str(")")
}

/// A rule body alternative.
///
/// Evaluating a clause with concrete arguments yields its subgoals. The
/// clause holds when every closed subgoal is true and the open ones share a
/// witness.
pub trait Clause {
    /// Produce the subgoals for one application of the clause.
    ///
    /// # Errors
    ///
    /// Implementations report arity mismatches or malformed arguments.
    fn evaluate(&self, kb: &KnowledgeBase, args: &[Term]) -> Result<Vec<Subgoal>>;
}

impl<F> Clause for F
where
    F: Fn(&KnowledgeBase, &[Term]) -> Result<Vec<Subgoal>>,
{
    fn evaluate(&self, kb: &KnowledgeBase, args: &[Term]) -> Result<Vec<Subgoal>> {
        self(kb, args)
    }
}

/// Destructure clause arguments into a fixed-size array.
///
/// # Errors
///
/// [`Error::Arity`] when `args` does not have exactly `N` elements.
pub fn arguments<'a, const N: usize>(rule: &str, args: &'a [Term]) -> Result<&'a [Term; N]> {
    <&[Term; N]>::try_from(args).map_err(|_| Error::Arity {
        rule: rule.to_string(),
        expected: N,
        found: args.len(),
    })
}

/// A named, ordered list of clauses.
pub struct Rule {
    name: Relation,
    clauses: Vec<Box<dyn Clause>>,
}

impl Rule {
    /// A rule with no clauses yet
    #[must_use]
    pub fn new(name: Relation) -> Self {
        Self {
            name,
            clauses: Vec::new(),
        }
    }

    /// The rule name
    #[must_use]
    pub fn name(&self) -> &Relation {
        &self.name
    }

    /// Clauses in the order they were learned
    #[must_use]
    pub fn clauses(&self) -> &[Box<dyn Clause>] {
        &self.clauses
    }

    /// Number of clauses
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// Whether no clause has been learned
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub(crate) fn push(&mut self, clause: Box<dyn Clause>) {
        self.clauses.push(clause);
    }
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("clauses", &self.clauses.len())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Mode {
    Apply,
    Match,
    Complement,
}

/// A rule call, used to key the memo and the set of in-flight top-level calls.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Goal {
    rule: Relation,
    args: Vec<Term>,
    mode: Mode,
}

impl Goal {
    fn new(rule: &Relation, args: &[Term], mode: Mode) -> Self {
        Self {
            rule: rule.clone(),
            args: args.to_vec(),
            mode,
        }
    }
}

impl fmt::Display for Goal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.mode == Mode::Complement {
            f.write_str("not ")?;
        }
        write_call(f, &self.rule, &self.args)
    }
}

/// Whether the results of a clause's open subgoals agree.
///
/// Identical results decide on their own. Otherwise every result must
/// succeed and some binding must appear in every binding list.
fn shared_witness(results: &[Solutions]) -> bool {
    let mut distinct: Vec<&Solutions> = Vec::new();
    for result in results {
        if !distinct.contains(&result) {
            distinct.push(result);
        }
    }
    if let [only] = distinct.as_slice() {
        return only.is_success();
    }
    if results.iter().any(|result| !result.is_success()) {
        return false;
    }

    let lists: Vec<&[Binding]> = results
        .iter()
        .filter_map(|result| match result {
            Solutions::Found(bindings) => Some(bindings.as_slice()),
            Solutions::Failed | Solutions::Proven => None,
        })
        .collect();
    match lists.split_first() {
        Some((first, rest)) => first
            .iter()
            .any(|binding| rest.iter().all(|list| list.contains(binding))),
        None => true,
    }
}

impl KnowledgeBase {
    /// Query a rule. Ground arguments decide it now; arguments with
    /// variables give an open query.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRule`] when no rule is called `name`, or any error
    /// raised by its clauses.
    pub fn query_rule(&self, name: &str, args: &[Term]) -> Result<Subgoal> {
        let rule = self.rule_relation(name)?;
        if args.iter().any(Term::is_variable) {
            return Ok(Subgoal::Open(OpenQuery::Rule {
                rule,
                args: args.to_vec(),
                negated: false,
            }));
        }
        self.apply_entry(&rule, args).map(Subgoal::Bool)
    }

    /// Whether some clause of the rule holds for the concrete `args`.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRule`] when no rule is called `name`, or any error
    /// raised by its clauses.
    pub fn rule_applies(&self, name: &str, args: &[Term]) -> Result<bool> {
        let rule = self.rule_relation(name)?;
        self.apply_entry(&rule, args)
    }

    /// Find the bindings of the variable slots in `args` under which the
    /// rule applies.
    ///
    /// Without variable slots the answer is [`Solutions::Proven`] or
    /// [`Solutions::Failed`].
    ///
    /// # Errors
    ///
    /// [`Error::UnknownRule`] when no rule is called `name`, or any error
    /// raised by its clauses.
    pub fn match_rule(&self, name: &str, args: &[Term]) -> Result<Solutions> {
        let rule = self.rule_relation(name)?;
        self.match_entry(&rule, args, false)
    }

    fn rule_relation(&self, name: &str) -> Result<Relation> {
        self.rules
            .get_key_value(name)
            .map(|(relation, _)| relation.clone())
            .ok_or_else(|| Error::UnknownRule(name.to_string()))
    }

    fn apply_entry(&self, rule: &Relation, args: &[Term]) -> Result<bool> {
        let goal = Goal::new(rule, args, Mode::Apply);
        self.enter(goal, false, || {
            self.apply_rule(rule, args, self.config.max_depth)
        })
    }

    pub(crate) fn match_entry(&self, rule: &Relation, args: &[Term], negated: bool) -> Result<Solutions> {
        let mode = if negated { Mode::Complement } else { Mode::Match };
        let goal = Goal::new(rule, args, mode);
        self.enter(goal, Solutions::Failed, || {
            self.solve_rule(rule, args, self.config.max_depth, negated)
        })
    }

    // A top-level call identical to one already in progress fails instead of
    // recursing again.
    fn enter<T>(&self, goal: Goal, refused: T, body: impl FnOnce() -> Result<T>) -> Result<T> {
        if !self.active.borrow_mut().insert(goal.clone()) {
            debug!("{goal} is already being solved; failing the nested call");
            return Ok(refused);
        }
        let outcome = body();
        self.active.borrow_mut().shift_remove(&goal);
        outcome
    }

    fn apply_rule(&self, name: &Relation, args: &[Term], depth: usize) -> Result<bool> {
        if depth == 0 {
            debug!("depth budget exhausted applying {name}");
            return Ok(false);
        }
        let rule = self
            .rules
            .get(name)
            .ok_or_else(|| Error::UnknownRule(name.to_string()))?;

        for (index, clause) in rule.clauses().iter().enumerate() {
            let mut closed = true;
            let mut open = Vec::new();
            for subgoal in clause.evaluate(self, args)? {
                match subgoal {
                    Subgoal::Bool(holds) => closed &= holds,
                    Subgoal::Open(query) => open.push(query),
                }
            }
            if !closed {
                continue;
            }
            if open.is_empty() {
                trace!("clause {index} of {name} holds outright");
                return Ok(true);
            }

            let results = open
                .iter()
                .map(|query| self.resolve_open(query, depth - 1))
                .collect::<Result<Vec<_>>>()?;
            if shared_witness(&results) {
                trace!("clause {index} of {name} holds with {} open subgoal(s)", results.len());
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn resolve_open(&self, query: &OpenQuery, depth: usize) -> Result<Solutions> {
        match query {
            OpenQuery::Fact { atom, negated } => Ok(self.match_atom(atom, *negated)),
            OpenQuery::Rule {
                rule,
                args,
                negated,
            } => self.solve_rule(rule, args, depth, *negated),
        }
    }

    fn solve_rule(&self, rule: &Relation, args: &[Term], depth: usize, negated: bool) -> Result<Solutions> {
        if depth == 0 {
            debug!("depth budget exhausted matching {rule}");
            return Ok(Solutions::Failed);
        }
        let mode = if negated { Mode::Complement } else { Mode::Match };
        let goal = Goal::new(rule, args, mode);
        if self.config.memoize {
            let cached = self.memo.borrow().get(&goal).cloned();
            if let Some(hit) = cached {
                trace!("memo hit for {goal}");
                return Ok(hit);
            }
        }

        let mut found: Vec<Binding> = Vec::new();
        for candidate in self.match_bindable_objects(args) {
            let Some(binding) = bind_slots(args, &candidate) else {
                continue;
            };
            if self.apply_rule(rule, &candidate, depth - 1)? != negated && !found.contains(&binding) {
                found.push(binding);
            }
        }
        let outcome = if args.iter().any(Term::is_variable) {
            Solutions::from_bindings(found)
        } else {
            Solutions::from(!found.is_empty())
        };
        debug!("{goal} at depth {depth}: {outcome}");

        if self.config.memoize {
            self.memo.borrow_mut().insert(goal, outcome.clone());
        }
        Ok(outcome)
    }
}
