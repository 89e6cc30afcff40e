//! Term model: constants, variables, relations and facts.
//!
//! Every named piece is backed by an interned [`Symbol`], so two constants
//! with the same name are the same value. Construction goes through the
//! [`KnowledgeBase`](crate::KnowledgeBase), which owns the interning table.

use indexmap::IndexSet;
use smallvec::SmallVec;
use std::borrow::Borrow;
use std::fmt;
use std::rc::Rc;

use crate::solutions::Binding;
use crate::symbol::Symbol;

/// An atomic value usable as a fact argument (e.g. `alice`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Constant(Symbol);

/// A placeholder used while building queries and rules (e.g. `_who`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Variable(Symbol);

/// A predicate symbol (e.g. `mother`). Rules are named by relations too.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Relation(Symbol);

macro_rules! named {
    ($($ty:ident),*) => {$(
        impl $ty {
            pub(crate) fn new(symbol: Symbol) -> Self {
                Self(symbol)
            }

            /// The interned name.
            #[must_use]
            pub fn name(&self) -> &str {
                self.0.as_str()
            }

            /// The underlying symbol.
            #[must_use]
            pub fn symbol(&self) -> &Symbol {
                &self.0
            }
        }
    )*};
}

named!(Constant, Variable, Relation);

// rules are looked up by plain name
impl Borrow<str> for Relation {
    fn borrow(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "_{}", self.0)
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A fact argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Term {
    /// A free placeholder, bound during matching.
    Variable(Variable),
    /// An interned constant.
    Constant(Constant),
    /// An integer literal.
    Integer(i64),
    /// A nested relational fact, e.g. `date(may, 5)`.
    Compound(Rc<Atom>),
}

impl Term {
    /// Whether this term is a variable slot.
    #[must_use]
    pub fn is_variable(&self) -> bool {
        matches!(self, Term::Variable(_))
    }

    /// Whether the term contains no variables, looking inside compounds.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        match self {
            Term::Variable(_) => false,
            Term::Constant(_) | Term::Integer(_) => true,
            Term::Compound(atom) => atom.is_ground(),
        }
    }

    /// The variable, if this term is one.
    #[must_use]
    pub fn as_variable(&self) -> Option<&Variable> {
        match self {
            Term::Variable(var) => Some(var),
            _ => None,
        }
    }

    /// The constant, if this term is one.
    #[must_use]
    pub fn as_constant(&self) -> Option<&Constant> {
        match self {
            Term::Constant(constant) => Some(constant),
            _ => None,
        }
    }

    /// The integer value, if this term is an integer literal.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Term::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Replace variables bound in `binding`, recursing into compounds.
    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Term {
        match self {
            Term::Variable(var) => binding.get(var).cloned().unwrap_or_else(|| self.clone()),
            Term::Constant(_) | Term::Integer(_) => self.clone(),
            Term::Compound(atom) if atom.is_ground() => self.clone(),
            Term::Compound(atom) => Term::Compound(Rc::new(atom.substitute(binding))),
        }
    }

    fn collect_variables(&self, out: &mut IndexSet<Variable>) {
        match self {
            Term::Variable(var) => {
                out.insert(var.clone());
            }
            Term::Constant(_) | Term::Integer(_) => {}
            Term::Compound(atom) => {
                for term in &atom.terms {
                    term.collect_variables(out);
                }
            }
        }
    }
}

impl From<Constant> for Term {
    fn from(constant: Constant) -> Self {
        Term::Constant(constant)
    }
}

impl From<Variable> for Term {
    fn from(var: Variable) -> Self {
        Term::Variable(var)
    }
}

impl From<i64> for Term {
    fn from(value: i64) -> Self {
        Term::Integer(value)
    }
}

impl From<Atom> for Term {
    fn from(atom: Atom) -> Self {
        Term::Compound(Rc::new(atom))
    }
}

impl From<Rc<Atom>> for Term {
    fn from(atom: Rc<Atom>) -> Self {
        Term::Compound(atom)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Variable(var) => write!(f, "{var}"),
            Term::Constant(constant) => write!(f, "{constant}"),
            Term::Integer(value) => write!(f, "{value}"),
            Term::Compound(atom) => write!(f, "{atom}"),
        }
    }
}

/// A relational fact (e.g. `mother(alice, lea)`), possibly holding variables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    /// The relation this fact is about
    pub predicate: Relation,
    /// The ordered arguments
    pub terms: SmallVec<[Term; 4]>,
}

impl Atom {
    /// Build an atom from a relation and its arguments.
    pub fn new(predicate: Relation, terms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            predicate,
            terms: terms.into_iter().collect(),
        }
    }

    /// Arguments able to ground a query: constants and integer literals.
    #[must_use]
    pub fn objects(&self) -> Vec<Term> {
        self.terms
            .iter()
            .filter(|term| matches!(term, Term::Constant(_) | Term::Integer(_)))
            .cloned()
            .collect()
    }

    /// Distinct variables in depth-first order of first appearance.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        let mut out = IndexSet::new();
        for term in &self.terms {
            term.collect_variables(&mut out);
        }
        out.into_iter().collect()
    }

    /// Whether no argument (at any nesting level) is a variable.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }

    /// A copy with every variable bound in `binding` replaced.
    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Atom {
        Atom {
            predicate: self.predicate.clone(),
            terms: self.terms.iter().map(|term| term.substitute(binding)).collect(),
        }
    }

    /// Constants and integers at any depth, in argument order.
    pub(crate) fn collect_objects(&self, out: &mut IndexSet<Term>) {
        for term in &self.terms {
            match term {
                Term::Constant(_) | Term::Integer(_) => {
                    out.insert(term.clone());
                }
                Term::Compound(inner) => inner.collect_objects(out),
                Term::Variable(_) => {}
            }
        }
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.predicate)?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}

/// A storable assertion: either a bare name or a relational fact.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Fact {
    /// A fact that is just a name, e.g. `sunny`.
    Nullary(Relation),
    /// A relation applied to arguments.
    Atom(Rc<Atom>),
}

impl Fact {
    /// The relation the fact is built from.
    #[must_use]
    pub fn relation(&self) -> &Relation {
        match self {
            Fact::Nullary(relation) => relation,
            Fact::Atom(atom) => &atom.predicate,
        }
    }

    /// The relational form, if any.
    #[must_use]
    pub fn as_atom(&self) -> Option<&Rc<Atom>> {
        match self {
            Fact::Nullary(_) => None,
            Fact::Atom(atom) => Some(atom),
        }
    }

    /// Distinct variables in depth-first order. Nullary facts have none.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.as_atom().map(|atom| atom.variables()).unwrap_or_default()
    }

    /// Whether the fact contains no variables.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.as_atom().map_or(true, |atom| atom.is_ground())
    }

    /// A copy with every variable bound in `binding` replaced.
    #[must_use]
    pub fn substitute(&self, binding: &Binding) -> Fact {
        match self {
            Fact::Nullary(_) => self.clone(),
            Fact::Atom(atom) => Fact::Atom(Rc::new(atom.substitute(binding))),
        }
    }
}

impl From<Atom> for Fact {
    fn from(atom: Atom) -> Self {
        Fact::Atom(Rc::new(atom))
    }
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fact::Nullary(relation) => write!(f, "{relation}"),
            Fact::Atom(atom) => write!(f, "{atom}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::KnowledgeBase;

    #[test]
    fn test_display_renders_canonical_form() {
        let kb = KnowledgeBase::new();
        let born = kb.atom("born", ["alice", "_when"]);
        assert_eq!(born.to_string(), "born(alice, _when)");
        assert_eq!(kb.fact("sunny", Vec::<Term>::new()).to_string(), "sunny");
    }

    #[test]
    fn test_objects_skip_variables_and_compounds() {
        let kb = KnowledgeBase::new();
        let date = kb.atom("date", ["may", "5"]);
        let atom = Atom::new(
            kb.relation("born"),
            [kb.term("alice"), kb.term("_x"), date.into(), Term::Integer(7)],
        );
        let objects: Vec<String> = atom.objects().iter().map(ToString::to_string).collect();
        assert_eq!(objects, vec!["alice", "7"]);
    }

    #[test]
    fn test_variables_recurse_and_deduplicate() {
        let kb = KnowledgeBase::new();
        let date = kb.atom("date", ["_m", "_d"]);
        let atom = Atom::new(
            kb.relation("born"),
            [kb.term("_who"), date.into(), kb.term("_who")],
        );
        let variables = atom.variables();
        let names: Vec<&str> = variables.iter().map(Variable::name).collect();
        assert_eq!(names, vec!["who", "m", "d"]);
    }

    #[test]
    fn test_substitute_reaches_nested_compounds() {
        let kb = KnowledgeBase::new();
        let date = kb.atom("date", ["_m", "5"]);
        let atom = Atom::new(kb.relation("born"), [kb.term("_who"), date.into()]);

        let mut binding = Binding::new();
        binding.insert(kb.variable("m"), kb.term("may"));

        let bound = atom.substitute(&binding);
        assert_eq!(bound.to_string(), "born(_who, date(may, 5))");
        // the source atom is unchanged
        assert_eq!(atom.to_string(), "born(_who, date(_m, 5))");
        assert!(!bound.is_ground());
    }

    #[test]
    fn test_interned_constants_compare_equal() {
        let kb = KnowledgeBase::new();
        assert_eq!(kb.constant("alice"), kb.constant("alice"));
        assert_ne!(kb.constant("alice"), kb.constant("bob"));
        assert_eq!(
            kb.atom("likes", ["alice", "bob"]),
            kb.atom("likes", ["alice", "bob"])
        );
    }
}
