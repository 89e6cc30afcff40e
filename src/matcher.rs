//! Brute-force matching over the knowledge base domain.
//!
//! Free variables are ground by enumerating every assignment drawn from
//! [`KnowledgeBase::domain`], in odometer order.

use log::trace;
use smallvec::SmallVec;

use crate::knowledge::KnowledgeBase;
use crate::solutions::{Binding, Solutions};
use crate::term::{Atom, Fact, Term};

/// All `width`-tuples over a domain, rightmost position cycling fastest.
///
/// A width of zero yields one empty tuple. An empty domain with a non-zero
/// width yields nothing.
#[derive(Debug, Clone)]
pub struct Odometer<'d> {
    domain: &'d [Term],
    digits: SmallVec<[usize; 4]>,
    exhausted: bool,
}

impl<'d> Odometer<'d> {
    /// Start at the all-first-element tuple.
    #[must_use]
    pub fn new(domain: &'d [Term], width: usize) -> Self {
        Self {
            domain,
            digits: SmallVec::from_elem(0, width),
            exhausted: width > 0 && domain.is_empty(),
        }
    }
}

impl Iterator for Odometer<'_> {
    type Item = SmallVec<[Term; 4]>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let tuple = self
            .digits
            .iter()
            .map(|&digit| self.domain[digit].clone())
            .collect();

        self.exhausted = true;
        for digit in self.digits.iter_mut().rev() {
            *digit += 1;
            if *digit < self.domain.len() {
                self.exhausted = false;
                break;
            }
            *digit = 0;
        }
        Some(tuple)
    }
}

/// Bind the variable slots of `slots` to the matching positions of `candidate`.
///
/// Returns `None` when a non-variable slot differs from the candidate, or
/// when a variable repeated across slots would take two different values.
pub(crate) fn bind_slots(slots: &[Term], candidate: &[Term]) -> Option<Binding> {
    let mut binding = Binding::new();
    for (slot, value) in slots.iter().zip(candidate) {
        match slot {
            Term::Variable(var) => match binding.get(var) {
                Some(bound) if bound != value => return None,
                Some(_) => {}
                None => {
                    binding.insert(var.clone(), value.clone());
                }
            },
            fixed if fixed != value => return None,
            _ => {}
        }
    }
    Some(binding)
}

impl KnowledgeBase {
    /// Find the bindings under which `fact` holds, or (when `negated`) does
    /// not hold.
    ///
    /// A ground fact is simply tested: [`Solutions::Proven`] or
    /// [`Solutions::Failed`]. Otherwise every assignment of the fact's
    /// variables over the domain is tried; satisfying bindings are returned
    /// once each, in enumeration order.
    #[must_use]
    pub fn match_fact(&self, fact: &Fact, negated: bool) -> Solutions {
        match fact {
            Fact::Atom(atom) => self.match_atom(atom, negated),
            Fact::Nullary(_) => Solutions::from(self.holds(fact) != negated),
        }
    }

    pub(crate) fn match_atom(&self, atom: &Atom, negated: bool) -> Solutions {
        let variables = atom.variables();
        if variables.is_empty() {
            return Solutions::from(self.holds_atom(atom) != negated);
        }

        let domain = self.domain();
        let mut found: Vec<Binding> = Vec::new();
        for tuple in Odometer::new(&domain, variables.len()) {
            let binding: Binding = variables.iter().cloned().zip(tuple).collect();
            if self.holds_atom(&atom.substitute(&binding)) != negated && !found.contains(&binding)
            {
                found.push(binding);
            }
        }
        trace!(
            "{}{atom}: {} binding(s) over {} domain element(s)",
            if negated { "not " } else { "" },
            found.len(),
            domain.len()
        );
        Solutions::from_bindings(found)
    }

    /// Every concrete argument list obtainable from `slots` by replacing each
    /// variable slot with a domain element.
    ///
    /// Tuples are enumerated in odometer order. Variable slots take tuple
    /// positions from the right end, so the rightmost variable receives the
    /// first position. Non-variable slots are kept as they are.
    #[must_use]
    pub fn match_bindable_objects(&self, slots: &[Term]) -> Vec<Vec<Term>> {
        let width = slots.iter().filter(|slot| slot.is_variable()).count();
        let domain = self.domain();
        Odometer::new(&domain, width)
            .map(|mut tuple| {
                slots
                    .iter()
                    .map(|slot| match slot {
                        Term::Variable(_) => tuple.pop().unwrap_or_else(|| slot.clone()),
                        fixed => fixed.clone(),
                    })
                    .collect()
            })
            .collect()
    }
}
