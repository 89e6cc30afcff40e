//! Query answers.
//!
//! A query either fails, holds outright (it had nothing to bind), or holds
//! under one or more variable bindings. The three cases are kept apart so a
//! ground fact that is true is never confused with an empty list of bindings.

use indexmap::IndexMap;
use std::fmt;

use crate::term::{Term, Variable};

/// One solution: a value for each variable of a query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Binding {
    values: IndexMap<Variable, Term>,
}

impl Binding {
    /// An empty binding
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `var`, replacing any previous value.
    pub fn insert(&mut self, var: Variable, value: Term) -> Option<Term> {
        self.values.insert(var, value)
    }

    /// The value bound to `var`.
    #[must_use]
    pub fn get(&self, var: &Variable) -> Option<&Term> {
        self.values.get(var)
    }

    /// The value bound to the variable called `name`.
    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Term> {
        self.values
            .iter()
            .find(|(var, _)| var.name() == name)
            .map(|(_, value)| value)
    }

    /// Number of bound variables
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether nothing is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterate over `(variable, value)` pairs in binding order.
    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Term)> {
        self.values.iter()
    }
}

impl FromIterator<(Variable, Term)> for Binding {
    fn from_iter<I: IntoIterator<Item = (Variable, Term)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (var, value)) in self.values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {value}", var.name())?;
        }
        f.write_str("}")
    }
}

/// The outcome of matching a fact or a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Solutions {
    /// No satisfying binding exists (or the depth budget ran out).
    Failed,
    /// The query had nothing to bind and holds.
    Proven,
    /// Every distinct binding under which the query holds, in enumeration order.
    Found(Vec<Binding>),
}

impl Solutions {
    /// Wrap a binding list, mapping the empty list to [`Solutions::Failed`].
    #[must_use]
    pub fn from_bindings(bindings: Vec<Binding>) -> Self {
        if bindings.is_empty() {
            Solutions::Failed
        } else {
            Solutions::Found(bindings)
        }
    }

    /// Whether the query holds in any way.
    #[must_use]
    pub fn is_success(&self) -> bool {
        !matches!(self, Solutions::Failed)
    }

    /// The bindings found; empty for [`Solutions::Failed`] and [`Solutions::Proven`].
    #[must_use]
    pub fn bindings(&self) -> &[Binding] {
        match self {
            Solutions::Found(bindings) => bindings,
            Solutions::Failed | Solutions::Proven => &[],
        }
    }

    /// The first binding found, if any.
    #[must_use]
    pub fn first(&self) -> Option<&Binding> {
        self.bindings().first()
    }

    /// Number of bindings found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings().len()
    }

    /// Whether no bindings were found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings().is_empty()
    }

    /// Render as JSON: `false`, `true`, or an array of objects.
    #[cfg(feature = "serde")]
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl From<bool> for Solutions {
    fn from(holds: bool) -> Self {
        if holds {
            Solutions::Proven
        } else {
            Solutions::Failed
        }
    }
}

impl fmt::Display for Solutions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Solutions::Failed => f.write_str("false"),
            Solutions::Proven => f.write_str("true"),
            Solutions::Found(bindings) => {
                f.write_str("[")?;
                for (i, binding) in bindings.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{binding}")?;
                }
                f.write_str("]")
            }
        }
    }
}

#[cfg(feature = "serde")]
mod serialize {
    use serde::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

    use super::{Binding, Solutions};
    use crate::term::Term;

    impl Serialize for Term {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Term::Integer(value) => serializer.serialize_i64(*value),
                Term::Constant(constant) => serializer.serialize_str(constant.name()),
                other => serializer.collect_str(other),
            }
        }
    }

    impl Serialize for Binding {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            let mut map = serializer.serialize_map(Some(self.len()))?;
            for (var, value) in self.iter() {
                map.serialize_entry(var.name(), value)?;
            }
            map.end()
        }
    }

    impl Serialize for Solutions {
        fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
            match self {
                Solutions::Failed => serializer.serialize_bool(false),
                Solutions::Proven => serializer.serialize_bool(true),
                Solutions::Found(bindings) => {
                    let mut seq = serializer.serialize_seq(Some(bindings.len()))?;
                    for binding in bindings {
                        seq.serialize_element(binding)?;
                    }
                    seq.end()
                }
            }
        }
    }
}
