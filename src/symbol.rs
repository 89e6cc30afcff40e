use indexmap::IndexSet;
use std::borrow::Borrow;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

/// An interned name.
///
/// Symbols handed out by the same [`SymbolTable`] share one allocation per
/// name, so comparing two of them usually stops at the pointer check.
#[derive(Clone, Eq)]
pub struct Symbol(Rc<str>);

impl Symbol {
    /// The text of the symbol.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0 == other.0
    }
}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", &*self.0)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interning table owned by a knowledge base.
///
/// Entries are never evicted: a name interned once stays resident for the
/// lifetime of the table, including across `KnowledgeBase::clear`.
#[derive(Debug, Default)]
pub struct SymbolTable {
    names: IndexSet<Symbol>,
}

impl SymbolTable {
    /// Create an empty table
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical symbol for `name`, interning it on first use.
    pub fn intern(&mut self, name: &str) -> Symbol {
        if let Some(existing) = self.names.get(name) {
            return existing.clone();
        }
        let symbol = Symbol(Rc::from(name));
        self.names.insert(symbol.clone());
        symbol
    }

    /// Looks a name up without interning it.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.names.get(name)
    }

    /// Number of distinct names interned so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether nothing has been interned yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_name_same_allocation() {
        let mut table = SymbolTable::new();
        let a = table.intern("alice");
        let b = table.intern("alice");
        assert!(Rc::ptr_eq(&a.0, &b.0));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_distinct_names() {
        let mut table = SymbolTable::new();
        let a = table.intern("alice");
        let b = table.intern("bob");
        assert_ne!(a, b);
        assert_eq!(table.get("bob"), Some(&b));
        assert!(table.get("carol").is_none());
    }
}
