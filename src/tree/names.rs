//! Name interning
//!
//! Element and attribute names repeat heavily in merged game configuration
//! (thousands of `widget` nodes, a few dozen distinct names). The table
//! deduplicates them into shared `Arc<str>` handles and is reused across
//! every file loaded through one merger.

use std::sync::Arc;

use indexmap::IndexSet;

/// Interning table for element and attribute names.
#[derive(Debug, Clone, Default)]
pub struct NameTable {
    names: IndexSet<Arc<str>>,
}

impl NameTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Interns a name, returning a shared handle. Repeated calls with the
    /// same string return clones of the same allocation.
    pub fn intern(&mut self, name: &str) -> Arc<str> {
        if let Some(existing) = self.names.get(name) {
            return Arc::clone(existing);
        }
        let interned: Arc<str> = Arc::from(name);
        self.names.insert(Arc::clone(&interned));
        interned
    }

    /// Number of distinct names interned.
    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Whether the table is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_deduplicates() {
        let mut table = NameTable::new();
        let a = table.intern("widget");
        let b = table.intern("widgets");
        let c = table.intern("widget");

        assert_eq!(table.len(), 2);
        assert!(Arc::ptr_eq(&a, &c));
        assert_ne!(&*a, &*b);
    }
}
