//! Per-depth memo of interned object keys.
//!
//! Keys rarely repeat inside one object but often repeat across sibling
//! objects at the same depth (arrays of records). The cache therefore stays
//! out of the way the first time a depth is seen and starts memoizing from
//! the second visit on.

use std::collections::HashMap;

use crate::factory::ValueFactory;

/// Key → symbol dictionaries indexed by nesting depth, borrowing key text
/// from the document for its whole lifetime `'doc`.
#[derive(Debug)]
pub struct SymbolCache<'doc, S> {
    levels: Vec<HashMap<&'doc str, S>>,
}

impl<S> Default for SymbolCache<'_, S> {
    fn default() -> Self {
        Self { levels: Vec::new() }
    }
}

impl<'doc, S: Clone> SymbolCache<'doc, S> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn grow_to(&mut self, depth: usize) {
        if self.levels.len() <= depth {
            self.levels.resize_with(depth + 1, HashMap::new);
        }
    }

    /// `false` the first time `depth` (or any deeper level) is observed,
    /// `true` afterwards.
    ///
    /// The table grows to `depth + 1` levels, so every shallower depth counts
    /// as visited from then on too.
    pub fn has_been_visited(&mut self, depth: usize) -> bool {
        if self.levels.len() <= depth {
            self.grow_to(depth);
            false
        } else {
            true
        }
    }

    /// The symbol for `key` at `depth`, interning through `sink` on a miss.
    pub fn intern<F>(&mut self, depth: usize, sink: &mut F, key: &'doc str) -> S
    where
        F: ValueFactory<Symbol = S> + ?Sized,
    {
        self.grow_to(depth);
        self.levels[depth]
            .entry(key)
            .or_insert_with(|| sink.intern(key))
            .clone()
    }
}
