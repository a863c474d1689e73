//! Identifier interning.
//!
//! Source identifiers are interned once by whoever builds the AST. Every later
//! phase (scope lookup, qualified-name assembly, constant-pool interning)
//! works with [`Ident`] handles and resolves text only when it must write it.

use indexmap::IndexSet;

/// Handle to an interned identifier.
///
/// Ordered by insertion, not lexicographically.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct Ident(u32);

impl Ident {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Deduplicating identifier table.
#[derive(Debug, Clone, Default)]
pub struct Interner {
    names: IndexSet<Box<str>>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning the existing handle if it was seen before.
    pub fn intern(&mut self, text: &str) -> Ident {
        if let Some(index) = self.names.get_index_of(text) {
            return Ident(index as u32);
        }
        let (index, _) = self.names.insert_full(text.into());
        Ident(index as u32)
    }

    /// Look up `text` without interning it.
    pub fn get(&self, text: &str) -> Option<Ident> {
        self.names.get_index_of(text).map(|i| Ident(i as u32))
    }

    /// Resolve a handle back to its text.
    ///
    /// # Panics
    /// Panics if `ident` was produced by a different interner.
    #[inline]
    pub fn resolve(&self, ident: Ident) -> &str {
        self.try_resolve(ident)
            .unwrap_or_else(|| panic!("identifier {} not owned by this interner", ident.0))
    }

    #[inline]
    pub fn try_resolve(&self, ident: Ident) -> Option<&str> {
        self.names.get_index(ident.index()).map(|s| &**s)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Ident, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(i, s)| (Ident(i as u32), &**s))
    }
}
