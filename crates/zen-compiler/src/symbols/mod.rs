//! Scopes and symbols.
//!
//! The generator never computes scopes itself. A definition pass
//! ([`define_symbols`]) records every scope-introducing node in
//! [`ScopeAnnotations`], and the generator walks the same tree, activating the
//! annotated scope on entry and invalidating it on exit.
//!
//! Scopes and symbols live in arenas; `enclosing` links are plain ids.

mod define;
mod error;

#[cfg(test)]
mod symbols_tests;

pub use define::{Resolution, define_symbols};
pub use error::{ResolveError, ScopeError};

use std::collections::HashMap;
use std::fmt;

use indexmap::IndexMap;
use zen_core::{Ident, Interner};

use crate::ast::{NodeId, QualifiedName};

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct ScopeId(u32);

impl ScopeId {
    #[inline]
    pub fn as_u32(self) -> u32 {
        self.0
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SymbolId(u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ScopeKind {
    CompilationUnit,
    Class,
    Function,
    Enumeration,
    Local,
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ScopeKind::CompilationUnit => "compilation unit",
            ScopeKind::Class => "class",
            ScopeKind::Function => "function",
            ScopeKind::Enumeration => "enumeration",
            ScopeKind::Local => "local",
        })
    }
}

#[derive(Clone, Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub enclosing: Option<ScopeId>,
    /// The class, enumeration or function symbol that opened this scope.
    pub owner: Option<SymbolId>,
    pub symbols: IndexMap<Ident, SymbolId>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    /// `qualified_name` is the binary name, `/`-separated.
    Class { qualified_name: String },
    Function { fixed_parameters: usize, variadic: bool },
    Variable,
    Constant,
    Enumeration { qualified_name: String },
    Enumerate { ordinal: u32 },
}

impl SymbolKind {
    /// Binary name of a class or enumeration.
    pub fn qualified_name(&self) -> Option<&str> {
        match self {
            SymbolKind::Class { qualified_name } | SymbolKind::Enumeration { qualified_name } => {
                Some(qualified_name)
            }
            _ => None,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Symbol {
    pub name: Ident,
    pub kind: SymbolKind,
    pub enclosing_scope: ScopeId,
    /// Scope opened by this symbol, if it opens one.
    pub defined_scope: Option<ScopeId>,
}

/// Scope-introducing node → its scope.
#[derive(Clone, Debug, Default)]
pub struct ScopeAnnotations {
    scopes: HashMap<NodeId, ScopeId>,
}

impl ScopeAnnotations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotate(&mut self, node: NodeId, scope: ScopeId) {
        self.scopes.insert(node, scope);
    }

    pub fn get_scope(&self, node: NodeId) -> Option<ScopeId> {
        self.scopes.get(&node).copied()
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }
}

#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    scopes: Vec<Scope>,
    symbols: Vec<Symbol>,
    /// Active scopes, innermost last.
    cursor: Vec<ScopeId>,
    activations: usize,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_scope(&mut self, kind: ScopeKind, enclosing: Option<ScopeId>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            kind,
            enclosing,
            owner: None,
            symbols: IndexMap::new(),
        });
        id
    }

    /// Define `name` in `scope`. `None` if the scope already holds it.
    pub fn define(&mut self, scope: ScopeId, name: Ident, kind: SymbolKind) -> Option<SymbolId> {
        if self.scopes[scope.index()].symbols.contains_key(&name) {
            return None;
        }
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            name,
            kind,
            enclosing_scope: scope,
            defined_scope: None,
        });
        self.scopes[scope.index()].symbols.insert(name, id);
        Some(id)
    }

    /// Link a symbol to the scope it opens.
    pub fn attach_scope(&mut self, symbol: SymbolId, scope: ScopeId) {
        self.symbols[symbol.index()].defined_scope = Some(scope);
        self.scopes[scope.index()].owner = Some(symbol);
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    pub fn symbols(&self) -> impl Iterator<Item = (SymbolId, &Symbol)> {
        self.symbols
            .iter()
            .enumerate()
            .map(|(i, s)| (SymbolId(i as u32), s))
    }

    /// Activate `scope`. It must be nested directly in the current scope,
    /// or be a root scope when nothing is active.
    pub fn set_current_scope(&mut self, scope: ScopeId) -> Result<(), ScopeError> {
        if self.scopes[scope.index()].enclosing != self.current_scope() {
            return Err(ScopeError::NotNested {
                scope: scope.as_u32(),
            });
        }
        self.cursor.push(scope);
        self.activations += 1;
        Ok(())
    }

    /// Leave the current scope, returning to its enclosing one.
    pub fn invalidate_current_scope(&mut self) -> Result<ScopeId, ScopeError> {
        self.cursor.pop().ok_or(ScopeError::NoCurrentScope)
    }

    pub fn current_scope(&self) -> Option<ScopeId> {
        self.cursor.last().copied()
    }

    /// Number of active scopes.
    pub fn depth(&self) -> usize {
        self.cursor.len()
    }

    /// Total `set_current_scope` calls so far.
    pub fn activations(&self) -> usize {
        self.activations
    }

    /// Innermost scope of `kind` enclosing `scope`, `scope` included.
    pub fn enclosing_of_kind(&self, scope: ScopeId, kind: ScopeKind) -> Option<ScopeId> {
        self.chain(scope).find(|&s| self.scope(s).kind == kind)
    }

    /// `scope` and all its enclosing scopes, innermost first.
    pub fn chain(&self, scope: ScopeId) -> impl Iterator<Item = ScopeId> + '_ {
        std::iter::successors(Some(scope), |&s| self.scope(s).enclosing)
    }

    /// Look `name` up in `scope` and then outwards.
    pub fn resolve(&self, scope: ScopeId, name: Ident) -> Option<SymbolId> {
        self.chain(scope)
            .find_map(|s| self.scope(s).symbols.get(&name).copied())
    }

    /// Resolve a dotted name: the first segment lexically, the rest as
    /// members of the scope the previous segment opened. Falls back to a
    /// class or enumeration whose binary name matches the full path.
    pub fn resolve_qualified_symbol(
        &self,
        scope: ScopeId,
        name: &QualifiedName,
        interner: &Interner,
    ) -> Option<SymbolId> {
        let (first, rest) = name.parts.split_first()?;
        let lexical = self.resolve(scope, *first).and_then(|start| {
            rest.iter().try_fold(start, |symbol, part| {
                let inner = self.symbol(symbol).defined_scope?;
                self.scope(inner).symbols.get(part).copied()
            })
        });
        if lexical.is_some() || rest.is_empty() {
            return lexical;
        }
        let binary = binary_name(name.parts.iter().map(|&p| interner.resolve(p)));
        self.symbols()
            .find(|(_, s)| s.kind.qualified_name() == Some(binary.as_str()))
            .map(|(id, _)| id)
    }
}

/// Join segments with `/`.
pub fn binary_name<'a>(parts: impl IntoIterator<Item = &'a str>) -> String {
    parts.into_iter().collect::<Vec<_>>().join("/")
}
