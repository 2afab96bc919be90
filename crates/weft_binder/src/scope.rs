//! Lexical scopes.
//!
//! Scopes live in an arena owned by one bind session and are addressed by
//! `ScopeId`. Each scope has separate tables for the variable and function
//! namespaces and a link to its parent.

use crate::symbol::SymbolId;
use rustc_hash::FxHashMap;
use weft_core::intern::InternedString;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub const ROOT: ScopeId = ScopeId(0);

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ScopeKind {
    Root,
    Block,
    Function,
    Lambda,
    MatchArm,
}

/// A scope in the binding phase. Scopes form a chain from inner to outer.
#[derive(Debug)]
pub struct Scope {
    pub kind: ScopeKind,
    pub parent: Option<ScopeId>,
    /// Distance from the root scope.
    pub depth: u32,
    variables: FxHashMap<InternedString, SymbolId>,
    functions: FxHashMap<InternedString, SymbolId>,
}

impl Scope {
    fn new(kind: ScopeKind, parent: Option<ScopeId>, depth: u32) -> Self {
        Self {
            kind,
            parent,
            depth,
            variables: FxHashMap::default(),
            functions: FxHashMap::default(),
        }
    }
}

/// Returned when a name is already declared in the same scope and namespace.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub existing: SymbolId,
}

#[derive(Debug)]
pub struct ScopeArena {
    scopes: Vec<Scope>,
}

impl ScopeArena {
    /// Create an arena holding only the root scope.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope::new(ScopeKind::Root, None, 0)],
        }
    }

    pub fn push(&mut self, parent: ScopeId, kind: ScopeKind) -> ScopeId {
        let depth = self.get(parent).map_or(0, |p| p.depth + 1);
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope::new(kind, Some(parent), depth));
        id
    }

    pub fn get(&self, id: ScopeId) -> Option<&Scope> {
        self.scopes.get(id.index())
    }

    pub fn len(&self) -> usize {
        self.scopes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scopes.is_empty()
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.get(id).and_then(|s| s.parent)
    }

    pub fn depth(&self, id: ScopeId) -> u32 {
        self.get(id).map_or(0, |s| s.depth)
    }

    pub fn declare_variable(&mut self, scope: ScopeId, name: InternedString, symbol: SymbolId) -> Result<SymbolId, Duplicate> {
        Self::declare(&mut self.scopes[scope.index()].variables, name, symbol)
    }

    pub fn declare_function(&mut self, scope: ScopeId, name: InternedString, symbol: SymbolId) -> Result<SymbolId, Duplicate> {
        Self::declare(&mut self.scopes[scope.index()].functions, name, symbol)
    }

    fn declare(
        table: &mut FxHashMap<InternedString, SymbolId>,
        name: InternedString,
        symbol: SymbolId,
    ) -> Result<SymbolId, Duplicate> {
        match table.get(&name) {
            Some(&existing) => Err(Duplicate { existing }),
            None => {
                table.insert(name, symbol);
                Ok(symbol)
            }
        }
    }

    /// Resolve a variable by walking from `scope` to the root.
    pub fn lookup_variable(&self, scope: ScopeId, name: InternedString) -> Option<SymbolId> {
        self.ancestors(scope).find_map(|s| s.variables.get(&name).copied())
    }

    pub fn lookup_function(&self, scope: ScopeId, name: InternedString) -> Option<SymbolId> {
        self.ancestors(scope).find_map(|s| s.functions.get(&name).copied())
    }

    /// Iterate from `scope` outward to the root, `scope` included.
    pub fn ancestors(&self, scope: ScopeId) -> impl Iterator<Item = &Scope> + '_ {
        let mut next = self.get(scope);
        std::iter::from_fn(move || {
            let current = next?;
            next = current.parent.and_then(|p| self.get(p));
            Some(current)
        })
    }

    /// True if `scope` is `ancestor` or nested anywhere inside it.
    pub fn is_within(&self, scope: ScopeId, ancestor: ScopeId) -> bool {
        let mut current = Some(scope);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }
}

impl Default for ScopeArena {
    fn default() -> Self {
        Self::new()
    }
}
