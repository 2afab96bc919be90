//! Symbol and symbol table definitions.

use crate::scope::ScopeId;
use crate::types::Type;

/// Index of a symbol in its `SymbolTable`.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct SymbolId(pub u32);

impl SymbolId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSymbol {
    pub name: String,
    pub ty: Type,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionSymbol {
    pub name: String,
    pub parameters: Vec<ParameterSymbol>,
    /// Generic parameter names; empty for non-generic functions.
    pub type_parameters: Vec<String>,
    pub return_type: Type,
    pub is_builtin: bool,
    /// Set once the return type is final. Unannotated signatures start out
    /// provisional with a `Unit` return type.
    pub is_final: bool,
}

impl FunctionSymbol {
    pub fn is_generic(&self) -> bool {
        !self.type_parameters.is_empty()
    }

    /// The function viewed as a value.
    pub fn as_type(&self) -> Type {
        Type::function(
            self.parameters.iter().map(|p| p.ty.clone()).collect(),
            self.return_type.clone(),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SymbolKind {
    Variable { mutable: bool },
    Parameter,
    Function(FunctionSymbol),
    Field { record: String },
    Variant { sum: String, payload: Option<Type> },
}

/// A resolved declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct Symbol {
    pub id: SymbolId,
    pub name: String,
    pub kind: SymbolKind,
    pub ty: Type,
    /// Scope the symbol was declared in. `None` for fields and variants,
    /// which live in the declaration registries instead of a scope.
    pub scope: Option<ScopeId>,
    /// Depth of the declaring scope.
    pub depth: u32,
}

impl Symbol {
    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, SymbolKind::Variable { mutable: true })
    }

    pub fn as_function(&self) -> Option<&FunctionSymbol> {
        match &self.kind {
            SymbolKind::Function(f) => Some(f),
            _ => None,
        }
    }
}

/// Arena of every symbol created during one bind.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self { symbols: Vec::new() }
    }

    /// Store a symbol, assigning its id.
    pub fn add(&mut self, name: impl Into<String>, kind: SymbolKind, ty: Type, scope: Option<ScopeId>, depth: u32) -> SymbolId {
        let id = SymbolId(self.symbols.len() as u32);
        self.symbols.push(Symbol {
            id,
            name: name.into(),
            kind,
            ty,
            scope,
            depth,
        });
        id
    }

    pub fn get(&self, id: SymbolId) -> Option<&Symbol> {
        self.symbols.get(id.index())
    }

    /// Swap in the final version of a function symbol.
    pub(crate) fn replace_function(&mut self, id: SymbolId, function: FunctionSymbol) -> Option<()> {
        let symbol = self.symbols.get_mut(id.index())?;
        symbol.ty = function.as_type();
        symbol.kind = SymbolKind::Function(function);
        Some(())
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_function_symbol_type() {
        let f = FunctionSymbol {
            name: "add".into(),
            parameters: vec![
                ParameterSymbol { name: "a".into(), ty: Type::Int },
                ParameterSymbol { name: "b".into(), ty: Type::Int },
            ],
            type_parameters: vec![],
            return_type: Type::Int,
            is_builtin: false,
            is_final: true,
        };
        assert_eq!(f.as_type().to_string(), "fn(Int, Int) -> Int");
        assert!(!f.is_generic());
    }

    #[test]
    fn test_replace_function_updates_type() {
        let mut table = SymbolTable::new();
        let provisional = FunctionSymbol {
            name: "f".into(),
            parameters: vec![],
            type_parameters: vec![],
            return_type: Type::Unit,
            is_builtin: false,
            is_final: false,
        };
        let id = table.add("f", SymbolKind::Function(provisional.clone()), provisional.as_type(), None, 0);
        let finished = FunctionSymbol {
            return_type: Type::Int,
            is_final: true,
            ..provisional
        };
        table.replace_function(id, finished).unwrap();
        let symbol = table.get(id).unwrap();
        assert_eq!(symbol.ty, Type::function(vec![], Type::Int));
        assert!(symbol.as_function().unwrap().is_final);
    }
}
