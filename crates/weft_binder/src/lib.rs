//! weft_binder: Name resolution and type checking.
//!
//! The binder walks a syntax tree and produces a [`BoundProgram`]: every
//! name resolved to a symbol, every expression annotated with its type,
//! and every lambda annotated with the variables it captures. User errors
//! are reported as diagnostics and never stop the walk; a [`BindError`]
//! means the binder itself reached an impossible state.

mod binder;
pub mod bound;
pub mod builtins;
mod cache;
pub mod captures;
pub mod exhaustiveness;
mod expressions;
mod patterns;
pub mod registry;
pub mod scope;
mod statements;
pub mod symbol;
pub mod types;

pub use binder::{bind, BindError, BindResult, Binder};
pub use bound::*;
pub use cache::BindCache;
pub use registry::Registry;
pub use scope::{ScopeArena, ScopeId, ScopeKind};
pub use symbol::{FunctionSymbol, ParameterSymbol, Symbol, SymbolId, SymbolKind, SymbolTable};
pub use types::{Substitution, Type};
