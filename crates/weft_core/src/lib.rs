//! weft_core: Core utilities shared by every weft compiler crate.
//!
//! Provides string interning, source positions and line maps, and the bump
//! arena that syntax trees are allocated from.

pub mod arena;
pub mod intern;
pub mod text;

pub use arena::SyntaxArena;
pub use intern::{InternedString, StringInterner};
pub use text::{LineAndColumn, LineMap, TextRange, TextSpan};
