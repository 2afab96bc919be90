//! weft_syntax: The syntax tree consumed by the binder.
//!
//! Trees are produced by the front end's parser (or synthesized with
//! [`TreeBuilder`]) and allocated in a [`weft_core::SyntaxArena`]. Every
//! node family is a closed enum, so consumers handle each node kind
//! exhaustively.

pub mod builder;
pub mod node;
pub mod types;

pub use builder::TreeBuilder;
pub use node::*;
pub use types::*;
