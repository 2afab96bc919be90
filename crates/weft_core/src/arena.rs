//! Arena allocation for syntax trees.
//!
//! Syntax nodes reference their children through `&'a` borrows into a bump
//! arena, so a whole tree is released at once when the arena is dropped.

use bumpalo::Bump;

pub struct SyntaxArena {
    bump: Bump,
}

impl SyntaxArena {
    pub fn new() -> Self {
        Self { bump: Bump::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            bump: Bump::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn bump(&self) -> &Bump {
        &self.bump
    }

    #[inline]
    pub fn alloc<T>(&self, val: T) -> &T {
        self.bump.alloc(val)
    }

    /// Move the items of `items` into a contiguous arena slice.
    #[inline]
    pub fn alloc_vec<T>(&self, items: Vec<T>) -> &[T] {
        self.bump.alloc_slice_fill_iter(items)
    }

    pub fn allocated_bytes(&self) -> usize {
        self.bump.allocated_bytes()
    }
}

impl Default for SyntaxArena {
    fn default() -> Self {
        Self::new()
    }
}
