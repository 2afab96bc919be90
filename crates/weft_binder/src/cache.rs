//! Bind results cached per syntax tree.

use crate::binder::{BindError, BindResult, Binder};
use rustc_hash::FxHashMap;
use std::sync::Arc;
use tracing::trace;
use weft_syntax::{SourceFile, TreeId};

/// Bind results keyed by tree identity. A tree is immutable once built, so
/// a result stays valid for as long as its tree id is in use.
#[derive(Debug, Default)]
pub struct BindCache {
    entries: FxHashMap<TreeId, Arc<BindResult>>,
}

impl BindCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tree: TreeId) -> Option<Arc<BindResult>> {
        self.entries.get(&tree).cloned()
    }

    pub fn insert(&mut self, tree: TreeId, result: Arc<BindResult>) {
        self.entries.insert(tree, result);
    }

    pub fn contains(&self, tree: TreeId) -> bool {
        self.entries.contains_key(&tree)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Binder {
    /// Bind `tree`, reusing an earlier result for the same tree when the
    /// options allow it.
    pub fn bind_cached(&mut self, tree: &SourceFile<'_>, cache: &mut BindCache) -> Result<Arc<BindResult>, BindError> {
        if self.options.use_cache {
            if let Some(hit) = cache.get(tree.id) {
                trace!(file = %tree.file_name, "bind cache hit");
                return Ok(hit);
            }
            trace!(file = %tree.file_name, "bind cache miss");
        }
        let result = Arc::new(self.bind(tree)?);
        if self.options.use_cache {
            cache.insert(tree.id, Arc::clone(&result));
        }
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use weft_core::arena::SyntaxArena;
    use weft_options::BinderOptions;
    use weft_syntax::TreeBuilder;

    #[test]
    fn test_second_bind_of_same_tree_hits_cache() {
        let arena = SyntaxArena::new();
        let b = TreeBuilder::new(&arena);
        let x = b.let_stmt("x", b.int(1));
        let tree = b.finish("main.weft", vec![x]);

        let mut binder = Binder::new(b.interner().clone());
        let mut cache = BindCache::new();
        let first = binder.bind_cached(&tree, &mut cache).unwrap();
        let second = binder.bind_cached(&tree, &mut cache).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert!(cache.contains(tree.id));
    }

    #[test]
    fn test_cache_disabled_rebinds() {
        let arena = SyntaxArena::new();
        let b = TreeBuilder::new(&arena);
        let x = b.let_stmt("x", b.int(1));
        let tree = b.finish("main.weft", vec![x]);

        let options = BinderOptions {
            use_cache: false,
            ..BinderOptions::default()
        };
        let mut binder = Binder::with_options(b.interner().clone(), options);
        let mut cache = BindCache::new();
        let first = binder.bind_cached(&tree, &mut cache).unwrap();
        let second = binder.bind_cached(&tree, &mut cache).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert!(cache.is_empty());
    }
}
