//! Closure capture analysis.
//!
//! One context is pushed per lambda being bound. Every resolved variable
//! reference is reported to all active contexts; a variable is free in a
//! lambda when its declaring scope lies outside the lambda's own scope.

use crate::scope::{ScopeArena, ScopeId};
use crate::symbol::SymbolId;
use indexmap::IndexSet;

/// Whether a variable declared in `declaring` is free inside the lambda whose
/// scope is `boundary`.
pub fn is_free(scopes: &ScopeArena, declaring: ScopeId, boundary: ScopeId) -> bool {
    !scopes.is_within(declaring, boundary)
}

#[derive(Debug)]
struct LambdaContext {
    boundary: ScopeId,
    captures: IndexSet<SymbolId>,
}

/// Outcome of reporting one variable reference.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CaptureCheck {
    /// Not inside any lambda, or declared inside all of them.
    Local,
    /// Captured by at least one enclosing lambda.
    Captured,
    /// A mutable variable referenced from a lambda it is free in.
    MutableCapture,
}

#[derive(Debug, Default)]
pub struct CaptureTracker {
    stack: Vec<LambdaContext>,
}

impl CaptureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, boundary: ScopeId) {
        self.stack.push(LambdaContext {
            boundary,
            captures: IndexSet::new(),
        });
    }

    /// Pop the innermost context and hand back its captures in
    /// first-reference order.
    pub fn exit(&mut self) -> Vec<SymbolId> {
        self.stack
            .pop()
            .map(|ctx| ctx.captures.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Report a reference to `symbol`, declared in `declaring`.
    pub fn observe(&mut self, scopes: &ScopeArena, symbol: SymbolId, declaring: ScopeId, mutable: bool) -> CaptureCheck {
        let mut result = CaptureCheck::Local;
        for ctx in &mut self.stack {
            if !is_free(scopes, declaring, ctx.boundary) {
                continue;
            }
            if mutable {
                return CaptureCheck::MutableCapture;
            }
            ctx.captures.insert(symbol);
            result = CaptureCheck::Captured;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scope::ScopeKind;

    #[test]
    fn test_free_variable_is_captured_once() {
        let mut scopes = ScopeArena::new();
        let lambda = scopes.push(ScopeId::ROOT, ScopeKind::Lambda);
        let mut tracker = CaptureTracker::new();
        tracker.enter(lambda);
        assert_eq!(tracker.observe(&scopes, SymbolId(1), ScopeId::ROOT, false), CaptureCheck::Captured);
        assert_eq!(tracker.observe(&scopes, SymbolId(1), ScopeId::ROOT, false), CaptureCheck::Captured);
        assert_eq!(tracker.observe(&scopes, SymbolId(2), lambda, false), CaptureCheck::Local);
        assert_eq!(tracker.exit(), vec![SymbolId(1)]);
    }

    #[test]
    fn test_mutable_free_variable_is_rejected() {
        let mut scopes = ScopeArena::new();
        let lambda = scopes.push(ScopeId::ROOT, ScopeKind::Lambda);
        let mut tracker = CaptureTracker::new();
        tracker.enter(lambda);
        assert_eq!(
            tracker.observe(&scopes, SymbolId(0), ScopeId::ROOT, true),
            CaptureCheck::MutableCapture
        );
        assert!(tracker.exit().is_empty());
    }

    #[test]
    fn test_nested_lambdas_capture_independently() {
        let mut scopes = ScopeArena::new();
        let outer = scopes.push(ScopeId::ROOT, ScopeKind::Lambda);
        let inner = scopes.push(outer, ScopeKind::Lambda);
        let mut tracker = CaptureTracker::new();
        tracker.enter(outer);
        tracker.enter(inner);
        // Declared in the outer lambda: free only in the inner one.
        tracker.observe(&scopes, SymbolId(7), outer, false);
        assert_eq!(tracker.exit(), vec![SymbolId(7)]);
        assert!(tracker.exit().is_empty());
        assert!(is_free(&scopes, ScopeId::ROOT, inner));
        assert!(!is_free(&scopes, inner, outer));
    }
}
