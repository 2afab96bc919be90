//! Match exhaustiveness and reachability.
//!
//! Runs over already-bound arms. Sum targets are a closed domain: the arms
//! must name every variant or end in a catch-all. `Bool` is closed over two
//! literals. Every other target is open and needs a catch-all.

use crate::bound::{BoundPattern, BoundPatternKind};
use crate::registry::{Registry, SumDefinition};
use crate::types::Type;
use indexmap::IndexSet;
use rustc_hash::FxHashSet;
use weft_core::text::TextRange;
use weft_syntax::LiteralValue;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MatchIssueKind {
    NonExhaustive,
    Unreachable,
    Duplicate,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct MatchIssue {
    pub kind: MatchIssueKind,
    pub range: TextRange,
}

/// Hashable identity of a literal pattern. Floats compare by bit pattern.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LiteralKey {
    Int(i64),
    Float(u64),
    Bool(bool),
    String(String),
    Unit,
}

impl From<&LiteralValue> for LiteralKey {
    fn from(value: &LiteralValue) -> Self {
        match value {
            LiteralValue::Int(v) => LiteralKey::Int(*v),
            LiteralValue::Float(v) => LiteralKey::Float(v.to_bits()),
            LiteralValue::Bool(v) => LiteralKey::Bool(*v),
            LiteralValue::String(v) => LiteralKey::String(v.clone()),
            LiteralValue::Unit => LiteralKey::Unit,
        }
    }
}

/// Check the arm patterns of one match against the scrutinee type.
/// `match_range` locates the non-exhaustive report.
pub fn check_match(target: &Type, patterns: &[&BoundPattern], registry: &Registry, match_range: TextRange) -> Vec<MatchIssue> {
    match target {
        Type::Error => Vec::new(),
        Type::Sum { name, .. } => match registry.sum(name) {
            Some(sum) => check_sum(patterns, sum, match_range),
            None => Vec::new(),
        },
        Type::Bool => check_literals(patterns, match_range, true),
        _ => check_literals(patterns, match_range, false),
    }
}

fn issue(kind: MatchIssueKind, range: TextRange) -> MatchIssue {
    MatchIssue { kind, range }
}

fn check_sum(patterns: &[&BoundPattern], sum: &SumDefinition, match_range: TextRange) -> Vec<MatchIssue> {
    let mut issues = Vec::new();
    let mut seen: IndexSet<&str> = IndexSet::new();
    let mut catch_all = false;

    for pattern in patterns {
        if catch_all {
            issues.push(issue(MatchIssueKind::Unreachable, pattern.range));
            continue;
        }
        match &pattern.kind {
            // Unknown variant, already reported by the pattern binder.
            BoundPatternKind::Variant { variant: None, .. } => {}
            BoundPatternKind::Variant {
                name, from_identifier, ..
            } => {
                if seen.contains(name.as_str()) {
                    if *from_identifier {
                        // A consumed variant written bare is read as a binding.
                        catch_all = true;
                    } else {
                        issues.push(issue(MatchIssueKind::Duplicate, pattern.range));
                    }
                } else {
                    seen.insert(name.as_str());
                }
            }
            // A bare name of a payload variant neither covers it nor catches
            // everything, unless the variant was already consumed.
            BoundPatternKind::Binding { name, .. } if sum.variants.contains_key(name.as_str()) => {
                if seen.contains(name.as_str()) {
                    catch_all = true;
                }
            }
            _ if pattern.is_irrefutable() => catch_all = true,
            _ => {}
        }
    }

    if !catch_all && seen.len() < sum.variants.len() {
        issues.push(issue(MatchIssueKind::NonExhaustive, match_range));
    }
    issues
}

fn check_literals(patterns: &[&BoundPattern], match_range: TextRange, is_bool: bool) -> Vec<MatchIssue> {
    let mut issues = Vec::new();
    let mut seen: FxHashSet<LiteralKey> = FxHashSet::default();
    let mut catch_all = false;

    for pattern in patterns {
        if catch_all {
            issues.push(issue(MatchIssueKind::Unreachable, pattern.range));
            continue;
        }
        match &pattern.kind {
            BoundPatternKind::Literal(value) => {
                if !seen.insert(LiteralKey::from(value)) {
                    issues.push(issue(MatchIssueKind::Duplicate, pattern.range));
                }
            }
            _ if pattern.is_irrefutable() => catch_all = true,
            _ => {}
        }
    }

    let covered = catch_all
        || (is_bool && seen.contains(&LiteralKey::Bool(true)) && seen.contains(&LiteralKey::Bool(false)));
    if !covered {
        issues.push(issue(MatchIssueKind::NonExhaustive, match_range));
    }
    issues
}
