//! weft_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! Every semantic error the front end reports is built from a
//! `DiagnosticMessage` template carrying a stable code. The rendered message
//! text is part of the observable contract: hosts and conformance tests match
//! on substrings of it, so templates must not be reworded casually.

use std::fmt;
use weft_core::text::{LineAndColumn, LineMap, TextRange, TextSpan};

/// Diagnostic severity. Only `Error` is produced today; `Warning` is kept for
/// annotation-driven checks that live outside the binder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticCategory {
    Warning,
    Error,
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiagnosticCategory::Warning => write!(f, "warning"),
            DiagnosticCategory::Error => write!(f, "error"),
        }
    }
}

/// A diagnostic message template with a code and category.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// Stable numeric code, rendered as `W<code>`.
    pub code: u32,
    pub category: DiagnosticCategory,
    /// Template text; `{0}`, `{1}`, ... are replaced by arguments.
    pub message: &'static str,
}

/// A realized diagnostic with location information and resolved message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub file: Option<String>,
    pub span: Option<TextSpan>,
    /// 1-based line and column of `span.start`.
    pub position: Option<LineAndColumn>,
    pub message_text: String,
    pub code: u32,
    pub category: DiagnosticCategory,
}

impl Diagnostic {
    /// A diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            file: None,
            span: None,
            position: None,
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    /// A diagnostic anchored at `range` in `file`, with the line and column
    /// resolved through `line_map`.
    pub fn with_location(
        file: &str,
        line_map: &LineMap,
        range: TextRange,
        message: &DiagnosticMessage,
        args: &[&str],
    ) -> Self {
        Self {
            file: Some(file.to_string()),
            span: Some(range.to_span()),
            position: Some(line_map.line_and_column_of(range.pos)),
            message_text: format_message(message.message, args),
            code: message.code,
            category: message.category,
        }
    }

    pub fn is_error(&self) -> bool {
        self.category == DiagnosticCategory::Error
    }

    pub fn line(&self) -> Option<u32> {
        self.position.map(|p| p.line)
    }

    pub fn column(&self) -> Option<u32> {
        self.position.map(|p| p.column)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref file) = self.file {
            write!(f, "{}", file)?;
            if let Some(position) = self.position {
                write!(f, ":{}", position)?;
            }
            write!(f, ": ")?;
        }
        write!(f, "{} W{}: {}", self.category, self.code, self.message_text)
    }
}

/// Replace `{0}`, `{1}`, etc. in `template` with `args`.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// An append-only, ordered collection of diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiagnosticCollection {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollection {
    pub fn new() -> Self {
        Self {
            diagnostics: Vec::new(),
        }
    }

    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_error)
    }

    pub fn error_count(&self) -> usize {
        self.diagnostics.iter().filter(|d| d.is_error()).count()
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn extend(&mut self, other: DiagnosticCollection) {
        self.diagnostics.extend(other.diagnostics);
    }

    /// Keep only the first `max` diagnostics.
    pub fn truncate(&mut self, max: usize) {
        self.diagnostics.truncate(max);
    }

    /// Sort by file, then position. The sort is stable, so diagnostics at the
    /// same position keep their report order.
    pub fn sort(&mut self) {
        self.diagnostics.sort_by(|a, b| {
            a.file
                .cmp(&b.file)
                .then_with(|| {
                    let a_pos = a.span.map(|s| s.start).unwrap_or(0);
                    let b_pos = b.span.map(|s| s.start).unwrap_or(0);
                    a_pos.cmp(&b_pos)
                })
        });
    }
}

impl<'c> IntoIterator for &'c DiagnosticCollection {
    type Item = &'c Diagnostic;
    type IntoIter = std::slice::Iter<'c, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.diagnostics.iter()
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, Error, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Error, message: $msg }
        };
        ($code:expr, Warning, $msg:expr) => {
            DiagnosticMessage { code: $code, category: DiagnosticCategory::Warning, message: $msg }
        };
    }

    // ========================================================================
    // Declarations and name resolution (1000-1099)
    // ========================================================================
    pub const _0_IS_ALREADY_DECLARED: DiagnosticMessage = diag!(1001, Error, "'{0}' is already declared in this scope.");
    pub const VARIANT_0_IS_ALREADY_DECLARED_BY_TYPE_1: DiagnosticMessage = diag!(1002, Error, "Variant '{0}' is already declared by type '{1}'.");
    pub const _0_DECLARATIONS_ONLY_AT_TOP_LEVEL: DiagnosticMessage = diag!(1003, Error, "{0} declarations are only allowed at the top level.");
    pub const UNDEFINED_VARIABLE_0: DiagnosticMessage = diag!(1004, Error, "Undefined variable '{0}'.");
    pub const UNDEFINED_FUNCTION_0: DiagnosticMessage = diag!(1005, Error, "Undefined function '{0}'.");
    pub const UNDEFINED_TYPE_0: DiagnosticMessage = diag!(1006, Error, "Undefined type '{0}'.");
    pub const CANNOT_ASSIGN_TO_IMMUTABLE_VARIABLE_0: DiagnosticMessage = diag!(1007, Error, "Cannot assign to immutable variable '{0}'.");
    pub const RETURN_OUTSIDE_FUNCTION: DiagnosticMessage = diag!(1008, Error, "'return' can only be used inside a function.");
    pub const _0_OUTSIDE_LOOP: DiagnosticMessage = diag!(1009, Error, "'{0}' can only be used inside a loop.");

    // ========================================================================
    // Expressions and types (2000-2099)
    // ========================================================================
    pub const CANNOT_ASSIGN_TYPE_0_TO_VARIABLE_OF_TYPE_1: DiagnosticMessage = diag!(2001, Error, "Cannot assign expression of type '{0}' to variable of type '{1}'.");
    pub const OPERATOR_0_NOT_DEFINED_FOR_TYPES_1_AND_2: DiagnosticMessage = diag!(2002, Error, "Operator '{0}' is not defined for types '{1}' and '{2}'.");
    pub const OPERATOR_0_NOT_DEFINED_FOR_TYPE_1: DiagnosticMessage = diag!(2003, Error, "Operator '{0}' is not defined for type '{1}'.");
    pub const CONDITION_MUST_BE_BOOL_GOT_0: DiagnosticMessage = diag!(2004, Error, "Condition must be of type 'Bool' but got '{0}'.");
    pub const BRANCH_TYPES_0_AND_1_DIFFER: DiagnosticMessage = diag!(2005, Error, "If branches have incompatible types '{0}' and '{1}'.");
    pub const FUNCTION_0_HAS_INCONSISTENT_RETURN_TYPES: DiagnosticMessage = diag!(2006, Error, "Function '{0}' has inconsistent return types.");
    pub const FUNCTION_0_RETURNS_1_BUT_DECLARES_2: DiagnosticMessage = diag!(2007, Error, "Function '{0}' returns '{1}' but is declared to return '{2}'.");
    pub const _0_EXPECTS_1_ARGUMENTS_GOT_2: DiagnosticMessage = diag!(2008, Error, "'{0}' expects {1} argument(s) but was given {2}.");
    pub const ARGUMENT_0_OF_1_EXPECTS_2_GOT_3: DiagnosticMessage = diag!(2009, Error, "Argument {0} of '{1}' expects type '{2}' but got '{3}'.");
    pub const TYPE_0_IS_NOT_CALLABLE: DiagnosticMessage = diag!(2010, Error, "Expression of type '{0}' is not callable.");
    pub const NO_OVERLOAD_OF_0_ACCEPTS_1: DiagnosticMessage = diag!(2011, Error, "No overload of '{0}' accepts arguments of type(s) '{1}'.");
    pub const _0_EXPECTS_1_TYPE_ARGUMENTS_GOT_2: DiagnosticMessage = diag!(2012, Error, "'{0}' expects {1} type argument(s) but was given {2}.");
    pub const TYPE_0_IS_NOT_A_RECORD: DiagnosticMessage = diag!(2013, Error, "Type '{0}' is not a record type.");
    pub const FIELD_0_IS_ALREADY_INITIALIZED: DiagnosticMessage = diag!(2014, Error, "Field '{0}' is already initialized.");
    pub const TYPE_0_HAS_NO_FIELD_1: DiagnosticMessage = diag!(2015, Error, "Type '{0}' has no field '{1}'.");
    pub const RECORD_0_IS_MISSING_REQUIRED_FIELD_1: DiagnosticMessage = diag!(2016, Error, "Record literal of type '{0}' is missing required field '{1}'.");
    pub const FIELD_0_EXPECTS_1_GOT_2: DiagnosticMessage = diag!(2017, Error, "Field '{0}' expects type '{1}' but got '{2}'.");
    pub const VARIANT_0_TAKES_NO_PAYLOAD: DiagnosticMessage = diag!(2018, Error, "Variant '{0}' does not take a payload.");
    pub const VARIANT_0_REQUIRES_PAYLOAD_1: DiagnosticMessage = diag!(2019, Error, "Variant '{0}' requires a payload of type '{1}'.");
    pub const VARIANT_0_EXPECTS_PAYLOAD_1_GOT_2: DiagnosticMessage = diag!(2020, Error, "Variant '{0}' expects a payload of type '{1}' but got '{2}'.");
    pub const ELEMENT_TYPE_0_EXPECTED_1: DiagnosticMessage = diag!(2021, Error, "Element has type '{0}' but expected '{1}'.");
    pub const CANNOT_INFER_EMPTY_0_LITERAL: DiagnosticMessage = diag!(2022, Error, "Cannot infer the element type of an empty {0} literal.");
    pub const TYPE_0_CANNOT_BE_INDEXED_BY_1: DiagnosticMessage = diag!(2023, Error, "Type '{0}' cannot be indexed by '{1}'.");
    pub const TYPE_0_IS_NOT_ITERABLE: DiagnosticMessage = diag!(2024, Error, "Type '{0}' is not iterable.");
    pub const MAP_KEY_MUST_BE_STRING_GOT_0: DiagnosticMessage = diag!(2025, Error, "Map keys must be of type 'String' but got '{0}'.");

    // ========================================================================
    // Patterns and match expressions (3000-3099)
    // ========================================================================
    pub const NON_EXHAUSTIVE_MATCH: DiagnosticMessage = diag!(3001, Error, "Non-exhaustive match expression.");
    pub const UNREACHABLE_MATCH_ARM: DiagnosticMessage = diag!(3002, Error, "Unreachable match arm.");
    pub const DUPLICATE_MATCH_ARM: DiagnosticMessage = diag!(3003, Error, "Duplicate match arm.");
    pub const MATCH_ARM_TYPE_0_EXPECTED_1: DiagnosticMessage = diag!(3004, Error, "Match arm has type '{0}' but previous arms have type '{1}'.");
    pub const PATTERN_OF_TYPE_0_CANNOT_MATCH_1: DiagnosticMessage = diag!(3005, Error, "Pattern of type '{0}' cannot match a value of type '{1}'.");
    pub const TUPLE_PATTERN_HAS_0_ELEMENTS_TYPE_HAS_1: DiagnosticMessage = diag!(3006, Error, "Tuple pattern has {0} element(s) but the matched type has {1}.");
    pub const TYPE_0_HAS_NO_VARIANT_1: DiagnosticMessage = diag!(3007, Error, "Type '{0}' has no variant '{1}'.");

    // ========================================================================
    // Closures and concurrency (4000-4099)
    // ========================================================================
    pub const CANNOT_CAPTURE_MUTABLE_VARIABLE_0: DiagnosticMessage = diag!(4001, Error, "Cannot capture mutable variable '{0}' in lambda.");
    pub const SPAWN_OUTSIDE_SCOPE: DiagnosticMessage = diag!(4002, Error, "'spawn' can only be used inside a 'scope' block.");
}
