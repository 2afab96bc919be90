//! The bound tree.
//!
//! Every bound expression carries its authoritative type. Bound nodes refer
//! to declarations by `SymbolId`, never by name.

use crate::symbol::{SymbolId, SymbolTable};
use crate::types::Type;
use weft_core::text::TextRange;
use weft_syntax::{BinaryOperator, LiteralValue, UnaryOperator};

/// Output of one bind: the bound declarations and statements plus the
/// symbols they reference. Immutable once `bind` returns.
#[derive(Debug, Default)]
pub struct BoundProgram {
    pub records: Vec<BoundRecordDeclaration>,
    pub sums: Vec<BoundSumDeclaration>,
    pub functions: Vec<BoundFunctionDeclaration>,
    pub statements: Vec<BoundStatement>,
    pub symbols: SymbolTable,
}

impl BoundProgram {
    /// Find the bound function declaration for a top-level function name.
    pub fn function(&self, name: &str) -> Option<&BoundFunctionDeclaration> {
        self.functions
            .iter()
            .find(|f| self.symbols.get(f.symbol).is_some_and(|s| s.name == name))
    }
}

#[derive(Debug)]
pub struct BoundRecordDeclaration {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub fields: Vec<SymbolId>,
    pub range: TextRange,
}

#[derive(Debug)]
pub struct BoundSumDeclaration {
    pub name: String,
    pub type_parameters: Vec<String>,
    pub variants: Vec<SymbolId>,
    pub range: TextRange,
}

#[derive(Debug)]
pub struct BoundFunctionDeclaration {
    pub symbol: SymbolId,
    pub parameters: Vec<SymbolId>,
    pub body: BoundBlock,
    pub range: TextRange,
}

#[derive(Debug)]
pub struct BoundBlock {
    pub statements: Vec<BoundStatement>,
    /// Type of the trailing expression statement, else `Unit`.
    pub ty: Type,
    /// Set when the block unconditionally leaves via `return`, `break` or
    /// `continue`.
    pub diverges: bool,
    pub range: TextRange,
}

impl BoundBlock {
    /// The trailing expression statement, if the block ends with one.
    pub fn trailing_expression(&self) -> Option<&BoundExpression> {
        match self.statements.last().map(|s| &s.kind) {
            Some(BoundStatementKind::Expression(e)) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct BoundStatement {
    pub kind: BoundStatementKind,
    pub range: TextRange,
}

#[derive(Debug)]
pub enum BoundStatementKind {
    Let { symbol: SymbolId, initializer: BoundExpression },
    Assignment { symbol: Option<SymbolId>, value: BoundExpression },
    Expression(BoundExpression),
    Print(BoundExpression),
    Return(Option<BoundExpression>),
    Block(BoundBlock),
    While { condition: BoundExpression, body: BoundBlock },
    For { binding: SymbolId, iterable: BoundExpression, body: BoundBlock },
    Break,
    Continue,
}

impl BoundStatement {
    pub fn diverges(&self) -> bool {
        match &self.kind {
            BoundStatementKind::Return(_) | BoundStatementKind::Break | BoundStatementKind::Continue => true,
            BoundStatementKind::Block(block) => block.diverges,
            BoundStatementKind::Expression(e) => e.diverges(),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct BoundExpression {
    pub kind: BoundExpressionKind,
    pub ty: Type,
    pub range: TextRange,
}

#[derive(Debug)]
pub enum BoundExpressionKind {
    Literal(LiteralValue),
    Variable(SymbolId),
    /// A named function used as a value.
    FunctionRef(SymbolId),
    Binary {
        operator: BinaryOperator,
        left: Box<BoundExpression>,
        right: Box<BoundExpression>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<BoundExpression>,
    },
    /// Direct call of a declared or builtin function.
    Call {
        function: SymbolId,
        type_arguments: Vec<Type>,
        arguments: Vec<BoundExpression>,
    },
    /// Call through a value of function type.
    CallValue {
        callee: Box<BoundExpression>,
        arguments: Vec<BoundExpression>,
    },
    Variant {
        variant: SymbolId,
        payload: Option<Box<BoundExpression>>,
    },
    Lambda(BoundLambda),
    Record {
        fields: Vec<(SymbolId, BoundExpression)>,
    },
    FieldAccess {
        target: Box<BoundExpression>,
        field: Option<SymbolId>,
    },
    Tuple(Vec<BoundExpression>),
    List(Vec<BoundExpression>),
    Map(Vec<(BoundExpression, BoundExpression)>),
    Index {
        target: Box<BoundExpression>,
        index: Box<BoundExpression>,
    },
    If {
        condition: Box<BoundExpression>,
        then_branch: BoundBlock,
        else_branch: Option<Box<BoundExpression>>,
    },
    Block(BoundBlock),
    Match {
        scrutinee: Box<BoundExpression>,
        arms: Vec<BoundMatchArm>,
    },
    Spawn(BoundBlock),
    Scope(BoundBlock),
    Channel {
        element: Type,
    },
    Par(Box<BoundExpression>),
    /// Placeholder for an expression that failed to resolve.
    Error,
}

impl BoundExpression {
    pub fn new(kind: BoundExpressionKind, ty: Type, range: TextRange) -> Self {
        Self { kind, ty, range }
    }

    pub fn error(range: TextRange) -> Self {
        Self::new(BoundExpressionKind::Error, Type::Error, range)
    }

    /// Whether evaluating the expression always leaves the enclosing body.
    pub fn diverges(&self) -> bool {
        match &self.kind {
            BoundExpressionKind::Block(block) => block.diverges,
            BoundExpressionKind::If {
                then_branch,
                else_branch: Some(else_branch),
                ..
            } => then_branch.diverges && else_branch.diverges(),
            _ => false,
        }
    }
}

#[derive(Debug)]
pub struct BoundLambda {
    pub parameters: Vec<SymbolId>,
    pub return_type: Type,
    pub body: Box<BoundExpression>,
    /// Immutable variables from enclosing scopes, in first-reference order.
    pub captures: Vec<SymbolId>,
}

#[derive(Debug)]
pub struct BoundMatchArm {
    pub pattern: BoundPattern,
    pub body: BoundExpression,
    pub range: TextRange,
}

#[derive(Debug)]
pub struct BoundPattern {
    pub kind: BoundPatternKind,
    pub ty: Type,
    pub range: TextRange,
}

#[derive(Debug)]
pub enum BoundPatternKind {
    Literal(LiteralValue),
    Wildcard,
    Binding {
        symbol: SymbolId,
        name: String,
    },
    Tuple(Vec<BoundPattern>),
    Variant {
        name: String,
        variant: Option<SymbolId>,
        payload: Option<Box<BoundPattern>>,
        /// Written as a bare identifier that named a payload-less variant.
        from_identifier: bool,
    },
}

impl BoundPattern {
    /// Matches every value of its type.
    pub fn is_irrefutable(&self) -> bool {
        match &self.kind {
            BoundPatternKind::Wildcard | BoundPatternKind::Binding { .. } => true,
            BoundPatternKind::Tuple(elements) => elements.iter().all(BoundPattern::is_irrefutable),
            _ => false,
        }
    }
}
