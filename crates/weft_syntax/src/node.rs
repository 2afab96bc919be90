//! Syntax node definitions.
//!
//! Nodes reference child nodes via arena-allocated borrows. Each node family
//! (statements, expressions, patterns, type annotations) is a closed enum.

use crate::types::*;
use weft_core::intern::InternedString;
use weft_core::text::TextRange;

// ============================================================================
// Core Node Wrapper
// ============================================================================

/// Common data shared by all syntax nodes.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub range: TextRange,
    pub flags: NodeFlags,
    pub id: NodeId,
}

impl NodeData {
    pub fn new(pos: u32, end: u32) -> Self {
        Self {
            range: TextRange::new(pos, end),
            flags: NodeFlags::NONE,
            id: NodeId::INVALID,
        }
    }
}

/// A list of nodes, allocated in the arena.
pub type NodeList<'a, T> = &'a [T];

/// An optional arena-allocated node.
pub type OptionalNode<'a, T> = Option<&'a T>;

// ============================================================================
// Source File
// ============================================================================

#[derive(Debug)]
pub struct SourceFile<'a> {
    pub id: TreeId,
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
    pub file_name: String,
    pub text: String,
}

// ============================================================================
// Identifier
// ============================================================================

#[derive(Debug, Clone)]
pub struct Identifier {
    pub data: NodeData,
    /// Interned handle, used as the scope-table key.
    pub text: InternedString,
    /// The identifier as written, used in messages and bound symbols.
    pub text_name: String,
}

// ============================================================================
// Type Annotations
// ============================================================================

#[derive(Debug)]
pub enum TypeNode<'a> {
    /// `Int`, `List<T>`, `Result<Int, String>`, `Box<T>`, `T`.
    Named(NamedTypeNode<'a>),
    /// `fn(Int, Int) -> Bool`.
    Function(FunctionTypeNode<'a>),
    /// `(Int, String)`.
    Tuple(TupleTypeNode<'a>),
}

#[derive(Debug)]
pub struct NamedTypeNode<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_arguments: NodeList<'a, TypeNode<'a>>,
}

#[derive(Debug)]
pub struct FunctionTypeNode<'a> {
    pub data: NodeData,
    pub parameters: NodeList<'a, TypeNode<'a>>,
    pub return_type: &'a TypeNode<'a>,
}

#[derive(Debug)]
pub struct TupleTypeNode<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, TypeNode<'a>>,
}

impl TypeNode<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            TypeNode::Named(n) => n.data.range,
            TypeNode::Function(n) => n.data.range,
            TypeNode::Tuple(n) => n.data.range,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug)]
pub enum Statement<'a> {
    Let(LetStatement<'a>),
    Assignment(AssignmentStatement<'a>),
    Expression(ExpressionStatement<'a>),
    Print(PrintStatement<'a>),
    Return(ReturnStatement<'a>),
    Block(Block<'a>),
    While(WhileStatement<'a>),
    For(ForStatement<'a>),
    Break(NodeData),
    Continue(NodeData),
    FunctionDeclaration(FunctionDeclaration<'a>),
    RecordDeclaration(RecordDeclaration<'a>),
    SumDeclaration(SumDeclaration<'a>),
}

impl Statement<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            Statement::Let(n) => n.data.range,
            Statement::Assignment(n) => n.data.range,
            Statement::Expression(n) => n.data.range,
            Statement::Print(n) => n.data.range,
            Statement::Return(n) => n.data.range,
            Statement::Block(n) => n.data.range,
            Statement::While(n) => n.data.range,
            Statement::For(n) => n.data.range,
            Statement::Break(data) | Statement::Continue(data) => data.range,
            Statement::FunctionDeclaration(n) => n.data.range,
            Statement::RecordDeclaration(n) => n.data.range,
            Statement::SumDeclaration(n) => n.data.range,
        }
    }
}

/// `let [mut] name [: T] = initializer`. Mutability is `NodeFlags::MUTABLE`.
#[derive(Debug)]
pub struct LetStatement<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_annotation: OptionalNode<'a, TypeNode<'a>>,
    pub initializer: &'a Expression<'a>,
}

impl LetStatement<'_> {
    pub fn is_mutable(&self) -> bool {
        self.data.flags.contains(NodeFlags::MUTABLE)
    }
}

#[derive(Debug)]
pub struct AssignmentStatement<'a> {
    pub data: NodeData,
    pub target: Identifier,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ExpressionStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct PrintStatement<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct ReturnStatement<'a> {
    pub data: NodeData,
    pub expression: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct Block<'a> {
    pub data: NodeData,
    pub statements: NodeList<'a, Statement<'a>>,
}

#[derive(Debug)]
pub struct WhileStatement<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub body: Block<'a>,
}

/// `for binding in iterable { body }`.
#[derive(Debug)]
pub struct ForStatement<'a> {
    pub data: NodeData,
    pub binding: Identifier,
    pub iterable: &'a Expression<'a>,
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct Parameter<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_annotation: TypeNode<'a>,
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_parameters: NodeList<'a, Identifier>,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct FieldDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_annotation: TypeNode<'a>,
}

/// `type Name<T> { field: T, ... }`.
#[derive(Debug)]
pub struct RecordDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_parameters: NodeList<'a, Identifier>,
    pub fields: NodeList<'a, FieldDeclaration<'a>>,
}

#[derive(Debug)]
pub struct VariantDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub payload: OptionalNode<'a, TypeNode<'a>>,
}

/// `type Name<T> { Variant(T) Other }`.
#[derive(Debug)]
pub struct SumDeclaration<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub type_parameters: NodeList<'a, Identifier>,
    pub variants: NodeList<'a, VariantDeclaration<'a>>,
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug)]
pub enum Expression<'a> {
    Literal(Literal),
    Identifier(Identifier),
    Binary(BinaryExpression<'a>),
    Unary(UnaryExpression<'a>),
    Call(CallExpression<'a>),
    Lambda(LambdaExpression<'a>),
    RecordLiteral(RecordLiteral<'a>),
    FieldAccess(FieldAccessExpression<'a>),
    Tuple(TupleExpression<'a>),
    List(ListExpression<'a>),
    Map(MapExpression<'a>),
    Index(IndexExpression<'a>),
    If(IfExpression<'a>),
    Block(Block<'a>),
    Match(MatchExpression<'a>),
    Spawn(SpawnExpression<'a>),
    Scope(ScopeExpression<'a>),
    Channel(ChannelExpression<'a>),
    Par(ParExpression<'a>),
}

impl Expression<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            Expression::Literal(n) => n.data.range,
            Expression::Identifier(n) => n.data.range,
            Expression::Binary(n) => n.data.range,
            Expression::Unary(n) => n.data.range,
            Expression::Call(n) => n.data.range,
            Expression::Lambda(n) => n.data.range,
            Expression::RecordLiteral(n) => n.data.range,
            Expression::FieldAccess(n) => n.data.range,
            Expression::Tuple(n) => n.data.range,
            Expression::List(n) => n.data.range,
            Expression::Map(n) => n.data.range,
            Expression::Index(n) => n.data.range,
            Expression::If(n) => n.data.range,
            Expression::Block(n) => n.data.range,
            Expression::Match(n) => n.data.range,
            Expression::Spawn(n) => n.data.range,
            Expression::Scope(n) => n.data.range,
            Expression::Channel(n) => n.data.range,
            Expression::Par(n) => n.data.range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    String(String),
    Unit,
}

#[derive(Debug, Clone)]
pub struct Literal {
    pub data: NodeData,
    pub value: LiteralValue,
}

#[derive(Debug)]
pub struct BinaryExpression<'a> {
    pub data: NodeData,
    pub operator: BinaryOperator,
    pub left: &'a Expression<'a>,
    pub right: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct UnaryExpression<'a> {
    pub data: NodeData,
    pub operator: UnaryOperator,
    pub operand: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct CallExpression<'a> {
    pub data: NodeData,
    pub callee: &'a Expression<'a>,
    pub type_arguments: NodeList<'a, TypeNode<'a>>,
    pub arguments: NodeList<'a, Expression<'a>>,
}

/// `fn(x: Int) => body`.
#[derive(Debug)]
pub struct LambdaExpression<'a> {
    pub data: NodeData,
    pub parameters: NodeList<'a, Parameter<'a>>,
    pub return_type: OptionalNode<'a, TypeNode<'a>>,
    pub body: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct FieldInitializer<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub value: &'a Expression<'a>,
}

/// `User { name: "a", age: 3 }`.
#[derive(Debug)]
pub struct RecordLiteral<'a> {
    pub data: NodeData,
    pub type_name: Identifier,
    pub type_arguments: NodeList<'a, TypeNode<'a>>,
    pub fields: NodeList<'a, FieldInitializer<'a>>,
}

#[derive(Debug)]
pub struct FieldAccessExpression<'a> {
    pub data: NodeData,
    pub target: &'a Expression<'a>,
    pub name: Identifier,
}

#[derive(Debug)]
pub struct TupleExpression<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct ListExpression<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct MapEntry<'a> {
    pub data: NodeData,
    pub key: &'a Expression<'a>,
    pub value: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct MapExpression<'a> {
    pub data: NodeData,
    pub entries: NodeList<'a, MapEntry<'a>>,
}

#[derive(Debug)]
pub struct IndexExpression<'a> {
    pub data: NodeData,
    pub target: &'a Expression<'a>,
    pub index: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct IfExpression<'a> {
    pub data: NodeData,
    pub condition: &'a Expression<'a>,
    pub then_branch: Block<'a>,
    /// Either a block expression or a chained `if`.
    pub else_branch: OptionalNode<'a, Expression<'a>>,
}

#[derive(Debug)]
pub struct MatchArm<'a> {
    pub data: NodeData,
    pub pattern: Pattern<'a>,
    pub body: &'a Expression<'a>,
}

#[derive(Debug)]
pub struct MatchExpression<'a> {
    pub data: NodeData,
    pub scrutinee: &'a Expression<'a>,
    pub arms: NodeList<'a, MatchArm<'a>>,
}

#[derive(Debug)]
pub struct SpawnExpression<'a> {
    pub data: NodeData,
    pub body: Block<'a>,
}

#[derive(Debug)]
pub struct ScopeExpression<'a> {
    pub data: NodeData,
    pub body: Block<'a>,
}

/// `channel<T>()`.
#[derive(Debug)]
pub struct ChannelExpression<'a> {
    pub data: NodeData,
    pub element_type: TypeNode<'a>,
}

#[derive(Debug)]
pub struct ParExpression<'a> {
    pub data: NodeData,
    pub expression: &'a Expression<'a>,
}

// ============================================================================
// Patterns
// ============================================================================

#[derive(Debug)]
pub enum Pattern<'a> {
    Literal(Literal),
    Wildcard(NodeData),
    Identifier(Identifier),
    Tuple(TuplePattern<'a>),
    Variant(VariantPattern<'a>),
}

impl Pattern<'_> {
    pub fn range(&self) -> TextRange {
        match self {
            Pattern::Literal(n) => n.data.range,
            Pattern::Wildcard(data) => data.range,
            Pattern::Identifier(n) => n.data.range,
            Pattern::Tuple(n) => n.data.range,
            Pattern::Variant(n) => n.data.range,
        }
    }
}

#[derive(Debug)]
pub struct TuplePattern<'a> {
    pub data: NodeData,
    pub elements: NodeList<'a, Pattern<'a>>,
}

/// `Ok(x)` or `None`, written with the variant name.
#[derive(Debug)]
pub struct VariantPattern<'a> {
    pub data: NodeData,
    pub name: Identifier,
    pub payload: OptionalNode<'a, Pattern<'a>>,
}
