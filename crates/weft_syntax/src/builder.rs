//! Synthetic syntax tree construction.
//!
//! `TreeBuilder` allocates nodes in a [`SyntaxArena`] and stamps each one with
//! a fresh node id and a distinct one-byte range, so diagnostics reported
//! against synthesized trees still sort in construction order. Hosts that
//! generate code and the test suites use it in place of the parser.
//!
//! ```
//! use weft_core::SyntaxArena;
//! use weft_syntax::{BinaryOperator, TreeBuilder};
//!
//! let arena = SyntaxArena::new();
//! let b = TreeBuilder::new(&arena);
//! let tree = b.finish(
//!     "main.weft",
//!     vec![
//!         b.let_stmt("x", b.int(1)),
//!         b.print(b.binary(BinaryOperator::Add, b.ident("x"), b.int(2))),
//!     ],
//! );
//! assert_eq!(tree.statements.len(), 2);
//! ```

use crate::node::*;
use crate::types::*;
use std::cell::Cell;
use weft_core::arena::SyntaxArena;
use weft_core::intern::StringInterner;
use weft_core::text::TextRange;

pub struct TreeBuilder<'a> {
    arena: &'a SyntaxArena,
    interner: StringInterner,
    cursor: Cell<u32>,
    next_id: Cell<u32>,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(arena: &'a SyntaxArena) -> Self {
        Self::with_interner(arena, StringInterner::new())
    }

    pub fn with_interner(arena: &'a SyntaxArena, interner: StringInterner) -> Self {
        Self {
            arena,
            interner,
            cursor: Cell::new(0),
            next_id: Cell::new(0),
        }
    }

    pub fn interner(&self) -> &StringInterner {
        &self.interner
    }

    fn data(&self) -> NodeData {
        let pos = self.cursor.get();
        self.cursor.set(pos + 1);
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        NodeData {
            range: TextRange::new(pos, pos + 1),
            flags: NodeFlags::SYNTHESIZED,
            id: NodeId(id),
        }
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn list<T>(&self, items: Vec<T>) -> &'a [T] {
        self.arena.alloc_vec(items)
    }

    // ========================================================================
    // Names and type annotations
    // ========================================================================

    pub fn identifier(&self, name: &str) -> Identifier {
        Identifier {
            data: self.data(),
            text: self.interner.intern(name),
            text_name: name.to_string(),
        }
    }

    fn identifiers(&self, names: &[&str]) -> &'a [Identifier] {
        self.list(names.iter().map(|n| self.identifier(n)).collect())
    }

    /// A named type without arguments: `Int`, `User`, `T`.
    pub fn ty(&self, name: &str) -> TypeNode<'a> {
        self.ty_of(name, Vec::new())
    }

    /// A named type with arguments: `List<Int>`, `Result<Int, String>`.
    pub fn ty_of(&self, name: &str, arguments: Vec<TypeNode<'a>>) -> TypeNode<'a> {
        TypeNode::Named(NamedTypeNode {
            data: self.data(),
            name: self.identifier(name),
            type_arguments: self.list(arguments),
        })
    }

    pub fn ty_fn(&self, parameters: Vec<TypeNode<'a>>, return_type: TypeNode<'a>) -> TypeNode<'a> {
        TypeNode::Function(FunctionTypeNode {
            data: self.data(),
            parameters: self.list(parameters),
            return_type: self.alloc(return_type),
        })
    }

    pub fn ty_tuple(&self, elements: Vec<TypeNode<'a>>) -> TypeNode<'a> {
        TypeNode::Tuple(TupleTypeNode {
            data: self.data(),
            elements: self.list(elements),
        })
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn literal(&self, value: LiteralValue) -> Literal {
        Literal {
            data: self.data(),
            value,
        }
    }

    pub fn int(&self, value: i64) -> Expression<'a> {
        Expression::Literal(self.literal(LiteralValue::Int(value)))
    }

    pub fn float(&self, value: f64) -> Expression<'a> {
        Expression::Literal(self.literal(LiteralValue::Float(value)))
    }

    pub fn bool(&self, value: bool) -> Expression<'a> {
        Expression::Literal(self.literal(LiteralValue::Bool(value)))
    }

    pub fn string(&self, value: &str) -> Expression<'a> {
        Expression::Literal(self.literal(LiteralValue::String(value.to_string())))
    }

    pub fn unit(&self) -> Expression<'a> {
        Expression::Literal(self.literal(LiteralValue::Unit))
    }

    pub fn ident(&self, name: &str) -> Expression<'a> {
        Expression::Identifier(self.identifier(name))
    }

    pub fn binary(&self, operator: BinaryOperator, left: Expression<'a>, right: Expression<'a>) -> Expression<'a> {
        Expression::Binary(BinaryExpression {
            data: self.data(),
            operator,
            left: self.alloc(left),
            right: self.alloc(right),
        })
    }

    pub fn unary(&self, operator: UnaryOperator, operand: Expression<'a>) -> Expression<'a> {
        Expression::Unary(UnaryExpression {
            data: self.data(),
            operator,
            operand: self.alloc(operand),
        })
    }

    /// `name(arguments)`.
    pub fn call(&self, name: &str, arguments: Vec<Expression<'a>>) -> Expression<'a> {
        self.call_with_types(name, Vec::new(), arguments)
    }

    /// `name<type_arguments>(arguments)`.
    pub fn call_with_types(
        &self,
        name: &str,
        type_arguments: Vec<TypeNode<'a>>,
        arguments: Vec<Expression<'a>>,
    ) -> Expression<'a> {
        let callee = self.ident(name);
        Expression::Call(CallExpression {
            data: self.data(),
            callee: self.alloc(callee),
            type_arguments: self.list(type_arguments),
            arguments: self.list(arguments),
        })
    }

    /// Call an arbitrary callee expression.
    pub fn call_value(&self, callee: Expression<'a>, arguments: Vec<Expression<'a>>) -> Expression<'a> {
        Expression::Call(CallExpression {
            data: self.data(),
            callee: self.alloc(callee),
            type_arguments: &[],
            arguments: self.list(arguments),
        })
    }

    pub fn param(&self, name: &str, type_annotation: TypeNode<'a>) -> Parameter<'a> {
        Parameter {
            data: self.data(),
            name: self.identifier(name),
            type_annotation,
        }
    }

    pub fn lambda(
        &self,
        parameters: Vec<Parameter<'a>>,
        return_type: Option<TypeNode<'a>>,
        body: Expression<'a>,
    ) -> Expression<'a> {
        Expression::Lambda(LambdaExpression {
            data: self.data(),
            parameters: self.list(parameters),
            return_type: return_type.map(|t| self.alloc(t)),
            body: self.alloc(body),
        })
    }

    pub fn record(&self, type_name: &str, fields: Vec<(&str, Expression<'a>)>) -> Expression<'a> {
        self.record_of(type_name, Vec::new(), fields)
    }

    pub fn record_of(
        &self,
        type_name: &str,
        type_arguments: Vec<TypeNode<'a>>,
        fields: Vec<(&str, Expression<'a>)>,
    ) -> Expression<'a> {
        let fields = fields
            .into_iter()
            .map(|(name, value)| FieldInitializer {
                data: self.data(),
                name: self.identifier(name),
                value: self.alloc(value),
            })
            .collect();
        Expression::RecordLiteral(RecordLiteral {
            data: self.data(),
            type_name: self.identifier(type_name),
            type_arguments: self.list(type_arguments),
            fields: self.list(fields),
        })
    }

    pub fn field(&self, target: Expression<'a>, name: &str) -> Expression<'a> {
        Expression::FieldAccess(FieldAccessExpression {
            data: self.data(),
            target: self.alloc(target),
            name: self.identifier(name),
        })
    }

    pub fn tuple(&self, elements: Vec<Expression<'a>>) -> Expression<'a> {
        Expression::Tuple(TupleExpression {
            data: self.data(),
            elements: self.list(elements),
        })
    }

    pub fn list_of(&self, elements: Vec<Expression<'a>>) -> Expression<'a> {
        Expression::List(ListExpression {
            data: self.data(),
            elements: self.list(elements),
        })
    }

    pub fn map_of(&self, entries: Vec<(Expression<'a>, Expression<'a>)>) -> Expression<'a> {
        let entries = entries
            .into_iter()
            .map(|(key, value)| MapEntry {
                data: self.data(),
                key: self.alloc(key),
                value: self.alloc(value),
            })
            .collect();
        Expression::Map(MapExpression {
            data: self.data(),
            entries: self.list(entries),
        })
    }

    pub fn index(&self, target: Expression<'a>, index: Expression<'a>) -> Expression<'a> {
        Expression::Index(IndexExpression {
            data: self.data(),
            target: self.alloc(target),
            index: self.alloc(index),
        })
    }

    pub fn if_expr(
        &self,
        condition: Expression<'a>,
        then_branch: Vec<Statement<'a>>,
        else_branch: Option<Expression<'a>>,
    ) -> Expression<'a> {
        Expression::If(IfExpression {
            data: self.data(),
            condition: self.alloc(condition),
            then_branch: self.block(then_branch),
            else_branch: else_branch.map(|e| self.alloc(e)),
        })
    }

    pub fn block(&self, statements: Vec<Statement<'a>>) -> Block<'a> {
        Block {
            data: self.data(),
            statements: self.list(statements),
        }
    }

    pub fn block_expr(&self, statements: Vec<Statement<'a>>) -> Expression<'a> {
        Expression::Block(self.block(statements))
    }

    pub fn arm(&self, pattern: Pattern<'a>, body: Expression<'a>) -> MatchArm<'a> {
        MatchArm {
            data: self.data(),
            pattern,
            body: self.alloc(body),
        }
    }

    pub fn match_expr(&self, scrutinee: Expression<'a>, arms: Vec<MatchArm<'a>>) -> Expression<'a> {
        Expression::Match(MatchExpression {
            data: self.data(),
            scrutinee: self.alloc(scrutinee),
            arms: self.list(arms),
        })
    }

    pub fn spawn(&self, body: Vec<Statement<'a>>) -> Expression<'a> {
        Expression::Spawn(SpawnExpression {
            data: self.data(),
            body: self.block(body),
        })
    }

    pub fn scope(&self, body: Vec<Statement<'a>>) -> Expression<'a> {
        Expression::Scope(ScopeExpression {
            data: self.data(),
            body: self.block(body),
        })
    }

    pub fn channel(&self, element_type: TypeNode<'a>) -> Expression<'a> {
        Expression::Channel(ChannelExpression {
            data: self.data(),
            element_type,
        })
    }

    pub fn par(&self, expression: Expression<'a>) -> Expression<'a> {
        Expression::Par(ParExpression {
            data: self.data(),
            expression: self.alloc(expression),
        })
    }

    // ========================================================================
    // Patterns
    // ========================================================================

    pub fn pat_wildcard(&self) -> Pattern<'a> {
        Pattern::Wildcard(self.data())
    }

    pub fn pat_ident(&self, name: &str) -> Pattern<'a> {
        Pattern::Identifier(self.identifier(name))
    }

    pub fn pat_int(&self, value: i64) -> Pattern<'a> {
        Pattern::Literal(self.literal(LiteralValue::Int(value)))
    }

    pub fn pat_float(&self, value: f64) -> Pattern<'a> {
        Pattern::Literal(self.literal(LiteralValue::Float(value)))
    }

    pub fn pat_bool(&self, value: bool) -> Pattern<'a> {
        Pattern::Literal(self.literal(LiteralValue::Bool(value)))
    }

    pub fn pat_string(&self, value: &str) -> Pattern<'a> {
        Pattern::Literal(self.literal(LiteralValue::String(value.to_string())))
    }

    pub fn pat_tuple(&self, elements: Vec<Pattern<'a>>) -> Pattern<'a> {
        Pattern::Tuple(TuplePattern {
            data: self.data(),
            elements: self.list(elements),
        })
    }

    pub fn pat_variant(&self, name: &str, payload: Option<Pattern<'a>>) -> Pattern<'a> {
        Pattern::Variant(VariantPattern {
            data: self.data(),
            name: self.identifier(name),
            payload: payload.map(|p| self.alloc(p)),
        })
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn let_with(
        &self,
        name: &str,
        mutable: bool,
        type_annotation: Option<TypeNode<'a>>,
        initializer: Expression<'a>,
    ) -> Statement<'a> {
        let mut data = self.data();
        if mutable {
            data.flags |= NodeFlags::MUTABLE;
        }
        Statement::Let(LetStatement {
            data,
            name: self.identifier(name),
            type_annotation: type_annotation.map(|t| self.alloc(t)),
            initializer: self.alloc(initializer),
        })
    }

    pub fn let_stmt(&self, name: &str, initializer: Expression<'a>) -> Statement<'a> {
        self.let_with(name, false, None, initializer)
    }

    pub fn let_mut(&self, name: &str, initializer: Expression<'a>) -> Statement<'a> {
        self.let_with(name, true, None, initializer)
    }

    pub fn let_typed(&self, name: &str, type_annotation: TypeNode<'a>, initializer: Expression<'a>) -> Statement<'a> {
        self.let_with(name, false, Some(type_annotation), initializer)
    }

    pub fn let_mut_typed(&self, name: &str, type_annotation: TypeNode<'a>, initializer: Expression<'a>) -> Statement<'a> {
        self.let_with(name, true, Some(type_annotation), initializer)
    }

    pub fn assign(&self, name: &str, value: Expression<'a>) -> Statement<'a> {
        Statement::Assignment(AssignmentStatement {
            data: self.data(),
            target: self.identifier(name),
            value: self.alloc(value),
        })
    }

    pub fn expr_stmt(&self, expression: Expression<'a>) -> Statement<'a> {
        Statement::Expression(ExpressionStatement {
            data: self.data(),
            expression: self.alloc(expression),
        })
    }

    pub fn print(&self, expression: Expression<'a>) -> Statement<'a> {
        Statement::Print(PrintStatement {
            data: self.data(),
            expression: self.alloc(expression),
        })
    }

    pub fn return_stmt(&self, expression: Option<Expression<'a>>) -> Statement<'a> {
        Statement::Return(ReturnStatement {
            data: self.data(),
            expression: expression.map(|e| self.alloc(e)),
        })
    }

    pub fn block_stmt(&self, statements: Vec<Statement<'a>>) -> Statement<'a> {
        Statement::Block(self.block(statements))
    }

    pub fn while_stmt(&self, condition: Expression<'a>, body: Vec<Statement<'a>>) -> Statement<'a> {
        Statement::While(WhileStatement {
            data: self.data(),
            condition: self.alloc(condition),
            body: self.block(body),
        })
    }

    pub fn for_stmt(&self, binding: &str, iterable: Expression<'a>, body: Vec<Statement<'a>>) -> Statement<'a> {
        Statement::For(ForStatement {
            data: self.data(),
            binding: self.identifier(binding),
            iterable: self.alloc(iterable),
            body: self.block(body),
        })
    }

    pub fn break_stmt(&self) -> Statement<'a> {
        Statement::Break(self.data())
    }

    pub fn continue_stmt(&self) -> Statement<'a> {
        Statement::Continue(self.data())
    }

    pub fn function(
        &self,
        name: &str,
        parameters: Vec<Parameter<'a>>,
        return_type: Option<TypeNode<'a>>,
        body: Vec<Statement<'a>>,
    ) -> Statement<'a> {
        self.generic_function(name, &[], parameters, return_type, body)
    }

    pub fn generic_function(
        &self,
        name: &str,
        type_parameters: &[&str],
        parameters: Vec<Parameter<'a>>,
        return_type: Option<TypeNode<'a>>,
        body: Vec<Statement<'a>>,
    ) -> Statement<'a> {
        Statement::FunctionDeclaration(FunctionDeclaration {
            data: self.data(),
            name: self.identifier(name),
            type_parameters: self.identifiers(type_parameters),
            parameters: self.list(parameters),
            return_type: return_type.map(|t| self.alloc(t)),
            body: self.block(body),
        })
    }

    pub fn record_decl(&self, name: &str, fields: Vec<(&str, TypeNode<'a>)>) -> Statement<'a> {
        self.generic_record(name, &[], fields)
    }

    pub fn generic_record(
        &self,
        name: &str,
        type_parameters: &[&str],
        fields: Vec<(&str, TypeNode<'a>)>,
    ) -> Statement<'a> {
        let fields = fields
            .into_iter()
            .map(|(field, type_annotation)| FieldDeclaration {
                data: self.data(),
                name: self.identifier(field),
                type_annotation,
            })
            .collect();
        Statement::RecordDeclaration(RecordDeclaration {
            data: self.data(),
            name: self.identifier(name),
            type_parameters: self.identifiers(type_parameters),
            fields: self.list(fields),
        })
    }

    pub fn sum_decl(&self, name: &str, variants: Vec<(&str, Option<TypeNode<'a>>)>) -> Statement<'a> {
        self.generic_sum(name, &[], variants)
    }

    pub fn generic_sum(
        &self,
        name: &str,
        type_parameters: &[&str],
        variants: Vec<(&str, Option<TypeNode<'a>>)>,
    ) -> Statement<'a> {
        let variants = variants
            .into_iter()
            .map(|(variant, payload)| VariantDeclaration {
                data: self.data(),
                name: self.identifier(variant),
                payload: payload.map(|t| self.alloc(t)),
            })
            .collect();
        Statement::SumDeclaration(SumDeclaration {
            data: self.data(),
            name: self.identifier(name),
            type_parameters: self.identifiers(type_parameters),
            variants: self.list(variants),
        })
    }

    // ========================================================================
    // Source file
    // ========================================================================

    pub fn finish(&self, file_name: &str, statements: Vec<Statement<'a>>) -> SourceFile<'a> {
        self.finish_with_text(file_name, "", statements)
    }

    pub fn finish_with_text(&self, file_name: &str, text: &str, statements: Vec<Statement<'a>>) -> SourceFile<'a> {
        let end = self.cursor.get();
        let mut data = self.data();
        data.range = TextRange::new(0, end);
        SourceFile {
            id: TreeId::fresh(),
            data,
            statements: self.list(statements),
            file_name: file_name.to_string(),
            text: text.to_string(),
        }
    }
}
