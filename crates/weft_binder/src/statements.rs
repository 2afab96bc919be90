//! Statement binding.

use crate::binder::Binder;
use crate::bound::*;
use crate::captures::CaptureCheck;
use crate::scope::ScopeKind;
use crate::symbol::{SymbolId, SymbolKind};
use crate::types::Type;
use weft_core::text::TextRange;
use weft_diagnostics::messages;
use weft_syntax::*;

impl Binder {
    /// Bind a block in a fresh child scope.
    pub(crate) fn bind_block(&mut self, block: &Block<'_>) -> BoundBlock {
        let previous = self.enter_scope(ScopeKind::Block);
        let bound = self.bind_statements(block.statements, block.data.range);
        self.exit_scope(previous);
        bound
    }

    /// Bind statements in the current scope.
    pub(crate) fn bind_statements(&mut self, statements: &[Statement<'_>], range: TextRange) -> BoundBlock {
        let mut bound = Vec::with_capacity(statements.len());
        let mut diverges = false;
        for statement in statements {
            if let Some(statement) = self.bind_statement(statement) {
                diverges |= statement.diverges();
                bound.push(statement);
            }
        }
        let mut block = BoundBlock {
            statements: bound,
            ty: Type::Unit,
            diverges,
            range,
        };
        if let Some(trailing) = block.trailing_expression() {
            block.ty = trailing.ty.clone();
        }
        block
    }

    /// Bind one statement. Declarations are only legal at the top level and
    /// are bound by the top-level passes; anywhere else they are reported and
    /// dropped.
    pub(crate) fn bind_statement(&mut self, statement: &Statement<'_>) -> Option<BoundStatement> {
        let range = statement.range();
        let kind = match statement {
            Statement::Let(node) => self.bind_let(node),
            Statement::Assignment(node) => self.bind_assignment(node),
            Statement::Expression(node) => BoundStatementKind::Expression(self.bind_expression(node.expression)),
            Statement::Print(node) => BoundStatementKind::Print(self.bind_expression(node.expression)),
            Statement::Return(node) => self.bind_return(node),
            Statement::Block(block) => BoundStatementKind::Block(self.bind_block(block)),
            Statement::While(node) => {
                let condition = self.bind_expression(node.condition);
                self.check_condition(&condition);
                self.loop_depth += 1;
                let body = self.bind_block(&node.body);
                self.loop_depth -= 1;
                BoundStatementKind::While { condition, body }
            }
            Statement::For(node) => self.bind_for(node),
            Statement::Break(_) => {
                self.check_in_loop("break", range);
                BoundStatementKind::Break
            }
            Statement::Continue(_) => {
                self.check_in_loop("continue", range);
                BoundStatementKind::Continue
            }
            Statement::FunctionDeclaration(node) => {
                self.report(node.name.data.range, &messages::_0_DECLARATIONS_ONLY_AT_TOP_LEVEL, &["Function"]);
                return None;
            }
            Statement::RecordDeclaration(node) => {
                self.report(node.name.data.range, &messages::_0_DECLARATIONS_ONLY_AT_TOP_LEVEL, &["Record"]);
                return None;
            }
            Statement::SumDeclaration(node) => {
                self.report(node.name.data.range, &messages::_0_DECLARATIONS_ONLY_AT_TOP_LEVEL, &["Sum"]);
                return None;
            }
        };
        Some(BoundStatement { kind, range })
    }

    fn bind_let(&mut self, node: &LetStatement<'_>) -> BoundStatementKind {
        let annotation = node.type_annotation.map(|t| self.resolve_type(t));
        // The initializer is bound before the name exists, so `let x = x + 1`
        // sees any outer `x`.
        let initializer = self.bind_expression_expecting(node.initializer, annotation.as_ref());
        let ty = match annotation {
            Some(annotation) => {
                if !annotation.accepts(&initializer.ty) {
                    self.report(
                        initializer.range,
                        &messages::CANNOT_ASSIGN_TYPE_0_TO_VARIABLE_OF_TYPE_1,
                        &[&initializer.ty.to_string(), &annotation.to_string()],
                    );
                }
                annotation
            }
            None => initializer.ty.clone(),
        };
        let symbol = self.declare_local(
            &node.name,
            SymbolKind::Variable {
                mutable: node.is_mutable(),
            },
            ty,
        );
        BoundStatementKind::Let { symbol, initializer }
    }

    fn bind_assignment(&mut self, node: &AssignmentStatement<'_>) -> BoundStatementKind {
        let target = self.resolve_variable(&node.target);
        let target_info = target.and_then(|id| self.symbols.get(id)).map(|s| (s.ty.clone(), s.is_mutable()));
        let value = self.bind_expression_expecting(node.value, target_info.as_ref().map(|(ty, _)| ty));

        match target_info {
            None => {
                self.report(node.target.data.range, &messages::UNDEFINED_VARIABLE_0, &[&node.target.text_name]);
            }
            Some((ty, mutable)) => {
                if !mutable {
                    self.report(
                        node.target.data.range,
                        &messages::CANNOT_ASSIGN_TO_IMMUTABLE_VARIABLE_0,
                        &[&node.target.text_name],
                    );
                }
                if !ty.accepts(&value.ty) {
                    self.report(
                        value.range,
                        &messages::CANNOT_ASSIGN_TYPE_0_TO_VARIABLE_OF_TYPE_1,
                        &[&value.ty.to_string(), &ty.to_string()],
                    );
                }
            }
        }
        BoundStatementKind::Assignment { symbol: target, value }
    }

    fn bind_return(&mut self, node: &ReturnStatement<'_>) -> BoundStatementKind {
        let declared = self.functions.last().and_then(|f| f.declared.clone());
        let expression = node
            .expression
            .map(|e| self.bind_expression_expecting(e, declared.as_ref()));
        let candidate = expression
            .as_ref()
            .map_or((Type::Unit, node.data.range), |e| (e.ty.clone(), e.range));
        match self.functions.last_mut() {
            Some(function) => function.returns.push(candidate),
            None => self.report(node.data.range, &messages::RETURN_OUTSIDE_FUNCTION, &[]),
        }
        BoundStatementKind::Return(expression)
    }

    fn bind_for(&mut self, node: &ForStatement<'_>) -> BoundStatementKind {
        let iterable = self.bind_expression(node.iterable);
        let element = match &iterable.ty {
            Type::List(element) => (**element).clone(),
            Type::Map(value) => Type::Tuple(vec![Type::String, (**value).clone()]),
            Type::Error => Type::Error,
            other => {
                let other = other.to_string();
                self.report(iterable.range, &messages::TYPE_0_IS_NOT_ITERABLE, &[&other]);
                Type::Error
            }
        };

        let previous = self.enter_scope(ScopeKind::Block);
        let binding = self.declare_local(&node.binding, SymbolKind::Variable { mutable: false }, element);
        self.loop_depth += 1;
        let body = self.bind_block(&node.body);
        self.loop_depth -= 1;
        self.exit_scope(previous);

        BoundStatementKind::For {
            binding,
            iterable,
            body,
        }
    }

    fn check_in_loop(&mut self, keyword: &str, range: TextRange) {
        if self.loop_depth == 0 {
            self.report(range, &messages::_0_OUTSIDE_LOOP, &[keyword]);
        }
    }

    pub(crate) fn check_condition(&mut self, condition: &BoundExpression) {
        if condition.ty != Type::Bool && !condition.ty.is_error() {
            self.report(
                condition.range,
                &messages::CONDITION_MUST_BE_BOOL_GOT_0,
                &[&condition.ty.to_string()],
            );
        }
    }

    /// Resolve a name in the variable namespace and report the reference to
    /// the capture tracker.
    pub(crate) fn resolve_variable(&mut self, name: &Identifier) -> Option<SymbolId> {
        let id = self.scopes.lookup_variable(self.current_scope, name.text)?;
        let (scope, mutable) = self.symbols.get(id).and_then(|s| Some((s.scope?, s.is_mutable())))?;
        if self.captures.observe(&self.scopes, id, scope, mutable) == CaptureCheck::MutableCapture {
            self.report(name.data.range, &messages::CANNOT_CAPTURE_MUTABLE_VARIABLE_0, &[&name.text_name]);
        }
        Some(id)
    }
}
