//! Expression binding.
//!
//! Every case returns a bound expression with its final type. A failed
//! sub-expression yields `Type::Error`, and every rule below stays silent
//! when an operand is already `Error`, so one root cause produces one
//! diagnostic.

use crate::binder::{trailing_candidate, Binder, FunctionContext};
use crate::bound::*;
use crate::builtins::{self, BuiltinCallError, SpecialBuiltin};
use crate::exhaustiveness::{check_match, MatchIssueKind};
use crate::registry::substitution_for;
use crate::scope::ScopeKind;
use crate::symbol::{FunctionSymbol, SymbolId, SymbolKind};
use crate::types::{Substitution, Type};
use rustc_hash::FxHashSet;
use std::mem;
use weft_core::text::TextRange;
use weft_diagnostics::messages;
use weft_syntax::*;

fn literal_type(value: &LiteralValue) -> Type {
    match value {
        LiteralValue::Int(_) => Type::Int,
        LiteralValue::Float(_) => Type::Float,
        LiteralValue::Bool(_) => Type::Bool,
        LiteralValue::String(_) => Type::String,
        LiteralValue::Unit => Type::Unit,
    }
}

pub(crate) fn literal_pattern_type(value: &LiteralValue) -> Type {
    literal_type(value)
}

/// Result type of a binary operator, or `None` if the operand types do not
/// support it.
fn binary_result(operator: BinaryOperator, left: &Type, right: &Type) -> Option<Type> {
    match (left, right) {
        (Type::Bool, Type::Bool) if operator.is_logical() || operator.is_equality() => Some(Type::Bool),
        (Type::Int, Type::Int) | (Type::Float, Type::Float) => {
            if operator.is_arithmetic() {
                Some(left.clone())
            } else if operator.is_comparison() || operator.is_equality() {
                Some(Type::Bool)
            } else {
                None
            }
        }
        (Type::String, Type::String) => match operator {
            BinaryOperator::Add => Some(Type::String),
            _ if operator.is_equality() => Some(Type::Bool),
            _ => None,
        },
        _ => None,
    }
}

/// Type arguments for `parameters`, taken from `map` where inferred.
/// Type arguments for `parameters`. A parameter nothing at the use site
/// determined becomes `Error`, so it never leaks as a foreign placeholder.
fn instantiate(parameters: &[String], map: &Substitution) -> Vec<Type> {
    parameters
        .iter()
        .map(|p| map.get(p).cloned().unwrap_or(Type::Error))
        .collect()
}

fn close_unbound(parameters: &[String], map: &mut Substitution) {
    for p in parameters {
        map.entry(p.clone()).or_insert(Type::Error);
    }
}

fn join_types(types: &[&Type]) -> String {
    types.iter().map(|t| t.to_string()).collect::<Vec<_>>().join(", ")
}

impl Binder {
    pub(crate) fn bind_expression(&mut self, expression: &Expression<'_>) -> BoundExpression {
        self.bind_expression_expecting(expression, None)
    }

    /// Bind with an optional expected type. The hint only fills in what the
    /// expression cannot determine by itself (element types of empty
    /// literals, generic arguments); callers still check compatibility.
    pub(crate) fn bind_expression_expecting(&mut self, expression: &Expression<'_>, expected: Option<&Type>) -> BoundExpression {
        let range = expression.range();
        match expression {
            Expression::Literal(literal) => BoundExpression::new(
                BoundExpressionKind::Literal(literal.value.clone()),
                literal_type(&literal.value),
                range,
            ),
            Expression::Identifier(identifier) => self.bind_identifier(identifier, expected),
            Expression::Binary(node) => self.bind_binary(node, range),
            Expression::Unary(node) => self.bind_unary(node, range),
            Expression::Call(node) => self.bind_call(node, range, expected),
            Expression::Lambda(node) => self.bind_lambda(node, range),
            Expression::RecordLiteral(node) => self.bind_record_literal(node, range, expected),
            Expression::FieldAccess(node) => self.bind_field_access(node, range),
            Expression::Tuple(node) => {
                let hints: &[Type] = match expected {
                    Some(Type::Tuple(hints)) if hints.len() == node.elements.len() => hints,
                    _ => &[],
                };
                let elements: Vec<BoundExpression> = node
                    .elements
                    .iter()
                    .enumerate()
                    .map(|(i, e)| self.bind_expression_expecting(e, hints.get(i)))
                    .collect();
                let ty = Type::Tuple(elements.iter().map(|e| e.ty.clone()).collect());
                BoundExpression::new(BoundExpressionKind::Tuple(elements), ty, range)
            }
            Expression::List(node) => self.bind_list(node, range, expected),
            Expression::Map(node) => self.bind_map(node, range, expected),
            Expression::Index(node) => self.bind_index(node, range),
            Expression::If(node) => self.bind_if(node, range, expected),
            Expression::Block(block) => {
                let block = self.bind_block(block);
                let ty = block.ty.clone();
                BoundExpression::new(BoundExpressionKind::Block(block), ty, range)
            }
            Expression::Match(node) => self.bind_match(node, range, expected),
            Expression::Spawn(node) => {
                if self.scope_block_depth == 0 {
                    self.report(range, &messages::SPAWN_OUTSIDE_SCOPE, &[]);
                }
                let body = self.bind_block(&node.body);
                let ty = Type::task(body.ty.clone());
                BoundExpression::new(BoundExpressionKind::Spawn(body), ty, range)
            }
            Expression::Scope(node) => {
                self.scope_block_depth += 1;
                let body = self.bind_block(&node.body);
                self.scope_block_depth -= 1;
                let ty = body.ty.clone();
                BoundExpression::new(BoundExpressionKind::Scope(body), ty, range)
            }
            Expression::Channel(node) => {
                let element = self.resolve_type(&node.element_type);
                let ty = Type::Tuple(vec![Type::sender(element.clone()), Type::receiver(element.clone())]);
                BoundExpression::new(BoundExpressionKind::Channel { element }, ty, range)
            }
            Expression::Par(node) => {
                let inner = self.bind_expression_expecting(node.expression, expected);
                let ty = inner.ty.clone();
                BoundExpression::new(BoundExpressionKind::Par(Box::new(inner)), ty, range)
            }
        }
    }

    // ========================================================================
    // Names
    // ========================================================================

    /// Resolution order: variable, then function value, then payload-less
    /// variant.
    fn bind_identifier(&mut self, identifier: &Identifier, expected: Option<&Type>) -> BoundExpression {
        let range = identifier.data.range;
        if let Some(id) = self.resolve_variable(identifier) {
            let ty = self.symbols.get(id).map_or(Type::Error, |s| s.ty.clone());
            return BoundExpression::new(BoundExpressionKind::Variable(id), ty, range);
        }
        if let Some(id) = self.scopes.lookup_function(self.current_scope, identifier.text) {
            let ty = self.symbols.get(id).map_or(Type::Error, |s| s.ty.clone());
            return BoundExpression::new(BoundExpressionKind::FunctionRef(id), ty, range);
        }
        let name = identifier.text_name.as_str();
        if let Some((sum, variant)) = self.registry.variant(name) {
            let symbol = variant.symbol;
            let payload = variant.payload.as_ref().map(|p| p.to_string());
            let ty = match expected {
                Some(hint @ Type::Sum { name, .. }) if *name == sum.name => hint.clone(),
                _ => Type::sum(sum.name.clone(), vec![Type::Error; sum.type_parameters.len()]),
            };
            if let Some(payload) = payload {
                self.report(range, &messages::VARIANT_0_REQUIRES_PAYLOAD_1, &[name, &payload]);
                return BoundExpression::error(range);
            }
            return BoundExpression::new(
                BoundExpressionKind::Variant {
                    variant: symbol,
                    payload: None,
                },
                ty,
                range,
            );
        }
        self.report(range, &messages::UNDEFINED_VARIABLE_0, &[name]);
        BoundExpression::error(range)
    }

    // ========================================================================
    // Operators
    // ========================================================================

    fn bind_binary(&mut self, node: &BinaryExpression<'_>, range: TextRange) -> BoundExpression {
        let left = self.bind_expression(node.left);
        let right = self.bind_expression(node.right);
        let ty = if left.ty.is_error() || right.ty.is_error() {
            Type::Error
        } else if let Some(ty) = binary_result(node.operator, &left.ty, &right.ty) {
            ty
        } else {
            self.report(
                range,
                &messages::OPERATOR_0_NOT_DEFINED_FOR_TYPES_1_AND_2,
                &[node.operator.as_str(), &left.ty.to_string(), &right.ty.to_string()],
            );
            Type::Error
        };
        BoundExpression::new(
            BoundExpressionKind::Binary {
                operator: node.operator,
                left: Box::new(left),
                right: Box::new(right),
            },
            ty,
            range,
        )
    }

    fn bind_unary(&mut self, node: &UnaryExpression<'_>, range: TextRange) -> BoundExpression {
        let operand = self.bind_expression(node.operand);
        let ty = match (node.operator, &operand.ty) {
            (_, Type::Error) => Type::Error,
            (UnaryOperator::Not, Type::Bool) => Type::Bool,
            (UnaryOperator::Plus | UnaryOperator::Minus, t) if t.is_numeric() => t.clone(),
            (operator, t) => {
                let t = t.to_string();
                self.report(range, &messages::OPERATOR_0_NOT_DEFINED_FOR_TYPE_1, &[operator.as_str(), &t]);
                Type::Error
            }
        };
        BoundExpression::new(
            BoundExpressionKind::Unary {
                operator: node.operator,
                operand: Box::new(operand),
            },
            ty,
            range,
        )
    }

    // ========================================================================
    // Calls
    // ========================================================================

    fn bind_call(&mut self, node: &CallExpression<'_>, range: TextRange, expected: Option<&Type>) -> BoundExpression {
        if let Expression::Identifier(callee) = node.callee {
            // A variable of function type shadows any function of that name.
            if self.scopes.lookup_variable(self.current_scope, callee.text).is_none() {
                if let Some(id) = self.scopes.lookup_function(self.current_scope, callee.text) {
                    return self.bind_function_call(id, callee, node, range);
                }
                if self.registry.variant(&callee.text_name).is_some() {
                    return self.bind_variant_construction(callee, node, range, expected);
                }
                self.report(callee.data.range, &messages::UNDEFINED_FUNCTION_0, &[&callee.text_name]);
                for argument in node.arguments.iter() {
                    self.bind_expression(argument);
                }
                return BoundExpression::error(range);
            }
        }
        self.bind_value_call(node, range)
    }

    fn bind_arguments(&mut self, arguments: &[Expression<'_>], hints: &[Option<Type>]) -> Vec<BoundExpression> {
        arguments
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let hint = hints.get(i).and_then(|h| h.as_ref());
                self.bind_expression_expecting(a, hint)
            })
            .collect()
    }

    fn report_arity(&mut self, name: &str, expected: usize, got: usize, range: TextRange) {
        self.report(
            range,
            &messages::_0_EXPECTS_1_ARGUMENTS_GOT_2,
            &[name, &expected.to_string(), &got.to_string()],
        );
    }

    /// Check each argument against its parameter type. With `open`, generic
    /// placeholders still present in a parameter match any argument.
    fn check_arguments(&mut self, name: &str, parameters: &[Type], arguments: &[BoundExpression], open: bool) {
        for (i, (parameter, argument)) in parameters.iter().zip(arguments).enumerate() {
            let ok = if open {
                parameter.accepts_argument(&argument.ty)
            } else {
                parameter.accepts(&argument.ty)
            };
            if !ok {
                self.report(
                    argument.range,
                    &messages::ARGUMENT_0_OF_1_EXPECTS_2_GOT_3,
                    &[
                        &(i + 1).to_string(),
                        name,
                        &parameter.to_string(),
                        &argument.ty.to_string(),
                    ],
                );
            }
        }
    }

    fn bind_function_call(
        &mut self,
        id: SymbolId,
        callee: &Identifier,
        node: &CallExpression<'_>,
        range: TextRange,
    ) -> BoundExpression {
        let Some(function) = self.symbols.get(id).and_then(|s| s.as_function()).cloned() else {
            return BoundExpression::error(range);
        };
        let explicit: Vec<Type> = node.type_arguments.iter().map(|t| self.resolve_type(t)).collect();

        if function.is_builtin {
            if let Some(special) = SpecialBuiltin::from_name(&function.name) {
                return self.bind_special_builtin_call(id, special, &function, explicit, node, range);
            }
        }

        let mut map = Substitution::default();
        let explicit_ok = explicit.is_empty()
            || self.check_type_arity(&function.name, function.type_parameters.len(), &explicit, callee.data.range);
        if explicit_ok && !explicit.is_empty() {
            map = substitution_for(&function.type_parameters, &explicit);
        }

        let hints: Vec<Option<Type>> = function
            .parameters
            .iter()
            .map(|p| {
                let ty = p.ty.substitute(&map);
                (!ty.has_generics()).then_some(ty)
            })
            .collect();
        let arguments = self.bind_arguments(node.arguments, &hints);

        if arguments.len() != function.parameters.len() {
            self.report_arity(&function.name, function.parameters.len(), arguments.len(), range);
            return self.call_expression(id, Vec::new(), arguments, Type::Error, range);
        }

        // Explicit type arguments are checked like any other signature.
        // Inferred ones are first-wins and only feed the return type: two
        // parameters sharing a placeholder are not checked against each other.
        let parameters: Vec<Type> = function.parameters.iter().map(|p| p.ty.substitute(&map)).collect();
        if function.is_generic() && explicit.is_empty() {
            for (parameter, argument) in function.parameters.iter().zip(&arguments) {
                parameter.ty.infer_into(&argument.ty, &mut map);
            }
        }
        self.check_arguments(&function.name, &parameters, &arguments, true);

        close_unbound(&function.type_parameters, &mut map);
        let ty = if explicit_ok {
            function.return_type.substitute(&map)
        } else {
            Type::Error
        };
        let type_arguments = instantiate(&function.type_parameters, &map);
        self.call_expression(id, type_arguments, arguments, ty, range)
    }

    fn call_expression(
        &self,
        function: SymbolId,
        type_arguments: Vec<Type>,
        arguments: Vec<BoundExpression>,
        ty: Type,
        range: TextRange,
    ) -> BoundExpression {
        BoundExpression::new(
            BoundExpressionKind::Call {
                function,
                type_arguments,
                arguments,
            },
            ty,
            range,
        )
    }

    fn bind_special_builtin_call(
        &mut self,
        id: SymbolId,
        special: SpecialBuiltin,
        function: &FunctionSymbol,
        explicit: Vec<Type>,
        node: &CallExpression<'_>,
        range: TextRange,
    ) -> BoundExpression {
        if !explicit.is_empty() {
            self.check_type_arity(&function.name, 0, &explicit, range);
        }
        let arguments = self.bind_arguments(node.arguments, &[]);
        let argument_types: Vec<Type> = arguments.iter().map(|a| a.ty.clone()).collect();
        let ty = match builtins::resolve_call(special, &argument_types) {
            Ok(ty) => ty,
            Err(BuiltinCallError::Arity { expected, got }) => {
                self.report_arity(&function.name, expected, got, range);
                Type::Error
            }
            Err(BuiltinCallError::NoOverload) => {
                let types: Vec<&Type> = argument_types.iter().collect();
                self.report(
                    range,
                    &messages::NO_OVERLOAD_OF_0_ACCEPTS_1,
                    &[&function.name, &join_types(&types)],
                );
                Type::Error
            }
        };
        self.call_expression(id, Vec::new(), arguments, ty, range)
    }

    /// Call through an arbitrary callee expression of function type.
    fn bind_value_call(&mut self, node: &CallExpression<'_>, range: TextRange) -> BoundExpression {
        let callee = self.bind_expression(node.callee);
        let name = match node.callee {
            Expression::Identifier(identifier) => identifier.text_name.clone(),
            _ => callee.ty.to_string(),
        };
        if !node.type_arguments.is_empty() {
            let explicit: Vec<Type> = node.type_arguments.iter().map(|t| self.resolve_type(t)).collect();
            self.check_type_arity(&name, 0, &explicit, range);
        }

        let (hints, ty) = match &callee.ty {
            Type::Function { params, ret } => (params.iter().cloned().map(Some).collect::<Vec<_>>(), Some((**ret).clone())),
            _ => (Vec::new(), None),
        };
        let arguments = self.bind_arguments(node.arguments, &hints);

        let ty = match (ty, &callee.ty) {
            (_, Type::Error) => Type::Error,
            (None, other) => {
                let other = other.to_string();
                self.report(callee.range, &messages::TYPE_0_IS_NOT_CALLABLE, &[&other]);
                Type::Error
            }
            (Some(ret), _) => {
                let params: Vec<Type> = hints.into_iter().flatten().collect();
                if params.len() != arguments.len() {
                    self.report_arity(&name, params.len(), arguments.len(), range);
                    Type::Error
                } else {
                    // A generic function used by name keeps its placeholders.
                    let open = matches!(callee.kind, BoundExpressionKind::FunctionRef(_));
                    self.check_arguments(&name, &params, &arguments, open);
                    if open && ret.has_generics() {
                        let mut map = Substitution::default();
                        for (parameter, argument) in params.iter().zip(&arguments) {
                            parameter.infer_into(&argument.ty, &mut map);
                        }
                        ret.substitute(&map)
                    } else {
                        ret
                    }
                }
            }
        };
        BoundExpression::new(
            BoundExpressionKind::CallValue {
                callee: Box::new(callee),
                arguments,
            },
            ty,
            range,
        )
    }

    /// `Variant(payload)` or `Variant()`.
    fn bind_variant_construction(
        &mut self,
        callee: &Identifier,
        node: &CallExpression<'_>,
        range: TextRange,
        expected: Option<&Type>,
    ) -> BoundExpression {
        let name = callee.text_name.as_str();
        let Some((sum, variant)) = self.registry.variant(name) else {
            return BoundExpression::error(range);
        };
        let sum_name = sum.name.clone();
        let type_parameters = sum.type_parameters.clone();
        let symbol = variant.symbol;
        let payload = variant.payload.clone();

        let mut map = match expected {
            Some(Type::Sum { name, args }) if *name == sum_name => substitution_for(&type_parameters, args),
            _ => Substitution::default(),
        };
        let hint = payload.as_ref().map(|p| p.substitute(&map)).filter(|p| !p.has_generics());
        let mut arguments = self.bind_arguments(node.arguments, &[hint]);

        match &payload {
            None if !arguments.is_empty() => {
                self.report(range, &messages::VARIANT_0_TAKES_NO_PAYLOAD, &[name]);
            }
            None => {}
            Some(payload) if arguments.is_empty() => {
                let payload = payload.to_string();
                self.report(range, &messages::VARIANT_0_REQUIRES_PAYLOAD_1, &[name, &payload]);
            }
            Some(_) if arguments.len() > 1 => {
                self.report_arity(name, 1, arguments.len(), range);
            }
            Some(payload) => {
                payload.infer_into(&arguments[0].ty, &mut map);
                let expected_payload = payload.substitute(&map);
                if !expected_payload.accepts_argument(&arguments[0].ty) {
                    let got = arguments[0].ty.to_string();
                    self.report(
                        arguments[0].range,
                        &messages::VARIANT_0_EXPECTS_PAYLOAD_1_GOT_2,
                        &[name, &expected_payload.to_string(), &got],
                    );
                }
            }
        }

        let ty = Type::sum(sum_name, instantiate(&type_parameters, &map));
        let payload = match (payload.is_some(), arguments.len()) {
            (true, 1) => arguments.pop().map(Box::new),
            _ => None,
        };
        BoundExpression::new(
            BoundExpressionKind::Variant {
                variant: symbol,
                payload,
            },
            ty,
            range,
        )
    }

    // ========================================================================
    // Lambdas
    // ========================================================================

    fn bind_lambda(&mut self, node: &LambdaExpression<'_>, range: TextRange) -> BoundExpression {
        let parameter_types: Vec<Type> = node
            .parameters
            .iter()
            .map(|p| self.resolve_type(&p.type_annotation))
            .collect();
        let declared = node.return_type.map(|t| self.resolve_type(t));

        let previous = self.enter_scope(ScopeKind::Lambda);
        self.captures.enter(self.current_scope);
        let parameters: Vec<SymbolId> = node
            .parameters
            .iter()
            .zip(&parameter_types)
            .map(|(p, ty)| self.declare_local(&p.name, SymbolKind::Parameter, ty.clone()))
            .collect();

        self.functions
            .push(FunctionContext::new("<lambda>", declared.clone(), range));
        let saved_loop_depth = mem::replace(&mut self.loop_depth, 0);
        let body = self.bind_expression_expecting(node.body, declared.as_ref());
        self.loop_depth = saved_loop_depth;
        let context = self.functions.pop();

        let captures = self.captures.exit();
        self.exit_scope(previous);

        let trailing = match &body.kind {
            BoundExpressionKind::Block(block) => trailing_candidate(block),
            _ if body.diverges() => None,
            _ => Some((body.ty.clone(), body.range)),
        };
        let return_type = match context {
            Some(context) => self.infer_return_type(context, trailing),
            None => Type::Error,
        };

        let ty = Type::function(parameter_types, return_type.clone());
        BoundExpression::new(
            BoundExpressionKind::Lambda(BoundLambda {
                parameters,
                return_type,
                body: Box::new(body),
                captures,
            }),
            ty,
            range,
        )
    }

    // ========================================================================
    // Records
    // ========================================================================

    fn bind_record_literal(&mut self, node: &RecordLiteral<'_>, range: TextRange, expected: Option<&Type>) -> BoundExpression {
        let type_name = node.type_name.text_name.as_str();
        let Some(record) = self.registry.record(type_name).cloned() else {
            if self.registry.sum(type_name).is_some() {
                self.report(node.type_name.data.range, &messages::TYPE_0_IS_NOT_A_RECORD, &[type_name]);
            } else {
                self.report(node.type_name.data.range, &messages::UNDEFINED_TYPE_0, &[type_name]);
            }
            for field in node.fields.iter() {
                self.bind_expression(field.value);
            }
            return BoundExpression::error(range);
        };

        let explicit: Vec<Type> = node.type_arguments.iter().map(|t| self.resolve_type(t)).collect();
        let mut map = if !explicit.is_empty() {
            if self.check_type_arity(type_name, record.type_parameters.len(), &explicit, node.type_name.data.range) {
                substitution_for(&record.type_parameters, &explicit)
            } else {
                Substitution::default()
            }
        } else {
            match expected {
                Some(Type::Record { name, args }) if name == type_name => substitution_for(&record.type_parameters, args),
                _ => Substitution::default(),
            }
        };

        let mut seen: FxHashSet<&str> = FxHashSet::default();
        let mut fields = Vec::with_capacity(node.fields.len());
        for field in node.fields.iter() {
            let field_name = field.name.text_name.as_str();
            if !seen.insert(field_name) {
                self.report(field.name.data.range, &messages::FIELD_0_IS_ALREADY_INITIALIZED, &[field_name]);
                self.bind_expression(field.value);
                continue;
            }
            let Some(definition) = record.fields.get(field_name) else {
                self.report(field.name.data.range, &messages::TYPE_0_HAS_NO_FIELD_1, &[type_name, field_name]);
                self.bind_expression(field.value);
                continue;
            };
            let hint = definition.ty.substitute(&map);
            let value = self.bind_expression_expecting(field.value, (!hint.has_generics()).then_some(&hint));
            definition.ty.infer_into(&value.ty, &mut map);
            let declared = definition.ty.substitute(&map);
            if !declared.accepts(&value.ty) {
                self.report(
                    value.range,
                    &messages::FIELD_0_EXPECTS_1_GOT_2,
                    &[field_name, &declared.to_string(), &value.ty.to_string()],
                );
            }
            fields.push((definition.symbol, value));
        }

        for name in record.fields.keys() {
            if !seen.contains(name.as_str()) {
                self.report(range, &messages::RECORD_0_IS_MISSING_REQUIRED_FIELD_1, &[type_name, name]);
            }
        }

        let ty = Type::record(record.name.clone(), instantiate(&record.type_parameters, &map));
        BoundExpression::new(BoundExpressionKind::Record { fields }, ty, range)
    }

    fn bind_field_access(&mut self, node: &FieldAccessExpression<'_>, range: TextRange) -> BoundExpression {
        let target = self.bind_expression(node.target);
        let field_name = node.name.text_name.as_str();
        let (field, ty) = match &target.ty {
            Type::Error => (None, Type::Error),
            Type::Record { name, args } => {
                let found = self.registry.record(name).and_then(|r| {
                    let symbol = r.fields.get(field_name)?.symbol;
                    Some((symbol, r.field_type(field_name, args)?))
                });
                match found {
                    Some((symbol, ty)) => (Some(symbol), ty),
                    None => {
                        let target_name = target.ty.to_string();
                        self.report(node.name.data.range, &messages::TYPE_0_HAS_NO_FIELD_1, &[&target_name, field_name]);
                        (None, Type::Error)
                    }
                }
            }
            other => {
                let other = other.to_string();
                self.report(target.range, &messages::TYPE_0_IS_NOT_A_RECORD, &[&other]);
                (None, Type::Error)
            }
        };
        BoundExpression::new(
            BoundExpressionKind::FieldAccess {
                target: Box::new(target),
                field,
            },
            ty,
            range,
        )
    }

    // ========================================================================
    // Collections
    // ========================================================================

    /// Settle the element type of a collection literal: the first concrete
    /// element type (or the hint), with every element checked against it.
    fn unify_elements(&mut self, elements: &[&BoundExpression], hint: Option<&Type>) -> Type {
        let element = hint
            .cloned()
            .or_else(|| elements.iter().map(|e| &e.ty).find(|t| !t.is_error()).cloned())
            .unwrap_or(Type::Error);
        for e in elements {
            if !element.accepts(&e.ty) {
                self.report(
                    e.range,
                    &messages::ELEMENT_TYPE_0_EXPECTED_1,
                    &[&e.ty.to_string(), &element.to_string()],
                );
            }
        }
        element
    }

    fn bind_list(&mut self, node: &ListExpression<'_>, range: TextRange, expected: Option<&Type>) -> BoundExpression {
        let hint = match expected {
            Some(Type::List(element)) => Some(&**element),
            _ => None,
        };
        if node.elements.is_empty() {
            let Some(hint) = hint else {
                self.report(range, &messages::CANNOT_INFER_EMPTY_0_LITERAL, &["list"]);
                return BoundExpression::new(BoundExpressionKind::List(Vec::new()), Type::Error, range);
            };
            return BoundExpression::new(BoundExpressionKind::List(Vec::new()), Type::list(hint.clone()), range);
        }
        let elements: Vec<BoundExpression> = node
            .elements
            .iter()
            .map(|e| self.bind_expression_expecting(e, hint))
            .collect();
        let refs: Vec<&BoundExpression> = elements.iter().collect();
        let element = self.unify_elements(&refs, hint);
        BoundExpression::new(BoundExpressionKind::List(elements), Type::list(element), range)
    }

    fn bind_map(&mut self, node: &MapExpression<'_>, range: TextRange, expected: Option<&Type>) -> BoundExpression {
        let hint = match expected {
            Some(Type::Map(value)) => Some(&**value),
            _ => None,
        };
        if node.entries.is_empty() {
            let Some(hint) = hint else {
                self.report(range, &messages::CANNOT_INFER_EMPTY_0_LITERAL, &["map"]);
                return BoundExpression::new(BoundExpressionKind::Map(Vec::new()), Type::Error, range);
            };
            return BoundExpression::new(BoundExpressionKind::Map(Vec::new()), Type::map(hint.clone()), range);
        }
        let mut entries = Vec::with_capacity(node.entries.len());
        for entry in node.entries.iter() {
            let key = self.bind_expression_expecting(entry.key, Some(&Type::String));
            if key.ty != Type::String && !key.ty.is_error() {
                self.report(key.range, &messages::MAP_KEY_MUST_BE_STRING_GOT_0, &[&key.ty.to_string()]);
            }
            let value = self.bind_expression_expecting(entry.value, hint);
            entries.push((key, value));
        }
        let values: Vec<&BoundExpression> = entries.iter().map(|(_, v)| v).collect();
        let value = self.unify_elements(&values, hint);
        BoundExpression::new(BoundExpressionKind::Map(entries), Type::map(value), range)
    }

    fn bind_index(&mut self, node: &IndexExpression<'_>, range: TextRange) -> BoundExpression {
        let target = self.bind_expression(node.target);
        let index = self.bind_expression(node.index);
        let ty = match (&target.ty, &index.ty) {
            (Type::Error, _) | (_, Type::Error) => Type::Error,
            (Type::List(element), Type::Int) => (**element).clone(),
            (Type::Map(value), Type::String) => (**value).clone(),
            (target_ty, index_ty) => {
                let args = [target_ty.to_string(), index_ty.to_string()];
                self.report(range, &messages::TYPE_0_CANNOT_BE_INDEXED_BY_1, &[&args[0], &args[1]]);
                Type::Error
            }
        };
        BoundExpression::new(
            BoundExpressionKind::Index {
                target: Box::new(target),
                index: Box::new(index),
            },
            ty,
            range,
        )
    }

    // ========================================================================
    // Control flow
    // ========================================================================

    fn bind_if(&mut self, node: &IfExpression<'_>, range: TextRange, expected: Option<&Type>) -> BoundExpression {
        let condition = self.bind_expression(node.condition);
        self.check_condition(&condition);
        let then_branch = self.bind_block(&node.then_branch);
        let else_branch = node
            .else_branch
            .map(|e| Box::new(self.bind_expression_expecting(e, expected)));

        let ty = match &else_branch {
            None => Type::Unit,
            Some(else_branch) => {
                let (then_ty, else_ty) = (&then_branch.ty, &else_branch.ty);
                if then_branch.diverges {
                    else_ty.clone()
                } else if else_branch.diverges() || else_ty.is_error() {
                    then_ty.clone()
                } else if then_ty.is_error() {
                    else_ty.clone()
                } else if then_ty.accepts(else_ty) {
                    then_ty.clone()
                } else {
                    let args = [then_ty.to_string(), else_ty.to_string()];
                    self.report(range, &messages::BRANCH_TYPES_0_AND_1_DIFFER, &[&args[0], &args[1]]);
                    Type::Error
                }
            }
        };
        BoundExpression::new(
            BoundExpressionKind::If {
                condition: Box::new(condition),
                then_branch,
                else_branch,
            },
            ty,
            range,
        )
    }

    fn bind_match(&mut self, node: &MatchExpression<'_>, range: TextRange, expected: Option<&Type>) -> BoundExpression {
        let scrutinee = self.bind_expression(node.scrutinee);
        let target = scrutinee.ty.clone();

        let mut arms = Vec::with_capacity(node.arms.len());
        let mut result: Option<Type> = None;
        let mut poisoned = false;
        let mut mismatched = false;
        for arm in node.arms.iter() {
            let previous = self.enter_scope(ScopeKind::MatchArm);
            let pattern = self.bind_pattern(&arm.pattern, &target);
            let hint = expected.cloned().or_else(|| result.clone());
            let body = self.bind_expression_expecting(arm.body, hint.as_ref());
            self.exit_scope(previous);

            if body.ty.is_error() {
                poisoned = true;
            } else if !body.diverges() {
                match &result {
                    None => result = Some(body.ty.clone()),
                    Some(first) if !first.accepts(&body.ty) => {
                        let args = [body.ty.to_string(), first.to_string()];
                        self.report(body.range, &messages::MATCH_ARM_TYPE_0_EXPECTED_1, &[&args[0], &args[1]]);
                        mismatched = true;
                    }
                    Some(_) => {}
                }
            }
            arms.push(BoundMatchArm {
                pattern,
                body,
                range: arm.data.range,
            });
        }

        let patterns: Vec<&BoundPattern> = arms.iter().map(|a| &a.pattern).collect();
        let issues = check_match(&target, &patterns, &self.registry, range);
        for issue in issues {
            let message = match issue.kind {
                MatchIssueKind::NonExhaustive => &messages::NON_EXHAUSTIVE_MATCH,
                MatchIssueKind::Unreachable => &messages::UNREACHABLE_MATCH_ARM,
                MatchIssueKind::Duplicate => &messages::DUPLICATE_MATCH_ARM,
            };
            self.report(issue.range, message, &[]);
        }

        let ty = match result {
            _ if mismatched => Type::Error,
            Some(ty) => ty,
            None if poisoned => Type::Error,
            None => Type::Unit,
        };
        BoundExpression::new(
            BoundExpressionKind::Match {
                scrutinee: Box::new(scrutinee),
                arms,
            },
            ty,
            range,
        )
    }
}
