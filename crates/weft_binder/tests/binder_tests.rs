//! Binder integration tests.
//!
//! Builds trees with `TreeBuilder`, binds them, and checks the diagnostics
//! and the bound program.

use weft_binder::{BindResult, Binder, BoundExpressionKind, BoundStatementKind, SymbolKind, Type};
use weft_core::SyntaxArena;
use weft_options::BinderOptions;
use weft_syntax::{BinaryOperator, Statement, TreeBuilder, UnaryOperator};

/// Helper: bind statements built with `b`.
fn bind<'a>(b: &TreeBuilder<'a>, statements: Vec<Statement<'a>>) -> BindResult {
    let tree = b.finish("test.weft", statements);
    Binder::new(b.interner().clone()).bind(&tree).unwrap()
}

/// Helper: diagnostic messages in report order.
fn messages(result: &BindResult) -> Vec<String> {
    result.diagnostics.iter().map(|d| d.message_text.clone()).collect()
}

fn assert_clean(result: &BindResult) {
    let messages = messages(result);
    assert!(messages.is_empty(), "unexpected diagnostics: {:?}", messages);
}

fn assert_single(result: &BindResult, needle: &str) {
    let messages = messages(result);
    assert_eq!(messages.len(), 1, "expected one diagnostic, got {:?}", messages);
    assert!(messages[0].contains(needle), "{:?} does not contain {:?}", messages[0], needle);
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

// ============================================================================
// Names and scopes
// ============================================================================

#[test]
fn test_poisoned_operand_reports_once() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.print(b.binary(BinaryOperator::Add, b.ident("x"), b.int(1)))];
    assert_single(&bind(&b, stmts), "Undefined variable 'x'.");
}

#[test]
fn test_poison_flows_through_variables() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt("a", b.binary(BinaryOperator::Add, b.ident("y"), b.int(1))),
        b.print(b.binary(BinaryOperator::Multiply, b.ident("a"), b.float(1.5))),
        b.print(b.unary(UnaryOperator::Not, b.ident("a"))),
    ];
    assert_single(&bind(&b, stmts), "Undefined variable 'y'.");
}

#[test]
fn test_duplicate_let_in_same_scope() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_stmt("x", b.int(1)), b.let_stmt("x", b.int(2))];
    assert_single(&bind(&b, stmts), "already declared in this scope");
}

#[test]
fn test_shadowing_resolves_innermost() {
    init_tracing();
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt("x", b.int(1)),
        b.block_stmt(vec![b.let_stmt("x", b.int(2)), b.print(b.ident("x"))]),
        b.print(b.ident("x")),
    ];
    let result = bind(&b, stmts);
    assert_clean(&result);

    let statements = &result.program.statements;
    let BoundStatementKind::Let { symbol: outer, .. } = &statements[0].kind else {
        panic!("expected let");
    };
    let BoundStatementKind::Block(block) = &statements[1].kind else {
        panic!("expected block");
    };
    let BoundStatementKind::Let { symbol: inner, .. } = &block.statements[0].kind else {
        panic!("expected inner let");
    };
    let BoundStatementKind::Print(inner_use) = &block.statements[1].kind else {
        panic!("expected inner print");
    };
    let BoundStatementKind::Print(outer_use) = &statements[2].kind else {
        panic!("expected outer print");
    };
    assert_ne!(outer, inner);
    assert!(matches!(inner_use.kind, BoundExpressionKind::Variable(id) if id == *inner));
    assert!(matches!(outer_use.kind, BoundExpressionKind::Variable(id) if id == *outer));
}

#[test]
fn test_let_initializer_sees_outer_binding() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt("x", b.int(1)),
        b.block_stmt(vec![b.let_stmt(
            "x",
            b.binary(BinaryOperator::Add, b.ident("x"), b.int(1)),
        )]),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_undefined_type_annotation() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_typed("x", b.ty("Foo"), b.int(1))];
    assert_single(&bind(&b, stmts), "Undefined type 'Foo'.");
}

#[test]
fn test_builtin_type_arity() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_typed("xs", b.ty("List"), b.list_of(vec![b.int(1)]))];
    assert_single(&bind(&b, stmts), "'List' expects 1 type argument(s) but was given 0.");
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_assignment_to_immutable() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_stmt("x", b.int(1)), b.assign("x", b.int(2))];
    assert_single(&bind(&b, stmts), "immutable");
}

#[test]
fn test_assignment_to_mutable() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_mut("x", b.int(1)), b.assign("x", b.int(2))];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_assignment_type_mismatch() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_mut("x", b.int(1)), b.assign("x", b.string("s"))];
    assert_single(
        &bind(&b, stmts),
        "Cannot assign expression of type 'String' to variable of type 'Int'.",
    );
}

#[test]
fn test_assignment_to_undefined() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.assign("y", b.int(1))];
    assert_single(&bind(&b, stmts), "Undefined variable 'y'.");
}

#[test]
fn test_annotated_let_mismatch() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.let_typed("x", b.ty("Float"), b.int(1))];
    assert_single(
        &bind(&b, stmts),
        "Cannot assign expression of type 'Int' to variable of type 'Float'.",
    );
}

#[test]
fn test_condition_must_be_bool() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.while_stmt(b.int(1), vec![])];
    assert_single(&bind(&b, stmts), "Condition must be of type 'Bool' but got 'Int'.");
}

#[test]
fn test_break_and_continue_outside_loop() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.break_stmt(), b.continue_stmt()];
    let result = bind(&b, stmts);
    assert_eq!(
        messages(&result),
        vec![
            "'break' can only be used inside a loop.",
            "'continue' can only be used inside a loop.",
        ]
    );
}

#[test]
fn test_break_inside_loop() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.while_stmt(b.bool(true), vec![b.break_stmt()])];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_lambda_body_resets_loop_depth() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let lambda = b.lambda(vec![], None, b.block_expr(vec![b.break_stmt()]));
    let stmts = vec![b.while_stmt(b.bool(true), vec![b.let_stmt("f", lambda)])];
    assert_single(&bind(&b, stmts), "'break' can only be used inside a loop.");
}

#[test]
fn test_return_outside_function() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.return_stmt(Some(b.int(1)))];
    assert_single(&bind(&b, stmts), "'return' can only be used inside a function.");
}

#[test]
fn test_for_over_list_and_map() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt("xs", b.list_of(vec![b.int(1), b.int(2)])),
        b.for_stmt("x", b.ident("xs"), vec![b.let_typed("y", b.ty("Int"), b.ident("x"))]),
        b.let_stmt("m", b.map_of(vec![(b.string("a"), b.bool(true))])),
        b.for_stmt(
            "entry",
            b.ident("m"),
            vec![b.let_typed("e", b.ty_tuple(vec![b.ty("String"), b.ty("Bool")]), b.ident("entry"))],
        ),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_for_over_non_iterable() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.for_stmt("x", b.int(5), vec![])];
    assert_single(&bind(&b, stmts), "Type 'Int' is not iterable.");
}

#[test]
fn test_nested_declaration_is_rejected() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let inner = b.function("g", vec![], None, vec![]);
    let stmts = vec![b.function("f", vec![], None, vec![inner])];
    assert_single(&bind(&b, stmts), "Function declarations are only allowed at the top level.");
}

// ============================================================================
// Operators
// ============================================================================

#[test]
fn test_no_implicit_numeric_conversion() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.print(b.binary(BinaryOperator::Add, b.int(1), b.float(2.0)))];
    assert_single(&bind(&b, stmts), "Operator '+' is not defined for types 'Int' and 'Float'.");
}

#[test]
fn test_logical_operators_require_bool() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.print(b.binary(BinaryOperator::And, b.bool(true), b.bool(false))),
        b.print(b.binary(BinaryOperator::Or, b.int(1), b.int(2))),
    ];
    assert_single(&bind(&b, stmts), "Operator '||' is not defined for types 'Int' and 'Int'.");
}

#[test]
fn test_comparison_and_string_operators() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_typed("a", b.ty("Bool"), b.binary(BinaryOperator::Less, b.float(1.0), b.float(2.0))),
        b.let_typed("s", b.ty("String"), b.binary(BinaryOperator::Add, b.string("a"), b.string("b"))),
        b.let_typed("e", b.ty("Bool"), b.binary(BinaryOperator::Equal, b.string("a"), b.string("b"))),
        b.let_typed("r", b.ty("Float"), b.binary(BinaryOperator::Remainder, b.float(5.0), b.float(2.0))),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_unary_operators() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.print(b.unary(UnaryOperator::Minus, b.float(1.0))),
        b.print(b.unary(UnaryOperator::Not, b.int(1))),
    ];
    assert_single(&bind(&b, stmts), "Operator '!' is not defined for type 'Int'.");
}

// ============================================================================
// Functions and calls
// ============================================================================

#[test]
fn test_return_type_inferred_from_return() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.function("f", vec![], None, vec![b.return_stmt(Some(b.int(1)))]),
        b.let_typed("x", b.ty("Int"), b.call("f", vec![])),
    ];
    let result = bind(&b, stmts);
    assert_clean(&result);
    let f = result.program.function("f").unwrap();
    let symbol = result.program.symbols.get(f.symbol).unwrap();
    let function = symbol.as_function().unwrap();
    assert_eq!(function.return_type, Type::Int);
    assert!(function.is_final);
}

#[test]
fn test_return_type_inferred_from_trailing_expression() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.function(
            "double",
            vec![b.param("n", b.ty("Int"))],
            None,
            vec![b.expr_stmt(b.binary(BinaryOperator::Multiply, b.ident("n"), b.int(2)))],
        ),
        b.let_typed("x", b.ty("Int"), b.call("double", vec![b.int(4)])),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_function_without_value_returns_unit() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.function("log", vec![], None, vec![b.print(b.int(1))]),
        b.let_typed("u", b.ty("Unit"), b.call("log", vec![])),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_inconsistent_return_types() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let body = vec![
        b.expr_stmt(b.if_expr(b.ident("c"), vec![b.return_stmt(Some(b.int(1)))], None)),
        b.return_stmt(Some(b.string("oops"))),
    ];
    let stmts = vec![b.function("f", vec![b.param("c", b.ty("Bool"))], None, body)];
    assert_single(&bind(&b, stmts), "Function 'f' has inconsistent return types.");
}

#[test]
fn test_declared_return_type_mismatch() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.function("f", vec![], Some(b.ty("Int")), vec![b.return_stmt(Some(b.string("a")))])];
    assert_single(&bind(&b, stmts), "Function 'f' returns 'String' but is declared to return 'Int'.");
}

#[test]
fn test_forward_and_mutual_calls() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let even_body = vec![b.expr_stmt(b.if_expr(
        b.binary(BinaryOperator::Equal, b.ident("n"), b.int(0)),
        vec![b.expr_stmt(b.bool(true))],
        Some(b.block_expr(vec![b.expr_stmt(b.call(
            "is_odd",
            vec![b.binary(BinaryOperator::Subtract, b.ident("n"), b.int(1))],
        ))])),
    ))];
    let odd_body = vec![b.expr_stmt(b.if_expr(
        b.binary(BinaryOperator::Equal, b.ident("n"), b.int(0)),
        vec![b.expr_stmt(b.bool(false))],
        Some(b.block_expr(vec![b.expr_stmt(b.call(
            "is_even",
            vec![b.binary(BinaryOperator::Subtract, b.ident("n"), b.int(1))],
        ))])),
    ))];
    let stmts = vec![
        b.print(b.call("is_even", vec![b.int(4)])),
        b.function("is_even", vec![b.param("n", b.ty("Int"))], Some(b.ty("Bool")), even_body),
        b.function("is_odd", vec![b.param("n", b.ty("Int"))], Some(b.ty("Bool")), odd_body),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_duplicate_function() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.function("f", vec![], None, vec![]),
        b.function("f", vec![], None, vec![]),
    ];
    assert_single(&bind(&b, stmts), "'f' is already declared in this scope.");
}

#[test]
fn test_argument_checks() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.function("f", vec![b.param("x", b.ty("Int"))], Some(b.ty("Int")), vec![b.expr_stmt(b.ident("x"))]),
        b.print(b.call("f", vec![b.string("a")])),
        b.print(b.call("f", vec![])),
        b.print(b.call("g", vec![])),
    ];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec![
            "Argument 1 of 'f' expects type 'Int' but got 'String'.",
            "'f' expects 1 argument(s) but was given 0.",
            "Undefined function 'g'.",
        ]
    );
}

#[test]
fn test_builtin_overloads() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_typed("a", b.ty("Float"), b.call("abs", vec![b.float(-1.5)])),
        b.let_typed("m", b.ty("Int"), b.call("max", vec![b.int(1), b.int(2)])),
        b.let_typed("n", b.ty("Int"), b.call("len", vec![b.string("abc")])),
        b.let_typed("s", b.ty("String"), b.call("to_string", vec![b.int(3)])),
        b.print(b.call("min", vec![b.int(1), b.float(2.0)])),
        b.print(b.call("abs", vec![])),
    ];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec![
            "No overload of 'min' accepts arguments of type(s) 'Int, Float'.",
            "'abs' expects 1 argument(s) but was given 0.",
        ]
    );
}

#[test]
fn test_generic_function_inference() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_function(
            "id",
            &["T"],
            vec![b.param("x", b.ty("T"))],
            Some(b.ty("T")),
            vec![b.expr_stmt(b.ident("x"))],
        ),
        b.let_typed("n", b.ty("Int"), b.call("id", vec![b.int(1)])),
        b.let_typed("s", b.ty("String"), b.call("id", vec![b.string("a")])),
        b.let_typed("f", b.ty("Float"), b.call_with_types("id", vec![b.ty("Float")], vec![b.float(1.0)])),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_generic_function_type_argument_arity() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_function(
            "id",
            &["T"],
            vec![b.param("x", b.ty("T"))],
            Some(b.ty("T")),
            vec![b.expr_stmt(b.ident("x"))],
        ),
        b.print(b.call_with_types("id", vec![b.ty("Int"), b.ty("String")], vec![b.int(1)])),
    ];
    assert_single(&bind(&b, stmts), "'id' expects 1 type argument(s) but was given 2.");
}

#[test]
fn test_explicit_type_argument_checks_argument() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_function(
            "id",
            &["T"],
            vec![b.param("x", b.ty("T"))],
            Some(b.ty("T")),
            vec![b.expr_stmt(b.ident("x"))],
        ),
        b.print(b.call_with_types("id", vec![b.ty("Int")], vec![b.string("a")])),
    ];
    assert_single(&bind(&b, stmts), "Argument 1 of 'id' expects type 'Int' but got 'String'.");
}

#[test]
fn test_type_parameter_is_only_itself_inside_body() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.generic_function(
        "f",
        &["T"],
        vec![b.param("a", b.ty("T"))],
        Some(b.ty("T")),
        vec![b.let_typed("s", b.ty("String"), b.ident("a")), b.expr_stmt(b.ident("a"))],
    )];
    assert_single(
        &bind(&b, stmts),
        "Cannot assign expression of type 'T' to variable of type 'String'.",
    );
}

#[test]
fn test_type_parameter_does_not_satisfy_concrete_return() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_function(
            "f",
            &["T"],
            vec![b.param("a", b.ty("T"))],
            Some(b.ty("Int")),
            vec![b.expr_stmt(b.ident("a"))],
        ),
        b.print(b.binary(BinaryOperator::Add, b.call("f", vec![b.bool(true)]), b.int(1))),
    ];
    assert_single(&bind(&b, stmts), "Function 'f' returns 'T' but is declared to return 'Int'.");
}

#[test]
fn test_shared_type_parameter_infers_first_wins() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_function(
            "pair",
            &["T"],
            vec![b.param("a", b.ty("T")), b.param("c", b.ty("T"))],
            Some(b.ty("T")),
            vec![b.expr_stmt(b.ident("a"))],
        ),
        b.let_stmt("p", b.call("pair", vec![b.int(1), b.string("x")])),
    ];
    let result = bind(&b, stmts);
    assert_clean(&result);
    let BoundStatementKind::Let { initializer, .. } = &result.program.statements[0].kind else {
        panic!("expected let");
    };
    assert_eq!(initializer.ty, Type::Int);
}

#[test]
fn test_generic_argument_structure_is_checked() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_function(
            "first",
            &["T"],
            vec![b.param("xs", b.ty_of("List", vec![b.ty("T")]))],
            Some(b.ty("T")),
            vec![b.expr_stmt(b.index(b.ident("xs"), b.int(0)))],
        ),
        b.let_typed("n", b.ty("Int"), b.call("first", vec![b.list_of(vec![b.int(1)])])),
        b.print(b.call("first", vec![b.int(1)])),
    ];
    assert_single(&bind(&b, stmts), "Argument 1 of 'first' expects type 'List<T>' but got 'Int'.");
}

#[test]
fn test_duplicate_type_parameter() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.generic_function(
        "f",
        &["T", "T"],
        vec![b.param("a", b.ty("T"))],
        Some(b.ty("T")),
        vec![b.expr_stmt(b.ident("a"))],
    )];
    assert_single(&bind(&b, stmts), "'T' is already declared in this scope.");
}

// ============================================================================
// Lambdas and captures
// ============================================================================

#[test]
fn test_capture_of_mutable_variable() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let lambda = b.lambda(
        vec![b.param("y", b.ty("Int"))],
        None,
        b.binary(BinaryOperator::Add, b.ident("x"), b.ident("y")),
    );
    let stmts = vec![b.let_mut("x", b.int(1)), b.let_stmt("f", lambda)];
    assert_single(&bind(&b, stmts), "Cannot capture mutable variable 'x' in lambda.");
}

#[test]
fn test_capture_of_immutable_variable() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let lambda = b.lambda(
        vec![b.param("y", b.ty("Int"))],
        None,
        b.binary(BinaryOperator::Add, b.ident("x"), b.ident("y")),
    );
    let stmts = vec![b.let_stmt("x", b.int(1)), b.let_stmt("f", lambda)];
    let result = bind(&b, stmts);
    assert_clean(&result);

    let BoundStatementKind::Let { symbol: x, .. } = &result.program.statements[0].kind else {
        panic!("expected let");
    };
    let BoundStatementKind::Let { initializer, .. } = &result.program.statements[1].kind else {
        panic!("expected let");
    };
    let BoundExpressionKind::Lambda(lambda) = &initializer.kind else {
        panic!("expected lambda");
    };
    assert_eq!(lambda.captures, vec![*x]);
    assert_eq!(initializer.ty, Type::function(vec![Type::Int], Type::Int));
}

#[test]
fn test_nested_lambdas_both_capture() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let inner = b.lambda(vec![], None, b.ident("x"));
    let outer = b.lambda(vec![], None, inner);
    let stmts = vec![b.let_stmt("x", b.int(1)), b.let_stmt("f", outer)];
    let result = bind(&b, stmts);
    assert_clean(&result);

    let BoundStatementKind::Let { initializer, .. } = &result.program.statements[1].kind else {
        panic!("expected let");
    };
    let BoundExpressionKind::Lambda(outer) = &initializer.kind else {
        panic!("expected lambda");
    };
    let BoundExpressionKind::Lambda(inner) = &outer.body.kind else {
        panic!("expected inner lambda");
    };
    assert_eq!(outer.captures.len(), 1);
    assert_eq!(inner.captures, outer.captures);
}

#[test]
fn test_lambda_locals_are_not_captures() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let body = b.block_expr(vec![
        b.let_mut("a", b.int(1)),
        b.assign("a", b.ident("y")),
        b.expr_stmt(b.ident("a")),
    ]);
    let stmts = vec![b.let_stmt("f", b.lambda(vec![b.param("y", b.ty("Int"))], None, body))];
    let result = bind(&b, stmts);
    assert_clean(&result);
    let BoundStatementKind::Let { initializer, .. } = &result.program.statements[0].kind else {
        panic!("expected let");
    };
    let BoundExpressionKind::Lambda(lambda) = &initializer.kind else {
        panic!("expected lambda");
    };
    assert!(lambda.captures.is_empty());
}

#[test]
fn test_calling_lambda_values() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt(
            "inc",
            b.lambda(
                vec![b.param("x", b.ty("Int"))],
                None,
                b.binary(BinaryOperator::Add, b.ident("x"), b.int(1)),
            ),
        ),
        b.let_typed("n", b.ty("Int"), b.call("inc", vec![b.int(2)])),
        b.let_typed(
            "g",
            b.ty_fn(vec![b.ty("Int")], b.ty("Int")),
            b.ident("inc"),
        ),
        b.let_stmt("z", b.int(1)),
        b.print(b.call("z", vec![b.int(2)])),
    ];
    assert_single(&bind(&b, stmts), "Expression of type 'Int' is not callable.");
}

#[test]
fn test_function_as_value() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.function("twice", vec![b.param("n", b.ty("Int"))], Some(b.ty("Int")), vec![b.expr_stmt(
            b.binary(BinaryOperator::Multiply, b.ident("n"), b.int(2)),
        )]),
        b.let_typed("f", b.ty_fn(vec![b.ty("Int")], b.ty("Int")), b.ident("twice")),
        b.let_typed("n", b.ty("Int"), b.call_value(b.ident("f"), vec![b.int(3)])),
    ];
    assert_clean(&bind(&b, stmts));
}

// ============================================================================
// Records
// ============================================================================

fn user_decl<'a>(b: &TreeBuilder<'a>) -> Statement<'a> {
    b.record_decl("User", vec![("name", b.ty("String")), ("age", b.ty("Int"))])
}

#[test]
fn test_record_literal_and_field_access() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        user_decl(&b),
        b.let_stmt("u", b.record("User", vec![("name", b.string("a")), ("age", b.int(3))])),
        b.let_typed("n", b.ty("Int"), b.field(b.ident("u"), "age")),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_record_missing_field() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![user_decl(&b), b.print(b.record("User", vec![("name", b.string("a"))]))];
    let result = bind(&b, stmts);
    assert_single(&result, "is missing required field");
    assert!(messages(&result)[0].contains("'age'"));
}

#[test]
fn test_record_unknown_field() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        user_decl(&b),
        b.print(b.record(
            "User",
            vec![("name", b.string("a")), ("age", b.int(3)), ("active", b.bool(true))],
        )),
    ];
    let result = bind(&b, stmts);
    assert_single(&result, "has no field");
    assert!(messages(&result)[0].contains("'active'"));
}

#[test]
fn test_record_duplicate_and_mistyped_fields() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        user_decl(&b),
        b.print(b.record(
            "User",
            vec![("name", b.string("a")), ("name", b.string("b")), ("age", b.string("old"))],
        )),
    ];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec![
            "Field 'name' is already initialized.",
            "Field 'age' expects type 'Int' but got 'String'.",
        ]
    );
}

#[test]
fn test_field_access_errors() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        user_decl(&b),
        b.let_stmt("u", b.record("User", vec![("name", b.string("a")), ("age", b.int(3))])),
        b.print(b.field(b.ident("u"), "email")),
        b.print(b.field(b.int(1), "age")),
    ];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec!["Type 'User' has no field 'email'.", "Type 'Int' is not a record type."]
    );
}

#[test]
fn test_generic_record_inference() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_record("Box", &["T"], vec![("value", b.ty("T"))]),
        b.let_stmt("bx", b.record("Box", vec![("value", b.int(1))])),
        b.let_typed("n", b.ty("Int"), b.field(b.ident("bx"), "value")),
        b.let_typed("bs", b.ty_of("Box", vec![b.ty("String")]), b.record("Box", vec![("value", b.string("s"))])),
    ];
    let result = bind(&b, stmts);
    assert_clean(&result);
    let BoundStatementKind::Let { initializer, .. } = &result.program.statements[0].kind else {
        panic!("expected let");
    };
    assert_eq!(initializer.ty, Type::record("Box", vec![Type::Int]));
}

#[test]
fn test_records_reference_later_types() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.record_decl("Tree", vec![("root", b.ty("Node"))]),
        b.record_decl("Node", vec![("value", b.ty("Int")), ("color", b.ty("Color"))]),
        b.sum_decl("Color", vec![("Red", None), ("Black", None)]),
    ];
    let result = bind(&b, stmts);
    assert_clean(&result);
    assert_eq!(result.program.records.len(), 2);
    assert_eq!(result.program.sums.len(), 1);
}

#[test]
fn test_duplicate_record_field() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.record_decl("P", vec![("x", b.ty("Int")), ("x", b.ty("String"))])];
    assert_single(&bind(&b, stmts), "'x' is already declared in this scope.");
}

#[test]
fn test_duplicate_type_names() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![user_decl(&b), b.sum_decl("User", vec![("Guest", None)])];
    let result = bind(&b, stmts);
    assert_single(&result, "'User' is already declared in this scope.");
    assert_eq!(result.program.sums.len(), 0);
}

// ============================================================================
// Sums and match
// ============================================================================

fn result_decl<'a>(b: &TreeBuilder<'a>) -> Statement<'a> {
    b.sum_decl("Result", vec![("Ok", Some(b.ty("Int"))), ("Error", Some(b.ty("String")))])
}

#[test]
fn test_sum_match_non_exhaustive() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(b.ident("v"), vec![b.arm(b.pat_variant("Ok", Some(b.pat_ident("x"))), b.ident("x"))]);
    let stmts = vec![result_decl(&b), b.let_stmt("v", b.call("Ok", vec![b.int(1)])), b.print(m)];
    assert_single(&bind(&b, stmts), "Non-exhaustive match expression.");
}

#[test]
fn test_sum_match_exhaustive() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("v"),
        vec![
            b.arm(b.pat_variant("Ok", Some(b.pat_ident("x"))), b.ident("x")),
            b.arm(b.pat_variant("Error", Some(b.pat_wildcard())), b.int(0)),
        ],
    );
    let stmts = vec![result_decl(&b), b.let_stmt("v", b.call("Ok", vec![b.int(1)])), b.let_typed("n", b.ty("Int"), m)];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_sum_match_unreachable_after_wildcard() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("v"),
        vec![
            b.arm(b.pat_variant("Ok", Some(b.pat_ident("x"))), b.ident("x")),
            b.arm(b.pat_wildcard(), b.int(0)),
            b.arm(b.pat_variant("Ok", Some(b.pat_wildcard())), b.int(1)),
        ],
    );
    let stmts = vec![result_decl(&b), b.let_stmt("v", b.call("Ok", vec![b.int(1)])), b.print(m)];
    assert_single(&bind(&b, stmts), "Unreachable match arm.");
}

#[test]
fn test_sum_match_duplicate_variant() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("v"),
        vec![
            b.arm(b.pat_variant("Ok", Some(b.pat_wildcard())), b.int(0)),
            b.arm(b.pat_variant("Ok", Some(b.pat_wildcard())), b.int(1)),
            b.arm(b.pat_variant("Error", Some(b.pat_wildcard())), b.int(2)),
        ],
    );
    let stmts = vec![result_decl(&b), b.let_stmt("v", b.call("Ok", vec![b.int(1)])), b.print(m)];
    assert_single(&bind(&b, stmts), "Duplicate match arm.");
}

#[test]
fn test_bare_payload_variant_name_is_not_catch_all() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("v"),
        vec![
            b.arm(b.pat_ident("Ok"), b.int(1)),
            b.arm(b.pat_variant("Error", Some(b.pat_wildcard())), b.int(0)),
        ],
    );
    let stmts = vec![result_decl(&b), b.let_stmt("v", b.call("Ok", vec![b.int(1)])), b.print(m)];
    assert_single(&bind(&b, stmts), "Non-exhaustive match expression.");
}

#[test]
fn test_unit_variant_patterns_and_values() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("o"),
        vec![
            b.arm(b.pat_variant("Some", Some(b.pat_ident("x"))), b.ident("x")),
            b.arm(b.pat_ident("None"), b.int(0)),
        ],
    );
    let stmts = vec![
        b.sum_decl("Opt", vec![("Some", Some(b.ty("Int"))), ("None", None)]),
        b.let_typed("o", b.ty("Opt"), b.ident("None")),
        b.let_typed("n", b.ty("Int"), m),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_variant_construction_errors() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.sum_decl("Opt", vec![("Some", Some(b.ty("Int"))), ("None", None)]),
        b.print(b.call("Some", vec![])),
        b.print(b.call("None", vec![b.int(1)])),
        b.print(b.call("Some", vec![b.string("a")])),
        b.print(b.ident("Some")),
    ];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec![
            "Variant 'Some' requires a payload of type 'Int'.",
            "Variant 'None' does not take a payload.",
            "Variant 'Some' expects a payload of type 'Int' but got 'String'.",
            "Variant 'Some' requires a payload of type 'Int'.",
        ]
    );
}

#[test]
fn test_unknown_variant_pattern() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("o"),
        vec![
            b.arm(b.pat_variant("Circle", Some(b.pat_ident("r"))), b.int(1)),
            b.arm(b.pat_wildcard(), b.int(0)),
        ],
    );
    let stmts = vec![
        b.sum_decl("Opt", vec![("Some", Some(b.ty("Int"))), ("None", None)]),
        b.let_typed("o", b.ty("Opt"), b.ident("None")),
        b.print(m),
    ];
    assert_single(&bind(&b, stmts), "Type 'Opt' has no variant 'Circle'.");
}

#[test]
fn test_variant_declared_by_two_sums() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.sum_decl("A", vec![("X", None)]),
        b.sum_decl("B", vec![("X", None), ("Y", None)]),
    ];
    assert_single(&bind(&b, stmts), "Variant 'X' is already declared by type 'A'.");
}

#[test]
fn test_duplicate_variant_in_one_sum() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.sum_decl("Color", vec![("Red", None), ("Red", None)])];
    assert_single(&bind(&b, stmts), "'Red' is already declared in this scope.");
}

#[test]
fn test_uninferred_type_argument_stays_open() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_sum("Maybe", &["T"], vec![("Just", Some(b.ty("T"))), ("Nothing", None)]),
        b.let_stmt("m", b.ident("Nothing")),
        b.let_typed("n", b.ty_of("Maybe", vec![b.ty("Int")]), b.ident("m")),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_generic_sum_construction() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.generic_sum("Maybe", &["T"], vec![("Just", Some(b.ty("T"))), ("Nothing", None)]),
        b.let_stmt("m", b.call("Just", vec![b.string("a")])),
        b.let_typed("n", b.ty_of("Maybe", vec![b.ty("Int")]), b.ident("Nothing")),
    ];
    let result = bind(&b, stmts);
    assert_clean(&result);
    let BoundStatementKind::Let { initializer, .. } = &result.program.statements[0].kind else {
        panic!("expected let");
    };
    assert_eq!(initializer.ty, Type::sum("Maybe", vec![Type::String]));
}

#[test]
fn test_bool_match_exhaustiveness() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let partial = b.match_expr(b.ident("c"), vec![b.arm(b.pat_bool(true), b.int(1))]);
    let full = b.match_expr(
        b.ident("c"),
        vec![b.arm(b.pat_bool(true), b.int(1)), b.arm(b.pat_bool(false), b.int(2))],
    );
    let stmts = vec![b.let_stmt("c", b.bool(true)), b.print(partial), b.print(full)];
    assert_single(&bind(&b, stmts), "Non-exhaustive match expression.");
}

#[test]
fn test_literal_match_needs_catch_all() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let without = b.match_expr(
        b.ident("n"),
        vec![b.arm(b.pat_int(1), b.int(1)), b.arm(b.pat_int(2), b.int(2))],
    );
    let duplicate = b.match_expr(
        b.ident("n"),
        vec![
            b.arm(b.pat_int(1), b.int(1)),
            b.arm(b.pat_int(1), b.int(2)),
            b.arm(b.pat_ident("other"), b.ident("other")),
        ],
    );
    let stmts = vec![b.let_stmt("n", b.int(1)), b.print(without), b.print(duplicate)];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec!["Non-exhaustive match expression.", "Duplicate match arm."]
    );
}

#[test]
fn test_match_pattern_and_arm_type_errors() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("n"),
        vec![
            b.arm(b.pat_string("a"), b.int(1)),
            b.arm(b.pat_int(2), b.string("two")),
            b.arm(b.pat_wildcard(), b.int(0)),
        ],
    );
    let stmts = vec![b.let_stmt("n", b.int(1)), b.print(m)];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec![
            "Pattern of type 'String' cannot match a value of type 'Int'.",
            "Match arm has type 'String' but previous arms have type 'Int'.",
        ]
    );
}

#[test]
fn test_match_arm_mismatch_reports_once() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("flag"),
        vec![b.arm(b.pat_bool(true), b.string("a")), b.arm(b.pat_bool(false), b.int(1))],
    );
    let stmts = vec![b.let_stmt("flag", b.bool(true)), b.let_typed("x", b.ty("Int"), m)];
    assert_single(&bind(&b, stmts), "Match arm has type 'Int' but previous arms have type 'String'.");
}

#[test]
fn test_tuple_patterns() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let good = b.match_expr(
        b.ident("p"),
        vec![b.arm(
            b.pat_tuple(vec![b.pat_ident("a"), b.pat_wildcard()]),
            b.ident("a"),
        )],
    );
    let bad = b.match_expr(
        b.ident("p"),
        vec![b.arm(b.pat_tuple(vec![b.pat_wildcard()]), b.int(0))],
    );
    let stmts = vec![
        b.let_stmt("p", b.tuple(vec![b.int(1), b.string("x")])),
        b.let_typed("n", b.ty("Int"), good),
        b.print(bad),
    ];
    assert_single(&bind(&b, stmts), "Tuple pattern has 1 element(s) but the matched type has 2.");
}

#[test]
fn test_match_on_error_is_silent() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(b.ident("missing"), vec![b.arm(b.pat_int(1), b.int(1))]);
    let stmts = vec![b.print(m)];
    assert_single(&bind(&b, stmts), "Undefined variable 'missing'.");
}

// ============================================================================
// Control flow expressions
// ============================================================================

#[test]
fn test_if_branch_types() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_typed(
            "a",
            b.ty("Int"),
            b.if_expr(b.bool(true), vec![b.expr_stmt(b.int(1))], Some(b.block_expr(vec![b.expr_stmt(b.int(2))]))),
        ),
        b.print(b.if_expr(
            b.bool(true),
            vec![b.expr_stmt(b.int(1))],
            Some(b.block_expr(vec![b.expr_stmt(b.string("a"))])),
        )),
    ];
    assert_single(&bind(&b, stmts), "If branches have incompatible types 'Int' and 'String'.");
}

#[test]
fn test_diverging_branch_adopts_other_type() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let body = vec![
        b.let_stmt(
            "v",
            b.if_expr(
                b.ident("c"),
                vec![b.return_stmt(Some(b.int(0)))],
                Some(b.block_expr(vec![b.expr_stmt(b.int(1))])),
            ),
        ),
        b.expr_stmt(b.ident("v")),
    ];
    let stmts = vec![b.function("f", vec![b.param("c", b.ty("Bool"))], Some(b.ty("Int")), body)];
    assert_clean(&bind(&b, stmts));
}

// ============================================================================
// Collections
// ============================================================================

#[test]
fn test_list_literals() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_typed("xs", b.ty_of("List", vec![b.ty("Int")]), b.list_of(vec![])),
        b.let_stmt("ys", b.list_of(vec![])),
        b.let_stmt("zs", b.list_of(vec![b.int(1), b.string("a")])),
    ];
    assert_eq!(
        messages(&bind(&b, stmts)),
        vec![
            "Cannot infer the element type of an empty list literal.",
            "Element has type 'String' but expected 'Int'.",
        ]
    );
}

#[test]
fn test_map_literals_and_indexing() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt("m", b.map_of(vec![(b.string("a"), b.int(1))])),
        b.let_typed("v", b.ty("Int"), b.index(b.ident("m"), b.string("a"))),
        b.let_typed("e", b.ty_of("Map", vec![b.ty("Bool")]), b.map_of(vec![])),
        b.print(b.map_of(vec![(b.int(1), b.int(2))])),
        b.print(b.index(b.ident("m"), b.int(0))),
    ];
    let result = bind(&b, stmts);
    let messages = messages(&result);
    assert_eq!(messages.len(), 2, "{:?}", messages);
    assert!(messages[0].contains("Map key"));
    assert_eq!(messages[1], "Type 'Map<Int>' cannot be indexed by 'Int'.");
}

#[test]
fn test_list_indexing() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![
        b.let_stmt("xs", b.list_of(vec![b.string("a")])),
        b.let_typed("s", b.ty("String"), b.index(b.ident("xs"), b.int(0))),
    ];
    assert_clean(&bind(&b, stmts));
}

// ============================================================================
// Concurrency primitives
// ============================================================================

#[test]
fn test_spawn_requires_scope() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.print(b.spawn(vec![b.expr_stmt(b.int(1))]))];
    assert_single(&bind(&b, stmts), "'spawn' can only be used inside a 'scope' block.");
}

#[test]
fn test_spawn_and_join_inside_scope() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let scope = b.scope(vec![
        b.let_stmt("t", b.spawn(vec![b.expr_stmt(b.int(1))])),
        b.expr_stmt(b.call("join", vec![b.ident("t")])),
    ]);
    let stmts = vec![b.let_typed("r", b.ty("Int"), scope)];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_channel_send_and_recv() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("ch"),
        vec![b.arm(
            b.pat_tuple(vec![b.pat_ident("tx"), b.pat_ident("rx")]),
            b.block_expr(vec![
                b.expr_stmt(b.call("send", vec![b.ident("tx"), b.int(1)])),
                b.expr_stmt(b.call("recv", vec![b.ident("rx")])),
            ]),
        )],
    );
    let stmts = vec![
        b.let_stmt("ch", b.channel(b.ty("Int"))),
        b.let_typed("n", b.ty("Int"), m),
        b.let_typed("p", b.ty("Int"), b.par(b.int(2))),
    ];
    assert_clean(&bind(&b, stmts));
}

#[test]
fn test_send_wrong_element_type() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let m = b.match_expr(
        b.ident("ch"),
        vec![b.arm(
            b.pat_tuple(vec![b.pat_ident("tx"), b.pat_wildcard()]),
            b.call("send", vec![b.ident("tx"), b.string("a")]),
        )],
    );
    let stmts = vec![b.let_stmt("ch", b.channel(b.ty("Int"))), b.print(m)];
    assert_single(&bind(&b, stmts), "No overload of 'send'");
}

// ============================================================================
// Session behavior
// ============================================================================

#[test]
fn test_binding_twice_is_deterministic() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let tree = b.finish(
        "test.weft",
        vec![
            user_decl(&b),
            b.let_stmt("u", b.record("User", vec![("name", b.string("a"))])),
            b.print(b.ident("missing")),
        ],
    );
    let mut binder = Binder::new(b.interner().clone());
    let first = binder.bind(&tree).unwrap();
    let second = binder.bind(&tree).unwrap();
    assert_eq!(first.diagnostics, second.diagnostics);
    assert_eq!(first.program.symbols.len(), second.program.symbols.len());
    assert_eq!(first.program.statements.len(), second.program.statements.len());
}

#[test]
fn test_max_diagnostics_truncates() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let tree = b.finish(
        "test.weft",
        vec![b.print(b.ident("a")), b.print(b.ident("b")), b.print(b.ident("c"))],
    );
    let options = BinderOptions {
        max_diagnostics: Some(2),
        ..BinderOptions::default()
    };
    let result = Binder::with_options(b.interner().clone(), options).bind(&tree).unwrap();
    assert_eq!(
        messages(&result),
        vec!["Undefined variable 'a'.", "Undefined variable 'b'."]
    );
}

#[test]
fn test_diagnostic_positions_follow_source_text() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    // Builder ranges are sequential one-byte slots, so the third node starts
    // at offset 2: the first byte of the second line.
    let zero = b.int(0);
    let one = b.int(1);
    let missing = b.ident("missing");
    let tree = b.finish_with_text(
        "test.weft",
        "0\nmissing\n",
        vec![b.expr_stmt(zero), b.expr_stmt(one), b.print(missing)],
    );
    let result = Binder::new(b.interner().clone()).bind(&tree).unwrap();
    let diagnostic = &result.diagnostics.diagnostics()[0];
    assert_eq!(diagnostic.file.as_deref(), Some("test.weft"));
    assert_eq!(diagnostic.line(), Some(2));
    assert_eq!(diagnostic.column(), Some(1));
}

#[test]
fn test_parameters_are_recorded() {
    let arena = SyntaxArena::new();
    let b = TreeBuilder::new(&arena);
    let stmts = vec![b.function(
        "f",
        vec![b.param("a", b.ty("Int")), b.param("b", b.ty("String"))],
        None,
        vec![],
    )];
    let result = bind(&b, stmts);
    assert_clean(&result);
    let f = result.program.function("f").unwrap();
    assert_eq!(f.parameters.len(), 2);
    let a = result.program.symbols.get(f.parameters[0]).unwrap();
    assert!(matches!(a.kind, SymbolKind::Parameter));
    assert_eq!(a.ty, Type::Int);
}
