use zen_bytecode::ExceptionHandlerSite;

use crate::ast::{AssignmentOperator, BinaryOperator, Component, Expr, Literal, Stmt};
use crate::test_utils::{compile_with, listing};

#[test]
fn if_without_else() {
    let file = compile_with(|b| {
        let c = b.name("c");
        let branch = b.if_stmt(c, vec![Stmt::Return(Some(Expr::int("1")))], None);
        let f = b.function("f", &["c"], vec![branch]);
        b.unit("Main", vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 load_a 0
    03 jump_eq0_i -> 08
    06 push_i1
    07 return_a
    08 return
    ");
}

#[test]
fn if_with_else() {
    let file = compile_with(|b| {
        let c = b.name("c");
        let branch = b.if_stmt(
            c,
            vec![Stmt::Return(Some(Expr::int("1")))],
            Some(vec![Stmt::Return(Some(Expr::int("2")))]),
        );
        let f = b.function("f", &["c"], vec![branch]);
        b.unit("Main", vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 load_a 0
    03 jump_eq0_i -> 11
    06 push_i1
    07 return_a
    08 jump -> 13
    11 push_i2
    12 return_a
    13 return
    ");
}

#[test]
fn while_tests_after_the_body() {
    let file = compile_with(|b| {
        let condition = b.name("n");
        let (target, left) = (b.name("n"), b.name("n"));
        let decrement = Expr::assign(
            target,
            AssignmentOperator::Assign,
            Expr::binary(BinaryOperator::Subtract, left, Expr::int("1")),
        );
        let lp = b.while_stmt(condition, vec![Stmt::Expression(decrement)]);
        let result = b.name("n");
        let f = b.function("f", &["n"], vec![lp, Stmt::Return(Some(result))]);
        b.unit("Main", vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 jump -> 14
    04 load_a 0
    06 push_i1
    07 invoke_virtual zen/core/Object.minusOperator (zen/core/Object):(zen/core/Object)
    10 dup
    11 store_a 0
    13 pop
    14 load_a 0
    16 jump_ne0_i -> 04
    19 load_a 0
    21 return_a
    22 return
    ");
    let code = file.entity.functions[0].instruction_attribute().unwrap();
    assert_eq!(code.max_stack_size, 2);
}

#[test]
fn try_with_one_handler() {
    let file = compile_with(|b| {
        let thrown = b.new_object("Exception");
        let caught = b.name("e");
        let handler = b.catch("Exception", "e", vec![Stmt::Return(Some(caught))]);
        let attempt = b.try_stmt(vec![Stmt::Throw(thrown)], vec![handler]);
        let f = b.function("f", &[], vec![attempt]);
        b.unit_with("Main", None, &["zen.core.Exception"], vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 new zen/core/Exception
    04 throw
    05 jump -> 13
    08 store_a 0
    10 load_a 0
    12 return_a
    13 return
    ");

    let code = file.entity.functions[0].instruction_attribute().unwrap();
    let [site] = &code.exception_table.sites[..] else {
        panic!("expected one handler site");
    };
    assert_eq!((site.start_pc, site.end_pc, site.handler_pc), (1, 5, 8));
    assert_eq!(
        file.constant_pool.class_name(site.catch_type),
        Some("zen/core/Exception")
    );
    assert_eq!(code.max_stack_size, 1);
}

#[test]
fn try_with_two_handlers() {
    let file = compile_with(|b| {
        let first = b.catch("Exception", "a", vec![]);
        let second = b.catch("Failure", "b", vec![]);
        let attempt = b.try_stmt(
            vec![Stmt::Throw(Expr::Literal(Literal::Null))],
            vec![first, second],
        );
        let f = b.function("f", &[], vec![attempt]);
        b.unit_with(
            "Main",
            None,
            &["zen.core.Exception", "app.Failure"],
            vec![Component::Function(f)],
        )
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 push_null
    02 throw
    03 jump -> 13
    06 store_a 0
    08 jump -> 13
    11 store_a 1
    13 return
    ");

    let code = file.entity.functions[0].instruction_attribute().unwrap();
    let sites: Vec<(u16, u16, u16, Option<&str>)> = code
        .exception_table
        .sites
        .iter()
        .map(|s: &ExceptionHandlerSite| {
            (
                s.start_pc,
                s.end_pc,
                s.handler_pc,
                file.constant_pool.class_name(s.catch_type),
            )
        })
        .collect();
    assert_eq!(
        sites,
        [
            (1, 3, 6, Some("zen/core/Exception")),
            (1, 3, 11, Some("app/Failure")),
        ]
    );
}

#[test]
fn nested_try_lists_inner_handler_first() {
    let file = compile_with(|b| {
        let inner_catch = b.catch("Failure", "inner", vec![]);
        let inner = b.try_stmt(
            vec![Stmt::Throw(Expr::Literal(Literal::Null))],
            vec![inner_catch],
        );
        let outer_catch = b.catch("Exception", "outer", vec![]);
        let outer = b.try_stmt(vec![inner], vec![outer_catch]);
        let f = b.function("f", &[], vec![outer]);
        b.unit_with(
            "Main",
            None,
            &["zen.core.Exception", "app.Failure"],
            vec![Component::Function(f)],
        )
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 push_null
    02 throw
    03 jump -> 08
    06 store_a 0
    08 jump -> 13
    11 store_a 1
    13 return
    ");

    let code = file.entity.functions[0].instruction_attribute().unwrap();
    let sites: Vec<(u16, u16, u16)> = code
        .exception_table
        .sites
        .iter()
        .map(|s| (s.start_pc, s.end_pc, s.handler_pc))
        .collect();
    assert_eq!(sites, [(1, 3, 6), (1, 8, 11)]);
}

#[test]
fn expression_statements_discard_their_value() {
    let file = compile_with(|b| {
        let x = b.name("x");
        let f = b.function("f", &["x"], vec![Stmt::Expression(x), Stmt::Return(None)]);
        b.unit("Main", vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 load_a 0
    03 pop
    04 return
    05 return
    ");
}
