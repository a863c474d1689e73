use crate::ast::{Component, Expr, Stmt};
use crate::emit::EmitError;
use crate::generate::{FloatLiteral, IntegerLiteral, parse_float, parse_integer};
use crate::test_utils::{compile_with, listing};

fn reason(text: &str) -> &'static str {
    match parse_integer(text) {
        Err(EmitError::InvalidLiteral { reason, .. }) => reason,
        other => panic!("expected an invalid literal, got {other:?}"),
    }
}

#[test]
fn decimal_integers() {
    assert_eq!(parse_integer("0"), Ok(IntegerLiteral::Int(0)));
    assert_eq!(parse_integer("1_000"), Ok(IntegerLiteral::Int(1000)));
    assert_eq!(parse_integer("2147483647"), Ok(IntegerLiteral::Int(i32::MAX)));
    assert_eq!(reason("2147483648"), "out of range for int");
}

#[test]
fn prefixed_integers_keep_their_bits() {
    assert_eq!(parse_integer("0xff"), Ok(IntegerLiteral::Int(255)));
    assert_eq!(parse_integer("0b101"), Ok(IntegerLiteral::Int(5)));
    assert_eq!(parse_integer("0c17"), Ok(IntegerLiteral::Int(15)));
    assert_eq!(parse_integer("0xFFFFFFFF"), Ok(IntegerLiteral::Int(-1)));
    assert_eq!(reason("0x1_0000_0000"), "out of range for int");
}

#[test]
fn long_suffix() {
    assert_eq!(parse_integer("7L"), Ok(IntegerLiteral::Long(7)));
    assert_eq!(parse_integer("4294967296l"), Ok(IntegerLiteral::Long(1 << 32)));
    assert_eq!(
        parse_integer("0xFFFFFFFFFFFFFFFFL"),
        Ok(IntegerLiteral::Long(-1))
    );
    assert_eq!(reason("9223372036854775808L"), "out of range for long");
}

#[test]
fn malformed_integers() {
    assert_eq!(reason("0x"), "missing digits");
    assert_eq!(reason("0b102"), "malformed digits");
    assert_eq!(reason("99999999999999999999999"), "out of range");
}

#[test]
fn floats_and_doubles() {
    assert_eq!(parse_float("1.5f"), Ok(FloatLiteral::Float(1.5)));
    assert_eq!(parse_float("2.25"), Ok(FloatLiteral::Double(2.25)));
    assert_eq!(parse_float("1_0.5d"), Ok(FloatLiteral::Double(10.5)));
    assert!(matches!(
        parse_float("1.2.3"),
        Err(EmitError::InvalidLiteral { reason: "malformed double", .. })
    ));
}

fn expression_statements(literals: &[&str]) -> String {
    let literals: Vec<Expr> = literals
        .iter()
        .map(|text| match *text {
            "true" => Expr::Literal(crate::ast::Literal::True),
            "null" => Expr::Literal(crate::ast::Literal::Null),
            t if t.starts_with('"') => Expr::string(&t[1..t.len() - 1]),
            t if t.contains('.') => Expr::float(t),
            t => Expr::int(t),
        })
        .collect();
    let file = compile_with(|b| {
        let body = literals.into_iter().map(Stmt::Expression).collect();
        let main = b.function("main", &[], body);
        b.unit("Main", vec![Component::Function(main)])
    });
    listing(&file, "main")
}

#[test]
fn integer_push_tiers() {
    let listing = expression_statements(&["0", "5", "6", "127", "128", "40000"]);
    insta::assert_snapshot!(listing, @r"
    00 nop
    01 push_i0
    02 pop
    03 push_i5
    04 pop
    05 push_b 6
    07 pop
    08 push_b 127
    10 pop
    11 push_s 128
    14 pop
    15 load_cpr 40000
    18 pop
    19 return
    ");
}

#[test]
fn pooled_literals() {
    let listing = expression_statements(&["0L", "3L", "1.5f", "2.5", "\"hi\"", "true", "null"]);
    insta::assert_snapshot!(listing, @r#"
    00 nop
    01 push_l0
    02 pop
    03 load_cpr 3L
    06 pop
    07 load_cpr 1.5f
    10 pop
    11 load_cpr 2.5
    14 pop
    15 load_cpr "hi"
    18 pop
    19 push_i1
    20 pop
    21 push_null
    22 pop
    23 return
    "#);
}

#[test]
fn equal_literals_share_a_pool_entry() {
    let file = compile_with(|b| {
        let body = vec![
            Stmt::Expression(Expr::int("70000")),
            Stmt::Expression(Expr::int("70_000")),
        ];
        let main = b.function("main", &[], body);
        b.unit("Main", vec![Component::Function(main)])
    });
    let integers = file
        .constant_pool
        .iter()
        .filter(|(_, entry)| matches!(entry, zen_bytecode::ConstantPoolEntry::Integer(70000)))
        .count();
    assert_eq!(integers, 1);
}
