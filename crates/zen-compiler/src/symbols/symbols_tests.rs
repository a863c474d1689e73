use zen_core::Interner;

use super::*;
use crate::ast::{AstBuilder, ClassMember, Component, Expr, Stmt};

#[test]
fn scopes_must_be_activated_in_nesting_order() {
    let mut table = SymbolTable::new();
    let unit = table.create_scope(ScopeKind::CompilationUnit, None);
    let class = table.create_scope(ScopeKind::Class, Some(unit));
    let function = table.create_scope(ScopeKind::Function, Some(class));

    assert_eq!(
        table.set_current_scope(class),
        Err(ScopeError::NotNested { scope: 1 })
    );

    table.set_current_scope(unit).unwrap();
    assert_eq!(
        table.set_current_scope(function),
        Err(ScopeError::NotNested { scope: 2 })
    );
    table.set_current_scope(class).unwrap();
    table.set_current_scope(function).unwrap();
    assert_eq!(table.depth(), 3);

    assert_eq!(table.invalidate_current_scope(), Ok(function));
    assert_eq!(table.invalidate_current_scope(), Ok(class));
    assert_eq!(table.current_scope(), Some(unit));
    assert_eq!(table.invalidate_current_scope(), Ok(unit));
    assert_eq!(
        table.invalidate_current_scope(),
        Err(ScopeError::NoCurrentScope)
    );
    assert_eq!(table.activations(), 3);
}

#[test]
fn resolve_walks_enclosing_scopes() {
    let mut interner = Interner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let mut table = SymbolTable::new();
    let outer = table.create_scope(ScopeKind::Function, None);
    let inner = table.create_scope(ScopeKind::Local, Some(outer));
    let outer_x = table.define(outer, x, SymbolKind::Variable).unwrap();
    let inner_x = table.define(inner, x, SymbolKind::Constant).unwrap();

    assert_eq!(table.resolve(inner, x), Some(inner_x));
    assert_eq!(table.resolve(outer, x), Some(outer_x));
    assert_eq!(table.resolve(inner, y), None);
}

#[test]
fn define_rejects_redefinition_in_same_scope() {
    let mut interner = Interner::new();
    let x = interner.intern("x");

    let mut table = SymbolTable::new();
    let scope = table.create_scope(ScopeKind::Local, None);
    assert!(table.define(scope, x, SymbolKind::Variable).is_some());
    assert!(table.define(scope, x, SymbolKind::Variable).is_none());
}

#[test]
fn definition_pass_reports_duplicates() {
    let mut interner = Interner::new();
    let mut b = AstBuilder::new(&mut interner);
    let f = b.function("f", &["a", "a"], vec![]);
    let unit = b.unit("Test", vec![Component::Function(f)]);

    let err = define_symbols(&unit, &interner).unwrap_err();
    assert_eq!(err.to_string(), "`a` is already defined in this function scope");
}

#[test]
fn definition_pass_annotates_every_scope() {
    let mut interner = Interner::new();
    let mut b = AstBuilder::new(&mut interner);
    let thrown = b.name("e");
    let catch = b.catch("Exception", "e", vec![Stmt::Throw(thrown)]);
    let try_stmt = b.try_stmt(vec![], vec![catch]);
    let local = b.var("total", Some(Expr::int("0")));
    let method = b.function("run", &["n"], vec![Stmt::Variable(local), try_stmt]);
    let field = b.var("count", None);
    let class = b.class(
        "Counter",
        &[],
        vec![ClassMember::Variable(field), ClassMember::Function(method)],
    );
    let unit = b.unit_with("Counter", Some("demo.app"), &["zen.core.Exception"], vec![class]);

    let Resolution { table, annotations } = define_symbols(&unit, &interner).unwrap();

    // unit, class, function, function body, try body, catch body
    assert_eq!(table.scope_count(), 6);
    assert_eq!(annotations.len(), 6);

    let unit_scope = annotations.get_scope(unit.id).unwrap();
    let counter = table
        .resolve(unit_scope, interner.get("Counter").unwrap())
        .unwrap();
    assert_eq!(
        table.symbol(counter).kind.qualified_name(),
        Some("demo/app/Counter")
    );
    let exception = table
        .resolve(unit_scope, interner.get("Exception").unwrap())
        .unwrap();
    assert_eq!(
        table.symbol(exception).kind.qualified_name(),
        Some("zen/core/Exception")
    );

    let Component::Class(class) = &unit.components[0] else {
        unreachable!()
    };
    let class_scope = annotations.get_scope(class.id).unwrap();
    let count = table
        .resolve(class_scope, interner.get("count").unwrap())
        .unwrap();
    assert_eq!(table.symbol(count).enclosing_scope, class_scope);

    let ClassMember::Function(method) = &class.members[1] else {
        unreachable!()
    };
    let function_scope = annotations.get_scope(method.id).unwrap();
    let n = table
        .resolve(function_scope, interner.get("n").unwrap())
        .unwrap();
    assert_eq!(table.symbol(n).enclosing_scope, function_scope);

    let Stmt::Try(try_stmt) = &method.body.statements[1] else {
        unreachable!()
    };
    let catch_scope = annotations.get_scope(try_stmt.catches[0].body.id).unwrap();
    let e = table
        .resolve(catch_scope, interner.get("e").unwrap())
        .unwrap();
    assert_eq!(table.symbol(e).enclosing_scope, catch_scope);
    assert_eq!(table.scope(catch_scope).kind, ScopeKind::Local);
}

#[test]
fn qualified_resolution_follows_member_scopes_then_binary_names() {
    let mut interner = Interner::new();
    let mut b = AstBuilder::new(&mut interner);
    let color = b.enumeration("Color", &["RED", "GREEN"]);
    let unit = b.unit_with("Color", Some("paint"), &["zen.core.Exception"], vec![color]);
    let green = b.qualified("Color.GREEN");
    let by_path = b.qualified("zen.core.Exception");
    let missing = b.qualified("Color.BLUE");

    let Resolution { table, annotations } = define_symbols(&unit, &interner).unwrap();
    let scope = annotations.get_scope(unit.id).unwrap();

    let symbol = table
        .resolve_qualified_symbol(scope, &green, &interner)
        .unwrap();
    assert_eq!(table.symbol(symbol).kind, SymbolKind::Enumerate { ordinal: 1 });

    let symbol = table
        .resolve_qualified_symbol(scope, &by_path, &interner)
        .unwrap();
    assert_eq!(
        table.symbol(symbol).kind.qualified_name(),
        Some("zen/core/Exception")
    );

    assert_eq!(table.resolve_qualified_symbol(scope, &missing, &interner), None);
}
