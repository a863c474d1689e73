use zen_bytecode::{Attribute, EntityType, INITIALIZER, ROOT_CLASS, flags};

use crate::Error;
use crate::ast::{ClassMember, Component, Expr, Stmt};
use crate::emit::{EmitError, GeneratorConfig};
use crate::generate::Generator;
use crate::symbols::define_symbols;
use crate::test_utils::{build, compile_err_with, compile_with, listing};

fn superclasses(file: &zen_bytecode::EntityFile) -> Vec<&str> {
    file.superclass_names().map(Option::unwrap).collect()
}

#[test]
fn unit_without_declarations_becomes_a_class() {
    let file = compile_with(|b| {
        let main = b.function("main", &[], vec![]);
        b.unit_with("Main", Some("app.demo"), &[], vec![Component::Function(main)])
    });

    assert_eq!(file.name(), Some("app/demo/Main"));
    assert_eq!(file.entity.entity_type, EntityType::Class);
    assert_eq!(superclasses(&file), [ROOT_CLASS]);

    let main = file.find_function("main", "(zen/core/Object):v").unwrap();
    assert_eq!(main.flags, flags::STATIC);
    insta::assert_snapshot!(listing(&file, "main"), @r"
    00 nop
    01 return
    ");
}

#[test]
fn declared_class_names_the_entity() {
    let file = compile_with(|b| {
        let class = b.class("Shape", &[], vec![]);
        b.unit_with("shapes", Some("geo"), &[], vec![class])
    });

    assert_eq!(file.name(), Some("geo/Shape"));
    assert_eq!(superclasses(&file), [ROOT_CLASS]);
    assert!(file.entity.functions.is_empty());
}

#[test]
fn superclasses_resolve_through_imports() {
    let file = compile_with(|b| {
        let class = b.class("Failure", &["Exception"], vec![]);
        b.unit_with("Failure", None, &["zen.core.Exception"], vec![class])
    });

    assert_eq!(superclasses(&file), ["zen/core/Exception"]);
}

#[test]
fn unknown_superclass_is_rejected() {
    let err = compile_err_with(|b| {
        let class = b.class("Failure", &["Missing"], vec![]);
        b.unit("Failure", vec![class])
    });

    assert!(matches!(err, Error::Emit(EmitError::NotAClass { name }) if name == "Missing"));
}

#[test]
fn function_descriptors() {
    let file = compile_with(|b| {
        let zero = b.function("zero", &[], vec![]);
        let two = b.function("two", &["a", "b"], vec![]);
        let rest = b.variadic_function("rest", &["a"], "more", vec![]);
        let class = b.class(
            "Calc",
            &[],
            vec![
                ClassMember::Function(zero),
                ClassMember::Function(two),
                ClassMember::Function(rest),
            ],
        );
        b.unit("Calc", vec![class])
    });

    let zero = file.find_function("zero", "(zen/core/Object):v").unwrap();
    let two = file
        .find_function("two", "(zen/core/Object):(zen/core/Object)(zen/core/Object)")
        .unwrap();
    let rest = file
        .find_function("rest", "(zen/core/Object):(zen/core/Object)@(zen/core/Object)")
        .unwrap();

    assert_eq!(zero.flags, 0);
    // `this` plus the parameters.
    let locals = |f: &zen_bytecode::FunctionEntity| {
        f.instruction_attribute().unwrap().local_variable_count
    };
    assert_eq!(locals(zero), 1);
    assert_eq!(locals(two), 3);
    assert_eq!(locals(rest), 3);
}

#[test]
fn class_variables_become_fields() {
    let file = compile_with(|b| {
        let x = b.var("x", Some(Expr::int("1")));
        let y = b.constant("y", Expr::int("2"));
        let z = b.var("z", None);
        let x_ref = b.name("x");
        let get = b.function("get", &[], vec![Stmt::Return(Some(x_ref))]);
        let class = b.class(
            "Point",
            &[],
            vec![
                ClassMember::Variable(x),
                ClassMember::Variable(y),
                ClassMember::Variable(z),
                ClassMember::Function(get),
            ],
        );
        b.unit("Point", vec![class])
    });

    let fields: Vec<(&str, u16)> = file
        .entity
        .fields
        .iter()
        .map(|f| (file.constant_pool.utf8(f.name_index).unwrap(), f.flags))
        .collect();
    assert_eq!(fields, [("x", 0), ("y", flags::FINAL), ("z", 0)]);
    for field in &file.entity.fields {
        assert_eq!(file.constant_pool.utf8(field.descriptor_index), Some("com/todo/Class"));
    }

    insta::assert_snapshot!(listing(&file, "get"), @r"
    00 nop
    01 load_a 0
    03 load_instance_field Point.x com/todo/Class
    06 return_a
    07 return
    ");
}

#[test]
fn field_initializers_run_in_a_synthetic_function() {
    let file = compile_with(|b| {
        let x = b.var("x", Some(Expr::int("1")));
        let y = b.constant("y", Expr::int("2"));
        let class = b.class(
            "Point",
            &[],
            vec![ClassMember::Variable(x), ClassMember::Variable(y)],
        );
        b.unit("Point", vec![class])
    });

    let initializer = file
        .find_function(INITIALIZER, "(zen/core/Object):v")
        .unwrap();
    assert_eq!(initializer.flags, flags::SYNTHETIC);
    insta::assert_snapshot!(listing(&file, INITIALIZER), @r"
    00 nop
    01 load_a 0
    03 push_i1
    04 store_instance_field Point.x com/todo/Class
    07 load_a 0
    09 push_i2
    10 store_instance_field Point.y com/todo/Class
    13 return
    ");
}

#[test]
fn enumeration_entity() {
    let file = compile_with(|b| {
        let color = b.enumeration("Color", &["RED", "GREEN"]);
        b.unit("Color", vec![color])
    });

    assert_eq!(file.entity.entity_type, EntityType::Enumeration);
    assert!(file.entity.superclasses.is_empty());
    let fields: Vec<(&str, u16)> = file
        .entity
        .fields
        .iter()
        .map(|f| (file.constant_pool.utf8(f.name_index).unwrap(), f.flags))
        .collect();
    let enumerate = flags::STATIC | flags::FINAL;
    assert_eq!(fields, [("RED", enumerate), ("GREEN", enumerate)]);
}

#[test]
fn locals_follow_parameters() {
    let file = compile_with(|b| {
        let a = b.name("a");
        let local = b.var("local", Some(a));
        let read = b.name("local");
        let f = b.function(
            "f",
            &["a"],
            vec![Stmt::Variable(local), Stmt::Return(Some(read))],
        );
        b.unit("Main", vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 load_a 0
    03 store_a 1
    05 load_a 1
    07 return_a
    08 return
    ");
    let code = file.entity.functions[0].instruction_attribute().unwrap();
    assert_eq!(code.local_variable_count, 2);
    assert_eq!(code.max_stack_size, 1);
}

#[test]
fn uninitialized_locals_start_as_null() {
    let file = compile_with(|b| {
        let local = b.var("local", None);
        let f = b.function("f", &[], vec![Stmt::Variable(local)]);
        b.unit("Main", vec![Component::Function(f)])
    });

    insta::assert_snapshot!(listing(&file, "f"), @r"
    00 nop
    01 push_null
    02 store_a 0
    04 return
    ");
}

#[test]
fn one_entity_per_unit() {
    let err = compile_err_with(|b| {
        let first = b.class("A", &[], vec![]);
        let second = b.enumeration("B", &["X"]);
        b.unit("Both", vec![first, second])
    });

    assert!(matches!(err, Error::Emit(EmitError::MultipleEntities { count: 2 })));
}

#[test]
fn erroneous_node_aborts_generation() {
    let err = compile_err_with(|b| {
        let f = b.function("f", &[], vec![Stmt::Expression(Expr::error("expected `;`"))]);
        b.unit("Main", vec![Component::Function(f)])
    });

    assert!(matches!(
        err,
        Error::Emit(EmitError::ErroneousNode { message }) if message == "expected `;`"
    ));
}

#[test]
fn unit_variables_are_unsupported() {
    let err = compile_err_with(|b| {
        let v = b.var("counter", None);
        b.unit("Main", vec![Component::Variable(v)])
    });

    assert!(matches!(err, Error::Emit(EmitError::Unsupported(_))));
}

#[test]
fn source_file_attribute() {
    let (unit, interner) = build(|b| {
        let main = b.function("main", &[], vec![]);
        b.unit("Main", vec![Component::Function(main)])
    });
    let config = GeneratorConfig::new().source_file("main.zen");
    let file = crate::compile_unit(&unit, &interner, &config).unwrap();

    let [Attribute::SourceFile { name_index, source_file_index }] = &file.entity.attributes[..]
    else {
        panic!("expected one source file attribute");
    };
    assert_eq!(file.constant_pool.utf8(*name_index), Some("vm/SourceFile"));
    assert_eq!(file.constant_pool.utf8(*source_file_index), Some("main.zen"));
}

#[test]
fn scopes_are_balanced_after_generation() {
    let (unit, interner) = build(|b| {
        let c = b.name("c");
        let one = Expr::int("1");
        let branch = b.if_stmt(c, vec![Stmt::Return(Some(one))], Some(vec![]));
        let f = b.function("f", &["c"], vec![branch]);
        let class = b.class("Main", &[], vec![ClassMember::Function(f)]);
        b.unit("Main", vec![class])
    });
    let resolution = define_symbols(&unit, &interner).unwrap();
    let config = GeneratorConfig::new();
    let mut generator = Generator::new(&interner, resolution, &config);
    generator.generate(&unit).unwrap();

    let table = generator.symbol_table();
    assert_eq!(table.depth(), 0);
    // unit, class, function, function body, then, else
    assert_eq!(table.activations(), 6);
    assert_eq!(table.activations(), table.scope_count());
}
