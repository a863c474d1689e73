//! Test helpers: compile units with the generator and run them.

use zen_bytecode::EntityFile;
use zen_compiler::GeneratorConfig;
use zen_compiler::ast::{AstBuilder, CompilationUnit, Component, Expr, Stmt};
use zen_core::Interner;

use super::{ClassTable, Limits, Output, RuntimeError, VirtualMachine};

pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn compile(f: impl FnOnce(&mut AstBuilder<'_>) -> CompilationUnit) -> EntityFile {
    init_test_logging();
    let mut interner = Interner::new();
    let unit = f(&mut AstBuilder::new(&mut interner));
    zen_compiler::compile_unit(&unit, &interner, &GeneratorConfig::new())
        .expect("unit should compile")
}

pub fn table(files: &[EntityFile]) -> ClassTable {
    let mut classes = ClassTable::new();
    for file in files {
        classes.load(file).expect("entity should load");
    }
    classes
}

pub fn machine(files: &[EntityFile], limits: Limits) -> VirtualMachine {
    files
        .iter()
        .try_fold(VirtualMachine::builder().limits(limits), |builder, file| builder.load(file))
        .expect("entities should load")
        .build()
}

/// Run `class.function(arguments)` in a fresh interpreter.
pub fn run(files: &[EntityFile], class: &str, function: &str, arguments: Vec<Output>) -> Result<Output, RuntimeError> {
    machine(files, Limits::default()).invoke(class, function, arguments)
}

pub fn run_ok(files: &[EntityFile], class: &str, function: &str, arguments: Vec<Output>) -> Output {
    run(files, class, function, arguments).expect("invocation should succeed")
}

/// A unit `Main` whose `main()` returns `f`'s expression.
pub fn eval(f: impl FnOnce(&mut AstBuilder<'_>) -> Expr) -> Result<Output, RuntimeError> {
    let file = compile(|b| {
        let value = f(b);
        let main = b.function("main", &[], vec![Stmt::Return(Some(value))]);
        b.unit("Main", vec![Component::Function(main)])
    });
    run(&[file], "Main", "main", vec![])
}

/// Like [`eval`], expecting success.
pub fn eval_ok(f: impl FnOnce(&mut AstBuilder<'_>) -> Expr) -> Output {
    eval(f).expect("evaluation should succeed")
}

/// A unit `Main` with the given top-level functions.
pub fn program(f: impl FnOnce(&mut AstBuilder<'_>) -> Vec<Component>) -> EntityFile {
    compile(|b| {
        let components = f(b);
        b.unit("Main", components)
    })
}
