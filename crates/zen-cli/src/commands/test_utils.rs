use std::path::{Path, PathBuf};

use zen_compiler::GeneratorConfig;
use zen_compiler::ast::{AstBuilder, BinaryOperator, Component, Expr, Stmt};
use zen_core::Interner;

use super::exec::ExecArgs;

/// Compile `Main` into `dir/Main.feb`:
/// `main()` returns 42, `add(a, b)` adds, `boom()` divides by zero.
pub fn write_main(dir: &Path) -> PathBuf {
    let mut interner = Interner::new();
    let unit = {
        let b = &mut AstBuilder::new(&mut interner);
        let main = b.function("main", &[], vec![Stmt::Return(Some(Expr::int("42")))]);
        let (x, y) = (b.name("a"), b.name("b"));
        let sum = Expr::binary(BinaryOperator::Add, x, y);
        let add = b.function("add", &["a", "b"], vec![Stmt::Return(Some(sum))]);
        let quotient = Expr::binary(BinaryOperator::Divide, Expr::int("1"), Expr::int("0"));
        let boom = b.function("boom", &[], vec![Stmt::Return(Some(quotient))]);
        b.unit(
            "Main",
            vec![
                Component::Function(main),
                Component::Function(add),
                Component::Function(boom),
            ],
        )
    };
    let config = GeneratorConfig::new().output_path(dir.join("Main.feb"));
    zen_compiler::compile_to_file(&unit, &interner, &config).unwrap()
}

pub fn exec_args(path: PathBuf, function: &str, arguments: &[&str]) -> ExecArgs {
    ExecArgs {
        entity_paths: vec![path],
        class: "Main".to_string(),
        function: function.to_string(),
        arguments: arguments.iter().map(|a| a.to_string()).collect(),
        compact: true,
        trace: false,
        fuel: None,
        max_depth: None,
        color: false,
    }
}
