//! Test helpers: building units, compiling them, rendering listings.

use std::fmt::Write as _;

use zen_bytecode::{ConstantPoolEntry, EntityFile, Operand, decode_instructions};
use zen_core::Interner;

use crate::ast::{AstBuilder, CompilationUnit};
use crate::emit::GeneratorConfig;

/// Route `tracing` output to the test harness. `RUST_LOG` filters it.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn build(f: impl FnOnce(&mut AstBuilder<'_>) -> CompilationUnit) -> (CompilationUnit, Interner) {
    let mut interner = Interner::new();
    let unit = f(&mut AstBuilder::new(&mut interner));
    (unit, interner)
}

pub fn compile_with(f: impl FnOnce(&mut AstBuilder<'_>) -> CompilationUnit) -> EntityFile {
    init_test_logging();
    let (unit, interner) = build(f);
    crate::compile_unit(&unit, &interner, &GeneratorConfig::new()).expect("unit should compile")
}

pub fn compile_err_with(f: impl FnOnce(&mut AstBuilder<'_>) -> CompilationUnit) -> crate::Error {
    init_test_logging();
    let (unit, interner) = build(f);
    crate::compile_unit(&unit, &interner, &GeneratorConfig::new())
        .expect_err("unit should not compile")
}

/// One line per instruction: offset, mnemonic, operand. Constants are shown
/// resolved, jumps as absolute targets.
pub fn listing(file: &EntityFile, function: &str) -> String {
    let entity = file
        .functions_named(function)
        .next()
        .unwrap_or_else(|| panic!("no function `{function}`"));
    let code = entity
        .instruction_attribute()
        .expect("instruction attribute");
    let mut lines = Vec::new();
    for instr in decode_instructions(&code.instructions).expect("decodable code") {
        let mut line = format!("{:02} {}", instr.offset, instr.opcode);
        match instr.operand {
            Operand::None => {}
            Operand::Byte(v) => write!(line, " {v}").unwrap(),
            Operand::Local(v) => write!(line, " {v}").unwrap(),
            Operand::Short(v) => write!(line, " {v}").unwrap(),
            Operand::Offset(_) => {
                write!(line, " -> {:02}", instr.jump_target().unwrap()).unwrap()
            }
            Operand::Constant(index) => write!(line, " {}", describe(file, index)).unwrap(),
        }
        lines.push(line);
    }
    lines.join("\n")
}

fn describe(file: &EntityFile, index: u16) -> String {
    let pool = &file.constant_pool;
    match pool.get(index).expect("valid constant index") {
        ConstantPoolEntry::Utf8(text) => format!("{text:?}"),
        ConstantPoolEntry::Integer(v) => v.to_string(),
        ConstantPoolEntry::Long(v) => format!("{v}L"),
        ConstantPoolEntry::Float(v) => format!("{v:?}f"),
        ConstantPoolEntry::Double(v) => format!("{v:?}"),
        ConstantPoolEntry::Class { .. } => pool.class_name(index).unwrap().to_string(),
        ConstantPoolEntry::String { .. } => format!("{:?}", pool.string(index).unwrap()),
        ConstantPoolEntry::Field { .. } | ConstantPoolEntry::Function { .. } => {
            let member = pool.member_ref(index).unwrap();
            format!("{}.{} {}", member.class, member.name, member.descriptor)
        }
    }
}
