//! Zen compiler backend: resolved AST in, FEB entity file out.
//!
//! This crate provides the back half of the compilation pipeline:
//! - `ast` - the tree the parser hands over, plus [`ast::AstBuilder`]
//! - `symbols` - scopes, symbols and the definition pass
//! - `emit` - constant pool builder, channel-based entity builder, config
//! - `generate` - the binary entity generator and serializer
//!
//! [`compile_unit`] runs the definition pass and the generator;
//! [`compile_to_file`] also serializes and writes the result.

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod ast;
pub mod emit;
pub mod generate;
pub mod symbols;

#[cfg(test)]
pub mod test_utils;

use std::path::PathBuf;

use zen_bytecode::EntityFile;
use zen_core::Interner;

pub use emit::{EmitError, GeneratorConfig};
pub use generate::{Generator, encode};
pub use symbols::{ResolveError, define_symbols};

/// Errors that can occur while compiling a unit.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("symbol definition failed: {0}")]
    Resolve(#[from] ResolveError),

    #[error("generation failed: {0}")]
    Emit(#[from] EmitError),

    #[error("cannot write output: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for compiler operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Define symbols and generate the entity of `unit`.
pub fn compile_unit(
    unit: &ast::CompilationUnit,
    interner: &Interner,
    config: &GeneratorConfig,
) -> Result<EntityFile> {
    let resolution = define_symbols(unit, interner)?;
    let mut generator = Generator::new(interner, resolution, config);
    Ok(generator.generate(unit)?)
}

/// [`compile_unit`], serialized.
pub fn compile_to_bytes(
    unit: &ast::CompilationUnit,
    interner: &Interner,
    config: &GeneratorConfig,
) -> Result<Vec<u8>> {
    let file = compile_unit(unit, interner, config)?;
    Ok(encode(&file)?)
}

/// [`compile_to_bytes`], written to the configured output path. Nothing is
/// written when compilation fails.
pub fn compile_to_file(
    unit: &ast::CompilationUnit,
    interner: &Interner,
    config: &GeneratorConfig,
) -> Result<PathBuf> {
    let bytes = compile_to_bytes(unit, interner, config)?;
    let path = config.get_output_path().to_path_buf();
    emit::write_atomically(&path, &bytes)?;
    Ok(path)
}
