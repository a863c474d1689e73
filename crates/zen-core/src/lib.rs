#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Shared building blocks for the Zen compiler and virtual machine.
//!
//! - [`Interner`] turns identifier text into cheap [`Ident`] handles so the
//!   AST and the symbol table can compare names by integer.
//! - [`Colors`] carries the ANSI palette used by the disassembler.

pub mod colors;
pub mod interner;


pub use colors::Colors;
pub use interner::{Ident, Interner};
