#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! The FEB binary entity format.
//!
//! A FEB file holds exactly one compiled entity (a class or an enumeration)
//! together with the constant pool its records index into. This crate owns
//! the in-memory model, the instruction set, function descriptors, a decoder
//! that parses the on-disk layout back into the model, and a disassembler.
//!
//! Writing is the compiler's job; see `zen-compiler`'s entity builder.

pub mod attribute;
pub mod constant_pool;
pub mod constants;
pub mod descriptor;
pub mod dump;
pub mod entity;
pub mod error;
pub mod instructions;
pub mod opcode;
pub mod reader;

#[cfg(test)]
mod dump_tests;
#[cfg(test)]
mod instructions_tests;
#[cfg(test)]
mod opcode_tests;
#[cfg(test)]
mod reader_tests;

pub use attribute::{Attribute, ExceptionHandlerSite, ExceptionTable, InstructionAttribute};
pub use constant_pool::{ConstantPool, ConstantPoolEntry, ConstantPoolTag, MemberRef};
pub use constants::{
    FIELD_DESCRIPTOR_PLACEHOLDER, INITIALIZER, MAGIC, MAJOR_VERSION, MAP_CLASS, MAP_FROM_ENTRIES,
    MINOR_VERSION, ROOT_CLASS, attribute_name, flags,
};
pub use descriptor::{FunctionDescriptor, TypeDescriptor};
pub use dump::dump;
pub use entity::{Entity, EntityFile, EntityType, FieldEntity, FunctionEntity, Version};
pub use error::{DecodeError, DescriptorError};
pub use instructions::{Instruction, Operand, decode_instructions};
pub use opcode::Opcode;
pub use reader::ByteReader;
