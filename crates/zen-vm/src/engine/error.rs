//! Errors that can occur while loading or executing entities.

use zen_bytecode::{DecodeError, DescriptorError};

#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("cannot load entity: {0}")]
    Decode(#[from] DecodeError),

    #[error("malformed descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    #[error("class `{0}` is already loaded")]
    DuplicateClass(String),

    #[error("class `{0}` not found")]
    ClassNotFound(String),

    #[error("function `{class}.{name}{descriptor}` not found")]
    FunctionNotFound {
        class: String,
        name: String,
        descriptor: String,
    },

    #[error("field `{class}.{name}` not found")]
    FieldNotFound { class: String, name: String },

    #[error("field `{class}.{name}` is final")]
    FinalField { class: String, name: String },

    #[error("`{class}` is not instantiable")]
    NotInstantiable { class: String },

    #[error("`{function}` has no instruction attribute")]
    MissingCode { function: String },

    #[error("jump from {from} to {target} does not land on an instruction")]
    InvalidJump { from: usize, target: isize },

    #[error("constant pool index {0} is invalid here")]
    InvalidConstant(u16),

    #[error("local {slot} out of range ({count} locals)")]
    InvalidLocal { slot: u8, count: usize },

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("`{operation}` cannot be applied to {found}")]
    TypeMismatch {
        operation: &'static str,
        found: &'static str,
    },

    #[error("null receiver for `{0}`")]
    NullReference(String),

    #[error("index {index} out of bounds (length {length})")]
    IndexOutOfBounds { index: i64, length: usize },

    #[error("negative array size {0}")]
    NegativeArraySize(i64),

    #[error("division by zero")]
    DivisionByZero,

    #[error("execution fell off the end of `{0}`")]
    FellOffCode(String),

    #[error("uncaught exception: {0}")]
    UncaughtException(String),

    #[error("runtime execution limit exceeded ({0} instructions)")]
    ExecFuelExhausted(u64),

    #[error("runtime recursion limit exceeded ({0} frames)")]
    RecursionLimitExceeded(u32),

    #[error("cannot spawn processor thread: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("processor thread `{0}` panicked")]
    ThreadPanicked(String),
}
