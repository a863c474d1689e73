use thiserror::Error;

/// Errors raised while decoding a FEB byte stream.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("invalid magic number: expected 0xFEB72000, found {0:#010X}")]
    InvalidMagic(u32),

    #[error("unsupported version {major}.{minor}")]
    UnsupportedVersion { major: u16, minor: u16 },

    #[error("unexpected end of input at offset {offset}: {needed} more bytes needed")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("unknown constant pool tag {tag} at offset {offset}")]
    UnknownConstantTag { tag: u8, offset: usize },

    #[error("constant pool entry #{index} is not valid UTF-8")]
    InvalidUtf8 { index: u16 },

    #[error("unknown entity type {0}")]
    UnknownEntityType(u8),

    #[error("attribute declares {declared} bytes but its body holds {actual}")]
    AttributeLengthMismatch { declared: u32, actual: u32 },

    #[error("{0} trailing bytes after the function table")]
    TrailingBytes(usize),

    #[error("unknown opcode {opcode:#04X} at offset {offset}")]
    UnknownOpcode { opcode: u8, offset: usize },

    #[error("operand of {mnemonic} at offset {offset} runs past the end of the code")]
    TruncatedOperand {
        mnemonic: &'static str,
        offset: usize,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while parsing a function or type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("descriptor `{0}` is missing the ':' separator")]
    MissingSeparator(String),

    #[error("unexpected character `{found}` at position {position} in `{descriptor}`")]
    UnexpectedCharacter {
        descriptor: String,
        found: char,
        position: usize,
    },

    #[error("descriptor `{0}` ends inside a type")]
    Truncated(String),

    #[error("descriptor `{0}` has no parameter list")]
    EmptyParameters(String),
}
