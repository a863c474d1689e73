use crate::symbols::ScopeError;

/// Misuse of the channel stack. Always a generator defect.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("channel stack underflow")]
    Underflow,

    #[error("channel {index} out of range (depth {depth})")]
    OutOfRange { index: usize, depth: usize },

    #[error("expected exactly one channel, found {0}")]
    Unbalanced(usize),

    #[error("code of {0} bytes exceeds the addressable range")]
    CodeTooLarge(usize),
}

/// Errors that abort generation of a compilation unit.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EmitError {
    #[error(transparent)]
    Channel(#[from] ChannelError),

    #[error(transparent)]
    Scope(#[from] ScopeError),

    #[error("erroneous node: {message}")]
    ErroneousNode { message: String },

    #[error("no scope recorded for a scope-introducing node")]
    MissingScope,

    #[error("constant pool overflow (max 65535 entries)")]
    TooManyConstants,

    #[error("too many local variables in `{function}` (max 256)")]
    TooManyLocals { function: String },

    #[error("operand stack of `{function}` exceeds 65535 slots")]
    StackTooDeep { function: String },

    #[error("a compilation unit holds one class or enumeration, found {count}")]
    MultipleEntities { count: usize },

    #[error("unresolved symbol `{name}`")]
    UnresolvedSymbol { name: String },

    #[error("`{name}` is not a class")]
    NotAClass { name: String },

    #[error("`{name}` is not callable")]
    NotCallable { name: String },

    #[error("`{function}` takes {expected} arguments, found {found}")]
    ArityMismatch {
        function: String,
        expected: String,
        found: usize,
    },

    #[error("cannot assign to `{name}`")]
    AssignToConstant { name: String },

    #[error("invalid assignment target")]
    InvalidAssignmentTarget,

    #[error("`this` used outside an instance function")]
    ThisOutsideInstance,

    #[error("invalid literal `{text}`: {reason}")]
    InvalidLiteral { text: String, reason: &'static str },

    #[error("jump of {0} bytes out of range")]
    JumpOutOfRange(usize),

    #[error("unsupported: {0}")]
    Unsupported(&'static str),
}
