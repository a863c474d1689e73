use std::path::PathBuf;

use zen_bytecode::DecodeError;
use zen_vm::RuntimeError;

/// Failures reported by the subcommands.
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    #[error("failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("'{}' is not an entity file: {source}", path.display())]
    Decode { path: PathBuf, source: DecodeError },

    #[error("cannot load '{}': {source}", path.display())]
    Load { path: PathBuf, source: RuntimeError },

    #[error("invalid argument `{text}`: {source}")]
    Argument {
        text: String,
        source: serde_json::Error,
    },

    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),

    #[error("cannot print result: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl CommandError {
    /// Input problems exit with 1, failed executions with 2.
    pub fn exit_code(&self) -> i32 {
        match self {
            CommandError::Runtime(_) => 2,
            _ => 1,
        }
    }
}
