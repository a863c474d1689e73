//! Low-level emission machinery.
//!
//! - [`ConstantPoolBuilder`] interns and deduplicates pool entries.
//! - [`BinaryEntityBuilder`] is a stack of byte channels with the FEB write
//!   primitives on top.
//! - [`GeneratorConfig`] carries generation settings.
//! - [`write_atomically`] puts finished bytes on disk.

mod builder;
mod config;
mod constant_pool;
mod error;
mod output;

#[cfg(test)]
mod builder_tests;
#[cfg(test)]
mod constant_pool_tests;

pub use builder::{BinaryEntityBuilder, Channel, ChannelId};
pub use config::{DEFAULT_OUTPUT_PATH, GeneratorConfig};
pub use constant_pool::ConstantPoolBuilder;
pub use error::{ChannelError, EmitError};
pub use output::write_atomically;
