//! Runtime engine: class loading, frames, the interpreter loop and the
//! thread host.

mod class;
mod error;
mod frame;
mod heap;
mod interpreter;
mod intrinsics;
mod output;
mod trace;
mod value;
mod vm;

#[cfg(test)]
mod frame_tests;
#[cfg(test)]
mod output_tests;
#[cfg(test)]
mod test_utils;

pub use class::{ClassTable, EXCEPTION_CLASS, LoadedClass, LoadedField, LoadedFunction, Target};
pub use error::RuntimeError;
pub use frame::{Frame, InvocationStack};
pub use heap::{Heap, HeapObject, HeapRef};
pub use interpreter::Interpreter;
pub use output::Output;
pub use trace::{LogTracer, NoopTracer, PrintTracer, Tracer};
pub use value::Value;
pub use vm::{Limits, ProcessorThread, VirtualMachine, VirtualMachineBuilder};
