#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

//! Virtual machine for Zen binary entity files.
//!
//! Loaded entities live in an immutable class table shared by every
//! processor thread. Each thread owns its invocation stack, heap and static
//! fields; results leave a thread as self-contained [`Output`] values.

pub mod engine;

pub use engine::{
    ClassTable, EXCEPTION_CLASS, Heap, HeapRef, Interpreter, Limits, LoadedClass, LoadedFunction,
    LogTracer, NoopTracer, Output, PrintTracer, ProcessorThread, RuntimeError, Tracer, Value,
    VirtualMachine, VirtualMachineBuilder,
};
