//! The virtual machine host.
//!
//! A machine owns the class table and the processor threads running on
//! it. Loading happens through the builder; once built, the table is frozen
//! and shared by every thread. Each thread runs its own interpreter with a
//! private heap and private static fields.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tracing::{debug, error, info};
use zen_bytecode::EntityFile;

use super::class::ClassTable;
use super::error::RuntimeError;
use super::interpreter::Interpreter;
use super::output::Output;
use super::trace::{NoopTracer, Tracer};

/// Execution limits applied to every interpreter the machine starts.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Limits {
    /// Maximum call depth (default: 1,024).
    pub(crate) recursion_limit: u32,
    /// Maximum executed instructions per invocation (default: unlimited).
    pub(crate) exec_fuel: Option<u64>,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            recursion_limit: 1024,
            exec_fuel: None,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn exec_fuel(mut self, fuel: u64) -> Self {
        self.exec_fuel = Some(fuel);
        self
    }

    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    pub fn get_exec_fuel(&self) -> Option<u64> {
        self.exec_fuel
    }
}

#[derive(Debug, Default)]
pub struct VirtualMachineBuilder {
    classes: ClassTable,
    limits: Limits,
}

impl VirtualMachineBuilder {
    pub fn load(mut self, file: &EntityFile) -> Result<Self, RuntimeError> {
        self.classes.load(file)?;
        Ok(self)
    }

    pub fn load_bytes(mut self, bytes: &[u8]) -> Result<Self, RuntimeError> {
        self.classes.load_bytes(bytes)?;
        Ok(self)
    }

    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn build(self) -> VirtualMachine {
        info!(classes = self.classes.len(), "virtual machine ready");
        VirtualMachine {
            classes: Arc::new(self.classes),
            limits: self.limits,
            threads: Vec::new(),
        }
    }
}

#[derive(Debug)]
pub struct VirtualMachine {
    classes: Arc<ClassTable>,
    limits: Limits,
    threads: Vec<ProcessorThread>,
}

impl VirtualMachine {
    pub fn builder() -> VirtualMachineBuilder {
        VirtualMachineBuilder::default()
    }

    pub fn classes(&self) -> &ClassTable {
        &self.classes
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    /// Run `class.function(arguments)` on the calling thread.
    pub fn invoke(&self, class: &str, function: &str, arguments: Vec<Output>) -> Result<Output, RuntimeError> {
        self.invoke_traced(class, function, arguments, NoopTracer).0
    }

    /// Like [`invoke`](Self::invoke), handing the tracer back afterwards.
    pub fn invoke_traced<T: Tracer>(
        &self,
        class: &str,
        function: &str,
        arguments: Vec<Output>,
        tracer: T,
    ) -> (Result<Output, RuntimeError>, T) {
        let mut interpreter = Interpreter::with_tracer(&self.classes, self.limits, tracer);
        let result = run(&mut interpreter, class, function, arguments);
        (result, interpreter.into_tracer())
    }

    /// Start a processor thread running `class.function(arguments)`.
    pub fn spawn(
        &mut self,
        name: &str,
        class: &str,
        function: &str,
        arguments: Vec<Output>,
    ) -> Result<(), RuntimeError> {
        let classes = Arc::clone(&self.classes);
        let limits = self.limits;
        let (class, function) = (class.to_string(), function.to_string());
        let thread_name = name.to_string();
        let handle = thread::Builder::new()
            .name(name.to_string())
            .spawn(move || {
                debug!(thread = %thread_name, %class, %function, "processor thread started");
                let mut interpreter = Interpreter::new(&classes, limits);
                let result = run(&mut interpreter, &class, &function, arguments);
                debug!(thread = %thread_name, ok = result.is_ok(), "processor thread finished");
                result
            })
            .map_err(RuntimeError::Spawn)?;
        self.threads.push(ProcessorThread {
            name: name.to_string(),
            handle,
        });
        Ok(())
    }

    pub fn threads(&self) -> &[ProcessorThread] {
        &self.threads
    }

    /// Wait for every processor thread and collect their results in spawn
    /// order.
    pub fn shutdown(self) -> Vec<Result<Output, RuntimeError>> {
        debug!(threads = self.threads.len(), "waiting for processor threads");
        self.threads.into_iter().map(ProcessorThread::join).collect()
    }
}

fn run<T: Tracer>(
    interpreter: &mut Interpreter<'_, T>,
    class: &str,
    function: &str,
    arguments: Vec<Output>,
) -> Result<Output, RuntimeError> {
    let arguments = arguments
        .into_iter()
        .map(|a| a.into_value(interpreter.heap_mut()))
        .collect::<Result<Vec<_>, _>>()?;
    let value = interpreter.invoke(class, function, arguments)?;
    Ok(Output::from_value(interpreter.heap(), &value))
}

/// One OS thread with its own invocation stack.
#[derive(Debug)]
pub struct ProcessorThread {
    name: String,
    handle: JoinHandle<Result<Output, RuntimeError>>,
}

impl ProcessorThread {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn join(self) -> Result<Output, RuntimeError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => {
                error!(thread = %self.name, "processor thread panicked");
                Err(RuntimeError::ThreadPanicked(self.name))
            }
        }
    }
}
