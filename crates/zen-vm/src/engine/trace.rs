//! Execution tracing.
//!
//! The interpreter is generic over its tracer. `NoopTracer` compiles to
//! nothing; `LogTracer` forwards events to `tracing` at trace level;
//! `PrintTracer` collects a colored listing for the command line.

use zen_bytecode::{Instruction, Operand};
use zen_core::Colors;

use super::class::LoadedClass;
use super::value::Value;

pub trait Tracer {
    /// Called before executing an instruction.
    fn trace_instruction(&mut self, class: &LoadedClass, function: usize, instr: &Instruction);

    /// Called when a frame is pushed. `depth` counts the new frame.
    fn trace_call(&mut self, class: &LoadedClass, function: usize, depth: usize);

    fn trace_return(&mut self, value: &Value, depth: usize);

    /// Called when a value is thrown, before handlers are searched.
    fn trace_throw(&mut self, value: &Value);
}

pub struct NoopTracer;

impl Tracer for NoopTracer {
    #[inline(always)]
    fn trace_instruction(&mut self, _class: &LoadedClass, _function: usize, _instr: &Instruction) {}

    #[inline(always)]
    fn trace_call(&mut self, _class: &LoadedClass, _function: usize, _depth: usize) {}

    #[inline(always)]
    fn trace_return(&mut self, _value: &Value, _depth: usize) {}

    #[inline(always)]
    fn trace_throw(&mut self, _value: &Value) {}
}

pub struct LogTracer;

impl Tracer for LogTracer {
    fn trace_instruction(&mut self, class: &LoadedClass, function: usize, instr: &Instruction) {
        tracing::trace!(
            class = %class.name,
            function = %class.function(function).name,
            offset = instr.offset,
            op = instr.opcode.mnemonic(),
            "exec"
        );
    }

    fn trace_call(&mut self, class: &LoadedClass, function: usize, depth: usize) {
        let f = class.function(function);
        tracing::trace!(class = %class.name, function = %f.name, descriptor = %f.descriptor, depth, "call");
    }

    fn trace_return(&mut self, value: &Value, depth: usize) {
        tracing::trace!(value = value.type_name(), depth, "return");
    }

    fn trace_throw(&mut self, value: &Value) {
        tracing::trace!(value = value.type_name(), "throw");
    }
}

/// Collects one line per event, indented by call depth.
pub struct PrintTracer {
    lines: Vec<String>,
    depth: usize,
    colors: Colors,
}

impl PrintTracer {
    pub fn new(colors: Colors) -> Self {
        Self {
            lines: Vec::new(),
            depth: 0,
            colors,
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }

    fn indent(&self) -> String {
        "  ".repeat(self.depth.saturating_sub(1))
    }
}

impl Tracer for PrintTracer {
    fn trace_instruction(&mut self, _class: &LoadedClass, _function: usize, instr: &Instruction) {
        let c = self.colors;
        let operand = match instr.operand {
            Operand::None => String::new(),
            Operand::Byte(v) => format!(" {v}"),
            Operand::Local(v) => format!(" {v}"),
            Operand::Short(v) => format!(" {v}"),
            Operand::Constant(v) => format!(" #{v}"),
            Operand::Offset(_) => match instr.jump_target() {
                Some(target) => format!(" -> {target:04}"),
                None => " -> ?".to_string(),
            },
        };
        let line = format!(
            "{}{}{:04}{} {}{operand}",
            self.indent(),
            c.dim,
            instr.offset,
            c.reset,
            instr.opcode.mnemonic()
        );
        self.lines.push(line);
    }

    fn trace_call(&mut self, class: &LoadedClass, function: usize, depth: usize) {
        self.depth = depth;
        let c = self.colors;
        let f = class.function(function);
        let line = format!(
            "{}{}▶ {}.{}{} {}",
            self.indent(),
            c.blue,
            class.name,
            f.name,
            c.reset,
            f.descriptor
        );
        self.lines.push(line);
    }

    fn trace_return(&mut self, value: &Value, depth: usize) {
        let c = self.colors;
        let line = format!("{}{}◀ {}{}", self.indent(), c.green, value.type_name(), c.reset);
        self.lines.push(line);
        self.depth = depth;
    }

    fn trace_throw(&mut self, value: &Value) {
        let c = self.colors;
        let line = format!("{}{}! throw {}{}", self.indent(), c.yellow, value.type_name(), c.reset);
        self.lines.push(line);
    }
}
