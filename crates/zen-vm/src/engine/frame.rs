//! Activation records.
//!
//! Each invocation gets its own operand stack and local slots. Frames sit
//! in an arena and link to their caller by index; the invocation stack only
//! grows and shrinks at its top.

use std::sync::Arc;

use super::class::{LoadedClass, LoadedFunction};
use super::error::RuntimeError;
use super::value::Value;

#[derive(Debug)]
pub struct Frame {
    pub class: Arc<LoadedClass>,
    /// Index into `class.functions`.
    pub function: usize,
    /// Index of the next instruction in the decoded instruction stream of
    /// the function, not a byte offset. `current_offset` maps it back to the
    /// byte position in the code attribute.
    pub pc: usize,
    pub locals: Vec<Value>,
    pub stack: Vec<Value>,
    /// Arena index of the calling frame.
    pub previous: Option<u32>,
    /// Set for initializer frames: the returned value is dropped instead of
    /// pushed onto the caller's stack.
    pub discard_result: bool,
}

impl Frame {
    /// A frame whose first slots hold `arguments`; remaining locals start
    /// as null.
    pub fn new(class: Arc<LoadedClass>, function: usize, mut arguments: Vec<Value>) -> Self {
        let f = class.function(function);
        let slots = usize::from(f.locals).max(arguments.len());
        arguments.resize(slots, Value::Null);
        let stack = Vec::with_capacity(usize::from(f.max_stack));
        Self {
            class,
            function,
            pc: 0,
            locals: arguments,
            stack,
            previous: None,
            discard_result: false,
        }
    }

    pub fn function(&self) -> &LoadedFunction {
        self.class.function(self.function)
    }

    #[inline]
    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop().ok_or(RuntimeError::StackUnderflow)
    }

    /// The top `n` values, deepest first.
    pub fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, RuntimeError> {
        let at = self
            .stack
            .len()
            .checked_sub(n)
            .ok_or(RuntimeError::StackUnderflow)?;
        Ok(self.stack.split_off(at))
    }

    pub fn peek(&self, depth: usize) -> Result<&Value, RuntimeError> {
        self.stack
            .len()
            .checked_sub(depth + 1)
            .map(|i| &self.stack[i])
            .ok_or(RuntimeError::StackUnderflow)
    }

    pub fn local(&self, slot: u8) -> Result<Value, RuntimeError> {
        self.locals
            .get(usize::from(slot))
            .cloned()
            .ok_or(RuntimeError::InvalidLocal {
                slot,
                count: self.locals.len(),
            })
    }

    pub fn set_local(&mut self, slot: u8, value: Value) -> Result<(), RuntimeError> {
        let count = self.locals.len();
        let local = self
            .locals
            .get_mut(usize::from(slot))
            .ok_or(RuntimeError::InvalidLocal { slot, count })?;
        *local = value;
        Ok(())
    }

    /// Byte offset of the instruction executing now.
    pub fn current_offset(&self) -> Option<usize> {
        self.pc
            .checked_sub(1)
            .and_then(|i| self.function().code.get(i))
            .map(|instr| instr.offset)
    }
}

#[derive(Debug, Default)]
pub struct InvocationStack {
    frames: Vec<Frame>,
}

impl InvocationStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Push `frame` on top, linking it to the current frame.
    pub fn push(&mut self, mut frame: Frame) {
        frame.previous = self.frames.len().checked_sub(1).map(|i| i as u32);
        self.frames.push(frame);
    }

    pub fn pop(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn current(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn current_mut(&mut self) -> Option<&mut Frame> {
        self.frames.last_mut()
    }

    /// The frame that called `frame`.
    pub fn caller(&self, frame: &Frame) -> Option<&Frame> {
        frame.previous.map(|i| &self.frames[i as usize])
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drop every frame above `depth`.
    pub fn truncate(&mut self, depth: usize) {
        self.frames.truncate(depth);
    }
}
