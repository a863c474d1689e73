//! The binary entity generator.
//!
//! Walks a resolved compilation unit depth first and produces one
//! [`EntityFile`]. Each scope-introducing node activates its annotated scope
//! on entry and invalidates it on exit, so the symbol table's cursor always
//! mirrors the walk.
//!
//! Every function is generated into its own channel on top of channel 0.
//! Nested code regions (branches, loop bodies, handlers, list elements, map
//! entries) get their own channel and are spliced in once their final
//! position is known. Jump offsets are relative to the jump opcode.
//!
//! Any erroneous node aborts generation: no entity is produced for the unit.

mod declarations;
mod expressions;
mod literals;
mod serialize;
mod statements;

#[cfg(test)]
mod declarations_tests;
#[cfg(test)]
mod literals_tests;
#[cfg(test)]
mod statements_tests;

pub use literals::{FloatLiteral, IntegerLiteral, parse_float, parse_integer};
pub use serialize::{encode, write_entity_file};

use std::collections::HashMap;

use tracing::warn;
use zen_bytecode::{Entity, EntityFile, FieldEntity, FunctionEntity, Opcode, Operand};
use zen_core::{Ident, Interner};

use crate::ast::{ErrorNode, NodeId};
use crate::emit::{BinaryEntityBuilder, Channel, ConstantPoolBuilder, EmitError, GeneratorConfig};
use crate::symbols::{Resolution, ScopeAnnotations, ScopeError, ScopeId, SymbolId, SymbolTable};

/// Encoded size of every jump.
const JUMP: usize = Opcode::Jump.size();

/// Generation state for one compilation unit.
pub struct Generator<'a> {
    interner: &'a Interner,
    config: &'a GeneratorConfig,
    table: SymbolTable,
    annotations: ScopeAnnotations,
    pool: ConstantPoolBuilder,
    builder: BinaryEntityBuilder,
    /// Binary name of the entity being generated.
    entity_name: String,
    entity: Entity,
    fields: Vec<FieldEntity>,
    functions: Vec<FunctionEntity>,
    function: Option<FunctionState>,
}

/// Per-function counters, reset on every function entry.
#[derive(Debug)]
struct FunctionState {
    name: String,
    /// Instance functions hold `this` in local 0.
    instance: bool,
    locals: HashMap<SymbolId, u8>,
    next_local: usize,
    stack_depth: usize,
    max_stack: usize,
}

impl FunctionState {
    fn new(name: String, instance: bool) -> Self {
        Self {
            name,
            instance,
            locals: HashMap::new(),
            next_local: usize::from(instance),
            stack_depth: 0,
            max_stack: 0,
        }
    }
}

impl<'a> Generator<'a> {
    pub fn new(interner: &'a Interner, resolution: Resolution, config: &'a GeneratorConfig) -> Self {
        Self {
            interner,
            config,
            table: resolution.table,
            annotations: resolution.annotations,
            pool: ConstantPoolBuilder::new(),
            builder: BinaryEntityBuilder::new(),
            entity_name: String::new(),
            entity: Entity::default(),
            fields: Vec::new(),
            functions: Vec::new(),
            function: None,
        }
    }

    /// The symbol table, for inspecting the scope cursor after a run.
    pub fn symbol_table(&self) -> &SymbolTable {
        &self.table
    }

    fn text(&self, ident: Ident) -> &'a str {
        self.interner.resolve(ident)
    }

    fn erroneous(&self, node: &ErrorNode) -> EmitError {
        warn!(message = %node.message, "erroneous node, no entity will be written");
        EmitError::ErroneousNode {
            message: node.message.clone(),
        }
    }

    fn enter_scope(&mut self, node: NodeId) -> Result<ScopeId, EmitError> {
        let scope = self
            .annotations
            .get_scope(node)
            .ok_or(EmitError::MissingScope)?;
        self.table.set_current_scope(scope)?;
        Ok(scope)
    }

    fn exit_scope(&mut self) -> Result<(), EmitError> {
        self.table.invalidate_current_scope()?;
        Ok(())
    }

    fn current_scope(&self) -> Result<ScopeId, EmitError> {
        Ok(self
            .table
            .current_scope()
            .ok_or(ScopeError::NoCurrentScope)?)
    }

    fn frame(&mut self) -> Result<&mut FunctionState, EmitError> {
        self.function
            .as_mut()
            .ok_or(EmitError::Unsupported("code outside a function"))
    }

    /// Account for `pops` values consumed and `pushes` produced.
    fn track(&mut self, pops: usize, pushes: usize) -> Result<(), EmitError> {
        let frame = self.frame()?;
        frame.stack_depth = frame.stack_depth.saturating_sub(pops) + pushes;
        frame.max_stack = frame.max_stack.max(frame.stack_depth);
        Ok(())
    }

    fn stack_depth(&mut self) -> Result<usize, EmitError> {
        Ok(self.frame()?.stack_depth)
    }

    /// Reset the tracked depth where control-flow paths join.
    fn set_stack_depth(&mut self, depth: usize) -> Result<(), EmitError> {
        let frame = self.frame()?;
        frame.stack_depth = depth;
        frame.max_stack = frame.max_stack.max(depth);
        Ok(())
    }

    fn emit_with(&mut self, opcode: Opcode, operand: Operand) -> Result<(), EmitError> {
        let (pops, pushes) = opcode
            .stack_effect()
            .ok_or(EmitError::Unsupported("invocation without arity"))?;
        self.track(usize::from(pops), usize::from(pushes))?;
        self.builder.write_instruction(opcode, operand);
        Ok(())
    }

    fn emit(&mut self, opcode: Opcode) -> Result<(), EmitError> {
        self.emit_with(opcode, Operand::None)
    }

    fn emit_local(&mut self, opcode: Opcode, slot: u8) -> Result<(), EmitError> {
        self.emit_with(opcode, Operand::Local(slot))
    }

    fn emit_constant(&mut self, opcode: Opcode, index: u16) -> Result<(), EmitError> {
        self.emit_with(opcode, Operand::Constant(index))
    }

    /// An invocation consuming `consumed` values (arguments plus receiver)
    /// and producing the result.
    fn emit_invoke(&mut self, opcode: Opcode, function: u16, consumed: usize) -> Result<(), EmitError> {
        self.track(consumed, 1)?;
        self.builder
            .write_instruction(opcode, Operand::Constant(function));
        Ok(())
    }

    /// Write a jump without touching the tracked depth; conditional jumps
    /// account for their operand where the condition is produced.
    fn write_jump(&mut self, opcode: Opcode, distance: isize) -> Result<(), EmitError> {
        let offset =
            i16::try_from(distance).map_err(|_| EmitError::JumpOutOfRange(distance.unsigned_abs()))?;
        self.builder.write_instruction(opcode, Operand::Offset(offset));
        Ok(())
    }

    /// Run `body` in a fresh channel and detach the result.
    fn in_channel(
        &mut self,
        body: impl FnOnce(&mut Self) -> Result<(), EmitError>,
    ) -> Result<Channel, EmitError> {
        self.builder.push_channel();
        body(self)?;
        Ok(self.builder.pop_channel()?)
    }

    fn append(&mut self, channel: Channel) -> Result<(), EmitError> {
        Ok(self.builder.append_channel(channel)?)
    }

    /// Slot of a local variable or parameter, allocated on first use.
    fn local_slot(&mut self, symbol: SymbolId) -> Result<u8, EmitError> {
        let frame = self.frame()?;
        if let Some(&slot) = frame.locals.get(&symbol) {
            return Ok(slot);
        }
        let slot = u8::try_from(frame.next_local).map_err(|_| EmitError::TooManyLocals {
            function: frame.name.clone(),
        })?;
        frame.next_local += 1;
        frame.locals.insert(symbol, slot);
        Ok(slot)
    }

    fn require_instance(&mut self) -> Result<(), EmitError> {
        match &self.function {
            Some(frame) if frame.instance => Ok(()),
            _ => Err(EmitError::ThisOutsideInstance),
        }
    }
}
