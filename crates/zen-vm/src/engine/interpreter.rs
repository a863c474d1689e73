//! The interpreter loop.
//!
//! One interpreter runs one thread's invocations. Calls between Zen
//! functions push frames onto the invocation stack instead of recursing on
//! the host stack; `run` loops until the frame it was started for returns.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;
use zen_bytecode::{
    ConstantPool, ConstantPoolEntry, EntityType, FunctionDescriptor, Instruction, MAP_CLASS,
    MAP_FROM_ENTRIES, Opcode, Operand,
};

use super::class::{ClassTable, LoadedClass, Target};
use super::error::RuntimeError;
use super::frame::{Frame, InvocationStack};
use super::heap::{Heap, mismatch};
use super::intrinsics;
use super::trace::{NoopTracer, Tracer};
use super::value::Value;
use super::vm::Limits;

type Result<T> = std::result::Result<T, RuntimeError>;

/// What the current frame does after an instruction.
enum Flow {
    Continue,
    Return(Value),
    Throw(Value),
}

pub struct Interpreter<'c, T: Tracer = NoopTracer> {
    classes: &'c ClassTable,
    heap: Heap,
    /// Static fields written at run time, by (class, field).
    statics: HashMap<(String, String), Value>,
    frames: InvocationStack,
    limits: Limits,
    steps: u64,
    tracer: T,
}

impl<'c> Interpreter<'c, NoopTracer> {
    pub fn new(classes: &'c ClassTable, limits: Limits) -> Self {
        Self::with_tracer(classes, limits, NoopTracer)
    }
}

impl<'c, T: Tracer> Interpreter<'c, T> {
    pub fn with_tracer(classes: &'c ClassTable, limits: Limits, tracer: T) -> Self {
        Self {
            classes,
            heap: Heap::new(),
            statics: HashMap::new(),
            frames: InvocationStack::new(),
            limits,
            steps: 0,
            tracer,
        }
    }

    pub fn heap(&self) -> &Heap {
        &self.heap
    }

    pub fn heap_mut(&mut self) -> &mut Heap {
        &mut self.heap
    }

    /// Instructions executed so far.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn tracer(&self) -> &T {
        &self.tracer
    }

    pub fn into_tracer(self) -> T {
        self.tracer
    }

    /// Call the function `name` of `class` (or an ancestor) accepting
    /// `arguments`. An instance function runs on a freshly initialized
    /// instance of `class`.
    pub fn invoke(&mut self, class: &str, name: &str, arguments: Vec<Value>) -> Result<Value> {
        let loaded = Arc::clone(self.classes.require(class)?);
        let descriptor = FunctionDescriptor::dynamic(arguments.len(), false).to_string();
        let target = self
            .classes
            .resolve_virtual(class, name, &descriptor, arguments.len())
            .ok_or_else(|| RuntimeError::FunctionNotFound {
                class: class.to_string(),
                name: name.to_string(),
                descriptor,
            })?;
        let is_static = target.class.function(target.function).is_static();
        debug!(class, function = name, owner = %target.class.name, "invoke");

        let mut arguments = self.pack(arguments, target.pack_from);
        if !is_static {
            let receiver = self.instantiate(&loaded)?;
            arguments.insert(0, receiver);
        }
        self.call(target.class, target.function, arguments)
    }

    /// Run one function to completion. `arguments` fill the first local
    /// slots, the receiver first for instance functions.
    pub fn call(&mut self, class: Arc<LoadedClass>, function: usize, arguments: Vec<Value>) -> Result<Value> {
        let base = self.frames.depth();
        self.enter(class, function, arguments, false)?;
        let result = self.run(base);
        if result.is_err() {
            self.frames.truncate(base);
        }
        result
    }

    /// A new instance with the initializers of its lineage already run.
    pub fn instantiate(&mut self, class: &Arc<LoadedClass>) -> Result<Value> {
        let object = self.allocate(class)?;
        for (owner, initializer) in self.initializers(class) {
            self.call(owner, initializer, vec![object.clone()])?;
        }
        Ok(object)
    }

    /// Initializers along the lineage of `class`, deepest ancestor first.
    fn initializers(&self, class: &Arc<LoadedClass>) -> Vec<(Arc<LoadedClass>, usize)> {
        let mut order: Vec<_> = self
            .classes
            .lineage(&class.name)
            .into_iter()
            .filter_map(|name| self.classes.get(name))
            .filter_map(|owner| owner.initializer().map(|i| (Arc::clone(owner), i)))
            .collect();
        order.reverse();
        order
    }

    /// An instance with every field of its lineage set to null.
    fn allocate(&mut self, class: &Arc<LoadedClass>) -> Result<Value> {
        if class.entity_type == EntityType::Enumeration {
            return Err(RuntimeError::NotInstantiable {
                class: class.name.clone(),
            });
        }
        let mut fields = IndexMap::new();
        for ancestor in self.classes.lineage(&class.name) {
            let Some(ancestor) = self.classes.get(ancestor) else {
                continue;
            };
            for field in ancestor.fields.iter().filter(|f| !f.is_static()) {
                fields.entry(field.name.clone()).or_insert(Value::Null);
            }
        }
        Ok(self.heap.alloc_instance(Arc::clone(class), fields))
    }

    fn enter(
        &mut self,
        class: Arc<LoadedClass>,
        function: usize,
        arguments: Vec<Value>,
        discard_result: bool,
    ) -> Result<()> {
        let limit = self.limits.get_recursion_limit();
        if self.frames.depth() >= limit as usize {
            return Err(RuntimeError::RecursionLimitExceeded(limit));
        }
        self.tracer.trace_call(&class, function, self.frames.depth() + 1);
        let mut frame = Frame::new(class, function, arguments);
        frame.discard_result = discard_result;
        self.frames.push(frame);
        Ok(())
    }

    /// Surplus arguments from `pack_from` on become one array argument.
    fn pack(&mut self, mut arguments: Vec<Value>, pack_from: Option<usize>) -> Vec<Value> {
        if let Some(from) = pack_from {
            let rest = arguments.split_off(from.min(arguments.len()));
            arguments.push(self.heap.alloc_array(rest));
        }
        arguments
    }

    fn consume_fuel(&mut self) -> Result<()> {
        if let Some(fuel) = self.limits.get_exec_fuel()
            && self.steps >= fuel
        {
            return Err(RuntimeError::ExecFuelExhausted(fuel));
        }
        self.steps += 1;
        Ok(())
    }

    fn frame(&mut self) -> Result<&mut Frame> {
        self.frames.current_mut().ok_or(RuntimeError::StackUnderflow)
    }

    /// Execute until the stack shrinks back to `base` frames.
    fn run(&mut self, base: usize) -> Result<Value> {
        loop {
            self.consume_fuel()?;
            let frame = self.frames.current_mut().ok_or(RuntimeError::StackUnderflow)?;
            let Some(instr) = frame.function().code.get(frame.pc).copied() else {
                return Err(RuntimeError::FellOffCode(frame.function().name.clone()));
            };
            frame.pc += 1;
            self.tracer.trace_instruction(&frame.class, frame.function, &instr);

            match self.execute(&instr)? {
                Flow::Continue => {}
                Flow::Return(value) => {
                    let finished = self.frames.pop().ok_or(RuntimeError::StackUnderflow)?;
                    self.tracer.trace_return(&value, self.frames.depth());
                    if self.frames.depth() <= base {
                        return Ok(value);
                    }
                    if !finished.discard_result {
                        self.frame()?.push(value);
                    }
                }
                Flow::Throw(value) => self.unwind(value, base)?,
            }
        }
    }

    /// Transfer control to the innermost handler catching `value`, popping
    /// frames that have none. Frames below `base` are never touched.
    fn unwind(&mut self, value: Value, base: usize) -> Result<()> {
        self.tracer.trace_throw(&value);
        let thrown = self.heap.class_name(&value).map(str::to_string);
        let classes = self.classes;
        while self.frames.depth() > base {
            let frame = self.frame()?;
            let offset = frame.current_offset();
            let function = frame.function();
            let handler = function
                .handlers
                .iter()
                .filter(|site| offset.is_some_and(|o| site.covers(o)))
                .find(|site| catches(classes, &frame.class.pool, site.catch_type, thrown.as_deref()))
                .and_then(|site| function.position(usize::from(site.handler_pc)));
            if let Some(target) = handler {
                debug!(function = %function.name, handler = target, "exception caught");
                frame.stack.clear();
                frame.push(value);
                frame.pc = target;
                return Ok(());
            }
            self.frames.pop();
        }
        Err(RuntimeError::UncaughtException(self.describe(&value)))
    }

    fn describe(&self, value: &Value) -> String {
        match self.heap.class_of(value) {
            Some(class) => class.name.clone(),
            None => intrinsics::display(&self.heap, value),
        }
    }

    fn execute(&mut self, instr: &Instruction) -> Result<Flow> {
        use Opcode::*;

        // Borrow the frame through the field so the heap stays reachable.
        let frame = self.frames.current_mut().ok_or(RuntimeError::StackUnderflow)?;
        match (instr.opcode, instr.operand) {
            (Nop, _) => {}
            (PushNull, _) => frame.push(Value::Null),
            (PushI0, _) => frame.push(Value::Int(0)),
            (PushI1, _) => frame.push(Value::Int(1)),
            (PushI2, _) => frame.push(Value::Int(2)),
            (PushI3, _) => frame.push(Value::Int(3)),
            (PushI4, _) => frame.push(Value::Int(4)),
            (PushI5, _) => frame.push(Value::Int(5)),
            (PushL0, _) => frame.push(Value::Long(0)),
            (PushL1, _) => frame.push(Value::Long(1)),
            (PushL2, _) => frame.push(Value::Long(2)),
            (PushB, Operand::Byte(v)) => frame.push(Value::Int(i32::from(v))),
            (PushS, Operand::Short(v)) => frame.push(Value::Int(i32::from(v))),
            (LoadCpr, Operand::Constant(index)) => {
                let value = constant(&frame.class.pool, index)?;
                frame.push(value);
            }

            (LoadA, Operand::Local(slot)) => {
                let value = frame.local(slot)?;
                frame.push(value);
            }
            (StoreA, Operand::Local(slot)) => {
                let value = frame.pop()?;
                frame.set_local(slot, value)?;
            }
            (LoadInstanceField, Operand::Constant(index)) => {
                let name = member_name(&frame.class.pool, index)?;
                let object = frame.pop()?;
                let value = self.heap.load_field(&object, &name)?;
                self.frame()?.push(value);
            }
            (StoreInstanceField, Operand::Constant(index)) => {
                let name = member_name(&frame.class.pool, index)?;
                let value = frame.pop()?;
                let object = frame.pop()?;
                self.heap.store_field(&object, &name, value)?;
            }
            (LoadStaticField, Operand::Constant(index)) => {
                let (class, name) = member_owner(&frame.class.pool, index)?;
                let value = self.load_static(&class, &name)?;
                self.frame()?.push(value);
            }
            (StoreStaticField, Operand::Constant(index)) => {
                let (class, name) = member_owner(&frame.class.pool, index)?;
                let value = frame.pop()?;
                self.store_static(class, name, value)?;
            }

            (New, Operand::Constant(index)) => {
                let name = frame
                    .class
                    .pool
                    .class_name(index)
                    .ok_or(RuntimeError::InvalidConstant(index))?
                    .to_string();
                self.new_object(&name)?;
            }
            (NewArrayA, Operand::Constant(_)) => {
                let size = frame.pop()?;
                let length = match size {
                    Value::Int(v) => i64::from(v),
                    Value::Long(v) => v,
                    _ => return Err(mismatch("new_array_a", &size)),
                };
                let length = usize::try_from(length).map_err(|_| RuntimeError::NegativeArraySize(length))?;
                let array = self.heap.alloc_array(vec![Value::Null; length]);
                self.frame()?.push(array);
            }
            (LoadAa, _) => {
                let index = frame.pop()?;
                let container = frame.pop()?;
                let value = self.heap.load_element(&container, &index)?;
                self.frame()?.push(value);
            }
            (StoreAa, _) => {
                let value = frame.pop()?;
                let index = frame.pop()?;
                let container = frame.pop()?;
                self.heap.store_element(&container, index, value)?;
            }

            (Pop, _) => {
                frame.pop()?;
            }
            (Dup, _) => {
                let top = frame.peek(0)?.clone();
                frame.push(top);
            }
            (DupX1, _) => {
                let [a, b] = pop_array(frame)?;
                frame.stack.extend([b.clone(), a, b]);
            }
            (DupX2, _) => {
                let [a, b, c] = pop_array(frame)?;
                frame.stack.extend([c.clone(), a, b, c]);
            }
            (Dup2, _) => {
                let [a, b] = pop_array(frame)?;
                frame.stack.extend([a.clone(), b.clone(), a, b]);
            }
            (Swap, _) => {
                let [a, b] = pop_array(frame)?;
                frame.stack.extend([b, a]);
            }

            (InvokeVirtual, Operand::Constant(index)) => self.invoke_virtual(index)?,
            (InvokeStatic, Operand::Constant(index)) => self.invoke_static(index)?,

            (Jump, _) => jump(frame, instr)?,
            (JumpEq0I, _) => {
                if !frame.pop()?.truthy()? {
                    jump(frame, instr)?;
                }
            }
            (JumpNe0I, _) => {
                if frame.pop()?.truthy()? {
                    jump(frame, instr)?;
                }
            }

            (Return, _) => return Ok(Flow::Return(Value::Null)),
            (ReturnA, _) => return Ok(Flow::Return(frame.pop()?)),
            (Throw, _) => {
                let value = frame.pop()?;
                if value == Value::Null {
                    return Err(RuntimeError::NullReference("throw".to_string()));
                }
                return Ok(Flow::Throw(value));
            }

            // Decoding pairs every opcode with its operand kind.
            (opcode, operand) => unreachable!("{} decoded with {operand:?}", opcode.mnemonic()),
        }
        Ok(Flow::Continue)
    }

    fn new_object(&mut self, name: &str) -> Result<()> {
        let class = Arc::clone(self.classes.require(name)?);
        let object = self.allocate(&class)?;
        self.frame()?.push(object.clone());
        // The top frame runs first, so the deepest ancestor goes on last.
        for (owner, initializer) in self.initializers(&class).into_iter().rev() {
            self.enter(owner, initializer, vec![object.clone()], true)?;
        }
        Ok(())
    }

    fn load_static(&self, class: &str, name: &str) -> Result<Value> {
        if let Some(value) = self.statics.get(&(class.to_string(), name.to_string())) {
            return Ok(value.clone());
        }
        let loaded = self.classes.require(class)?;
        let field = loaded
            .field(name)
            .filter(|f| f.is_static())
            .ok_or_else(|| RuntimeError::FieldNotFound {
                class: class.to_string(),
                name: name.to_string(),
            })?;
        if loaded.entity_type == EntityType::Enumeration {
            let ordinal = loaded.ordinal(&field.name).unwrap_or_default();
            return Ok(Value::Int(ordinal as i32));
        }
        Ok(Value::Null)
    }

    fn store_static(&mut self, class: String, name: String, value: Value) -> Result<()> {
        let loaded = self.classes.require(&class)?;
        match loaded.field(&name) {
            Some(field) if field.is_static() && field.is_final() => {
                Err(RuntimeError::FinalField { class, name })
            }
            Some(field) if field.is_static() => {
                self.statics.insert((class, name), value);
                Ok(())
            }
            _ => Err(RuntimeError::FieldNotFound { class, name }),
        }
    }

    fn invoke_virtual(&mut self, index: u16) -> Result<()> {
        let frame = self.frame()?;
        let pool_owner = Arc::clone(&frame.class);
        let member = pool_owner
            .pool
            .member_ref(index)
            .ok_or(RuntimeError::InvalidConstant(index))?;
        let count = FunctionDescriptor::parse(member.descriptor)?.parameter_count();
        let arguments = frame.pop_n(count)?;
        let receiver = frame.pop()?;

        match receiver {
            Value::Null => Err(RuntimeError::NullReference(member.name.to_string())),
            Value::Object(_) => {
                let runtime = self
                    .heap
                    .class_name(&receiver)
                    .unwrap_or_default()
                    .to_string();
                if let Some(target) =
                    self.classes
                        .resolve_virtual(&runtime, member.name, member.descriptor, count)
                {
                    let mut with_receiver = vec![receiver];
                    with_receiver.extend(arguments);
                    // The receiver shifts every packed position by one.
                    let target = Target {
                        pack_from: target.pack_from.map(|p| p + 1),
                        ..target
                    };
                    return self.enter_target(target, with_receiver);
                }
                let value = intrinsics::object_fallback(&self.heap, member.name, &receiver, &arguments)
                    .ok_or_else(|| RuntimeError::FunctionNotFound {
                        class: runtime,
                        name: member.name.to_string(),
                        descriptor: member.descriptor.to_string(),
                    })?;
                self.frame()?.push(value);
                Ok(())
            }
            _ => {
                let value = intrinsics::invoke(&self.heap, member.name, &receiver, &arguments)
                    .ok_or_else(|| RuntimeError::FunctionNotFound {
                        class: receiver.builtin_class().unwrap_or_default().to_string(),
                        name: member.name.to_string(),
                        descriptor: member.descriptor.to_string(),
                    })??;
                self.frame()?.push(value);
                Ok(())
            }
        }
    }

    fn invoke_static(&mut self, index: u16) -> Result<()> {
        let frame = self.frame()?;
        let pool_owner = Arc::clone(&frame.class);
        let member = pool_owner
            .pool
            .member_ref(index)
            .ok_or(RuntimeError::InvalidConstant(index))?;
        let count = FunctionDescriptor::parse(member.descriptor)?.parameter_count();
        let arguments = frame.pop_n(count)?;

        if member.class == MAP_CLASS && member.name == MAP_FROM_ENTRIES {
            let [entries] = <[Value; 1]>::try_from(arguments).map_err(|_| RuntimeError::StackUnderflow)?;
            let map = intrinsics::from_entries(&mut self.heap, &entries)?;
            self.frame()?.push(map);
            return Ok(());
        }

        let target = self
            .classes
            .resolve_static(member.class, member.name, member.descriptor, count)?;
        if !target.class.function(target.function).is_static() {
            return Err(RuntimeError::FunctionNotFound {
                class: member.class.to_string(),
                name: member.name.to_string(),
                descriptor: member.descriptor.to_string(),
            });
        }
        self.enter_target(target, arguments)
    }

    fn enter_target(&mut self, target: Target, arguments: Vec<Value>) -> Result<()> {
        let arguments = self.pack(arguments, target.pack_from);
        self.enter(target.class, target.function, arguments, false)
    }
}

fn pop_array<const N: usize>(frame: &mut Frame) -> Result<[Value; N]> {
    let values = frame.pop_n(N)?;
    <[Value; N]>::try_from(values).map_err(|_| RuntimeError::StackUnderflow)
}

fn jump(frame: &mut Frame, instr: &Instruction) -> Result<()> {
    let target = instr.jump_target();
    let position = target.and_then(|t| frame.function().position(t));
    frame.pc = position.ok_or(RuntimeError::InvalidJump {
        from: instr.offset,
        target: target.map_or(-1, |t| t as isize),
    })?;
    Ok(())
}

fn constant(pool: &ConstantPool, index: u16) -> Result<Value> {
    Ok(match pool.get(index) {
        Some(ConstantPoolEntry::Integer(v)) => Value::Int(*v),
        Some(ConstantPoolEntry::Long(v)) => Value::Long(*v),
        Some(ConstantPoolEntry::Float(v)) => Value::Float(*v),
        Some(ConstantPoolEntry::Double(v)) => Value::Double(*v),
        Some(ConstantPoolEntry::String { .. }) => {
            let text = pool.string(index).ok_or(RuntimeError::InvalidConstant(index))?;
            Value::string(text)
        }
        _ => return Err(RuntimeError::InvalidConstant(index)),
    })
}

fn member_name(pool: &ConstantPool, index: u16) -> Result<String> {
    member_owner(pool, index).map(|(_, name)| name)
}

fn member_owner(pool: &ConstantPool, index: u16) -> Result<(String, String)> {
    let member = pool.member_ref(index).ok_or(RuntimeError::InvalidConstant(index))?;
    Ok((member.class.to_string(), member.name.to_string()))
}

/// Whether a handler for pool class `catch_type` catches a value of class
/// `thrown`. Index 0 catches everything.
fn catches(classes: &ClassTable, pool: &ConstantPool, catch_type: u16, thrown: Option<&str>) -> bool {
    if catch_type == 0 {
        return true;
    }
    match (pool.class_name(catch_type), thrown) {
        (Some(caught), Some(thrown)) => classes.is_a(thrown, caught),
        _ => false,
    }
}
