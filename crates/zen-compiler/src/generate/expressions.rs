//! Expressions.
//!
//! Every expression leaves exactly one value on the operand stack.
//! Operators dispatch virtually on the left operand: `a + b` becomes
//! `<a> <b> invoke_virtual zen/core/Object.plusOperator`.

use zen_bytecode::{
    FIELD_DESCRIPTOR_PLACEHOLDER, FunctionDescriptor, MAP_CLASS, MAP_FROM_ENTRIES, Opcode,
    ROOT_CLASS,
};
use zen_core::Ident;

use crate::ast::{AssignmentOperator, Expr, LogicalOperator, MapEntry, QualifiedName};
use crate::emit::EmitError;
use crate::symbols::{ScopeKind, SymbolId, SymbolKind, binary_name};

use super::{Generator, JUMP};

/// Something that can be read and assigned.
enum Place<'e> {
    Local(u8),
    /// Instance field; the receiver is `this` when `object` is `None`.
    Field {
        object: Option<&'e Expr>,
        field: u16,
    },
    Static(u16),
    Element {
        array: &'e Expr,
        index: &'e Expr,
    },
}

impl Generator<'_> {
    pub(super) fn expression(&mut self, expr: &Expr) -> Result<(), EmitError> {
        match expr {
            Expr::Literal(literal) => self.literal(literal),
            Expr::Identifier(_) | Expr::Member { .. } | Expr::Subscript { .. } => {
                let place = self.place(expr, false)?;
                self.place_prefix(&place)?;
                self.place_load(&place)
            }
            Expr::This => {
                self.require_instance()?;
                self.emit_local(Opcode::LoadA, 0)
            }
            Expr::Assignment {
                target,
                operator,
                value,
            } => self.assignment(target, *operator, value),
            Expr::Conditional {
                condition,
                then_expr,
                else_expr,
            } => self.conditional(condition, then_expr, else_expr),
            Expr::Logical {
                operator,
                left,
                right,
            } => self.logical(*operator, left, right),
            Expr::Binary {
                operator,
                left,
                right,
            } => {
                self.expression(left)?;
                self.expression(right)?;
                self.invoke_operator(operator.function_name(), 1)
            }
            Expr::Unary { operator, operand } if operator.is_update() => {
                self.update(operand, operator.function_name(), false)
            }
            Expr::Unary { operator, operand } => {
                self.expression(operand)?;
                self.invoke_operator(operator.function_name(), 0)
            }
            Expr::Postfix { operator, operand } => {
                self.update(operand, operator.function_name(), true)
            }
            Expr::Call { callee, arguments } => self.call(callee, arguments),
            Expr::New { class } => self.new_object(class),
            Expr::List(elements) => self.array(elements),
            Expr::Map(entries) => self.map(entries),
            Expr::Error(node) => Err(self.erroneous(node)),
        }
    }

    /// `receiver.name(operands...)` on the root class, resolved at run time.
    fn invoke_operator(&mut self, name: &str, operands: usize) -> Result<(), EmitError> {
        let descriptor = FunctionDescriptor::dynamic(operands, false).to_string();
        let function = self.pool.intern_function(ROOT_CLASS, name, &descriptor)?;
        self.emit_invoke(Opcode::InvokeVirtual, function, operands + 1)
    }

    fn field_ref(&mut self, class: &str, name: Ident) -> Result<u16, EmitError> {
        let name = self.text(name);
        self.pool
            .intern_field(class, name, FIELD_DESCRIPTOR_PLACEHOLDER)
    }

    fn resolve(&self, name: Ident) -> Result<SymbolId, EmitError> {
        let scope = self.current_scope()?;
        self.table
            .resolve(scope, name)
            .ok_or_else(|| self.unresolved(name))
    }

    /// Binary name of the class or enumeration `expr` names, if it names one.
    fn static_target(&self, expr: &Expr) -> Option<String> {
        let Expr::Identifier(name) = expr else {
            return None;
        };
        let scope = self.table.current_scope()?;
        let symbol = self.table.resolve(scope, *name)?;
        self.table
            .symbol(symbol)
            .kind
            .qualified_name()
            .map(str::to_string)
    }

    fn place<'e>(&mut self, expr: &'e Expr, write: bool) -> Result<Place<'e>, EmitError> {
        match expr {
            Expr::Identifier(name) => self.named_place(*name, write),
            Expr::Member { object, name } => {
                if let Some(class) = self.static_target(object) {
                    return Ok(Place::Static(self.field_ref(&class, *name)?));
                }
                let class = if matches!(**object, Expr::This) {
                    self.entity_name.clone()
                } else {
                    ROOT_CLASS.to_string()
                };
                Ok(Place::Field {
                    object: Some(&**object),
                    field: self.field_ref(&class, *name)?,
                })
            }
            Expr::Subscript { object, index } => Ok(Place::Element {
                array: &**object,
                index: &**index,
            }),
            _ => Err(EmitError::InvalidAssignmentTarget),
        }
    }

    fn named_place<'e>(&mut self, name: Ident, write: bool) -> Result<Place<'e>, EmitError> {
        let symbol = self.resolve(name)?;
        let (kind, enclosing) = {
            let symbol = self.table.symbol(symbol);
            (symbol.kind.clone(), symbol.enclosing_scope)
        };
        match kind {
            SymbolKind::Variable | SymbolKind::Constant => {
                if write && kind == SymbolKind::Constant {
                    return Err(EmitError::AssignToConstant {
                        name: self.text(name).to_string(),
                    });
                }
                match self.table.scope(enclosing).kind {
                    ScopeKind::Function | ScopeKind::Local => Ok(Place::Local(self.local_slot(symbol)?)),
                    ScopeKind::Class => {
                        self.require_instance()?;
                        let class = self.entity_name.clone();
                        Ok(Place::Field {
                            object: None,
                            field: self.field_ref(&class, name)?,
                        })
                    }
                    ScopeKind::CompilationUnit | ScopeKind::Enumeration => Err(
                        EmitError::Unsupported("variables at compilation-unit level"),
                    ),
                }
            }
            SymbolKind::Enumerate { .. } => {
                if write {
                    return Err(EmitError::AssignToConstant {
                        name: self.text(name).to_string(),
                    });
                }
                let owner = self
                    .table
                    .scope(enclosing)
                    .owner
                    .and_then(|owner| self.table.symbol(owner).kind.qualified_name())
                    .map(str::to_string)
                    .ok_or_else(|| self.unresolved(name))?;
                Ok(Place::Static(self.field_ref(&owner, name)?))
            }
            SymbolKind::Class { .. } | SymbolKind::Enumeration { .. } => {
                Err(EmitError::Unsupported("classes as values"))
            }
            SymbolKind::Function { .. } => Err(EmitError::Unsupported("functions as values")),
        }
    }

    /// Push whatever the place needs before its load or store. Returns how
    /// many values that is.
    fn place_prefix(&mut self, place: &Place<'_>) -> Result<usize, EmitError> {
        match place {
            Place::Local(_) | Place::Static(_) => Ok(0),
            Place::Field { object: None, .. } => {
                self.require_instance()?;
                self.emit_local(Opcode::LoadA, 0)?;
                Ok(1)
            }
            Place::Field {
                object: Some(object),
                ..
            } => {
                self.expression(object)?;
                Ok(1)
            }
            Place::Element { array, index } => {
                self.expression(array)?;
                self.expression(index)?;
                Ok(2)
            }
        }
    }

    /// Consume the prefix, push the value.
    fn place_load(&mut self, place: &Place<'_>) -> Result<(), EmitError> {
        match *place {
            Place::Local(slot) => self.emit_local(Opcode::LoadA, slot),
            Place::Field { field, .. } => self.emit_constant(Opcode::LoadInstanceField, field),
            Place::Static(field) => self.emit_constant(Opcode::LoadStaticField, field),
            Place::Element { .. } => self.emit(Opcode::LoadAa),
        }
    }

    /// Consume the prefix and the value on top.
    fn place_store(&mut self, place: &Place<'_>) -> Result<(), EmitError> {
        match *place {
            Place::Local(slot) => self.emit_local(Opcode::StoreA, slot),
            Place::Field { field, .. } => self.emit_constant(Opcode::StoreInstanceField, field),
            Place::Static(field) => self.emit_constant(Opcode::StoreStaticField, field),
            Place::Element { .. } => self.emit(Opcode::StoreAa),
        }
    }

    /// Duplicate the prefix so a load can consume the copy.
    fn duplicate_prefix(&mut self, prefix: usize) -> Result<(), EmitError> {
        match prefix {
            0 => Ok(()),
            1 => self.emit(Opcode::Dup),
            _ => self.emit(Opcode::Dup2),
        }
    }

    /// Tuck a copy of the top value beneath the prefix, so it survives the
    /// store.
    fn keep_value(&mut self, prefix: usize) -> Result<(), EmitError> {
        match prefix {
            0 => self.emit(Opcode::Dup),
            1 => self.emit(Opcode::DupX1),
            _ => self.emit(Opcode::DupX2),
        }
    }

    /// Leaves the assigned value on the stack.
    fn assignment(
        &mut self,
        target: &Expr,
        operator: AssignmentOperator,
        value: &Expr,
    ) -> Result<(), EmitError> {
        let place = self.place(target, true)?;
        let prefix = self.place_prefix(&place)?;
        match operator {
            AssignmentOperator::Assign => self.expression(value)?,
            AssignmentOperator::Compound(operator) => {
                self.duplicate_prefix(prefix)?;
                self.place_load(&place)?;
                self.expression(value)?;
                self.invoke_operator(operator.function_name(), 1)?;
            }
        }
        self.keep_value(prefix)?;
        self.place_store(&place)
    }

    /// `++x` leaves the new value, `x++` the old one.
    fn update(&mut self, target: &Expr, function: &str, postfix: bool) -> Result<(), EmitError> {
        let place = self.place(target, true)?;
        let prefix = self.place_prefix(&place)?;
        self.duplicate_prefix(prefix)?;
        self.place_load(&place)?;
        if postfix {
            self.keep_value(prefix)?;
            self.invoke_operator(function, 0)?;
        } else {
            self.invoke_operator(function, 0)?;
            self.keep_value(prefix)?;
        }
        self.place_store(&place)
    }

    /// `condition ? a : b`.
    fn conditional(&mut self, condition: &Expr, then_expr: &Expr, else_expr: &Expr) -> Result<(), EmitError> {
        self.expression(condition)?;
        self.track(1, 0)?;
        let depth = self.stack_depth()?;
        let then = self.in_channel(|g| g.expression(then_expr))?;
        self.set_stack_depth(depth)?;
        let otherwise = self.in_channel(|g| g.expression(else_expr))?;

        self.write_jump(Opcode::JumpEq0I, (JUMP + then.len() + JUMP) as isize)?;
        self.append(then)?;
        self.write_jump(Opcode::Jump, (JUMP + otherwise.len()) as isize)?;
        self.append(otherwise)
    }

    /// Short circuit: the left value is the result when it decides.
    ///
    /// ```text
    ///     <left>
    ///     dup
    ///     jump_eq0_i end     ; jump_ne0_i for ||
    ///     pop
    ///     <right>
    /// end:
    /// ```
    fn logical(&mut self, operator: LogicalOperator, left: &Expr, right: &Expr) -> Result<(), EmitError> {
        self.expression(left)?;
        self.emit(Opcode::Dup)?;
        self.track(1, 0)?;
        let rest = self.in_channel(|g| {
            g.emit(Opcode::Pop)?;
            g.expression(right)
        })?;
        let jump = match operator {
            LogicalOperator::And => Opcode::JumpEq0I,
            LogicalOperator::Or => Opcode::JumpNe0I,
        };
        self.write_jump(jump, (JUMP + rest.len()) as isize)?;
        self.append(rest)
    }

    fn call(&mut self, callee: &Expr, arguments: &[Expr]) -> Result<(), EmitError> {
        match callee {
            Expr::Identifier(name) => self.call_declared(*name, arguments),
            Expr::Member { object, name } => {
                let descriptor = FunctionDescriptor::dynamic(arguments.len(), false).to_string();
                let method = self.text(*name);
                if let Some(class) = self.static_target(object) {
                    for argument in arguments {
                        self.expression(argument)?;
                    }
                    let function = self.pool.intern_function(&class, method, &descriptor)?;
                    return self.emit_invoke(Opcode::InvokeStatic, function, arguments.len());
                }
                self.expression(object)?;
                for argument in arguments {
                    self.expression(argument)?;
                }
                let function = self.pool.intern_function(ROOT_CLASS, method, &descriptor)?;
                self.emit_invoke(Opcode::InvokeVirtual, function, arguments.len() + 1)
            }
            _ => Err(EmitError::Unsupported("calls through computed callees")),
        }
    }

    /// A function declared in this unit: static at unit level, virtual on
    /// `this` inside a class. Surplus arguments of a variadic function are
    /// packed into an array.
    fn call_declared(&mut self, name: Ident, arguments: &[Expr]) -> Result<(), EmitError> {
        let symbol = self.resolve(name)?;
        let (kind, enclosing) = {
            let symbol = self.table.symbol(symbol);
            (symbol.kind.clone(), symbol.enclosing_scope)
        };
        let text = self.text(name);
        let SymbolKind::Function {
            fixed_parameters,
            variadic,
        } = kind
        else {
            return Err(EmitError::NotCallable {
                name: text.to_string(),
            });
        };

        let found = arguments.len();
        if found < fixed_parameters || (!variadic && found != fixed_parameters) {
            let expected = if variadic {
                format!("at least {fixed_parameters}")
            } else {
                fixed_parameters.to_string()
            };
            return Err(EmitError::ArityMismatch {
                function: text.to_string(),
                expected,
                found,
            });
        }

        let instance = self.table.scope(enclosing).kind == ScopeKind::Class;
        if instance {
            self.require_instance()?;
            self.emit_local(Opcode::LoadA, 0)?;
        }
        let (fixed, rest) = arguments.split_at(fixed_parameters);
        for argument in fixed {
            self.expression(argument)?;
        }
        if variadic {
            self.array(rest)?;
        }

        let descriptor = FunctionDescriptor::dynamic(fixed_parameters, variadic).to_string();
        let class = self.entity_name.clone();
        let function = self.pool.intern_function(&class, text, &descriptor)?;
        let passed = fixed_parameters + usize::from(variadic);
        if instance {
            self.emit_invoke(Opcode::InvokeVirtual, function, passed + 1)
        } else {
            self.emit_invoke(Opcode::InvokeStatic, function, passed)
        }
    }

    fn new_object(&mut self, class: &QualifiedName) -> Result<(), EmitError> {
        let scope = self.current_scope()?;
        let resolved = self
            .table
            .resolve_qualified_symbol(scope, class, self.interner)
            .map(|symbol| &self.table.symbol(symbol).kind);
        let Some(SymbolKind::Class { qualified_name }) = resolved else {
            return Err(EmitError::NotAClass {
                name: binary_name(class.parts.iter().map(|&p| self.text(p))),
            });
        };
        let qualified_name = qualified_name.clone();
        let class = self.pool.intern_class(&qualified_name)?;
        self.emit_constant(Opcode::New, class)
    }

    /// An object array holding `elements`, each generated in its own
    /// channel:
    ///
    /// ```text
    ///     <size> new_array_a zen/core/Object
    ///     dup <i> <element i> store_aa       ; per element
    /// ```
    fn array(&mut self, elements: &[Expr]) -> Result<(), EmitError> {
        self.new_array(elements.len())?;
        for (i, element) in elements.iter().enumerate() {
            self.builder.push_channel();
            self.store_element(i, element)?;
            self.builder.merge_channel()?;
        }
        Ok(())
    }

    fn new_array(&mut self, size: usize) -> Result<(), EmitError> {
        self.push_index(size)?;
        let class = self.pool.intern_class(ROOT_CLASS)?;
        self.emit_constant(Opcode::NewArrayA, class)
    }

    /// `array[index] = value`, keeping the array on the stack.
    fn store_element(&mut self, index: usize, value: &Expr) -> Result<(), EmitError> {
        self.emit(Opcode::Dup)?;
        self.push_index(index)?;
        self.expression(value)?;
        self.emit(Opcode::StoreAa)
    }

    fn push_index(&mut self, index: usize) -> Result<(), EmitError> {
        let index = i32::try_from(index).map_err(|_| EmitError::Unsupported("literals with more than 2^31 elements"))?;
        self.push_integer(index)
    }

    /// An array of `[key, value]` pairs handed to `zen/core/Map.fromEntries`.
    /// Each entry, and within it the key and the value, is generated in its
    /// own channel.
    fn map(&mut self, entries: &[MapEntry]) -> Result<(), EmitError> {
        self.new_array(entries.len())?;
        for (i, entry) in entries.iter().enumerate() {
            self.builder.push_channel();
            self.emit(Opcode::Dup)?;
            self.push_index(i)?;
            self.new_array(2)?;

            self.builder.push_channel();
            self.store_element(0, &entry.key)?;
            self.builder.push_channel();
            self.store_element(1, &entry.value)?;
            self.builder.merge_channel()?;
            self.builder.merge_channel()?;

            self.emit(Opcode::StoreAa)?;
            self.builder.merge_channel()?;
        }
        let descriptor = FunctionDescriptor::dynamic(1, false).to_string();
        let function = self
            .pool
            .intern_function(MAP_CLASS, MAP_FROM_ENTRIES, &descriptor)?;
        self.emit_invoke(Opcode::InvokeStatic, function, 1)
    }
}
