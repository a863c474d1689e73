//! Compilation unit, class, enumeration and function declarations.

use tracing::{debug, error};
use zen_bytecode::{
    Attribute, EntityFile, EntityType, ExceptionTable, FIELD_DESCRIPTOR_PLACEHOLDER, FieldEntity,
    FunctionDescriptor, FunctionEntity, INITIALIZER, InstructionAttribute, Opcode, ROOT_CLASS,
    Version, attribute_name, flags,
};
use zen_core::Ident;

use crate::ast::{
    ClassDecl, ClassMember, CompilationUnit, Component, EnumerationDecl, Expr, FunctionDecl,
};
use crate::emit::{Channel, ChannelError, EmitError};
use crate::symbols::{SymbolKind, binary_name};

use super::{FunctionState, Generator};

impl Generator<'_> {
    /// Generate the entity of `unit`. A generator handles exactly one unit.
    pub fn generate(&mut self, unit: &CompilationUnit) -> Result<EntityFile, EmitError> {
        self.enter_scope(unit.id)?;

        let (entity_type, entity_name) = self.entity_identity(unit)?;
        debug!(entity = %entity_name, kind = entity_type.keyword(), "generating entity");
        self.entity.entity_type = entity_type;
        self.entity.reference = self.pool.intern_utf8(&entity_name)?;
        self.entity_name = entity_name;
        if entity_type == EntityType::Class {
            self.entity.superclasses = vec![self.pool.intern_utf8(ROOT_CLASS)?];
        }

        for component in &unit.components {
            match component {
                Component::Class(class) => self.class(class)?,
                Component::Enumeration(enumeration) => self.enumeration(enumeration)?,
                Component::Function(function) => self.function(function, false)?,
                Component::Variable(_) => {
                    return Err(EmitError::Unsupported("variables at compilation-unit level"));
                }
                Component::Error(node) => return Err(self.erroneous(node)),
            }
        }

        if let Some(source_file) = &self.config.source_file {
            let name_index = self.pool.intern_utf8(attribute_name::SOURCE_FILE)?;
            let source_file_index = self.pool.intern_utf8(source_file)?;
            self.entity.attributes.push(Attribute::SourceFile {
                name_index,
                source_file_index,
            });
        }

        self.exit_scope()?;
        if self.builder.depth() != 1 {
            return Err(ChannelError::Unbalanced(self.builder.depth()).into());
        }

        let mut entity = std::mem::take(&mut self.entity);
        entity.fields = std::mem::take(&mut self.fields);
        entity.functions = std::mem::take(&mut self.functions);
        Ok(EntityFile {
            version: Version::CURRENT,
            stream_flags: self.config.stream_flags,
            constant_pool: std::mem::take(&mut self.pool).into_pool(),
            entity,
        })
    }

    /// The single class or enumeration of the unit, or a class named after
    /// the unit when it declares neither.
    fn entity_identity(&self, unit: &CompilationUnit) -> Result<(EntityType, String), EmitError> {
        let scope = self.current_scope()?;
        let declared: Vec<(EntityType, Ident)> = unit
            .components
            .iter()
            .filter_map(|component| match component {
                Component::Class(class) => Some((EntityType::Class, class.name)),
                Component::Enumeration(enumeration) => {
                    Some((EntityType::Enumeration, enumeration.name))
                }
                _ => None,
            })
            .collect();

        match declared.as_slice() {
            [] => {
                let name = self.text(unit.name);
                let qualified = match &unit.package {
                    Some(package) => {
                        let mut parts: Vec<&str> =
                            package.parts.iter().map(|&p| self.text(p)).collect();
                        parts.push(name);
                        binary_name(parts)
                    }
                    None => name.to_string(),
                };
                Ok((EntityType::Class, qualified))
            }
            [(entity_type, name)] => {
                let symbol = self
                    .table
                    .resolve(scope, *name)
                    .ok_or_else(|| self.unresolved(*name))?;
                let qualified = self
                    .table
                    .symbol(symbol)
                    .kind
                    .qualified_name()
                    .ok_or_else(|| EmitError::NotAClass {
                        name: self.text(*name).to_string(),
                    })?;
                Ok((*entity_type, qualified.to_string()))
            }
            many => Err(EmitError::MultipleEntities { count: many.len() }),
        }
    }

    pub(super) fn unresolved(&self, name: Ident) -> EmitError {
        let name = self.text(name).to_string();
        error!(%name, "symbol did not resolve; semantic analysis must have failed");
        EmitError::UnresolvedSymbol { name }
    }

    fn class(&mut self, class: &ClassDecl) -> Result<(), EmitError> {
        // Superclasses resolve against the enclosing scope, never the class's own.
        let enclosing = self.current_scope()?;
        if !class.extends.is_empty() {
            let mut superclasses = Vec::with_capacity(class.extends.len());
            for name in &class.extends {
                let resolved = self
                    .table
                    .resolve_qualified_symbol(enclosing, name, self.interner)
                    .map(|symbol| &self.table.symbol(symbol).kind);
                let Some(SymbolKind::Class { qualified_name }) = resolved else {
                    let text = binary_name(name.parts.iter().map(|&p| self.text(p)));
                    error!(
                        class = self.text(class.name),
                        superclass = %text,
                        "superclass is not a class; semantic analysis must have failed"
                    );
                    return Err(EmitError::NotAClass { name: text });
                };
                let qualified_name = qualified_name.clone();
                superclasses.push(self.pool.intern_utf8(&qualified_name)?);
            }
            self.entity.superclasses = superclasses;
        }

        self.enter_scope(class.id)?;
        let mut initializers: Vec<(Ident, &Expr)> = Vec::new();
        for member in &class.members {
            match member {
                ClassMember::Variable(variable) => {
                    let field_flags = if variable.constant { flags::FINAL } else { 0 };
                    for declarator in &variable.declarators {
                        self.field(declarator.name, field_flags)?;
                        if let Some(initializer) = &declarator.initializer {
                            initializers.push((declarator.name, initializer));
                        }
                    }
                }
                ClassMember::Function(function) => self.function(function, true)?,
                ClassMember::Error(node) => return Err(self.erroneous(node)),
            }
        }
        if !initializers.is_empty() {
            self.initializer(&initializers)?;
        }
        self.exit_scope()
    }

    fn enumeration(&mut self, enumeration: &EnumerationDecl) -> Result<(), EmitError> {
        self.enter_scope(enumeration.id)?;
        for &enumerate in &enumeration.enumerates {
            self.field(enumerate, flags::STATIC | flags::FINAL)?;
        }
        self.exit_scope()
    }

    /// A variable declared directly in a class scope is a field.
    fn field(&mut self, name: Ident, field_flags: u16) -> Result<(), EmitError> {
        let text = self.text(name);
        let name_index = self.pool.intern_utf8(text)?;
        let descriptor_index = self.pool.intern_utf8(FIELD_DESCRIPTOR_PLACEHOLDER)?;
        debug!(field = text, "field");
        self.fields.push(FieldEntity {
            flags: field_flags,
            name_index,
            descriptor_index,
        });
        Ok(())
    }

    /// `instance` functions are declared in a class and receive `this`.
    fn function(&mut self, function: &FunctionDecl, instance: bool) -> Result<(), EmitError> {
        let scope = self.enter_scope(function.id)?;
        let name = self.text(function.name);
        self.function = Some(FunctionState::new(name.to_string(), instance));
        self.builder.push_channel();
        // An instruction stream is never empty.
        self.emit(Opcode::Nop)?;

        for &parameter in function.parameters.iter().chain(&function.variadic) {
            let symbol = self
                .table
                .resolve(scope, parameter)
                .ok_or_else(|| self.unresolved(parameter))?;
            self.local_slot(symbol)?;
        }

        self.block(&function.body)?;
        self.emit(Opcode::Return)?;
        let code = self.builder.pop_channel()?;
        self.exit_scope()?;

        let descriptor =
            FunctionDescriptor::dynamic(function.parameters.len(), function.variadic.is_some());
        let function_flags = if instance { 0 } else { flags::STATIC };
        self.finish_function(code, &descriptor.to_string(), function_flags)
    }

    /// The synthetic instance function storing field initializers, run by
    /// the virtual machine right after `new`.
    fn initializer(&mut self, initializers: &[(Ident, &Expr)]) -> Result<(), EmitError> {
        self.function = Some(FunctionState::new(INITIALIZER.to_string(), true));
        self.builder.push_channel();
        self.emit(Opcode::Nop)?;
        for &(name, value) in initializers {
            let name = self.text(name);
            let field =
                self.pool
                    .intern_field(&self.entity_name, name, FIELD_DESCRIPTOR_PLACEHOLDER)?;
            self.emit_local(Opcode::LoadA, 0)?;
            self.expression(value)?;
            self.emit_constant(Opcode::StoreInstanceField, field)?;
        }
        self.emit(Opcode::Return)?;
        let code = self.builder.pop_channel()?;
        let descriptor = FunctionDescriptor::dynamic(0, false);
        self.finish_function(code, &descriptor.to_string(), flags::SYNTHETIC)
    }

    /// Package the current function's channel into a function entity.
    fn finish_function(
        &mut self,
        code: Channel,
        descriptor: &str,
        function_flags: u16,
    ) -> Result<(), EmitError> {
        let state = self
            .function
            .take()
            .ok_or(EmitError::Unsupported("function exit without entry"))?;
        let name_index = self.pool.intern_utf8(&state.name)?;
        let descriptor_index = self.pool.intern_utf8(descriptor)?;
        let attribute_index = self.pool.intern_utf8(attribute_name::INSTRUCTION)?;

        let max_stack_size = u16::try_from(state.max_stack).map_err(|_| EmitError::StackTooDeep {
            function: state.name.clone(),
        })?;
        let (instructions, sites) = code.into_parts();
        debug!(
            function = %state.name,
            descriptor,
            bytes = instructions.len(),
            max_stack = max_stack_size,
            locals = state.next_local,
            "function generated"
        );
        let code = InstructionAttribute {
            name_index: attribute_index,
            max_stack_size,
            local_variable_count: state.next_local as u16,
            instructions,
            exception_table: ExceptionTable::new(sites),
        };
        self.functions.push(FunctionEntity {
            flags: function_flags,
            name_index,
            descriptor_index,
            attributes: vec![Attribute::Instruction(code)],
        });
        Ok(())
    }
}
