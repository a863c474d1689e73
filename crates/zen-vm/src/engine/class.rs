//! Loaded entities and the class table.
//!
//! Loading decodes every function once and checks that jumps and handler
//! addresses land on instruction boundaries, so the interpreter never
//! re-validates control flow.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::debug;
use zen_bytecode::{
    ConstantPool, EntityFile, EntityType, ExceptionHandlerSite, FunctionDescriptor, FunctionEntity,
    INITIALIZER, Instruction, ROOT_CLASS, TypeDescriptor, decode_instructions, flags,
};

use super::error::RuntimeError;

/// Built-in class every thrown value conventionally extends.
pub const EXCEPTION_CLASS: &str = "zen/core/Exception";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedField {
    pub name: String,
    pub flags: u16,
}

impl LoadedField {
    pub fn is_static(&self) -> bool {
        self.flags & flags::STATIC != 0
    }

    pub fn is_final(&self) -> bool {
        self.flags & flags::FINAL != 0
    }
}

#[derive(Debug)]
pub struct LoadedFunction {
    pub name: String,
    pub descriptor: String,
    pub signature: FunctionDescriptor,
    pub flags: u16,
    pub max_stack: u16,
    pub locals: u16,
    pub code: Vec<Instruction>,
    pub handlers: Vec<ExceptionHandlerSite>,
    /// Byte offset to instruction index.
    positions: HashMap<usize, usize>,
}

impl LoadedFunction {
    fn load(pool: &ConstantPool, entity: &FunctionEntity) -> Result<Self, RuntimeError> {
        let name = utf8(pool, entity.name_index)?.to_string();
        let descriptor = utf8(pool, entity.descriptor_index)?.to_string();
        let signature = FunctionDescriptor::parse(&descriptor)?;
        let attribute = entity
            .instruction_attribute()
            .ok_or_else(|| RuntimeError::MissingCode {
                function: name.clone(),
            })?;
        let code = decode_instructions(&attribute.instructions)?;
        let positions = code
            .iter()
            .enumerate()
            .map(|(index, instr)| (instr.offset, index))
            .collect();

        let function = Self {
            name,
            descriptor,
            signature,
            flags: entity.flags,
            max_stack: attribute.max_stack_size,
            locals: attribute.local_variable_count,
            code,
            handlers: attribute.exception_table.sites.clone(),
            positions,
        };
        function.verify()?;
        Ok(function)
    }

    fn verify(&self) -> Result<(), RuntimeError> {
        for instr in &self.code {
            if let Some(target) = instr.jump_target() {
                self.position(target).ok_or(RuntimeError::InvalidJump {
                    from: instr.offset,
                    target: target as isize,
                })?;
            } else if instr.opcode.is_jump() {
                return Err(RuntimeError::InvalidJump {
                    from: instr.offset,
                    target: -1,
                });
            }
        }
        for site in &self.handlers {
            let handler = usize::from(site.handler_pc);
            self.position(handler).ok_or(RuntimeError::InvalidJump {
                from: usize::from(site.start_pc),
                target: handler as isize,
            })?;
        }
        Ok(())
    }

    /// Instruction index at byte `offset`.
    pub fn position(&self, offset: usize) -> Option<usize> {
        self.positions.get(&offset).copied()
    }

    pub fn is_static(&self) -> bool {
        self.flags & flags::STATIC != 0
    }

    pub fn is_variadic(&self) -> bool {
        matches!(self.signature.parameters.last(), Some(TypeDescriptor::Array(_)))
    }

    pub fn fixed_parameters(&self) -> usize {
        self.signature.parameter_count() - usize::from(self.is_variadic())
    }

    /// Whether `count` arguments can be passed, surplus ones packed into the
    /// variadic parameter.
    pub fn accepts(&self, count: usize) -> bool {
        if self.is_variadic() {
            count >= self.fixed_parameters()
        } else {
            count == self.fixed_parameters()
        }
    }
}

#[derive(Debug)]
pub struct LoadedClass {
    pub name: String,
    pub entity_type: EntityType,
    pub superclasses: Vec<String>,
    pub pool: ConstantPool,
    pub fields: Vec<LoadedField>,
    pub functions: Vec<LoadedFunction>,
}

impl LoadedClass {
    pub fn from_entity_file(file: &EntityFile) -> Result<Self, RuntimeError> {
        let pool = &file.constant_pool;
        let name = utf8(pool, file.entity.reference)?.to_string();
        let superclasses = file
            .entity
            .superclasses
            .iter()
            .map(|&index| utf8(pool, index).map(str::to_string))
            .collect::<Result<_, _>>()?;
        let fields = file
            .entity
            .fields
            .iter()
            .map(|field| {
                Ok(LoadedField {
                    name: utf8(pool, field.name_index)?.to_string(),
                    flags: field.flags,
                })
            })
            .collect::<Result<_, RuntimeError>>()?;
        let functions = file
            .entity
            .functions
            .iter()
            .map(|function| LoadedFunction::load(pool, function))
            .collect::<Result<_, _>>()?;

        Ok(Self {
            name,
            entity_type: file.entity.entity_type,
            superclasses,
            pool: pool.clone(),
            fields,
            functions,
        })
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RuntimeError> {
        Self::from_entity_file(&EntityFile::from_bytes(bytes)?)
    }

    /// A class provided by the machine itself: no fields, no code.
    pub fn builtin(name: &str, superclasses: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            entity_type: EntityType::Class,
            superclasses: superclasses.iter().map(|s| s.to_string()).collect(),
            pool: ConstantPool::default(),
            fields: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn function(&self, index: usize) -> &LoadedFunction {
        &self.functions[index]
    }

    pub fn find_function(&self, name: &str, descriptor: &str) -> Option<usize> {
        self.functions
            .iter()
            .position(|f| f.name == name && f.descriptor == descriptor)
    }

    /// A function named `name` able to take `count` arguments.
    pub fn find_accepting(&self, name: &str, count: usize) -> Option<usize> {
        self.functions
            .iter()
            .position(|f| f.name == name && f.accepts(count))
    }

    pub fn field(&self, name: &str) -> Option<&LoadedField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn initializer(&self) -> Option<usize> {
        self.functions.iter().position(|f| f.name == INITIALIZER)
    }

    /// Ordinal of an enumerate: its position among the static fields.
    pub fn ordinal(&self, name: &str) -> Option<usize> {
        self.fields
            .iter()
            .filter(|f| f.is_static())
            .position(|f| f.name == name)
    }
}

fn utf8(pool: &ConstantPool, index: u16) -> Result<&str, RuntimeError> {
    pool.utf8(index).ok_or(RuntimeError::InvalidConstant(index))
}

/// A resolved call target. `pack_from` is set when surplus arguments must
/// be packed into the variadic parameter.
#[derive(Clone, Debug)]
pub struct Target {
    pub class: Arc<LoadedClass>,
    pub function: usize,
    pub pack_from: Option<usize>,
}

/// Every loaded class by binary name. Immutable once handed to a machine.
#[derive(Clone, Debug)]
pub struct ClassTable {
    classes: HashMap<String, Arc<LoadedClass>>,
}

impl Default for ClassTable {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassTable {
    /// A table holding the built-in classes.
    pub fn new() -> Self {
        let mut classes = HashMap::new();
        for class in [
            LoadedClass::builtin(ROOT_CLASS, &[]),
            LoadedClass::builtin(EXCEPTION_CLASS, &[ROOT_CLASS]),
        ] {
            classes.insert(class.name.clone(), Arc::new(class));
        }
        Self { classes }
    }

    pub fn insert(&mut self, class: LoadedClass) -> Result<Arc<LoadedClass>, RuntimeError> {
        if self.classes.contains_key(&class.name) {
            return Err(RuntimeError::DuplicateClass(class.name));
        }
        debug!(
            class = %class.name,
            kind = class.entity_type.keyword(),
            functions = class.functions.len(),
            "loaded"
        );
        let class = Arc::new(class);
        self.classes.insert(class.name.clone(), Arc::clone(&class));
        Ok(class)
    }

    pub fn load(&mut self, file: &EntityFile) -> Result<Arc<LoadedClass>, RuntimeError> {
        self.insert(LoadedClass::from_entity_file(file)?)
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<Arc<LoadedClass>, RuntimeError> {
        self.insert(LoadedClass::from_bytes(bytes)?)
    }

    pub fn get(&self, name: &str) -> Option<&Arc<LoadedClass>> {
        self.classes.get(name)
    }

    pub fn require(&self, name: &str) -> Result<&Arc<LoadedClass>, RuntimeError> {
        self.get(name)
            .ok_or_else(|| RuntimeError::ClassNotFound(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// `name` and its ancestors, breadth first, each once. Unloaded
    /// ancestors appear by name but are not expanded.
    pub fn lineage<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::from([name]);
        while let Some(current) = queue.pop_front() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(class) = self.get(current) {
                queue.extend(class.superclasses.iter().map(String::as_str));
            }
        }
        order
    }

    /// Whether `class` is `ancestor` or inherits from it. Every class
    /// inherits from the root class.
    pub fn is_a(&self, class: &str, ancestor: &str) -> bool {
        ancestor == ROOT_CLASS || self.lineage(class).contains(&ancestor)
    }

    /// Virtual lookup along the lineage of `class`: an exact descriptor
    /// match first, then any function of that name accepting the argument
    /// count.
    pub fn resolve_virtual(
        &self,
        class: &str,
        name: &str,
        descriptor: &str,
        count: usize,
    ) -> Option<Target> {
        let lineage: Vec<&Arc<LoadedClass>> = self
            .lineage(class)
            .into_iter()
            .filter_map(|c| self.get(c))
            .collect();
        let exact = lineage.iter().find_map(|c| {
            c.find_function(name, descriptor).map(|function| Target {
                class: Arc::clone(c),
                function,
                pack_from: None,
            })
        });
        exact.or_else(|| {
            lineage.iter().find_map(|c| {
                c.find_accepting(name, count).map(|function| {
                    let f = c.function(function);
                    Target {
                        class: Arc::clone(c),
                        function,
                        pack_from: f.is_variadic().then(|| f.fixed_parameters()),
                    }
                })
            })
        })
    }

    /// Static lookup in `class` itself.
    pub fn resolve_static(
        &self,
        class: &str,
        name: &str,
        descriptor: &str,
        count: usize,
    ) -> Result<Target, RuntimeError> {
        let loaded = self.require(class)?;
        if let Some(function) = loaded.find_function(name, descriptor) {
            return Ok(Target {
                class: Arc::clone(loaded),
                function,
                pack_from: None,
            });
        }
        let function = loaded.find_accepting(name, count).ok_or_else(|| {
            RuntimeError::FunctionNotFound {
                class: class.to_string(),
                name: name.to_string(),
                descriptor: descriptor.to_string(),
            }
        })?;
        let f = loaded.function(function);
        Ok(Target {
            class: Arc::clone(loaded),
            function,
            pack_from: f.is_variadic().then(|| f.fixed_parameters()),
        })
    }
}
