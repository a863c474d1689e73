//! The in-memory mirror of a FEB file.

use crate::attribute::{Attribute, InstructionAttribute};
use crate::constant_pool::ConstantPool;
use crate::constants::{MAJOR_VERSION, MINOR_VERSION};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Version {
    pub major: u16,
    pub minor: u16,
}

impl Version {
    pub const CURRENT: Self = Self {
        major: MAJOR_VERSION,
        minor: MINOR_VERSION,
    };
}

impl Default for Version {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum EntityType {
    #[default]
    Class = 0,
    Enumeration = 1,
}

impl EntityType {
    pub fn from_u8(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Class),
            1 => Some(Self::Enumeration),
            _ => None,
        }
    }

    pub fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Enumeration => "enum",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldEntity {
    pub flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionEntity {
    pub flags: u16,
    pub name_index: u16,
    pub descriptor_index: u16,
    pub attributes: Vec<Attribute>,
}

impl FunctionEntity {
    pub fn instruction_attribute(&self) -> Option<&InstructionAttribute> {
        self.attributes.iter().find_map(Attribute::as_instruction)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Entity {
    pub entity_type: EntityType,
    pub flags: u16,
    /// Constant-pool index of the entity's binary name.
    pub reference: u16,
    pub superclasses: Vec<u16>,
    pub attributes: Vec<Attribute>,
    pub fields: Vec<FieldEntity>,
    pub functions: Vec<FunctionEntity>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EntityFile {
    pub version: Version,
    pub stream_flags: u16,
    pub constant_pool: ConstantPool,
    pub entity: Entity,
}

impl EntityFile {
    /// Binary name of the entity, resolved through the pool.
    pub fn name(&self) -> Option<&str> {
        self.constant_pool.utf8(self.entity.reference)
    }

    pub fn superclass_names(&self) -> impl Iterator<Item = Option<&str>> {
        self.entity
            .superclasses
            .iter()
            .map(|&i| self.constant_pool.utf8(i))
    }

    /// Find a function by name and descriptor.
    pub fn find_function(&self, name: &str, descriptor: &str) -> Option<&FunctionEntity> {
        self.entity.functions.iter().find(|f| {
            self.constant_pool.utf8(f.name_index) == Some(name)
                && self.constant_pool.utf8(f.descriptor_index) == Some(descriptor)
        })
    }

    /// All functions carrying `name`, in declaration order.
    pub fn functions_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a FunctionEntity> + 'a {
        self.entity
            .functions
            .iter()
            .filter(move |f| self.constant_pool.utf8(f.name_index) == Some(name))
    }
}
