//! Deduplicating constant-pool construction.

use std::collections::HashMap;

use zen_bytecode::{ConstantPool, ConstantPoolEntry};

use super::EmitError;

/// Builds the pool of one compilation unit.
///
/// Indices are 1-based, dense and stable: an entry never moves once issued.
/// Composite entries intern their components first, so a component always
/// has a lower index than the entry referring to it.
#[derive(Debug, Default)]
pub struct ConstantPoolBuilder {
    entries: Vec<ConstantPoolEntry>,
    lookup: HashMap<ConstantPoolEntry, u16>,
}

impl ConstantPoolBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    fn intern(&mut self, entry: ConstantPoolEntry) -> Result<u16, EmitError> {
        if let Some(&index) = self.lookup.get(&entry) {
            return Ok(index);
        }
        let index = u16::try_from(self.entries.len() + 1).map_err(|_| EmitError::TooManyConstants)?;
        self.entries.push(entry.clone());
        self.lookup.insert(entry, index);
        Ok(index)
    }

    pub fn intern_utf8(&mut self, text: &str) -> Result<u16, EmitError> {
        if u16::try_from(text.len()).is_err() {
            return Err(EmitError::Unsupported("UTF-8 constants longer than 65535 bytes"));
        }
        self.intern(ConstantPoolEntry::Utf8(text.to_string()))
    }

    pub fn intern_integer(&mut self, value: i32) -> Result<u16, EmitError> {
        self.intern(ConstantPoolEntry::Integer(value))
    }

    pub fn intern_long(&mut self, value: i64) -> Result<u16, EmitError> {
        self.intern(ConstantPoolEntry::Long(value))
    }

    pub fn intern_float(&mut self, value: f32) -> Result<u16, EmitError> {
        self.intern(ConstantPoolEntry::Float(value))
    }

    pub fn intern_double(&mut self, value: f64) -> Result<u16, EmitError> {
        self.intern(ConstantPoolEntry::Double(value))
    }

    /// A string literal: a `String` entry over a `Utf8` entry.
    pub fn intern_string(&mut self, text: &str) -> Result<u16, EmitError> {
        let string_index = self.intern_utf8(text)?;
        self.intern(ConstantPoolEntry::String { string_index })
    }

    pub fn intern_class(&mut self, binary_name: &str) -> Result<u16, EmitError> {
        let name_index = self.intern_utf8(binary_name)?;
        self.intern(ConstantPoolEntry::Class { name_index })
    }

    pub fn intern_function(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16, EmitError> {
        let class_index = self.intern_class(class)?;
        let descriptor_index = self.intern_utf8(descriptor)?;
        let name_index = self.intern_utf8(name)?;
        self.intern(ConstantPoolEntry::Function {
            class_index,
            descriptor_index,
            name_index,
        })
    }

    pub fn intern_field(&mut self, class: &str, name: &str, descriptor: &str) -> Result<u16, EmitError> {
        let class_index = self.intern_class(class)?;
        let descriptor_index = self.intern_utf8(descriptor)?;
        let name_index = self.intern_utf8(name)?;
        self.intern(ConstantPoolEntry::Field {
            class_index,
            descriptor_index,
            name_index,
        })
    }

    pub fn count_entries(&self) -> u16 {
        self.entries.len() as u16
    }

    /// # Panics
    /// Panics if `index` was not issued by this builder.
    pub fn get_entry(&self, index: u16) -> &ConstantPoolEntry {
        usize::from(index)
            .checked_sub(1)
            .and_then(|slot| self.entries.get(slot))
            .unwrap_or_else(|| {
                panic!(
                    "constant pool index {index} out of range (1..={})",
                    self.entries.len()
                )
            })
    }

    pub fn into_pool(self) -> ConstantPool {
        ConstantPool::new(self.entries)
    }
}
