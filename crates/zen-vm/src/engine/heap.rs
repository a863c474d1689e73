//! Per-thread object storage.
//!
//! Objects are appended and never freed; a heap lives exactly as long as
//! one interpreter.

use std::sync::Arc;

use indexmap::IndexMap;

use super::class::LoadedClass;
use super::error::RuntimeError;
use super::intrinsics::equals;
use super::value::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HeapRef(u32);

impl HeapRef {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub enum HeapObject {
    Array(Vec<Value>),
    /// Insertion-ordered; keys compare with `Value`'s equality.
    Map(Vec<(Value, Value)>),
    Instance {
        class: Arc<LoadedClass>,
        fields: IndexMap<String, Value>,
    },
}

#[derive(Debug, Default)]
pub struct Heap {
    objects: Vec<HeapObject>,
}

impl Heap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    fn alloc(&mut self, object: HeapObject) -> HeapRef {
        let r = HeapRef(self.objects.len() as u32);
        self.objects.push(object);
        r
    }

    pub fn alloc_array(&mut self, elements: Vec<Value>) -> Value {
        Value::Array(self.alloc(HeapObject::Array(elements)))
    }

    pub fn alloc_map(&mut self, entries: Vec<(Value, Value)>) -> Value {
        Value::Map(self.alloc(HeapObject::Map(entries)))
    }

    pub fn alloc_instance(&mut self, class: Arc<LoadedClass>, fields: IndexMap<String, Value>) -> Value {
        Value::Object(self.alloc(HeapObject::Instance { class, fields }))
    }

    /// Panics on a reference from another heap.
    pub fn get(&self, r: HeapRef) -> &HeapObject {
        &self.objects[r.index()]
    }

    pub fn get_mut(&mut self, r: HeapRef) -> &mut HeapObject {
        &mut self.objects[r.index()]
    }

    pub fn array(&self, value: &Value, operation: &'static str) -> Result<&[Value], RuntimeError> {
        match (value, value.heap_ref().map(|r| self.get(r))) {
            (Value::Array(_), Some(HeapObject::Array(elements))) => Ok(elements),
            _ => Err(mismatch(operation, value)),
        }
    }

    /// Class of an object value.
    pub fn class_of(&self, value: &Value) -> Option<&Arc<LoadedClass>> {
        match value.heap_ref().map(|r| self.get(r)) {
            Some(HeapObject::Instance { class, .. }) => Some(class),
            _ => None,
        }
    }

    /// Runtime class name of any value; `None` for null.
    pub fn class_name<'a>(&'a self, value: &'a Value) -> Option<&'a str> {
        match self.class_of(value) {
            Some(class) => Some(&class.name),
            None => value.builtin_class(),
        }
    }

    pub fn load_element(&self, container: &Value, index: &Value) -> Result<Value, RuntimeError> {
        match container.heap_ref().map(|r| self.get(r)) {
            Some(HeapObject::Array(elements)) => {
                let i = checked_index(index, elements.len())?;
                Ok(elements[i].clone())
            }
            Some(HeapObject::Map(entries)) => Ok(entries
                .iter()
                .find(|(key, _)| equals(key, index))
                .map_or(Value::Null, |(_, value)| value.clone())),
            _ => Err(mismatch("load_aa", container)),
        }
    }

    pub fn store_element(&mut self, container: &Value, index: Value, value: Value) -> Result<(), RuntimeError> {
        let Some(r) = container.heap_ref() else {
            return Err(mismatch("store_aa", container));
        };
        match self.get_mut(r) {
            HeapObject::Array(elements) => {
                let i = checked_index(&index, elements.len())?;
                elements[i] = value;
                Ok(())
            }
            HeapObject::Map(entries) => {
                match entries.iter_mut().find(|(key, _)| equals(key, &index)) {
                    Some((_, slot)) => *slot = value,
                    None => entries.push((index, value)),
                }
                Ok(())
            }
            HeapObject::Instance { .. } => Err(mismatch("store_aa", container)),
        }
    }

    pub fn load_field(&self, object: &Value, name: &str) -> Result<Value, RuntimeError> {
        match object.heap_ref().map(|r| self.get(r)) {
            Some(HeapObject::Instance { class, fields }) => {
                fields.get(name).cloned().ok_or_else(|| RuntimeError::FieldNotFound {
                    class: class.name.clone(),
                    name: name.to_string(),
                })
            }
            _ if *object == Value::Null => Err(RuntimeError::NullReference(name.to_string())),
            _ => Err(mismatch("load_instance_field", object)),
        }
    }

    pub fn store_field(&mut self, object: &Value, name: &str, value: Value) -> Result<(), RuntimeError> {
        if *object == Value::Null {
            return Err(RuntimeError::NullReference(name.to_string()));
        }
        let Some(r) = object.heap_ref() else {
            return Err(mismatch("store_instance_field", object));
        };
        match self.get_mut(r) {
            HeapObject::Instance { class, fields } => {
                let Some(slot) = fields.get_mut(name) else {
                    return Err(RuntimeError::FieldNotFound {
                        class: class.name.clone(),
                        name: name.to_string(),
                    });
                };
                *slot = value;
                Ok(())
            }
            _ => Err(mismatch("store_instance_field", object)),
        }
    }
}

pub(crate) fn mismatch(operation: &'static str, found: &Value) -> RuntimeError {
    RuntimeError::TypeMismatch {
        operation,
        found: found.type_name(),
    }
}

fn checked_index(index: &Value, length: usize) -> Result<usize, RuntimeError> {
    let raw = match *index {
        Value::Int(i) => i64::from(i),
        Value::Long(i) => i,
        _ => return Err(mismatch("index", index)),
    };
    usize::try_from(raw)
        .ok()
        .filter(|&i| i < length)
        .ok_or(RuntimeError::IndexOutOfBounds { index: raw, length })
}
