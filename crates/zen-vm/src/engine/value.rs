//! Values on operand stacks and in locals.

use std::sync::Arc;

use zen_bytecode::MAP_CLASS;

use super::error::RuntimeError;
use super::heap::HeapRef;

/// A runtime value. Arrays, maps and objects live on the thread's heap and
/// compare by identity.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(Arc<str>),
    Array(HeapRef),
    Map(HeapRef),
    Object(HeapRef),
}

impl Value {
    pub fn string(text: &str) -> Self {
        Value::String(Arc::from(text))
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Map(_) => "map",
            Value::Object(_) => "object",
        }
    }

    /// Runtime class of a built-in value. Objects carry their own class and
    /// null has none.
    pub fn builtin_class(&self) -> Option<&'static str> {
        Some(match self {
            Value::Int(_) => "zen/core/Integer",
            Value::Long(_) => "zen/core/Long",
            Value::Float(_) => "zen/core/Float",
            Value::Double(_) => "zen/core/Double",
            Value::String(_) => "zen/core/String",
            Value::Array(_) => "zen/core/Array",
            Value::Map(_) => MAP_CLASS,
            Value::Null | Value::Object(_) => return None,
        })
    }

    /// Condition semantics of `jump_eq0_i`/`jump_ne0_i`: null and zero are
    /// false.
    pub fn truthy(&self) -> Result<bool, RuntimeError> {
        match *self {
            Value::Null => Ok(false),
            Value::Int(v) => Ok(v != 0),
            Value::Long(v) => Ok(v != 0),
            _ => Err(RuntimeError::TypeMismatch {
                operation: "condition",
                found: self.type_name(),
            }),
        }
    }

    pub fn from_bool(value: bool) -> Self {
        Value::Int(i32::from(value))
    }

    pub fn heap_ref(&self) -> Option<HeapRef> {
        match *self {
            Value::Array(r) | Value::Map(r) | Value::Object(r) => Some(r),
            _ => None,
        }
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Int(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Long(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::string(value)
    }
}
