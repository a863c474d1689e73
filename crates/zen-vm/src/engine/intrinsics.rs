//! Operators and methods of built-in values.
//!
//! Operator calls arrive as `invoke_virtual` on the root class. When the
//! receiver is not an object with its own definition, they are evaluated
//! here. Numbers promote along int, long, float, double; integer arithmetic
//! wraps.

use std::cmp::Ordering;

use super::error::RuntimeError;
use super::heap::{Heap, HeapObject, mismatch};
use super::output::Output;
use super::value::Value;

type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Clone, Copy, Debug, PartialEq)]
enum Num {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Num {
    fn of(value: &Value) -> Option<Self> {
        Some(match *value {
            Value::Int(v) => Num::Int(v),
            Value::Long(v) => Num::Long(v),
            Value::Float(v) => Num::Float(v),
            Value::Double(v) => Num::Double(v),
            _ => return None,
        })
    }

    fn rank(self) -> u8 {
        match self {
            Num::Int(_) => 0,
            Num::Long(_) => 1,
            Num::Float(_) => 2,
            Num::Double(_) => 3,
        }
    }

    fn widen(self, rank: u8) -> Self {
        match (self, rank) {
            (Num::Int(v), 1) => Num::Long(i64::from(v)),
            (Num::Int(v), 2) => Num::Float(v as f32),
            (Num::Int(v), 3) => Num::Double(f64::from(v)),
            (Num::Long(v), 2) => Num::Float(v as f32),
            (Num::Long(v), 3) => Num::Double(v as f64),
            (Num::Float(v), 3) => Num::Double(f64::from(v)),
            (n, _) => n,
        }
    }

    fn value(self) -> Value {
        match self {
            Num::Int(v) => Value::Int(v),
            Num::Long(v) => Value::Long(v),
            Num::Float(v) => Value::Float(v),
            Num::Double(v) => Value::Double(v),
        }
    }
}

/// Both operands widened to their common type.
fn promote(left: Num, right: Num) -> (Num, Num) {
    let rank = left.rank().max(right.rank());
    (left.widen(rank), right.widen(rank))
}

fn numbers(operation: &'static str, left: &Value, right: &Value) -> Result<(Num, Num)> {
    let l = Num::of(left).ok_or_else(|| mismatch(operation, left))?;
    let r = Num::of(right).ok_or_else(|| mismatch(operation, right))?;
    Ok(promote(l, r))
}

/// Evaluate `receiver.name(arguments)` for a built-in receiver. `None` when
/// no intrinsic has that name and arity.
pub fn invoke(heap: &Heap, name: &str, receiver: &Value, arguments: &[Value]) -> Option<Result<Value>> {
    let result = match arguments {
        [] => unary(heap, name, receiver)?,
        [argument] => binary(heap, name, receiver, argument)?,
        _ => return None,
    };
    Some(result)
}

fn unary(heap: &Heap, name: &str, operand: &Value) -> Option<Result<Value>> {
    Some(match name {
        "positiveOperator" => match Num::of(operand) {
            Some(n) => Ok(n.value()),
            None => Err(mismatch("positiveOperator", operand)),
        },
        "negateOperator" => negate(operand),
        "complementOperator" => match *operand {
            Value::Int(v) => Ok(Value::Int(!v)),
            Value::Long(v) => Ok(Value::Long(!v)),
            _ => Err(mismatch("complementOperator", operand)),
        },
        "notOperator" => operand.truthy().map(|t| Value::from_bool(!t)),
        "incrementOperator" => step(operand, 1, "incrementOperator"),
        "decrementOperator" => step(operand, -1, "decrementOperator"),
        "size" => size(heap, operand),
        "toString" => Ok(Value::string(&display(heap, operand))),
        _ => return None,
    })
}

fn binary(heap: &Heap, name: &str, left: &Value, right: &Value) -> Option<Result<Value>> {
    Some(match name {
        "plusOperator" => plus(heap, left, right),
        "minusOperator" => arithmetic("minusOperator", left, right, i32::wrapping_sub, i64::wrapping_sub, |a, b| a - b, |a, b| a - b),
        "multiplyOperator" => arithmetic("multiplyOperator", left, right, i32::wrapping_mul, i64::wrapping_mul, |a, b| a * b, |a, b| a * b),
        "divideOperator" => divide("divideOperator", left, right, i32::wrapping_div, i64::wrapping_div, |a, b| a / b, |a, b| a / b),
        "moduloOperator" => divide("moduloOperator", left, right, i32::wrapping_rem, i64::wrapping_rem, |a, b| a % b, |a, b| a % b),
        "leftShiftOperator" => shift("leftShiftOperator", left, right, |a, s| a.wrapping_shl(s), |a, s| a.wrapping_shl(s)),
        "rightShiftOperator" => shift("rightShiftOperator", left, right, |a, s| a.wrapping_shr(s), |a, s| a.wrapping_shr(s)),
        "rightShift3Operator" => shift(
            "rightShift3Operator",
            left,
            right,
            |a, s| (a as u32).wrapping_shr(s) as i32,
            |a, s| (a as u64).wrapping_shr(s) as i64,
        ),
        "andOperator" => bitwise("andOperator", left, right, |a, b| a & b, |a, b| a & b),
        "orOperator" => bitwise("orOperator", left, right, |a, b| a | b, |a, b| a | b),
        "xorOperator" => bitwise("xorOperator", left, right, |a, b| a ^ b, |a, b| a ^ b),
        "equalsOperator" | "equals" => Ok(Value::from_bool(equals(left, right))),
        "notEqualsOperator" => Ok(Value::from_bool(!equals(left, right))),
        "lessThanOperator" => compare("lessThanOperator", left, right, Ordering::is_lt),
        "lessThanOrEqualToOperator" => compare("lessThanOrEqualToOperator", left, right, Ordering::is_le),
        "greaterThanOperator" => compare("greaterThanOperator", left, right, Ordering::is_gt),
        "greaterThanOrEqualToOperator" => compare("greaterThanOrEqualToOperator", left, right, Ordering::is_ge),
        "get" => heap.load_element(left, right),
        _ => return None,
    })
}

/// Operators every object answers when its class does not define them.
/// Objects compare by identity.
pub fn object_fallback(heap: &Heap, name: &str, receiver: &Value, arguments: &[Value]) -> Option<Value> {
    match (name, arguments) {
        ("equalsOperator" | "equals", [other]) => Some(Value::from_bool(receiver == other)),
        ("notEqualsOperator", [other]) => Some(Value::from_bool(receiver != other)),
        ("toString", []) => Some(Value::string(&display(heap, receiver))),
        _ => None,
    }
}

fn plus(heap: &Heap, left: &Value, right: &Value) -> Result<Value> {
    if matches!(left, Value::String(_)) || matches!(right, Value::String(_)) {
        let mut text = display(heap, left);
        text.push_str(&display(heap, right));
        return Ok(Value::string(&text));
    }
    arithmetic("plusOperator", left, right, i32::wrapping_add, i64::wrapping_add, |a, b| a + b, |a, b| a + b)
}

fn arithmetic(
    operation: &'static str,
    left: &Value,
    right: &Value,
    int: fn(i32, i32) -> i32,
    long: fn(i64, i64) -> i64,
    float: fn(f32, f32) -> f32,
    double: fn(f64, f64) -> f64,
) -> Result<Value> {
    Ok(match numbers(operation, left, right)? {
        (Num::Int(a), Num::Int(b)) => Value::Int(int(a, b)),
        (Num::Long(a), Num::Long(b)) => Value::Long(long(a, b)),
        (Num::Float(a), Num::Float(b)) => Value::Float(float(a, b)),
        (Num::Double(a), Num::Double(b)) => Value::Double(double(a, b)),
        _ => unreachable!("promoted operands share a type"),
    })
}

/// Division and remainder: integer division by zero throws, floating-point
/// follows IEEE 754.
fn divide(
    operation: &'static str,
    left: &Value,
    right: &Value,
    int: fn(i32, i32) -> i32,
    long: fn(i64, i64) -> i64,
    float: fn(f32, f32) -> f32,
    double: fn(f64, f64) -> f64,
) -> Result<Value> {
    match numbers(operation, left, right)? {
        (Num::Int(_), Num::Int(0)) | (Num::Long(_), Num::Long(0)) => Err(RuntimeError::DivisionByZero),
        _ => arithmetic(operation, left, right, int, long, float, double),
    }
}

fn integers(operation: &'static str, value: &Value) -> Result<Num> {
    match Num::of(value) {
        Some(n @ (Num::Int(_) | Num::Long(_))) => Ok(n),
        _ => Err(mismatch(operation, value)),
    }
}

fn bitwise(
    operation: &'static str,
    left: &Value,
    right: &Value,
    int: fn(i32, i32) -> i32,
    long: fn(i64, i64) -> i64,
) -> Result<Value> {
    let (l, r) = promote(integers(operation, left)?, integers(operation, right)?);
    Ok(match (l, r) {
        (Num::Int(a), Num::Int(b)) => Value::Int(int(a, b)),
        (Num::Long(a), Num::Long(b)) => Value::Long(long(a, b)),
        _ => unreachable!("promoted integers share a type"),
    })
}

/// Shifts keep the left operand's type; the distance is masked to its
/// width.
fn shift(
    operation: &'static str,
    left: &Value,
    right: &Value,
    int: fn(i32, u32) -> i32,
    long: fn(i64, u32) -> i64,
) -> Result<Value> {
    let distance = match integers(operation, right)? {
        Num::Int(v) => v as u32,
        Num::Long(v) => v as u32,
        _ => unreachable!("integers are int or long"),
    };
    Ok(match integers(operation, left)? {
        Num::Int(a) => Value::Int(int(a, distance & 0x1F)),
        Num::Long(a) => Value::Long(long(a, distance & 0x3F)),
        _ => unreachable!("integers are int or long"),
    })
}

fn negate(operand: &Value) -> Result<Value> {
    Ok(match *operand {
        Value::Int(v) => Value::Int(v.wrapping_neg()),
        Value::Long(v) => Value::Long(v.wrapping_neg()),
        Value::Float(v) => Value::Float(-v),
        Value::Double(v) => Value::Double(-v),
        _ => return Err(mismatch("negateOperator", operand)),
    })
}

fn step(operand: &Value, delta: i8, operation: &'static str) -> Result<Value> {
    Ok(match *operand {
        Value::Int(v) => Value::Int(v.wrapping_add(i32::from(delta))),
        Value::Long(v) => Value::Long(v.wrapping_add(i64::from(delta))),
        Value::Float(v) => Value::Float(v + f32::from(delta)),
        Value::Double(v) => Value::Double(v + f64::from(delta)),
        _ => return Err(mismatch(operation, operand)),
    })
}

/// Value equality: numbers across types after promotion, strings by
/// content, heap values by identity.
pub fn equals(left: &Value, right: &Value) -> bool {
    match (Num::of(left), Num::of(right)) {
        (Some(l), Some(r)) => {
            let (l, r) = promote(l, r);
            l == r
        }
        _ => left == right,
    }
}

fn compare(
    operation: &'static str,
    left: &Value,
    right: &Value,
    test: fn(Ordering) -> bool,
) -> Result<Value> {
    let ordering = match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        _ => match numbers(operation, left, right)? {
            (Num::Int(a), Num::Int(b)) => Some(a.cmp(&b)),
            (Num::Long(a), Num::Long(b)) => Some(a.cmp(&b)),
            (Num::Float(a), Num::Float(b)) => a.partial_cmp(&b),
            (Num::Double(a), Num::Double(b)) => a.partial_cmp(&b),
            _ => unreachable!("promoted operands share a type"),
        },
    };
    // NaN compares false under every operator.
    Ok(Value::from_bool(ordering.is_some_and(test)))
}

fn size(heap: &Heap, receiver: &Value) -> Result<Value> {
    let length = match receiver {
        Value::String(text) => text.chars().count(),
        Value::Array(r) | Value::Map(r) => match heap.get(*r) {
            HeapObject::Array(elements) => elements.len(),
            HeapObject::Map(entries) => entries.len(),
            HeapObject::Instance { .. } => return Err(mismatch("size", receiver)),
        },
        _ => return Err(mismatch("size", receiver)),
    };
    i32::try_from(length)
        .map(Value::Int)
        .map_err(|_| mismatch("size", receiver))
}

/// Text form used by string concatenation and `toString`.
pub fn display(heap: &Heap, value: &Value) -> String {
    match value {
        Value::String(text) => text.to_string(),
        _ => Output::from_value(heap, value).to_string(),
    }
}

/// `zen/core/Map.fromEntries`: a map from an array of `[key, value]`
/// arrays. Later keys replace earlier equal ones.
pub fn from_entries(heap: &mut Heap, entries: &Value) -> Result<Value> {
    let pairs = heap.array(entries, "fromEntries")?.to_vec();
    let mut map: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
    for pair in &pairs {
        let (key, value) = match heap.array(pair, "fromEntries")? {
            [key, value] => (key.clone(), value.clone()),
            _ => return Err(mismatch("fromEntries", pair)),
        };
        match map.iter_mut().find(|(k, _)| equals(k, &key)) {
            Some((_, slot)) => *slot = value,
            None => map.push((key, value)),
        }
    }
    Ok(heap.alloc_map(map))
}
