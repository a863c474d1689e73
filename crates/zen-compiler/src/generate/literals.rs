//! Literal parsing and the tiered push encoding.
//!
//! Integers pick the narrowest encoding: `push_i0..push_i5`, then `push_b`,
//! then `push_s`, then a pool entry loaded with `load_cpr`.

use zen_bytecode::{Opcode, Operand};

use crate::ast::Literal;
use crate::emit::EmitError;

use super::Generator;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IntegerLiteral {
    Int(i32),
    Long(i64),
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FloatLiteral {
    Float(f32),
    Double(f64),
}

fn invalid(text: &str, reason: &'static str) -> EmitError {
    EmitError::InvalidLiteral {
        text: text.to_string(),
        reason,
    }
}

/// Parse integer literal text.
///
/// `0x`, `0b` and `0c` select hexadecimal, binary and octal, `_` separates
/// digits and an `L`/`l` suffix makes a long. Decimal values must fit the
/// signed type; prefixed values may use the full unsigned width and keep
/// their bit pattern.
pub fn parse_integer(text: &str) -> Result<IntegerLiteral, EmitError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    let (digits, long) = match cleaned.strip_suffix(['L', 'l']) {
        Some(digits) => (digits, true),
        None => (cleaned.as_str(), false),
    };

    let mut chars = digits.chars();
    let radix = match (chars.next(), chars.next()) {
        (Some('0'), Some('x' | 'X')) => 16,
        (Some('0'), Some('b' | 'B')) => 2,
        (Some('0'), Some('c' | 'C')) => 8,
        _ => 10,
    };
    let body = if radix == 10 { digits } else { &digits[2..] };
    if body.is_empty() {
        return Err(invalid(text, "missing digits"));
    }
    let value = u64::from_str_radix(body, radix).map_err(|e| match e.kind() {
        std::num::IntErrorKind::PosOverflow => invalid(text, "out of range"),
        _ => invalid(text, "malformed digits"),
    })?;

    let prefixed = radix != 10;
    if long {
        return match i64::try_from(value) {
            Ok(v) => Ok(IntegerLiteral::Long(v)),
            Err(_) if prefixed => Ok(IntegerLiteral::Long(value as i64)),
            Err(_) => Err(invalid(text, "out of range for long")),
        };
    }
    if let Ok(v) = i32::try_from(value) {
        return Ok(IntegerLiteral::Int(v));
    }
    match u32::try_from(value) {
        Ok(bits) if prefixed => Ok(IntegerLiteral::Int(bits as i32)),
        _ => Err(invalid(text, "out of range for int")),
    }
}

/// Parse floating literal text. An `f`/`F` suffix makes a float, anything
/// else is a double.
pub fn parse_float(text: &str) -> Result<FloatLiteral, EmitError> {
    let cleaned: String = text.chars().filter(|&c| c != '_').collect();
    if let Some(digits) = cleaned.strip_suffix(['f', 'F']) {
        let value = digits
            .parse::<f32>()
            .map_err(|_| invalid(text, "malformed float"))?;
        return Ok(FloatLiteral::Float(value));
    }
    let digits = cleaned.strip_suffix(['d', 'D']).unwrap_or(&cleaned);
    let value = digits
        .parse::<f64>()
        .map_err(|_| invalid(text, "malformed double"))?;
    Ok(FloatLiteral::Double(value))
}

/// Content between the quotes of a string token.
fn unquote(text: &str) -> Result<&str, EmitError> {
    let quoted = text.len() >= 2
        && ((text.starts_with('"') && text.ends_with('"'))
            || (text.starts_with('\'') && text.ends_with('\'')));
    if !quoted {
        return Err(invalid(text, "unterminated string"));
    }
    Ok(&text[1..text.len() - 1])
}

impl Generator<'_> {
    pub(super) fn literal(&mut self, literal: &Literal) -> Result<(), EmitError> {
        match literal {
            Literal::Integer(text) => match parse_integer(text)? {
                IntegerLiteral::Int(value) => self.push_integer(value),
                IntegerLiteral::Long(value) => self.push_long(value),
            },
            Literal::Float(text) => {
                let index = match parse_float(text)? {
                    FloatLiteral::Float(value) => self.pool.intern_float(value)?,
                    FloatLiteral::Double(value) => self.pool.intern_double(value)?,
                };
                self.emit_constant(Opcode::LoadCpr, index)
            }
            Literal::String(text) => {
                let index = self.pool.intern_string(unquote(text)?)?;
                self.emit_constant(Opcode::LoadCpr, index)
            }
            Literal::True => self.emit(Opcode::PushI1),
            Literal::False => self.emit(Opcode::PushI0),
            Literal::Null => self.emit(Opcode::PushNull),
        }
    }

    pub(super) fn push_integer(&mut self, value: i32) -> Result<(), EmitError> {
        if let Some(opcode) = Opcode::push_int(i64::from(value)) {
            return self.emit(opcode);
        }
        if let Ok(byte) = i8::try_from(value) {
            return self.emit_with(Opcode::PushB, Operand::Byte(byte));
        }
        if let Ok(short) = i16::try_from(value) {
            return self.emit_with(Opcode::PushS, Operand::Short(short));
        }
        let index = self.pool.intern_integer(value)?;
        self.emit_constant(Opcode::LoadCpr, index)
    }

    fn push_long(&mut self, value: i64) -> Result<(), EmitError> {
        if let Some(opcode) = Opcode::push_long(value) {
            return self.emit(opcode);
        }
        let index = self.pool.intern_long(value)?;
        self.emit_constant(Opcode::LoadCpr, index)
    }
}
