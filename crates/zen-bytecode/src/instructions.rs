//! Instruction stream decoding.

use crate::error::DecodeError;
use crate::opcode::{Opcode, OperandKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operand {
    None,
    /// Immediate byte (`push_b`).
    Byte(i8),
    /// Local variable slot.
    Local(u8),
    /// Immediate short (`push_s`).
    Short(i16),
    /// Constant-pool index.
    Constant(u16),
    /// Jump offset relative to the jump opcode.
    Offset(i16),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Instruction {
    pub offset: usize,
    pub opcode: Opcode,
    pub operand: Operand,
}

impl Instruction {
    pub fn size(&self) -> usize {
        self.opcode.size()
    }

    /// Absolute target of a jump.
    pub fn jump_target(&self) -> Option<usize> {
        match self.operand {
            Operand::Offset(delta) => self.offset.checked_add_signed(isize::from(delta)),
            _ => None,
        }
    }

    /// Append the encoded form to `out`.
    pub fn encode(&self, out: &mut Vec<u8>) {
        out.push(self.opcode.as_u8());
        match self.operand {
            Operand::None => {}
            Operand::Byte(v) => out.push(v as u8),
            Operand::Local(v) => out.push(v),
            Operand::Short(v) | Operand::Offset(v) => out.extend_from_slice(&v.to_be_bytes()),
            Operand::Constant(v) => out.extend_from_slice(&v.to_be_bytes()),
        }
    }
}

/// Decode a whole instruction stream.
pub fn decode_instructions(code: &[u8]) -> Result<Vec<Instruction>, DecodeError> {
    let mut out = Vec::new();
    let mut offset = 0;
    while offset < code.len() {
        let byte = code[offset];
        let opcode = Opcode::from_u8(byte).ok_or(DecodeError::UnknownOpcode {
            opcode: byte,
            offset,
        })?;
        let end = offset + opcode.size();
        if end > code.len() {
            return Err(DecodeError::TruncatedOperand {
                mnemonic: opcode.mnemonic(),
                offset,
            });
        }
        let raw = &code[offset + 1..end];
        let short = || i16::from_be_bytes([raw[0], raw[1]]);
        let operand = match opcode.operand() {
            OperandKind::None => Operand::None,
            OperandKind::I8 => Operand::Byte(raw[0] as i8),
            OperandKind::U8 => Operand::Local(raw[0]),
            OperandKind::I16 if opcode.is_jump() => Operand::Offset(short()),
            OperandKind::I16 => Operand::Short(short()),
            OperandKind::U16 => Operand::Constant(u16::from_be_bytes([raw[0], raw[1]])),
        };
        out.push(Instruction {
            offset,
            opcode,
            operand,
        });
        offset = end;
    }
    Ok(out)
}
