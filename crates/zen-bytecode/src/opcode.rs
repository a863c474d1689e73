//! The instruction set.
//!
//! Every opcode is one byte followed by a fixed-width, big-endian operand.
//! Jump offsets are signed and relative to the address of the jump opcode.

/// Operand layout following an opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperandKind {
    None,
    /// Signed byte (`push_b`).
    I8,
    /// Local variable slot.
    U8,
    /// Signed short (`push_s`, jumps).
    I16,
    /// Constant-pool index.
    U16,
}

impl OperandKind {
    pub const fn width(self) -> usize {
        match self {
            OperandKind::None => 0,
            OperandKind::I8 | OperandKind::U8 => 1,
            OperandKind::I16 | OperandKind::U16 => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Nop = 0x00,
    PushNull = 0x01,
    PushI0 = 0x02,
    PushI1 = 0x03,
    PushI2 = 0x04,
    PushI3 = 0x05,
    PushI4 = 0x06,
    PushI5 = 0x07,
    PushL0 = 0x08,
    PushL1 = 0x09,
    PushL2 = 0x0A,
    PushB = 0x0B,
    PushS = 0x0C,
    LoadCpr = 0x0D,

    LoadA = 0x10,
    StoreA = 0x11,
    LoadInstanceField = 0x12,
    StoreInstanceField = 0x13,
    LoadStaticField = 0x14,
    StoreStaticField = 0x15,

    New = 0x18,
    NewArrayA = 0x19,
    LoadAa = 0x1A,
    StoreAa = 0x1B,

    Pop = 0x20,
    Dup = 0x21,
    DupX1 = 0x22,
    DupX2 = 0x23,
    Dup2 = 0x24,
    Swap = 0x25,

    InvokeVirtual = 0x28,
    InvokeStatic = 0x29,

    Jump = 0x30,
    JumpEq0I = 0x31,
    JumpNe0I = 0x32,

    Return = 0x38,
    ReturnA = 0x39,
    Throw = 0x3A,
}

impl Opcode {
    pub fn from_u8(byte: u8) -> Option<Self> {
        use Opcode::*;
        Some(match byte {
            0x00 => Nop,
            0x01 => PushNull,
            0x02 => PushI0,
            0x03 => PushI1,
            0x04 => PushI2,
            0x05 => PushI3,
            0x06 => PushI4,
            0x07 => PushI5,
            0x08 => PushL0,
            0x09 => PushL1,
            0x0A => PushL2,
            0x0B => PushB,
            0x0C => PushS,
            0x0D => LoadCpr,
            0x10 => LoadA,
            0x11 => StoreA,
            0x12 => LoadInstanceField,
            0x13 => StoreInstanceField,
            0x14 => LoadStaticField,
            0x15 => StoreStaticField,
            0x18 => New,
            0x19 => NewArrayA,
            0x1A => LoadAa,
            0x1B => StoreAa,
            0x20 => Pop,
            0x21 => Dup,
            0x22 => DupX1,
            0x23 => DupX2,
            0x24 => Dup2,
            0x25 => Swap,
            0x28 => InvokeVirtual,
            0x29 => InvokeStatic,
            0x30 => Jump,
            0x31 => JumpEq0I,
            0x32 => JumpNe0I,
            0x38 => Return,
            0x39 => ReturnA,
            0x3A => Throw,
            _ => return None,
        })
    }

    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    pub const fn operand(self) -> OperandKind {
        use Opcode::*;
        match self {
            PushB => OperandKind::I8,
            LoadA | StoreA => OperandKind::U8,
            PushS | Jump | JumpEq0I | JumpNe0I => OperandKind::I16,
            LoadCpr | LoadInstanceField | StoreInstanceField | LoadStaticField
            | StoreStaticField | New | NewArrayA | InvokeVirtual | InvokeStatic => {
                OperandKind::U16
            }
            _ => OperandKind::None,
        }
    }

    /// Encoded size in bytes, opcode included.
    #[inline]
    pub const fn size(self) -> usize {
        1 + self.operand().width()
    }

    pub const fn is_jump(self) -> bool {
        matches!(self, Opcode::Jump | Opcode::JumpEq0I | Opcode::JumpNe0I)
    }

    /// Values popped and pushed. `None` for invocations, whose effect
    /// depends on the callee's descriptor.
    pub const fn stack_effect(self) -> Option<(u16, u16)> {
        use Opcode::*;
        Some(match self {
            Nop | Jump | Return => (0, 0),
            PushNull | PushI0 | PushI1 | PushI2 | PushI3 | PushI4 | PushI5 | PushL0 | PushL1
            | PushL2 | PushB | PushS | LoadCpr | LoadA | LoadStaticField | New => (0, 1),
            StoreA | StoreStaticField | Pop | JumpEq0I | JumpNe0I | ReturnA | Throw => (1, 0),
            LoadInstanceField | NewArrayA => (1, 1),
            StoreInstanceField => (2, 0),
            LoadAa => (2, 1),
            StoreAa => (3, 0),
            Dup => (1, 2),
            DupX1 => (2, 3),
            DupX2 => (3, 4),
            Dup2 => (2, 4),
            Swap => (2, 2),
            InvokeVirtual | InvokeStatic => return None,
        })
    }

    pub const fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Nop => "nop",
            PushNull => "push_null",
            PushI0 => "push_i0",
            PushI1 => "push_i1",
            PushI2 => "push_i2",
            PushI3 => "push_i3",
            PushI4 => "push_i4",
            PushI5 => "push_i5",
            PushL0 => "push_l0",
            PushL1 => "push_l1",
            PushL2 => "push_l2",
            PushB => "push_b",
            PushS => "push_s",
            LoadCpr => "load_cpr",
            LoadA => "load_a",
            StoreA => "store_a",
            LoadInstanceField => "load_instance_field",
            StoreInstanceField => "store_instance_field",
            LoadStaticField => "load_static_field",
            StoreStaticField => "store_static_field",
            New => "new",
            NewArrayA => "new_array_a",
            LoadAa => "load_aa",
            StoreAa => "store_aa",
            Pop => "pop",
            Dup => "dup",
            DupX1 => "dup_x1",
            DupX2 => "dup_x2",
            Dup2 => "dup2",
            Swap => "swap",
            InvokeVirtual => "invoke_virtual",
            InvokeStatic => "invoke_static",
            Jump => "jump",
            JumpEq0I => "jump_eq0_i",
            JumpNe0I => "jump_ne0_i",
            Return => "return",
            ReturnA => "return_a",
            Throw => "throw",
        }
    }

    /// The zero-operand push for a small int, if one exists.
    pub const fn push_int(value: i64) -> Option<Self> {
        use Opcode::*;
        Some(match value {
            0 => PushI0,
            1 => PushI1,
            2 => PushI2,
            3 => PushI3,
            4 => PushI4,
            5 => PushI5,
            _ => return None,
        })
    }

    /// The zero-operand push for a small long, if one exists.
    pub const fn push_long(value: i64) -> Option<Self> {
        use Opcode::*;
        Some(match value {
            0 => PushL0,
            1 => PushL1,
            2 => PushL2,
            _ => return None,
        })
    }
}

impl std::fmt::Display for Opcode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.mnemonic())
    }
}
