//! Attribute tables.
//!
//! Every attribute is `name_index: u16, length: u32, body[length]`. The name
//! (a Utf8 constant) decides how the body is interpreted.

/// One exception-table row. `[start_pc, end_pc)` is the protected range;
/// a `catch_type` of 0 catches everything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ExceptionHandlerSite {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: u16,
}

impl ExceptionHandlerSite {
    pub const ENCODED_SIZE: usize = 8;

    #[inline]
    pub fn covers(&self, pc: usize) -> bool {
        usize::from(self.start_pc) <= pc && pc < usize::from(self.end_pc)
    }

    /// Shift every address by `offset`.
    pub fn rebased(self, offset: u16) -> Self {
        Self {
            start_pc: self.start_pc + offset,
            end_pc: self.end_pc + offset,
            handler_pc: self.handler_pc + offset,
            catch_type: self.catch_type,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ExceptionTable {
    pub sites: Vec<ExceptionHandlerSite>,
}

impl ExceptionTable {
    pub fn new(sites: Vec<ExceptionHandlerSite>) -> Self {
        Self { sites }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.sites.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}

/// The bytecode of one function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InstructionAttribute {
    pub name_index: u16,
    pub max_stack_size: u16,
    pub local_variable_count: u16,
    pub instructions: Vec<u8>,
    pub exception_table: ExceptionTable,
}

impl InstructionAttribute {
    /// Body length as written after the name index:
    /// stack + locals + instruction length + instructions + table.
    pub fn length(&self) -> u32 {
        (2 + 2 + 4 + self.instructions.len() + 2
            + self.exception_table.len() * ExceptionHandlerSite::ENCODED_SIZE) as u32
    }

    #[inline]
    pub fn instruction_length(&self) -> u32 {
        self.instructions.len() as u32
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Attribute {
    Instruction(InstructionAttribute),
    SourceFile {
        name_index: u16,
        source_file_index: u16,
    },
    /// Any attribute this version does not interpret; the body is preserved.
    Unknown { name_index: u16, bytes: Vec<u8> },
}

impl Attribute {
    pub fn name_index(&self) -> u16 {
        match self {
            Attribute::Instruction(a) => a.name_index,
            Attribute::SourceFile { name_index, .. } | Attribute::Unknown { name_index, .. } => {
                *name_index
            }
        }
    }

    pub fn length(&self) -> u32 {
        match self {
            Attribute::Instruction(a) => a.length(),
            Attribute::SourceFile { .. } => 2,
            Attribute::Unknown { bytes, .. } => bytes.len() as u32,
        }
    }

    pub fn as_instruction(&self) -> Option<&InstructionAttribute> {
        match self {
            Attribute::Instruction(a) => Some(a),
            _ => None,
        }
    }
}
