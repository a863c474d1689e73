//! Constant-pool entries and the decoded pool.
//!
//! Indices are 1-based: index 0 is reserved to mean "no entry" (for example
//! a catch-all exception handler) and never appears in the encoded pool.

use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConstantPoolTag {
    Utf8 = 1,
    Integer = 3,
    Float = 4,
    Long = 5,
    Double = 6,
    Class = 7,
    String = 8,
    Field = 9,
    Function = 10,
}

impl ConstantPoolTag {
    pub fn from_u8(byte: u8) -> Option<Self> {
        Some(match byte {
            1 => Self::Utf8,
            3 => Self::Integer,
            4 => Self::Float,
            5 => Self::Long,
            6 => Self::Double,
            7 => Self::Class,
            8 => Self::String,
            9 => Self::Field,
            10 => Self::Function,
            _ => return None,
        })
    }
}

/// One constant-pool record. Composite entries hold indices of other entries.
///
/// Floating-point entries compare and hash by bit pattern so that the pool
/// can deduplicate them.
#[derive(Clone, Debug)]
pub enum ConstantPoolEntry {
    Utf8(String),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class {
        name_index: u16,
    },
    String {
        string_index: u16,
    },
    Field {
        class_index: u16,
        descriptor_index: u16,
        name_index: u16,
    },
    Function {
        class_index: u16,
        descriptor_index: u16,
        name_index: u16,
    },
}

impl ConstantPoolEntry {
    pub fn tag(&self) -> ConstantPoolTag {
        match self {
            Self::Utf8(_) => ConstantPoolTag::Utf8,
            Self::Integer(_) => ConstantPoolTag::Integer,
            Self::Float(_) => ConstantPoolTag::Float,
            Self::Long(_) => ConstantPoolTag::Long,
            Self::Double(_) => ConstantPoolTag::Double,
            Self::Class { .. } => ConstantPoolTag::Class,
            Self::String { .. } => ConstantPoolTag::String,
            Self::Field { .. } => ConstantPoolTag::Field,
            Self::Function { .. } => ConstantPoolTag::Function,
        }
    }

    /// Payload bytes following the tag.
    pub fn encode_payload(&self, out: &mut Vec<u8>) {
        match self {
            Self::Utf8(text) => {
                out.extend_from_slice(&(text.len() as u16).to_be_bytes());
                out.extend_from_slice(text.as_bytes());
            }
            Self::Integer(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Float(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            Self::Long(v) => out.extend_from_slice(&v.to_be_bytes()),
            Self::Double(v) => out.extend_from_slice(&v.to_bits().to_be_bytes()),
            Self::Class { name_index } => out.extend_from_slice(&name_index.to_be_bytes()),
            Self::String { string_index } => out.extend_from_slice(&string_index.to_be_bytes()),
            Self::Field {
                class_index,
                descriptor_index,
                name_index,
            }
            | Self::Function {
                class_index,
                descriptor_index,
                name_index,
            } => {
                out.extend_from_slice(&class_index.to_be_bytes());
                out.extend_from_slice(&descriptor_index.to_be_bytes());
                out.extend_from_slice(&name_index.to_be_bytes());
            }
        }
    }

    fn bits(&self) -> Option<u64> {
        match self {
            Self::Float(v) => Some(u64::from(v.to_bits())),
            Self::Double(v) => Some(v.to_bits()),
            _ => None,
        }
    }
}

impl PartialEq for ConstantPoolEntry {
    fn eq(&self, other: &Self) -> bool {
        if self.tag() != other.tag() {
            return false;
        }
        if let (Some(a), Some(b)) = (self.bits(), other.bits()) {
            return a == b;
        }
        match (self, other) {
            (Self::Utf8(a), Self::Utf8(b)) => a == b,
            (Self::Integer(a), Self::Integer(b)) => a == b,
            (Self::Long(a), Self::Long(b)) => a == b,
            (Self::Class { name_index: a }, Self::Class { name_index: b }) => a == b,
            (Self::String { string_index: a }, Self::String { string_index: b }) => a == b,
            (
                Self::Field {
                    class_index: c1,
                    descriptor_index: d1,
                    name_index: n1,
                },
                Self::Field {
                    class_index: c2,
                    descriptor_index: d2,
                    name_index: n2,
                },
            )
            | (
                Self::Function {
                    class_index: c1,
                    descriptor_index: d1,
                    name_index: n1,
                },
                Self::Function {
                    class_index: c2,
                    descriptor_index: d2,
                    name_index: n2,
                },
            ) => (c1, d1, n1) == (c2, d2, n2),
            _ => false,
        }
    }
}

impl Eq for ConstantPoolEntry {}

impl Hash for ConstantPoolEntry {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag().hash(state);
        if let Some(bits) = self.bits() {
            bits.hash(state);
            return;
        }
        match self {
            Self::Utf8(s) => s.hash(state),
            Self::Integer(v) => v.hash(state),
            Self::Long(v) => v.hash(state),
            Self::Class { name_index } => name_index.hash(state),
            Self::String { string_index } => string_index.hash(state),
            Self::Field {
                class_index,
                descriptor_index,
                name_index,
            }
            | Self::Function {
                class_index,
                descriptor_index,
                name_index,
            } => (class_index, descriptor_index, name_index).hash(state),
            Self::Float(_) | Self::Double(_) => unreachable!("handled by bits()"),
        }
    }
}

/// A decoded, read-only constant pool.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConstantPool {
    entries: Vec<ConstantPoolEntry>,
}

impl ConstantPool {
    pub fn new(entries: Vec<ConstantPoolEntry>) -> Self {
        Self { entries }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, index: u16) -> Option<&ConstantPoolEntry> {
        let slot = usize::from(index).checked_sub(1)?;
        self.entries.get(slot)
    }

    pub fn utf8(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Utf8(text) => Some(text),
            _ => None,
        }
    }

    /// Name of a `Class` entry.
    pub fn class_name(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            ConstantPoolEntry::Class { name_index } => self.utf8(*name_index),
            _ => None,
        }
    }

    /// Text of a `String` entry.
    pub fn string(&self, index: u16) -> Option<&str> {
        match self.get(index)? {
            ConstantPoolEntry::String { string_index } => self.utf8(*string_index),
            _ => None,
        }
    }

    /// `(class, name, descriptor)` of a `Function` or `Field` entry.
    pub fn member_ref(&self, index: u16) -> Option<MemberRef<'_>> {
        let (class_index, descriptor_index, name_index) = match self.get(index)? {
            ConstantPoolEntry::Field {
                class_index,
                descriptor_index,
                name_index,
            }
            | ConstantPoolEntry::Function {
                class_index,
                descriptor_index,
                name_index,
            } => (*class_index, *descriptor_index, *name_index),
            _ => return None,
        };
        Some(MemberRef {
            class: self.class_name(class_index)?,
            name: self.utf8(name_index)?,
            descriptor: self.utf8(descriptor_index)?,
        })
    }

    /// Entries paired with their 1-based indices.
    pub fn iter(&self) -> impl Iterator<Item = (u16, &ConstantPoolEntry)> {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| ((i + 1) as u16, e))
    }

    pub fn entries(&self) -> &[ConstantPoolEntry] {
        &self.entries
    }
}

/// A resolved field or function reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MemberRef<'a> {
    pub class: &'a str,
    pub name: &'a str,
    pub descriptor: &'a str,
}
