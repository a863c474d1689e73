//! FEB decoder.
//!
//! Parses exactly the sequence the entity builder writes: header, constant
//! pool, entity header, superclasses, entity attributes, fields, functions.
//! Anything left over is an error.

use std::path::Path;

use crate::attribute::{Attribute, ExceptionHandlerSite, ExceptionTable, InstructionAttribute};
use crate::constant_pool::{ConstantPool, ConstantPoolEntry, ConstantPoolTag};
use crate::constants::{MAGIC, MAJOR_VERSION, attribute_name};
use crate::entity::{Entity, EntityFile, EntityType, FieldEntity, FunctionEntity, Version};
use crate::error::DecodeError;

/// Big-endian cursor over a byte slice.
pub struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    #[inline]
    pub fn position(&self) -> usize {
        self.pos
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8], DecodeError> {
        if self.remaining() < n {
            return Err(DecodeError::UnexpectedEof {
                offset: self.pos,
                needed: n - self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], DecodeError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.read_bytes(N)?);
        Ok(out)
    }

    pub fn read_u8(&mut self) -> Result<u8, DecodeError> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16(&mut self) -> Result<u16, DecodeError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    pub fn read_u32(&mut self) -> Result<u32, DecodeError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    pub fn read_u64(&mut self) -> Result<u64, DecodeError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }
}

impl EntityFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DecodeError> {
        let bytes = std::fs::read(path)?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        let mut r = ByteReader::new(bytes);

        let magic = r.read_u32()?;
        if magic != MAGIC {
            return Err(DecodeError::InvalidMagic(magic));
        }
        let version = Version {
            major: r.read_u16()?,
            minor: r.read_u16()?,
        };
        if version.major != MAJOR_VERSION {
            return Err(DecodeError::UnsupportedVersion {
                major: version.major,
                minor: version.minor,
            });
        }
        let stream_flags = r.read_u16()?;

        let constant_pool = read_constant_pool(&mut r)?;
        tracing::debug!(entries = constant_pool.len(), "decoded constant pool");

        let raw_type = r.read_u8()?;
        let entity_type =
            EntityType::from_u8(raw_type).ok_or(DecodeError::UnknownEntityType(raw_type))?;
        let flags = r.read_u16()?;
        let reference = r.read_u16()?;

        let superclass_count = r.read_u16()?;
        let superclasses = (0..superclass_count)
            .map(|_| r.read_u16())
            .collect::<Result<Vec<_>, _>>()?;

        let attribute_count = u32::from(r.read_u16()?);
        let attributes = read_attributes(&mut r, &constant_pool, attribute_count)?;

        let field_count = r.read_u32()?;
        let mut fields = Vec::with_capacity(field_count.min(1024) as usize);
        for _ in 0..field_count {
            fields.push(FieldEntity {
                flags: r.read_u16()?,
                name_index: r.read_u16()?,
                descriptor_index: r.read_u16()?,
            });
        }

        let function_count = r.read_u32()?;
        let mut functions = Vec::with_capacity(function_count.min(1024) as usize);
        for _ in 0..function_count {
            let flags = r.read_u16()?;
            let name_index = r.read_u16()?;
            let descriptor_index = r.read_u16()?;
            let attribute_count = r.read_u32()?;
            let attributes = read_attributes(&mut r, &constant_pool, attribute_count)?;
            functions.push(FunctionEntity {
                flags,
                name_index,
                descriptor_index,
                attributes,
            });
        }

        if r.remaining() != 0 {
            return Err(DecodeError::TrailingBytes(r.remaining()));
        }

        tracing::debug!(
            fields = fields.len(),
            functions = functions.len(),
            "decoded entity"
        );

        Ok(EntityFile {
            version,
            stream_flags,
            constant_pool,
            entity: Entity {
                entity_type,
                flags,
                reference,
                superclasses,
                attributes,
                fields,
                functions,
            },
        })
    }
}

fn read_constant_pool(r: &mut ByteReader<'_>) -> Result<ConstantPool, DecodeError> {
    let count = r.read_u16()?;
    let mut entries = Vec::with_capacity(usize::from(count));
    for slot in 0..count {
        let offset = r.position();
        let tag = r.read_u8()?;
        let tag = ConstantPoolTag::from_u8(tag)
            .ok_or(DecodeError::UnknownConstantTag { tag, offset })?;
        let entry = match tag {
            ConstantPoolTag::Utf8 => {
                let length = usize::from(r.read_u16()?);
                let bytes = r.read_bytes(length)?;
                let text = std::str::from_utf8(bytes)
                    .map_err(|_| DecodeError::InvalidUtf8 { index: slot + 1 })?;
                ConstantPoolEntry::Utf8(text.to_string())
            }
            ConstantPoolTag::Integer => ConstantPoolEntry::Integer(r.read_u32()? as i32),
            ConstantPoolTag::Float => ConstantPoolEntry::Float(f32::from_bits(r.read_u32()?)),
            ConstantPoolTag::Long => ConstantPoolEntry::Long(r.read_u64()? as i64),
            ConstantPoolTag::Double => ConstantPoolEntry::Double(f64::from_bits(r.read_u64()?)),
            ConstantPoolTag::Class => ConstantPoolEntry::Class {
                name_index: r.read_u16()?,
            },
            ConstantPoolTag::String => ConstantPoolEntry::String {
                string_index: r.read_u16()?,
            },
            ConstantPoolTag::Field => ConstantPoolEntry::Field {
                class_index: r.read_u16()?,
                descriptor_index: r.read_u16()?,
                name_index: r.read_u16()?,
            },
            ConstantPoolTag::Function => ConstantPoolEntry::Function {
                class_index: r.read_u16()?,
                descriptor_index: r.read_u16()?,
                name_index: r.read_u16()?,
            },
        };
        entries.push(entry);
    }
    Ok(ConstantPool::new(entries))
}

fn read_attributes(
    r: &mut ByteReader<'_>,
    pool: &ConstantPool,
    count: u32,
) -> Result<Vec<Attribute>, DecodeError> {
    let mut attributes = Vec::new();
    for _ in 0..count {
        let name_index = r.read_u16()?;
        let length = r.read_u32()?;
        let body = r.read_bytes(length as usize)?;
        attributes.push(read_attribute(name_index, body, pool)?);
    }
    Ok(attributes)
}

fn read_attribute(
    name_index: u16,
    body: &[u8],
    pool: &ConstantPool,
) -> Result<Attribute, DecodeError> {
    let declared = body.len() as u32;
    let mut r = ByteReader::new(body);
    let attribute = match pool.utf8(name_index) {
        Some(attribute_name::INSTRUCTION) => {
            let max_stack_size = r.read_u16()?;
            let local_variable_count = r.read_u16()?;
            let instruction_length = r.read_u32()?;
            let instructions = r.read_bytes(instruction_length as usize)?.to_vec();
            let site_count = r.read_u16()?;
            let mut sites = Vec::with_capacity(usize::from(site_count));
            for _ in 0..site_count {
                sites.push(ExceptionHandlerSite {
                    start_pc: r.read_u16()?,
                    end_pc: r.read_u16()?,
                    handler_pc: r.read_u16()?,
                    catch_type: r.read_u16()?,
                });
            }
            Attribute::Instruction(InstructionAttribute {
                name_index,
                max_stack_size,
                local_variable_count,
                instructions,
                exception_table: ExceptionTable::new(sites),
            })
        }
        Some(attribute_name::SOURCE_FILE) => Attribute::SourceFile {
            name_index,
            source_file_index: r.read_u16()?,
        },
        _ => {
            return Ok(Attribute::Unknown {
                name_index,
                bytes: body.to_vec(),
            });
        }
    };
    if r.remaining() != 0 {
        return Err(DecodeError::AttributeLengthMismatch {
            declared,
            actual: declared - r.remaining() as u32,
        });
    }
    Ok(attribute)
}
