//! Entity file serialization.
//!
//! The write order is the wire contract; `EntityFile::from_bytes` reads the
//! exact same sequence.

use tracing::debug;
use zen_bytecode::EntityFile;

use crate::emit::{BinaryEntityBuilder, ChannelError, EmitError};

/// Write `file` into channel 0 of `builder`, which must be the only channel.
pub fn write_entity_file(builder: &mut BinaryEntityBuilder, file: &EntityFile) -> Result<(), EmitError> {
    if builder.depth() != 1 {
        return Err(ChannelError::Unbalanced(builder.depth()).into());
    }
    let entity = &file.entity;
    let pool = &file.constant_pool;

    builder.write_magic_number();
    builder.write_version(file.version.major, file.version.minor);
    builder.write_stream_flags(file.stream_flags);

    let count = u16::try_from(pool.len()).map_err(|_| EmitError::TooManyConstants)?;
    builder.write_constant_pool_header(count);
    for (_, entry) in pool.iter() {
        builder.write_constant_pool_entry(entry);
    }
    debug!(entries = count, "wrote constant pool");

    builder.write_entity_header(entity.entity_type as u8, entity.flags, entity.reference);
    builder.write_superclasses(&entity.superclasses);
    builder.write_attribute_count(entity.attributes.len() as u16);
    for attribute in &entity.attributes {
        builder.write_attribute(attribute);
    }

    builder.write_field_count(entity.fields.len() as u32);
    for field in &entity.fields {
        builder.write_field(field);
    }
    builder.write_function_count(entity.functions.len() as u32);
    for function in &entity.functions {
        builder.write_function(function);
    }
    debug!(
        fields = entity.fields.len(),
        functions = entity.functions.len(),
        bytes = builder.channel_len(),
        "wrote entity"
    );
    Ok(())
}

/// Serialize `file` into a fresh byte vector.
pub fn encode(file: &EntityFile) -> Result<Vec<u8>, EmitError> {
    let mut builder = BinaryEntityBuilder::new();
    write_entity_file(&mut builder, file)?;
    Ok(builder.into_bytes()?)
}
