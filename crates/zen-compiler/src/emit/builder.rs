//! Channel-based byte assembler.
//!
//! The builder owns a stack of channels. Only the top channel receives
//! writes. Nested code regions are generated into their own channel and then
//! merged into (or appended onto) their parent once their final position is
//! known. At serialization time exactly one channel, channel 0, remains.
//!
//! Channels also carry exception-handler sites whose addresses are relative to
//! the channel start; merging rebases them.

use tracing::debug;
use zen_bytecode::{
    Attribute, ExceptionHandlerSite, FieldEntity, FunctionEntity, Instruction, InstructionAttribute,
    MAGIC, Opcode, Operand,
};

use super::ChannelError;

/// Position of a channel in the stack, counted from the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelId(pub(crate) usize);

impl ChannelId {
    #[inline]
    pub fn index(self) -> usize {
        self.0
    }
}

/// One in-progress byte stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Channel {
    bytes: Vec<u8>,
    handlers: Vec<ExceptionHandlerSite>,
}

impl Channel {
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn handlers(&self) -> &[ExceptionHandlerSite] {
        &self.handlers
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_parts(self) -> (Vec<u8>, Vec<ExceptionHandlerSite>) {
        (self.bytes, self.handlers)
    }

    /// `self ++ other`, with `other`'s handler sites shifted past `self`.
    fn append(&mut self, other: Channel) -> Result<(), ChannelError> {
        if other.handlers.is_empty() {
            self.bytes.extend_from_slice(&other.bytes);
            return Ok(());
        }
        let total = self.bytes.len() + other.bytes.len();
        if total > usize::from(u16::MAX) {
            return Err(ChannelError::CodeTooLarge(total));
        }
        let offset = self.bytes.len() as u16;
        self.bytes.extend_from_slice(&other.bytes);
        self.handlers
            .extend(other.handlers.into_iter().map(|site| site.rebased(offset)));
        Ok(())
    }
}

#[derive(Debug)]
pub struct BinaryEntityBuilder {
    channels: Vec<Channel>,
}

impl Default for BinaryEntityBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BinaryEntityBuilder {
    /// A builder holding channel 0.
    pub fn new() -> Self {
        Self {
            channels: vec![Channel::default()],
        }
    }

    /// Number of channels on the stack.
    #[inline]
    pub fn depth(&self) -> usize {
        self.channels.len()
    }

    fn top(&mut self) -> &mut Channel {
        let last = self.channels.len() - 1;
        &mut self.channels[last]
    }

    /// Length of the top channel.
    pub fn channel_len(&self) -> usize {
        self.channels.last().map_or(0, Channel::len)
    }

    /// Bytes of the top channel.
    pub fn channel_bytes(&self) -> &[u8] {
        self.channels.last().map_or(&[][..], Channel::bytes)
    }

    /// Open a new channel on top. Subsequent writes go to it.
    pub fn push_channel(&mut self) -> ChannelId {
        self.channels.push(Channel::default());
        ChannelId(self.channels.len() - 1)
    }

    /// Detach the top channel. Channel 0 is never popped.
    pub fn pop_channel(&mut self) -> Result<Channel, ChannelError> {
        if self.channels.len() < 2 {
            return Err(ChannelError::Underflow);
        }
        self.channels.pop().ok_or(ChannelError::Underflow)
    }

    /// Append the top channel onto the one beneath it and discard it.
    pub fn merge_channel(&mut self) -> Result<(), ChannelError> {
        let top = self.pop_channel()?;
        self.top().append(top)
    }

    /// Append a detached channel onto the top channel.
    pub fn append_channel(&mut self, channel: Channel) -> Result<(), ChannelError> {
        self.top().append(channel)
    }

    /// Exchange the contents of two channels.
    pub fn swap_channels(&mut self, a: ChannelId, b: ChannelId) -> Result<(), ChannelError> {
        let depth = self.channels.len();
        for id in [a, b] {
            if id.0 >= depth {
                return Err(ChannelError::OutOfRange {
                    index: id.0,
                    depth,
                });
            }
        }
        self.channels.swap(a.0, b.0);
        Ok(())
    }

    /// Record a handler site, addresses relative to the top channel.
    pub fn record_handler(&mut self, site: ExceptionHandlerSite) {
        self.top().handlers.push(site);
    }

    /// The final byte stream. Fails unless exactly channel 0 remains.
    pub fn into_bytes(mut self) -> Result<Vec<u8>, ChannelError> {
        if self.channels.len() != 1 {
            return Err(ChannelError::Unbalanced(self.channels.len()));
        }
        let channel = self.channels.pop().ok_or(ChannelError::Underflow)?;
        Ok(channel.bytes)
    }

    pub fn write_u8(&mut self, value: u8) {
        self.top().bytes.push(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.top().bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_u32(&mut self, value: u32) {
        self.top().bytes.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.top().bytes.extend_from_slice(bytes);
    }

    /// One instruction into the top channel.
    pub fn write_instruction(&mut self, opcode: Opcode, operand: Operand) {
        let offset = self.channel_len();
        debug!(offset, %opcode, ?operand, "emit");
        let instruction = Instruction {
            offset,
            opcode,
            operand,
        };
        instruction.encode(&mut self.top().bytes);
    }

    pub fn write_magic_number(&mut self) {
        self.write_u32(MAGIC);
    }

    pub fn write_version(&mut self, major: u16, minor: u16) {
        self.write_u16(major);
        self.write_u16(minor);
    }

    pub fn write_stream_flags(&mut self, flags: u16) {
        self.write_u16(flags);
    }

    pub fn write_constant_pool_header(&mut self, count: u16) {
        self.write_u16(count);
    }

    pub fn write_constant_pool_entry(&mut self, entry: &zen_bytecode::ConstantPoolEntry) {
        self.write_u8(entry.tag() as u8);
        entry.encode_payload(&mut self.top().bytes);
    }

    pub fn write_entity_header(&mut self, entity_type: u8, flags: u16, reference: u16) {
        self.write_u8(entity_type);
        self.write_u16(flags);
        self.write_u16(reference);
    }

    pub fn write_superclasses(&mut self, superclasses: &[u16]) {
        self.write_u16(superclasses.len() as u16);
        for &index in superclasses {
            self.write_u16(index);
        }
    }

    pub fn write_attribute_count(&mut self, count: u16) {
        self.write_u16(count);
    }

    /// Name, length and body of one attribute.
    pub fn write_attribute(&mut self, attribute: &Attribute) {
        self.write_u16(attribute.name_index());
        self.write_u32(attribute.length());
        match attribute {
            Attribute::Instruction(code) => self.write_instruction_attribute_body(code),
            Attribute::SourceFile {
                source_file_index, ..
            } => self.write_u16(*source_file_index),
            Attribute::Unknown { bytes, .. } => self.write_bytes(bytes),
        }
    }

    fn write_instruction_attribute_body(&mut self, code: &InstructionAttribute) {
        self.write_u16(code.max_stack_size);
        self.write_u16(code.local_variable_count);
        self.write_u32(code.instruction_length());
        self.write_bytes(&code.instructions);
        self.write_u16(code.exception_table.len() as u16);
        for site in &code.exception_table.sites {
            self.write_u16(site.start_pc);
            self.write_u16(site.end_pc);
            self.write_u16(site.handler_pc);
            self.write_u16(site.catch_type);
        }
    }

    pub fn write_field_count(&mut self, count: u32) {
        self.write_u32(count);
    }

    pub fn write_field(&mut self, field: &FieldEntity) {
        self.write_u16(field.flags);
        self.write_u16(field.name_index);
        self.write_u16(field.descriptor_index);
    }

    pub fn write_function_count(&mut self, count: u32) {
        self.write_u32(count);
    }

    /// Function record followed by its attribute table.
    pub fn write_function(&mut self, function: &FunctionEntity) {
        self.write_u16(function.flags);
        self.write_u16(function.name_index);
        self.write_u16(function.descriptor_index);
        self.write_u32(function.attributes.len() as u32);
        for attribute in &function.attributes {
            self.write_attribute(attribute);
        }
    }
}
