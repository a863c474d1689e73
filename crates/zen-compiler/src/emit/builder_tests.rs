use zen_bytecode::{ExceptionHandlerSite, Opcode, Operand};

use super::{BinaryEntityBuilder, ChannelError, ChannelId};

#[test]
fn merge_appends_top_onto_parent() {
    let mut b = BinaryEntityBuilder::new();
    b.write_bytes(&[1, 2]);
    b.push_channel();
    b.write_bytes(&[3, 4, 5]);
    assert_eq!(b.depth(), 2);

    b.merge_channel().unwrap();
    assert_eq!(b.depth(), 1);
    assert_eq!(b.into_bytes().unwrap(), [1, 2, 3, 4, 5]);
}

#[test]
fn nested_merges_associate() {
    let mut b = BinaryEntityBuilder::new();
    b.write_u8(0xA);
    b.push_channel();
    b.write_u8(0xB);
    b.push_channel();
    b.write_u8(0xC);
    b.merge_channel().unwrap();
    b.write_u8(0xD);
    b.merge_channel().unwrap();
    b.write_u8(0xE);
    assert_eq!(b.into_bytes().unwrap(), [0xA, 0xB, 0xC, 0xD, 0xE]);
}

#[test]
fn swap_reorders_without_losing_content() {
    let mut b = BinaryEntityBuilder::new();
    let key = b.push_channel();
    b.write_u8(1);
    let value = b.push_channel();
    b.write_u8(2);

    b.swap_channels(key, value).unwrap();
    assert_eq!(b.channel_bytes(), [1]);
    b.merge_channel().unwrap();
    assert_eq!(b.channel_bytes(), [2, 1]);
    b.merge_channel().unwrap();
    assert_eq!(b.into_bytes().unwrap(), [2, 1]);
}

#[test]
fn channel_zero_cannot_be_popped() {
    let mut b = BinaryEntityBuilder::new();
    assert_eq!(b.pop_channel(), Err(ChannelError::Underflow));
    assert_eq!(b.merge_channel(), Err(ChannelError::Underflow));
}

#[test]
fn swap_out_of_range() {
    let mut b = BinaryEntityBuilder::new();
    let top = b.push_channel();
    let err = b.swap_channels(top, ChannelId(5)).unwrap_err();
    assert_eq!(err, ChannelError::OutOfRange { index: 5, depth: 2 });
    assert_eq!(err.to_string(), "channel 5 out of range (depth 2)");
}

#[test]
fn unbalanced_stack_cannot_be_finished() {
    let mut b = BinaryEntityBuilder::new();
    b.push_channel();
    assert_eq!(b.into_bytes(), Err(ChannelError::Unbalanced(2)));
}

#[test]
fn instructions_are_big_endian() {
    let mut b = BinaryEntityBuilder::new();
    b.write_instruction(Opcode::PushS, Operand::Short(-2));
    b.write_instruction(Opcode::LoadCpr, Operand::Constant(0x0102));
    b.write_instruction(Opcode::StoreA, Operand::Local(3));
    b.write_instruction(Opcode::Nop, Operand::None);
    assert_eq!(
        b.into_bytes().unwrap(),
        [0x0C, 0xFF, 0xFE, 0x0D, 0x01, 0x02, 0x11, 0x03, 0x00]
    );
}

#[test]
fn handler_sites_are_rebased_on_merge() {
    let site = ExceptionHandlerSite {
        start_pc: 0,
        end_pc: 2,
        handler_pc: 3,
        catch_type: 7,
    };
    let mut b = BinaryEntityBuilder::new();
    b.push_channel();
    b.write_bytes(&[0; 4]);
    b.push_channel();
    b.write_bytes(&[0; 5]);
    b.record_handler(site);
    b.merge_channel().unwrap();

    let channel = b.pop_channel().unwrap();
    assert_eq!(channel.len(), 9);
    assert_eq!(
        channel.handlers(),
        [ExceptionHandlerSite {
            start_pc: 4,
            end_pc: 6,
            handler_pc: 7,
            catch_type: 7,
        }]
    );
}
