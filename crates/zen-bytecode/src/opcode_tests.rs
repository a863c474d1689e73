use crate::opcode::{Opcode, OperandKind};

#[test]
fn every_byte_round_trips_through_from_u8() {
    for byte in 0..=u8::MAX {
        if let Some(op) = Opcode::from_u8(byte) {
            assert_eq!(op.as_u8(), byte, "{op}");
        }
    }
}

#[test]
fn unknown_bytes_are_rejected() {
    assert_eq!(Opcode::from_u8(0x0E), None);
    assert_eq!(Opcode::from_u8(0xFF), None);
}

#[test]
fn operand_sizes() {
    assert_eq!(Opcode::Nop.size(), 1);
    assert_eq!(Opcode::PushB.size(), 2);
    assert_eq!(Opcode::LoadA.size(), 2);
    assert_eq!(Opcode::PushS.size(), 3);
    assert_eq!(Opcode::LoadCpr.size(), 3);
    assert_eq!(Opcode::Jump.operand(), OperandKind::I16);
    assert_eq!(Opcode::InvokeStatic.operand(), OperandKind::U16);
}

#[test]
fn small_int_pushes() {
    assert_eq!(Opcode::push_int(0), Some(Opcode::PushI0));
    assert_eq!(Opcode::push_int(5), Some(Opcode::PushI5));
    assert_eq!(Opcode::push_int(6), None);
    assert_eq!(Opcode::push_int(-1), None);
    assert_eq!(Opcode::push_long(2), Some(Opcode::PushL2));
    assert_eq!(Opcode::push_long(3), None);
}

#[test]
fn invocations_have_no_fixed_stack_effect() {
    assert_eq!(Opcode::InvokeVirtual.stack_effect(), None);
    assert_eq!(Opcode::StoreAa.stack_effect(), Some((3, 0)));
    assert_eq!(Opcode::DupX2.stack_effect(), Some((3, 4)));
}

#[test]
fn mnemonics() {
    assert_eq!(Opcode::LoadCpr.to_string(), "load_cpr");
    assert_eq!(Opcode::JumpEq0I.to_string(), "jump_eq0_i");
    assert_eq!(Opcode::NewArrayA.to_string(), "new_array_a");
}
