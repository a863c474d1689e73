use crate::error::DecodeError;
use crate::instructions::{Instruction, Operand, decode_instructions};
use crate::opcode::Opcode;

#[test]
fn decode_mixed_stream() {
    let code = [
        0x00, // nop
        0x0B, 0xFA, // push_b -6
        0x0C, 0x80, 0x00, // push_s -32768
        0x0D, 0x00, 0x07, // load_cpr #7
        0x11, 0x02, // store_a 2
        0x39, // return_a
    ];

    let decoded = decode_instructions(&code).unwrap();

    let ops: Vec<_> = decoded.iter().map(|i| (i.offset, i.opcode, i.operand)).collect();
    assert_eq!(
        ops,
        vec![
            (0, Opcode::Nop, Operand::None),
            (1, Opcode::PushB, Operand::Byte(-6)),
            (3, Opcode::PushS, Operand::Short(i16::MIN)),
            (6, Opcode::LoadCpr, Operand::Constant(7)),
            (9, Opcode::StoreA, Operand::Local(2)),
            (11, Opcode::ReturnA, Operand::None),
        ]
    );
}

#[test]
fn jump_targets_are_relative_to_the_opcode() {
    let code = [0x00, 0x30, 0xFF, 0xFF, 0x31, 0x00, 0x05];

    let decoded = decode_instructions(&code).unwrap();

    assert_eq!(decoded[1].jump_target(), Some(0));
    assert_eq!(decoded[2].jump_target(), Some(9));
    assert_eq!(decoded[0].jump_target(), None);
}

#[test]
fn encode_matches_decode() {
    let instr = Instruction {
        offset: 0,
        opcode: Opcode::InvokeVirtual,
        operand: Operand::Constant(0x0102),
    };
    let mut out = Vec::new();
    instr.encode(&mut out);

    assert_eq!(out, vec![0x28, 0x01, 0x02]);
    assert_eq!(decode_instructions(&out).unwrap(), vec![instr]);
}

#[test]
fn unknown_opcode() {
    let err = decode_instructions(&[0x00, 0xEE]).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::UnknownOpcode {
            opcode: 0xEE,
            offset: 1
        }
    ));
    assert_eq!(err.to_string(), "unknown opcode 0xEE at offset 1");
}

#[test]
fn truncated_operand() {
    let err = decode_instructions(&[0x0D, 0x00]).unwrap_err();

    assert_eq!(
        err.to_string(),
        "operand of load_cpr at offset 0 runs past the end of the code"
    );
}
