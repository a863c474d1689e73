use crate::attribute::Attribute;
use crate::constant_pool::ConstantPoolEntry;
use crate::constants::MAGIC;
use crate::entity::{EntityFile, EntityType};
use crate::error::DecodeError;

fn utf8_entry(out: &mut Vec<u8>, text: &str) {
    out.push(1);
    out.extend_from_slice(&(text.len() as u16).to_be_bytes());
    out.extend_from_slice(text.as_bytes());
}

/// Header, a two-entry pool and a class entity with one opaque attribute.
fn minimal_file() -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&MAGIC.to_be_bytes());
    out.extend_from_slice(&[0x00, 0x00, 0x00, 0x01, 0x00, 0x00]);
    out.extend_from_slice(&2u16.to_be_bytes());
    utf8_entry(&mut out, "T");
    utf8_entry(&mut out, "vm/Custom");
    // type, flags, reference, superclass count
    out.extend_from_slice(&[0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00]);
    // one attribute: name #2, 3 bytes
    out.extend_from_slice(&[0x00, 0x01, 0x00, 0x02, 0x00, 0x00, 0x00, 0x03, 0xAA, 0xBB, 0xCC]);
    // no fields, no functions
    out.extend_from_slice(&[0, 0, 0, 0, 0, 0, 0, 0]);
    out
}

#[test]
fn decode_minimal() {
    let file = EntityFile::from_bytes(&minimal_file()).unwrap();

    assert_eq!(file.version.to_string(), "0.1");
    assert_eq!(file.entity.entity_type, EntityType::Enumeration);
    assert_eq!(file.name(), Some("T"));
    assert_eq!(file.constant_pool.get(2), Some(&ConstantPoolEntry::Utf8("vm/Custom".into())));
    assert_eq!(
        file.entity.attributes,
        vec![Attribute::Unknown {
            name_index: 2,
            bytes: vec![0xAA, 0xBB, 0xCC]
        }]
    );
    assert!(file.entity.fields.is_empty());
    assert!(file.entity.functions.is_empty());
}

#[test]
fn invalid_magic() {
    let mut bytes = minimal_file();
    bytes[0] = 0xCA;

    let err = EntityFile::from_bytes(&bytes).unwrap_err();

    assert_eq!(
        err.to_string(),
        "invalid magic number: expected 0xFEB72000, found 0xCAB72000"
    );
}

#[test]
fn unsupported_major_version() {
    let mut bytes = minimal_file();
    bytes[5] = 0x02;

    let err = EntityFile::from_bytes(&bytes).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::UnsupportedVersion { major: 2, minor: 1 }
    ));
}

#[test]
fn truncated_input() {
    let bytes = minimal_file();

    let err = EntityFile::from_bytes(&bytes[..bytes.len() - 3]).unwrap_err();

    assert!(matches!(err, DecodeError::UnexpectedEof { needed: 3, .. }));
}

#[test]
fn trailing_bytes() {
    let mut bytes = minimal_file();
    bytes.push(0);

    let err = EntityFile::from_bytes(&bytes).unwrap_err();

    assert_eq!(err.to_string(), "1 trailing bytes after the function table");
}

#[test]
fn unknown_constant_tag() {
    let mut bytes = minimal_file();
    bytes[12] = 2;

    let err = EntityFile::from_bytes(&bytes).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::UnknownConstantTag { tag: 2, offset: 12 }
    ));
}

#[test]
fn unknown_entity_type() {
    let mut bytes = minimal_file();
    let type_offset = 12 + 4 + 12;
    bytes[type_offset] = 9;

    let err = EntityFile::from_bytes(&bytes).unwrap_err();

    assert!(matches!(err, DecodeError::UnknownEntityType(9)));
}

#[test]
fn empty_input() {
    let err = EntityFile::from_bytes(&[]).unwrap_err();

    assert!(matches!(
        err,
        DecodeError::UnexpectedEof {
            offset: 0,
            needed: 4
        }
    ));
}
