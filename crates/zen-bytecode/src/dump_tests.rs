use zen_core::Colors;

use crate::attribute::{Attribute, ExceptionHandlerSite, ExceptionTable, InstructionAttribute};
use crate::constant_pool::{ConstantPool, ConstantPoolEntry};
use crate::dump::dump;
use crate::entity::{Entity, EntityFile, EntityType, FieldEntity, FunctionEntity, Version};

fn utf8(text: &str) -> ConstantPoolEntry {
    ConstantPoolEntry::Utf8(text.to_string())
}

fn code(name_index: u16, stack: u16, locals: u16, bytes: &[u8]) -> InstructionAttribute {
    InstructionAttribute {
        name_index,
        max_stack_size: stack,
        local_variable_count: locals,
        instructions: bytes.to_vec(),
        exception_table: ExceptionTable::default(),
    }
}

#[test]
fn dump_minimal_class() {
    let file = EntityFile {
        version: Version::CURRENT,
        stream_flags: 0,
        constant_pool: ConstantPool::new(vec![
            utf8("Test"),
            utf8("zen/core/Object"),
            utf8("main"),
            utf8("(zen/core/Object):v"),
            utf8("vm/primary/Instruction"),
            ConstantPoolEntry::Integer(40000),
            utf8("value"),
            utf8("com/todo/Class"),
        ]),
        entity: Entity {
            entity_type: EntityType::Class,
            flags: 0,
            reference: 1,
            superclasses: vec![2],
            attributes: vec![],
            fields: vec![FieldEntity {
                flags: 0,
                name_index: 7,
                descriptor_index: 8,
            }],
            functions: vec![FunctionEntity {
                flags: 0,
                name_index: 3,
                descriptor_index: 4,
                attributes: vec![Attribute::Instruction(code(
                    5,
                    1,
                    0,
                    &[0x00, 0x0D, 0x00, 0x06, 0x39],
                ))],
            }],
        },
    };

    insta::assert_snapshot!(dump(&file, Colors::OFF), @r#"
    [header]
    magic = 0xFEB72000
    version = 0.1
    flags = 0x0000

    [constants]
    #01 Utf8 "Test"
    #02 Utf8 "zen/core/Object"
    #03 Utf8 "main"
    #04 Utf8 "(zen/core/Object):v"
    #05 Utf8 "vm/primary/Instruction"
    #06 Integer 40000
    #07 Utf8 "value"
    #08 Utf8 "com/todo/Class"

    [entity]
    class Test : zen/core/Object
    flags = 0x0000

    [fields]
    value com/todo/Class  flags = 0x0000

    [functions]
    main (zen/core/Object):v  flags = 0x0000
      stack = 1, locals = 0
      0000  nop
      0001  load_cpr #06  ; 40000
      0004  return_a
    "#);
}

fn annotated_file() -> EntityFile {
    let mut run = code(
        9,
        2,
        1,
        &[
            0x00, // nop
            0x04, // push_i2
            0x0B, 0x07, // push_b 7
            0x28, 0x00, 0x06, // invoke_virtual #06
            0x20, // pop
            0x30, 0x00, 0x05, // jump +5
            0x11, 0x00, // store_a 0
            0x0D, 0x00, 0x0D, // load_cpr #13
            0x39, // return_a
        ],
    );
    let site = ExceptionHandlerSite {
        start_pc: 1,
        end_pc: 8,
        handler_pc: 11,
        catch_type: 0,
    };
    run.exception_table = ExceptionTable::new(vec![
        site,
        ExceptionHandlerSite {
            catch_type: 3,
            ..site
        },
    ]);

    EntityFile {
        version: Version::CURRENT,
        stream_flags: 0,
        constant_pool: ConstantPool::new(vec![
            utf8("Test"),
            utf8("zen/core/Object"),
            ConstantPoolEntry::Class { name_index: 2 },
            utf8("plusOperator"),
            utf8("(zen/core/Object):(zen/core/Object)"),
            ConstantPoolEntry::Function {
                class_index: 3,
                descriptor_index: 5,
                name_index: 4,
            },
            utf8("run"),
            utf8("(zen/core/Object):v"),
            utf8("vm/primary/Instruction"),
            utf8("vm/SourceFile"),
            utf8("Test.zen"),
            utf8("hello"),
            ConstantPoolEntry::String { string_index: 12 },
        ]),
        entity: Entity {
            entity_type: EntityType::Class,
            flags: 0,
            reference: 1,
            superclasses: vec![2],
            attributes: vec![Attribute::SourceFile {
                name_index: 10,
                source_file_index: 11,
            }],
            fields: vec![],
            functions: vec![FunctionEntity {
                flags: 0,
                name_index: 7,
                descriptor_index: 8,
                attributes: vec![Attribute::Instruction(run)],
            }],
        },
    }
}

#[test]
fn dump_references_jumps_and_handlers() {
    insta::assert_snapshot!(dump(&annotated_file(), Colors::OFF), @r#"
    [header]
    magic = 0xFEB72000
    version = 0.1
    flags = 0x0000

    [constants]
    #01 Utf8 "Test"
    #02 Utf8 "zen/core/Object"
    #03 Class #02  ; zen/core/Object
    #04 Utf8 "plusOperator"
    #05 Utf8 "(zen/core/Object):(zen/core/Object)"
    #06 Function #03 #04 #05  ; zen/core/Object.plusOperator (zen/core/Object):(zen/core/Object)
    #07 Utf8 "run"
    #08 Utf8 "(zen/core/Object):v"
    #09 Utf8 "vm/primary/Instruction"
    #10 Utf8 "vm/SourceFile"
    #11 Utf8 "Test.zen"
    #12 Utf8 "hello"
    #13 String #12  ; "hello"

    [entity]
    class Test : zen/core/Object
    flags = 0x0000
    source = "Test.zen"

    [fields]

    [functions]
    run (zen/core/Object):v  flags = 0x0000
      stack = 2, locals = 1
      0000  nop
      0001  push_i2
      0002  push_b 7
      0004  invoke_virtual #06  ; zen/core/Object.plusOperator (zen/core/Object):(zen/core/Object)
      0007  pop
      0008  jump 0013
      0011  store_a 0
      0013  load_cpr #13  ; "hello"
      0016  return_a
      catch [0001, 0008) -> 0011  any
      catch [0001, 0008) -> 0011  zen/core/Object
    "#);
}

#[test]
fn dump_with_colors() {
    let out = dump(&annotated_file(), Colors::ON);

    assert!(out.contains("\x1b[33mnop\x1b[0m"));
    assert!(out.contains("\x1b[34mrun\x1b[0m"));
}
