//! Human-readable disassembly of a decoded FEB file.
//!
//! Sections: `[header]`, `[constants]`, `[entity]`, `[fields]`, `[functions]`.
//! Constant references are annotated with what they resolve to, jump
//! operands are printed as absolute offsets.

use std::fmt::Write as _;

use zen_core::Colors;

use crate::attribute::{Attribute, InstructionAttribute};
use crate::constant_pool::{ConstantPool, ConstantPoolEntry};
use crate::constants::MAGIC;
use crate::entity::EntityFile;
use crate::instructions::{Operand, decode_instructions};

pub fn dump(file: &EntityFile, colors: Colors) -> String {
    let ctx = DumpContext {
        pool: &file.constant_pool,
        width: index_width(file.constant_pool.len()),
        colors,
    };
    let mut out = String::new();

    dump_header(&mut out, file, &ctx);
    dump_constants(&mut out, &ctx);
    dump_entity(&mut out, file, &ctx);
    dump_fields(&mut out, file, &ctx);
    dump_functions(&mut out, file, &ctx);

    out
}

struct DumpContext<'a> {
    pool: &'a ConstantPool,
    width: usize,
    colors: Colors,
}

impl DumpContext<'_> {
    fn index(&self, index: u16) -> String {
        format!("#{:0w$}", index, w = self.width)
    }

    fn utf8(&self, index: u16) -> &str {
        self.pool.utf8(index).unwrap_or("?")
    }

    /// What a constant reference means, for trailing comments.
    fn describe(&self, index: u16) -> String {
        let Some(entry) = self.pool.get(index) else {
            return "<invalid>".to_string();
        };
        match entry {
            ConstantPoolEntry::Utf8(text) => format!("{text:?}"),
            ConstantPoolEntry::Integer(v) => v.to_string(),
            ConstantPoolEntry::Float(v) => format!("{v:?}f"),
            ConstantPoolEntry::Long(v) => format!("{v}L"),
            ConstantPoolEntry::Double(v) => format!("{v:?}"),
            ConstantPoolEntry::Class { name_index } => self.utf8(*name_index).to_string(),
            ConstantPoolEntry::String { string_index } => format!("{:?}", self.utf8(*string_index)),
            ConstantPoolEntry::Field { .. } | ConstantPoolEntry::Function { .. } => {
                match self.pool.member_ref(index) {
                    Some(m) => format!("{}.{} {}", m.class, m.name, m.descriptor),
                    None => "<invalid>".to_string(),
                }
            }
        }
    }
}

fn index_width(count: usize) -> usize {
    count.to_string().len().max(2)
}

fn section(out: &mut String, name: &str, ctx: &DumpContext<'_>) {
    let c = &ctx.colors;
    writeln!(out, "{}[{}]{}", c.dim, name, c.reset).unwrap();
}

fn dump_header(out: &mut String, file: &EntityFile, ctx: &DumpContext<'_>) {
    section(out, "header", ctx);
    writeln!(out, "magic = {MAGIC:#010X}").unwrap();
    writeln!(out, "version = {}", file.version).unwrap();
    writeln!(out, "flags = {:#06X}", file.stream_flags).unwrap();
    out.push('\n');
}

fn dump_constants(out: &mut String, ctx: &DumpContext<'_>) {
    section(out, "constants", ctx);
    let c = &ctx.colors;
    for (index, entry) in ctx.pool.iter() {
        let idx = ctx.index(index);
        match entry {
            ConstantPoolEntry::Utf8(_)
            | ConstantPoolEntry::Integer(_)
            | ConstantPoolEntry::Float(_)
            | ConstantPoolEntry::Long(_)
            | ConstantPoolEntry::Double(_) => {
                let kind = format!("{:?}", entry.tag());
                writeln!(
                    out,
                    "{}{idx}{} {kind} {}{}{}",
                    c.dim,
                    c.reset,
                    c.green,
                    ctx.describe(index),
                    c.reset
                )
                .unwrap();
            }
            ConstantPoolEntry::Class { name_index } => {
                writeln!(
                    out,
                    "{}{idx}{} Class {}  ; {}",
                    c.dim,
                    c.reset,
                    ctx.index(*name_index),
                    ctx.describe(index)
                )
                .unwrap();
            }
            ConstantPoolEntry::String { string_index } => {
                writeln!(
                    out,
                    "{}{idx}{} String {}  ; {}",
                    c.dim,
                    c.reset,
                    ctx.index(*string_index),
                    ctx.describe(index)
                )
                .unwrap();
            }
            ConstantPoolEntry::Field {
                class_index,
                descriptor_index,
                name_index,
            }
            | ConstantPoolEntry::Function {
                class_index,
                descriptor_index,
                name_index,
            } => {
                let kind = format!("{:?}", entry.tag());
                writeln!(
                    out,
                    "{}{idx}{} {kind} {} {} {}  ; {}",
                    c.dim,
                    c.reset,
                    ctx.index(*class_index),
                    ctx.index(*name_index),
                    ctx.index(*descriptor_index),
                    ctx.describe(index)
                )
                .unwrap();
            }
        }
    }
    out.push('\n');
}

fn dump_entity(out: &mut String, file: &EntityFile, ctx: &DumpContext<'_>) {
    section(out, "entity", ctx);
    let c = &ctx.colors;
    let entity = &file.entity;
    let supers: Vec<&str> = entity.superclasses.iter().map(|&i| ctx.utf8(i)).collect();
    write!(
        out,
        "{} {}{}{}",
        entity.entity_type.keyword(),
        c.blue,
        ctx.utf8(entity.reference),
        c.reset
    )
    .unwrap();
    if !supers.is_empty() {
        write!(out, " : {}", supers.join(", ")).unwrap();
    }
    out.push('\n');
    writeln!(out, "flags = {:#06X}", entity.flags).unwrap();
    for attribute in &entity.attributes {
        dump_plain_attribute(out, attribute, ctx);
    }
    out.push('\n');
}

fn dump_plain_attribute(out: &mut String, attribute: &Attribute, ctx: &DumpContext<'_>) {
    match attribute {
        Attribute::SourceFile {
            source_file_index, ..
        } => {
            writeln!(out, "source = {:?}", ctx.utf8(*source_file_index)).unwrap();
        }
        Attribute::Unknown { name_index, bytes } => {
            writeln!(
                out,
                "attribute {} ({} bytes)",
                ctx.utf8(*name_index),
                bytes.len()
            )
            .unwrap();
        }
        Attribute::Instruction(code) => {
            writeln!(
                out,
                "attribute {} ({} bytes)",
                ctx.utf8(code.name_index),
                code.length()
            )
            .unwrap();
        }
    }
}

fn dump_fields(out: &mut String, file: &EntityFile, ctx: &DumpContext<'_>) {
    section(out, "fields", ctx);
    let c = &ctx.colors;
    for field in &file.entity.fields {
        writeln!(
            out,
            "{}{}{} {}  flags = {:#06X}",
            c.blue,
            ctx.utf8(field.name_index),
            c.reset,
            ctx.utf8(field.descriptor_index),
            field.flags
        )
        .unwrap();
    }
    out.push('\n');
}

fn dump_functions(out: &mut String, file: &EntityFile, ctx: &DumpContext<'_>) {
    section(out, "functions", ctx);
    let c = &ctx.colors;
    for (i, function) in file.entity.functions.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        writeln!(
            out,
            "{}{}{} {}  flags = {:#06X}",
            c.blue,
            ctx.utf8(function.name_index),
            c.reset,
            ctx.utf8(function.descriptor_index),
            function.flags
        )
        .unwrap();
        for attribute in &function.attributes {
            match attribute {
                Attribute::Instruction(code) => dump_code(out, code, ctx),
                other => {
                    out.push_str("  ");
                    dump_plain_attribute(out, other, ctx);
                }
            }
        }
    }
}

fn dump_code(out: &mut String, code: &InstructionAttribute, ctx: &DumpContext<'_>) {
    let c = &ctx.colors;
    writeln!(
        out,
        "  stack = {}, locals = {}",
        code.max_stack_size, code.local_variable_count
    )
    .unwrap();

    let instructions = match decode_instructions(&code.instructions) {
        Ok(instructions) => instructions,
        Err(e) => {
            writeln!(out, "  <undecodable: {e}>").unwrap();
            return;
        }
    };

    for instr in &instructions {
        write!(
            out,
            "  {}{:04}{}  {}{}{}",
            c.dim, instr.offset, c.reset, c.yellow, instr.opcode, c.reset
        )
        .unwrap();
        match instr.operand {
            Operand::None => {}
            Operand::Byte(v) => write!(out, " {v}").unwrap(),
            Operand::Local(v) => write!(out, " {v}").unwrap(),
            Operand::Short(v) => write!(out, " {v}").unwrap(),
            Operand::Offset(_) => match instr.jump_target() {
                Some(target) => write!(out, " {target:04}").unwrap(),
                None => write!(out, " <invalid>").unwrap(),
            },
            Operand::Constant(index) => write!(
                out,
                " {}  ; {}{}{}",
                ctx.index(index),
                c.green,
                ctx.describe(index),
                c.reset
            )
            .unwrap(),
        }
        out.push('\n');
    }

    for site in &code.exception_table.sites {
        let catch = if site.catch_type == 0 {
            "any".to_string()
        } else {
            ctx.pool
                .class_name(site.catch_type)
                .unwrap_or("?")
                .to_string()
        };
        writeln!(
            out,
            "  {}catch{} [{:04}, {:04}) -> {:04}  {}",
            c.dim, c.reset, site.start_pc, site.end_pc, site.handler_pc, catch
        )
        .unwrap();
    }
}
