//! Heap-independent results.
//!
//! A [`Value`] only means something next to the heap it points into.
//! `Output` copies everything reachable from a value into an owned tree so
//! that results can leave their processor thread, be compared in tests and
//! be printed as JSON.

use std::fmt;

use serde::Serialize;
use serde::ser::{SerializeMap, SerializeSeq};
use zen_core::Colors;

use super::error::RuntimeError;
use super::heap::{Heap, HeapObject, HeapRef};
use super::value::Value;

#[derive(Clone, Debug, PartialEq)]
pub enum Output {
    Null,
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Array(Vec<Output>),
    Map(Vec<(Output, Output)>),
    Object {
        class: String,
        fields: Vec<(String, Output)>,
    },
    /// A reference back to a container already being copied.
    Cycle,
}

impl Output {
    pub fn from_value(heap: &Heap, value: &Value) -> Self {
        let mut path = Vec::new();
        copy(heap, value, &mut path)
    }

    /// Rebuild a value on `heap`. Objects and cycles cannot cross threads.
    pub fn into_value(self, heap: &mut Heap) -> Result<Value, RuntimeError> {
        Ok(match self {
            Output::Null => Value::Null,
            Output::Int(v) => Value::Int(v),
            Output::Long(v) => Value::Long(v),
            Output::Float(v) => Value::Float(v),
            Output::Double(v) => Value::Double(v),
            Output::String(text) => Value::string(&text),
            Output::Array(elements) => {
                let elements = elements
                    .into_iter()
                    .map(|e| e.into_value(heap))
                    .collect::<Result<_, _>>()?;
                heap.alloc_array(elements)
            }
            Output::Map(entries) => {
                let entries = entries
                    .into_iter()
                    .map(|(k, v)| Ok((k.into_value(heap)?, v.into_value(heap)?)))
                    .collect::<Result<_, RuntimeError>>()?;
                heap.alloc_map(entries)
            }
            Output::Object { .. } => {
                return Err(RuntimeError::TypeMismatch {
                    operation: "thread argument",
                    found: "object",
                });
            }
            Output::Cycle => {
                return Err(RuntimeError::TypeMismatch {
                    operation: "thread argument",
                    found: "cycle",
                });
            }
        })
    }

    /// Format as colored JSON.
    ///
    /// - Keys: blue
    /// - Strings: green
    /// - Class tags: yellow
    /// - `null` and structure: dim
    pub fn format(&self, pretty: bool, colors: Colors) -> String {
        let mut out = String::new();
        format_output(&mut out, self, &colors, pretty, 0);
        out
    }
}

fn copy(heap: &Heap, value: &Value, path: &mut Vec<HeapRef>) -> Output {
    let r = match value {
        Value::Null => return Output::Null,
        Value::Int(v) => return Output::Int(*v),
        Value::Long(v) => return Output::Long(*v),
        Value::Float(v) => return Output::Float(*v),
        Value::Double(v) => return Output::Double(*v),
        Value::String(text) => return Output::String(text.to_string()),
        Value::Array(r) | Value::Map(r) | Value::Object(r) => *r,
    };
    if path.contains(&r) {
        return Output::Cycle;
    }
    path.push(r);
    let output = match heap.get(r) {
        HeapObject::Array(elements) => {
            Output::Array(elements.iter().map(|e| copy(heap, e, path)).collect())
        }
        HeapObject::Map(entries) => Output::Map(
            entries
                .iter()
                .map(|(k, v)| (copy(heap, k, path), copy(heap, v, path)))
                .collect(),
        ),
        HeapObject::Instance { class, fields } => Output::Object {
            class: class.name.clone(),
            fields: fields
                .iter()
                .map(|(name, v)| (name.clone(), copy(heap, v, path)))
                .collect(),
        },
    };
    path.pop();
    output
}

/// JSON object key for a map key.
fn key_text(key: &Output) -> String {
    match key {
        Output::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl Serialize for Output {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        match self {
            Output::Null => serializer.serialize_none(),
            Output::Int(v) => serializer.serialize_i32(*v),
            Output::Long(v) => serializer.serialize_i64(*v),
            Output::Float(v) => serializer.serialize_f32(*v),
            Output::Double(v) => serializer.serialize_f64(*v),
            Output::String(text) => serializer.serialize_str(text),
            Output::Array(elements) => {
                let mut seq = serializer.serialize_seq(Some(elements.len()))?;
                for element in elements {
                    seq.serialize_element(element)?;
                }
                seq.end()
            }
            Output::Map(entries) => {
                let mut map = serializer.serialize_map(Some(entries.len()))?;
                for (k, v) in entries {
                    map.serialize_entry(&key_text(k), v)?;
                }
                map.end()
            }
            Output::Object { class, fields } => {
                let mut map = serializer.serialize_map(Some(fields.len() + 1))?;
                map.serialize_entry("$class", class)?;
                for (name, v) in fields {
                    map.serialize_entry(name, v)?;
                }
                map.end()
            }
            Output::Cycle => serializer.serialize_str("<cycle>"),
        }
    }
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(false, Colors::OFF))
    }
}

fn format_output(out: &mut String, output: &Output, c: &Colors, pretty: bool, indent: usize) {
    match output {
        Output::Null => {
            out.push_str(c.dim);
            out.push_str("null");
            out.push_str(c.reset);
        }
        Output::Int(v) => out.push_str(&v.to_string()),
        Output::Long(v) => out.push_str(&v.to_string()),
        Output::Float(v) => out.push_str(&v.to_string()),
        Output::Double(v) => out.push_str(&v.to_string()),
        Output::String(text) => format_string(out, text, c.green, c),
        Output::Array(elements) => format_array(out, elements, c, pretty, indent),
        Output::Map(entries) => {
            let fields: Vec<(String, &Output)> =
                entries.iter().map(|(k, v)| (key_text(k), v)).collect();
            format_object(out, None, &fields, c, pretty, indent);
        }
        Output::Object { class, fields } => {
            let fields: Vec<(String, &Output)> =
                fields.iter().map(|(k, v)| (k.clone(), v)).collect();
            format_object(out, Some(class.as_str()), &fields, c, pretty, indent);
        }
        Output::Cycle => {
            out.push_str(c.dim);
            out.push_str("\"<cycle>\"");
            out.push_str(c.reset);
        }
    }
}

fn format_string(out: &mut String, text: &str, color: &str, c: &Colors) {
    out.push_str(color);
    out.push('"');
    out.push_str(&escape_json_string(text));
    out.push('"');
    out.push_str(c.reset);
}

fn punctuation(out: &mut String, ch: char, c: &Colors) {
    out.push_str(c.dim);
    out.push(ch);
    out.push_str(c.reset);
}

fn format_array(out: &mut String, elements: &[Output], c: &Colors, pretty: bool, indent: usize) {
    punctuation(out, '[', c);
    if elements.is_empty() {
        punctuation(out, ']', c);
        return;
    }

    let element_indent = if pretty { indent + 2 } else { 0 };
    for (i, element) in elements.iter().enumerate() {
        if i > 0 {
            punctuation(out, ',', c);
        }
        if pretty {
            out.push('\n');
            out.push_str(&" ".repeat(element_indent));
        }
        format_output(out, element, c, pretty, element_indent);
    }
    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
    punctuation(out, ']', c);
}

fn format_object(
    out: &mut String,
    class: Option<&str>,
    fields: &[(String, &Output)],
    c: &Colors,
    pretty: bool,
    indent: usize,
) {
    punctuation(out, '{', c);
    if class.is_none() && fields.is_empty() {
        punctuation(out, '}', c);
        return;
    }

    let field_indent = if pretty { indent + 2 } else { 0 };
    let separator = |out: &mut String, first: bool| {
        if !first {
            punctuation(out, ',', c);
        }
        if pretty {
            out.push('\n');
            out.push_str(&" ".repeat(field_indent));
        }
    };
    let colon = |out: &mut String| {
        punctuation(out, ':', c);
        if pretty {
            out.push(' ');
        }
    };

    if let Some(class) = class {
        separator(out, true);
        format_string(out, "$class", c.blue, c);
        colon(out);
        format_string(out, class, c.yellow, c);
    }
    for (i, (key, value)) in fields.iter().enumerate() {
        separator(out, i == 0 && class.is_none());
        format_string(out, key, c.blue, c);
        colon(out);
        format_output(out, value, c, pretty, field_indent);
    }

    if pretty {
        out.push('\n');
        out.push_str(&" ".repeat(indent));
    }
    punctuation(out, '}', c);
}

fn escape_json_string(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '"' => result.push_str("\\\""),
            '\\' => result.push_str("\\\\"),
            '\n' => result.push_str("\\n"),
            '\r' => result.push_str("\\r"),
            '\t' => result.push_str("\\t"),
            c if c.is_control() => result.push_str(&format!("\\u{:04x}", c as u32)),
            c => result.push(c),
        }
    }
    result
}
