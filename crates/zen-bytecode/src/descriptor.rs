//! Descriptor mini-language.
//!
//! ```text
//! function  := type ':' ( 'v' | type+ )
//! type      := 'z' | 'b' | 'c' | 's' | 'i' | 'l' | 'f' | 'd'
//!            | '(' binary-name ')'
//!            | '@' type
//! ```
//!
//! `@` marks an array of its operand. A variadic parameter is encoded as a
//! trailing array parameter.

use std::fmt;

use crate::constants::ROOT_CLASS;
use crate::error::DescriptorError;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    Boolean,
    Byte,
    Character,
    Short,
    Integer,
    Long,
    Float,
    Double,
    Class(String),
    Array(Box<TypeDescriptor>),
}

impl TypeDescriptor {
    pub fn object() -> Self {
        Self::Class(ROOT_CLASS.to_string())
    }

    pub fn array_of(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Boolean => f.write_str("z"),
            Self::Byte => f.write_str("b"),
            Self::Character => f.write_str("c"),
            Self::Short => f.write_str("s"),
            Self::Integer => f.write_str("i"),
            Self::Long => f.write_str("l"),
            Self::Float => f.write_str("f"),
            Self::Double => f.write_str("d"),
            Self::Class(name) => write!(f, "({name})"),
            Self::Array(element) => write!(f, "@{element}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionDescriptor {
    pub return_type: TypeDescriptor,
    pub parameters: Vec<TypeDescriptor>,
}

impl FunctionDescriptor {
    /// Descriptor of a dynamically typed function: every parameter and the
    /// return value are root objects, a variadic parameter is an object array.
    pub fn dynamic(fixed_parameters: usize, variadic: bool) -> Self {
        let mut parameters = vec![TypeDescriptor::object(); fixed_parameters];
        if variadic {
            parameters.push(TypeDescriptor::array_of(TypeDescriptor::object()));
        }
        Self {
            return_type: TypeDescriptor::object(),
            parameters,
        }
    }

    pub fn parameter_count(&self) -> usize {
        self.parameters.len()
    }

    pub fn parse(text: &str) -> Result<Self, DescriptorError> {
        let mut parser = Parser { text, pos: 0 };
        let return_type = parser.parse_type()?;
        if !parser.eat(':') {
            return Err(DescriptorError::MissingSeparator(text.to_string()));
        }
        if parser.rest() == "v" {
            return Ok(Self {
                return_type,
                parameters: Vec::new(),
            });
        }
        if parser.rest().is_empty() {
            return Err(DescriptorError::EmptyParameters(text.to_string()));
        }
        let mut parameters = Vec::new();
        while !parser.rest().is_empty() {
            parameters.push(parser.parse_type()?);
        }
        Ok(Self {
            return_type,
            parameters,
        })
    }
}

impl fmt::Display for FunctionDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:", self.return_type)?;
        if self.parameters.is_empty() {
            return f.write_str("v");
        }
        for parameter in &self.parameters {
            write!(f, "{parameter}")?;
        }
        Ok(())
    }
}

struct Parser<'a> {
    text: &'a str,
    pos: usize,
}

impl Parser<'_> {
    fn rest(&self) -> &str {
        &self.text[self.pos..]
    }

    fn eat(&mut self, c: char) -> bool {
        if self.rest().starts_with(c) {
            self.pos += c.len_utf8();
            return true;
        }
        false
    }

    fn parse_type(&mut self) -> Result<TypeDescriptor, DescriptorError> {
        let Some(c) = self.rest().chars().next() else {
            return Err(DescriptorError::Truncated(self.text.to_string()));
        };
        let position = self.pos;
        self.pos += c.len_utf8();
        Ok(match c {
            'z' => TypeDescriptor::Boolean,
            'b' => TypeDescriptor::Byte,
            'c' => TypeDescriptor::Character,
            's' => TypeDescriptor::Short,
            'i' => TypeDescriptor::Integer,
            'l' => TypeDescriptor::Long,
            'f' => TypeDescriptor::Float,
            'd' => TypeDescriptor::Double,
            '@' => TypeDescriptor::array_of(self.parse_type()?),
            '(' => {
                let Some(end) = self.rest().find(')') else {
                    return Err(DescriptorError::Truncated(self.text.to_string()));
                };
                let name = self.rest()[..end].to_string();
                self.pos += end + 1;
                TypeDescriptor::Class(name)
            }
            found => {
                return Err(DescriptorError::UnexpectedCharacter {
                    descriptor: self.text.to_string(),
                    found,
                    position,
                });
            }
        })
    }
}
