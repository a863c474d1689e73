//! Format-wide constants.

/// First four bytes of every FEB file.
pub const MAGIC: u32 = 0xFEB7_2000;

pub const MAJOR_VERSION: u16 = 0x0000;
pub const MINOR_VERSION: u16 = 0x0001;

/// Binary name of the class every class implicitly inherits.
pub const ROOT_CLASS: &str = "zen/core/Object";

/// Descriptor placed on fields until declared types are tracked.
pub const FIELD_DESCRIPTOR_PLACEHOLDER: &str = "com/todo/Class";

/// Names of the attributes the virtual machine understands.
pub mod attribute_name {
    pub const INSTRUCTION: &str = "vm/primary/Instruction";
    pub const SOURCE_FILE: &str = "vm/SourceFile";
    pub const CONSTANT_VALUE: &str = "vm/ConstantValue";
    pub const EXCEPTIONS: &str = "vm/Exceptions";
    pub const LINE_NUMBER_TABLE: &str = "vm/LineNumberTable";
    pub const LOCAL_VARIABLE_TABLE: &str = "vm/LocalVariableTable";
    pub const SYNTHETIC: &str = "vm/Synthetic";
    pub const DEPRECATED: &str = "vm/Deprecated";
}

/// Field and function flag bits.
pub mod flags {
    /// Belongs to the entity rather than to an instance. Static functions
    /// have no `this` slot.
    pub const STATIC: u16 = 0x0008;
    /// Assigned once.
    pub const FINAL: u16 = 0x0010;
    /// Generated by the compiler.
    pub const SYNTHETIC: u16 = 0x1000;
}

/// Name of the synthetic function that runs field initializers after `new`.
pub const INITIALIZER: &str = "<initialize>";

/// Runtime class whose static `fromEntries` builds a map literal.
pub const MAP_CLASS: &str = "zen/core/Map";
pub const MAP_FROM_ENTRIES: &str = "fromEntries";
