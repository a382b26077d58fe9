use std::{io, path::PathBuf};

use bitflags::bitflags;

use crate::{class::Class, entity::Entity, segment::Tables, table::Table};

/// Longest symbolic name a record keeps; longer names are cut.
pub const NAME_MAX: usize = 63;

/// Common header of every record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    pub name: String,
}

impl Header {
    pub fn new(name: &str) -> Self {
        Header {
            name: bounded(name).to_string(),
        }
    }
}

/// `name` cut to at most [`NAME_MAX`] characters.
pub fn bounded(name: &str) -> &str {
    match name.char_indices().nth(NAME_MAX) {
        Some((end, _)) => &name[..end],
        None => name,
    }
}

/// A record stored in one of the per-class tables of a segment.
pub trait Record: Sized {
    const CLASS: Class;

    fn header(&self) -> &Header;

    fn pool(tables: &Tables) -> &Table<Self>;

    fn pool_mut(tables: &mut Tables) -> &mut Table<Self>;

    fn name(&self) -> &str {
        &self.header().name
    }
}

macro_rules! record {
    ($($ty:ident => $class:ident, $pool:ident;)*) => {
        $(
            impl Record for $ty {
                const CLASS: Class = Class::$class;

                fn header(&self) -> &Header {
                    &self.header
                }

                fn pool(tables: &Tables) -> &Table<Self> {
                    &tables.$pool
                }

                fn pool_mut(tables: &mut Tables) -> &mut Table<Self> {
                    &mut tables.$pool
                }
            }
        )*
    };
}

record! {
    Fault => Error, faults;
    Group => Group, groups;
    Register => Register, registers;
    Buffer => Buffer, buffers;
    Port => Port, ports;
    Str => String, strings;
    Label => Label, labels;
    Process => Process, processes;
    Number => Number, numbers;
    Unresolved => Unresolved, unresolved;
}

// ----------------------------------------------------------------------------
// Error handler

#[derive(Debug, Clone)]
pub struct Fault {
    pub header: Header,
    /// Segment holding the handler
    pub segment: Entity,
    /// Label to jump to
    pub label: Entity,
}

impl Fault {
    pub fn new(name: &str, segment: Entity, label: Entity) -> Self {
        Fault {
            header: Header::new(name),
            segment,
            label,
        }
    }
}

// ----------------------------------------------------------------------------
// Group

#[derive(Debug, Clone)]
pub struct Group {
    pub header: Header,
    pub members: Table<Entity>,
}

impl Group {
    pub fn new(name: &str) -> Self {
        Group {
            header: Header::new(name),
            members: Table::new(8),
        }
    }
}

// ----------------------------------------------------------------------------
// Register

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct RegisterMode: u8 {
        const READ = 0x01;
        const WRITE = 0x02;
        const RW = Self::READ.bits() | Self::WRITE.bits();
    }
}

impl RegisterMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "r" => Some(RegisterMode::READ),
            "w" => Some(RegisterMode::WRITE),
            "rw" => Some(RegisterMode::RW),
            _ => None,
        }
    }
}

pub type RegisterReset = fn(&mut Register);
pub type RegisterGet = fn(&Register) -> u32;
pub type RegisterSet = fn(&mut Register, u32) -> u32;

/// A register of (nearly) arbitrary width.
///
/// Special registers differ only in their behavior hooks, not in class.
#[derive(Debug, Clone)]
pub struct Register {
    pub header: Header,
    pub mode: RegisterMode,
    pub private: isize,
    pub reset: Option<RegisterReset>,
    pub get: Option<RegisterGet>,
    pub set: Option<RegisterSet>,
}

impl Register {
    pub fn new(name: &str, mode: RegisterMode) -> Self {
        Register {
            header: Header::new(name),
            mode,
            private: 0,
            reset: None,
            get: None,
            set: None,
        }
    }

    pub fn with_behavior(
        mut self,
        reset: Option<RegisterReset>,
        get: Option<RegisterGet>,
        set: Option<RegisterSet>,
    ) -> Self {
        self.reset = reset;
        self.get = get;
        self.set = set;
        self
    }

    /// Reads through the getter; `None` for write-only or hook-less registers.
    pub fn read(&self) -> Option<u32> {
        match self.mode.contains(RegisterMode::READ) {
            true => self.get.map(|get| get(self)),
            false => None,
        }
    }

    pub fn write(&mut self, value: u32) -> Option<u32> {
        match self.mode.contains(RegisterMode::WRITE) {
            true => self.set.map(|set| set(self, value)),
            false => None,
        }
    }
}

// ----------------------------------------------------------------------------
// Buffer

/// A seekable memory buffer.
#[derive(Debug, Clone)]
pub struct Buffer {
    pub header: Header,
    pub data: Vec<u8>,
    pub capacity: u32,
    pub size: u32,
    pub cursor: u32,
}

impl Buffer {
    pub fn new(name: &str, capacity: u32) -> Self {
        Buffer {
            header: Header::new(name),
            data: Vec::new(),
            capacity,
            size: 0,
            cursor: 0,
        }
    }
}

// ----------------------------------------------------------------------------
// Port

pub type PortReset = fn(&mut Port) -> io::Result<()>;
pub type PortRead = fn(&mut Port, &mut [u8]) -> io::Result<usize>;
pub type PortWrite = fn(&mut Port, &[u8]) -> io::Result<usize>;

/// An I/O port (file, socket, ...).
#[derive(Debug, Clone)]
pub struct Port {
    pub header: Header,
    pub path: Option<PathBuf>,
    pub fd: Option<i32>,
    pub reset: Option<PortReset>,
    pub read: Option<PortRead>,
    pub write: Option<PortWrite>,
}

impl Port {
    pub fn new(name: &str, path: Option<PathBuf>) -> Self {
        Port {
            header: Header::new(name),
            path,
            fd: None,
            reset: None,
            read: None,
            write: None,
        }
    }
}

// ----------------------------------------------------------------------------
// String

#[derive(Debug, Clone)]
pub struct Str {
    pub header: Header,
    pub text: String,
    pub capacity: u32,
}

impl Str {
    pub fn new(name: &str, text: &str) -> Self {
        Str {
            header: Header::new(name),
            text: text.to_string(),
            capacity: text.len() as u32,
        }
    }
}

// ----------------------------------------------------------------------------
// Label

/// A named code location.
#[derive(Debug, Clone)]
pub struct Label {
    pub header: Header,
    pub segment: u8,
    pub offset: u32,
}

impl Label {
    pub fn new(name: &str, segment: u8, offset: u32) -> Self {
        Label {
            header: Header::new(name),
            segment,
            offset,
        }
    }
}

// ----------------------------------------------------------------------------
// Process

#[derive(Debug, Clone)]
pub struct Process {
    pub header: Header,
    pub registers: Table<Entity>,
    pub stack: Table<Entity>,
}

impl Process {
    pub fn new(name: &str) -> Self {
        Process {
            header: Header::new(name),
            registers: Table::new(16),
            stack: Table::new(32),
        }
    }
}

// ----------------------------------------------------------------------------
// Number

#[derive(Debug, Clone)]
pub struct Number {
    pub header: Header,
    pub bitwidth: u32,
    pub value: i64,
}

impl Number {
    /// An empty `name` makes an anonymous constant.
    pub fn new(name: &str, bitwidth: u32, value: i64) -> Self {
        Number {
            header: Header::new(name),
            bitwidth,
            value,
        }
    }
}

// ----------------------------------------------------------------------------
// Unresolved

/// Placeholder for a name the linker has to settle.
#[derive(Debug, Clone)]
pub struct Unresolved {
    pub header: Header,
}

impl Unresolved {
    pub fn new(name: &str) -> Self {
        Unresolved {
            header: Header::new(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_names_are_truncated() {
        let long = "x".repeat(100);
        assert_eq!(Header::new(&long).name.len(), NAME_MAX);
        assert_eq!(Header::new("r1").name, "r1");
    }

    #[test]
    fn register_behavior() {
        fn get(reg: &Register) -> u32 {
            reg.private as u32
        }
        fn set(reg: &mut Register, value: u32) -> u32 {
            reg.private = value as isize;
            value
        }

        let mut reg = Register::new("acc", RegisterMode::RW).with_behavior(None, Some(get), Some(set));
        assert_eq!(reg.write(5), Some(5));
        assert_eq!(reg.read(), Some(5));

        let mut ro = Register::new("pc", RegisterMode::READ).with_behavior(None, Some(get), Some(set));
        assert_eq!(ro.write(1), None);
        assert_eq!(ro.read(), Some(0));
    }

    #[test]
    fn register_mode_parse() {
        assert_eq!(RegisterMode::parse("RW"), Some(RegisterMode::RW));
        assert_eq!(RegisterMode::parse("r"), Some(RegisterMode::READ));
        assert_eq!(RegisterMode::parse("x"), None);
    }
}
