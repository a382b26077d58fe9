use std::fmt;

use crate::{class::Class, opcode::Opcode};

/// Largest magnitude an immediate can carry.
pub const IMMEDIATE_MAX: i64 = 0xFFFFF;

const IMMEDIATE_SIGN: u32 = 1 << 20;
const INDEX_MASK: u32 = 0xFFFF;

/// A 32-bit tagged reference to anything the machine can see.
///
/// The top 8 bits hold the [`Class`]. What the other 24 bits mean depends on
/// the class:
///
/// | class         | payload                                        |
/// |---------------|------------------------------------------------|
/// | `INSTRUCTION` | opcode (23-16), flags (15-8), argc (7-0)       |
/// | `IMMEDIATE`   | sign (20), magnitude (19-0)                    |
/// | others        | index into the class table (15-0)              |
///
/// Indexed entities do not own anything: they only make sense next to the
/// segment whose tables they index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Entity(u32);

impl Entity {
    pub const INVALID: Entity = Entity(0xFFFF_FFFF);

    pub fn instruction(opcode: Opcode, flags: u8, argc: u8) -> Entity {
        let opcode: u8 = opcode.into();
        Entity(
            (u32::from(u8::from(Class::Instruction)) << 24)
                | (u32::from(opcode) << 16)
                | (u32::from(flags) << 8)
                | u32::from(argc),
        )
    }

    /// Signed-magnitude immediate. `None` when `|value|` does not fit in 20 bits.
    pub fn immediate(value: i64) -> Option<Entity> {
        let magnitude = value.checked_abs()?;
        if magnitude > IMMEDIATE_MAX {
            return None;
        }
        let mut code = u32::from(u8::from(Class::Immediate)) << 24;
        if value < 0 {
            code |= IMMEDIATE_SIGN;
        }
        Some(Entity(code | magnitude as u32))
    }

    /// Generic indirect reference. The index is masked to 16 bits.
    pub fn new(class: Class, index: usize) -> Entity {
        Entity((u32::from(u8::from(class)) << 24) | (index as u32 & INDEX_MASK))
    }

    pub fn from_bits(bits: u32) -> Entity {
        Entity(bits)
    }

    pub fn bits(self) -> u32 {
        self.0
    }

    pub fn class(self) -> Class {
        Class::from((self.0 >> 24) as u8)
    }

    /// True iff the entity's class is one of `candidates`.
    pub fn assert_class(self, candidates: &[Class]) -> bool {
        candidates.contains(&self.class())
    }

    pub fn is_valid(self) -> bool {
        self.class() != Class::Reserved
    }

    pub fn opcode(self) -> Option<Opcode> {
        match self.class() {
            Class::Instruction => Some(Opcode::from((self.0 >> 16) as u8)),
            _ => None,
        }
    }

    pub fn flags(self) -> Option<u8> {
        match self.class() {
            Class::Instruction => Some((self.0 >> 8) as u8),
            _ => None,
        }
    }

    pub fn argc(self) -> Option<u8> {
        match self.class() {
            Class::Instruction => Some(self.0 as u8),
            _ => None,
        }
    }

    pub fn index(self) -> Option<usize> {
        match self.class().is_indexed() {
            true => Some((self.0 & INDEX_MASK) as usize),
            false => None,
        }
    }

    pub fn immediate_value(self) -> Option<i64> {
        if self.class() != Class::Immediate {
            return None;
        }
        let magnitude = i64::from(self.0 & IMMEDIATE_MAX as u32);
        match self.0 & IMMEDIATE_SIGN {
            0 => Some(magnitude),
            _ => Some(-magnitude),
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08X}", self.0)
    }
}
