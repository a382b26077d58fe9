use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Default,
    FromPrimitive,
    IntoPrimitive,
    EnumString,
    Display,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Opcode {
    // Runtime
    Nop = 0x00,
    Stor = 0x01,
    Ins = 0x02,
    Goto = 0x03,
    Jz = 0x04,
    Je = 0x05,
    Jnz = 0x06,
    Fork = 0x07,
    Kill = 0x08,
    Push = 0x09,
    Pop = 0x0A,
    Label = 0x0B,

    Add = 0x0C,
    Sub = 0x0D,
    Mul = 0x0E,
    Div = 0x0F,
    Pow = 0x10,
    Or = 0x11,
    And = 0x12,
    Cmp = 0x13,
    Inc = 0x14,
    Dec = 0x15,

    File = 0x16,
    In = 0x17,
    Out = 0x18,

    // Compiler and linker directives
    Def = 0xA0,
    Size = 0xA1,

    #[default]
    Invalid = 0xFF,
}

impl Opcode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.parse::<Self>() {
            Ok(op) => Ok(op),
            Err(_) => Err(format!("Undefined opcode: {s}")),
        }
    }
}

#[test]
fn test() {
    assert_eq!(Opcode::parse("goto"), Ok(Opcode::Goto));
    assert_eq!(Opcode::from(0x06), Opcode::Jnz);
    assert_eq!(Opcode::from(0x42), Opcode::Invalid);
    assert!(Opcode::parse("hoge").is_err());
}
