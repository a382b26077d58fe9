use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// Class tag carried in the top 8 bits of every entity.
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
    EnumIter,
    Display,
)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
#[serde(rename_all = "UPPERCASE")]
#[repr(u8)]
pub enum Class {
    Instruction = 0x00,
    Error = 0x01,
    Group = 0x02,
    Register = 0x03,
    Buffer = 0x04,
    Port = 0x05,
    String = 0x06,
    Label = 0x07,
    Process = 0x08,
    Number = 0x09,
    Immediate = 0x0A,
    Segment = 0x0B,
    Unresolved = 0x0C,
    #[default]
    Reserved = 0xFF,
}

impl Class {
    /// Classes whose payload is an index into a per-class table.
    pub fn is_indexed(self) -> bool {
        !matches!(
            self,
            Class::Instruction | Class::Immediate | Class::Reserved
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_tags_are_reserved() {
        assert_eq!(Class::from(0x0D), Class::Reserved);
        assert_eq!(Class::from(0x7F), Class::Reserved);
        assert_eq!(Class::from(0x03), Class::Register);
    }

    #[test]
    fn parse_and_display() {
        assert_eq!("label".parse::<Class>(), Ok(Class::Label));
        assert_eq!(Class::Unresolved.to_string(), "UNRESOLVED");
    }
}
