//! Machine model of the AVM: class tags, opcodes, the 32-bit entity
//! encoding, per-class records and the tables that own them.

pub mod class;
pub mod entity;
pub mod error;
pub mod opcode;
pub mod record;
pub mod segment;
pub mod table;

pub use class::Class;
pub use entity::Entity;
pub use error::Error;
pub use opcode::Opcode;
pub use segment::{Machine, Segment};
pub use table::Table;
