use thiserror::Error;

use crate::class::Class;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Failed to allocate table storage for {0} entries")]
    Allocation(usize),

    #[error("Table for class {0} is full (at most 65535 entries)")]
    ClassTableFull(Class),

    #[error("Machine cannot hold more than 254 segments")]
    MachineFull,

    #[error("Re-defined symbol: `{0}`")]
    Redefined(String),
}
