use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    // Compile errors: reported, compilation goes on
    #[error("Instruction \"{0}\" is not a supported opcode or alias")]
    UnsupportedOpcode(String),

    #[error("Syntax: {0}")]
    Syntax(String),

    #[error("{0}: Reference \"{1}\" is not a numeric object")]
    NotNumeric(String, String),

    #[error("{0}: Target \"{1}\" is not a valid LABEL")]
    NotLabel(String, String),

    #[error("{0}: more than {1} operands")]
    TooManyParams(String, usize),

    #[error("Cannot parse `{0}` as a number")]
    BadNumber(String),

    #[error("Unknown directive: `{0}`")]
    UnknownDirective(String),

    #[error("Directive `{0}` requires {1}")]
    Directive(String, String),

    #[error(transparent)]
    Define(avm_arch::Error),

    // Internal errors: fatal to the compile unit
    #[error("Internal corruption: no instruction processing in progress")]
    NoInstruction,

    #[error("Internal corruption: instruction \"{0}\" from {1}:{2} is still in progress")]
    InProgress(String, String, usize),

    #[error("Failed to generate instruction for \"{0}\" op")]
    OpAllocation(String),

    #[error("Internal error: {0}")]
    Table(avm_arch::Error),

    #[error("Failed to write trace: {0}")]
    Trace(#[source] std::io::Error),

    // Driver errors
    #[error("Failed to open file: {0}")]
    FileOpen(String, #[source] std::io::Error),

    #[error("Failed to create file: {0}")]
    FileCreate(String, #[source] std::io::Error),

    #[error("Failed to write file: {0}")]
    FileWrite(String, #[source] std::io::Error),

    #[error("Failed to render symbol map: {0}")]
    SymbolMap(#[from] serde_yaml::Error),
}

impl Error {
    /// Internal errors end the current compile unit; others are recoverable.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            Error::NoInstruction
                | Error::InProgress(..)
                | Error::OpAllocation(_)
                | Error::Table(_)
                | Error::Trace(_)
        )
    }
}

impl From<avm_arch::Error> for Error {
    fn from(err: avm_arch::Error) -> Self {
        match err {
            avm_arch::Error::Redefined(_) => Error::Define(err),
            _ => Error::Table(err),
        }
    }
}
