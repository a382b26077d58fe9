//! Compiler core for the AVM assembly dialect.
//!
//! A source file is compiled line by line into a [`Segment`]: the
//! [`parser`] feeds each instruction to a [`Compiler`], which looks the
//! opcode up in the registry, collects operands and hands the finished op
//! to that opcode's compile routine.
//!
//! [`Segment`]: avm_arch::Segment

pub mod compiler;
pub mod error;
pub mod jumps;
pub mod msg;
pub mod object;
pub mod op;
pub mod opdef;
pub mod parser;
pub mod resolve;
pub mod symbols;
pub mod util;

pub use compiler::Compiler;
pub use error::Error;
pub use op::{Op, Param, ParamKind};
pub use opdef::{Opdef, Registry, REGISTRY};
pub use parser::{compile_source, Diag};
pub use symbols::SymbolMap;
