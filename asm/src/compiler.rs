use std::io::Write;

use avm_arch::Segment;
use once_cell::sync::Lazy;

use crate::{
    error::Error,
    op::{Op, ParamKind},
    opdef::{Registry, REGISTRY},
};

/// Compilation context for one segment.
///
/// The parser drives it with `start`, zero or more `param` calls, then
/// `finish`, once per instruction and in source order. At most one
/// instruction is in flight; the context owns it, so there is no global
/// "current op".
pub struct Compiler<W: Write> {
    registry: &'static Registry,
    segment: Segment,
    current: Option<Op>,
    trace: W,
}

impl<W: Write> Compiler<W> {
    /// `trace` receives one line per opcode and per operand.
    pub fn new(segment: Segment, trace: W) -> Self {
        Compiler {
            registry: Lazy::force(&REGISTRY),
            segment,
            current: None,
            trace,
        }
    }

    /// Begins an instruction or alias line.
    pub fn start(&mut self, token: &str, file: &str, line: usize) -> Result<(), Error> {
        if let Some(op) = &self.current {
            return Err(Error::InProgress(
                op.def.token.to_string(),
                op.file.clone(),
                op.line,
            ));
        }

        let def = self
            .registry
            .lookup(token)
            .ok_or_else(|| Error::UnsupportedOpcode(token.to_string()))?;
        let op = Op::new(def, file, line)?;

        // Aliases render a different token into the code than the source shows.
        let traced = match token == def.token {
            true => writeln!(self.trace, "OP: {}", def.token),
            false => writeln!(self.trace, "OP: {} ({})", token, def.token),
        };
        traced.map_err(Error::Trace)?;

        self.current = Some(op);
        Ok(())
    }

    /// Adds the next operand of the in-flight instruction.
    pub fn param(&mut self, kind: ParamKind, text: &str) -> Result<(), Error> {
        let op = self.current.as_mut().ok_or(Error::NoInstruction)?;
        writeln!(self.trace, "   param: {}", text).map_err(Error::Trace)?;
        op.push(kind, text)
    }

    /// Validates the in-flight instruction and appends it to the code stream.
    pub fn finish(&mut self) -> Result<(), Error> {
        let mut op = self.current.take().ok_or(Error::NoInstruction)?;
        (op.def.compile)(&mut self.segment, &mut op)
    }

    /// Drops the in-flight instruction without compiling it.
    pub fn abort(&mut self) -> Option<Op> {
        self.current.take()
    }

    pub fn in_flight(&self) -> Option<&Op> {
        self.current.as_ref()
    }

    pub fn segment(&self) -> &Segment {
        &self.segment
    }

    pub fn segment_mut(&mut self) -> &mut Segment {
        &mut self.segment
    }

    pub fn trace(&self) -> &W {
        &self.trace
    }

    pub fn into_segment(self) -> Segment {
        self.segment
    }
}
