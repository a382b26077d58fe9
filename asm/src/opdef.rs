use avm_arch::{Entity, Opcode, Segment};
use indexmap::IndexMap;
use once_cell::sync::Lazy;

use crate::{error::Error, jumps, op::Op, resolve::resolve};

/// Validates an in-flight op and encodes it into the segment.
pub type CompileFn = fn(&mut Segment, &mut Op) -> Result<(), Error>;

/// Immutable description of one opcode.
#[derive(Debug)]
pub struct Opdef {
    /// Canonical token
    pub token: &'static str,
    pub opcode: Opcode,
    /// Minimum number of operands
    pub argc: usize,
    pub compile: CompileFn,
}

static OPDEFS: [Opdef; 4] = [
    Opdef {
        token: "NOP",
        opcode: Opcode::Nop,
        argc: 0,
        compile: compile_default,
    },
    Opdef {
        token: "JZ",
        opcode: Opcode::Jz,
        argc: 2,
        compile: jumps::compile_jz,
    },
    Opdef {
        token: "JNZ",
        opcode: Opcode::Jnz,
        argc: 2,
        compile: jumps::compile_jnz,
    },
    Opdef {
        token: "JMP",
        opcode: Opcode::Goto,
        argc: 1,
        compile: jumps::compile_jmp,
    },
];

// (alias, canonical)
static ALIASES: [(&str, &str); 2] = [("GOTO", "JMP"), ("JUMP", "JMP")];

pub static REGISTRY: Lazy<Registry> = Lazy::new(Registry::init);

/// Token → opdef map, aliases included. Read-only once built.
pub struct Registry {
    defs: IndexMap<&'static str, &'static Opdef>,
}

impl Registry {
    fn init() -> Self {
        let mut defs: IndexMap<&'static str, &'static Opdef> = IndexMap::new();
        for def in &OPDEFS {
            defs.insert(def.token, def);
        }
        for (alias, canonical) in ALIASES {
            if let Some(def) = defs.get(canonical).copied() {
                defs.insert(alias, def);
            }
        }
        Registry { defs }
    }

    /// Case-insensitive lookup of an opcode or alias token.
    pub fn lookup(&self, token: &str) -> Option<&'static Opdef> {
        self.defs.get(token.to_ascii_uppercase().as_str()).copied()
    }

    pub fn tokens(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.defs.keys().copied()
    }
}

/// Appends the instruction word followed by every resolved operand.
pub(crate) fn emit(segment: &mut Segment, opcode: Opcode, op: &Op) -> Result<(), Error> {
    segment.emit(Entity::instruction(opcode, 0, op.len() as u8))?;
    for entity in op.entities() {
        segment.emit(entity)?;
    }
    Ok(())
}

/// Generic routine: minimum operand count, resolution, no class checks.
pub fn compile_default(segment: &mut Segment, op: &mut Op) -> Result<(), Error> {
    let def = op.def;
    if op.len() < def.argc {
        return Err(Error::Syntax(format!(
            "{} requires at least {} operand(s)",
            def.token, def.argc
        )));
    }
    resolve(segment, op)?;
    emit(segment, def.opcode, op)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_canonical_and_alias() {
        let jz = REGISTRY.lookup("JZ").unwrap();
        assert_eq!(jz.opcode, Opcode::Jz);
        assert_eq!(jz.argc, 2);

        let goto = REGISTRY.lookup("goto").unwrap();
        assert_eq!(goto.token, "JMP");
        assert_eq!(goto.opcode, Opcode::Goto);
        assert!(std::ptr::eq(goto, REGISTRY.lookup("JMP").unwrap()));

        assert!(REGISTRY.lookup("MUL").is_none());
    }

    #[test]
    fn every_token_resolves() {
        for token in REGISTRY.tokens() {
            assert!(REGISTRY.lookup(token).is_some(), "{token}");
        }
    }
}
