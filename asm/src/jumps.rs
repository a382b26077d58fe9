//! Compile routines for the jump family.
//!
//! Each routine checks the operand count, resolves the operands, checks
//! their classes and only then appends to the code stream, so a failing
//! instruction leaves the segment's code untouched. UNRESOLVED always
//! passes the class checks; whether the name really is a label or a number
//! is the linker's call.

use avm_arch::{Class, Opcode, Segment};

use crate::{error::Error, op::Op, opdef::emit, resolve::resolve};

const NUMERIC: &[Class] = &[
    Class::Number,
    Class::Immediate,
    Class::Register,
    Class::Unresolved,
];

const TARGET: &[Class] = &[Class::Label, Class::Unresolved];

/// `JZ value, label`: jump when `value` is zero.
pub fn compile_jz(segment: &mut Segment, op: &mut Op) -> Result<(), Error> {
    compile_conditional(segment, op, Opcode::Jz)
}

/// `JNZ value, label`: jump when `value` is not zero.
pub fn compile_jnz(segment: &mut Segment, op: &mut Op) -> Result<(), Error> {
    compile_conditional(segment, op, Opcode::Jnz)
}

/// `JMP label`: unconditional jump, encoded as GOTO.
pub fn compile_jmp(segment: &mut Segment, op: &mut Op) -> Result<(), Error> {
    let name = op.def.token;
    if op.len() != 1 {
        return Err(Error::Syntax(format!("{name} requires a single target label")));
    }

    resolve(segment, op)?;

    let target = &op.params[0];
    if !target.entity().assert_class(TARGET) {
        return Err(Error::NotLabel(name.to_string(), target.text.clone()));
    }

    emit(segment, Opcode::Goto, op)
}

fn compile_conditional(segment: &mut Segment, op: &mut Op, opcode: Opcode) -> Result<(), Error> {
    let name = op.def.token;
    if op.len() != 2 {
        return Err(Error::Syntax(format!(
            "{name} requires a numeric object and a target label"
        )));
    }

    resolve(segment, op)?;

    let value = &op.params[0];
    if !value.entity().assert_class(NUMERIC) {
        return Err(Error::NotNumeric(name.to_string(), value.text.clone()));
    }
    let target = &op.params[1];
    if !target.entity().assert_class(TARGET) {
        return Err(Error::NotLabel(name.to_string(), target.text.clone()));
    }

    emit(segment, opcode, op)
}
