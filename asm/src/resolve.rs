use avm_arch::{
    record::{Number, Str, Unresolved},
    Entity, Segment,
};

use crate::{
    error::Error,
    op::{unquote, Op, Param, ParamKind},
};

/// Resolves every operand of `op` against the segment.
pub fn resolve(segment: &mut Segment, op: &mut Op) -> Result<(), Error> {
    for param in op.params.iter_mut() {
        param.entity = Some(resolve_param(segment, param)?);
    }
    Ok(())
}

/// Maps one operand to an entity.
///
/// A name already in the symbol table reuses that entity. An unknown name
/// gets an unresolved placeholder, registered under the name so the next
/// use finds it; the linker settles it later.
pub fn resolve_param(segment: &mut Segment, param: &Param) -> Result<Entity, Error> {
    match param.kind {
        ParamKind::Ident => match segment.lookup(&param.text) {
            Some(entity) => Ok(entity),
            None => {
                let entity = segment.insert(Unresolved::new(&param.text))?;
                segment.bind(&param.text, entity)?;
                Ok(entity)
            }
        },
        ParamKind::Number => {
            let value = parse_number(&param.text)?;
            match Entity::immediate(value) {
                Some(entity) => Ok(entity),
                None => Ok(segment.insert(Number::new("", 64, value))?),
            }
        }
        ParamKind::Text => Ok(segment.insert(Str::new("", unquote(&param.text)))?),
    }
}

/// Parses a signed integer with an optional `0x`, `0o` or `0b` prefix.
pub fn parse_number(s: &str) -> Result<i64, Error> {
    let err = || Error::BadNumber(s.to_string());
    let (negative, body) = match s.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, s.strip_prefix('+').unwrap_or(s)),
    };
    let (radix, digits) = match body.get(..2) {
        Some("0x" | "0X") => (16, &body[2..]),
        Some("0o" | "0O") => (8, &body[2..]),
        Some("0b" | "0B") => (2, &body[2..]),
        _ => (10, body),
    };
    if digits.starts_with(['+', '-']) {
        return Err(err());
    }
    let value = i64::from_str_radix(digits, radix).map_err(|_| err())?;
    Ok(if negative { -value } else { value })
}
