use std::{io::Write, path::PathBuf};

use avm_arch::{
    record::{Buffer, Number, Port, Register, RegisterMode, Str},
    Segment,
};

use crate::{
    compiler::Compiler,
    error::Error,
    op::{unquote, ParamKind},
    resolve::parse_number,
};

/// A failed source line.
#[derive(Debug)]
pub struct Diag {
    pub file: String,
    pub line: usize,
    pub raw: String,
    pub error: Error,
}

impl Diag {
    pub fn info(&self) -> (&str, usize, &str) {
        (&self.file, self.line, &self.raw)
    }
}

/// Compiles a whole source text into the compiler's segment.
///
/// Every failing line yields one diagnostic and compilation moves on to the
/// next line, except after an internal error, which ends the file.
pub fn compile_source<W: Write>(compiler: &mut Compiler<W>, file: &str, source: &str) -> Vec<Diag> {
    let mut diags = vec![];
    for (idx, raw) in source.lines().enumerate() {
        let line = idx + 1;
        if let Err(error) = compile_line(compiler, file, line, raw) {
            let internal = error.is_internal();
            diags.push(Diag {
                file: file.to_string(),
                line,
                raw: raw.to_string(),
                error,
            });
            if internal {
                break;
            }
        }
    }
    diags
}

/// Compiles one source line: an optional label, then a directive or an
/// instruction.
pub fn compile_line<W: Write>(
    compiler: &mut Compiler<W>,
    file: &str,
    line: usize,
    raw: &str,
) -> Result<(), Error> {
    let mut code = strip_comment(raw).trim();

    // main:
    let (head, rest) = split_word(code);
    if let Some(label) = head.strip_suffix(':') {
        if !is_ident(label) {
            return Err(Error::Syntax(format!("Invalid label name `{label}`")));
        }
        compiler.segment_mut().define_label(label)?;
        code = rest;
    }

    if code.is_empty() {
        return Ok(());
    }

    // .register r1 rw
    if let Some(directive) = code.strip_prefix('.') {
        return declare(compiler.segment_mut(), directive);
    }

    // JZ r1, loop
    let (token, rest) = split_word(code);
    let operands = split_operands(rest)?;
    compiler.start(token, file, line)?;
    for text in operands {
        if let Err(err) = compiler.param(ParamKind::classify(text), text) {
            compiler.abort();
            return Err(err);
        }
    }
    compiler.finish()
}

/// Declares a named record from a `.directive NAME ARGS` line.
pub fn declare(segment: &mut Segment, directive: &str) -> Result<(), Error> {
    let (kind, args) = split_word(directive);
    let (name, value) = split_word(args);
    let kind = kind.to_ascii_lowercase();
    if !matches!(
        kind.as_str(),
        "register" | "number" | "string" | "buffer" | "port"
    ) {
        return Err(Error::UnknownDirective(kind));
    }

    let need = |what: &str| Error::Directive(kind.clone(), what.to_string());
    if !is_ident(name) {
        return Err(need("a name"));
    }

    match kind.as_str() {
        "register" => {
            let mode = match value {
                "" => RegisterMode::RW,
                mode => RegisterMode::parse(mode).ok_or_else(|| need("a mode of r, w or rw"))?,
            };
            segment.define(Register::new(name, mode))?;
        }
        "number" => {
            if value.is_empty() {
                return Err(need("a value"));
            }
            segment.define(Number::new(name, 64, parse_number(value)?))?;
        }
        "string" => {
            if ParamKind::classify(value) != ParamKind::Text || !value.ends_with('"') {
                return Err(need("a quoted text"));
            }
            segment.define(Str::new(name, unquote(value)))?;
        }
        "buffer" => {
            let capacity = u32::try_from(parse_number(value)?).map_err(|_| need("a capacity"))?;
            segment.define(Buffer::new(name, capacity))?;
        }
        _ => {
            if value.is_empty() {
                return Err(need("a path"));
            }
            segment.define(Port::new(name, Some(PathBuf::from(value))))?;
        }
    }
    Ok(())
}

/// Cuts a `;` comment that is not inside a string literal.
fn strip_comment(raw: &str) -> &str {
    let mut quoted = false;
    for (i, c) in raw.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ';' if !quoted => return &raw[..i],
            _ => {}
        }
    }
    raw
}

/// First whitespace-delimited word and the trimmed remainder.
fn split_word(code: &str) -> (&str, &str) {
    let code = code.trim();
    match code.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest.trim()),
        None => (code, ""),
    }
}

/// Comma-separated operands; commas inside string literals do not split.
fn split_operands(rest: &str) -> Result<Vec<&str>, Error> {
    let rest = rest.trim();
    if rest.is_empty() {
        return Ok(vec![]);
    }

    let mut operands = vec![];
    let mut quoted = false;
    let mut begin = 0;
    for (i, c) in rest.char_indices() {
        match c {
            '"' => quoted = !quoted,
            ',' if !quoted => {
                operands.push(rest[begin..i].trim());
                begin = i + 1;
            }
            _ => {}
        }
    }
    if quoted {
        return Err(Error::Syntax("Unterminated string literal".to_string()));
    }
    operands.push(rest[begin..].trim());

    if operands.iter().any(|operand| operand.is_empty()) {
        return Err(Error::Syntax("Empty operand".to_string()));
    }
    Ok(operands)
}

fn is_ident(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {
            chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        }
        _ => false,
    }
}
