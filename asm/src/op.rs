use avm_arch::Entity;

use crate::{error::Error, opdef::Opdef};

/// Most operands a single instruction may carry.
pub const MAX_PARAMS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// A symbol name
    Ident,
    /// A numeric literal
    Number,
    /// A quoted string literal
    Text,
}

impl ParamKind {
    pub fn classify(text: &str) -> ParamKind {
        match text.chars().next() {
            Some('"') => ParamKind::Text,
            Some(c) if c.is_ascii_digit() || c == '-' || c == '+' => ParamKind::Number,
            _ => ParamKind::Ident,
        }
    }
}

/// Strips the surrounding quotes of a string literal, if any.
pub fn unquote(text: &str) -> &str {
    text.strip_prefix('"')
        .and_then(|t| t.strip_suffix('"'))
        .unwrap_or(text)
}

/// One operand: its source text and, once resolved, its entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub kind: ParamKind,
    pub text: String,
    pub entity: Option<Entity>,
}

impl Param {
    pub fn entity(&self) -> Entity {
        self.entity.unwrap_or(Entity::INVALID)
    }
}

/// The instruction currently being compiled.
#[derive(Debug)]
pub struct Op {
    pub def: &'static Opdef,
    pub file: String,
    pub line: usize,
    pub params: Vec<Param>,
}

impl Op {
    pub fn new(def: &'static Opdef, file: &str, line: usize) -> Result<Op, Error> {
        let mut params = Vec::new();
        params
            .try_reserve(def.argc)
            .map_err(|_| Error::OpAllocation(def.token.to_string()))?;
        Ok(Op {
            def,
            file: file.to_string(),
            line,
            params,
        })
    }

    /// Appends an operand. Position matters, so order is kept.
    pub fn push(&mut self, kind: ParamKind, text: &str) -> Result<(), Error> {
        if self.params.len() >= MAX_PARAMS {
            return Err(Error::TooManyParams(self.def.token.to_string(), MAX_PARAMS));
        }
        self.params.push(Param {
            kind,
            text: text.to_string(),
            entity: None,
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.params.iter().map(Param::entity)
    }
}
