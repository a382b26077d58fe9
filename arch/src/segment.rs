use std::cmp::Ordering;

use crate::{
    class::Class,
    entity::Entity,
    error::Error,
    record::{
        bounded, Buffer, Fault, Group, Header, Label, Number, Port, Process, Record, Register, Str,
        Unresolved,
    },
    table::Table,
};

/// Segment id of the machine itself (globals).
pub const SEGMENT_GLOBAL: u8 = 0;
/// Segment id of a segment not yet placed in a machine.
pub const SEGMENT_UNLINKED: u8 = 0xFF;

const CODE_CAPACITY: usize = 1024;
const POOL_CAPACITY: usize = 8;
const SYMBOL_CAPACITY: usize = 32;
/// Most live entries a class table may hold.
const CLASS_TABLE_MAX: usize = 0xFFFF;

// ----------------------------------------------------------------------------
// Table of tables

/// One table per class. `code` is the flat instruction word stream.
#[derive(Debug, Clone)]
pub struct Tables {
    pub code: Table<Entity>,
    pub faults: Table<Fault>,
    pub groups: Table<Group>,
    pub registers: Table<Register>,
    pub buffers: Table<Buffer>,
    pub ports: Table<Port>,
    pub strings: Table<Str>,
    pub labels: Table<Label>,
    pub processes: Table<Process>,
    pub numbers: Table<Number>,
    pub unresolved: Table<Unresolved>,
}

impl Tables {
    pub fn new() -> Self {
        Tables {
            code: Table::new(CODE_CAPACITY),
            faults: Table::new(POOL_CAPACITY),
            groups: Table::new(POOL_CAPACITY),
            registers: Table::new(POOL_CAPACITY),
            buffers: Table::new(POOL_CAPACITY),
            ports: Table::new(POOL_CAPACITY),
            strings: Table::new(POOL_CAPACITY),
            labels: Table::new(POOL_CAPACITY),
            processes: Table::new(POOL_CAPACITY),
            numbers: Table::new(POOL_CAPACITY),
            unresolved: Table::new(POOL_CAPACITY),
        }
    }

    /// Number of entries held for `class`. Classes without a table report 0.
    pub fn len(&self, class: Class) -> usize {
        match class {
            Class::Instruction => self.code.len(),
            Class::Error => self.faults.len(),
            Class::Group => self.groups.len(),
            Class::Register => self.registers.len(),
            Class::Buffer => self.buffers.len(),
            Class::Port => self.ports.len(),
            Class::String => self.strings.len(),
            Class::Label => self.labels.len(),
            Class::Process => self.processes.len(),
            Class::Number => self.numbers.len(),
            Class::Unresolved => self.unresolved.len(),
            Class::Immediate | Class::Segment | Class::Reserved => 0,
        }
    }

    /// Symbolic name of the record `entity` points at.
    pub fn name(&self, entity: Entity) -> Option<&str> {
        let index = entity.index()?;
        match entity.class() {
            Class::Error => self.faults.get(index).map(Record::name),
            Class::Group => self.groups.get(index).map(Record::name),
            Class::Register => self.registers.get(index).map(Record::name),
            Class::Buffer => self.buffers.get(index).map(Record::name),
            Class::Port => self.ports.get(index).map(Record::name),
            Class::String => self.strings.get(index).map(Record::name),
            Class::Label => self.labels.get(index).map(Record::name),
            Class::Process => self.processes.get(index).map(Record::name),
            Class::Number => self.numbers.get(index).map(Record::name),
            Class::Unresolved => self.unresolved.get(index).map(Record::name),
            _ => None,
        }
    }
}

impl Default for Tables {
    fn default() -> Self {
        Tables::new()
    }
}

// ----------------------------------------------------------------------------
// Symbol table

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub entity: Entity,
}

fn symbol_cmp(symbol: &Symbol, key: &str) -> Ordering {
    symbol.name.as_str().cmp(key)
}

// ----------------------------------------------------------------------------
// Segment

/// One translation unit's output: code stream, class tables, symbols.
///
/// Every record created while compiling the unit is owned here. Entities
/// handed out by this segment index its tables and stay valid because the
/// tables never shrink.
#[derive(Debug, Clone)]
pub struct Segment {
    pub header: Header,
    pub id: u8,
    tables: Tables,
    symbols: Table<Symbol>,
}

impl Segment {
    pub fn new(name: &str) -> Self {
        Segment {
            header: Header::new(name),
            id: SEGMENT_UNLINKED,
            tables: Tables::new(),
            symbols: Table::with_comparator(SYMBOL_CAPACITY, symbol_cmp),
        }
    }

    pub fn name(&self) -> &str {
        &self.header.name
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn code(&self) -> &[Entity] {
        self.tables.code.as_slice()
    }

    pub fn symbols(&self) -> &Table<Symbol> {
        &self.symbols
    }

    /// Appends one word to the code stream.
    pub fn emit(&mut self, word: Entity) -> Result<usize, Error> {
        self.tables.code.add(word)
    }

    /// Stores an anonymous record and returns its entity.
    pub fn insert<R: Record>(&mut self, record: R) -> Result<Entity, Error> {
        let pool = R::pool_mut(&mut self.tables);
        if pool.len() >= CLASS_TABLE_MAX {
            return Err(Error::ClassTableFull(R::CLASS));
        }
        let index = pool.add(record)?;
        Ok(Entity::new(R::CLASS, index))
    }

    /// Stores a record and binds its name in the symbol table.
    ///
    /// A name bound only to an unresolved placeholder is rebound; any other
    /// existing binding is a redefinition.
    pub fn define<R: Record>(&mut self, record: R) -> Result<Entity, Error> {
        let name = record.name().to_string();
        let slot = match self.symbols.find(&name) {
            Some(slot) => match self.symbols.get(slot) {
                Some(symbol) if symbol.entity.class() == Class::Unresolved => Some(slot),
                _ => return Err(Error::Redefined(name)),
            },
            None => None,
        };

        let entity = self.insert(record)?;
        match slot {
            Some(slot) => {
                if let Some(symbol) = self.symbols.get_mut(slot) {
                    symbol.entity = entity;
                }
            }
            None => {
                self.symbols.add(Symbol { name, entity })?;
            }
        }
        Ok(entity)
    }

    /// Defines a label at the current end of the code stream.
    pub fn define_label(&mut self, name: &str) -> Result<Entity, Error> {
        let offset = self.tables.code.len() as u32;
        self.define(Label::new(name, self.id, offset))
    }

    /// Binds `name` to an already stored entity.
    pub fn bind(&mut self, name: &str, entity: Entity) -> Result<(), Error> {
        let name = bounded(name);
        if self.symbols.find(name).is_some() {
            return Err(Error::Redefined(name.to_string()));
        }
        self.symbols.add(Symbol {
            name: name.to_string(),
            entity,
        })?;
        Ok(())
    }

    pub fn lookup(&self, name: &str) -> Option<Entity> {
        let slot = self.symbols.find(bounded(name))?;
        self.symbols.get(slot).map(|symbol| symbol.entity)
    }

    /// The record `entity` refers to, if it is of class `R`.
    pub fn record<R: Record>(&self, entity: Entity) -> Option<&R> {
        if entity.class() != R::CLASS {
            return None;
        }
        R::pool(&self.tables).get(entity.index()?)
    }

    pub fn name_of(&self, entity: Entity) -> Option<&str> {
        self.tables.name(entity)
    }

    fn relocate(&mut self, id: u8) {
        self.id = id;
        for slot in 0..self.tables.labels.len() {
            if let Some(label) = self.tables.labels.get_mut(slot) {
                label.segment = id;
            }
        }
    }
}

// ----------------------------------------------------------------------------
// Machine

/// The machine a set of segments is built for.
#[derive(Debug, Clone)]
pub struct Machine {
    pub header: Header,
    pub entrypoint: Entity,
    segments: Table<Segment>,
}

impl Machine {
    pub fn new(name: &str) -> Self {
        Machine {
            header: Header::new(name),
            entrypoint: Entity::INVALID,
            segments: Table::new(4),
        }
    }

    /// Takes ownership of `segment` and assigns its id.
    ///
    /// Id 0 belongs to the machine globals, so the first segment gets id 1.
    /// The first segment added becomes the entrypoint.
    pub fn add_segment(&mut self, mut segment: Segment) -> Result<Entity, Error> {
        let id = self.segments.len() + 1;
        if id >= usize::from(SEGMENT_UNLINKED) {
            return Err(Error::MachineFull);
        }
        segment.relocate(id as u8);
        let index = self.segments.add(segment)?;
        let entity = Entity::new(Class::Segment, index);
        if !self.entrypoint.is_valid() {
            self.entrypoint = entity;
        }
        Ok(entity)
    }

    pub fn segment(&self, id: u8) -> Option<&Segment> {
        match id {
            SEGMENT_GLOBAL | SEGMENT_UNLINKED => None,
            id => self.segments.get(usize::from(id) - 1),
        }
    }

    pub fn segments(&self) -> &Table<Segment> {
        &self.segments
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RegisterMode;

    #[test]
    fn code_table_is_larger() {
        let seg = Segment::new("main");
        assert!(seg.tables().code.capacity() > seg.tables().registers.capacity());
        assert_eq!(seg.id, SEGMENT_UNLINKED);
        assert!(seg.code().is_empty());
    }

    #[test]
    fn define_and_lookup() {
        let mut seg = Segment::new("main");
        let r1 = seg.define(Register::new("r1", RegisterMode::RW)).unwrap();
        assert_eq!(r1, Entity::new(Class::Register, 0));
        assert_eq!(seg.lookup("r1"), Some(r1));
        assert_eq!(seg.name_of(r1), Some("r1"));
        assert_eq!(seg.record::<Register>(r1).unwrap().mode, RegisterMode::RW);
        assert!(seg.record::<Label>(r1).is_none());
        assert_eq!(seg.lookup("r2"), None);
    }

    #[test]
    fn redefinition_is_rejected() {
        let mut seg = Segment::new("main");
        seg.define(Number::new("n", 32, 1)).unwrap();
        assert_eq!(
            seg.define(Register::new("n", RegisterMode::READ)).unwrap_err(),
            Error::Redefined("n".to_string())
        );
        assert_eq!(seg.tables().registers.len(), 0);
    }

    #[test]
    fn unresolved_binding_is_rebound() {
        let mut seg = Segment::new("main");
        let placeholder = seg.insert(Unresolved::new("loop")).unwrap();
        seg.bind("loop", placeholder).unwrap();
        seg.emit(Entity::immediate(0).unwrap()).unwrap();

        let label = seg.define_label("loop").unwrap();
        assert_eq!(seg.lookup("loop"), Some(label));
        assert_eq!(seg.symbols().len(), 1);
        assert_eq!(seg.record::<Label>(label).unwrap().offset, 1);
    }

    #[test]
    fn class_table_limit() {
        let mut seg = Segment::new("main");
        seg.tables.unresolved = Table::new(CLASS_TABLE_MAX);
        for _ in 0..CLASS_TABLE_MAX {
            seg.insert(Unresolved::new("")).unwrap();
        }
        assert_eq!(seg.tables().unresolved.len(), 0xFFFF);
        assert_eq!(
            seg.insert(Unresolved::new("")).unwrap_err(),
            Error::ClassTableFull(Class::Unresolved)
        );
        assert_eq!(seg.tables().unresolved.len(), 0xFFFF);
        // other classes are unaffected
        assert!(seg.insert(Number::new("", 64, 1)).is_ok());
    }

    #[test]
    fn long_names_share_a_symbol() {
        let mut seg = Segment::new("main");
        let long = "a".repeat(80);
        let e = seg.define(Register::new(&long, RegisterMode::READ)).unwrap();
        assert_eq!(seg.lookup(&long), Some(e));
    }

    #[test]
    fn machine_assigns_ids() {
        let mut avm = Machine::new("avm");
        let mut seg = Segment::new("a");
        seg.define_label("start").unwrap();
        let first = avm.add_segment(seg).unwrap();
        let second = avm.add_segment(Segment::new("b")).unwrap();

        assert_eq!(avm.entrypoint, first);
        assert_eq!(second.index(), Some(1));
        let a = avm.segment(1).unwrap();
        assert_eq!(a.name(), "a");
        let start = a.lookup("start").unwrap();
        assert_eq!(a.record::<Label>(start).unwrap().segment, 1);
        assert_eq!(avm.segment(2).unwrap().name(), "b");
        assert!(avm.segment(SEGMENT_GLOBAL).is_none());
    }
}
