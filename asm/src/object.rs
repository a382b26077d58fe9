//! Binary object container for one compiled segment.
//!
//! Layout, little-endian throughout:
//!
//! ```text
//! "AVMO" version:u8 segment-id:u8 name
//! (class:u8 count:u32 entry*)   one table per class, in tag order
//! count:u32 (name entity:u32)*  symbol table
//! ```
//!
//! Names are a `u8` length plus bytes, texts and paths a `u32` length plus
//! bytes.

use std::io::{self, Write};

use avm_arch::{
    record::{Buffer, Fault, Group, Label, Number, Port, Process, Record, Register, Str, Unresolved},
    Class, Entity, Segment, Table,
};

pub const MAGIC: &[u8; 4] = b"AVMO";
pub const VERSION: u8 = 1;

/// Class-specific part of a record entry. The name is written before it.
trait Payload {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()>;
}

struct Object<W: Write> {
    out: W,
}

impl<W: Write> Object<W> {
    fn u8(&mut self, value: u8) -> io::Result<()> {
        self.out.write_all(&[value])
    }

    fn u32(&mut self, value: u32) -> io::Result<()> {
        self.out.write_all(&value.to_le_bytes())
    }

    fn i64(&mut self, value: i64) -> io::Result<()> {
        self.out.write_all(&value.to_le_bytes())
    }

    fn len(&mut self, len: usize) -> io::Result<()> {
        let len = u32::try_from(len).map_err(|_| io::Error::from(io::ErrorKind::InvalidInput))?;
        self.u32(len)
    }

    fn entity(&mut self, entity: Entity) -> io::Result<()> {
        self.u32(entity.bits())
    }

    fn entities(&mut self, entities: &Table<Entity>) -> io::Result<()> {
        self.len(entities.len())?;
        for entity in entities {
            self.entity(*entity)?;
        }
        Ok(())
    }

    /// Record names never exceed 63 bytes, so a `u8` prefix is enough.
    fn name(&mut self, name: &str) -> io::Result<()> {
        let bytes = name.as_bytes();
        let len = bytes.len().min(usize::from(u8::MAX));
        self.u8(len as u8)?;
        self.out.write_all(&bytes[..len])
    }

    fn text(&mut self, text: &str) -> io::Result<()> {
        self.len(text.len())?;
        self.out.write_all(text.as_bytes())
    }

    fn table<R: Record + Payload>(&mut self, table: &Table<R>) -> io::Result<()> {
        self.u8(R::CLASS.into())?;
        self.len(table.len())?;
        for record in table {
            self.name(record.name())?;
            record.put(self)?;
        }
        Ok(())
    }
}

impl Payload for Fault {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.entity(self.segment)?;
        out.entity(self.label)
    }
}

impl Payload for Group {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.entities(&self.members)
    }
}

impl Payload for Register {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.u8(self.mode.bits())
    }
}

impl Payload for Buffer {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.u32(self.capacity)?;
        out.u32(self.size)
    }
}

impl Payload for Port {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        let path = self
            .path
            .as_ref()
            .map(|path| path.to_string_lossy().into_owned())
            .unwrap_or_default();
        out.text(&path)
    }
}

impl Payload for Str {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.text(&self.text)
    }
}

impl Payload for Label {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.u8(self.segment)?;
        out.u32(self.offset)
    }
}

impl Payload for Process {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.entities(&self.registers)?;
        out.entities(&self.stack)
    }
}

impl Payload for Number {
    fn put<W: Write>(&self, out: &mut Object<W>) -> io::Result<()> {
        out.u32(self.bitwidth)?;
        out.i64(self.value)
    }
}

impl Payload for Unresolved {
    fn put<W: Write>(&self, _: &mut Object<W>) -> io::Result<()> {
        Ok(())
    }
}

/// Writes `segment` as an object container.
pub fn write<W: Write>(segment: &Segment, out: W) -> io::Result<()> {
    let mut obj = Object { out };
    obj.out.write_all(MAGIC)?;
    obj.u8(VERSION)?;
    obj.u8(segment.id)?;
    obj.name(segment.name())?;

    let tables = segment.tables();
    obj.u8(Class::Instruction.into())?;
    obj.entities(&tables.code)?;
    obj.table(&tables.faults)?;
    obj.table(&tables.groups)?;
    obj.table(&tables.registers)?;
    obj.table(&tables.buffers)?;
    obj.table(&tables.ports)?;
    obj.table(&tables.strings)?;
    obj.table(&tables.labels)?;
    obj.table(&tables.processes)?;
    obj.table(&tables.numbers)?;
    obj.table(&tables.unresolved)?;

    let symbols = segment.symbols();
    obj.len(symbols.len())?;
    for symbol in symbols {
        obj.name(&symbol.name)?;
        obj.entity(symbol.entity)?;
    }
    obj.out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use avm_arch::{record::RegisterMode, Opcode};
    use std::path::PathBuf;

    fn to_bytes(segment: &Segment) -> Vec<u8> {
        let mut bytes = vec![];
        write(segment, &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn empty_segment() {
        let bytes = to_bytes(&Segment::new("m"));
        assert_eq!(&bytes[..4], b"AVMO");
        assert_eq!(bytes[4], VERSION);
        assert_eq!(bytes[5], 0xFF);
        assert_eq!(&bytes[6..8], &[1, b'm']);
        // code table: class 0, no words
        assert_eq!(&bytes[8..13], &[0, 0, 0, 0, 0]);
        // ten empty record tables, then an empty symbol table
        assert_eq!(bytes.len(), 13 + 10 * 5 + 4);
        assert_eq!(&bytes[13..18], &[1, 0, 0, 0, 0]);
    }

    #[test]
    fn code_and_records() {
        let mut seg = Segment::new("m");
        let r1 = seg.define(Register::new("r1", RegisterMode::RW)).unwrap();
        let word = Entity::instruction(Opcode::Nop, 0, 0);
        seg.emit(word).unwrap();

        let bytes = to_bytes(&seg);
        assert_eq!(&bytes[8..13], &[0, 1, 0, 0, 0]);
        assert_eq!(&bytes[13..17], &word.bits().to_le_bytes());

        // faults and groups are empty; registers follow
        let reg = 17 + 5 + 5;
        assert_eq!(&bytes[reg..reg + 5], &[3, 1, 0, 0, 0]);
        assert_eq!(&bytes[reg + 5..reg + 9], &[2, b'r', b'1', 0x03]);

        let tail = bytes.len() - 4;
        assert_eq!(&bytes[tail..], &r1.bits().to_le_bytes());
    }

    #[test]
    fn every_record_kind() {
        let mut seg = Segment::new("m");
        let r = seg.define(Register::new("r", RegisterMode::READ)).unwrap();
        let l = seg.define_label("l").unwrap();
        let here = Entity::new(Class::Segment, 0);
        let f = seg.define(Fault::new("f", here, l)).unwrap();

        let mut group = Group::new("g");
        group.members.add(r).unwrap();
        let g = seg.define(group).unwrap();

        let mut process = Process::new("x");
        process.registers.add(r).unwrap();
        seg.define(process).unwrap();

        seg.define(Buffer::new("b", 64)).unwrap();
        seg.define(Port::new("p", Some(PathBuf::from("/dev/null")))).unwrap();
        seg.define(Str::new("s", "hi")).unwrap();
        seg.define(Number::new("n", 32, -2)).unwrap();
        seg.define(Unresolved::new("u")).unwrap();

        let bytes = to_bytes(&seg);
        // header 8, code 5, then per class: tag+count 5, name 2, payload
        let faults = 13;
        let groups = faults + 5 + 2 + 8;
        let registers = groups + 5 + 2 + 8;
        let buffers = registers + 5 + 2 + 1;
        let ports = buffers + 5 + 2 + 8;
        let strings = ports + 5 + 2 + 4 + 9;
        let labels = strings + 5 + 2 + 4 + 2;
        let processes = labels + 5 + 2 + 5;
        let numbers = processes + 5 + 2 + 8 + 4;
        let unresolved = numbers + 5 + 2 + 12;
        let symbols = unresolved + 5 + 2;
        assert_eq!(bytes.len(), symbols + 4 + 10 * 6);

        assert_eq!(&bytes[faults..faults + 7], &[1, 1, 0, 0, 0, 1, b'f']);
        assert_eq!(&bytes[faults + 7..faults + 11], &here.bits().to_le_bytes());
        assert_eq!(&bytes[faults + 11..groups], &l.bits().to_le_bytes());

        assert_eq!(&bytes[groups..groups + 11], &[2, 1, 0, 0, 0, 1, b'g', 1, 0, 0, 0]);
        assert_eq!(&bytes[groups + 11..registers], &r.bits().to_le_bytes());

        assert_eq!(&bytes[registers..buffers], &[3, 1, 0, 0, 0, 1, b'r', 0x01]);
        assert_eq!(&bytes[buffers + 7..buffers + 11], &64u32.to_le_bytes());
        assert_eq!(&bytes[ports + 7..ports + 11], &9u32.to_le_bytes());
        assert_eq!(&bytes[ports + 11..strings], b"/dev/null");
        assert_eq!(&bytes[strings + 11..labels], b"hi");
        assert_eq!(&bytes[labels + 7..processes], &[0xFF, 0, 0, 0, 0]);

        assert_eq!(&bytes[processes..processes + 11], &[8, 1, 0, 0, 0, 1, b'x', 1, 0, 0, 0]);
        assert_eq!(&bytes[processes + 11..processes + 15], &r.bits().to_le_bytes());
        assert_eq!(&bytes[processes + 15..numbers], &[0, 0, 0, 0]);

        assert_eq!(&bytes[numbers + 7..numbers + 11], &32u32.to_le_bytes());
        assert_eq!(&bytes[numbers + 11..unresolved], &(-2i64).to_le_bytes());
        assert_eq!(&bytes[unresolved..symbols], &[0x0C, 1, 0, 0, 0, 1, b'u']);
        assert_eq!(&bytes[symbols..symbols + 4], &10u32.to_le_bytes());

        assert_eq!(seg.record::<Fault>(f).unwrap().label, l);
        assert_eq!(seg.record::<Group>(g).unwrap().members.len(), 1);
    }
}
