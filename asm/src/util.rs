use avm_arch::{Class, Entity, Machine, Segment};
use color_print::cformat;
use strum::IntoEnumIterator;

const WORDS_PER_GROUP: usize = 4;
const WORDS_PER_LINE: usize = 8;

/// Code words as hex, four per group and eight per line, each line
/// prefixed with the offset of its first word.
pub fn format_code(code: &[Entity]) -> Vec<String> {
    code.chunks(WORDS_PER_LINE)
        .enumerate()
        .map(|(idx, words)| {
            let groups: Vec<String> = words
                .chunks(WORDS_PER_GROUP)
                .map(|group| {
                    group
                        .iter()
                        .map(Entity::to_string)
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .collect();
            format!("{:04X}: {}", idx * WORDS_PER_LINE, groups.join("  "))
        })
        .collect()
}

pub fn print_machine(machine: &Machine) {
    println!(
        "{}",
        cformat!(
            "<s>MACHINE</> {} entrypoint={} segments={}",
            machine.header.name,
            machine.entrypoint,
            machine.segments().len()
        )
    );
    for segment in machine.segments() {
        print_segment(segment);
    }
}

pub fn print_segment(segment: &Segment) {
    let title = format!("[{}:{:02X}]", segment.name(), segment.id);
    println!("{}+{}", "-".repeat(19), cformat!("<s>{}</>", title));

    let tables = segment.tables();
    for class in Class::iter().filter(|class| class.is_indexed()) {
        let len = tables.len(class);
        if len > 0 {
            println!("{:>19}| {}", class.to_string(), len);
        }
    }

    for symbol in segment.symbols() {
        let name = match symbol.entity.class() {
            Class::Label => cformat!("<g>{}:</>", symbol.name),
            Class::Unresolved => cformat!("<r>{}?</>", symbol.name),
            _ => symbol.name.clone(),
        };
        println!("{:>19}| {}", symbol.entity.to_string(), name);
    }

    for line in format_code(segment.code()) {
        println!("{:19}| {}", "", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_layout() {
        let code: Vec<Entity> = (0..10).map(Entity::from_bits).collect();
        let lines = format_code(&code);
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "0000: 00000000 00000001 00000002 00000003  \
             00000004 00000005 00000006 00000007"
        );
        assert_eq!(lines[1], "0008: 00000008 00000009");
        assert!(format_code(&[]).is_empty());
    }
}
