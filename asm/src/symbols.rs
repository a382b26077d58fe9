use avm_arch::{Class, Segment};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Human-readable summary of a compiled segment's symbols.
#[derive(Debug, Serialize, Deserialize)]
pub struct SymbolMap {
    pub segment: String,
    pub id: u8,
    /// Number of code words
    pub code: usize,
    pub symbols: IndexMap<String, SymbolEntry>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SymbolEntry {
    pub class: Class,
    pub index: usize,
    /// Raw entity word in hex
    pub entity: String,
}

impl SymbolMap {
    pub fn generate(segment: &Segment) -> Self {
        let symbols = segment
            .symbols()
            .iter()
            .map(|symbol| {
                let entry = SymbolEntry {
                    class: symbol.entity.class(),
                    index: symbol.entity.index().unwrap_or_default(),
                    entity: symbol.entity.to_string(),
                };
                (symbol.name.clone(), entry)
            })
            .collect();

        SymbolMap {
            segment: segment.name().to_string(),
            id: segment.id,
            code: segment.code().len(),
            symbols,
        }
    }

    pub fn to_yaml(&self) -> Result<String, Error> {
        Ok(serde_yaml::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use avm_arch::record::{Register, RegisterMode};

    #[test]
    fn lists_symbols_in_definition_order() {
        let mut seg = Segment::new("main");
        seg.define(Register::new("r1", RegisterMode::RW)).unwrap();
        seg.define_label("start").unwrap();

        let map = SymbolMap::generate(&seg);
        assert_eq!(map.segment, "main");
        assert_eq!(map.code, 0);
        let names: Vec<_> = map.symbols.keys().cloned().collect();
        assert_eq!(names, ["r1", "start"]);
        assert_eq!(
            map.symbols["start"],
            SymbolEntry {
                class: Class::Label,
                index: 0,
                entity: "07000000".to_string(),
            }
        );

        let yaml = map.to_yaml().unwrap();
        assert!(yaml.contains("segment: main"));
        assert!(yaml.contains("class: REGISTER"));
        let back: SymbolMap = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.symbols, map.symbols);
    }
}
