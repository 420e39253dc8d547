// ==========================================
// Inventory Count Automation - header alias mapper
// ==========================================
// Stage 1 of the normalizer: raw header -> CanonicalField
// Lookup keys are folded (diacritics stripped, lower-cased), so
// "Depósito" and "Deposito" resolve identically.
// ==========================================

use crate::domain::CanonicalField;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::normalizer_trait::{DataCleaner as _, HeaderMapper};
use std::collections::HashMap;

/// Default alias table: terminal export names plus the localized report names.
const DEFAULT_ALIASES: &[(&str, CanonicalField)] = &[
    // Document reference
    ("document", CanonicalField::Document),
    ("inventory record", CanonicalField::Document),
    ("inventory document", CanonicalField::Document),
    ("number of system inventory", CanonicalField::Document),
    ("documento inventario", CanonicalField::Document),
    // Material
    ("material", CanonicalField::Material),
    ("material number", CanonicalField::Material),
    // Plant
    ("plant", CanonicalField::Plant),
    ("centro", CanonicalField::Plant),
    // Storage location
    ("storage location", CanonicalField::StorageLocation),
    ("deposito", CanonicalField::StorageLocation),
    // Storage type
    ("storage type", CanonicalField::StorageType),
    ("tipo de deposito", CanonicalField::StorageType),
    // Storage bin
    ("storage bin", CanonicalField::StorageBin),
    ("storagebin", CanonicalField::StorageBin),
    ("posicao no deposito", CanonicalField::StorageBin),
    // Quantities
    ("counted quantity", CanonicalField::CountedQuantity),
    ("qtd.contada", CanonicalField::CountedQuantity),
    ("quantidade eleita", CanonicalField::CountedQuantity),
    (
        "counted quantity in alternative unit of measure",
        CanonicalField::AltQuantity,
    ),
    ("stock total", CanonicalField::StockTotal),
    ("total stock", CanonicalField::StockTotal),
    ("estoque total", CanonicalField::StockTotal),
    // Unit of division
    ("ud", CanonicalField::Ud),
    ("storage unit", CanonicalField::Ud),
];

#[derive(Debug, Clone)]
pub struct HeaderAliases {
    map: HashMap<String, CanonicalField>,
}

impl Default for HeaderAliases {
    fn default() -> Self {
        let mut aliases = Self {
            map: HashMap::new(),
        };
        for (name, field) in DEFAULT_ALIASES {
            aliases.insert(name, *field);
        }
        aliases
    }
}

impl HeaderAliases {
    fn insert(&mut self, alias: &str, field: CanonicalField) {
        self.map.insert(DataCleaner.normalize_header(alias), field);
    }
}

impl HeaderMapper for HeaderAliases {
    fn resolve(&self, raw_header: &str) -> Option<CanonicalField> {
        self.map
            .get(&DataCleaner.normalize_header(raw_header))
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accented_and_plain_headers_resolve_identically() {
        let aliases = HeaderAliases::default();
        assert_eq!(aliases.resolve("Depósito"), Some(CanonicalField::StorageLocation));
        assert_eq!(aliases.resolve("DEPOSITO"), Some(CanonicalField::StorageLocation));
        assert_eq!(aliases.resolve("Posição no Depósito"), Some(CanonicalField::StorageBin));
        assert_eq!(aliases.resolve("Documento Inventário"), Some(CanonicalField::Document));
    }

    #[test]
    fn test_quantity_headers() {
        let aliases = HeaderAliases::default();
        assert_eq!(aliases.resolve("Qtd.Contada"), Some(CanonicalField::CountedQuantity));
        assert_eq!(
            aliases.resolve("Counted quantity in alternative unit of measure"),
            Some(CanonicalField::AltQuantity)
        );
        assert_eq!(aliases.resolve("Estoque Total"), Some(CanonicalField::StockTotal));
        assert_eq!(aliases.resolve("Unknown column"), None);
    }

    #[test]
    fn test_map_headers_first_match_wins() {
        let aliases = HeaderAliases::default();
        let headers = vec![
            "Material".to_string(),
            "Material Number".to_string(),
            "Centro".to_string(),
        ];
        let columns = aliases.map_headers(&headers);
        assert_eq!(columns.get(&CanonicalField::Material), Some(&0));
        assert_eq!(columns.get(&CanonicalField::Plant), Some(&2));
    }
}
