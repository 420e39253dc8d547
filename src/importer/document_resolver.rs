// ==========================================
// Inventory Count Automation - document-reference resolver
// ==========================================
// Aggregate feeds carry no inventory document. It is looked up in a
// reference template through three indexes of decreasing specificity:
//   1. (plant, location, material, bin)
//   2. (material, bin)
//   3. bin
// Keys are compared upper-cased and diacritic-free.
// ==========================================

use crate::domain::CanonicalRow;
use crate::importer::data_cleaner::strip_diacritics;
use serde::Serialize;
use std::collections::HashMap;
use tracing::{debug, info, warn};

fn key(value: &str) -> String {
    strip_diacritics(value.trim()).to_uppercase()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveLevel {
    Full,
    MaterialBin,
    BinOnly,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolverStats {
    pub resolved_full: usize,
    pub resolved_material_bin: usize,
    pub resolved_bin_only: usize,
    pub unresolved: usize,
    /// Rows dropped because material, plant or location was empty
    pub incomplete: usize,
}

#[derive(Debug, Default)]
pub struct DocumentResolver {
    full: HashMap<(String, String, String, String), String>,
    material_bin: HashMap<(String, String), String>,
    bin_only: HashMap<String, String>,
}

impl DocumentResolver {
    /// Builds the indexes; the first template row for a key wins.
    pub fn from_template(template: &[CanonicalRow]) -> Self {
        let mut resolver = Self::default();
        for row in template {
            let document = row.document.trim();
            if document.is_empty() {
                continue;
            }
            let (plant, location, material, bin) = (
                key(&row.plant),
                key(&row.storage_location),
                key(&row.material),
                key(&row.storage_bin),
            );
            resolver
                .full
                .entry((plant, location, material.clone(), bin.clone()))
                .or_insert_with(|| document.to_string());
            if !bin.is_empty() {
                resolver
                    .material_bin
                    .entry((material, bin.clone()))
                    .or_insert_with(|| document.to_string());
                resolver
                    .bin_only
                    .entry(bin)
                    .or_insert_with(|| document.to_string());
            }
        }
        debug!(
            full = resolver.full.len(),
            material_bin = resolver.material_bin.len(),
            bin_only = resolver.bin_only.len(),
            "document indexes built"
        );
        resolver
    }

    pub fn resolve(&self, row: &CanonicalRow) -> Option<(String, ResolveLevel)> {
        let (plant, location, material, bin) = (
            key(&row.plant),
            key(&row.storage_location),
            key(&row.material),
            key(&row.storage_bin),
        );
        if let Some(doc) = self
            .full
            .get(&(plant, location, material.clone(), bin.clone()))
        {
            return Some((doc.clone(), ResolveLevel::Full));
        }
        if bin.is_empty() {
            return None;
        }
        if let Some(doc) = self.material_bin.get(&(material, bin.clone())) {
            return Some((doc.clone(), ResolveLevel::MaterialBin));
        }
        self.bin_only
            .get(&bin)
            .map(|doc| (doc.clone(), ResolveLevel::BinOnly))
    }

    /// Fills the document column of feed rows, dropping the ones that
    /// cannot be launched.
    pub fn apply(&self, rows: Vec<CanonicalRow>) -> (Vec<CanonicalRow>, ResolverStats) {
        let mut stats = ResolverStats::default();
        let mut kept = Vec::with_capacity(rows.len());

        for mut row in rows {
            if row.material.is_empty() || row.plant.is_empty() || row.storage_location.is_empty() {
                stats.incomplete += 1;
                continue;
            }
            if !row.document.is_empty() {
                kept.push(row);
                continue;
            }
            match self.resolve(&row) {
                Some((doc, level)) => {
                    match level {
                        ResolveLevel::Full => stats.resolved_full += 1,
                        ResolveLevel::MaterialBin => stats.resolved_material_bin += 1,
                        ResolveLevel::BinOnly => stats.resolved_bin_only += 1,
                    }
                    row.document = doc;
                    kept.push(row);
                }
                None => {
                    warn!(
                        row = row.row_number,
                        material = %row.material,
                        bin = %row.storage_bin,
                        "no inventory document for feed row"
                    );
                    stats.unresolved += 1;
                }
            }
        }

        info!(
            kept = kept.len(),
            unresolved = stats.unresolved,
            incomplete = stats.incomplete,
            "document references resolved"
        );
        (kept, stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(doc: &str, plant: &str, loc: &str, material: &str, bin: &str) -> CanonicalRow {
        CanonicalRow {
            document: doc.to_string(),
            plant: plant.to_string(),
            storage_location: loc.to_string(),
            material: material.to_string(),
            storage_bin: bin.to_string(),
            ..CanonicalRow::default()
        }
    }

    fn template() -> Vec<CanonicalRow> {
        vec![
            row("D-FULL", "BR01", "Depósito", "M1", "B1"),
            row("D-MATBIN", "BR09", "X", "M2", "B2"),
            row("D-BIN", "BR09", "X", "M9", "B3"),
        ]
    }

    #[test]
    fn test_three_levels() {
        let resolver = DocumentResolver::from_template(&template());

        let (doc, level) = resolver.resolve(&row("", "br01", "DEPOSITO", "m1", "b1")).unwrap();
        assert_eq!((doc.as_str(), level), ("D-FULL", ResolveLevel::Full));

        let (doc, level) = resolver.resolve(&row("", "BR01", "L1", "M2", "B2")).unwrap();
        assert_eq!((doc.as_str(), level), ("D-MATBIN", ResolveLevel::MaterialBin));

        let (doc, level) = resolver.resolve(&row("", "BR01", "L1", "M5", "B3")).unwrap();
        assert_eq!((doc.as_str(), level), ("D-BIN", ResolveLevel::BinOnly));

        assert!(resolver.resolve(&row("", "BR01", "L1", "M5", "B404")).is_none());
    }

    #[test]
    fn test_apply_drops_incomplete_and_unresolved() {
        let resolver = DocumentResolver::from_template(&template());
        let feed = vec![
            row("", "BR01", "Deposito", "M1", "B1"),
            row("", "", "L1", "M1", "B1"),
            row("", "BR01", "L1", "M7", "B404"),
            row("OWN", "BR01", "L1", "M8", "B8"),
        ];

        let (kept, stats) = resolver.apply(feed);
        assert_eq!(kept.len(), 2);
        assert_eq!(kept[0].document, "D-FULL");
        assert_eq!(kept[1].document, "OWN");
        assert_eq!(stats.incomplete, 1);
        assert_eq!(stats.unresolved, 1);
        assert_eq!(stats.resolved_full, 1);
    }
}
