// ==========================================
// Inventory Count Automation - normalizer traits
// ==========================================
// Responsibility: seams of the Record Normalizer pipeline
// Stage 0: FileParser   (file -> RawTable)
// Stage 1: HeaderMapper (raw header -> CanonicalField)
// Stage 2: DataCleaner  (text / quantity / bin rules)
// ==========================================

use crate::domain::CanonicalField;
use crate::importer::error::ImportResult;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// RawTable - untyped tabular input
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawTable {
    /// Where the table came from (file path or query label)
    pub source_name: String,
    pub headers: Vec<String>,
    /// Each row has at most `headers.len()` cells; missing cells read as empty
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new(source_name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            source_name: source_name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    pub fn cell(&self, row: usize, col: usize) -> &str {
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .map(|s| s.as_str())
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ==========================================
// FileParser Trait
// ==========================================
// Implementors: CsvParser, SpreadsheetParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// Reads the first sheet / the whole delimited file; first row is the header.
    fn parse_table(&self, file_path: &Path) -> ImportResult<RawTable>;
}

// ==========================================
// HeaderMapper Trait
// ==========================================
// Implementor: HeaderAliases
pub trait HeaderMapper: Send + Sync {
    /// Resolves a raw (possibly accented, mixed-case) header.
    fn resolve(&self, raw_header: &str) -> Option<CanonicalField>;

    /// Column index per canonical field. The first matching column wins.
    fn map_headers(&self, headers: &[String]) -> HashMap<CanonicalField, usize> {
        let mut columns = HashMap::new();
        for (idx, header) in headers.iter().enumerate() {
            if let Some(field) = self.resolve(header) {
                columns.entry(field).or_insert(idx);
            }
        }
        columns
    }
}

// ==========================================
// DataCleaner Trait
// ==========================================
// Implementor: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// Trim, optionally upper-case.
    fn clean_text(&self, value: &str, uppercase: bool) -> String;

    /// Diacritics stripped, lower-cased, inner whitespace collapsed.
    fn normalize_header(&self, header: &str) -> String;

    /// Locale-tolerant decimal parse; empty or unparsable input yields zero.
    fn parse_quantity(&self, value: &str) -> Decimal;

    /// Fixed-width bin rule for the terminal's bin field.
    fn fix_storage_bin(&self, value: &str) -> String;

    /// Empty or a spreadsheet "nan" placeholder.
    fn is_missing(&self, value: &str) -> bool;
}
