// ==========================================
// Inventory Count Automation - record normalizer
// ==========================================
// Responsibility: heterogeneous rows -> canonical rows -> typed records
// Flow: parse -> map headers -> schema gate -> clean -> drop blanks
// ==========================================

use crate::domain::{CanonicalField, CanonicalRow, CountedRecord, ReferenceRecord};
use crate::importer::data_cleaner::DataCleaner as DefaultCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::field_mapper::HeaderAliases;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::normalizer_trait::{DataCleaner, FileParser, HeaderMapper, RawTable};
use std::path::Path;
use tracing::{debug, info, instrument};

// ==========================================
// NormalizeMode
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalizeMode {
    /// Counting file: one row per counted total, document reference mandatory
    Counting,
    /// Reference report: UD sub-records
    Reference,
    /// Data-source feed: document resolved afterwards from the reference template
    Aggregate,
}

impl NormalizeMode {
    pub fn required_fields(&self) -> &'static [CanonicalField] {
        match self {
            NormalizeMode::Counting => &[CanonicalField::Document, CanonicalField::Material],
            NormalizeMode::Reference | NormalizeMode::Aggregate => &[CanonicalField::Material],
        }
    }
}

// ==========================================
// NormalizedTable
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct NormalizedTable {
    pub rows: Vec<CanonicalRow>,
    pub blank_rows: usize,
}

// ==========================================
// RecordNormalizer
// ==========================================
pub struct RecordNormalizer {
    file_parser: Box<dyn FileParser>,
    header_mapper: Box<dyn HeaderMapper>,
    data_cleaner: Box<dyn DataCleaner>,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(
            Box::new(UniversalFileParser),
            Box::new(HeaderAliases::default()),
            Box::new(DefaultCleaner),
        )
    }
}

impl RecordNormalizer {
    pub fn new(
        file_parser: Box<dyn FileParser>,
        header_mapper: Box<dyn HeaderMapper>,
        data_cleaner: Box<dyn DataCleaner>,
    ) -> Self {
        Self {
            file_parser,
            header_mapper,
            data_cleaner,
        }
    }

    /// Parses a file and normalizes it in one go.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub fn load_file(&self, path: &Path, mode: NormalizeMode) -> ImportResult<NormalizedTable> {
        debug!("step 1: parse file");
        let table = self.file_parser.parse_table(path)?;
        info!(rows = table.len(), "file parsed");

        debug!("step 2: normalize rows");
        self.normalize(&table, mode)
    }

    /// Maps a raw table onto canonical rows.
    ///
    /// Fails with `SchemaError` when a mandatory column for `mode` is absent
    /// from the header. Rows with every canonical field empty are dropped.
    /// Repeated rows are kept: a report may list the same material and bin
    /// once per lot.
    pub fn normalize(
        &self,
        table: &RawTable,
        mode: NormalizeMode,
    ) -> ImportResult<NormalizedTable> {
        let columns = self.header_mapper.map_headers(&table.headers);

        for field in mode.required_fields() {
            if !columns.contains_key(field) {
                return Err(ImportError::SchemaError {
                    source_name: table.source_name.clone(),
                    field: field.as_str().to_string(),
                });
            }
        }

        let mut result = NormalizedTable::default();

        for row_idx in 0..table.len() {
            let mut row = CanonicalRow {
                row_number: row_idx + 1,
                ..CanonicalRow::default()
            };
            for (field, col) in &columns {
                let raw = table.cell(row_idx, *col);
                let value = match field {
                    CanonicalField::StorageBin => self.data_cleaner.fix_storage_bin(raw),
                    CanonicalField::StorageType => self.data_cleaner.clean_text(raw, true),
                    _ => self.data_cleaner.clean_text(raw, false),
                };
                row.set(*field, value);
            }

            if row.is_blank() {
                result.blank_rows += 1;
                continue;
            }
            result.rows.push(row);
        }

        info!(
            source = %table.source_name,
            rows = result.rows.len(),
            blank = result.blank_rows,
            "normalization complete"
        );
        Ok(result)
    }

    // ==========================================
    // Typed record builders
    // ==========================================

    fn optional(&self, value: &str) -> Option<String> {
        if self.data_cleaner.is_missing(value) {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// Counted total: counted column, then alternative-unit column, then zero.
    pub fn to_counted_records(&self, rows: &[CanonicalRow]) -> Vec<CountedRecord> {
        rows.iter()
            .map(|row| {
                let source = if !row.counted_quantity.is_empty() {
                    &row.counted_quantity
                } else {
                    &row.alt_quantity
                };
                CountedRecord {
                    row_number: row.row_number,
                    material: row.material.clone(),
                    plant: self.optional(&row.plant),
                    storage_location: self.optional(&row.storage_location),
                    storage_type: self.optional(&row.storage_type),
                    storage_bin: self.optional(&row.storage_bin),
                    counted_quantity: self.data_cleaner.parse_quantity(source),
                    document: self.optional(&row.document),
                }
            })
            .collect()
    }

    /// Prior quantity comes from the stock-total column.
    pub fn to_reference_records(&self, rows: &[CanonicalRow]) -> Vec<ReferenceRecord> {
        rows.iter()
            .map(|row| ReferenceRecord {
                row_number: row.row_number,
                material: row.material.clone(),
                plant: self.optional(&row.plant),
                storage_location: self.optional(&row.storage_location),
                storage_type: self.optional(&row.storage_type),
                storage_bin: self.optional(&row.storage_bin),
                ud: self.optional(&row.ud),
                prior_quantity: self.data_cleaner.parse_quantity(&row.stock_total),
                document: self.optional(&row.document),
            })
            .collect()
    }
}
