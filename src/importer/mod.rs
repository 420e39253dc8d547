// ==========================================
// Inventory Count Automation - importer layer
// ==========================================
// Responsibility: Record Normalizer
// Sources: CSV, spreadsheets, SQLite query feed, storage-code lists
// ==========================================

pub mod data_cleaner;
pub mod db_feed;
pub mod document_resolver;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod normalizer_trait;
pub mod record_normalizer;
pub mod storage_list;

pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use db_feed::SqliteFeed;
pub use document_resolver::{DocumentResolver, ResolverStats};
pub use error::{ImportError, ImportResult};
pub use field_mapper::HeaderAliases;
pub use file_parser::{CsvParser, SpreadsheetParser, UniversalFileParser};
pub use normalizer_trait::{DataCleaner, FileParser, HeaderMapper, RawTable};
pub use record_normalizer::{NormalizeMode, NormalizedTable, RecordNormalizer};
pub use storage_list::{load_storage_codes, parse_storage_codes};
