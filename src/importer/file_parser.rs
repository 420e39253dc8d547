// ==========================================
// Inventory Count Automation - file parsers
// ==========================================
// Stage 0 of the normalizer: file -> RawTable
// Supports: delimited text (.csv, ';' or ',') and spreadsheets
// (.xlsx/.xls/.xlsb/.ods, first sheet)
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalizer_trait::{FileParser, RawTable};
use calamine::{open_workbook_auto, Reader};
use csv::ReaderBuilder;
use std::path::Path;
use tracing::debug;

const SPREADSHEET_EXTENSIONS: [&str; 4] = ["xlsx", "xls", "xlsb", "ods"];

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

fn ensure_exists(path: &Path) -> ImportResult<()> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    Ok(())
}

/// Picks ';' when the header line holds more semicolons than commas.
fn sniff_delimiter(text: &str) -> u8 {
    let header = text.lines().next().unwrap_or("");
    let semicolons = header.matches(';').count();
    let commas = header.matches(',').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}

// ==========================================
// CSV Parser
// ==========================================
pub struct CsvParser;

impl CsvParser {
    /// Parses already-loaded delimited text.
    pub fn parse_text(&self, source_name: &str, text: &str) -> ImportResult<RawTable> {
        let text = text.strip_prefix('\u{feff}').unwrap_or(text);
        let delimiter = sniff_delimiter(text);

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .delimiter(delimiter)
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(|h| h.is_empty()) {
            return Err(ImportError::MissingHeader {
                source_name: source_name.to_string(),
            });
        }

        let mut table = RawTable::new(source_name, headers);
        for result in reader.records() {
            let record = result?;
            let row: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            // Skip fully blank lines
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            table.rows.push(row);
        }

        debug!(
            source = source_name,
            delimiter = %(delimiter as char),
            rows = table.rows.len(),
            "CSV parsed"
        );
        Ok(table)
    }
}

impl FileParser for CsvParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if ext != "csv" && ext != "txt" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let bytes = std::fs::read(file_path)?;
        let text = String::from_utf8_lossy(&bytes);
        self.parse_text(&file_path.display().to_string(), &text)
    }
}

// ==========================================
// Spreadsheet Parser
// ==========================================
pub struct SpreadsheetParser;

impl FileParser for SpreadsheetParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        ensure_exists(file_path)?;

        let ext = extension_of(file_path);
        if !SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let source_name = file_path.display().to_string();
        let mut workbook = open_workbook_auto(file_path)?;

        let sheet_names = workbook.sheet_names();
        let first_sheet = sheet_names.first().cloned().ok_or_else(|| {
            ImportError::SpreadsheetParseError(format!("{} has no worksheet", source_name))
        })?;
        let range = workbook.worksheet_range(&first_sheet)?;

        let mut rows = range.rows();
        let header_row = rows.next().ok_or_else(|| ImportError::MissingHeader {
            source_name: source_name.clone(),
        })?;
        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();

        let mut table = RawTable::new(source_name.as_str(), headers);
        for data_row in rows {
            let row: Vec<String> = data_row
                .iter()
                .map(|cell| cell.to_string().trim().to_string())
                .collect();
            if row.iter().all(|v| v.is_empty()) {
                continue;
            }
            table.rows.push(row);
        }

        debug!(
            source = %source_name,
            sheet = %first_sheet,
            rows = table.rows.len(),
            "spreadsheet parsed"
        );
        Ok(table)
    }
}

// ==========================================
// Universal parser (dispatch by extension)
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_table(&self, file_path: &Path) -> ImportResult<RawTable> {
        let ext = extension_of(file_path);
        match ext.as_str() {
            "csv" | "txt" => CsvParser.parse_table(file_path),
            e if SPREADSHEET_EXTENSIONS.contains(&e) => SpreadsheetParser.parse_table(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
