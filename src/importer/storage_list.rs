// ==========================================
// Inventory Count Automation - storage-code list
// ==========================================
// Input format: codes separated by newlines and/or semicolons
// Output: upper-cased, trimmed, first-seen order, no duplicates
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

pub fn parse_storage_codes(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    text.trim_start_matches('\u{feff}')
        .split(['\n', ';'])
        .map(|code| code.trim().to_uppercase())
        .filter(|code| !code.is_empty())
        .filter(|code| seen.insert(code.clone()))
        .collect()
}

pub fn load_storage_codes(path: &Path) -> ImportResult<Vec<String>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let text = std::fs::read_to_string(path)?;
    let codes = parse_storage_codes(&text);
    info!(path = %path.display(), count = codes.len(), "storage codes loaded");
    Ok(codes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mixed_separators_dedup_in_order() {
        let codes = parse_storage_codes("a01;B02\r\n a01 \n\nc03;b02;");
        assert_eq!(codes, vec!["A01", "B02", "C03"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_storage_codes("").is_empty());
        assert!(parse_storage_codes(" ;\n ; ").is_empty());
    }
}
