// ==========================================
// Inventory Count Automation - data cleaner
// ==========================================
// Stage 2 of the normalizer
// Rules: TRIM / header folding / locale quantities / bin width
// ==========================================

use crate::importer::normalizer_trait::DataCleaner as DataCleanerTrait;
use rust_decimal::Decimal;
use std::str::FromStr;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Bins with this many digits or more (and fewer than `BIN_WIDTH`) are left-padded.
const BIN_PAD_MIN_LEN: usize = 5;
const BIN_WIDTH: usize = 10;

pub struct DataCleaner;

/// Removes combining marks after canonical decomposition ("Depósito" -> "Deposito").
pub fn strip_diacritics(value: &str) -> String {
    value.nfd().filter(|c| !is_combining_mark(*c)).collect()
}

impl DataCleanerTrait for DataCleaner {
    fn clean_text(&self, value: &str, uppercase: bool) -> String {
        let trimmed = value.trim();
        if uppercase {
            trimmed.to_uppercase()
        } else {
            trimmed.to_string()
        }
    }

    fn normalize_header(&self, header: &str) -> String {
        strip_diacritics(header.trim_start_matches('\u{feff}'))
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn parse_quantity(&self, value: &str) -> Decimal {
        let mut s = value.trim().replace(' ', "");
        if s.is_empty() {
            return Decimal::ZERO;
        }

        // "1.234,5": dots are thousands separators
        if s.contains(',') && s.contains('.') {
            s = s.replace('.', "");
        }
        let s = s.replace(',', ".");

        Decimal::from_str(&s)
            .or_else(|_| Decimal::from_scientific(&s))
            .unwrap_or(Decimal::ZERO)
    }

    fn fix_storage_bin(&self, value: &str) -> String {
        let s = value.trim();
        let digits = s.strip_suffix(".0").unwrap_or(s);
        if digits.is_empty() || !digits.chars().all(|c| c.is_ascii_digit()) {
            return s.to_string();
        }
        if (BIN_PAD_MIN_LEN..BIN_WIDTH).contains(&digits.len()) {
            format!("{:0>width$}", digits, width = BIN_WIDTH)
        } else {
            digits.to_string()
        }
    }

    fn is_missing(&self, value: &str) -> bool {
        let t = value.trim();
        t.is_empty() || t.eq_ignore_ascii_case("nan")
    }
}
