// ==========================================
// Inventory Count Automation - inventory records
// ==========================================
// Flow: CanonicalRow (normalizer) -> CountedRecord / ReferenceRecord
//       -> ReconciliationGroup -> LaunchRecord (terminal unit of work)
// ==========================================

use crate::domain::types::{CanonicalField, LaunchSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

// ==========================================
// CanonicalRow - one normalized input row
// ==========================================
// All values are trimmed strings; an empty string means the column
// was absent or blank. Quantities stay textual until the record
// builders parse them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CanonicalRow {
    /// 1-based data row number in the source (header excluded)
    pub row_number: usize,
    pub document: String,
    pub material: String,
    pub plant: String,
    pub storage_location: String,
    pub storage_type: String,
    pub storage_bin: String,
    pub counted_quantity: String,
    pub alt_quantity: String,
    pub stock_total: String,
    pub ud: String,
}

impl CanonicalRow {
    pub fn get(&self, field: CanonicalField) -> &str {
        match field {
            CanonicalField::Document => &self.document,
            CanonicalField::Material => &self.material,
            CanonicalField::Plant => &self.plant,
            CanonicalField::StorageLocation => &self.storage_location,
            CanonicalField::StorageType => &self.storage_type,
            CanonicalField::StorageBin => &self.storage_bin,
            CanonicalField::CountedQuantity => &self.counted_quantity,
            CanonicalField::AltQuantity => &self.alt_quantity,
            CanonicalField::StockTotal => &self.stock_total,
            CanonicalField::Ud => &self.ud,
        }
    }

    pub fn set(&mut self, field: CanonicalField, value: String) {
        let slot = match field {
            CanonicalField::Document => &mut self.document,
            CanonicalField::Material => &mut self.material,
            CanonicalField::Plant => &mut self.plant,
            CanonicalField::StorageLocation => &mut self.storage_location,
            CanonicalField::StorageType => &mut self.storage_type,
            CanonicalField::StorageBin => &mut self.storage_bin,
            CanonicalField::CountedQuantity => &mut self.counted_quantity,
            CanonicalField::AltQuantity => &mut self.alt_quantity,
            CanonicalField::StockTotal => &mut self.stock_total,
            CanonicalField::Ud => &mut self.ud,
        };
        *slot = value;
    }

    /// True when every canonical field is empty.
    pub fn is_blank(&self) -> bool {
        CanonicalField::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

// ==========================================
// CountedRecord - what was actually counted
// ==========================================
// Optional identity fields act as wildcards when matching references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountedRecord {
    pub row_number: usize,
    pub material: String,
    pub plant: Option<String>,
    pub storage_location: Option<String>,
    pub storage_type: Option<String>,
    pub storage_bin: Option<String>,
    pub counted_quantity: Decimal,
    pub document: Option<String>,
}

impl CountedRecord {
    /// Short identity used in logs and rejection reasons.
    pub fn label(&self) -> String {
        format!(
            "row {} material {} bin {}",
            self.row_number,
            self.material,
            self.storage_bin.as_deref().unwrap_or("*")
        )
    }
}

// ==========================================
// ReferenceRecord - one historical sub-record
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub row_number: usize,
    pub material: String,
    pub plant: Option<String>,
    pub storage_location: Option<String>,
    pub storage_type: Option<String>,
    pub storage_bin: Option<String>,
    pub ud: Option<String>,
    pub prior_quantity: Decimal,
    pub document: Option<String>,
}

impl ReferenceRecord {
    pub fn has_ud(&self) -> bool {
        self.ud.as_deref().map(|u| !u.is_empty()).unwrap_or(false)
    }

    /// Numeric UD used for ordering; non-numeric or missing labels count as 0.
    pub fn ud_number(&self) -> i64 {
        self.ud
            .as_deref()
            .and_then(|u| u.trim().parse::<i64>().ok())
            .unwrap_or(0)
    }
}

// ==========================================
// ReconciliationGroup - join result
// ==========================================
#[derive(Debug, Clone)]
pub struct ReconciliationGroup<'a> {
    pub counted: &'a CountedRecord,
    pub matches: Vec<&'a ReferenceRecord>,
}

impl<'a> ReconciliationGroup<'a> {
    /// UD-bearing matches in ascending UD order (stable for equal UDs).
    pub fn ud_bearing(&self) -> Vec<&'a ReferenceRecord> {
        let mut with_ud: Vec<&ReferenceRecord> =
            self.matches.iter().copied().filter(|r| r.has_ud()).collect();
        with_ud.sort_by_key(|r| r.ud_number());
        with_ud
    }

    pub fn non_ud(&self) -> Vec<&'a ReferenceRecord> {
        self.matches.iter().copied().filter(|r| !r.has_ud()).collect()
    }
}

// ==========================================
// LaunchRecord - unit of work for the terminal
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub document: String,
    pub material: String,
    pub plant: String,
    pub storage_location: String,
    pub storage_type: String,
    pub storage_bin: String,
    pub ud: Option<String>,
    pub quantity: Decimal,
    pub is_last_in_document: bool,
    pub source: LaunchSource,
}

impl LaunchRecord {
    /// Identity used as the summary key.
    pub fn item_key(&self) -> String {
        match &self.ud {
            Some(ud) => format!(
                "{}|{}|{}|{}",
                self.document, self.material, self.storage_bin, ud
            ),
            None => format!("{}|{}|{}", self.document, self.material, self.storage_bin),
        }
    }
}
