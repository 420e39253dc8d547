// ==========================================
// Inventory Count Automation - shared enums
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Canonical Field
// ==========================================
// Every input column is mapped onto one of these before any
// business rule looks at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Document,
    Material,
    Plant,
    StorageLocation,
    StorageType,
    StorageBin,
    CountedQuantity,
    AltQuantity,
    StockTotal,
    Ud,
}

impl CanonicalField {
    pub const ALL: [CanonicalField; 10] = [
        CanonicalField::Document,
        CanonicalField::Material,
        CanonicalField::Plant,
        CanonicalField::StorageLocation,
        CanonicalField::StorageType,
        CanonicalField::StorageBin,
        CanonicalField::CountedQuantity,
        CanonicalField::AltQuantity,
        CanonicalField::StockTotal,
        CanonicalField::Ud,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CanonicalField::Document => "document",
            CanonicalField::Material => "material",
            CanonicalField::Plant => "plant",
            CanonicalField::StorageLocation => "storage_location",
            CanonicalField::StorageType => "storage_type",
            CanonicalField::StorageBin => "storage_bin",
            CanonicalField::CountedQuantity => "counted_quantity",
            CanonicalField::AltQuantity => "alt_quantity",
            CanonicalField::StockTotal => "stock_total",
            CanonicalField::Ud => "ud",
        }
    }
}

impl fmt::Display for CanonicalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ==========================================
// Zero Policy
// ==========================================
// What to do with a UD whose reconciled quantity is exactly zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZeroPolicy {
    /// Keep the record and flag it as zero stock on the entry form
    #[default]
    Mark,
    /// Drop the record from the plan
    Skip,
}

impl ZeroPolicy {
    /// Lenient parse used for environment overrides; unknown values fall back to `Mark`.
    pub fn from_str(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "skip" => ZeroPolicy::Skip,
            _ => ZeroPolicy::Mark,
        }
    }
}

impl fmt::Display for ZeroPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ZeroPolicy::Mark => write!(f, "mark"),
            ZeroPolicy::Skip => write!(f, "skip"),
        }
    }
}

// ==========================================
// Run Outcome
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunOutcome {
    Ok,
    Error,
    Skipped,
    /// Storage workflow only: a transfer was already running for the storage
    TransferActive,
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Ok => write!(f, "OK"),
            RunOutcome::Error => write!(f, "ERROR"),
            RunOutcome::Skipped => write!(f, "SKIPPED"),
            RunOutcome::TransferActive => write!(f, "TRANSFER_ACTIVE"),
        }
    }
}

// ==========================================
// Launch Source
// ==========================================
// How a launch record came out of the plan builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LaunchSource {
    /// No UD-bearing match: full counted total
    PassThrough,
    /// One reconciled UD
    Reconciled,
    /// Reference row without UD, prior quantity carried unchanged
    NonUd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_policy_from_str() {
        assert_eq!(ZeroPolicy::from_str("skip"), ZeroPolicy::Skip);
        assert_eq!(ZeroPolicy::from_str(" SKIP "), ZeroPolicy::Skip);
        assert_eq!(ZeroPolicy::from_str("mark"), ZeroPolicy::Mark);
        assert_eq!(ZeroPolicy::from_str("whatever"), ZeroPolicy::Mark);
    }

    #[test]
    fn test_run_outcome_display() {
        assert_eq!(RunOutcome::Ok.to_string(), "OK");
        assert_eq!(RunOutcome::TransferActive.to_string(), "TRANSFER_ACTIVE");
        let json = serde_json::to_string(&RunOutcome::Skipped).unwrap();
        assert_eq!(json, "\"SKIPPED\"");
    }
}
