// ==========================================
// Test helpers
// ==========================================
// Record builders, input files and a fast configuration for the
// integration tests. Not every test binary uses every helper.
// ==========================================
#![allow(dead_code)]

use inventory_count_automation::config::AppConfig;
use inventory_count_automation::logging;
use inventory_count_automation::domain::{
    CountedRecord, LaunchRecord, LaunchSource, ReferenceRecord,
};
use rust_decimal::Decimal;
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal literal")
}

/// Counted record for plant 1000 / location 0001.
pub fn counted(document: &str, material: &str, bin: &str, quantity: &str) -> CountedRecord {
    CountedRecord {
        row_number: 1,
        material: material.to_string(),
        plant: Some("1000".to_string()),
        storage_location: Some("0001".to_string()),
        storage_type: None,
        storage_bin: if bin.is_empty() { None } else { Some(bin.to_string()) },
        counted_quantity: dec(quantity),
        document: if document.is_empty() { None } else { Some(document.to_string()) },
    }
}

/// Reference record for plant 1000 / location 0001; empty `ud` means none.
pub fn reference(material: &str, bin: &str, ud: &str, quantity: &str) -> ReferenceRecord {
    ReferenceRecord {
        row_number: 1,
        material: material.to_string(),
        plant: Some("1000".to_string()),
        storage_location: Some("0001".to_string()),
        storage_type: Some("J0A".to_string()),
        storage_bin: Some(bin.to_string()),
        ud: if ud.is_empty() { None } else { Some(ud.to_string()) },
        prior_quantity: dec(quantity),
        document: None,
    }
}

pub fn launch_record(document: &str, material: &str, bin: &str, quantity: &str) -> LaunchRecord {
    LaunchRecord {
        document: document.to_string(),
        material: material.to_string(),
        plant: "1000".to_string(),
        storage_location: "0001".to_string(),
        storage_type: "J0A".to_string(),
        storage_bin: bin.to_string(),
        ud: None,
        quantity: dec(quantity),
        is_last_in_document: false,
        source: LaunchSource::PassThrough,
    }
}

/// Defaults with screenshots written under `shots`.
pub fn test_config(shots: &Path) -> AppConfig {
    logging::init_test();
    let mut config = AppConfig::default();
    config.playback.screenshots_on_error = true;
    config.playback.screenshot_dir = shots.to_path_buf();
    config
}

pub fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write test input");
    path
}

pub const COUNTING_CSV: &str = "\
Documento Inventario;Material;Centro;Deposito;Posição no depósito;Qtd.contada
100;M-1;1000;0001;12345;6
100;M-2;1000;0001;A-01;4
200;M-3;1000;0001;B-02;0
";

pub const REFERENCE_CSV: &str = "\
Material;Centro;Deposito;Tipo de depósito;Posição no depósito;UD;Estoque total
M-1;1000;0001;J0A;12345;2;3
M-1;1000;0001;J0A;12345;1;5
M-3;1000;0001;J0A;B-02;7;2
";
