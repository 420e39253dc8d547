// ==========================================
// Importer integration tests
// ==========================================
// Files and the SQLite feed through the normalizer into launch plans
// ==========================================

mod helpers;

use helpers::{dec, write_file, COUNTING_CSV, REFERENCE_CSV};
use inventory_count_automation::batch::{
    plan_from_feed, plan_from_files, storage_codes_from_file, RunError,
};
use inventory_count_automation::domain::{LaunchSource, ZeroPolicy};
use inventory_count_automation::importer::{
    ImportError, NormalizeMode, RecordNormalizer, SqliteFeed,
};
use rusqlite::Connection;
use tempfile::TempDir;

#[test]
fn test_files_to_launch_plan() {
    println!("\n=== Test: counting + reference files -> launch plan ===");
    let dir = TempDir::new().unwrap();
    let counting = write_file(dir.path(), "counting.csv", COUNTING_CSV);
    let reference = write_file(dir.path(), "reference.csv", REFERENCE_CSV);
    let normalizer = RecordNormalizer::default();

    let plan = plan_from_files(&normalizer, &counting, Some(&reference), ZeroPolicy::Mark).unwrap();

    let summary: Vec<(String, Option<String>, String, bool)> = plan
        .records
        .iter()
        .map(|r| {
            (
                r.document.clone(),
                r.ud.clone(),
                r.quantity.to_string(),
                r.is_last_in_document,
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("100".to_string(), Some("1".to_string()), "3".to_string(), false),
            ("100".to_string(), Some("2".to_string()), "3".to_string(), false),
            ("100".to_string(), None, "4".to_string(), true),
            ("200".to_string(), Some("7".to_string()), "0".to_string(), true),
        ]
    );
    assert_eq!(plan.records[0].storage_bin, "0000012345", "5-digit bin padded");
    assert_eq!(plan.records[2].source, LaunchSource::PassThrough);
    assert!(plan.rejected.is_empty());
}

#[test]
fn test_skip_policy_drops_zero_ud() {
    let dir = TempDir::new().unwrap();
    let counting = write_file(dir.path(), "counting.csv", COUNTING_CSV);
    let reference = write_file(dir.path(), "reference.csv", REFERENCE_CSV);
    let normalizer = RecordNormalizer::default();

    let plan = plan_from_files(&normalizer, &counting, Some(&reference), ZeroPolicy::Skip).unwrap();

    assert_eq!(plan.records.len(), 3);
    assert!(plan.records.iter().all(|r| r.document == "100"));
    assert!(plan.records[2].is_last_in_document);
}

#[test]
fn test_repeated_reference_rows_each_reach_the_plan() {
    let dir = TempDir::new().unwrap();
    let counting = write_file(
        dir.path(),
        "counting.csv",
        "Documento Inventario;Material;Centro;Deposito;Posição no depósito;Qtd.contada\n\
         D1;M1;1000;0001;A-01;4\n",
    );
    let reference = write_file(
        dir.path(),
        "reference.csv",
        "Material;Centro;Deposito;Posição no depósito;UD;Estoque total;Lote\n\
         M1;1000;0001;A-01;;2;L1\n\
         M1;1000;0001;A-01;;2;L2\n",
    );
    let normalizer = RecordNormalizer::default();

    let plan = plan_from_files(&normalizer, &counting, Some(&reference), ZeroPolicy::Mark).unwrap();

    let sources: Vec<LaunchSource> = plan.records.iter().map(|r| r.source).collect();
    assert_eq!(
        sources,
        vec![LaunchSource::PassThrough, LaunchSource::NonUd, LaunchSource::NonUd]
    );
    assert_eq!(plan.records[0].quantity, dec("4"));
    assert_eq!(plan.records[1].quantity, dec("2"));
    assert_eq!(plan.records[2].quantity, dec("2"));
    assert!(plan.records[2].is_last_in_document);
}

#[test]
fn test_missing_document_column_is_schema_error() {
    let dir = TempDir::new().unwrap();
    let counting = write_file(
        dir.path(),
        "counting.csv",
        "Material,Plant,Storage Bin,Counted Quantity\nM-1,1000,A-01,3\n",
    );
    let normalizer = RecordNormalizer::default();

    let err = plan_from_files(&normalizer, &counting, None, ZeroPolicy::Mark).unwrap_err();
    assert!(err.is_schema_error(), "unexpected error: {}", err);
    match err {
        RunError::Import(ImportError::SchemaError { field, .. }) => assert_eq!(field, "document"),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_header_only_file_has_no_input() {
    let dir = TempDir::new().unwrap();
    let counting = write_file(
        dir.path(),
        "counting.csv",
        "Document;Material;Counted Quantity\n;;\n",
    );
    let normalizer = RecordNormalizer::default();

    let err = plan_from_files(&normalizer, &counting, None, ZeroPolicy::Mark).unwrap_err();
    assert!(matches!(err, RunError::NoInput(_)));
}

#[test]
fn test_unsupported_extension() {
    let dir = TempDir::new().unwrap();
    let path = write_file(dir.path(), "counting.pdf", "not a table");
    let normalizer = RecordNormalizer::default();

    let result = normalizer.load_file(&path, NormalizeMode::Counting);
    assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
}

#[test]
fn test_alt_quantity_fallback() {
    let dir = TempDir::new().unwrap();
    let counting = write_file(
        dir.path(),
        "counting.csv",
        "Document;Material;Counted Quantity;Counted Quantity in Alternative Unit of Measure\n\
         100;M-1;;2,5\n\
         100;M-2;;\n",
    );
    let normalizer = RecordNormalizer::default();

    let table = normalizer.load_file(&counting, NormalizeMode::Counting).unwrap();
    let records = normalizer.to_counted_records(&table.rows);
    assert_eq!(records[0].counted_quantity, dec("2.5"));
    assert_eq!(records[1].counted_quantity, dec("0"));
}

#[test]
fn test_feed_rows_resolve_documents_from_template() {
    println!("\n=== Test: SQLite feed -> document resolver -> launch plan ===");
    let dir = TempDir::new().unwrap();
    let template = write_file(
        dir.path(),
        "template.csv",
        "Documento Inventario;Material;Centro;Deposito;Tipo de depósito;\
         Posição no depósito;UD;Estoque total\n\
         100;M-1;1000;0001;J0A;12345;2;3\n\
         100;M-1;1000;0001;J0A;12345;1;5\n\
         200;M-3;1000;0001;J0A;B-02;7;2\n",
    );

    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE counts (material TEXT, plant TEXT, sloc TEXT, bin TEXT, qty REAL);
         INSERT INTO counts VALUES ('M-1', '1000', '0001', '12345', 6);
         INSERT INTO counts VALUES ('M-3', '1000', '0002', 'B-02', 1);
         INSERT INTO counts VALUES ('M-9', '1000', '0001', 'Z-99', 1);
         INSERT INTO counts VALUES ('M-5', NULL, '0001', 'X-01', 1);",
    )
    .unwrap();
    let feed = SqliteFeed::from_connection(conn, "memory");
    let query = "SELECT material AS \"Material\", plant AS \"Plant\", \
                 sloc AS \"Storage Location\", bin AS \"Storage Bin\", \
                 qty AS \"Counted Quantity\" FROM counts";
    let normalizer = RecordNormalizer::default();

    let (plan, stats) =
        plan_from_feed(&normalizer, &feed, query, &template, ZeroPolicy::Mark).unwrap();

    assert_eq!(stats.resolved_full, 1);
    assert_eq!(stats.resolved_material_bin, 1);
    assert_eq!(stats.unresolved, 1);
    assert_eq!(stats.incomplete, 1);

    let docs: Vec<&str> = plan.records.iter().map(|r| r.document.as_str()).collect();
    assert_eq!(docs, vec!["100", "100", "200"]);
    assert_eq!(plan.records[0].quantity, dec("3"));
    assert_eq!(plan.records[2].source, LaunchSource::PassThrough);
}

#[test]
fn test_storage_list_file() {
    let dir = TempDir::new().unwrap();
    let list = write_file(dir.path(), "storages.txt", "j0a\nJ0B;j0a\n\n");
    assert_eq!(storage_codes_from_file(&list).unwrap(), vec!["J0A", "J0B"]);

    let empty = write_file(dir.path(), "empty.txt", "\n ; \n");
    assert!(matches!(
        storage_codes_from_file(&empty),
        Err(RunError::NoInput(_))
    ));
}
