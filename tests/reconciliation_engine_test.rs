// ==========================================
// UD reconciliation engine tests
// ==========================================
// Sum invariant, idempotence, deficit ordering, surplus placement,
// zero floor, invalid inputs
// ==========================================

mod helpers;

use helpers::{dec, reference};
use inventory_count_automation::domain::ReferenceRecord;
use inventory_count_automation::engine::{
    check_sum_invariant, ReconciliationEngine, ReconciliationError,
};
use rust_decimal::Decimal;

fn adjusted(
    engine: &ReconciliationEngine,
    total: &str,
    records: &[ReferenceRecord],
) -> Vec<Decimal> {
    let refs: Vec<&ReferenceRecord> = records.iter().collect();
    engine
        .reconcile(dec(total), &refs)
        .expect("reconcile")
        .into_iter()
        .map(|r| r.adjusted)
        .collect()
}

#[test]
fn test_sum_invariant_for_every_delta_sign() {
    println!("\n=== Test: sum invariant ===");
    let engine = ReconciliationEngine::new();
    let records = vec![
        reference("M-1", "A-01", "1", "5"),
        reference("M-1", "A-01", "2", "3"),
        reference("M-1", "A-01", "3", "0.25"),
    ];

    for total in ["0", "2", "8.25", "8", "12.5", "100", "0.0001"] {
        let result = adjusted(&engine, total, &records);
        let sum: Decimal = result.iter().copied().sum();
        assert_eq!(sum, dec(total), "sum must equal counted total {}", total);
        assert!(
            result.iter().all(|q| !q.is_sign_negative() || q.is_zero()),
            "no negative quantity for total {}: {:?}",
            total,
            result
        );
        assert!(check_sum_invariant(dec(total), &result).is_ok());
    }
}

#[test]
fn test_idempotent_and_unchanged_when_balanced() {
    let engine = ReconciliationEngine::new();
    let records = vec![
        reference("M-1", "A-01", "1", "5"),
        reference("M-1", "A-01", "2", "3"),
    ];

    let first = adjusted(&engine, "6", &records);
    let second = adjusted(&engine, "6", &records);
    assert_eq!(first, second);

    let balanced = adjusted(&engine, "8", &records);
    assert_eq!(balanced, vec![dec("5"), dec("3")]);
}

#[test]
fn test_deficit_consumes_oldest_first() {
    let engine = ReconciliationEngine::new();
    let records = vec![
        reference("M-1", "A-01", "1", "5"),
        reference("M-1", "A-01", "2", "3"),
    ];
    assert_eq!(adjusted(&engine, "6", &records), vec![dec("3"), dec("3")]);
}

#[test]
fn test_surplus_goes_to_newest() {
    let engine = ReconciliationEngine::new();
    let records = vec![
        reference("M-1", "A-01", "1", "5"),
        reference("M-1", "A-01", "2", "3"),
    ];
    assert_eq!(adjusted(&engine, "10", &records), vec![dec("5"), dec("5")]);
}

#[test]
fn test_deficit_cascades_without_going_negative() {
    let engine = ReconciliationEngine::new();
    let records = vec![
        reference("M-1", "A-01", "1", "1"),
        reference("M-1", "A-01", "2", "4"),
        reference("M-1", "A-01", "3", "3"),
    ];
    assert_eq!(
        adjusted(&engine, "2", &records),
        vec![dec("0"), dec("0"), dec("2")]
    );
    assert_eq!(
        adjusted(&engine, "0", &records),
        vec![dec("0"), dec("0"), dec("0")]
    );
}

#[test]
fn test_records_are_ordered_by_numeric_ud() {
    let engine = ReconciliationEngine::new();
    // Given newest first; UD 9 sorts before UD 10 numerically
    let records = vec![
        reference("M-1", "A-01", "10", "3"),
        reference("M-1", "A-01", "9", "5"),
    ];
    let refs: Vec<&ReferenceRecord> = records.iter().collect();
    let result = engine.reconcile(dec("6"), &refs).unwrap();

    assert_eq!(result[0].record.ud.as_deref(), Some("9"));
    assert_eq!(result[0].adjusted, dec("3"));
    assert_eq!(result[1].record.ud.as_deref(), Some("10"));
    assert_eq!(result[1].adjusted, dec("3"));
}

#[test]
fn test_non_numeric_ud_sorts_first_and_absorbs_deficit() {
    let engine = ReconciliationEngine::new();
    let records = vec![
        reference("M-1", "A-01", "5", "2"),
        reference("M-1", "A-01", "X", "3"),
        reference("M-1", "A-01", "2", "4"),
    ];
    let refs: Vec<&ReferenceRecord> = records.iter().collect();
    let result = engine.reconcile(dec("6"), &refs).unwrap();

    let order: Vec<&str> = result
        .iter()
        .map(|r| r.record.ud.as_deref().unwrap_or(""))
        .collect();
    assert_eq!(order, vec!["X", "2", "5"]);
    assert_eq!(result[0].adjusted, dec("0"), "label without a number is consumed first");
    assert_eq!(result[1].adjusted, dec("4"));
    assert_eq!(result[2].adjusted, dec("2"));
}

#[test]
fn test_invalid_inputs_are_rejected() {
    let engine = ReconciliationEngine::new();

    let empty: Vec<&ReferenceRecord> = Vec::new();
    assert!(matches!(
        engine.reconcile(dec("1"), &empty),
        Err(ReconciliationError::EmptyGroup)
    ));

    let records = vec![reference("M-1", "A-01", "1", "5")];
    let refs: Vec<&ReferenceRecord> = records.iter().collect();
    assert!(matches!(
        engine.reconcile(dec("-1"), &refs),
        Err(ReconciliationError::NegativeCountedTotal(_))
    ));

    let negative = vec![reference("M-1", "A-01", "1", "-2")];
    let refs: Vec<&ReferenceRecord> = negative.iter().collect();
    assert!(matches!(
        engine.reconcile(dec("1"), &refs),
        Err(ReconciliationError::NegativePriorQuantity { .. })
    ));
}

#[test]
fn test_invariant_checker_flags_mismatch() {
    let result = check_sum_invariant(dec("6"), &[dec("3"), dec("2")]);
    assert!(matches!(
        result,
        Err(ReconciliationError::ReconciliationInvariantViolation { .. })
    ));
}
