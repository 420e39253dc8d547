// ==========================================
// Launch plan builder tests
// ==========================================
// Matching wildcards, UD expansion, non-UD carry-over, zero policy,
// last-in-document flags, rejections
// ==========================================

mod helpers;

use helpers::{counted, dec, launch_record, reference};
use inventory_count_automation::domain::{LaunchSource, ZeroPolicy};
use inventory_count_automation::engine::{mark_last_in_document, LaunchPlanBuilder};

#[test]
fn test_empty_bin_matches_every_bin() {
    let builder = LaunchPlanBuilder::new();
    let record = counted("100", "M-1", "", "4");
    let references = vec![
        reference("M-1", "A-01", "1", "1"),
        reference("M-1", "B-02", "2", "1"),
        reference("M-2", "A-01", "3", "1"),
    ];

    let group = builder.group(&record, &references);
    assert_eq!(group.matches.len(), 2, "bin filter absent: both M-1 bins match");

    let with_bin = counted("100", "M-1", "B-02", "4");
    let group = builder.group(&with_bin, &references);
    assert_eq!(group.matches.len(), 1);
    assert_eq!(group.matches[0].storage_bin.as_deref(), Some("B-02"));
}

#[test]
fn test_no_match_emits_single_pass_through() {
    let builder = LaunchPlanBuilder::new();
    let plan = builder.build(&[counted("100", "M-9", "A-01", "7.5")], &[], ZeroPolicy::Mark);

    assert_eq!(plan.records.len(), 1);
    let record = &plan.records[0];
    assert_eq!(record.source, LaunchSource::PassThrough);
    assert_eq!(record.quantity, dec("7.5"));
    assert_eq!(record.ud, None);
    assert!(record.is_last_in_document);
}

#[test]
fn test_ud_matches_expand_in_ud_order() {
    println!("\n=== Test: UD expansion ===");
    let builder = LaunchPlanBuilder::new();
    let references = vec![
        reference("M-1", "A-01", "2", "3"),
        reference("M-1", "A-01", "1", "5"),
    ];
    let plan = builder.build(&[counted("100", "M-1", "A-01", "6")], &references, ZeroPolicy::Mark);

    let uds: Vec<_> = plan.records.iter().map(|r| r.ud.clone().unwrap_or_default()).collect();
    assert_eq!(uds, vec!["1", "2"]);
    assert_eq!(plan.records[0].quantity, dec("3"));
    assert_eq!(plan.records[1].quantity, dec("3"));
    assert!(plan.records.iter().all(|r| r.source == LaunchSource::Reconciled));
    assert_eq!(plan.records[0].storage_type, "J0A", "resolved from the reference row");
}

#[test]
fn test_non_ud_rows_carry_prior_quantity() {
    let builder = LaunchPlanBuilder::new();
    let references = vec![
        reference("M-1", "A-01", "1", "5"),
        reference("M-1", "A-01", "", "9"),
    ];
    let plan = builder.build(&[counted("100", "M-1", "A-01", "2")], &references, ZeroPolicy::Mark);

    assert_eq!(plan.records.len(), 2);
    assert_eq!(plan.records[0].source, LaunchSource::Reconciled);
    assert_eq!(plan.records[0].quantity, dec("2"));
    assert_eq!(plan.records[1].source, LaunchSource::NonUd);
    assert_eq!(plan.records[1].quantity, dec("9"), "non-UD row is not reconciled");
}

#[test]
fn test_only_non_ud_matches_still_pass_through() {
    let builder = LaunchPlanBuilder::new();
    let references = vec![reference("M-1", "A-01", "", "9")];
    let plan = builder.build(&[counted("100", "M-1", "A-01", "4")], &references, ZeroPolicy::Mark);

    let sources: Vec<_> = plan.records.iter().map(|r| r.source).collect();
    assert_eq!(sources, vec![LaunchSource::PassThrough, LaunchSource::NonUd]);
    assert_eq!(plan.records[0].quantity, dec("4"));
}

#[test]
fn test_zero_policy() {
    let builder = LaunchPlanBuilder::new();
    let references = vec![
        reference("M-1", "A-01", "1", "5"),
        reference("M-1", "A-01", "2", "3"),
    ];
    let counted_records = [counted("100", "M-1", "A-01", "3")];

    let marked = builder.build(&counted_records, &references, ZeroPolicy::Mark);
    assert_eq!(marked.records.len(), 2);
    assert!(marked.records[0].quantity.is_zero());

    let skipped = builder.build(&counted_records, &references, ZeroPolicy::Skip);
    assert_eq!(skipped.records.len(), 1);
    assert_eq!(skipped.records[0].ud.as_deref(), Some("2"));
    assert_eq!(skipped.records[0].quantity, dec("3"));
}

#[test]
fn test_last_in_document_flags() {
    let mut records = vec![
        launch_record("D1", "M-1", "A", "1"),
        launch_record("D1", "M-2", "B", "1"),
        launch_record("D2", "M-3", "C", "1"),
    ];
    mark_last_in_document(&mut records);

    let flags: Vec<bool> = records.iter().map(|r| r.is_last_in_document).collect();
    assert_eq!(flags, vec![false, true, true]);
}

#[test]
fn test_plan_flags_span_counted_records() {
    let builder = LaunchPlanBuilder::new();
    let plan = builder.build(
        &[
            counted("100", "M-1", "A-01", "1"),
            counted("100", "M-2", "A-02", "1"),
            counted("200", "M-3", "A-03", "1"),
        ],
        &[],
        ZeroPolicy::Mark,
    );
    let flags: Vec<bool> = plan.records.iter().map(|r| r.is_last_in_document).collect();
    assert_eq!(flags, vec![false, true, true]);
}

#[test]
fn test_rejections_are_reported() {
    let builder = LaunchPlanBuilder::new();
    let references = vec![reference("M-2", "A-01", "1", "-1")];
    let plan = builder.build(
        &[
            counted("", "M-1", "A-01", "1"),
            counted("100", "M-2", "A-01", "1"),
            counted("100", "M-3", "A-01", "1"),
        ],
        &references,
        ZeroPolicy::Mark,
    );

    assert_eq!(plan.records.len(), 1);
    assert_eq!(plan.records[0].material, "M-3");
    assert_eq!(plan.rejected.len(), 2);
    assert_eq!(plan.rejected[0].reason, "missing document reference");
    assert_eq!(plan.rejected[1].material, "M-2");
}
