// ==========================================
// Inventory Count Automation - launch plan builder
// ==========================================
// Joins counted totals with reference rows and expands each group
// into launch records:
//   no UD-bearing match -> one pass-through record (full counted total)
//   UD-bearing matches  -> one record per UD (reconciled, zero policy)
//   non-UD matches      -> one record each, prior quantity unchanged
// Last-in-document flags are computed once over the final sequence.
// ==========================================

use crate::domain::{
    CountedRecord, LaunchRecord, LaunchSource, ReconciliationGroup, ReferenceRecord, ZeroPolicy,
};
use crate::engine::reconciliation::{check_sum_invariant, ReconciliationEngine};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

/// Counted record that produced no launch records, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectedRecord {
    pub row_number: usize,
    pub material: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LaunchPlan {
    pub records: Vec<LaunchRecord>,
    pub rejected: Vec<RejectedRecord>,
}

impl LaunchPlan {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

fn filter_matches(filter: &Option<String>, value: &Option<String>) -> bool {
    match filter {
        Some(wanted) => value.as_deref().map(str::trim) == Some(wanted.trim()),
        None => true,
    }
}

fn pick(reference: &Option<String>, counted: &Option<String>) -> String {
    reference
        .as_deref()
        .or(counted.as_deref())
        .unwrap_or("")
        .to_string()
}

pub struct LaunchPlanBuilder {
    engine: ReconciliationEngine,
}

impl Default for LaunchPlanBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LaunchPlanBuilder {
    pub fn new() -> Self {
        Self {
            engine: ReconciliationEngine::new(),
        }
    }

    /// Exact match on material; plant, location, type and bin filter only
    /// when the counted side carries a value.
    pub fn group<'a>(
        &self,
        counted: &'a CountedRecord,
        references: &'a [ReferenceRecord],
    ) -> ReconciliationGroup<'a> {
        let matches = references
            .iter()
            .filter(|r| r.material.trim() == counted.material.trim())
            .filter(|r| filter_matches(&counted.plant, &r.plant))
            .filter(|r| filter_matches(&counted.storage_location, &r.storage_location))
            .filter(|r| filter_matches(&counted.storage_type, &r.storage_type))
            .filter(|r| filter_matches(&counted.storage_bin, &r.storage_bin))
            .collect();
        ReconciliationGroup { counted, matches }
    }

    #[instrument(
        skip_all,
        fields(
            counted = counted.len(),
            references = references.len(),
            zero_policy = %zero_policy
        )
    )]
    pub fn build(
        &self,
        counted: &[CountedRecord],
        references: &[ReferenceRecord],
        zero_policy: ZeroPolicy,
    ) -> LaunchPlan {
        let mut plan = LaunchPlan::default();

        for record in counted {
            let document = match record.document.as_deref() {
                Some(doc) if !doc.trim().is_empty() => doc.trim().to_string(),
                _ => {
                    warn!(
                        record = %record.label(),
                        "counted record has no document reference, skipped"
                    );
                    plan.rejected.push(RejectedRecord {
                        row_number: record.row_number,
                        material: record.material.clone(),
                        reason: "missing document reference".to_string(),
                    });
                    continue;
                }
            };

            let group = self.group(record, references);
            match self.expand(&group, &document, zero_policy) {
                Ok(mut records) => plan.records.append(&mut records),
                Err(reason) => {
                    warn!(record = %record.label(), reason = %reason, "counted record rejected");
                    plan.rejected.push(RejectedRecord {
                        row_number: record.row_number,
                        material: record.material.clone(),
                        reason,
                    });
                }
            }
        }

        mark_last_in_document(&mut plan.records);
        info!(
            launch_records = plan.records.len(),
            rejected = plan.rejected.len(),
            "launch plan built"
        );
        plan
    }

    fn expand(
        &self,
        group: &ReconciliationGroup<'_>,
        document: &str,
        zero_policy: ZeroPolicy,
    ) -> Result<Vec<LaunchRecord>, String> {
        let counted = group.counted;
        let mut out = Vec::new();

        let ud_rows = group.ud_bearing();
        let non_ud_rows = group.non_ud();
        debug!(
            material = %counted.material,
            uds = ud_rows.len(),
            non_ud = non_ud_rows.len(),
            "reference rows matched"
        );

        if ud_rows.is_empty() {
            if group.matches.is_empty() {
                debug!(
                    material = %counted.material,
                    "no reference rows, single pass-through record"
                );
            }
            out.push(LaunchRecord {
                document: document.to_string(),
                material: counted.material.clone(),
                plant: counted.plant.clone().unwrap_or_default(),
                storage_location: counted.storage_location.clone().unwrap_or_default(),
                storage_type: counted.storage_type.clone().unwrap_or_default(),
                storage_bin: counted.storage_bin.clone().unwrap_or_default(),
                ud: None,
                quantity: counted.counted_quantity,
                is_last_in_document: false,
                source: LaunchSource::PassThrough,
            });
        } else {
            let reconciled = self
                .engine
                .reconcile(counted.counted_quantity, &ud_rows)
                .map_err(|e| e.to_string())?;

            let adjusted: Vec<_> = reconciled.iter().map(|r| r.adjusted).collect();
            debug_assert!(check_sum_invariant(counted.counted_quantity, &adjusted).is_ok());

            for ud in reconciled {
                if ud.adjusted.is_zero() && zero_policy == ZeroPolicy::Skip {
                    info!(
                        material = %counted.material,
                        ud = ud.record.ud.as_deref().unwrap_or(""),
                        "zero-quantity UD skipped"
                    );
                    continue;
                }
                out.push(self.from_reference(
                    ud.record,
                    counted,
                    document,
                    ud.adjusted,
                    LaunchSource::Reconciled,
                ));
            }
        }

        for reference in non_ud_rows {
            out.push(self.from_reference(
                reference,
                counted,
                document,
                reference.prior_quantity,
                LaunchSource::NonUd,
            ));
        }

        Ok(out)
    }

    fn from_reference(
        &self,
        reference: &ReferenceRecord,
        counted: &CountedRecord,
        document: &str,
        quantity: rust_decimal::Decimal,
        source: LaunchSource,
    ) -> LaunchRecord {
        LaunchRecord {
            document: document.to_string(),
            material: reference.material.clone(),
            plant: pick(&reference.plant, &counted.plant),
            storage_location: pick(&reference.storage_location, &counted.storage_location),
            storage_type: pick(&reference.storage_type, &counted.storage_type),
            storage_bin: pick(&reference.storage_bin, &counted.storage_bin),
            ud: reference.ud.clone().filter(|u| !u.is_empty()),
            quantity,
            is_last_in_document: false,
            source,
        }
    }
}

/// A record is last in its document when the next record belongs to a
/// different document, or when it is the final record.
pub fn mark_last_in_document(records: &mut [LaunchRecord]) {
    let len = records.len();
    for i in 0..len {
        records[i].is_last_in_document =
            i + 1 == len || records[i + 1].document != records[i].document;
    }
}
