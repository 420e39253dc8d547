// ==========================================
// Inventory Count Automation - UD reconciliation engine
// ==========================================
// Input: one counted total + the UD sub-records of a material/bin key
// Output: one adjusted quantity per UD, ascending UD order
// Rules:
//   delta == 0 -> unchanged
//   delta <  0 -> deficit consumed from the oldest UD forward
//   delta >  0 -> surplus added to the newest UD only
// Invariant: sum(output) == counted total at display precision
// ==========================================

use crate::domain::quantity::QUANTITY_SCALE;
use crate::domain::ReferenceRecord;
use crate::engine::error::{ReconciliationError, ReconciliationResult};
use rust_decimal::Decimal;
use tracing::debug;

/// One UD paired with its adjusted quantity.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconciledUd<'a> {
    pub record: &'a ReferenceRecord,
    pub original: Decimal,
    pub adjusted: Decimal,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct ReconciliationEngine;

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self
    }

    /// Reconciles `counted_total` against UD sub-records.
    ///
    /// Records are ordered by numeric UD (non-numeric labels count as 0 and
    /// keep their input order among themselves). Zero results are returned;
    /// whether to launch them is the caller's zero policy.
    pub fn reconcile<'a>(
        &self,
        counted_total: Decimal,
        sub_records: &[&'a ReferenceRecord],
    ) -> ReconciliationResult<Vec<ReconciledUd<'a>>> {
        let mut ordered: Vec<&'a ReferenceRecord> = sub_records.to_vec();
        ordered.sort_by_key(|r| r.ud_number());

        for record in &ordered {
            if record.prior_quantity.is_sign_negative() && !record.prior_quantity.is_zero() {
                return Err(ReconciliationError::NegativePriorQuantity {
                    ud: record.ud.clone().unwrap_or_default(),
                    quantity: record.prior_quantity,
                });
            }
        }

        let original: Vec<Decimal> = ordered.iter().map(|r| r.prior_quantity).collect();
        let adjusted = self.reconcile_quantities(counted_total, &original)?;

        Ok(ordered
            .into_iter()
            .zip(original)
            .zip(adjusted)
            .map(|((record, original), adjusted)| ReconciledUd {
                record,
                original,
                adjusted,
            })
            .collect())
    }

    /// Core allocation over quantities already in ascending UD order.
    pub fn reconcile_quantities(
        &self,
        counted_total: Decimal,
        original: &[Decimal],
    ) -> ReconciliationResult<Vec<Decimal>> {
        if original.is_empty() {
            return Err(ReconciliationError::EmptyGroup);
        }
        if counted_total.is_sign_negative() && !counted_total.is_zero() {
            return Err(ReconciliationError::NegativeCountedTotal(counted_total));
        }

        let sum: Decimal = original.iter().copied().sum();
        let delta = counted_total - sum;
        let mut adjusted = original.to_vec();

        if delta.is_zero() {
            debug!(total = %counted_total, "delta is zero, quantities unchanged");
            return Ok(adjusted);
        }

        if delta < Decimal::ZERO {
            // Oldest stock is consumed first
            let mut remaining = -delta;
            for qty in adjusted.iter_mut() {
                if remaining.is_zero() {
                    break;
                }
                let take = remaining.min(*qty);
                *qty -= take;
                remaining -= take;
            }
        } else if let Some(newest) = adjusted.last_mut() {
            *newest += delta;
        }

        debug!(
            total = %counted_total,
            delta = %delta,
            uds = adjusted.len(),
            "UD quantities reconciled"
        );
        Ok(adjusted)
    }
}

/// Verifies that `adjusted` sums to `counted_total` at display precision.
pub fn check_sum_invariant(
    counted_total: Decimal,
    adjusted: &[Decimal],
) -> ReconciliationResult<()> {
    let actual: Decimal = adjusted.iter().copied().sum();
    let expected = counted_total.round_dp(QUANTITY_SCALE);
    if actual.round_dp(QUANTITY_SCALE) != expected {
        return Err(ReconciliationError::ReconciliationInvariantViolation { expected, actual });
    }
    Ok(())
}
