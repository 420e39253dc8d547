// ==========================================
// Inventory Count Automation - engine errors
// ==========================================

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconciliationError {
    #[error("reconciliation needs at least one UD sub-record")]
    EmptyGroup,

    #[error("counted total is negative: {0}")]
    NegativeCountedTotal(Decimal),

    #[error("UD {ud} has a negative prior quantity: {quantity}")]
    NegativePriorQuantity { ud: String, quantity: Decimal },

    #[error("adjusted quantities sum to {actual}, expected {expected}")]
    ReconciliationInvariantViolation { expected: Decimal, actual: Decimal },
}

pub type ReconciliationResult<T> = Result<T, ReconciliationError>;
