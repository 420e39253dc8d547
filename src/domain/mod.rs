// ==========================================
// Inventory Count Automation - domain layer
// ==========================================
// Responsibility: plain data carried between the normalizer,
// the plan builder, the terminal state machines and the batch runner
// Boundary: no I/O, no terminal access
// ==========================================

pub mod inventory;
pub mod outcome;
pub mod quantity;
pub mod types;

pub use inventory::{
    CanonicalRow, CountedRecord, LaunchRecord, ReconciliationGroup, ReferenceRecord,
};
pub use outcome::ItemResult;
pub use quantity::format_quantity;
pub use types::{CanonicalField, LaunchSource, RunOutcome, ZeroPolicy};
