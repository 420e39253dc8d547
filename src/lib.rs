// ==========================================
// Inventory Count Automation - core library
// ==========================================
// Counting files + UD reference report -> reconciled launch records
// -> single-record entry on a remote warehouse terminal.
// Secondary entry point: storage-type transfer processing.
// ==========================================

// ==========================================
// Modules
// ==========================================

// Domain layer - records and outcome types
pub mod domain;

// Importer layer - Record Normalizer and data sources
pub mod importer;

// Engine layer - reconciliation, launch plan, retry policy
pub mod engine;

// Terminal capability and the simulated adapter
pub mod terminal;

// Automation layer - entry state machine, storage workflow
pub mod automation;

// Batch layer - run loop and summary
pub mod batch;

// Configuration
pub mod config;

// Logging
pub mod logging;

// ==========================================
// Re-exports
// ==========================================

pub use automation::{AutomationError, EntryDriver, StorageWorkflow};
pub use batch::{BatchRunner, RunError, RunSummary};
pub use config::AppConfig;
pub use domain::{CountedRecord, ItemResult, LaunchRecord, ReferenceRecord, RunOutcome, ZeroPolicy};
pub use engine::{LaunchPlan, LaunchPlanBuilder, ReconciliationEngine};
pub use importer::RecordNormalizer;
pub use terminal::{SimulatedTerminal, Terminal};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const APP_NAME: &str = "Inventory Count Automation";
