// ==========================================
// Inventory Count Automation - batch runner
// ==========================================
// Sequential iteration over launch records or storage codes on one
// terminal session. Item failures are recorded and the loop moves on;
// run-scoped failures stop the run. Every exit path releases the
// session exactly once.
// ==========================================

use crate::automation::{warm_up, EntryDriver, Screenshots, StorageWorkflow};
use crate::batch::error::{RunError, RunResult};
use crate::batch::pipeline::plan_from_files;
use crate::batch::summary::RunSummary;
use crate::config::AppConfig;
use crate::engine::{Clock, LaunchPlan};
use crate::importer::RecordNormalizer;
use crate::terminal::Terminal;
use std::path::Path;
use tracing::{info, instrument, warn};

async fn release(terminal: &mut dyn Terminal) {
    match terminal.close().await {
        Ok(()) => info!("terminal session released"),
        Err(e) => warn!(error = %e, "terminal session close failed"),
    }
}

pub struct BatchRunner<'a> {
    config: &'a AppConfig,
    clock: &'a dyn Clock,
    screenshots: Screenshots,
}

impl<'a> BatchRunner<'a> {
    pub fn new(config: &'a AppConfig, clock: &'a dyn Clock) -> Self {
        Self {
            config,
            clock,
            screenshots: Screenshots::from_config(&config.playback),
        }
    }

    pub fn with_screenshots(mut self, screenshots: Screenshots) -> Self {
        self.screenshots = screenshots;
        self
    }

    // ==========================================
    // Launch records
    // ==========================================

    /// Drives every launch record of `plan`, then releases the session.
    pub async fn run_launch(
        &self,
        terminal: &mut dyn Terminal,
        plan: &LaunchPlan,
    ) -> RunResult<RunSummary> {
        let result = self.launch_items(terminal, plan).await;
        release(terminal).await;
        result
    }

    /// Loads the inputs and runs them. An input error still releases the session.
    pub async fn run_launch_files(
        &self,
        terminal: &mut dyn Terminal,
        normalizer: &RecordNormalizer,
        counting: &Path,
        reference: Option<&Path>,
    ) -> RunResult<RunSummary> {
        let result = match plan_from_files(
            normalizer,
            counting,
            reference,
            self.config.playback.zero_policy,
        ) {
            Ok(plan) => self.launch_items(terminal, &plan).await,
            Err(e) => Err(e),
        };
        release(terminal).await;
        result
    }

    #[instrument(skip_all, fields(records = plan.records.len()))]
    async fn launch_items(
        &self,
        terminal: &mut dyn Terminal,
        plan: &LaunchPlan,
    ) -> RunResult<RunSummary> {
        if plan.is_empty() {
            return Err(RunError::NoInput(format!(
                "launch plan is empty ({} counted records rejected)",
                plan.rejected.len()
            )));
        }

        warm_up(terminal, self.config, self.clock).await?;

        let mut summary = RunSummary::new("launch");
        summary.rejected = plan.rejected.clone();

        let mut driver = EntryDriver::new(self.config, self.clock, self.screenshots.clone());
        let total = plan.records.len();
        for (index, record) in plan.records.iter().enumerate() {
            info!(
                item = index + 1,
                total,
                doc = %record.document,
                material = %record.material,
                last_in_document = record.is_last_in_document,
                "processing launch record"
            );
            let result = driver.process(terminal, record).await;
            summary.record(result);
        }

        summary.finish();
        summary.log();
        Ok(summary)
    }

    // ==========================================
    // Storage codes
    // ==========================================

    /// Runs the storage workflow for every code, then releases the session.
    pub async fn run_storages(
        &self,
        terminal: &mut dyn Terminal,
        codes: &[String],
    ) -> RunResult<RunSummary> {
        let result = self.storage_items(terminal, codes).await;
        release(terminal).await;
        result
    }

    #[instrument(skip_all, fields(storages = codes.len()))]
    async fn storage_items(
        &self,
        terminal: &mut dyn Terminal,
        codes: &[String],
    ) -> RunResult<RunSummary> {
        if codes.is_empty() {
            return Err(RunError::NoInput("no storage codes given".to_string()));
        }

        warm_up(terminal, self.config, self.clock).await?;

        let mut summary = RunSummary::new("storages");
        let mut workflow = StorageWorkflow::new(self.config, self.clock, self.screenshots.clone());
        for (index, code) in codes.iter().enumerate() {
            info!(item = index + 1, total = codes.len(), storage = %code, "processing storage");
            let result = workflow.process(terminal, code).await;
            summary.record(result);
        }

        summary.finish();
        summary.log();
        Ok(summary)
    }
}
