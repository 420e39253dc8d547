// ==========================================
// Inventory Count Automation - storage-type workflow
// ==========================================
// One storage code through the transfer transaction:
//   Start -> VariantSelected -> StorageTypeSet -> F8Triggered
//         -> {TransferActive | ActivatePending | NoIndicator} -> Exited
// followed by the background-job trigger in the batch queue, which
// runs for every branch unless the storage item itself errored.
// ==========================================

use crate::automation::error::{AutomationError, AutomationResult};
use crate::automation::screenshots::Screenshots;
use crate::automation::waits::poll_until_visible;
use crate::config::AppConfig;
use crate::domain::{ItemResult, RunOutcome};
use crate::engine::{Clock, Deadline, RetryPolicy};
use crate::terminal::{controls, Control, Key, Terminal};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

const INDICATORS: [Control; 2] = [controls::TRANSFER_ACTIVE_CELL, controls::ACTIVATE_BUTTON];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    Start,
    VariantSelected,
    StorageTypeSet,
    F8Triggered,
    Exited,
}

/// What the screen showed after F8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detection {
    TransferActive,
    ActivationAvailable,
    /// The storage field left the screen: something happened, no indicator seen
    FieldGone,
}

/// Branch taken for a storage code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOutcome {
    TransferActive,
    Activated,
    /// Screen changed after F8 but showed neither indicator
    ScreenChanged,
    NoIndicator,
}

impl StorageOutcome {
    pub fn run_outcome(&self) -> RunOutcome {
        match self {
            StorageOutcome::TransferActive => RunOutcome::TransferActive,
            _ => RunOutcome::Ok,
        }
    }

    pub fn describe(&self) -> &'static str {
        match self {
            StorageOutcome::TransferActive => "transfer already active",
            StorageOutcome::Activated => "activated",
            StorageOutcome::ScreenChanged => "screen changed, no indicator",
            StorageOutcome::NoIndicator => "no indicator",
        }
    }
}

pub struct StorageWorkflow<'a> {
    config: &'a AppConfig,
    clock: &'a dyn Clock,
    screenshots: Screenshots,
    state: WorkflowState,
}

impl<'a> StorageWorkflow<'a> {
    pub fn new(config: &'a AppConfig, clock: &'a dyn Clock, screenshots: Screenshots) -> Self {
        Self {
            config,
            clock,
            screenshots,
            state: WorkflowState::Start,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Processes one storage code; failures are reported, not raised.
    pub async fn process(&mut self, terminal: &mut dyn Terminal, storage: &str) -> ItemResult {
        let storage = storage.trim().to_uppercase();

        let outcome = match self.run(terminal, &storage).await {
            Ok(outcome) => outcome,
            Err(e) => return self.fail(terminal, &storage, e).await,
        };

        if let Err(e) = self.trigger_background_job(terminal).await {
            return self.fail(terminal, &storage, e).await;
        }

        ItemResult::new(storage, outcome.run_outcome()).with_detail(outcome.describe())
    }

    async fn fail(
        &mut self,
        terminal: &mut dyn Terminal,
        storage: &str,
        e: AutomationError,
    ) -> ItemResult {
        error!(
            storage = %storage,
            state = ?self.state,
            code = e.code(),
            hint = e.hint(),
            error = %e,
            "storage item failed"
        );
        let path = self.screenshots.exception_path(storage);
        self.screenshots.capture(terminal, path).await;
        self.exit_to_home(terminal).await;
        ItemResult::new(storage, RunOutcome::Error).with_detail(format!("{}: {}", e.code(), e))
    }

    /// Runs the transfer transaction up to the exit, without the background job.
    #[instrument(skip_all, fields(storage = %storage))]
    pub async fn run(
        &mut self,
        terminal: &mut dyn Terminal,
        storage: &str,
    ) -> AutomationResult<StorageOutcome> {
        self.state = WorkflowState::Start;

        let code = &self.config.terminal.storage_transaction;
        info!(transaction = %code, "opening storage transaction");
        terminal.open_transaction(code).await?;
        self.wait_for(terminal, &controls::GET_VARIANT_BUTTON).await?;

        // Start -> VariantSelected
        self.select_variant(terminal).await?;
        self.state = WorkflowState::VariantSelected;

        // VariantSelected -> StorageTypeSet
        self.set_storage_type(terminal, storage).await?;
        self.state = WorkflowState::StorageTypeSet;

        // StorageTypeSet -> F8Triggered
        self.press_f8(terminal).await?;
        self.state = WorkflowState::F8Triggered;
        let path = self.screenshots.after_f8_path(storage);
        self.screenshots.capture(terminal, path).await;

        let detection = self.detect_with_retries(terminal, storage).await?;

        // F8Triggered -> Exited
        let outcome = match detection {
            Some(Detection::TransferActive) => {
                warn!(storage = %storage, "transfer already active, storage aborted");
                let path = self.screenshots.transfer_active_path(storage);
                self.screenshots.capture(terminal, path).await;
                StorageOutcome::TransferActive
            }
            Some(Detection::ActivationAvailable) => {
                terminal.click_control(&controls::ACTIVATE_BUTTON).await?;
                info!(storage = %storage, "activation clicked");
                self.clock.sleep(self.config.settle()).await;
                StorageOutcome::Activated
            }
            Some(Detection::FieldGone) => {
                info!(storage = %storage, "screen changed without an indicator");
                StorageOutcome::ScreenChanged
            }
            None => {
                info!(storage = %storage, "no indicator after F8");
                StorageOutcome::NoIndicator
            }
        };

        self.exit_to_home(terminal).await;
        self.state = WorkflowState::Exited;
        Ok(outcome)
    }

    // ==========================================
    // Steps
    // ==========================================

    async fn wait_for(
        &self,
        terminal: &mut dyn Terminal,
        control: &Control,
    ) -> AutomationResult<()> {
        if poll_until_visible(
            &*terminal,
            self.clock,
            control,
            self.config.default_timeout(),
            self.config.poll_interval(),
        )
        .await
        {
            Ok(())
        } else {
            Err(AutomationError::ElementNotFound(control.to_string()))
        }
    }

    async fn select_variant(&self, terminal: &mut dyn Terminal) -> AutomationResult<()> {
        let variant = &self.config.terminal.variant_name;
        debug!(variant = %variant, "selecting variant");

        terminal.click_control(&controls::GET_VARIANT_BUTTON).await?;
        self.clock.sleep(self.config.settle()).await;

        let row = controls::variant_row(variant);
        self.wait_for(terminal, &row).await?;
        terminal.click_control(&row).await?;
        terminal.click_control(&controls::CHOOSE_BUTTON).await?;
        self.clock.sleep(self.config.settle()).await;

        self.wait_for(terminal, &controls::STORAGE_TYPE_FIELD).await?;
        info!(variant = %variant, "variant loaded");
        Ok(())
    }

    async fn set_storage_type(
        &self,
        terminal: &mut dyn Terminal,
        storage: &str,
    ) -> AutomationResult<()> {
        terminal.fill_field(&controls::STORAGE_TYPE_FIELD, "").await?;
        terminal.fill_field(&controls::STORAGE_TYPE_FIELD, storage).await?;
        terminal
            .press_key(Some(&controls::STORAGE_TYPE_FIELD), Key::Enter)
            .await?;
        self.clock.sleep(self.config.settle()).await;
        info!(storage = %storage, "storage type set");
        Ok(())
    }

    async fn press_f8(&self, terminal: &mut dyn Terminal) -> AutomationResult<()> {
        for press in 1..=self.config.storage.f8_press_count.max(1) {
            terminal.press_key(None, Key::F8).await?;
            debug!(press, "F8 sent");
        }
        Ok(())
    }

    /// Quick detection after each F8, re-pressing with a re-validated
    /// field between attempts; one long indicator-only pass at the end.
    async fn detect_with_retries(
        &self,
        terminal: &mut dyn Terminal,
        storage: &str,
    ) -> AutomationResult<Option<Detection>> {
        let storage_cfg = &self.config.storage;
        let policy = RetryPolicy::new(
            storage_cfg.f8_retry_attempts,
            Duration::from_millis(storage_cfg.f8_retry_interval_ms),
        );

        let mut detection = None;
        for attempt in policy.attempts() {
            self.clock
                .sleep(Duration::from_millis(storage_cfg.post_f8_pause_ms))
                .await;
            detection = self.quick_detection(terminal).await;
            if let Some(found) = detection {
                info!(attempt, detection = ?found, "F8 took effect");
                break;
            }
            if policy.is_last(attempt) {
                break;
            }

            warn!(attempt, "no reaction to F8, retrying");
            policy.backoff(self.clock).await;
            if let Some(gone) = self.refresh_storage_field(terminal, storage).await? {
                detection = Some(gone);
                break;
            }
            self.press_f8(terminal).await?;
        }

        let needs_full_pass = !matches!(
            detection,
            Some(Detection::TransferActive) | Some(Detection::ActivationAvailable)
        );
        if needs_full_pass && storage_cfg.final_full_detection {
            debug!("full detection pass");
            if let Some(found) = self
                .detect_indicators(
                    terminal,
                    Duration::from_millis(storage_cfg.full_detection_timeout_ms),
                    self.config.poll_interval(),
                    false,
                )
                .await
            {
                detection = Some(found);
            }
        }
        Ok(detection)
    }

    async fn quick_detection(&self, terminal: &mut dyn Terminal) -> Option<Detection> {
        self.detect_indicators(
            terminal,
            Duration::from_millis(self.config.storage.quick_detection_timeout_ms),
            Duration::from_millis(self.config.storage.quick_detection_poll_ms),
            true,
        )
        .await
    }

    /// Indicators win over a vanished field.
    async fn detect_indicators(
        &self,
        terminal: &mut dyn Terminal,
        timeout: Duration,
        interval: Duration,
        field_gone_counts: bool,
    ) -> Option<Detection> {
        let deadline = Deadline::after(self.clock, timeout);
        loop {
            for indicator in INDICATORS.iter() {
                if terminal.is_visible(indicator).await {
                    return Some(if *indicator == controls::TRANSFER_ACTIVE_CELL {
                        Detection::TransferActive
                    } else {
                        Detection::ActivationAvailable
                    });
                }
            }
            if field_gone_counts && !terminal.is_visible(&controls::STORAGE_TYPE_FIELD).await {
                return Some(Detection::FieldGone);
            }
            if deadline.expired(self.clock) {
                return None;
            }
            self.clock.sleep(interval).await;
        }
    }

    /// Puts `storage` back into the field if it was lost and refocuses it.
    /// Returns `FieldGone` when the field is no longer on screen.
    async fn refresh_storage_field(
        &self,
        terminal: &mut dyn Terminal,
        storage: &str,
    ) -> AutomationResult<Option<Detection>> {
        if self.config.storage.revalidate_storage_field {
            match terminal.field_value(&controls::STORAGE_TYPE_FIELD).await {
                None => return Ok(Some(Detection::FieldGone)),
                Some(current) if current.trim().eq_ignore_ascii_case(storage) => {}
                Some(current) => {
                    warn!(
                        expected = %storage,
                        found = %current,
                        "storage field changed, refilling"
                    );
                    terminal.fill_field(&controls::STORAGE_TYPE_FIELD, "").await?;
                    terminal.fill_field(&controls::STORAGE_TYPE_FIELD, storage).await?;
                }
            }
        }

        if let Err(e) = terminal.click_control(&controls::STORAGE_TYPE_FIELD).await {
            debug!(error = %e, "storage field not focusable");
            return Ok(Some(Detection::FieldGone));
        }
        Ok(None)
    }

    async fn exit_to_home(&self, terminal: &mut dyn Terminal) {
        if !terminal.is_visible(&controls::EXIT_BUTTON).await {
            debug!("exit not on screen");
            return;
        }
        match terminal.click_control(&controls::EXIT_BUTTON).await {
            Ok(()) => {
                debug!("exited storage transaction");
                self.clock.sleep(self.config.settle()).await;
            }
            Err(e) => warn!(error = %e, "exit click failed"),
        }
    }

    /// Starts the first queued batch session in background mode.
    #[instrument(skip_all)]
    pub async fn trigger_background_job(
        &self,
        terminal: &mut dyn Terminal,
    ) -> AutomationResult<()> {
        let code = &self.config.terminal.batch_transaction;
        terminal.open_transaction(code).await?;
        self.wait_for(terminal, &controls::BATCH_FIRST_ROW).await?;

        terminal.click_control(&controls::BATCH_FIRST_ROW).await?;
        terminal.click_control(&controls::PROCESS_BUTTON).await?;
        self.clock.sleep(self.config.settle()).await;

        self.wait_for(terminal, &controls::BACKGROUND_OPTION).await?;
        terminal.click_control(&controls::BACKGROUND_OPTION).await?;
        terminal.click_control(&controls::PROCESS_CONFIRM_BUTTON).await?;
        self.clock.sleep(self.config.settle()).await;

        info!(transaction = %code, "background job started");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;
    use crate::terminal::{SimulatedTerminal, StorageScenario};

    #[tokio::test]
    async fn test_field_gone_stops_retries() {
        let config = AppConfig::default();
        let clock = ManualClock::new();
        let mut term =
            SimulatedTerminal::new().with_storage_scenario("J0A", StorageScenario::FieldDisappears);
        let mut workflow = StorageWorkflow::new(&config, &clock, Screenshots::disabled());

        let outcome = workflow.run(&mut term, "J0A").await.unwrap();

        assert_eq!(outcome, StorageOutcome::ScreenChanged);
        assert_eq!(term.f8_presses("J0A"), 1);
        assert_eq!(workflow.state(), WorkflowState::Exited);
    }

    #[tokio::test]
    async fn test_outcome_mapping() {
        assert_eq!(StorageOutcome::TransferActive.run_outcome(), RunOutcome::TransferActive);
        assert_eq!(StorageOutcome::NoIndicator.run_outcome(), RunOutcome::Ok);
        assert_eq!(StorageOutcome::Activated.describe(), "activated");
    }
}
