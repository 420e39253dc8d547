// ==========================================
// Inventory Count Automation - single-record entry state machine
// ==========================================
// Drives one LaunchRecord through the inventory transaction:
//   Idle -> AwaitingInventoryField -> InventoryEntered
//        -> SingleRecordFormOpen -> FieldsFilled -> Confirmed -> Returned
// A failing record is aborted alone; the driver still brings the
// terminal back to the inventory start screen before returning.
// ==========================================

use crate::automation::error::{AutomationError, AutomationResult};
use crate::automation::screenshots::Screenshots;
use crate::automation::waits::poll_until_visible;
use crate::config::AppConfig;
use crate::domain::{format_quantity, ItemResult, LaunchRecord, RunOutcome};
use crate::engine::{Clock, RetryPolicy};
use crate::terminal::{controls, Control, Key, Terminal};
use std::time::Duration;
use tracing::{debug, error, info, instrument, warn};

/// How long a Cancel button gets to show up before it is skipped.
const CANCEL_VISIBLE_WAIT: Duration = Duration::from_secs(5);

/// Rounds of cancel + confirm tried when recovering from a failure.
const RECOVERY_ROUNDS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    Idle,
    AwaitingInventoryField,
    InventoryEntered,
    SingleRecordFormOpen,
    FieldsFilled,
    Confirmed,
    Returned,
}

/// Successful pass through the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryReport {
    /// Saved with persist semantics (last record of its document)
    pub saved: bool,
    /// Baseline screen was not confirmed within the timeout
    pub degraded: bool,
}

fn is_missing(value: &str) -> bool {
    let t = value.trim();
    t.is_empty() || t.eq_ignore_ascii_case("nan")
}

pub struct EntryDriver<'a> {
    config: &'a AppConfig,
    clock: &'a dyn Clock,
    screenshots: Screenshots,
    state: EntryState,
}

impl<'a> EntryDriver<'a> {
    pub fn new(config: &'a AppConfig, clock: &'a dyn Clock, screenshots: Screenshots) -> Self {
        Self {
            config,
            clock,
            screenshots,
            state: EntryState::Idle,
        }
    }

    /// State reached by the last record (where it stopped on failure).
    pub fn state(&self) -> EntryState {
        self.state
    }

    /// Processes one record and never lets its failure escape.
    pub async fn process(
        &mut self,
        terminal: &mut dyn Terminal,
        record: &LaunchRecord,
    ) -> ItemResult {
        let item = record.item_key();

        let missing: Vec<&str> = [
            ("document", record.document.as_str()),
            ("material", record.material.as_str()),
            ("plant", record.plant.as_str()),
            ("storage_location", record.storage_location.as_str()),
        ]
        .iter()
        .filter(|(_, v)| is_missing(v))
        .map(|(name, _)| *name)
        .collect();
        if !missing.is_empty() {
            warn!(item = %item, missing = ?missing, "mandatory fields missing, record skipped");
            return ItemResult::new(item, RunOutcome::Skipped)
                .with_detail(format!("missing {}", missing.join(", ")));
        }

        match self.drive(terminal, record).await {
            Ok(report) => {
                let mut result = ItemResult::new(item, RunOutcome::Ok);
                if report.degraded {
                    result = result.degraded();
                }
                if report.saved {
                    result = result.with_detail("document saved");
                }
                result
            }
            Err(e) => {
                error!(
                    item = %item,
                    state = ?self.state,
                    code = e.code(),
                    hint = e.hint(),
                    error = %e,
                    "record failed"
                );
                let path = self.screenshots.error_path(e.code(), &item);
                self.screenshots.capture(terminal, path).await;
                self.return_to_baseline(terminal).await;
                ItemResult::new(item, RunOutcome::Error).with_detail(format!("{}: {}", e.code(), e))
            }
        }
    }

    /// Runs the state machine for one record.
    #[instrument(
        skip_all,
        fields(
            doc = %record.document,
            material = %record.material,
            bin = %record.storage_bin,
            ud = record.ud.as_deref().unwrap_or("")
        )
    )]
    pub async fn drive(
        &mut self,
        terminal: &mut dyn Terminal,
        record: &LaunchRecord,
    ) -> AutomationResult<EntryReport> {
        self.state = EntryState::Idle;

        // Idle -> AwaitingInventoryField
        debug!("step 1: inventory start screen");
        self.go_to_inventory_screen(terminal).await?;
        self.ensure_warehouse(terminal).await?;
        self.state = EntryState::AwaitingInventoryField;

        // AwaitingInventoryField -> InventoryEntered
        debug!("step 2: inventory document");
        self.enter_inventory_document(terminal, &record.document).await?;
        self.state = EntryState::InventoryEntered;

        // InventoryEntered -> SingleRecordFormOpen
        debug!("step 3: single record form");
        self.open_single_record_form(terminal).await?;
        self.state = EntryState::SingleRecordFormOpen;

        // SingleRecordFormOpen -> FieldsFilled
        debug!("step 4: fill fields");
        self.fill_fields(terminal, record).await?;
        self.state = EntryState::FieldsFilled;

        // FieldsFilled -> Confirmed
        debug!("step 5: confirm quantity");
        self.confirm_quantity(terminal).await?;
        self.state = EntryState::Confirmed;

        // Confirmed -> Returned
        debug!("step 6: leave document");
        let saved = if record.is_last_in_document {
            self.save_document(terminal).await
        } else {
            self.cancel_once(terminal, true).await;
            false
        };
        let degraded = !self.await_baseline(terminal).await;
        self.state = EntryState::Returned;

        info!(saved, degraded, "record completed");
        Ok(EntryReport { saved, degraded })
    }

    // ==========================================
    // Transitions
    // ==========================================

    async fn pause(&self) {
        self.clock.sleep(self.config.settle()).await;
    }

    async fn go_to_inventory_screen(&self, terminal: &mut dyn Terminal) -> AutomationResult<()> {
        if terminal.is_visible(&controls::INVENTORY_FIELD).await {
            return Ok(());
        }
        if terminal.is_visible(&controls::CANCEL_BUTTON).await
            || terminal.is_visible(&controls::YES_BUTTON).await
        {
            self.return_to_baseline(terminal).await;
            if terminal.is_visible(&controls::INVENTORY_FIELD).await {
                return Ok(());
            }
        }

        let code = &self.config.terminal.inventory_transaction;
        info!(transaction = %code, "opening inventory transaction");
        terminal.open_transaction(code).await?;
        if !poll_until_visible(
            &*terminal,
            self.clock,
            &controls::INVENTORY_FIELD,
            self.config.default_timeout(),
            self.config.poll_interval(),
        )
        .await
        {
            return Err(AutomationError::NavigationTimeout(format!(
                "{} start screen did not appear",
                code
            )));
        }
        Ok(())
    }

    async fn ensure_warehouse(&self, terminal: &mut dyn Terminal) -> AutomationResult<()> {
        let wanted = self.config.terminal.warehouse_number.as_str();
        match terminal.field_value(&controls::WAREHOUSE_FIELD).await {
            Some(current) if current.trim() == wanted => Ok(()),
            Some(current) => {
                info!(from = %current, to = %wanted, "setting warehouse number");
                terminal.fill_field(&controls::WAREHOUSE_FIELD, wanted).await?;
                self.pause().await;
                Ok(())
            }
            None => {
                warn!("warehouse field not on screen, continuing");
                Ok(())
            }
        }
    }

    /// Resending the document id is safe: no form field has been touched yet.
    async fn enter_inventory_document(
        &self,
        terminal: &mut dyn Terminal,
        document: &str,
    ) -> AutomationResult<()> {
        let policy = RetryPolicy::new(
            self.config.timing.inventory_attempts,
            Duration::from_millis(self.config.timing.inventory_backoff_ms),
        );
        let settle = Duration::from_millis(self.config.timing.inventory_settle_ms);

        for attempt in policy.attempts() {
            let submitted = match terminal.fill_field(&controls::INVENTORY_FIELD, document).await {
                Ok(()) => {
                    terminal
                        .press_key(Some(&controls::INVENTORY_FIELD), Key::Enter)
                        .await
                }
                Err(e) => Err(e),
            };

            match submitted {
                Ok(()) => {
                    info!(doc = %document, attempt, "inventory document submitted");
                    self.clock.sleep(settle).await;
                    if terminal.is_visible(&controls::SINGLE_RECORD_BUTTON).await {
                        return Ok(());
                    }
                }
                Err(e) => debug!(attempt, error = %e, "inventory submission failed"),
            }

            if !policy.is_last(attempt) {
                warn!(doc = %document, attempt, "document screen not reached, retrying");
                policy.backoff(self.clock).await;
            }
        }

        Err(AutomationError::NavigationTimeout(format!(
            "document {} did not open after {} attempts",
            document, policy.max_attempts
        )))
    }

    async fn open_single_record_form(&self, terminal: &mut dyn Terminal) -> AutomationResult<()> {
        terminal.click_control(&controls::SINGLE_RECORD_BUTTON).await?;
        info!("single record entry opened");
        self.pause().await;

        terminal
            .wait_until_any(&[controls::STORAGE_BIN_FIELD], self.config.default_timeout())
            .await
            .map_err(|_| {
                AutomationError::ElementNotFound(format!(
                    "{} (single record form)",
                    controls::STORAGE_BIN_FIELD
                ))
            })?;
        Ok(())
    }

    async fn fill(
        &self,
        terminal: &mut dyn Terminal,
        control: &Control,
        value: &str,
    ) -> AutomationResult<()> {
        terminal.fill_field(control, value).await?;
        debug!(field = %control.name, value = %value, "field filled");
        self.pause().await;
        Ok(())
    }

    async fn fill_fields(
        &self,
        terminal: &mut dyn Terminal,
        record: &LaunchRecord,
    ) -> AutomationResult<()> {
        let quantity = format_quantity(record.quantity);

        self.fill(terminal, &controls::STORAGE_BIN_FIELD, &record.storage_bin).await?;
        self.fill(terminal, &controls::MATERIAL_FIELD, &record.material).await?;
        self.fill(terminal, &controls::QUANTITY_FIELD, &quantity).await?;

        if record.quantity.is_zero() {
            match terminal.click_control(&controls::ZERO_STOCK_TOGGLE).await {
                Ok(()) => {
                    info!("zero stock indicator set");
                    self.pause().await;
                }
                Err(e) => warn!(error = %e, "zero stock indicator not found"),
            }
        }

        self.fill(terminal, &controls::STORAGE_LOCATION_FIELD, &record.storage_location).await?;
        self.fill(terminal, &controls::PLANT_FIELD, &record.plant).await?;
        Ok(())
    }

    /// First Enter arms the confirmation, second one confirms.
    async fn confirm_quantity(&self, terminal: &mut dyn Terminal) -> AutomationResult<()> {
        for press in 1..=2 {
            terminal
                .press_key(Some(&controls::QUANTITY_FIELD), Key::Enter)
                .await?;
            debug!(press, "quantity submitted");
            self.pause().await;
        }
        self.cancel_once(terminal, false).await;
        Ok(())
    }

    /// Save and confirm; falls back to cancel + confirm when saving fails.
    async fn save_document(&self, terminal: &mut dyn Terminal) -> bool {
        match terminal.click_control(&controls::SAVE_BUTTON).await {
            Ok(()) => {
                info!("save requested");
                self.pause().await;
                self.click_yes(terminal).await;
                true
            }
            Err(e) => {
                warn!(error = %e, "save not possible, leaving with cancel");
                self.cancel_once(terminal, true).await;
                false
            }
        }
    }

    async fn click_yes(&self, terminal: &mut dyn Terminal) {
        if terminal.is_visible(&controls::YES_BUTTON).await {
            match terminal.click_control(&controls::YES_BUTTON).await {
                Ok(()) => {
                    debug!("confirmation accepted");
                    self.pause().await;
                }
                Err(e) => warn!(error = %e, "confirmation click failed"),
            }
        }
    }

    /// Clicks Cancel if it shows up in time, then optionally confirms.
    async fn cancel_once(&self, terminal: &mut dyn Terminal, confirm_yes: bool) {
        if poll_until_visible(
            &*terminal,
            self.clock,
            &controls::CANCEL_BUTTON,
            CANCEL_VISIBLE_WAIT,
            self.config.poll_interval(),
        )
        .await
        {
            match terminal.click_control(&controls::CANCEL_BUTTON).await {
                Ok(()) => {
                    debug!("cancel clicked");
                    self.pause().await;
                }
                Err(e) => warn!(error = %e, "cancel click failed"),
            }
        } else {
            warn!("cancel not visible");
        }
        if confirm_yes {
            self.click_yes(terminal).await;
        }
    }

    /// Waits for the inventory start screen. One corrective cancel on
    /// timeout; returns false when the first wait timed out.
    async fn await_baseline(&self, terminal: &mut dyn Terminal) -> bool {
        let reached = poll_until_visible(
            &*terminal,
            self.clock,
            &controls::INVENTORY_FIELD,
            self.config.confirm_timeout(),
            self.config.poll_interval(),
        )
        .await;
        if reached {
            return true;
        }

        warn!("inventory screen not confirmed, sending corrective cancel");
        self.cancel_once(terminal, true).await;
        let recovered = poll_until_visible(
            &*terminal,
            self.clock,
            &controls::INVENTORY_FIELD,
            self.config.confirm_timeout(),
            self.config.poll_interval(),
        )
        .await;
        if !recovered {
            error!("inventory screen still not reached");
        }
        false
    }

    /// Best effort: back to the inventory start screen after a failure.
    pub async fn return_to_baseline(&self, terminal: &mut dyn Terminal) {
        for round in 1..=RECOVERY_ROUNDS {
            if terminal.is_visible(&controls::INVENTORY_FIELD).await {
                return;
            }
            debug!(round, "recovery cancel");
            self.cancel_once(terminal, true).await;
        }
        if terminal.is_visible(&controls::INVENTORY_FIELD).await {
            return;
        }

        warn!("cancel did not return to inventory screen, reopening transaction");
        if let Err(e) = terminal
            .open_transaction(&self.config.terminal.inventory_transaction)
            .await
        {
            error!(error = %e, "could not reopen inventory transaction");
        }
    }
}
