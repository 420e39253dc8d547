// ==========================================
// Inventory Count Automation - simulated terminal
// ==========================================
// Deterministic in-memory screen model of the three transactions the
// automation drives:
//   LI11N  inventory entry (document header, single record form, exit dialog)
//   LX15   storage-type transfer (variant, storage type, F8 result)
//   SM35   batch queue (background processing)
// Faults are injected through builder methods; observations are
// exposed through read-only accessors.
// ==========================================

use crate::terminal::control::{controls, Control, Key};
use crate::terminal::error::{TerminalError, TerminalResult};
use crate::terminal::Terminal;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// What LX15 shows for a storage type once F8 takes effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageScenario {
    /// A "Transfer active" indicator is listed
    TransferActive,
    /// An "Activate" button is offered
    ActivationAvailable,
    /// F8 has no visible effect; the selection screen stays
    NoIndicator,
    /// The selection screen is replaced by a result without indicators
    FieldDisappears,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Home,
    InventoryStart,
    DocumentHeader,
    EntryForm { confirm_stage: u8 },
    ConfirmExit { commit: bool },
    StorageSelection,
    VariantList,
    StorageResult(StorageScenario),
    Activated,
    BatchList,
    BatchDialog,
}

/// One confirmed single-record entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedEntry {
    pub document: String,
    pub storage_bin: String,
    pub material: String,
    pub quantity: String,
    pub storage_location: String,
    pub plant: String,
    pub zero_stock: bool,
}

const ENTRY_FIELDS: [Control; 5] = [
    controls::STORAGE_BIN_FIELD,
    controls::MATERIAL_FIELD,
    controls::QUANTITY_FIELD,
    controls::STORAGE_LOCATION_FIELD,
    controls::PLANT_FIELD,
];

pub struct SimulatedTerminal {
    screen: Screen,
    fields: HashMap<String, String>,
    current_document: Option<String>,
    current_storage: Option<String>,
    zero_stock_checked: bool,
    variant_selected: Option<String>,
    variant_loaded: bool,
    batch_row_selected: bool,
    background_selected: bool,

    // ===== Scenario setup =====
    system_message_pending: bool,
    known_documents: Option<HashSet<String>>,
    variants: Vec<String>,
    hidden: Vec<(Option<String>, Control)>,
    ignore_inventory_enters: u32,
    swallow_yes: u32,
    save_disabled: bool,
    storage_scenarios: HashMap<String, StorageScenario>,
    default_scenario: StorageScenario,
    ignore_f8: HashMap<String, u32>,
    clear_storage_on_ignored_f8: bool,
    screenshot_fails: bool,

    // ===== Observations =====
    pending: HashMap<String, Vec<PostedEntry>>,
    saved: Vec<PostedEntry>,
    f8_presses: HashMap<String, u32>,
    transfers_seen: Vec<String>,
    activated: Vec<String>,
    background_jobs: u32,
    screenshots: Vec<PathBuf>,
    close_count: u32,
    transcript: Vec<String>,
}

impl Default for SimulatedTerminal {
    fn default() -> Self {
        Self::new()
    }
}

impl SimulatedTerminal {
    pub fn new() -> Self {
        Self {
            screen: Screen::Home,
            fields: HashMap::new(),
            current_document: None,
            current_storage: None,
            zero_stock_checked: false,
            variant_selected: None,
            variant_loaded: false,
            batch_row_selected: false,
            background_selected: false,
            system_message_pending: false,
            known_documents: None,
            variants: vec!["MMS3CA".to_string()],
            hidden: Vec::new(),
            ignore_inventory_enters: 0,
            swallow_yes: 0,
            save_disabled: false,
            storage_scenarios: HashMap::new(),
            default_scenario: StorageScenario::NoIndicator,
            ignore_f8: HashMap::new(),
            clear_storage_on_ignored_f8: false,
            screenshot_fails: false,
            pending: HashMap::new(),
            saved: Vec::new(),
            f8_presses: HashMap::new(),
            transfers_seen: Vec::new(),
            activated: Vec::new(),
            background_jobs: 0,
            screenshots: Vec::new(),
            close_count: 0,
            transcript: Vec::new(),
        }
    }

    // ==========================================
    // Scenario builders
    // ==========================================

    /// Shows a "System Messages" dialog until Escape is pressed.
    pub fn with_system_message(mut self) -> Self {
        self.system_message_pending = true;
        self
    }

    /// Only these documents open on Enter; others leave the screen unchanged.
    pub fn with_known_documents<I, S>(mut self, documents: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_documents = Some(documents.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_variants(mut self, variants: &[&str]) -> Self {
        self.variants = variants.iter().map(|v| v.to_string()).collect();
        self
    }

    pub fn hide_control(mut self, control: Control) -> Self {
        self.hidden.push((None, control));
        self
    }

    /// Hides `control` only while `document` is open.
    pub fn hide_control_for_document(mut self, document: &str, control: Control) -> Self {
        self.hidden.push((Some(document.to_string()), control));
        self
    }

    pub fn ignore_inventory_enters(mut self, count: u32) -> Self {
        self.ignore_inventory_enters = count;
        self
    }

    /// The exit dialog ignores the next `count` clicks on Yes.
    pub fn swallow_yes(mut self, count: u32) -> Self {
        self.swallow_yes = count;
        self
    }

    pub fn disable_save(mut self) -> Self {
        self.save_disabled = true;
        self
    }

    pub fn with_storage_scenario(mut self, storage: &str, scenario: StorageScenario) -> Self {
        self.storage_scenarios
            .insert(storage.to_uppercase(), scenario);
        self
    }

    pub fn with_default_scenario(mut self, scenario: StorageScenario) -> Self {
        self.default_scenario = scenario;
        self
    }

    /// The first `count` F8 presses for `storage` have no effect.
    pub fn ignore_f8_presses(mut self, storage: &str, count: u32) -> Self {
        self.ignore_f8.insert(storage.to_uppercase(), count);
        self
    }

    /// An ignored F8 press also wipes the storage-type field.
    pub fn clear_storage_on_ignored_f8(mut self) -> Self {
        self.clear_storage_on_ignored_f8 = true;
        self
    }

    pub fn fail_screenshots(mut self) -> Self {
        self.screenshot_fails = true;
        self
    }

    // ==========================================
    // Observations
    // ==========================================

    pub fn saved_entries(&self) -> &[PostedEntry] {
        &self.saved
    }

    pub fn pending_entries(&self, document: &str) -> &[PostedEntry] {
        self.pending
            .get(document)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn f8_presses(&self, storage: &str) -> u32 {
        self.f8_presses
            .get(&storage.to_uppercase())
            .copied()
            .unwrap_or(0)
    }

    pub fn transfers_seen(&self) -> &[String] {
        &self.transfers_seen
    }

    pub fn activated_storages(&self) -> &[String] {
        &self.activated
    }

    pub fn background_jobs(&self) -> u32 {
        self.background_jobs
    }

    pub fn screenshots(&self) -> &[PathBuf] {
        &self.screenshots
    }

    pub fn close_count(&self) -> u32 {
        self.close_count
    }

    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// True on the LI11N start screen (inventory field on display).
    pub fn at_inventory_start(&self) -> bool {
        self.screen == Screen::InventoryStart
    }

    pub fn at_home(&self) -> bool {
        self.screen == Screen::Home
    }

    // ==========================================
    // Screen model
    // ==========================================

    fn screen_controls(&self) -> Vec<Control> {
        let mut visible = vec![controls::TRANSACTION_FIELD];
        if self.system_message_pending {
            visible.push(controls::SYSTEM_MESSAGES);
        }

        match self.screen {
            Screen::Home => {}
            Screen::InventoryStart => {
                visible.push(controls::WAREHOUSE_FIELD);
                visible.push(controls::INVENTORY_FIELD);
            }
            Screen::DocumentHeader => {
                visible.push(controls::SINGLE_RECORD_BUTTON);
                if !self.save_disabled {
                    visible.push(controls::SAVE_BUTTON);
                }
                visible.push(controls::CANCEL_BUTTON);
            }
            Screen::EntryForm { .. } => {
                visible.extend(ENTRY_FIELDS.iter().cloned());
                visible.push(controls::ZERO_STOCK_TOGGLE);
                visible.push(controls::CANCEL_BUTTON);
            }
            Screen::ConfirmExit { .. } => visible.push(controls::YES_BUTTON),
            Screen::StorageSelection => {
                visible.push(controls::GET_VARIANT_BUTTON);
                visible.push(controls::STORAGE_TYPE_FIELD);
                visible.push(controls::EXIT_BUTTON);
            }
            Screen::VariantList => {
                visible.extend(self.variants.iter().map(|v| controls::variant_row(v)));
                visible.push(controls::CHOOSE_BUTTON);
            }
            Screen::StorageResult(scenario) => {
                match scenario {
                    StorageScenario::TransferActive => visible.push(controls::TRANSFER_ACTIVE_CELL),
                    StorageScenario::ActivationAvailable => visible.push(controls::ACTIVATE_BUTTON),
                    StorageScenario::NoIndicator | StorageScenario::FieldDisappears => {}
                }
                visible.push(controls::EXIT_BUTTON);
            }
            Screen::Activated => visible.push(controls::EXIT_BUTTON),
            Screen::BatchList => {
                visible.push(controls::BATCH_FIRST_ROW);
                visible.push(controls::PROCESS_BUTTON);
            }
            Screen::BatchDialog => {
                visible.push(controls::BACKGROUND_OPTION);
                visible.push(controls::PROCESS_CONFIRM_BUTTON);
            }
        }

        visible.retain(|c| !self.is_hidden(c));
        visible
    }

    fn is_hidden(&self, control: &Control) -> bool {
        self.hidden.iter().any(|(doc, hidden)| {
            hidden == control
                && match doc {
                    None => true,
                    Some(d) => self.current_document.as_deref() == Some(d.as_str()),
                }
        })
    }

    fn require_visible(&self, control: &Control) -> TerminalResult<()> {
        if self.screen_controls().contains(control) {
            Ok(())
        } else {
            Err(TerminalError::ControlNotFound(control.to_string()))
        }
    }

    fn value_of(&self, control: &Control) -> String {
        self.fields
            .get(control.name.as_ref())
            .cloned()
            .unwrap_or_default()
    }

    fn log(&mut self, line: String) {
        self.transcript.push(line);
    }

    fn enter_on_inventory(&mut self) {
        if self.ignore_inventory_enters > 0 {
            self.ignore_inventory_enters -= 1;
            self.log("inventory Enter ignored".to_string());
            return;
        }
        if self.value_of(&controls::WAREHOUSE_FIELD).trim().is_empty() {
            self.log("inventory Enter without warehouse".to_string());
            return;
        }
        let document = self.value_of(&controls::INVENTORY_FIELD).trim().to_string();
        let known = match &self.known_documents {
            Some(docs) => docs.contains(&document),
            None => !document.is_empty(),
        };
        if known {
            self.current_document = Some(document.clone());
            self.screen = Screen::DocumentHeader;
            self.log(format!("document {} opened", document));
        } else {
            self.log(format!("document {} unknown", document));
        }
    }

    fn enter_on_quantity(&mut self, confirm_stage: u8) {
        match confirm_stage {
            0 => self.screen = Screen::EntryForm { confirm_stage: 1 },
            1 => {
                let entry = PostedEntry {
                    document: self.current_document.clone().unwrap_or_default(),
                    storage_bin: self.value_of(&controls::STORAGE_BIN_FIELD),
                    material: self.value_of(&controls::MATERIAL_FIELD),
                    quantity: self.value_of(&controls::QUANTITY_FIELD),
                    storage_location: self.value_of(&controls::STORAGE_LOCATION_FIELD),
                    plant: self.value_of(&controls::PLANT_FIELD),
                    zero_stock: self.zero_stock_checked,
                };
                self.log(format!(
                    "entry confirmed: {} {} {}",
                    entry.material, entry.storage_bin, entry.quantity
                ));
                self.pending
                    .entry(entry.document.clone())
                    .or_default()
                    .push(entry);
                self.screen = Screen::EntryForm { confirm_stage: 2 };
            }
            _ => {}
        }
    }

    fn press_f8(&mut self) {
        if self.screen != Screen::StorageSelection || !self.variant_loaded {
            return;
        }
        let storage = self.value_of(&controls::STORAGE_TYPE_FIELD).trim().to_uppercase();
        *self.f8_presses.entry(storage.clone()).or_insert(0) += 1;

        if let Some(remaining) = self.ignore_f8.get_mut(&storage) {
            if *remaining > 0 {
                *remaining -= 1;
                if self.clear_storage_on_ignored_f8 {
                    self.fields
                        .insert(controls::STORAGE_TYPE_FIELD.name.to_string(), String::new());
                }
                self.log(format!("F8 ignored for {}", storage));
                return;
            }
        }

        let scenario = self
            .storage_scenarios
            .get(&storage)
            .copied()
            .unwrap_or(self.default_scenario);
        if scenario == StorageScenario::TransferActive {
            self.transfers_seen.push(storage.clone());
        }
        if scenario != StorageScenario::NoIndicator {
            self.screen = Screen::StorageResult(scenario);
        }
        self.current_storage = Some(storage.clone());
        self.log(format!("F8 for {} -> {:?}", storage, scenario));
    }

    fn clear_entry_fields(&mut self) {
        for field in ENTRY_FIELDS.iter() {
            self.fields.remove(field.name.as_ref());
        }
        self.zero_stock_checked = false;
    }
}

#[async_trait]
impl Terminal for SimulatedTerminal {
    async fn open_transaction(&mut self, code: &str) -> TerminalResult<()> {
        if self.system_message_pending {
            return Err(TerminalError::Session(
                "blocked by the System Messages dialog".to_string(),
            ));
        }
        let code = code.trim().to_uppercase();
        self.screen = match code.as_str() {
            "LI11N" => {
                self.current_document = None;
                self.fields.remove(controls::INVENTORY_FIELD.name.as_ref());
                Screen::InventoryStart
            }
            "LX15" => {
                self.variant_loaded = false;
                self.variant_selected = None;
                self.current_storage = None;
                self.fields.remove(controls::STORAGE_TYPE_FIELD.name.as_ref());
                Screen::StorageSelection
            }
            "SM35" => {
                self.batch_row_selected = false;
                self.background_selected = false;
                Screen::BatchList
            }
            other => {
                return Err(TerminalError::Session(format!("unknown transaction {}", other)));
            }
        };
        self.log(format!("open {}", code));
        Ok(())
    }

    async fn fill_field(&mut self, control: &Control, value: &str) -> TerminalResult<()> {
        self.require_visible(control)?;
        self.fields.insert(control.name.to_string(), value.to_string());
        self.log(format!("fill {} = '{}'", control.name, value));
        Ok(())
    }

    async fn field_value(&self, control: &Control) -> Option<String> {
        if self.screen_controls().contains(control) {
            Some(self.value_of(control))
        } else {
            None
        }
    }

    async fn press_key(&mut self, target: Option<&Control>, key: Key) -> TerminalResult<()> {
        if let Some(control) = target {
            self.require_visible(control)?;
        }
        self.log(format!(
            "press {} on {}",
            key,
            target.map(|c| c.name.to_string()).unwrap_or_else(|| "focus".to_string())
        ));

        match key {
            Key::Escape => {
                self.system_message_pending = false;
            }
            Key::Enter => match self.screen {
                Screen::InventoryStart
                    if target.map_or(true, |c| *c == controls::INVENTORY_FIELD) =>
                {
                    self.enter_on_inventory();
                }
                Screen::EntryForm { confirm_stage }
                    if target.map_or(false, |c| *c == controls::QUANTITY_FIELD) =>
                {
                    self.enter_on_quantity(confirm_stage);
                }
                _ => {}
            },
            Key::F8 => self.press_f8(),
            Key::Delete => {
                if let Some(control) = target {
                    self.fields.insert(control.name.to_string(), String::new());
                }
            }
            Key::SelectAll => {}
        }
        Ok(())
    }

    async fn click_control(&mut self, control: &Control) -> TerminalResult<()> {
        self.require_visible(control)?;
        self.log(format!("click {}", control));

        let screen = self.screen;
        if *control == controls::SINGLE_RECORD_BUTTON {
            self.clear_entry_fields();
            self.screen = Screen::EntryForm { confirm_stage: 0 };
        } else if *control == controls::CANCEL_BUTTON {
            self.screen = match screen {
                Screen::EntryForm { .. } => Screen::DocumentHeader,
                Screen::DocumentHeader => Screen::ConfirmExit { commit: false },
                other => other,
            };
        } else if *control == controls::SAVE_BUTTON {
            self.screen = Screen::ConfirmExit { commit: true };
        } else if *control == controls::YES_BUTTON {
            if self.swallow_yes > 0 {
                self.swallow_yes -= 1;
                self.log("Yes ignored".to_string());
                return Ok(());
            }
            if let Screen::ConfirmExit { commit } = screen {
                if commit {
                    if let Some(doc) = self.current_document.clone() {
                        let entries = self.pending.remove(&doc).unwrap_or_default();
                        self.log(format!("document {} saved with {} entries", doc, entries.len()));
                        self.saved.extend(entries);
                    }
                }
                self.current_document = None;
                self.fields.remove(controls::INVENTORY_FIELD.name.as_ref());
                self.screen = Screen::InventoryStart;
            }
        } else if *control == controls::ZERO_STOCK_TOGGLE {
            self.zero_stock_checked = !self.zero_stock_checked;
        } else if *control == controls::GET_VARIANT_BUTTON {
            self.screen = Screen::VariantList;
        } else if *control == controls::CHOOSE_BUTTON {
            if self.variant_selected.is_some() {
                self.variant_loaded = true;
            }
            self.screen = Screen::StorageSelection;
        } else if *control == controls::ACTIVATE_BUTTON {
            if let Some(storage) = self.current_storage.clone() {
                self.activated.push(storage);
            }
            self.screen = Screen::Activated;
        } else if *control == controls::EXIT_BUTTON {
            self.screen = Screen::Home;
        } else if *control == controls::BATCH_FIRST_ROW {
            self.batch_row_selected = true;
        } else if *control == controls::PROCESS_BUTTON {
            if self.batch_row_selected {
                self.screen = Screen::BatchDialog;
            }
        } else if *control == controls::BACKGROUND_OPTION {
            self.background_selected = true;
        } else if *control == controls::PROCESS_CONFIRM_BUTTON {
            if self.background_selected {
                self.background_jobs += 1;
                self.log("background job started".to_string());
            }
            self.batch_row_selected = false;
            self.background_selected = false;
            self.screen = Screen::BatchList;
        } else if screen == Screen::VariantList {
            self.variant_selected = Some(control.name.to_string());
        }
        Ok(())
    }

    async fn is_visible(&self, control: &Control) -> bool {
        self.screen_controls().contains(control)
    }

    async fn wait_until_any(
        &mut self,
        controls: &[Control],
        timeout: Duration,
    ) -> TerminalResult<Control> {
        let visible = self.screen_controls();
        controls
            .iter()
            .find(|c| visible.contains(c))
            .cloned()
            .ok_or_else(|| {
                let names: Vec<String> = controls.iter().map(|c| c.to_string()).collect();
                TerminalError::Timeout(format!("{} after {:?}", names.join(", "), timeout))
            })
    }

    async fn capture_screenshot(&mut self, path: &Path) -> TerminalResult<()> {
        if self.screenshot_fails {
            return Err(TerminalError::Screenshot(path.display().to_string()));
        }
        self.screenshots.push(path.to_path_buf());
        Ok(())
    }

    async fn close(&mut self) -> TerminalResult<()> {
        self.close_count += 1;
        self.screen = Screen::Home;
        self.log("session closed".to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_opens_only_with_warehouse() {
        let mut term = SimulatedTerminal::new();
        term.open_transaction("LI11N").await.unwrap();
        term.fill_field(&controls::INVENTORY_FIELD, "100").await.unwrap();
        term.press_key(Some(&controls::INVENTORY_FIELD), Key::Enter).await.unwrap();
        assert!(!term.is_visible(&controls::SINGLE_RECORD_BUTTON).await);

        term.fill_field(&controls::WAREHOUSE_FIELD, "BR2").await.unwrap();
        term.press_key(Some(&controls::INVENTORY_FIELD), Key::Enter).await.unwrap();
        assert!(term.is_visible(&controls::SINGLE_RECORD_BUTTON).await);
    }

    #[tokio::test]
    async fn test_save_commits_pending_entries() {
        let mut term = SimulatedTerminal::new();
        term.open_transaction("LI11N").await.unwrap();
        term.fill_field(&controls::WAREHOUSE_FIELD, "BR2").await.unwrap();
        term.fill_field(&controls::INVENTORY_FIELD, "100").await.unwrap();
        term.press_key(Some(&controls::INVENTORY_FIELD), Key::Enter).await.unwrap();
        term.click_control(&controls::SINGLE_RECORD_BUTTON).await.unwrap();
        term.fill_field(&controls::MATERIAL_FIELD, "M1").await.unwrap();
        term.fill_field(&controls::QUANTITY_FIELD, "5").await.unwrap();
        term.press_key(Some(&controls::QUANTITY_FIELD), Key::Enter).await.unwrap();
        assert!(term.pending_entries("100").is_empty(), "first Enter only arms confirmation");
        term.press_key(Some(&controls::QUANTITY_FIELD), Key::Enter).await.unwrap();
        assert_eq!(term.pending_entries("100").len(), 1);

        term.click_control(&controls::CANCEL_BUTTON).await.unwrap();
        term.click_control(&controls::SAVE_BUTTON).await.unwrap();
        term.click_control(&controls::YES_BUTTON).await.unwrap();

        assert!(term.at_inventory_start());
        assert_eq!(term.saved_entries().len(), 1);
        assert_eq!(term.saved_entries()[0].quantity, "5");
    }

    #[tokio::test]
    async fn test_hidden_control_not_found() {
        let mut term = SimulatedTerminal::new().hide_control(controls::INVENTORY_FIELD);
        term.open_transaction("LI11N").await.unwrap();
        let result = term.fill_field(&controls::INVENTORY_FIELD, "1").await;
        assert!(matches!(result, Err(TerminalError::ControlNotFound(_))));
    }

    #[tokio::test]
    async fn test_system_message_blocks_until_escape() {
        let mut term = SimulatedTerminal::new().with_system_message();
        assert!(term.open_transaction("LI11N").await.is_err());
        term.press_key(None, Key::Escape).await.unwrap();
        assert!(term.open_transaction("LI11N").await.is_ok());
    }
}
