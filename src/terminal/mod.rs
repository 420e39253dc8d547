// ==========================================
// Inventory Count Automation - terminal capability
// ==========================================
// Responsibility: the only surface the state machines drive.
// Adapters translate these commands into a concrete UI session;
// SimulatedTerminal is the in-memory adapter for tests and rehearsals.
// ==========================================

pub mod control;
pub mod error;
pub mod simulated;

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;

pub use control::{controls, Control, Key, Role};
pub use error::{TerminalError, TerminalResult};
pub use simulated::{PostedEntry, SimulatedTerminal, StorageScenario};

// ==========================================
// Terminal Trait
// ==========================================
// One session, one caller at a time: every mutating command takes
// `&mut self`.
#[async_trait]
pub trait Terminal: Send + Sync {
    /// Jumps to a transaction from any screen.
    async fn open_transaction(&mut self, code: &str) -> TerminalResult<()>;

    /// Focuses a field and replaces its content.
    async fn fill_field(&mut self, control: &Control, value: &str) -> TerminalResult<()>;

    /// Current text of a field, `None` when the field is not on screen.
    async fn field_value(&self, control: &Control) -> Option<String>;

    /// Sends a key to `target`, or to whatever has focus.
    async fn press_key(&mut self, target: Option<&Control>, key: Key) -> TerminalResult<()>;

    async fn click_control(&mut self, control: &Control) -> TerminalResult<()>;

    async fn is_visible(&self, control: &Control) -> bool;

    /// First of `controls` to become visible within `timeout`.
    async fn wait_until_any(
        &mut self,
        controls: &[Control],
        timeout: Duration,
    ) -> TerminalResult<Control>;

    async fn capture_screenshot(&mut self, path: &Path) -> TerminalResult<()>;

    /// Releases the session.
    async fn close(&mut self) -> TerminalResult<()>;
}
