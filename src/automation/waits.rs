// ==========================================
// Inventory Count Automation - polling helpers
// ==========================================
// Blocking polls with bounded timeouts. Every iteration sleeps on the
// injected clock, so a manual clock finishes them instantly.
// ==========================================

use crate::engine::{Clock, Deadline};
use crate::terminal::{Control, Terminal};
use std::time::Duration;

/// Polls until `control` is visible. Returns false on timeout.
pub async fn poll_until_visible(
    terminal: &dyn Terminal,
    clock: &dyn Clock,
    control: &Control,
    timeout: Duration,
    interval: Duration,
) -> bool {
    poll_until_any(terminal, clock, std::slice::from_ref(control), timeout, interval)
        .await
        .is_some()
}

/// Polls until one of `controls` is visible; the first visible in list order wins.
pub async fn poll_until_any(
    terminal: &dyn Terminal,
    clock: &dyn Clock,
    controls: &[Control],
    timeout: Duration,
    interval: Duration,
) -> Option<Control> {
    let deadline = Deadline::after(clock, timeout);
    loop {
        for control in controls {
            if terminal.is_visible(control).await {
                return Some(control.clone());
            }
        }
        if deadline.expired(clock) {
            return None;
        }
        clock.sleep(interval).await;
    }
}
