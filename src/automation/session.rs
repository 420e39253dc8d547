// ==========================================
// Inventory Count Automation - session warm-up
// ==========================================
// Before the first item: wait (bounded attempts) for the transaction
// field, then dismiss a start-up "System Messages" dialog once.
// ==========================================

use crate::automation::error::{AutomationError, AutomationResult};
use crate::automation::waits::poll_until_visible;
use crate::config::AppConfig;
use crate::engine::{Clock, RetryPolicy};
use crate::terminal::{controls, Key, Terminal};
use std::time::Duration;
use tracing::{info, instrument, warn};

#[instrument(skip_all)]
pub async fn warm_up(
    terminal: &mut dyn Terminal,
    config: &AppConfig,
    clock: &dyn Clock,
) -> AutomationResult<()> {
    let policy = RetryPolicy::new(
        config.session.warmup_attempts,
        Duration::from_millis(config.session.warmup_retry_delay_ms),
    );
    let timeout = Duration::from_millis(config.session.warmup_timeout_ms);

    let mut ready = false;
    for attempt in policy.attempts() {
        if poll_until_visible(
            &*terminal,
            clock,
            &controls::TRANSACTION_FIELD,
            timeout,
            config.poll_interval(),
        )
        .await
        {
            ready = true;
            break;
        }
        warn!(attempt, "transaction field not ready");
        if !policy.is_last(attempt) {
            policy.backoff(clock).await;
        }
    }
    if !ready {
        return Err(AutomationError::NavigationTimeout(
            "transaction field never became available".to_string(),
        ));
    }

    if terminal.is_visible(&controls::SYSTEM_MESSAGES).await {
        info!("dismissing System Messages dialog");
        terminal.press_key(None, Key::Escape).await?;
        clock.sleep(config.settle()).await;
    }

    info!("terminal session ready");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ManualClock;
    use crate::terminal::SimulatedTerminal;

    #[tokio::test]
    async fn test_dismisses_system_messages_once() {
        let mut term = SimulatedTerminal::new().with_system_message();
        let clock = ManualClock::new();
        let config = AppConfig::default();

        warm_up(&mut term, &config, &clock).await.unwrap();

        assert!(!term.is_visible(&controls::SYSTEM_MESSAGES).await);
        let escapes = term
            .transcript()
            .iter()
            .filter(|l| l.starts_with("press Escape"))
            .count();
        assert_eq!(escapes, 1);
    }

    #[tokio::test]
    async fn test_missing_transaction_field_times_out() {
        let mut term = SimulatedTerminal::new().hide_control(controls::TRANSACTION_FIELD);
        let clock = ManualClock::new();
        let mut config = AppConfig::default();
        config.session.warmup_attempts = 2;

        let result = warm_up(&mut term, &config, &clock).await;
        assert!(matches!(result, Err(AutomationError::NavigationTimeout(_))));
    }
}
