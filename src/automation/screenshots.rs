// ==========================================
// Inventory Count Automation - narrated screenshots
// ==========================================
// Names: after_f8_<storage>_<ts>.png
//        transfer_active_<storage>_<ts>.png
//        exception_<storage>_<ts>.png
//        err_<code>_<item>_<ts>.png
// Capture failures are logged, never escalated.
// ==========================================

use crate::config::PlaybackConfig;
use crate::terminal::Terminal;
use chrono::Local;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone)]
pub struct Screenshots {
    dir: PathBuf,
    enabled: bool,
}

fn sanitize(item: &str) -> String {
    let cleaned: String = item
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect();
    if cleaned.is_empty() {
        "item".to_string()
    } else {
        cleaned
    }
}

fn timestamp() -> String {
    Local::now().format("%Y%m%d_%H%M%S").to_string()
}

impl Screenshots {
    pub fn new(dir: impl Into<PathBuf>, enabled: bool) -> Self {
        Self {
            dir: dir.into(),
            enabled,
        }
    }

    pub fn from_config(playback: &PlaybackConfig) -> Self {
        Self::new(playback.screenshot_dir.clone(), playback.screenshots_on_error)
    }

    pub fn disabled() -> Self {
        Self::new(PathBuf::new(), false)
    }

    pub fn after_f8_path(&self, storage: &str) -> PathBuf {
        self.dir
            .join(format!("after_f8_{}_{}.png", sanitize(storage), timestamp()))
    }

    pub fn transfer_active_path(&self, storage: &str) -> PathBuf {
        self.dir
            .join(format!("transfer_active_{}_{}.png", sanitize(storage), timestamp()))
    }

    pub fn exception_path(&self, storage: &str) -> PathBuf {
        self.dir
            .join(format!("exception_{}_{}.png", sanitize(storage), timestamp()))
    }

    pub fn error_path(&self, code: &str, item: &str) -> PathBuf {
        self.dir.join(format!(
            "err_{}_{}_{}.png",
            sanitize(code),
            sanitize(item),
            timestamp()
        ))
    }

    /// Captures to `path` when enabled. Returns whether a file was written.
    pub async fn capture(&self, terminal: &mut dyn Terminal, path: PathBuf) -> bool {
        if !self.enabled {
            return false;
        }
        if let Err(e) = std::fs::create_dir_all(&self.dir) {
            warn!(dir = %self.dir.display(), error = %e, "screenshot directory unavailable");
        }
        match terminal.capture_screenshot(&path).await {
            Ok(()) => {
                info!(path = %path.display(), "screenshot saved");
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "screenshot failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names_are_sanitized() {
        let shots = Screenshots::new("shots", true);
        let path = shots.error_path("ELEMENT", "D1|M 1|A/01");
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("err_ELEMENT_D1_M_1_A_01_"));
        assert!(name.ends_with(".png"));
        assert!(path.starts_with("shots"));
    }

    #[test]
    fn test_storage_names() {
        let shots = Screenshots::new("shots", true);
        let name = |p: PathBuf| p.file_name().unwrap().to_string_lossy().to_string();
        assert!(name(shots.transfer_active_path("J0A")).starts_with("transfer_active_J0A_"));
        assert!(name(shots.exception_path("J0A")).starts_with("exception_J0A_"));
        assert!(name(shots.after_f8_path("J0A")).starts_with("after_f8_J0A_"));
    }
}
