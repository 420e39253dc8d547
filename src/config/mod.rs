// ==========================================
// Inventory Count Automation - configuration layer
// ==========================================
// Responsibility: timings, retry counts, terminal constants and
// playback policy, with file + environment overrides
// ==========================================

pub mod app_config;

pub use app_config::{
    AppConfig, ConfigError, ConfigResult, PlaybackConfig, SessionConfig, StorageConfig,
    TerminalConfig, TimingConfig,
};
