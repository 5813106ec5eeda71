//! Engine configuration.
//!
//! Every value has a canonical default; the browser entry point uses
//! `TapperConfig::default()` as-is. Tests build their own to shorten keys or
//! periods.

use log::LevelFilter;

/// localStorage key for the current save format.
pub const STORAGE_KEY: &str = "pelmeni-save-v2";

/// Keys written by older builds with the same snapshot shape.
/// Read only when `STORAGE_KEY` is absent.
pub const LEGACY_STORAGE_KEYS: &[&str] = &["pelmeni-save-v1"];

/// Passive-income period: one tick per second of wall-clock time.
pub const TICK_PERIOD_MS: u32 = 1_000;

#[derive(Clone, Debug, PartialEq)]
pub struct TapperConfig {
    pub storage_key: String,
    pub legacy_storage_keys: Vec<String>,
    pub tick_period_ms: u32,
    pub log_level: LevelFilter,
}

impl Default for TapperConfig {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            legacy_storage_keys: LEGACY_STORAGE_KEYS.iter().map(|k| k.to_string()).collect(),
            tick_period_ms: TICK_PERIOD_MS,
            log_level: if cfg!(debug_assertions) {
                LevelFilter::Debug
            } else {
                LevelFilter::Info
            },
        }
    }
}
