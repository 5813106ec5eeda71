//! Pelmeni Tapper game state: the one record that gets persisted.

use serde::{Deserialize, Serialize};

/// Authoritative economy record.
///
/// Field names serialize in camelCase so snapshots written by earlier
/// browser builds (`pelmeni`, `perTap`, ...) load unchanged.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Accumulated pelmeni.
    #[serde(alias = "pelmeni")]
    pub resource: u64,
    /// Yield per tap. Never below 1.
    pub per_tap: u64,
    /// Passive yield per elapsed second.
    pub per_second: u64,
    /// Lifetime tap count.
    pub total_taps: u64,
    /// Creation time of this save, ms since the Unix epoch.
    pub created_at: u64,
}

impl GameState {
    /// The zero-state every new game starts from.
    pub fn fresh(created_at: u64) -> Self {
        Self {
            resource: 0,
            per_tap: 1,
            per_second: 0,
            total_taps: 0,
            created_at,
        }
    }

    /// Structural checks serde cannot express.
    pub fn is_valid(&self) -> bool {
        self.per_tap >= 1
    }
}

/// Current wall-clock time in ms since the Unix epoch.
#[cfg(target_arch = "wasm32")]
pub fn now_ms() -> u64 {
    js_sys::Date::now() as u64
}

/// Current wall-clock time in ms since the Unix epoch.
#[cfg(not(target_arch = "wasm32"))]
pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
