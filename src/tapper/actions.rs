//! Semantic action IDs for Pelmeni Tapper click targets.
//!
//! Registered during render and dispatched via `InputEvent::Click`.

// ── Core actions ────────────────────────────────────────────────
pub const TAP: u16 = 0;

// ── Shop (base + catalog index) ─────────────────────────────────
pub const BUY_UPGRADE_BASE: u16 = 100;

// ── Footer ──────────────────────────────────────────────────────
pub const RESET: u16 = 200;
pub const RESET_CONFIRM: u16 = 201;
pub const RESET_CANCEL: u16 = 202;
pub const TOGGLE_EXPORT: u16 = 210;
