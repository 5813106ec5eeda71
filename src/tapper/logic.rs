//! Pelmeni Tapper economy as pure state transitions.
//!
//! Every function takes the state by value and hands back a new one; nothing
//! here touches storage, timers or the DOM.

use thiserror::Error;

use super::catalog::UpgradeDefinition;
use super::state::GameState;

/// Result of a tap: the new state plus the yield that tap produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TapOutcome {
    pub state: GameState,
    /// `per_tap` as it was before the tap.
    pub gained: u64,
}

/// Why a purchase left the state untouched. Not a fault.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("need {cost}, have {available}")]
    InsufficientFunds { cost: u64, available: u64 },
    #[error("no upgrade with id {0:?}")]
    UnknownUpgrade(String),
}

pub fn tap(state: GameState) -> TapOutcome {
    let gained = state.per_tap;
    TapOutcome {
        state: GameState {
            resource: state.resource.saturating_add(gained),
            total_taps: state.total_taps.saturating_add(1),
            ..state
        },
        gained,
    }
}

/// One elapsed second of passive income.
pub fn tick(state: GameState) -> GameState {
    GameState {
        resource: state.resource.saturating_add(state.per_second),
        ..state
    }
}

/// Deduct the cost, then apply the effect.
pub fn purchase(state: GameState, upgrade: &UpgradeDefinition) -> Result<GameState, Rejection> {
    if state.resource < upgrade.cost {
        return Err(Rejection::InsufficientFunds {
            cost: upgrade.cost,
            available: state.resource,
        });
    }
    let paid = GameState {
        resource: state.resource - upgrade.cost,
        ..state
    };
    Ok(upgrade.effect.apply(paid))
}

/// A new zero-state. Only `created_at` of the previous state is consulted, to
/// keep the new one strictly later even if the clock has not moved.
pub fn reset(previous: GameState, now_ms: u64) -> GameState {
    GameState::fresh(now_ms.max(previous.created_at.saturating_add(1)))
}

pub fn can_afford(state: &GameState, upgrade: &UpgradeDefinition) -> bool {
    state.resource >= upgrade.cost
}

/// Format a number with commas (e.g. 1234567 → "1,234,567").
pub fn format_number(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
