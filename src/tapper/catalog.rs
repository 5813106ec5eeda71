//! The shop: a fixed, ordered list of upgrades.
//!
//! Order is display order only. Every entry can be bought any number of
//! times at the same cost.

use super::state::GameState;

/// What an upgrade does to the state. Effects only ever add yield, so they
/// never look at or change `resource`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UpgradeEffect {
    PerTap(u64),
    PerSecond(u64),
}

impl UpgradeEffect {
    pub fn apply(self, state: GameState) -> GameState {
        match self {
            UpgradeEffect::PerTap(n) => GameState {
                per_tap: state.per_tap.saturating_add(n),
                ..state
            },
            UpgradeEffect::PerSecond(n) => GameState {
                per_second: state.per_second.saturating_add(n),
                ..state
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UpgradeDefinition {
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    pub cost: u64,
    pub effect: UpgradeEffect,
}

pub static CATALOG: [UpgradeDefinition; 4] = [
    UpgradeDefinition {
        id: "tap+1",
        title: "Сильнее нажимать",
        description: "+1 за тап",
        cost: 50,
        effect: UpgradeEffect::PerTap(1),
    },
    UpgradeDefinition {
        id: "tap+5",
        title: "Лопатка пельменная",
        description: "+5 за тап",
        cost: 250,
        effect: UpgradeEffect::PerTap(5),
    },
    UpgradeDefinition {
        id: "auto+1",
        title: "Вареник-робот",
        description: "+1/сек",
        cost: 200,
        effect: UpgradeEffect::PerSecond(1),
    },
    UpgradeDefinition {
        id: "auto+5",
        title: "Цех лепки",
        description: "+5/сек",
        cost: 900,
        effect: UpgradeEffect::PerSecond(5),
    },
];

pub fn all() -> &'static [UpgradeDefinition] {
    &CATALOG
}

pub fn find(id: &str) -> Option<&'static UpgradeDefinition> {
    CATALOG.iter().find(|u| u.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        for (i, a) in CATALOG.iter().enumerate() {
            for b in &CATALOG[i + 1..] {
                assert_ne!(a.id, b.id);
            }
        }
    }

    #[test]
    fn find_known_and_unknown() {
        assert_eq!(find("tap+5").map(|u| u.cost), Some(250));
        assert!(find("tap5").is_none());
        assert!(find("").is_none());
    }

    #[test]
    fn display_order_is_stable() {
        let ids: Vec<&str> = all().iter().map(|u| u.id).collect();
        assert_eq!(ids, vec!["tap+1", "tap+5", "auto+1", "auto+5"]);
    }

    #[test]
    fn effects_leave_resource_alone() {
        let mut s = GameState::fresh(0);
        s.resource = 77;
        for u in all() {
            assert_eq!(u.effect.apply(s).resource, 77, "{} touched resource", u.id);
        }
    }

    #[test]
    fn effect_applies_twice_when_bought_twice() {
        let s = GameState::fresh(0);
        let once = UpgradeEffect::PerSecond(5).apply(s);
        let twice = UpgradeEffect::PerSecond(5).apply(once);
        assert_eq!(twice.per_second, 10);
    }

    #[test]
    fn per_tap_effect_saturates() {
        let mut s = GameState::fresh(0);
        s.per_tap = u64::MAX - 1;
        assert_eq!(UpgradeEffect::PerTap(5).apply(s).per_tap, u64::MAX);
    }
}
