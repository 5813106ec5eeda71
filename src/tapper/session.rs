//! Interaction surface: the session object the renderer talks to.
//!
//! A `Session` owns exactly one `GameState` and one passive-income
//! `Scheduler`. Each entry point runs one transition from `logic` and then
//! writes the result through to storage before returning. The scheduler
//! callback does the same for ticks. Both go through the same
//! `RefCell`, and each transition reads and replaces the state inside a
//! single borrow.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::config::TapperConfig;

use super::catalog::{self, UpgradeDefinition};
use super::logic::{self, Rejection};
use super::save::{self, LocalStorage, Persistence, SnapshotStore};
use super::scheduler::{BrowserInterval, IntervalHost, Scheduler};
use super::state::{now_ms, GameState};

/// Pending notifications kept for a renderer that is not draining.
const MAX_PENDING_EVENTS: usize = 64;

/// One-way notification for the renderer (floating "+N", flashes).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TapperEvent {
    Tapped { gained: u64 },
    Ticked { gained: u64 },
    Purchased { id: &'static str },
    PurchaseRejected { id: String },
    Reset,
}

struct Engine<S> {
    state: GameState,
    persistence: Persistence<S>,
    events: Vec<TapperEvent>,
}

impl<S: SnapshotStore> Engine<S> {
    fn commit(&mut self, next: GameState) {
        self.state = next;
        self.persistence.save(&next);
    }

    fn notify(&mut self, event: TapperEvent) {
        self.events.push(event);
        if self.events.len() > MAX_PENDING_EVENTS {
            self.events.remove(0);
        }
    }

    fn tick(&mut self) {
        let gained = self.state.per_second;
        let next = logic::tick(self.state);
        if next != self.state {
            self.commit(next);
        }
        self.notify(TapperEvent::Ticked { gained });
    }
}

pub struct Session<S: SnapshotStore + 'static, H: IntervalHost> {
    engine: Rc<RefCell<Engine<S>>>,
    scheduler: Scheduler<H>,
}

/// The session the browser build runs.
pub type BrowserSession = Session<LocalStorage, BrowserInterval>;

pub fn open_browser(config: &TapperConfig) -> BrowserSession {
    Session::open(LocalStorage::open(), BrowserInterval, config)
}

impl<S: SnapshotStore + 'static, H: IntervalHost> Session<S, H> {
    /// Resume the saved game, or start a fresh one when there is none.
    /// The scheduler is not started yet.
    pub fn open(store: S, host: H, config: &TapperConfig) -> Self {
        let mut persistence = Persistence::new(store, config);
        let state = match persistence.load() {
            Some(state) => {
                info!(
                    "resumed save: {} pelmeni, {} taps",
                    state.resource, state.total_taps
                );
                state
            }
            None => {
                let state = GameState::fresh(now_ms());
                persistence.save(&state);
                info!("started a fresh game");
                state
            }
        };
        Self {
            engine: Rc::new(RefCell::new(Engine {
                state,
                persistence,
                events: Vec::new(),
            })),
            scheduler: Scheduler::new(host, config.tick_period_ms),
        }
    }

    /// Start passive income. Idempotent.
    pub fn start(&mut self) -> bool {
        let engine = Rc::downgrade(&self.engine);
        self.scheduler.start(move || {
            let Some(cell) = engine.upgrade() else {
                return;
            };
            let Ok(mut guard) = cell.try_borrow_mut() else {
                warn!("tick skipped: state busy");
                return;
            };
            guard.tick();
        })
    }

    /// Stop passive income. Returns whether a timer was running.
    pub fn stop(&mut self) -> bool {
        self.scheduler.stop()
    }

    pub fn is_running(&self) -> bool {
        self.scheduler.is_running()
    }

    /// Returns the yield of this tap.
    pub fn on_tap(&mut self) -> u64 {
        let mut engine = self.engine.borrow_mut();
        let outcome = logic::tap(engine.state);
        engine.commit(outcome.state);
        engine.notify(TapperEvent::Tapped {
            gained: outcome.gained,
        });
        outcome.gained
    }

    /// Returns false for unknown ids and unaffordable upgrades; the state is
    /// then untouched and nothing is written.
    pub fn on_purchase(&mut self, upgrade_id: &str) -> bool {
        let mut engine = self.engine.borrow_mut();
        let result = catalog::find(upgrade_id)
            .ok_or_else(|| Rejection::UnknownUpgrade(upgrade_id.to_string()))
            .and_then(|upgrade| logic::purchase(engine.state, upgrade).map(|next| (upgrade, next)));
        match result {
            Ok((upgrade, next)) => {
                engine.commit(next);
                engine.notify(TapperEvent::Purchased { id: upgrade.id });
                debug!("bought {}", upgrade.id);
                true
            }
            Err(rejection) => {
                debug!("purchase of {upgrade_id:?} rejected: {rejection}");
                engine.notify(TapperEvent::PurchaseRejected {
                    id: upgrade_id.to_string(),
                });
                false
            }
        }
    }

    /// Destructive and irreversible. Does nothing unless `confirmed`.
    pub fn on_reset(&mut self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        let mut engine = self.engine.borrow_mut();
        let fresh = logic::reset(engine.state, now_ms());
        engine.commit(fresh);
        engine.notify(TapperEvent::Reset);
        info!("progress reset");
        true
    }

    pub fn state(&self) -> GameState {
        self.engine.borrow().state
    }

    pub fn catalog(&self) -> &'static [UpgradeDefinition] {
        catalog::all()
    }

    /// Copy-out JSON of the current state.
    pub fn export(&self) -> String {
        save::export_json(&self.engine.borrow().state)
    }

    pub fn drain_events(&mut self) -> Vec<TapperEvent> {
        std::mem::take(&mut self.engine.borrow_mut().events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tapper::save::{decode, encode, MemoryStore};
    use crate::tapper::scheduler::ManualInterval;

    const KEY: &str = "pelmeni-save-v2";

    fn open(store: &MemoryStore, host: &ManualInterval) -> Session<MemoryStore, ManualInterval> {
        Session::open(store.clone(), host.clone(), &TapperConfig::default())
    }

    fn persisted(store: &MemoryStore) -> GameState {
        decode(&store.get(KEY).unwrap()).unwrap()
    }

    fn seeded(state: GameState) -> MemoryStore {
        MemoryStore::with_entry(KEY, &encode(&state).unwrap())
    }

    fn rich() -> GameState {
        GameState {
            resource: 1_000,
            per_tap: 1,
            per_second: 0,
            total_taps: 3,
            created_at: 1_000,
        }
    }

    #[test]
    fn fresh_session_starts_at_zero_and_is_saved() {
        let store = MemoryStore::new();
        let session = open(&store, &ManualInterval::new());
        let s = session.state();
        assert_eq!((s.resource, s.per_tap, s.per_second, s.total_taps), (0, 1, 0, 0));
        assert_eq!(persisted(&store), s);
    }

    #[test]
    fn corrupt_save_falls_back_to_fresh() {
        let store = MemoryStore::with_entry(KEY, "{\"resource\":");
        let session = open(&store, &ManualInterval::new());
        assert_eq!(session.state().resource, 0);
        assert_eq!(session.state().per_tap, 1);
    }

    #[test]
    fn resumes_saved_game() {
        let store = seeded(rich());
        let session = open(&store, &ManualInterval::new());
        assert_eq!(session.state(), rich());
    }

    #[test]
    fn tap_writes_through() {
        let store = MemoryStore::new();
        let mut session = open(&store, &ManualInterval::new());
        let before = store.writes();
        assert_eq!(session.on_tap(), 1);
        assert_eq!(store.writes(), before + 1);
        assert_eq!(persisted(&store).resource, 1);
        assert_eq!(persisted(&store).total_taps, 1);
    }

    #[test]
    fn purchase_writes_through_and_keeps_created_at() {
        let store = seeded(rich());
        let mut session = open(&store, &ManualInterval::new());
        assert!(session.on_purchase("tap+5"));
        let s = persisted(&store);
        assert_eq!(s.resource, 750);
        assert_eq!(s.per_tap, 6);
        assert_eq!(s.created_at, 1_000);
        assert_eq!(session.on_tap(), 6);
    }

    #[test]
    fn rejected_purchase_writes_nothing() {
        let mut poor = rich();
        poor.resource = 10;
        let store = seeded(poor);
        let mut session = open(&store, &ManualInterval::new());
        let writes = store.writes();
        assert!(!session.on_purchase("tap+1"));
        assert!(!session.on_purchase("no-such-upgrade"));
        assert_eq!(store.writes(), writes);
        assert_eq!(session.state(), poor);
    }

    #[test]
    fn reset_requires_confirmation() {
        let store = seeded(rich());
        let mut session = open(&store, &ManualInterval::new());
        assert!(!session.on_reset(false));
        assert_eq!(session.state(), rich());

        assert!(session.on_reset(true));
        let s = session.state();
        assert_eq!((s.resource, s.per_tap, s.per_second, s.total_taps), (0, 1, 0, 0));
        assert!(s.created_at > rich().created_at);
        assert_eq!(persisted(&store), s);
    }

    #[test]
    fn scheduler_ticks_apply_passive_income() {
        let mut earning = rich();
        earning.resource = 100;
        earning.per_second = 5;
        let store = seeded(earning);
        let host = ManualInterval::new();
        let mut session = open(&store, &host);
        assert!(session.start());
        host.fire();
        assert_eq!(session.state().resource, 105);
        assert_eq!(persisted(&store).resource, 105);
    }

    #[test]
    fn zero_income_ticks_leave_state_and_storage_alone() {
        let store = seeded(rich());
        let host = ManualInterval::new();
        let mut session = open(&store, &host);
        session.start();
        let writes = store.writes();
        for _ in 0..10 {
            host.fire();
        }
        assert_eq!(session.state(), rich());
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn tick_while_state_is_borrowed_is_skipped() {
        let mut earning = rich();
        earning.per_second = 5;
        let store = seeded(earning);
        let host = ManualInterval::new();
        let mut session = open(&store, &host);
        session.start();

        {
            let _busy = session.engine.borrow();
            assert_eq!(host.fire(), 1);
        }
        assert_eq!(session.state().resource, 1_000);

        host.fire();
        assert_eq!(session.state().resource, 1_005);
        assert_eq!(persisted(&store).resource, 1_005);
    }

    #[test]
    fn start_is_idempotent() {
        let host = ManualInterval::new();
        let mut session = open(&MemoryStore::new(), &host);
        assert!(!session.is_running());
        assert!(session.start());
        assert!(!session.start());
        assert!(session.is_running());
        assert_eq!(host.live(), 1);
        assert!(session.stop());
        assert!(!session.is_running());
        assert_eq!(host.live(), 0);
        assert!(session.start());
        assert_eq!(host.live(), 1);
    }

    #[test]
    fn dropping_session_stops_timer() {
        let host = ManualInterval::new();
        {
            let mut session = open(&MemoryStore::new(), &host);
            session.start();
        }
        assert_eq!(host.live(), 0);
    }

    #[test]
    fn save_failures_do_not_block_play() {
        let store = MemoryStore::new();
        let mut session = open(&store, &ManualInterval::new());
        store.fail_writes(true);
        session.on_tap();
        session.on_tap();
        assert_eq!(session.state().resource, 2);
    }

    #[test]
    fn events_report_transitions() {
        let store = seeded(rich());
        let host = ManualInterval::new();
        let mut session = open(&store, &host);
        session.start();
        session.on_tap();
        session.on_purchase("auto+1");
        session.on_purchase("auto+5");
        host.fire();
        session.on_reset(true);
        assert_eq!(
            session.drain_events(),
            vec![
                TapperEvent::Tapped { gained: 1 },
                TapperEvent::Purchased { id: "auto+1" },
                TapperEvent::PurchaseRejected {
                    id: "auto+5".to_string()
                },
                TapperEvent::Ticked { gained: 1 },
                TapperEvent::Reset,
            ]
        );
        assert!(session.drain_events().is_empty());
    }

    #[test]
    fn undrained_events_are_capped() {
        let mut session = open(&MemoryStore::new(), &ManualInterval::new());
        for _ in 0..200 {
            session.on_tap();
        }
        assert_eq!(session.drain_events().len(), MAX_PENDING_EVENTS);
    }

    #[test]
    fn export_is_a_read_only_projection() {
        let store = seeded(rich());
        let session = open(&store, &ManualInterval::new());
        let writes = store.writes();
        assert_eq!(decode(&session.export()).unwrap(), rich());
        assert_eq!(store.writes(), writes);
    }

    #[test]
    fn catalog_is_exposed_in_display_order() {
        let session = open(&MemoryStore::new(), &ManualInterval::new());
        assert_eq!(session.catalog().len(), 4);
        assert_eq!(session.catalog()[0].id, "tap+1");
    }

    #[test]
    fn tick_period_comes_from_config() {
        let host = ManualInterval::new();
        let config = TapperConfig {
            tick_period_ms: 250,
            ..TapperConfig::default()
        };
        let mut session = Session::open(MemoryStore::new(), host.clone(), &config);
        session.start();
        assert_eq!(host.periods(), vec![250]);
    }
}
