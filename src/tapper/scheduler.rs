//! Passive-income scheduler.
//!
//! One repeating host timer per session. The scheduler owns the only handle
//! to it: `start` refuses to create a second timer while one is live, `stop`
//! cancels it, and dropping the scheduler cancels it too. Ticks follow the
//! host timer's cadence as-is; drift and throttled (backgrounded) periods are
//! not made up for.

use log::{debug, warn};
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;

/// Host periodic-timer primitive (`setInterval` in the browser).
pub trait IntervalHost {
    type Handle;

    fn set_interval(&mut self, period_ms: u32, callback: Box<dyn FnMut()>) -> Option<Self::Handle>;
    fn clear_interval(&mut self, handle: Self::Handle);
}

pub struct Scheduler<H: IntervalHost> {
    host: H,
    period_ms: u32,
    handle: Option<H::Handle>,
}

impl<H: IntervalHost> Scheduler<H> {
    pub fn new(host: H, period_ms: u32) -> Self {
        Self {
            host,
            period_ms,
            handle: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Start firing `on_tick` every period. Returns false, and drops
    /// `on_tick`, if a timer is already live or the host refuses.
    pub fn start(&mut self, on_tick: impl FnMut() + 'static) -> bool {
        if self.handle.is_some() {
            return false;
        }
        match self.host.set_interval(self.period_ms, Box::new(on_tick)) {
            Some(handle) => {
                debug!("passive income timer started ({} ms)", self.period_ms);
                self.handle = Some(handle);
                true
            }
            None => {
                warn!("host refused to start the passive income timer");
                false
            }
        }
    }

    /// Cancel the live timer. Returns whether there was one.
    pub fn stop(&mut self) -> bool {
        match self.handle.take() {
            Some(handle) => {
                self.host.clear_interval(handle);
                debug!("passive income timer stopped");
                true
            }
            None => false,
        }
    }

}

impl<H: IntervalHost> Drop for Scheduler<H> {
    fn drop(&mut self) {
        self.stop();
    }
}

/// `window.setInterval` / `window.clearInterval`.
pub struct BrowserInterval;

pub struct BrowserTimer {
    id: i32,
    // Must outlive the JS timer; dropped after clearInterval.
    _callback: Closure<dyn FnMut()>,
}

impl IntervalHost for BrowserInterval {
    type Handle = BrowserTimer;

    fn set_interval(&mut self, period_ms: u32, callback: Box<dyn FnMut()>) -> Option<BrowserTimer> {
        let window = web_sys::window()?;
        let closure = Closure::wrap(callback);
        let timeout = i32::try_from(period_ms).unwrap_or(i32::MAX);
        let id = window
            .set_interval_with_callback_and_timeout_and_arguments_0(
                closure.as_ref().unchecked_ref(),
                timeout,
            )
            .ok()?;
        Some(BrowserTimer {
            id,
            _callback: closure,
        })
    }

    fn clear_interval(&mut self, timer: BrowserTimer) {
        if let Some(window) = web_sys::window() {
            window.clear_interval_with_handle(timer.id);
        }
    }
}

#[cfg(test)]
pub use manual::ManualInterval;


#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use super::*;

    fn counter() -> (Rc<Cell<u32>>, impl FnMut() + 'static) {
        let count = Rc::new(Cell::new(0));
        let c = count.clone();
        (count, move || c.set(c.get() + 1))
    }

    #[test]
    fn each_firing_runs_callback_once() {
        let host = ManualInterval::new();
        let mut scheduler = Scheduler::new(host.clone(), 1_000);
        let (count, on_tick) = counter();
        assert!(scheduler.start(on_tick));
        host.fire();
        host.fire();
        host.fire();
        assert_eq!(count.get(), 3);
        assert_eq!(host.periods(), vec![1_000]);
    }

    #[test]
    fn second_start_is_refused() {
        let host = ManualInterval::new();
        let mut scheduler = Scheduler::new(host.clone(), 1_000);
        let (first, a) = counter();
        let (second, b) = counter();
        assert!(scheduler.start(a));
        assert!(!scheduler.start(b));
        assert_eq!(host.live(), 1);
        host.fire();
        assert_eq!(first.get(), 1);
        assert_eq!(second.get(), 0);
    }

    #[test]
    fn stop_releases_timer() {
        let host = ManualInterval::new();
        let mut scheduler = Scheduler::new(host.clone(), 1_000);
        let (count, on_tick) = counter();
        scheduler.start(on_tick);
        assert!(scheduler.stop());
        assert!(!scheduler.is_running());
        assert_eq!(host.live(), 0);
        host.fire();
        assert_eq!(count.get(), 0);
        assert!(!scheduler.stop());
    }

    #[test]
    fn drop_releases_timer() {
        let host = ManualInterval::new();
        {
            let mut scheduler = Scheduler::new(host.clone(), 1_000);
            let (_, on_tick) = counter();
            scheduler.start(on_tick);
            assert_eq!(host.live(), 1);
        }
        assert_eq!(host.live(), 0);
    }

    #[test]
    fn refused_start_leaves_scheduler_stopped() {
        let host = ManualInterval::new();
        host.refuse(true);
        let mut scheduler = Scheduler::new(host.clone(), 1_000);
        let (_, on_tick) = counter();
        assert!(!scheduler.start(on_tick));
        assert!(!scheduler.is_running());

        host.refuse(false);
        let (_, on_tick) = counter();
        assert!(scheduler.start(on_tick));
    }

    #[test]
    fn repeated_sessions_do_not_accumulate_timers() {
        let host = ManualInterval::new();
        for _ in 0..5 {
            let mut scheduler = Scheduler::new(host.clone(), 1_000);
            let (_, on_tick) = counter();
            scheduler.start(on_tick);
        }
        assert_eq!(host.live(), 0);
    }
}
