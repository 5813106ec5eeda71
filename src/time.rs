//! Animation clock for cosmetic effects.
//!
//! `draw_web()` runs at the display refresh rate with a variable delta.
//! `FrameClock` turns `performance.now()` readings into a whole number of
//! fixed-length animation frames, which floaters and flashes count down in.
//! Economy ticks never come from here; see `tapper::scheduler`.

/// Longest gap credited in one call, so a tab coming back from the
/// background does not fast-forward every animation at once.
const MAX_DELTA_MS: f64 = 500.0;

pub struct FrameClock {
    ms_per_frame: f64,
    carry_ms: f64,
    last_ms: Option<f64>,
}

impl FrameClock {
    pub fn new(frames_per_sec: u32) -> Self {
        Self {
            ms_per_frame: 1000.0 / frames_per_sec.max(1) as f64,
            carry_ms: 0.0,
            last_ms: None,
        }
    }

    /// Feed the current timestamp; returns how many animation frames elapsed
    /// since the previous call. The first call always returns 0.
    pub fn advance(&mut self, now_ms: f64) -> u32 {
        let delta = match self.last_ms {
            Some(prev) => (now_ms - prev).clamp(0.0, MAX_DELTA_MS),
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        self.carry_ms += delta;
        let frames = (self.carry_ms / self.ms_per_frame) as u32;
        self.carry_ms -= frames as f64 * self.ms_per_frame;
        frames
    }
}
