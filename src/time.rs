//! Fixed-interval game clock.
//!
//! `draw_web()` runs at frame rate with a variable delta. `GameTime`
//! accumulates real milliseconds and hands out whole ticks, so the economy
//! sees exactly one `tick()` per elapsed interval no matter the frame rate.

/// Economy ticks per real-time second.
pub const TICKS_PER_SECOND: u32 = 1;

/// Most ticks credited for a single frame gap (e.g. a backgrounded tab).
pub const MAX_CATCHUP_TICKS: u32 = 5;

pub struct GameTime {
    ms_per_tick: f64,
    /// Milliseconds not yet consumed as ticks.
    accumulator: f64,
    pub total_ticks: u64,
    last_timestamp: Option<f64>,
}

impl GameTime {
    pub fn new(ticks_per_sec: u32) -> Self {
        Self {
            ms_per_tick: 1000.0 / ticks_per_sec.max(1) as f64,
            accumulator: 0.0,
            total_ticks: 0,
            last_timestamp: None,
        }
    }

    /// Feed a wall-clock timestamp in ms; returns the ticks to run now.
    ///
    /// The first call only records the timestamp. Gaps longer than
    /// `MAX_CATCHUP_TICKS` intervals are clamped; negative gaps count as zero.
    pub fn update(&mut self, now_ms: f64) -> u32 {
        let max_gap = self.ms_per_tick * MAX_CATCHUP_TICKS as f64;
        let delta = match self.last_timestamp {
            Some(prev) => (now_ms - prev).clamp(0.0, max_gap),
            None => 0.0,
        };
        self.last_timestamp = Some(now_ms);

        self.accumulator += delta;
        let ticks = (self.accumulator / self.ms_per_tick) as u32;
        self.accumulator -= ticks as f64 * self.ms_per_tick;
        self.total_ticks += ticks as u64;
        ticks
    }
}

impl Default for GameTime {
    fn default() -> Self {
        Self::new(TICKS_PER_SECOND)
    }
}
