//! Stoppage time
//!
//! Stalled plays add ticks to the end of the match. Once the clock runs past
//! regulation the extended window opens and stops accepting more.

/// Stall time added to the end of the match, in ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoppageTime {
    ticks: u64,
    /// The extended window is running; no more time can be added
    active: bool,
}

impl StoppageTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accumulate stall ticks. Ignored once the extended window has started.
    pub fn add_ticks(&mut self, ticks: u64) {
        if !self.active {
            self.ticks += ticks;
        }
    }

    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn has_stoppage(&self) -> bool {
        self.ticks > 0
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn activate(&mut self) {
        self.active = true;
    }

    pub fn seconds(&self, tick_rate: u32) -> f32 {
        self.ticks as f32 / tick_rate as f32
    }

    /// Match end time once the stoppage is added
    pub fn extended_end(&self, end_seconds: f32, tick_rate: u32) -> f32 {
        end_seconds + self.seconds(tick_rate)
    }

    /// The window was opened and the extended end time has passed
    pub fn has_ended(&self, elapsed: f32, end_seconds: f32, tick_rate: u32) -> bool {
        self.active && self.extended_end(end_seconds, tick_rate) < elapsed
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// "1:05" style clock
pub fn format_clock(seconds: f32) -> String {
    let total = seconds.max(0.0) as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// "12s" / "1m 05s" style duration of `ticks`
pub fn format_ticks(ticks: u64, tick_rate: u32) -> String {
    let total = ticks / tick_rate.max(1) as u64;
    if total >= 60 {
        format!("{}m {:02}s", total / 60, total % 60)
    } else {
        format!("{}s", total)
    }
}
