//! Frame pacing

use std::thread;
use std::time::{Duration, Instant};

/// Paces the loop at a requested tick rate
pub trait FrameClock {
    /// Block until the next tick at `hz` is due
    fn wait_next(&mut self, hz: u32);
    /// Ticks waited for so far
    fn ticks(&self) -> u64;
}

/// Wall-clock pacing; sleeps off whatever is left of each tick period
#[derive(Debug)]
pub struct SleepClock {
    last: Instant,
    ticks: u64,
}

impl Default for SleepClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SleepClock {
    pub fn new() -> Self {
        Self {
            last: Instant::now(),
            ticks: 0,
        }
    }
}

impl FrameClock for SleepClock {
    fn wait_next(&mut self, hz: u32) {
        let period = Duration::from_secs_f64(1.0 / hz.max(1) as f64);
        let elapsed = self.last.elapsed();
        if elapsed < period {
            thread::sleep(period - elapsed);
        }
        self.last = Instant::now();
        self.ticks += 1;
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }
}

/// No waiting at all: headless runs and tests
#[derive(Debug, Default)]
pub struct UnpacedClock {
    ticks: u64,
}

impl FrameClock for UnpacedClock {
    fn wait_next(&mut self, _hz: u32) {
        self.ticks += 1;
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }
}
