//! `embassy-time` clock

use embassy_time::{block_for, Duration, Instant};

use crate::clock::Clock;

/// [`Clock`] backed by the embassy time driver
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbassyClock;

impl Clock for EmbassyClock {
    fn now_millis(&mut self) -> u64 {
        Instant::now().as_millis()
    }

    fn delay_ms(&mut self, ms: u32) {
        block_for(Duration::from_millis(u64::from(ms)));
    }
}
