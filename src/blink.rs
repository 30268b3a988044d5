use crate::config::BLINK_INTERVAL_MS;
use crate::timer::Interval;

/// Free-running flip-flop behind the irrigation indicator's blink
pub struct BlinkTimer {
    interval: Interval,
    on: bool,
}

impl Default for BlinkTimer {
    fn default() -> Self {
        Self::new(BLINK_INTERVAL_MS)
    }
}

impl BlinkTimer {
    pub fn new(period_ms: u32) -> BlinkTimer {
        Self {
            interval: Interval::new(period_ms),
            on: false,
        }
    }

    /// Flips the state once per period and returns the current state
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if self.interval.poll(now_ms) {
            self.on = !self.on;
        }
        self.on
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggles_every_half_second() {
        let mut blink = BlinkTimer::default();
        assert!(!blink.poll(10));
        assert!(blink.poll(500));
        assert!(blink.poll(990));
        assert!(!blink.poll(1000));
        assert!(!blink.poll(1490));
        assert!(blink.poll(1500));
    }
}
