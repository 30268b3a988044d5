/// Periodic deadline over a wrapping millisecond clock
///
/// The clock is the free-running board timer truncated to `u32`, so elapsed time is
/// always computed with `wrapping_sub` and survives the ~49 day rollover.
#[derive(Debug, Clone, Copy)]
pub struct Interval {
    period_ms: u32,
    last_ms: u32,
}

impl Interval {
    /// Creates an interval whose first period is measured from boot (t = 0)
    pub fn new(period_ms: u32) -> Interval {
        Self {
            period_ms,
            last_ms: 0,
        }
    }

    /// Checks if at least one period has passed since the last firing
    /// If it has, the interval restarts from `now_ms`
    /// param now_ms: current time in milliseconds
    /// returns: if the interval fired
    pub fn poll(&mut self, now_ms: u32) -> bool {
        if elapsed(self.last_ms, now_ms) >= self.period_ms {
            self.last_ms = now_ms;
            true
        } else {
            false
        }
    }
}

/// Milliseconds from `since` to `now` on the wrapping clock
pub fn elapsed(since: u32, now: u32) -> u32 {
    now.wrapping_sub(since)
}
