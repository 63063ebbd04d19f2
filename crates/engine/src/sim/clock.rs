use std::time::Duration;

/// Milliseconds on the simulation clock.
pub type Timestamp = u64;

/// Time handed to a scene for one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameTime {
    pub now_ms: Timestamp,
    pub elapsed_ms: f32,
}

impl FrameTime {
    pub const fn new(now_ms: Timestamp, elapsed_ms: f32) -> Self {
        Self { now_ms, elapsed_ms }
    }
}

/// Monotonic tick clock owned by the loop runner.
///
/// Advanced exactly once per simulation tick. Timed components never read
/// wall time; they compare against the `now_ms` this clock hands out.
#[derive(Debug, Clone, Default)]
pub struct SimClock {
    total: Duration,
    tick_count: u64,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&mut self, fixed_dt: Duration) -> FrameTime {
        self.total = self.total.saturating_add(fixed_dt);
        self.tick_count = self.tick_count.saturating_add(1);
        FrameTime {
            now_ms: self.now_ms(),
            elapsed_ms: fixed_dt.as_secs_f32() * 1000.0,
        }
    }

    pub fn now_ms(&self) -> Timestamp {
        self.total.as_millis() as Timestamp
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn advance_accumulates_fractional_ticks() {
        let mut clock = SimClock::new();
        let fixed_dt = Duration::from_secs_f64(1.0 / 60.0);

        let first = clock.advance(fixed_dt);
        assert_eq!(first.now_ms, 16);
        assert!((first.elapsed_ms - 16.666_666).abs() < 0.001);

        for _ in 1..60 {
            clock.advance(fixed_dt);
        }
        assert_eq!(clock.tick_count(), 60);
        assert!(clock.now_ms() == 999 || clock.now_ms() == 1000);
    }

    #[test]
    fn now_is_monotonic() {
        let mut clock = SimClock::new();
        let mut last = clock.now_ms();
        for _ in 0..500 {
            let time = clock.advance(Duration::from_millis(7));
            assert!(time.now_ms >= last);
            last = time.now_ms;
        }
        assert_eq!(last, 3500);
    }
}
