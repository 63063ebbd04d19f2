use super::clock::Timestamp;

/// Fire-at-most-once-per-window guard.
///
/// Locked while `now < expiry`. A successful fire moves the expiry to
/// `now + lock_ms`; a rejected fire leaves the gate untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CooldownGate {
    lock_ms: u64,
    expiry: Option<Timestamp>,
}

impl CooldownGate {
    pub const fn new(lock_ms: u64) -> Self {
        Self {
            lock_ms,
            expiry: None,
        }
    }

    pub fn lock_ms(&self) -> u64 {
        self.lock_ms
    }

    pub fn expiry(&self) -> Option<Timestamp> {
        self.expiry
    }

    pub fn is_locked(&self, now: Timestamp) -> bool {
        matches!(self.expiry, Some(expiry) if now < expiry)
    }

    pub fn try_fire(&mut self, now: Timestamp) -> bool {
        if self.is_locked(now) {
            return false;
        }
        self.expiry = Some(now.saturating_add(self.lock_ms));
        true
    }

    pub fn reset(&mut self) {
        self.expiry = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_then_locks_for_window() {
        let mut gate = CooldownGate::new(400);

        assert!(gate.try_fire(0));
        assert!(!gate.try_fire(399));
        assert!(gate.try_fire(400));
        assert_eq!(gate.expiry(), Some(800));
    }

    #[test]
    fn rejected_fire_keeps_expiry() {
        let mut gate = CooldownGate::new(400);
        assert!(gate.try_fire(1_000));

        for now in [1_000, 1_100, 1_399] {
            assert!(!gate.try_fire(now), "now={now}");
        }
        assert_eq!(gate.expiry(), Some(1_400));
        assert!(gate.is_locked(1_399));
        assert!(!gate.is_locked(1_400));
    }

    #[test]
    fn held_trigger_fires_once_per_window() {
        let mut gate = CooldownGate::new(400);
        let fired = (0..1_000u64)
            .step_by(16)
            .filter(|now| gate.try_fire(*now))
            .count();

        // 0, 400, 800 (rounded up to the next 16 ms tick)
        assert_eq!(fired, 3);
    }

    #[test]
    fn reset_unlocks_immediately() {
        let mut gate = CooldownGate::new(250);
        assert!(gate.try_fire(10));
        gate.reset();
        assert!(!gate.is_locked(11));
        assert!(gate.try_fire(11));
    }
}
