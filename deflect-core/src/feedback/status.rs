//! Status heartbeat LED

/// Half-period while the primary sensor warms up (ms)
pub const WARMUP_HALF_PERIOD_MS: u32 = 100;

/// Half-period once the primary sensor is ready (ms)
pub const READY_HALF_PERIOD_MS: u32 = 2000;

/// Square-wave heartbeat whose rate shows the primary sensor state
#[derive(Debug, Clone, Copy, Default)]
pub struct Heartbeat {
    lit: bool,
}

impl Heartbeat {
    pub const fn new() -> Self {
        Self { lit: false }
    }

    /// Time the LED stays in each level
    pub fn half_period_ms(primary_ready: bool) -> u32 {
        if primary_ready {
            READY_HALF_PERIOD_MS
        } else {
            WARMUP_HALF_PERIOD_MS
        }
    }

    /// Flip the LED, returning the new level
    pub fn toggle(&mut self) -> bool {
        self.lit = !self.lit;
        self.lit
    }

    pub fn is_lit(&self) -> bool {
        self.lit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blink_rate() {
        assert_eq!(Heartbeat::half_period_ms(false), 100);
        assert_eq!(Heartbeat::half_period_ms(true), 2000);
    }

    #[test]
    fn test_toggle_alternates() {
        let mut heartbeat = Heartbeat::new();
        assert!(!heartbeat.is_lit());
        assert!(heartbeat.toggle());
        assert!(!heartbeat.toggle());
        assert!(heartbeat.toggle());
    }
}
