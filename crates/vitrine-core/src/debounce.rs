/// Fires once after pokes stop arriving for a quiet period.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_ms: f64,
    last_poke: Option<f64>,
}

impl Debouncer {
    pub fn new(quiet_ms: f64) -> Self {
        Self {
            quiet_ms,
            last_poke: None,
        }
    }

    pub fn set_quiet_ms(&mut self, quiet_ms: f64) {
        self.quiet_ms = quiet_ms;
    }

    pub fn poke(&mut self, now: f64) {
        self.last_poke = Some(now);
    }

    /// True exactly once per burst, as soon as the quiet period has elapsed.
    pub fn ready(&mut self, now: f64) -> bool {
        match self.last_poke {
            Some(at) if now - at >= self.quiet_ms => {
                self.last_poke = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fires_after_quiet_period() {
        let mut d = Debouncer::new(200.0);
        assert!(!d.ready(0.0));
        d.poke(0.0);
        d.poke(150.0);
        assert!(!d.ready(300.0));
        assert!(d.ready(350.0));
        assert!(!d.ready(400.0));
        assert!(!d.ready(10_000.0));
    }
}
