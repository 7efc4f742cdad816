//! Small timing helper used around each planning tick.

use std::time::Instant;

pub struct Timer {
    start: Instant,
}

impl Default for Timer {
    fn default() -> Self {
        Self { start: Instant::now() }
    }
}

impl Timer {
    pub fn dur_ms(&mut self) -> f64 {
        let d = self.start.elapsed();
        d.as_secs() as f64 * 1000. + f64::from(d.subsec_micros()) / 1000.
    }
}
