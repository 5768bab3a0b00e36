//! Display-only match statistics.

use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy)]
pub struct MatchStats {
    started: Instant,
    total_shots: u32,
    hits: u32,
}

impl MatchStats {
    pub fn new() -> Self {
        Self {
            started: Instant::now(),
            total_shots: 0,
            hits: 0,
        }
    }

    pub fn record_shot(&mut self) {
        self.total_shots += 1;
    }

    pub fn record_hits(&mut self, n: usize) {
        self.hits += n as u32;
    }

    pub fn total_shots(&self) -> u32 {
        self.total_shots
    }

    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Rounded hit percentage; 0 before the first shot.
    pub fn hit_ratio(&self) -> u32 {
        if self.total_shots == 0 {
            return 0;
        }
        ((self.hits as f64 / self.total_shots as f64) * 100.0).round() as u32
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Elapsed time as `m:ss`.
    pub fn elapsed_display(&self) -> String {
        let secs = self.elapsed().as_secs();
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

impl Default for MatchStats {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ratio_rounds_to_percent() {
        let mut s = MatchStats::new();
        assert_eq!(s.hit_ratio(), 0);
        for _ in 0..3 {
            s.record_shot();
        }
        s.record_hits(2);
        assert_eq!(s.hit_ratio(), 67);
    }
}
