//! Terminal condition of a match.

use crate::config::HEADS_TO_WIN;

/// How the match ended for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Win,
    Loss,
}

impl Outcome {
    pub fn did_win(self) -> bool {
        self == Outcome::Win
    }
}

/// Pure check of the server-reported head counters.
///
/// `heads_hit` counts opponent heads we destroyed; it is checked first, as the
/// server never lets both counters reach the limit.
pub fn evaluate(heads_hit: u32, opponent_heads_hit: u32) -> Option<Outcome> {
    if heads_hit >= HEADS_TO_WIN {
        Some(Outcome::Win)
    } else if opponent_heads_hit >= HEADS_TO_WIN {
        Some(Outcome::Loss)
    } else {
        None
    }
}

/// Latches the first outcome so it is reported once per match.
#[derive(Debug, Clone, Default)]
pub struct VictoryDetector {
    reported: Option<Outcome>,
}

impl VictoryDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the outcome the first time a counter reaches the limit and
    /// `None` on every later call.
    pub fn observe(&mut self, heads_hit: u32, opponent_heads_hit: u32) -> Option<Outcome> {
        if self.reported.is_some() {
            return None;
        }
        let outcome = evaluate(heads_hit, opponent_heads_hit)?;
        self.reported = Some(outcome);
        Some(outcome)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.reported
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluate_thresholds() {
        assert_eq!(evaluate(0, 0), None);
        assert_eq!(evaluate(2, 2), None);
        assert_eq!(evaluate(3, 1), Some(Outcome::Win));
        assert_eq!(evaluate(1, 3), Some(Outcome::Loss));
    }

    #[test]
    fn detector_fires_once() {
        let mut d = VictoryDetector::new();
        assert_eq!(d.observe(2, 0), None);
        assert_eq!(d.observe(3, 0), Some(Outcome::Win));
        assert_eq!(d.observe(3, 0), None);
        assert_eq!(d.observe(3, 3), None);
        assert_eq!(d.outcome(), Some(Outcome::Win));
    }
}
