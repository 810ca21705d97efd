//! Per-session judgment counters.

use serde::Serialize;

use crate::minigame::{HitKind, Judgment, TimingErrorReason};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SessionStats {
    pub perfect: u32,
    pub good: u32,
    pub early: u32,
    pub late: u32,
    pub extra: u32,
    pub miss: u32,
    pub rounds_played: u32,
}

impl SessionStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count a judgment. `Ignore` is not counted.
    pub fn record(&mut self, judgment: &Judgment) {
        match judgment {
            Judgment::Ignore => {}
            Judgment::Score { kind, .. } => match kind {
                HitKind::Perfect => self.perfect += 1,
                HitKind::Good => self.good += 1,
            },
            Judgment::TimingError { reason } => match reason {
                TimingErrorReason::Early => self.early += 1,
                TimingErrorReason::Late => self.late += 1,
                TimingErrorReason::Extra => self.extra += 1,
            },
        }
    }

    /// Count an input beat that ended with its onset unplayed.
    pub fn record_miss(&mut self) {
        self.miss += 1;
    }

    /// Count a completed round.
    pub fn record_round(&mut self) {
        self.rounds_played += 1;
    }

    /// Everything that counts against accuracy.
    pub fn total(&self) -> u32 {
        self.perfect + self.good + self.early + self.late + self.extra + self.miss
    }

    /// Weighted accuracy in percent: perfect counts 1, good counts 0.5.
    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            return 0.0;
        }
        let weighted = self.perfect as f64 + self.good as f64 * 0.5;
        weighted / total as f64 * 100.0
    }
}
