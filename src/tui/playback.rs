//! Visual stand-in for pattern playback: flashes at scheduled onsets.

/// How long each onset stays lit.
pub const FLASH_MS: f64 = 90.0;

/// Absolute onset times handed over by a `PlayPattern` event.
#[derive(Debug, Clone, Default)]
pub struct Playback {
    onsets_ms: Vec<f64>,
}

impl Playback {
    /// Schedule onsets relative to `start_ms`.
    pub fn schedule(&mut self, start_ms: f64, start_times_sec: &[f64]) {
        self.onsets_ms = start_times_sec
            .iter()
            .map(|s| start_ms + s * 1000.0)
            .collect();
    }

    /// Forget the scheduled onsets.
    pub fn clear(&mut self) {
        self.onsets_ms.clear();
    }

    /// Whether an onset is sounding at `now_ms`.
    pub fn is_lit(&self, now_ms: f64) -> bool {
        self.onsets_ms
            .iter()
            .any(|&t| now_ms >= t && now_ms < t + FLASH_MS)
    }

    /// Onsets already reached at `now_ms`.
    pub fn played(&self, now_ms: f64) -> usize {
        self.onsets_ms.iter().filter(|&&t| t <= now_ms).count()
    }

    pub fn len(&self) -> usize {
        self.onsets_ms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.onsets_ms.is_empty()
    }
}
