//! Error types for configuration and session setup.
//!
//! Gameplay outcomes (misses, timing errors, ignored strikes) are values on the
//! event stream, not errors. Everything here is raised before a round starts.

use thiserror::Error;

/// An error raised while loading configuration or building a session.
#[derive(Error, Debug)]
pub enum GameError {
    #[error("failed to read config {path}: {source}")]
    ConfigIo {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config YAML: {0}")]
    ConfigParse(#[from] serde_yaml::Error),

    #[error("tempo must be a finite number of beats per minute above zero, got {0}")]
    InvalidTempo(f64),

    #[error("tempo step must be finite and non-negative, got {0}")]
    InvalidTempoStep(f64),

    #[error("input phase must start inside the round: input_start_beat {input_start_beat}, total_beats {total_beats}")]
    InvalidRoundLayout {
        input_start_beat: u32,
        total_beats: u32,
    },

    #[error("timing windows must satisfy 0 < strict <= loose, got strict {strict}, loose {loose}")]
    InvalidTimingWindows { strict: f64, loose: f64 },

    #[error("duration '{symbol}' must be a finite, non-negative fraction of a measure, got {fraction}")]
    InvalidDuration { symbol: String, fraction: f64 },

    #[error("max_lives must be at least 1")]
    NoLives,

    #[error("grammar symbol '{0}' has no alternatives")]
    EmptyRule(String),

    #[error("grammar start symbol '{0}' has no rule")]
    UnknownStartSymbol(String),

    #[error("the minigame rotation is empty")]
    EmptyRotation,
}
