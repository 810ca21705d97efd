//! Game configuration — loaded from ~/.beat-the-beat/config.yaml.
//!
//! Every field has a default, so a missing file or a partial file both work.
//! The CLI overrides individual fields after loading.

use std::path::{Path, PathBuf};

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::error::GameError;
use crate::minigame::{MiniGameKind, MiniGameSettings, RoundLayout, TimingWindows};
use crate::rhythm::{Difficulty, DurationTable, Grammar, Tempo};

/// Which minigames make up the rotation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    /// All three minigames in turn.
    #[default]
    All,
    FollowTheBeat,
    ListenAndRepeat,
    ReadAndPlay,
}

impl Mode {
    /// Minigames in rotation order.
    pub fn kinds(self) -> Vec<MiniGameKind> {
        match self {
            Self::All => MiniGameKind::ALL.to_vec(),
            Self::FollowTheBeat => vec![MiniGameKind::FollowTheBeat],
            Self::ListenAndRepeat => vec![MiniGameKind::ListenAndRepeat],
            Self::ReadAndPlay => vec![MiniGameKind::ReadAndPlay],
        }
    }
}

/// Round layout and tolerance windows (fractions of a beat).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundSettings {
    pub total_beats: u32,
    pub input_start_beat: u32,
    pub strict_window: f64,
    pub loose_window: f64,
    /// Single radius used by Follow the Beat.
    pub metronome_window: f64,
}

impl Default for RoundSettings {
    fn default() -> Self {
        Self {
            total_beats: 8,
            input_start_beat: 4,
            strict_window: 0.10,
            loose_window: 0.20,
            metronome_window: 0.20,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub max_lives: u32,
    /// Tempo of round 1, in bpm.
    pub base_tempo: f64,
    /// Tempo increase per completed rotation, in bpm.
    pub tempo_step: f64,
    pub difficulty: Difficulty,
    pub mode: Mode,
    /// Grammar RNG seed. Unset means a fresh seed every session.
    pub seed: Option<u64>,
    pub round: RoundSettings,
    /// Replaces the built-in duration table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub durations: Option<DurationTable>,
    /// Replaces the difficulty's built-in grammar.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grammar: Option<Grammar>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            max_lives: 3,
            base_tempo: 60.0,
            tempo_step: 6.0,
            difficulty: Difficulty::default(),
            mode: Mode::default(),
            seed: None,
            round: RoundSettings::default(),
            durations: None,
            grammar: None,
        }
    }
}

/// `~/.beat-the-beat/config.yaml`, if a home directory exists.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".beat-the-beat").join("config.yaml"))
}

impl GameConfig {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, GameError> {
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| GameError::ConfigIo {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content)?;
        info!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Load from the default path, or use defaults if there is none.
    pub fn load_default() -> Result<Self, GameError> {
        match default_config_path() {
            Some(path) => Self::load(&path),
            None => Ok(Self::default()),
        }
    }

    /// Write the config as YAML, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), GameError> {
        let io_err = |source| GameError::ConfigIo {
            path: path.display().to_string(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml).map_err(io_err)
    }

    /// Check every value a session depends on.
    pub fn validate(&self) -> Result<(), GameError> {
        if self.max_lives == 0 {
            return Err(GameError::NoLives);
        }
        Tempo::new(self.base_tempo)?;
        if !self.tempo_step.is_finite() || self.tempo_step < 0.0 {
            return Err(GameError::InvalidTempoStep(self.tempo_step));
        }
        self.layout()?;
        self.windows()?;
        TimingWindows::single(self.round.metronome_window)?;
        if let Some(table) = &self.durations {
            table.validate()?;
        }
        Ok(())
    }

    /// Beat layout of every round.
    pub fn layout(&self) -> Result<RoundLayout, GameError> {
        RoundLayout::new(self.round.total_beats, self.round.input_start_beat)
    }

    /// Tolerance windows for the pattern games.
    pub fn windows(&self) -> Result<TimingWindows, GameError> {
        TimingWindows::new(self.round.strict_window, self.round.loose_window)
    }

    /// The custom grammar if one is configured, else the difficulty's.
    pub fn grammar(&self) -> Grammar {
        match &self.grammar {
            Some(g) => g.clone(),
            None => Grammar::for_difficulty(self.difficulty),
        }
    }

    /// The custom table if one is configured, else the built-in one.
    pub fn duration_table(&self) -> DurationTable {
        self.durations.clone().unwrap_or_default()
    }

    /// Everything `MiniGame::build` needs.
    pub fn minigame_settings(&self) -> Result<MiniGameSettings, GameError> {
        let grammar = self.grammar();
        let table = self.duration_table();
        table.validate()?;
        for terminal in grammar.terminals() {
            if !table.contains(&terminal) {
                warn!("grammar terminal '{terminal}' is not in the duration table");
            }
        }
        Ok(MiniGameSettings {
            layout: self.layout()?,
            windows: self.windows()?,
            metronome_windows: TimingWindows::single(self.round.metronome_window)?,
            grammar,
            table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = GameConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.max_lives, 3);
        assert_eq!(config.mode, Mode::All);
        assert_eq!(config.layout().unwrap(), RoundLayout::DEFAULT);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let yaml = "difficulty: hard\nround:\n  strict_window: 0.05\n";
        let config: GameConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.difficulty, Difficulty::Hard);
        assert_eq!(config.round.strict_window, 0.05);
        assert_eq!(config.round.loose_window, 0.20);
        assert_eq!(config.base_tempo, 60.0);
    }

    #[test]
    fn mode_parses_kebab_case() {
        let config: GameConfig = serde_yaml::from_str("mode: listen-and-repeat\n").unwrap();
        assert_eq!(config.mode.kinds(), vec![MiniGameKind::ListenAndRepeat]);
        assert_eq!(Mode::All.kinds().len(), 3);
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut c = GameConfig::default();
        c.base_tempo = 0.0;
        assert!(matches!(c.validate(), Err(GameError::InvalidTempo(_))));

        let mut c = GameConfig::default();
        c.round.input_start_beat = 8;
        assert!(matches!(
            c.validate(),
            Err(GameError::InvalidRoundLayout { .. })
        ));

        let mut c = GameConfig::default();
        c.round.strict_window = 0.3;
        assert!(c.validate().is_err());

        let mut c = GameConfig::default();
        c.max_lives = 0;
        assert!(matches!(c.validate(), Err(GameError::NoLives)));

        let mut c = GameConfig::default();
        c.tempo_step = f64::NAN;
        assert!(c.validate().is_err());
    }

    #[test]
    fn custom_grammar_overrides_difficulty() {
        let yaml = r#"
grammar:
  start: S
  rules:
    S: [[q, q, h]]
"#;
        let config: GameConfig = serde_yaml::from_str(yaml).unwrap();
        let g = config.grammar();
        assert_eq!(g.start().as_str(), "S");
        assert!(config.minigame_settings().is_ok());
    }
}
