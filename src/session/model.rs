//! Session state: lives, score, round and the minigame rotation.

use log::info;

use crate::error::GameError;
use crate::minigame::MiniGame;
use crate::rhythm::Tempo;

/// Mutable session state owned by the controller.
#[derive(Debug, Clone)]
pub struct GameModel {
    max_lives: u32,
    lives: u32,
    score: u32,
    round: u32,
    base_tempo: Tempo,
    tempo_step: f64,
    active: usize,
    rotation: Vec<MiniGame>,
}

impl GameModel {
    pub fn new(
        rotation: Vec<MiniGame>,
        max_lives: u32,
        base_tempo: Tempo,
        tempo_step: f64,
    ) -> Result<Self, GameError> {
        if rotation.is_empty() {
            return Err(GameError::EmptyRotation);
        }
        if max_lives == 0 {
            return Err(GameError::NoLives);
        }
        if !tempo_step.is_finite() || tempo_step < 0.0 {
            return Err(GameError::InvalidTempoStep(tempo_step));
        }
        Ok(Self {
            max_lives,
            lives: max_lives,
            score: 0,
            round: 1,
            base_tempo,
            tempo_step,
            active: 0,
            rotation,
        })
    }

    /// Back to round 1 with full lives and no score.
    pub fn reset(&mut self) {
        self.lives = self.max_lives;
        self.score = 0;
        self.round = 1;
        self.active = 0;
    }

    /// Lives left.
    pub fn lives(&self) -> u32 {
        self.lives
    }

    /// Lives at session start.
    pub fn max_lives(&self) -> u32 {
        self.max_lives
    }

    /// Points scored so far.
    pub fn score(&self) -> u32 {
        self.score
    }

    /// Round number, starting at 1; it increments when the rotation wraps.
    pub fn round(&self) -> u32 {
        self.round
    }

    /// `base + (round - 1) * step`.
    pub fn tempo(&self) -> Tempo {
        self.base_tempo
            .raised_by(f64::from(self.round - 1) * self.tempo_step)
    }

    /// Position of the active minigame in the rotation.
    pub fn active_index(&self) -> usize {
        self.active
    }

    /// Minigames in play order.
    pub fn rotation(&self) -> &[MiniGame] {
        &self.rotation
    }

    /// The minigame playing this round.
    pub fn current(&self) -> &MiniGame {
        &self.rotation[self.active]
    }

    /// Mutable access to the minigame playing this round.
    pub fn current_mut(&mut self) -> &mut MiniGame {
        &mut self.rotation[self.active]
    }

    /// Add points to the score.
    pub fn add_points(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Take one life. Returns `true` when none are left.
    pub fn lose_life(&mut self) -> bool {
        self.lives = self.lives.saturating_sub(1);
        info!("life lost, {} left", self.lives);
        self.is_game_over()
    }

    /// Whether no lives are left.
    pub fn is_game_over(&self) -> bool {
        self.lives == 0
    }

    /// Move to the next minigame; wrapping to the first starts a new round.
    pub fn advance(&mut self) {
        self.active = (self.active + 1) % self.rotation.len();
        if self.active == 0 {
            self.round += 1;
            info!(
                "round {} at {:.0} bpm",
                self.round,
                self.tempo().bpm()
            );
        }
    }
}
