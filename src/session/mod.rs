//! Session orchestration — lives, score, tempo progression and the
//! minigame rotation, driven by a beat clock.

pub mod controller;
pub mod model;
pub mod stats;

pub use controller::{count_misses, is_game_over, GameController, SessionPhase};
pub use model::GameModel;
pub use stats::SessionStats;
