//! Beat the Beat — a terminal rhythm trainer.
//!
//! A round counts in, then asks the player to strike a generated rhythm on
//! the beat. Patterns come from a stochastic duration grammar, are converted
//! to expected onset times at the current tempo, and every strike is judged
//! against the closest onset not yet played.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod event;
pub mod minigame;
pub mod rhythm;
pub mod session;
pub mod tui;

pub use error::GameError;
