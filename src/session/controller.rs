//! Game controller — drives the beat clock and routes input into the
//! active minigame.
//!
//! The controller is poll-driven and single-threaded. A host calls
//! [`GameController::poll`] whenever it wakes up (typically at
//! [`GameController::next_deadline`]) and [`GameController::handle_hit`] on
//! every strike. Both return the [`SessionEvent`]s produced.

use log::{debug, info};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::model::GameModel;
use super::stats::SessionStats;
use crate::config::GameConfig;
use crate::error::GameError;
use crate::event::{BeatClock, BeatFire, Clock, RoundEvent, SessionEvent, TimerHandle};
use crate::minigame::{BeatTarget, Judgment, MiniGame};
use crate::rhythm::Tempo;

/// Where the session is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Not started, or stopped by the host.
    Idle,
    Playing,
    /// Lives ran out. `start` begins a new session.
    GameOver,
}

pub struct GameController<C: Clock> {
    model: GameModel,
    clock: C,
    beat_clock: BeatClock,
    handle: Option<TimerHandle>,
    rng: ChaCha8Rng,
    phase: SessionPhase,
    life_lost_this_round: bool,
    last_beat_ms: f64,
    stats: SessionStats,
}

impl<C: Clock> GameController<C> {
    pub fn new(model: GameModel, clock: C, rng: ChaCha8Rng) -> Self {
        Self {
            model,
            clock,
            beat_clock: BeatClock::new(),
            handle: None,
            rng,
            phase: SessionPhase::Idle,
            life_lost_this_round: false,
            last_beat_ms: 0.0,
            stats: SessionStats::new(),
        }
    }

    /// Build the rotation, model and RNG described by `config`.
    pub fn from_config(config: &GameConfig, clock: C) -> Result<Self, GameError> {
        config.validate()?;
        let settings = config.minigame_settings()?;
        let rotation = config
            .mode
            .kinds()
            .into_iter()
            .map(|kind| MiniGame::build(kind, &settings))
            .collect();
        let model = GameModel::new(
            rotation,
            config.max_lives,
            Tempo::new(config.base_tempo)?,
            config.tempo_step,
        )?;
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Ok(Self::new(model, clock, rng))
    }

    /// Lives, score, round and rotation.
    pub fn model(&self) -> &GameModel {
        &self.model
    }

    /// Judgment tallies for the whole session.
    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Whether a session is running, idle or over.
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// The clock beats and strikes are read from.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// When the next beat is due, if one is scheduled.
    pub fn next_deadline(&self) -> Option<f64> {
        self.beat_clock.next_deadline()
    }

    /// Handle of the beat clock's current arming.
    pub fn timer_handle(&self) -> Option<TimerHandle> {
        self.handle
    }

    /// Start (or restart) a session from round 1.
    pub fn start(&mut self) -> Vec<SessionEvent> {
        self.beat_clock.cancel();
        self.model.reset();
        self.stats = SessionStats::new();
        self.phase = SessionPhase::Playing;
        info!(
            "session started: {} lives, {} minigame(s)",
            self.model.lives(),
            self.model.rotation().len()
        );
        let mut events = Vec::new();
        self.start_round(&mut events);
        events
    }

    /// Stop the session and cancel the beat clock.
    pub fn stop(&mut self) {
        self.beat_clock.cancel();
        self.handle = None;
        if self.phase == SessionPhase::Playing {
            self.phase = SessionPhase::Idle;
        }
    }

    fn start_round(&mut self, events: &mut Vec<SessionEvent>) {
        self.life_lost_this_round = false;
        let tempo = self.model.tempo();
        let round = self.model.round();
        let start = self.model.current_mut().start_round(tempo, &mut self.rng);
        info!(
            "round {round}: {} at {:.0} bpm",
            start.minigame_name,
            tempo.bpm()
        );
        events.push(SessionEvent::RoundStarted {
            round,
            lives: self.model.lives(),
            score: self.model.score(),
            start,
        });

        // arm() invalidates whatever handle the previous round held
        let now = self.clock.now_ms();
        self.handle = Some(self.beat_clock.arm(now, tempo.beat_ms()));
        self.last_beat_ms = now;
    }

    /// Deliver every beat that is due at the current clock reading.
    pub fn poll(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        let now = self.clock.now_ms();
        while self.phase == SessionPhase::Playing {
            let Some(fire) = self.beat_clock.poll(now) else {
                break;
            };
            events.extend(self.on_beat_fire(fire));
        }
        events
    }

    /// Handle one beat clock fire. Fires from a cancelled or re-armed clock
    /// are dropped.
    pub fn on_beat_fire(&mut self, fire: BeatFire) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Playing || !self.beat_clock.is_current(fire.handle) {
            debug!(
                "dropping stale beat fire (generation {}, tick {})",
                fire.handle.generation(),
                fire.tick
            );
            return events;
        }

        self.last_beat_ms = fire.due_ms;
        debug!("tick {} at {:.1}ms", fire.tick, fire.due_ms);
        let outcome = self.model.current_mut().on_beat(fire.tick, fire.due_ms);
        let round_over = outcome.is_round_end();

        for event in outcome.into_events() {
            let missed = matches!(event, RoundEvent::Miss { .. });
            events.push(event.into());
            if missed {
                self.stats.record_miss();
                if self.penalize(&mut events) {
                    return events;
                }
            }
        }

        if round_over {
            self.end_round(&mut events);
        }
        events
    }

    fn end_round(&mut self, events: &mut Vec<SessionEvent>) {
        self.beat_clock.cancel();
        self.handle = None;
        self.stats.record_round();
        let round = self.model.round();
        let minigame_id = self.model.current().id();
        info!("round {round} ({minigame_id}) ended");
        events.push(SessionEvent::RoundEnded { round, minigame_id });

        self.model.advance();
        if self.model.is_game_over() {
            self.game_over(events);
        } else {
            self.start_round(events);
        }
    }

    /// Which beat a strike at `now_ms` belongs to: the current beat or the
    /// next one, whichever center is closer.
    pub fn beat_target(&self, now_ms: f64) -> BeatTarget {
        let game = self.model.current();
        let period = self.model.tempo().beat_ms();
        let current = game.round().beat_index();

        let delta_current = now_ms - self.last_beat_ms;
        let delta_next = now_ms - (self.last_beat_ms + period);
        let (tick, delta_ms) = if delta_current.abs() <= delta_next.abs() {
            (current, delta_current)
        } else {
            (current + 1, delta_next)
        };

        let last = game.layout().total_beats().saturating_sub(1);
        BeatTarget {
            tick: tick.min(last),
            delta_ms,
        }
    }

    /// Judge a strike at the current clock reading.
    pub fn handle_hit(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.phase != SessionPhase::Playing {
            return events;
        }

        let now = self.clock.now_ms();
        let target = self.beat_target(now);
        let tempo = self.model.tempo();
        let judgment = self.model.current_mut().on_input(tempo, now, target);
        if judgment == Judgment::Ignore {
            debug!("strike at {now:.1}ms ignored (tick {})", target.tick);
            return events;
        }

        debug!("tick {} delta {:+.1}ms: {judgment:?}", target.tick, target.delta_ms);
        self.stats.record(&judgment);
        self.model.add_points(judgment.points());
        events.push(SessionEvent::Judged {
            tick: target.tick,
            delta_ms: target.delta_ms,
            judgment,
            score: self.model.score(),
        });

        if judgment.is_failure() {
            self.penalize(&mut events);
        }
        events
    }

    /// Take at most one life per round. Returns `true` if the game ended.
    fn penalize(&mut self, events: &mut Vec<SessionEvent>) -> bool {
        if self.life_lost_this_round {
            return false;
        }
        self.life_lost_this_round = true;
        let over = self.model.lose_life();
        events.push(SessionEvent::LifeLost {
            lives: self.model.lives(),
        });
        if over {
            self.game_over(events);
        }
        over
    }

    fn game_over(&mut self, events: &mut Vec<SessionEvent>) {
        self.beat_clock.cancel();
        self.handle = None;
        self.phase = SessionPhase::GameOver;
        info!(
            "game over: score {}, round {}, accuracy {:.1}%",
            self.model.score(),
            self.model.round(),
            self.stats.accuracy()
        );
        events.push(SessionEvent::GameOver {
            score: self.model.score(),
            round: self.model.round(),
            stats: self.stats.clone(),
        });
    }
}

/// Whether any event in `events` ended the session.
pub fn is_game_over(events: &[SessionEvent]) -> bool {
    events
        .iter()
        .any(|e| matches!(e, SessionEvent::GameOver { .. }))
}

/// Number of miss events in a batch.
pub fn count_misses(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Miss { .. }))
        .count()
}
