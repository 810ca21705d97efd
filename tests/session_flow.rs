//! Session orchestration: rotation, tempo progression, life loss and
//! game over, driven by a manual clock at 60 bpm (a round lasts 9000ms).

use beat_the_beat::config::{GameConfig, Mode};
use beat_the_beat::event::{BeatFire, Clock, ManualClock, SessionEvent};
use beat_the_beat::session::{count_misses, is_game_over, GameController, SessionPhase};

const ROUND_MS: f64 = 9000.0;

fn controller(mode: Mode, lives: u32) -> (GameController<ManualClock>, ManualClock) {
    let config = GameConfig {
        mode,
        max_lives: lives,
        seed: Some(21),
        ..GameConfig::default()
    };
    let clock = ManualClock::new(0.0);
    let c = GameController::from_config(&config, clock.clone()).unwrap();
    (c, clock)
}

/// Let one round run without any strikes.
fn sit_out_round(c: &mut GameController<ManualClock>, clock: &ManualClock) -> Vec<SessionEvent> {
    clock.advance(ROUND_MS);
    c.poll()
}

fn lives_lost(events: &[SessionEvent]) -> usize {
    events
        .iter()
        .filter(|e| matches!(e, SessionEvent::LifeLost { .. }))
        .count()
}

#[test]
fn full_rotation_raises_round_and_tempo_once() {
    let (mut c, clock) = controller(Mode::All, 10);
    let start = c.start();
    assert!(matches!(start[0], SessionEvent::RoundStarted { round: 1, .. }));
    assert_eq!(c.model().tempo().bpm(), 60.0);

    let mut ids = vec![c.model().current().id()];
    for _ in 0..2 {
        sit_out_round(&mut c, &clock);
        assert_eq!(c.model().round(), 1);
        ids.push(c.model().current().id());
    }
    assert_eq!(ids, vec!["follow-the-beat", "listen-and-repeat", "read-and-play"]);

    let events = sit_out_round(&mut c, &clock);
    assert_eq!(c.model().round(), 2);
    assert_eq!(c.model().tempo().bpm(), 66.0);
    assert_eq!(c.model().current().id(), "follow-the-beat");
    assert!(events.iter().any(|e| matches!(
        e,
        SessionEvent::RoundStarted { round: 2, start, .. } if start.tempo_bpm == 66.0
    )));
}

#[test]
fn at_most_one_life_per_round() {
    let (mut c, clock) = controller(Mode::FollowTheBeat, 5);
    c.start();

    // Strike wildly during the input phase, then let every beat go unplayed.
    clock.set(5500.0);
    let mut events = c.poll();
    for t in [5500.0, 5520.0, 6480.0] {
        clock.set(t);
        events.extend(c.handle_hit());
    }
    clock.set(ROUND_MS);
    events.extend(c.poll());

    assert!(count_misses(&events) >= 3);
    assert_eq!(lives_lost(&events), 1);
    assert_eq!(c.model().lives(), 4);
    assert_eq!(c.stats().rounds_played, 1);
}

#[test]
fn running_out_of_lives_ends_the_session() {
    let (mut c, clock) = controller(Mode::FollowTheBeat, 2);
    c.start();
    let first = sit_out_round(&mut c, &clock);
    assert!(!is_game_over(&first));
    assert_eq!(c.model().lives(), 1);

    let second = sit_out_round(&mut c, &clock);
    assert!(is_game_over(&second));
    assert_eq!(c.phase(), SessionPhase::GameOver);
    assert_eq!(c.model().lives(), 0);
    assert_eq!(c.next_deadline(), None);

    // Nothing happens after game over.
    clock.advance(ROUND_MS);
    assert!(c.poll().is_empty());
    assert!(c.handle_hit().is_empty());

    // A restart starts over from round 1 with full lives.
    let restart = c.start();
    assert!(matches!(
        restart[0],
        SessionEvent::RoundStarted {
            round: 1,
            lives: 2,
            score: 0,
            ..
        }
    ));
}

#[test]
fn fires_from_an_old_arming_are_dropped() {
    let (mut c, clock) = controller(Mode::FollowTheBeat, 3);
    c.start();
    let old = c.timer_handle().unwrap();
    sit_out_round(&mut c, &clock);
    let current = c.timer_handle().unwrap();
    assert_ne!(old, current);

    let beat_before = c.model().current().round().beat_index();
    let stale = BeatFire {
        handle: old,
        tick: 3,
        due_ms: clock.now_ms(),
    };
    assert!(c.on_beat_fire(stale).is_empty());
    assert_eq!(c.model().current().round().beat_index(), beat_before);
}

#[test]
fn stop_cancels_the_clock() {
    let (mut c, clock) = controller(Mode::All, 3);
    c.start();
    clock.set(2500.0);
    assert_eq!(c.poll().len(), 2);
    c.stop();
    assert_eq!(c.phase(), SessionPhase::Idle);
    clock.set(20_000.0);
    assert!(c.poll().is_empty());
}
