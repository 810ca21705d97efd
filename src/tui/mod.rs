//! Terminal host — beat LEDs, notation staff, status bar and an event log
//! around a [`GameController`].

pub mod event_log;
pub mod keybindings;
pub mod playback;
pub mod staff;
pub mod status;
pub mod theme;

pub use event_log::{EventLog, LogEntry, Tone};
pub use keybindings::{map_key, Action};
pub use playback::Playback;
pub use staff::{project_notation, render_row, StaffCell};
pub use status::{StatusInfo, Verdict};

use std::io;
use std::time::Duration;

use crossterm::event::{self, Event as CrosstermEvent, KeyEventKind};
use log::debug;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph};
use ratatui::Frame;

use crate::event::{Clock, Phase, SessionEvent, SystemClock};
use crate::minigame::{HitKind, Judgment};
use crate::rhythm::{NotationNote, BEATS_PER_MEASURE};
use crate::session::{GameController, SessionPhase};
use theme::ThemeSet;

/// Staff resolution, in cells per pattern.
const STAFF_STEPS: usize = 32;
/// Entries kept in the event log.
const LOG_CAPACITY: usize = 64;
/// Longest wait for input before checking the beat clock again.
const MAX_POLL_MS: f64 = 16.0;

/// Main application state.
pub struct App<C: Clock = SystemClock> {
    controller: GameController<C>,
    pub status: StatusInfo,
    pub log: EventLog,
    pub themes: ThemeSet,
    /// Lit LED and the phase it belongs to.
    led: Option<(u32, Phase)>,
    beat_index: Option<u32>,
    notation: Vec<NotationNote>,
    /// The pattern must be learned by ear, so the staff stays hidden.
    hide_notation: bool,
    playback: Playback,
    pub show_help: bool,
    pub should_quit: bool,
}

impl<C: Clock> App<C> {
    pub fn new(controller: GameController<C>) -> Self {
        let status = StatusInfo::new(controller.model().max_lives());
        Self {
            controller,
            status,
            log: EventLog::new(LOG_CAPACITY),
            themes: ThemeSet::load(),
            led: None,
            beat_index: None,
            notation: Vec::new(),
            hide_notation: false,
            playback: Playback::default(),
            show_help: false,
            should_quit: false,
        }
    }

    /// The session this screen drives.
    pub fn controller(&self) -> &GameController<C> {
        &self.controller
    }

    /// Lit LED and the phase it shows, if a beat has fired.
    pub fn led(&self) -> Option<(u32, Phase)> {
        self.led
    }

    /// Notation of the current round.
    pub fn notation(&self) -> &[NotationNote] {
        &self.notation
    }

    /// Scheduled flashes for the pattern-echo playback.
    pub fn playback(&self) -> &Playback {
        &self.playback
    }

    /// Handle a user action.
    pub fn handle_action(&mut self, action: Action) {
        match action {
            Action::Quit => {
                self.controller.stop();
                self.should_quit = true;
            }
            Action::Start => {
                if self.controller.phase() == SessionPhase::Playing {
                    return;
                }
                self.log.clear();
                self.status = StatusInfo::new(self.controller.model().max_lives());
                let events = self.controller.start();
                self.apply(events);
            }
            Action::Stop => {
                self.controller.stop();
                self.status.session = self.controller.phase();
                self.status.phase = None;
                self.led = None;
                self.beat_index = None;
                self.playback.clear();
            }
            Action::Hit => {
                let events = self.controller.handle_hit();
                self.apply(events);
            }
            Action::CycleTheme => {
                self.themes.cycle();
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
        }
    }

    /// Deliver due beats.
    pub fn tick(&mut self) {
        let events = self.controller.poll();
        self.apply(events);
    }

    fn apply(&mut self, events: Vec<SessionEvent>) {
        for event in events {
            self.status.apply(&event);
            self.log.push(&event);
            match event {
                SessionEvent::RoundStarted { start, .. } => {
                    self.hide_notation = start.pattern_symbols.is_some();
                    self.notation = start.notation;
                    self.led = None;
                    self.beat_index = None;
                    self.playback.clear();
                }
                SessionEvent::Beat {
                    beat_index,
                    led_index,
                    phase,
                } => {
                    self.led = Some((led_index, phase));
                    self.beat_index = Some(beat_index);
                }
                SessionEvent::PlayPattern {
                    start_times_sec, ..
                } => {
                    let now = self.controller.clock().now_ms();
                    debug!("playback of {} onsets from {now:.1}ms", start_times_sec.len());
                    self.playback.schedule(now, &start_times_sec);
                }
                SessionEvent::GameOver { .. } => {
                    self.led = None;
                    self.beat_index = None;
                }
                _ => {}
            }
        }
    }

    /// Input cursor as a position in the pattern, during the input phase.
    fn cursor(&self) -> Option<f64> {
        let beat = self.beat_index?;
        let layout = self.controller.model().current().layout();
        if !layout.is_input_tick(beat) {
            return None;
        }
        let into = beat - layout.input_start_beat();
        Some(f64::from(into) / f64::from(layout.input_beats()))
    }

    fn played_flags(&self) -> Vec<bool> {
        self.controller
            .model()
            .current()
            .round()
            .expected_hits()
            .iter()
            .map(|h| h.is_matched())
            .collect()
    }

    /// Render the entire UI.
    pub fn draw(&mut self, frame: &mut Frame) {
        let size = frame.area();

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Title
                Constraint::Length(5), // LEDs
                Constraint::Length(5), // Staff
                Constraint::Min(3),    // Event log
                Constraint::Length(1), // Status bar
            ])
            .split(size);

        self.draw_title(frame, chunks[0]);
        self.draw_leds(frame, chunks[1]);
        self.draw_staff(frame, chunks[2]);
        self.draw_log(frame, chunks[3]);
        self.draw_status(frame, chunks[4]);

        if self.show_help {
            self.draw_help(frame, size);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let theme = self.themes.active();
        let name = if self.status.minigame_name.is_empty() {
            "Beat the Beat"
        } else {
            self.status.minigame_name.as_str()
        };
        let hint = match self.controller.phase() {
            SessionPhase::Playing => "Space to hit",
            SessionPhase::Idle => "press s to start",
            SessionPhase::GameOver => "press s to play again",
        };
        let line = Line::from(vec![
            Span::styled(
                format!(" {name} "),
                Style::default()
                    .fg(theme.title)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!(" {hint}"), Style::default().fg(theme.staff_empty)),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border));
        frame.render_widget(Paragraph::new(line).block(block), area);
    }

    fn draw_leds(&self, frame: &mut Frame, area: Rect) {
        let theme = self.themes.active();
        let mut spans = vec![Span::raw(" ")];
        for i in 0..BEATS_PER_MEASURE {
            let (glyph, color) = match self.led {
                Some((lit, phase)) if lit == i => {
                    let color = match phase {
                        Phase::Input => theme.led_input,
                        Phase::Listen | Phase::Read => theme.led_listen,
                    };
                    ("██", color)
                }
                _ => ("░░", theme.led_off),
            };
            spans.push(Span::styled(glyph, Style::default().fg(color)));
            spans.push(Span::raw("  "));
        }

        let now = self.controller.clock().now_ms();
        if self.playback.is_lit(now) {
            spans.push(Span::styled(
                " ♪",
                Style::default()
                    .fg(theme.led_listen)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(format!(" {} ", self.status.phase_display()));
        frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
    }

    fn draw_staff(&self, frame: &mut Frame, area: Rect) {
        let theme = self.themes.active();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(" Pattern ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        if self.notation.is_empty() {
            return;
        }

        let played = self.played_flags();
        let lines = if self.hide_notation {
            let heard = self.playback.played(self.controller.clock().now_ms());
            let done = played.iter().filter(|p| **p).count();
            vec![
                Line::from(Span::styled(
                    format!(" listen: {heard}/{} notes", self.playback.len()),
                    Style::default().fg(theme.staff_hold),
                )),
                Line::from(Span::styled(
                    format!(" played: {done}/{}", played.len()),
                    Style::default().fg(theme.staff_matched),
                )),
            ]
        } else {
            let cells = project_notation(&self.notation, STAFF_STEPS, &played, self.cursor());
            let spans: Vec<Span> = std::iter::once(Span::raw(" "))
                .chain(cells.iter().map(|cell| {
                    let color = match cell {
                        StaffCell::Empty => theme.staff_empty,
                        StaffCell::Onset => theme.staff_note,
                        StaffCell::Played => theme.staff_matched,
                        StaffCell::Hold => theme.staff_hold,
                        StaffCell::Cursor => theme.led_input,
                    };
                    Span::styled(cell.glyph().to_string(), Style::default().fg(color))
                }))
                .collect();
            let symbols: Vec<&str> = self.notation.iter().map(|n| n.kind.as_str()).collect();
            vec![
                Line::from(spans),
                Line::from(Span::styled(
                    format!(" {}", symbols.join(" ")),
                    Style::default().fg(theme.staff_hold),
                )),
            ]
        };
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_log(&self, frame: &mut Frame, area: Rect) {
        let theme = self.themes.active();
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.border))
            .title(" Events ");
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let lines: Vec<Line> = self
            .log
            .recent(inner.height as usize)
            .map(|entry| {
                let color = match entry.tone {
                    Tone::Info => theme.status_fg,
                    Tone::Success => theme.perfect,
                    Tone::Fault => theme.fault,
                };
                Line::from(Span::styled(&entry.message, Style::default().fg(color)))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let theme = self.themes.active();
        let verdict_color = match self.status.last_verdict.map(|v| v.judgment) {
            Some(Judgment::Score {
                kind: HitKind::Perfect,
                ..
            }) => theme.perfect,
            Some(Judgment::Score {
                kind: HitKind::Good,
                ..
            }) => theme.good,
            Some(Judgment::TimingError { .. }) => theme.fault,
            Some(Judgment::Ignore) | None => theme.status_fg,
        };

        let line = Line::from(vec![
            Span::styled(
                format!(" {} ", self.status.phase_display()),
                Style::default()
                    .fg(theme.status_accent)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(
                " Round {} | BPM:{:.0} | Score {} ",
                self.status.round, self.status.bpm, self.status.score
            )),
            Span::styled(
                format!(" {} ", self.status.lives_display()),
                Style::default().fg(theme.lives),
            ),
            Span::styled(
                format!(" {} ", self.status.verdict_display()),
                Style::default().fg(verdict_color),
            ),
        ]);

        let paragraph =
            Paragraph::new(line).style(Style::default().bg(theme.status_bg).fg(theme.status_fg));
        frame.render_widget(paragraph, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let theme = self.themes.active();
        let width = (area.width * 50 / 100).max(36).min(area.width);
        let height = (keybindings::HELP.len() as u16 + 2).min(area.height);
        let x = area.x + (area.width.saturating_sub(width)) / 2;
        let y = area.y + (area.height.saturating_sub(height)) / 2;
        let overlay = Rect::new(x, y, width, height);

        let block = Block::default()
            .style(Style::default().bg(Color::Black))
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.title))
            .title(" Keys ");
        let inner = block.inner(overlay);
        frame.render_widget(Clear, overlay);
        frame.render_widget(block, overlay);

        let lines: Vec<Line> = keybindings::HELP
            .iter()
            .map(|(key, desc)| {
                Line::from(vec![
                    Span::styled(format!(" {key:<14}"), Style::default().fg(theme.title)),
                    Span::styled(*desc, Style::default().fg(theme.status_fg)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);
    }

    /// How long to wait for input before the next beat is due.
    fn poll_timeout(&self) -> Duration {
        let wait = match self.controller.next_deadline() {
            Some(deadline) => (deadline - self.controller.clock().now_ms())
                .max(0.0)
                .min(MAX_POLL_MS),
            None => MAX_POLL_MS,
        };
        Duration::from_secs_f64(wait / 1000.0)
    }

    /// Run the main event loop.
    pub fn run(
        &mut self,
        terminal: &mut ratatui::Terminal<impl ratatui::backend::Backend>,
    ) -> io::Result<()> {
        while !self.should_quit {
            terminal
                .draw(|frame| self.draw(frame))
                .map_err(|e| io::Error::other(e.to_string()))?;

            if event::poll(self.poll_timeout())? {
                if let CrosstermEvent::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        if let Some(action) = map_key(key) {
                            self.handle_action(action);
                        }
                    }
                }
            }

            self.tick();
        }
        Ok(())
    }
}
