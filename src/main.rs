//! Beat the Beat — command-line entry point.
//!
//! `play` opens the terminal game; `autoplay` drives a session with a
//! simulated player and prints every event.

use std::cell::Cell;
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use log::{error, info, LevelFilter};

use beat_the_beat::autoplay::{self, AutoPlayer, AutoplayReport, OutputFormat, PlayerProfile};
use beat_the_beat::config::{GameConfig, Mode};
use beat_the_beat::event::{Clock, ManualClock, SystemClock};
use beat_the_beat::rhythm::Difficulty;
use beat_the_beat::session::GameController;
use beat_the_beat::tui::App;

#[derive(Parser)]
#[command(name = "beat-the-beat", version)]
#[command(about = "Rhythm trainer: hear or read a pattern, then play it on the beat", long_about = None)]
struct Cli {
    /// Log the game core at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play in the terminal
    Play {
        #[command(flatten)]
        game: GameArgs,

        /// Write logs to this file (the game screen hides stderr)
        #[arg(long)]
        log_file: Option<PathBuf>,
    },
    /// Let a simulated player run a session and print its events
    Autoplay {
        #[command(flatten)]
        game: GameArgs,

        #[command(flatten)]
        player: PlayerArgs,

        /// Stop after this many rounds
        #[arg(short, long, default_value = "12")]
        rounds: u32,

        /// Event output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,

        /// Shorthand for --format json
        #[arg(long, conflicts_with = "format")]
        json: bool,

        /// Follow the wall clock instead of simulated time
        #[arg(long)]
        realtime: bool,
    },
}

/// Overrides applied on top of the config file.
#[derive(Args)]
struct GameArgs {
    /// Config file (default: ~/.beat-the-beat/config.yaml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short, long, value_enum)]
    difficulty: Option<Difficulty>,

    #[arg(short, long, value_enum)]
    mode: Option<Mode>,

    /// Seed for pattern generation
    #[arg(short, long)]
    seed: Option<u64>,

    #[arg(short, long)]
    lives: Option<u32>,

    /// Tempo of the first round, in bpm
    #[arg(long)]
    base_tempo: Option<f64>,

    /// Tempo increase per completed rotation, in bpm
    #[arg(long)]
    tempo_step: Option<f64>,
}

#[derive(Args)]
struct PlayerArgs {
    /// Strikes land within ±jitter ms of each onset
    #[arg(long, default_value = "30.0")]
    jitter: f64,

    /// Probability of skipping a note
    #[arg(long, default_value = "0.05")]
    skip: f64,

    /// Seed for the simulated player
    #[arg(long, default_value = "1")]
    player_seed: u64,
}

impl GameArgs {
    fn load(&self) -> Result<GameConfig, beat_the_beat::GameError> {
        let mut config = match &self.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::load_default()?,
        };
        if let Some(d) = self.difficulty {
            config.difficulty = d;
        }
        if let Some(m) = self.mode {
            config.mode = m;
        }
        if let Some(s) = self.seed {
            config.seed = Some(s);
        }
        if let Some(l) = self.lives {
            config.max_lives = l;
        }
        if let Some(t) = self.base_tempo {
            config.base_tempo = t;
        }
        if let Some(t) = self.tempo_step {
            config.tempo_step = t;
        }
        config.validate()?;
        Ok(config)
    }
}

impl From<&PlayerArgs> for PlayerProfile {
    fn from(args: &PlayerArgs) -> Self {
        Self {
            jitter_ms: args.jitter,
            skip_probability: args.skip,
            seed: args.player_seed,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{e}");
        eprintln!("error: {e}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Play { game, log_file } => {
            init_logging(cli.verbose, LogTarget::File(log_file.as_deref()))?;
            let config = game.load()?;
            play(&config)
        }
        Command::Autoplay {
            game,
            player,
            rounds,
            format,
            json,
            realtime,
        } => {
            init_logging(cli.verbose, LogTarget::Stderr)?;
            let config = game.load()?;
            let format = if json { OutputFormat::Json } else { format };
            let report = if realtime {
                run_autoplay(&config, &player, rounds, format, SystemClock::new(), sleep_until)?
            } else {
                run_autoplay(&config, &player, rounds, format, ManualClock::new(0.0), |c, t| {
                    c.set(t)
                })?
            };
            print_report(&report, format)?;
            Ok(())
        }
    }
}

enum LogTarget<'a> {
    Stderr,
    /// Log only if a file is given.
    File(Option<&'a Path>),
}

fn init_logging(verbose: bool, target: LogTarget) -> io::Result<()> {
    let mut builder = match target {
        LogTarget::Stderr => {
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        }
        LogTarget::File(Some(path)) => {
            let mut b =
                env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
            b.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
            b
        }
        LogTarget::File(None) => return Ok(()),
    };
    if verbose {
        builder.filter_module("beat_the_beat", LevelFilter::Debug);
    }
    builder.init();
    Ok(())
}

fn play(config: &GameConfig) -> Result<(), Box<dyn std::error::Error>> {
    let controller = GameController::from_config(config, SystemClock::new())?;
    let mut app = App::new(controller);

    let mut terminal = ratatui::init();
    let result = app.run(&mut terminal);
    ratatui::restore();
    result?;

    let model = app.controller().model();
    let stats = app.controller().stats();
    if stats.rounds_played > 0 || stats.total() > 0 {
        println!(
            "round {} | score {} | accuracy {:.1}%",
            model.round(),
            model.score(),
            stats.accuracy()
        );
    }
    Ok(())
}

fn sleep_until(clock: &SystemClock, target_ms: f64) {
    let wait = target_ms - clock.now_ms();
    if wait > 0.0 {
        thread::sleep(Duration::from_secs_f64(wait / 1000.0));
    }
}

fn run_autoplay<C: Clock + Clone>(
    config: &GameConfig,
    player: &PlayerArgs,
    rounds: u32,
    format: OutputFormat,
    clock: C,
    wait: impl Fn(&C, f64),
) -> Result<AutoplayReport, Box<dyn std::error::Error>> {
    let stop = Arc::new(AtomicBool::new(false));
    {
        let stop = Arc::clone(&stop);
        ctrlc::set_handler(move || stop.store(true, Ordering::SeqCst))?;
    }

    let mut controller = GameController::from_config(config, clock.clone())?;
    let mut player = AutoPlayer::new(player.into());
    info!(
        "autoplay: {rounds} round(s), mode {:?}, difficulty {:?}",
        config.mode, config.difficulty
    );

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let write_failed = Cell::new(false);
    let report = autoplay::run(
        &mut controller,
        &mut player,
        rounds,
        |t| wait(&clock, t),
        || !stop.load(Ordering::SeqCst) && !write_failed.get(),
        |event| {
            if write_failed.get() {
                return;
            }
            if let Err(e) = autoplay::write_event(&mut out, format, event) {
                error!("cannot write event: {e}");
                write_failed.set(true);
            }
        },
    );
    out.flush()?;
    Ok(report)
}

fn print_report(report: &AutoplayReport, format: OutputFormat) -> io::Result<()> {
    let mut out = io::stdout().lock();
    match format {
        OutputFormat::Text => writeln!(
            out,
            "{} round(s), score {}, {} lives left, accuracy {:.1}%{}",
            report.rounds_completed,
            report.score,
            report.lives,
            report.stats.accuracy(),
            if report.game_over { " (game over)" } else { "" }
        ),
        OutputFormat::Json => {
            let line = serde_json::to_string(report).map_err(io::Error::other)?;
            writeln!(out, "{line}")
        }
    }
}
