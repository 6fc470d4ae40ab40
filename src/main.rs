//! Space Courier headless host
//!
//! Runs an autopilot session at the fixed timestep, logs what happens and
//! prints a JSON summary with the high-score placement.

use std::error::Error;
use std::io;
use std::path::PathBuf;

use glam::Vec2;
use serde::Serialize;

use space_courier::consts::*;
use space_courier::sim::{AchievementId, GameEvent, GamePhase, GameState, SessionStats, TickInput, tick};
use space_courier::{HighScores, Tuning};

/// Host frame length; the sim substeps inside it
const FRAME_DT: f32 = 1.0 / 30.0;
/// Threats closer than this (center distance) take priority over pickups
const DANGER_RADIUS: f32 = 260.0;

#[derive(Debug)]
struct Cli {
    seed: u64,
    seconds: f32,
    tuning_path: Option<PathBuf>,
    highscores_path: Option<PathBuf>,
    help: bool,
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            seed: 1,
            seconds: 120.0,
            tuning_path: None,
            highscores_path: None,
            help: false,
        }
    }
}

fn print_help() {
    println!(
        r#"space-courier - headless autopilot session

USAGE:
  space-courier [--seed N] [--seconds S] [--tuning FILE] [--highscores FILE]

OPTIONS:
  --seed N            RNG seed (default 1)
  --seconds S         Stop after S seconds of play if still alive (default 120)
  --tuning FILE       JSON balance override (partial files allowed)
  --highscores FILE   Leaderboard to rank against and update
  --help, -h          Show this help.

Set RUST_LOG=debug for per-event logging.
"#
    );
}

fn invalid(msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, msg)
}

fn parse_cli() -> io::Result<Cli> {
    let mut cli = Cli::default();
    let mut args = std::env::args().skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => cli.help = true,
            "--seed" => {
                let value = args.next().ok_or_else(|| invalid("--seed requires a number".into()))?;
                cli.seed = value
                    .parse()
                    .map_err(|e| invalid(format!("bad --seed {value:?}: {e}")))?;
            }
            "--seconds" => {
                let value = args
                    .next()
                    .ok_or_else(|| invalid("--seconds requires a number".into()))?;
                cli.seconds = value
                    .parse()
                    .map_err(|e| invalid(format!("bad --seconds {value:?}: {e}")))?;
            }
            "--tuning" => {
                let path = args.next().ok_or_else(|| invalid("--tuning requires a path".into()))?;
                cli.tuning_path = Some(PathBuf::from(path));
            }
            "--highscores" => {
                let path = args
                    .next()
                    .ok_or_else(|| invalid("--highscores requires a path".into()))?;
                cli.highscores_path = Some(PathBuf::from(path));
            }
            other => return Err(invalid(format!("unknown argument: {other} (try --help)"))),
        }
    }

    Ok(cli)
}

/// Pick a ship target: flee the nearest close threat, otherwise chase the
/// nearest pickup, otherwise drift back to the middle.
fn autopilot_target(state: &GameState) -> Vec2 {
    let ship = state.ship.center();

    let nearest = |want_threat: bool| {
        state
            .entities
            .iter()
            // Ignore anything already below the ship
            .filter(|e| e.kind.is_threat() == want_threat && e.center().y + 40.0 >= ship.y)
            .min_by(|a, b| {
                a.center()
                    .distance_squared(ship)
                    .total_cmp(&b.center().distance_squared(ship))
            })
    };

    if let Some(threat) = nearest(true).filter(|t| t.center().distance(ship) < DANGER_RADIUS) {
        let away = if threat.center().x > ship.x { -1.0 } else { 1.0 };
        let mut x = ship.x + away * DANGER_RADIUS;
        // Pinned against a wall: go the other way
        if !(0.0..=FIELD_WIDTH).contains(&x) {
            x = ship.x - away * DANGER_RADIUS;
        }
        return Vec2::new(x, ship.y);
    }

    if let Some(pickup) = nearest(false) {
        return Vec2::new(pickup.center().x, ship.y);
    }

    Vec2::new(FIELD_WIDTH * 0.5, ship.y)
}

#[derive(Debug, Serialize)]
struct Summary {
    seed: u64,
    score: u64,
    level: u32,
    lives: u8,
    game_over: bool,
    difficulty: f32,
    skill: f32,
    stats: SessionStats,
    achievements: Vec<(&'static str, u32)>,
    high_score_rank: Option<usize>,
}

fn log_event(event: &GameEvent) {
    match event {
        GameEvent::LevelUp { level } => log::info!("level up: {level}"),
        GameEvent::LifeLost { cause, lives_left } => log::info!("life lost ({cause:?}), {lives_left} left"),
        GameEvent::Sound(_) => {}
        other => log::debug!("{other:?}"),
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let cli = parse_cli()?;
    if cli.help {
        print_help();
        return Ok(());
    }

    let tuning = match &cli.tuning_path {
        Some(path) => Tuning::from_json(&std::fs::read_to_string(path)?)?,
        None => Tuning::default(),
    };

    let mut high_scores = match &cli.highscores_path {
        Some(path) if path.exists() => HighScores::from_json(&std::fs::read_to_string(path)?)?,
        _ => HighScores::new(),
    };

    log::info!("Space Courier starting (seed {}, {}s)", cli.seed, cli.seconds);
    let mut state = GameState::with_tuning(cli.seed, tuning);

    let mut accumulator = 0.0;
    while state.phase == GamePhase::Active && state.milestones.stats.play_time < cli.seconds {
        accumulator += FRAME_DT;

        let mut substeps = 0;
        while accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            let input = TickInput {
                target: Some(autopilot_target(&state)),
                ..Default::default()
            };
            let result = tick(&mut state, &input, SIM_DT);
            result.events.iter().for_each(log_event);
            accumulator -= SIM_DT;
            substeps += 1;
        }
    }

    let stats = state.milestones.stats.clone();
    let high_score_rank = high_scores.add_score(state.score, state.difficulty.level(), stats.play_time);
    if let Some(path) = &cli.highscores_path {
        std::fs::write(path, high_scores.to_json()?)?;
    }

    let summary = Summary {
        seed: cli.seed,
        score: state.score,
        level: state.difficulty.level(),
        lives: state.lives,
        game_over: state.phase == GamePhase::GameOver,
        difficulty: state.difficulty.difficulty(),
        skill: state.difficulty.skill(),
        achievements: AchievementId::ALL
            .iter()
            .map(|id| (id.as_str(), state.milestones.progress(*id)))
            .filter(|(_, progress)| *progress > 0)
            .collect(),
        stats,
        high_score_rank,
    };
    println!("{}", serde_json::to_string_pretty(&summary)?);

    Ok(())
}
