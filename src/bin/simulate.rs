use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use zocats::engine::utils::{manhattan, offset};
use zocats::engine::{GameBoard, GameBoardOptions};
use zocats::types::{Direction, TerminalState};

const DEFAULT_GAMES: u32 = 20;
const DEFAULT_MAX_TURNS: u64 = 2_000;

#[derive(Parser, Debug)]
#[command(author, version, about = "Plays headless Zocats sessions with a greedy bot")]
struct Cli {
    #[arg(long)]
    games: Option<u32>,
    #[arg(long)]
    seed: Option<u32>,
    #[arg(long)]
    max_turns: Option<u64>,
    #[arg(long)]
    summary_out: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
enum Outcome {
    Victory,
    Defeat,
    Unfinished,
}

impl From<Option<TerminalState>> for Outcome {
    fn from(value: Option<TerminalState>) -> Self {
        match value {
            Some(TerminalState::Victory) => Self::Victory,
            Some(TerminalState::Defeat) => Self::Defeat,
            None => Self::Unfinished,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
struct GameResultLine {
    game: u32,
    seed: u32,
    #[serde(rename = "sessionId")]
    session_id: String,
    outcome: Outcome,
    turns: u64,
    #[serde(rename = "livesLeft")]
    lives_left: i32,
    #[serde(rename = "kittensSaved")]
    kittens_saved: i32,
    anomalies: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
struct RunSummary {
    #[serde(rename = "generatedAt")]
    generated_at: String,
    games: usize,
    #[serde(rename = "outcomeCounts")]
    outcome_counts: BTreeMap<String, usize>,
    #[serde(rename = "averageTurns")]
    average_turns: u64,
    #[serde(rename = "anomalyCount")]
    anomaly_count: usize,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let games = cli.games.unwrap_or(DEFAULT_GAMES).max(1);
    let base_seed = cli.seed.unwrap_or_else(rand::random::<u32>);
    let max_turns = cli.max_turns.unwrap_or(DEFAULT_MAX_TURNS).max(1);

    let mut results = Vec::new();
    for game in 0..games {
        let seed = base_seed.wrapping_add(game);
        let result = play_game(game, seed, max_turns);
        info!(
            game,
            seed,
            outcome = ?result.outcome,
            turns = result.turns,
            "game finished"
        );
        for anomaly in &result.anomalies {
            warn!(game, seed, anomaly = %anomaly, "anomaly detected");
        }
        match serde_json::to_string(&result) {
            Ok(line) => println!("{line}"),
            Err(error) => warn!(%error, "failed to serialize game result"),
        }
        results.push(result);
    }

    let generated_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let summary = build_run_summary(&results, generated_at);
    if let Some(path) = cli.summary_out.as_ref() {
        if let Err(error) = write_summary(path, &summary) {
            warn!(path = %path.to_string_lossy(), %error, "summary write failed");
            std::process::exit(2);
        }
    }
    info!(
        games = summary.games,
        average_turns = summary.average_turns,
        anomalies = summary.anomaly_count,
        "run finished"
    );

    if summary.anomaly_count > 0 {
        std::process::exit(1);
    }
}

fn play_game(game: u32, seed: u32, max_turns: u64) -> GameResultLine {
    let mut board = GameBoard::new(seed, GameBoardOptions::default());
    let mut anomalies = Vec::new();
    let mut attempts = 0u64;

    while !board.is_ended() && attempts < max_turns {
        attempts += 1;
        let lives_before = board.lives();
        let kittens_before = board.kittens_saved();
        let direction = choose_direction(&board);
        let report = board.move_player(direction);
        if !report.moved {
            continue;
        }
        check_invariants(&board, lives_before, kittens_before, &mut anomalies);
    }

    GameResultLine {
        game,
        seed,
        session_id: board.session_id.clone(),
        outcome: Outcome::from(board.terminal()),
        turns: board.turn(),
        lives_left: board.lives(),
        kittens_saved: board.kittens_saved(),
        anomalies,
    }
}

fn check_invariants(
    board: &GameBoard,
    lives_before: i32,
    kittens_before: i32,
    anomalies: &mut Vec<String>,
) {
    let pos = board.player_position();
    if pos.x < 0 || pos.y < 0 || pos.x >= board.map.width || pos.y >= board.map.height {
        anomalies.push(format!("turn {}: player left the grid at {:?}", board.turn(), pos));
    }
    if board.lives() > lives_before {
        anomalies.push(format!("turn {}: lives increased", board.turn()));
    }
    if board.kittens_saved() < kittens_before {
        anomalies.push(format!("turn {}: saved kittens decreased", board.turn()));
    }
    if board.kittens_saved() > kittens_before
        && !board.is_ended()
        && board.kitten_position() == pos
    {
        anomalies.push(format!("turn {}: kitten respawned under player", board.turn()));
    }
}

fn choose_direction(board: &GameBoard) -> Option<Direction> {
    let here = board.player_position();
    let kitten = board.kitten_position();
    let zombies = board.zombie_positions();

    Direction::ALL
        .into_iter()
        .filter(|dir| board.is_valid_move(*dir))
        .min_by_key(|dir| {
            let next = offset(here, *dir);
            let danger = zombies
                .iter()
                .filter(|zombie| manhattan(**zombie, next) <= 1)
                .count() as i32;
            (danger, manhattan(next, kitten))
        })
}

fn build_run_summary(results: &[GameResultLine], generated_at: String) -> RunSummary {
    let mut outcome_counts = BTreeMap::new();
    for result in results {
        let key = match result.outcome {
            Outcome::Victory => "victory",
            Outcome::Defeat => "defeat",
            Outcome::Unfinished => "unfinished",
        };
        *outcome_counts.entry(key.to_string()).or_insert(0) += 1;
    }
    let total_turns: u64 = results.iter().map(|result| result.turns).sum();
    RunSummary {
        generated_at,
        games: results.len(),
        outcome_counts,
        average_turns: if results.is_empty() {
            0
        } else {
            total_turns / results.len() as u64
        },
        anomaly_count: results.iter().map(|result| result.anomalies.len()).sum(),
    }
}

fn write_summary(path: &Path, summary: &RunSummary) -> io::Result<()> {
    let text = serde_json::to_string_pretty(summary).map_err(io::Error::other)?;
    std::fs::write(path, text)
}

#[cfg(test)]
mod tests {
    use std::time::{SystemTime, UNIX_EPOCH};

    use super::*;

    fn make_result(outcome: Outcome, turns: u64) -> GameResultLine {
        GameResultLine {
            game: 0,
            seed: 1,
            session_id: "test".to_string(),
            outcome,
            turns,
            lives_left: 0,
            kittens_saved: 0,
            anomalies: Vec::new(),
        }
    }

    #[test]
    fn bot_games_run_without_anomalies() {
        for seed in 1..=25u32 {
            let result = play_game(seed, seed, DEFAULT_MAX_TURNS);
            assert!(result.anomalies.is_empty(), "{:?}", result.anomalies);
            assert!(result.turns > 0);
            assert!((0..=9).contains(&result.lives_left));
        }
    }

    #[test]
    fn bot_always_picks_an_in_bounds_move() {
        let board = GameBoard::new(5, GameBoardOptions::default());
        let dir = choose_direction(&board).expect("a move exists");
        assert!(board.is_valid_move(dir));
    }

    #[test]
    fn summary_counts_outcomes_and_averages_turns() {
        let summary = build_run_summary(
            &[
                make_result(Outcome::Victory, 40),
                make_result(Outcome::Defeat, 60),
                make_result(Outcome::Victory, 20),
            ],
            "2026-01-01T00:00:00.000Z".to_string(),
        );
        assert_eq!(summary.games, 3);
        assert_eq!(summary.average_turns, 40);
        assert_eq!(summary.outcome_counts.get("victory"), Some(&2));
        assert_eq!(summary.outcome_counts.get("defeat"), Some(&1));
        assert_eq!(summary.anomaly_count, 0);
    }

    #[test]
    fn empty_run_has_zero_average() {
        let summary = build_run_summary(&[], "now".to_string());
        assert_eq!(summary.average_turns, 0);
        assert!(summary.outcome_counts.is_empty());
    }

    #[test]
    fn write_summary_returns_error_when_parent_does_not_exist() {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis();
        let target = std::env::temp_dir()
            .join(format!("zocats-missing-{now}"))
            .join("summary.json");
        let summary = build_run_summary(&[make_result(Outcome::Defeat, 10)], "now".to_string());
        assert!(write_summary(&target, &summary).is_err());
    }
}
