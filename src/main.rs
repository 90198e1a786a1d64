//! Binary entrypoint for the Zenpath CLI.
//!
//! Commands:
//! - `init` - write a starter `zenpath.toml`
//! - `status` - energy, stage and per-game completion summary
//! - `play --game <g> --difficulty <d> --level <n> (--won [--score <s>] | --lost)` - report a finished round
//! - `onboard` - mark onboarding as finished
//! - `reset --yes` - wipe all progress
//! - `achievements` - list the achievement catalog with unlock state
//! - `levels --game <g>` - unlock/completion grid for one game
//!
//! See the library crate docs for module-level details: `zenpath::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use zenpath::config::Config;
use zenpath::progress::{Difficulty, GameType, ProgressTracker, SledStore, UserProgress};

/// Achievements shown under "recent" in the status summary.
const RECENT_ACHIEVEMENTS: usize = 5;

#[derive(Parser)]
#[command(name = "zenpath")]
#[command(about = "Player progression and achievements for the Zenpath mini-games")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "zenpath.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init,
    /// Show energy, stage and completion summary
    Status,
    /// Report a finished mini-game round
    Play {
        /// precision-path, pattern-flow or balance-trial
        #[arg(short, long, value_parser = parse_game)]
        game: GameType,
        /// calm, focused or intense
        #[arg(short, long, value_parser = parse_difficulty)]
        difficulty: Difficulty,
        /// Level number within the difficulty (1-based)
        #[arg(short, long)]
        level: u32,
        /// The round was won and completes the level
        #[arg(long, conflicts_with = "lost", required_unless_present = "lost")]
        won: bool,
        /// The round was lost and counts as an attempt
        #[arg(long)]
        lost: bool,
        /// Final score of a won round
        #[arg(short, long, requires = "won")]
        score: Option<u32>,
    },
    /// Mark onboarding as finished
    Onboard,
    /// Erase all progress and achievements
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },
    /// List achievements and unlock state
    Achievements,
    /// Show the level grid for one game
    Levels {
        #[arg(short, long, value_parser = parse_game)]
        game: GameType,
    },
}

fn parse_game(s: &str) -> Result<GameType, String> {
    s.parse().map_err(|e: zenpath::progress::ProgressError| e.to_string())
}

fn parse_difficulty(s: &str) -> Result<Difficulty, String> {
    s.parse().map_err(|e: zenpath::progress::ProgressError| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Commands::Init = cli.command {
        init_logging(&None, cli.verbose);
        info!("Initializing new Zenpath configuration");
        Config::create_default(&cli.config).await?;
        info!("Configuration file created at {}", cli.config);
        return Ok(());
    }

    let (config, load_error) = match Config::load(&cli.config).await {
        Ok(config) => (config, None),
        Err(e) => (Config::default(), Some(e)),
    };
    init_logging(&Some(config.clone()), cli.verbose);
    if let Some(e) = load_error {
        warn!("{} (using defaults)", e);
    }

    let db_path = config.storage.progress_db_path();
    let store = SledStore::open(&db_path)
        .map_err(|e| anyhow!("Failed to open progress store {}: {}", db_path.display(), e))?;
    let mut tracker = ProgressTracker::with_event_capacity(store, config.events.channel_capacity);

    match cli.command {
        // Written before the store is opened
        Commands::Init => {}
        Commands::Status => print_status(tracker.progress()),
        Commands::Play {
            game,
            difficulty,
            level,
            won,
            lost: _,
            score,
        } => {
            difficulty
                .check_level(level)
                .map_err(|e| anyhow!("{}", e))?;
            if !tracker.progress().is_level_unlocked(game, difficulty, level) {
                warn!("{} {} level {} is still locked", game, difficulty, level);
            }
            let mut events = tracker.subscribe();
            tracker.on_level_finished(game, difficulty, level, won, score.unwrap_or(0));
            while let Ok(event) = events.try_recv() {
                println!("{:?}", event);
            }
            print_status(tracker.progress());
        }
        Commands::Onboard => {
            tracker.on_onboarding_finished();
            println!("Onboarding complete.");
        }
        Commands::Reset { yes } => {
            if !yes {
                println!("Refusing to reset without --yes.");
                return Ok(());
            }
            tracker.on_reset_requested();
            println!("Progress reset.");
        }
        Commands::Achievements => print_achievements(tracker.progress()),
        Commands::Levels { game } => print_levels(tracker.progress(), game),
    }

    Ok(())
}

fn print_status(progress: &UserProgress) {
    println!(
        "Energy {}/10  Stage {}  Levels {}  Plays {}  Achievements {}/{}",
        progress.energy_level(),
        progress.current_stage(),
        progress.total_completed_levels(),
        progress.total_games_played(),
        progress.unlocked_achievement_count(),
        progress.achievement_count()
    );
    println!(
        "Onboarding: {}  Highest tier: {}",
        if progress.has_completed_onboarding() { "done" } else { "pending" },
        progress.highest_unlocked_difficulty()
    );
    for (game, table) in progress.games() {
        println!(
            "  {:<15} {:>2}/{} ({:>3.0}%)  attempts {}",
            game.display_name(),
            table.total_completed_levels(),
            table.total_levels(),
            table.completion_ratio() * 100.0,
            table.total_attempts()
        );
    }
    let recent = progress.recent_achievements(RECENT_ACHIEVEMENTS);
    if !recent.is_empty() {
        println!("Recent:");
        for achievement in recent {
            println!("  {}", achievement.title);
        }
    }
}

fn print_achievements(progress: &UserProgress) {
    for achievement in progress.achievements() {
        let when = achievement
            .unlocked_date
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();
        println!(
            "[{}] {:<17} {:<45} {}",
            if achievement.unlocked { "x" } else { " " },
            achievement.title,
            achievement.description,
            when
        );
    }
}

fn print_levels(progress: &UserProgress, game: GameType) {
    let table = progress.game(game);
    println!("{} - {}", game.display_name(), game.description());
    for difficulty in Difficulty::ALL {
        let cells: Vec<String> = (1..=difficulty.level_count())
            .map(|level| {
                let done = table.level(difficulty, level).map(|lp| lp.completed).unwrap_or(false);
                if done {
                    format!("{}", table.best_score(difficulty, level))
                } else if table.is_level_unlocked(difficulty, level) {
                    "open".to_string()
                } else {
                    "--".to_string()
                }
            })
            .collect();
        println!(
            "  {:<8} {}/{}  {}",
            difficulty.name(),
            table.completed_levels(difficulty),
            difficulty.level_count(),
            cells.join(" ")
        );
    }
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match (verbosity, config) {
        (0, Some(cfg)) => cfg.logging.level_filter(),
        (0, None) => log::LevelFilter::Info,
        (1, _) => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config
        .as_ref()
        .and_then(|cfg| cfg.logging.file.as_ref())
        .and_then(|path| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .ok()
        });

    if let Some(file) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(file));
        // Mirror to the console only when attached to a terminal
        let is_tty = atty::is(atty::Stream::Stdout);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn play(args: &[&str]) -> Result<Cli, clap::Error> {
        let mut argv = vec!["zenpath", "play", "-g", "pattern-flow", "-d", "calm", "-l", "2"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv)
    }

    #[test]
    fn play_requires_an_outcome() {
        assert!(play(&[]).is_err());
        assert!(play(&["--won", "--lost"]).is_err());
        assert!(play(&["--lost"]).is_ok());
        assert!(play(&["--won"]).is_ok());
    }

    #[test]
    fn score_only_with_a_win() {
        assert!(play(&["--lost", "--score", "40"]).is_err());
        let cli = play(&["--won", "--score", "40"]).unwrap();
        match cli.command {
            Commands::Play {
                game, won, score, ..
            } => {
                assert_eq!(game, GameType::PatternFlow);
                assert!(won);
                assert_eq!(score, Some(40));
            }
            _ => panic!("expected play"),
        }
    }
}
