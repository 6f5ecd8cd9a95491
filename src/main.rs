use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use lingo_review::config::Config;
use lingo_review::export::json::{
    Course, ProgressExport, export_json_to_path, import_course, seed_course,
};
use lingo_review::models::StreakStatus;
use lingo_review::{
    Clock, LessonResult, Rating, ReviewEngine, ReviewSession, SqliteStore, Store, SystemClock,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "lingo", version, about = "Vocabulary reviews and daily streaks")]
struct Cli {
    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Show streak and due reviews
    Status,
    /// Complete a lesson: learn its vocabulary and count it toward the streak
    Complete {
        lesson_id: String,
        /// Percentage of exercises answered correctly
        #[arg(long, default_value_t = 0)]
        score: u32,
        /// Experience points earned
        #[arg(long, default_value_t = 0)]
        xp: u32,
        /// Seconds spent on the lesson
        #[arg(long, default_value_t = 0)]
        time: u32,
    },
    /// List cards due for review
    Due,
    /// Rate a single card
    Review { card_id: i64, rating: Rating },
    /// Rate every due card with the same answer
    Session {
        #[arg(default_value = "good")]
        rating: Rating,
        /// Maximum cards to review (overrides session.max_cards)
        #[arg(long)]
        max: Option<usize>,
    },
    /// Move the simulated date forward by one day
    AdvanceDay,
    /// Load course vocabulary from a JSON file
    Import { path: PathBuf },
    /// Write streak and review progress to a JSON file
    Export { path: PathBuf },
    /// Write the current configuration to the config file
    InitConfig,
}

fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    init_tracing(&config.logging.level);

    if let Some(Command::InitConfig) = cli.command {
        let path = cli
            .config
            .or_else(Config::config_path)
            .context("no configuration directory available")?;
        config.save_to(&path)?;
        println!("Configuration written to {}", path.display());
        return Ok(());
    }

    let db_path = cli
        .db
        .or_else(|| config.db_path())
        .context("no database path configured")?;
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("creating {}", parent.display()))?;
    }
    let store = SqliteStore::open(&db_path)
        .with_context(|| format!("opening database {}", db_path.display()))?;

    if store.vocabulary_item_count()? == 0 {
        let seeded = seed_course(&store, &Course::sample())?;
        info!(seeded, "seeded sample course");
    }

    let clock = SystemClock::with_offset_days(store.day_offset()?);
    let engine = ReviewEngine::new(store, clock);
    let streak = engine.check_streak_on_open()?;

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => {
            let status = engine.streak_status()?;
            println!("Today: {}", engine.clock().today());
            println!(
                "Streak: {} day(s) (longest {}, freezes {})",
                streak.current_streak, streak.longest_streak, streak.freezes_available
            );
            match status {
                StreakStatus::Fresh => println!("Complete a lesson to start a streak."),
                StreakStatus::ActiveToday => println!("Today's lesson is done."),
                StreakStatus::ActiveGrace => println!("Complete a lesson today to keep it going."),
                StreakStatus::ActiveFrozen => {
                    println!("You missed a day; a freeze will cover it if you study today.")
                }
                StreakStatus::Broken => {}
            }
            println!("Lessons completed today: {}", engine.lessons_completed_today()?);
            println!("Reviews due: {}", engine.due_review_count()?);
        }
        Command::Complete {
            lesson_id,
            score,
            xp,
            time,
        } => {
            let result = LessonResult {
                score,
                xp_earned: xp,
                time_spent_seconds: time,
            };
            let done = engine.complete_lesson_with_result(&lesson_id, &result)?;
            println!(
                "Lesson '{}' complete (attempt {}): {} new word(s), {} new review card(s).",
                done.lesson_id, done.progress.attempts, done.newly_learned, done.cards_created
            );
            println!("Streak: {} day(s)", done.streak.current_streak);
        }
        Command::Due => {
            let due = engine.due_session()?;
            if due.is_empty() {
                println!("Nothing to review.");
            }
            for (card, item) in due {
                println!(
                    "#{:<4} {:<20} {:<20} interval {}d, reps {}, EF {:.2}",
                    card.id,
                    item.text,
                    item.translation,
                    card.interval_days,
                    card.repetitions,
                    card.easiness_factor
                );
            }
        }
        Command::Review { card_id, rating } => {
            let card = engine
                .review_card(card_id)?
                .with_context(|| format!("no review card with id {card_id}"))?;
            let updated = engine.process_review(&card, rating)?;
            println!(
                "Card #{} rated {}: next review in {} day(s), EF {:.2}",
                updated.id, rating, updated.interval_days, updated.easiness_factor
            );
        }
        Command::Session { rating, max } => {
            let mut session = ReviewSession::start(&engine, max.or(config.session.max_cards))?;
            while let Some((_, item)) = session.current() {
                println!("{}  {} → {}", session.progress_message(), item.text, item.translation);
                session.rate_current(&engine, rating)?;
            }
            let summary = session.summary();
            println!(
                "Reviewed {} card(s): {} again, {} hard, {} good, {} easy.",
                summary.total(),
                summary.again,
                summary.hard,
                summary.good,
                summary.easy
            );
        }
        Command::AdvanceDay => {
            let offset = engine.advance_day()?;
            println!("Simulated date is now {offset} day(s) ahead.");
        }
        Command::Import { path } => {
            let course = import_course(&path)?;
            let processed = engine.with_store(|store| seed_course(store, &course))?;
            println!("Imported {} word(s) from '{}'.", processed, course.title);
        }
        Command::Export { path } => {
            let now = engine.clock().now();
            let export = engine.with_store(|store| ProgressExport::collect(store, now))?;
            export_json_to_path(&export, &path)?;
            println!("Exported {} card(s) to {}", export.cards.len(), path.display());
        }
        Command::InitConfig => {}
    }

    Ok(())
}
