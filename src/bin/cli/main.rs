mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use lexicard_lib::scheduler::StudyLevel;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "lexicard-cli", about = "Spaced-repetition flashcard scheduler", version)]
struct Cli {
    /// Data directory (default: platform data dir)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Add a card
    Add {
        /// Front text of the card
        text: String,
        /// Use this id instead of a generated one
        #[arg(long)]
        id: Option<Uuid>,
    },

    /// Submit a review for a card
    Review {
        /// Card id
        id: Uuid,
        /// Quality 0-5, or one of again/hard/good/easy
        grade: String,
        /// Response time in seconds
        #[arg(long)]
        response_time: Option<f64>,
        /// Count the answer as incorrect regardless of grade
        #[arg(long, conflicts_with = "correct")]
        incorrect: bool,
        /// Count the answer as correct regardless of grade
        #[arg(long)]
        correct: bool,
    },

    /// List cards due for study
    Due {
        /// Maximum cards (default from config)
        #[arg(long, conflicts_with = "level")]
        limit: Option<usize>,
        /// Size the batch for a learner level (beginner, intermediate, advanced)
        #[arg(long)]
        level: Option<StudyLevel>,
    },

    /// Find cards by text prefix
    Search {
        /// Prefix (case-insensitive)
        prefix: String,
        /// Maximum results (default from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show aggregate statistics
    Stats,

    /// Delete a card
    Remove {
        /// Card id
        id: Uuid,
    },

    /// Show the interval each rating would give a card
    Preview {
        /// Card id
        id: Uuid,
    },

    /// Show mastery progress from a card's review history
    Progress {
        /// Card id
        id: Uuid,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let mut app = app::App::new(cli.data_dir.as_deref())?;

    match cli.command {
        Command::Add { text, id } => {
            commands::add::run(&mut app, &text, id, &cli.format)?;
        }
        Command::Review {
            id,
            grade,
            response_time,
            incorrect,
            correct,
        } => {
            let was_correct = if incorrect {
                Some(false)
            } else if correct {
                Some(true)
            } else {
                None
            };
            commands::review::run(
                &mut app,
                id,
                &grade,
                response_time,
                was_correct,
                &cli.format,
                use_color,
            )?;
        }
        Command::Due { limit, level } => {
            commands::due::run(&mut app, limit, level, &cli.format, use_color)?;
        }
        Command::Search { prefix, limit } => {
            commands::search::run(&app, &prefix, limit, &cli.format, use_color)?;
        }
        Command::Stats => {
            commands::stats::run(&app, &cli.format)?;
        }
        Command::Remove { id } => {
            commands::remove::run(&mut app, id, &cli.format)?;
        }
        Command::Preview { id } => {
            commands::preview::run(&app, id, &cli.format)?;
        }
        Command::Progress { id } => {
            commands::progress::run(&app, id, &cli.format)?;
        }
    }

    Ok(())
}
