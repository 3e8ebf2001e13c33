//! fretquiz CLI — terminal front end for the fretboard quiz.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};
use fretquiz_core::{QuestionKind, SessionMode, WrongAnswerPolicy};

mod commands;

#[derive(Parser)]
#[command(name = "fretquiz", version, about = "Guitar fretboard note quiz")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play an interactive quiz session
    Play {
        /// Question types (comma-separated: note-id, find-note, name-string)
        #[arg(long, value_delimiter = ',')]
        types: Option<Vec<QuestionKind>>,

        /// Session mode: free, timed, questions, timed-questions
        #[arg(long)]
        mode: Option<SessionMode>,

        /// Time limit in minutes for timed modes
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        minutes: Option<u32>,

        /// Question limit for question-count modes
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
        limit: Option<u32>,

        /// After a wrong answer: reveal-next or retry-until-correct
        #[arg(long)]
        wrong_answer: Option<WrongAnswerPolicy>,

        /// Seed for a reproducible question sequence
        #[arg(long)]
        seed: Option<u64>,

        /// Settings file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the final summary as JSON on stdout
        #[arg(long)]
        json: bool,
    },

    /// Print the note at every fret of every string
    Notes {
        /// Highest fret to show
        #[arg(long, default_value = "12", value_parser = clap::value_parser!(u8).range(0..=12))]
        frets: u8,
    },

    /// Check a settings file for mistakes
    Validate {
        /// Settings file path
        #[arg(long)]
        config: PathBuf,
    },

    /// Create a starter settings file
    Init,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // The quiz owns stdout; diagnostics go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("fretquiz=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Play {
            types,
            mode,
            minutes,
            limit,
            wrong_answer,
            seed,
            config,
            json,
        } => {
            let overrides = commands::play::Overrides {
                types,
                mode,
                minutes,
                limit,
                wrong_answer,
            };
            commands::play::execute(overrides, seed, config, json).await
        }
        Commands::Notes { frets } => commands::notes::execute(frets),
        Commands::Validate { config } => commands::validate::execute(config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
