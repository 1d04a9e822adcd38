//! placetest CLI — the user-facing command-line interface.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;
mod student;

#[derive(Parser)]
#[command(name = "placetest", version, about = "Adaptive English placement testing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a simulated placement session against a question bank
    Run {
        /// Path to the question bank JSON
        #[arg(long)]
        bank: PathBuf,

        /// Questions to serve before stopping
        #[arg(long, default_value = "15")]
        questions: usize,

        /// Simulated student's true ability level (0.0-5.0)
        #[arg(long, default_value = "2.5")]
        ability: f64,

        /// Student name recorded in the session
        #[arg(long)]
        student: Option<String>,

        /// Seed for deterministic sessions
        #[arg(long)]
        seed: Option<u64>,

        /// Skip AI analysis and use the deterministic scorer
        #[arg(long)]
        offline: bool,

        /// Output directory
        #[arg(long, default_value = "./placetest-results")]
        output: PathBuf,

        /// Output format: json, markdown, all
        #[arg(long, default_value = "json")]
        format: String,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Validate a question bank
    Validate {
        /// Path to the question bank JSON
        #[arg(long)]
        bank: PathBuf,
    },

    /// Re-analyze a saved session record
    Analyze {
        /// Path to the session record JSON
        #[arg(long)]
        session: PathBuf,

        /// Skip AI analysis and use the deterministic scorer
        #[arg(long)]
        offline: bool,

        /// Write the refreshed analysis back into the record
        #[arg(long)]
        update: bool,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample question bank
    Init,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("placetest=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run {
            bank,
            questions,
            ability,
            student,
            seed,
            offline,
            output,
            format,
            config,
        } => {
            commands::run::execute(
                bank, questions, ability, student, seed, offline, output, format, config,
            )
            .await
        }
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::Analyze {
            session,
            offline,
            update,
            config,
        } => commands::analyze::execute(session, offline, update, config).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
