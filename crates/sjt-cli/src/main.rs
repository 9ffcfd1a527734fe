//! sjt CLI: take, check and submit situational-judgement surveys.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sjt", version, about = "Situational-judgement survey runner")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a question file and report lint warnings
    Validate {
        /// Path to the question JSON file
        #[arg(long)]
        questions: PathBuf,

        /// Config file path (for the required option letters)
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Print the sheet column headers in submission order
    Headers {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Question file, overriding the config's questions_file
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Submit a prepared answer file
    Submit {
        /// JSON object of question id to option letter
        #[arg(long)]
        answers: PathBuf,

        /// Respondent full name
        #[arg(long, default_value = "")]
        name: String,

        /// Respondent institution
        #[arg(long, default_value = "")]
        institution: String,

        /// Respondent experience level
        #[arg(long)]
        experience: Option<String>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Question file, overriding the config's questions_file
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Take the survey interactively
    Take {
        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,

        /// Question file, overriding the config's questions_file
        #[arg(long)]
        questions: Option<PathBuf>,
    },

    /// Create a starter config and question file
    Init,
}

#[tokio::main]
async fn main() {
    let filter = match "sjt=info".parse() {
        Ok(directive) => tracing_subscriber::EnvFilter::from_default_env().add_directive(directive),
        Err(_) => tracing_subscriber::EnvFilter::from_default_env(),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Validate { questions, config } => commands::validate::execute(questions, config),
        Commands::Headers { config, questions } => commands::headers::execute(config, questions),
        Commands::Submit {
            answers,
            name,
            institution,
            experience,
            config,
            questions,
        } => {
            let respondent = commands::submit::RespondentArgs {
                name,
                institution,
                experience,
            };
            commands::submit::execute(answers, respondent, config, questions).await
        }
        Commands::Take { config, questions } => commands::take::execute(config, questions).await,
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
