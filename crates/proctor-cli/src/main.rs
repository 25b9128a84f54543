use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;
mod terminal;

#[derive(Parser)]
#[command(name = "proctor")]
#[command(about = "PROCTOR - Secure exam session engine", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sit an exam in a secure terminal session
    Run {
        /// Candidate roll / registration number
        #[arg(long)]
        roll_no: String,
        /// Candidate name
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        department: String,
        /// Exam to sit (overrides settings.toml)
        #[arg(long)]
        exam_id: Option<String>,
        /// Settings file to use instead of the default location
        #[arg(long)]
        config: Option<PathBuf>,
        /// Write the audit trail as JSON lines to this file
        #[arg(long)]
        audit_log: Option<PathBuf>,
    },
    /// Evaluate an expression with the exam calculator
    Calc {
        /// Expression, e.g. "sqrt(2) * sin(0.5)"
        expression: String,
    },
    /// Inspect or create settings.toml
    Settings {
        #[command(subcommand)]
        action: SettingsAction,
    },
}

#[derive(Subcommand)]
enum SettingsAction {
    /// Print the effective settings (environment overrides applied)
    Show,
    /// Write default settings if none exist
    Init,
    /// Print the settings file location
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            roll_no,
            name,
            department,
            exam_id,
            config,
            audit_log,
        } => {
            commands::run::execute(commands::run::RunArgs {
                roll_no,
                name,
                department,
                exam_id,
                config,
                audit_log,
            })
            .await?
        }
        Commands::Calc { expression } => commands::calc::execute(&expression)?,
        Commands::Settings { action } => {
            logging::init_console();
            match action {
                SettingsAction::Show => commands::settings::show()?,
                SettingsAction::Init => commands::settings::init()?,
                SettingsAction::Path => commands::settings::path()?,
            }
        }
    }

    Ok(())
}
