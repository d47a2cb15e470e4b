use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerchat_cli::cli::{load_script, run_replay, CliConfig};
use ledgerchat_core::tracing_setup::init_tracing;

#[derive(Parser)]
#[command(name = "ledgerchat-cli")]
#[command(about = "Replay conversation-view event scripts through the unread engine")]
struct Cli {
    /// Pretty-print JSON output
    #[arg(long, short, global = true)]
    pretty: bool,

    /// Path to JSON config file (engine thresholds, currentUserId override)
    #[arg(long, short = 'c', global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a recorded script and print commands and view state per step
    Replay {
        /// Script file (JSON)
        script: PathBuf,
    },
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_tracing() {
        eprintln!("Warning: Failed to set up logging: {}", e);
    }

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = CliConfig::resolve(cli.config.as_deref())?;

    match cli.command {
        Commands::Replay { script } => {
            let mut script = load_script(&script)?;
            if let Some(user_id) = config.current_user_id {
                script.current_user_id = user_id;
            }

            let outputs = run_replay(script, &config.engine);
            let json = if cli.pretty {
                serde_json::to_string_pretty(&outputs)
            } else {
                serde_json::to_string(&outputs)
            }
            .context("Failed to serialize replay output")?;
            println!("{}", json);
        }
    }

    Ok(())
}
