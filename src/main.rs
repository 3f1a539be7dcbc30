use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

use transcript_export::{
    Config,
    ExportOutcome,
    ExportRequest,
    Exporter,
    LoggingConfig,
    init_logging,
    run_hook,
    setup,
};

#[derive(Parser)]
#[command(name = "transcript-export", version, about = "Save Claude Code transcripts as text")]
struct Cli {
    /// Enable debug logging (stderr)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Internal: called by the Claude PreCompact hook
    #[command(name = "precompact", hide = true)]
    Precompact,

    /// Export a transcript file now
    #[command(name = "export")]
    Export {
        /// Path to the JSONL transcript
        #[arg(long)]
        transcript: PathBuf,
        #[arg(long, default_value = "unknown")]
        session_id: String,
        #[arg(long, default_value = "manual")]
        trigger: String,
        /// Output directory (default from ~/.claude-toolkit/config.toml or ~/.claude-toolkit/transcripts/saved)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },

    /// Register the PreCompact hook in ~/.claude/settings.json
    #[command(name = "setup")]
    Setup {
        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// View or modify config (~/.claude-toolkit/config.toml)
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show current config
    Show,
    /// Set a config value
    Set {
        /// Key to set (storage_dir)
        key: String,
        /// Value to set (empty to clear)
        value: String,
    },
    /// Reset config to defaults
    Reset,
}

#[derive(Serialize)]
struct ExportSummary {
    exported_path: String,
    messages: usize,
}

fn main() {
    let cli = Cli::parse();
    init_logging(&LoggingConfig { debug: cli.debug });
    if let Err(err) = run(cli.command) {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn run(command: Commands) -> Result<()> {
    match command {
        Commands::Precompact => {
            // Always answers on stdout; only the exit code reports failure
            let config = Config::load_or_default();
            let code = run_hook(std::io::stdin().lock(), std::io::stdout().lock(), &config);
            std::process::exit(code);
        }
        Commands::Export {
            transcript,
            session_id,
            trigger,
            out_dir,
        } => {
            let exporter = match out_dir {
                Some(dir) => Exporter::new(dir),
                None => Exporter::from_config(&Config::load_or_default())?,
            };
            let request = ExportRequest {
                transcript_path: transcript.display().to_string(),
                session_id,
                trigger,
            };
            match exporter.try_export(&request)? {
                ExportOutcome::Exported { path, messages } => {
                    let summary = ExportSummary {
                        exported_path: path.display().to_string(),
                        messages,
                    };
                    println!("{}", serde_json::to_string_pretty(&summary)?);
                }
                ExportOutcome::MissingSource => {
                    bail!("transcript not found: {}", transcript.display());
                }
            }
        }
        Commands::Setup { yes } => {
            setup::run(yes)?;
        }
        Commands::Config { action } => {
            handle_config(action)?;
        }
    }
    Ok(())
}

fn handle_config(action: Option<ConfigAction>) -> Result<()> {
    match action {
        None | Some(ConfigAction::Show) => {
            let config = Config::load().unwrap_or_default();
            match &config.storage_dir {
                Some(dir) => println!("storage_dir = \"{}\"", dir.display()),
                None => println!("# storage_dir not set"),
            }
            println!("effective storage dir: {}", config.storage_dir()?.display());
        }
        Some(ConfigAction::Set { key, value }) => {
            let mut config = Config::load().unwrap_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!("saved to {}", path.display());
        }
        Some(ConfigAction::Reset) => {
            let config = Config::default();
            let path = config.save()?;
            println!("reset to defaults at {}", path.display());
        }
    }
    Ok(())
}
