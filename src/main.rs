use std::io::Write;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use tracing::info;

use fair_roulette::config::{DEFAULT_SESSION, DEFAULT_TABLE};
use fair_roulette::telemetry;
use fair_roulette::{
    generate_session_id, BaseConfig, Roulette, SpinOutcome, Spinner, StorageConfig, StorageType,
};

/// Pick a meeting facilitator fairly: the longer you wait, the higher your chance.
#[derive(Debug, Parser)]
#[command(name = "fair-roulette", version)]
struct Cli {
    /// Roster store backend.
    #[arg(long, value_enum, env = "ROULETTE_STORAGE", default_value_t = StorageType::File)]
    storage: StorageType,

    /// Roster file for the file backend and for remote fallback.
    #[arg(long, env = "ROULETTE_FILE", default_value = "./data/roster.json")]
    file: String,

    /// Base URL of the remote REST backend.
    #[arg(long, env = "ROULETTE_REMOTE_URL", default_value = "")]
    remote_url: String,

    /// API key for the remote REST backend.
    #[arg(long, env = "ROULETTE_REMOTE_KEY", default_value = "", hide_env_values = true)]
    remote_key: String,

    /// Session scoping the roster in the remote table.
    #[arg(long, env = "ROULETTE_SESSION", default_value = DEFAULT_SESSION)]
    session: String,

    /// Remote table name.
    #[arg(long, default_value = DEFAULT_TABLE)]
    table: String,

    /// Fail instead of falling back to local storage when the remote is unusable.
    #[arg(long)]
    no_fallback: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(flatten)]
    Roster(RosterCommand),
    /// Print a fresh session id.
    Session,
}

/// Commands that work on the stored roster.
#[derive(Debug, Subcommand)]
enum RosterCommand {
    /// Show the roster with each member's current chance.
    List,
    /// Add a member.
    Add { name: String },
    /// Remove a member by id.
    Remove { id: String },
    /// Spin the wheel and pick a member.
    Spin {
        /// Spin animation length in milliseconds.
        #[arg(long, default_value_t = 2000)]
        spin_ms: u64,
    },
}

impl Cli {
    fn base_config(&self) -> BaseConfig {
        let storage = match self.storage {
            StorageType::Memory => StorageConfig::Memory,
            StorageType::File => StorageConfig::File {
                path: self.file.clone(),
            },
            StorageType::Remote => StorageConfig::Remote {
                url: self.remote_url.clone(),
                api_key: self.remote_key.clone(),
                table: self.table.clone(),
                session_id: self.session.clone(),
            },
        };
        let spin_millis = match self.command {
            Command::Roster(RosterCommand::Spin { spin_ms }) => spin_ms,
            _ => BaseConfig::default().spin_millis,
        };

        BaseConfig {
            storage,
            spin_millis,
            fallback_to_local: !self.no_fallback,
            local_path: self.file.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize telemetry
    telemetry::init();

    let cli = Cli::parse();
    let command = match &cli.command {
        Command::Roster(command) => command,
        Command::Session => {
            println!("{}", generate_session_id());
            return Ok(());
        }
    };

    let config = cli.base_config();
    info!(
        "Starting fair-roulette: storage={:?}, spin_millis={}",
        config.storage.storage_type(),
        config.spin_millis
    );

    let roulette = Roulette::initialize(config).await?;
    // Load problems must be visible before anything overwrites the store.
    let load_notice = roulette.notice().await;
    if let Some(notice) = &load_notice {
        eprintln!("warning: {}", notice);
    }

    run(command, &roulette).await?;

    let notice = roulette.notice().await;
    if notice != load_notice {
        if let Some(notice) = notice {
            eprintln!("warning: {}", notice);
        }
    }
    roulette.close().await?;
    Ok(())
}

async fn run(command: &RosterCommand, roulette: &Roulette) -> Result<()> {
    match command {
        RosterCommand::List => print_roster(roulette).await,
        RosterCommand::Add { name } => {
            roulette.add_member(name).await;
            print_roster(roulette).await;
        }
        RosterCommand::Remove { id } => {
            roulette.remove_member(id).await;
            print_roster(roulette).await;
        }
        RosterCommand::Spin { .. } => {
            let spinner = Spinner::new(
                roulette.clone(),
                Duration::from_millis(roulette.config.spin_millis),
            );
            let outcome = spinner
                .spin(|name: &str| {
                    print!("\r{:<24}", name);
                    let _ = std::io::stdout().flush();
                })
                .await?;
            print!("\r{:<24}\r", "");

            match outcome {
                SpinOutcome::Revealed(Some(member)) => {
                    println!("The chosen one is... {}!", member.name);
                    print_roster(roulette).await;
                }
                SpinOutcome::Revealed(None) => {
                    println!("Add some team members to get started!");
                }
                SpinOutcome::Superseded => {}
            }
        }
    }
    Ok(())
}

async fn print_roster(roulette: &Roulette) {
    let rows = roulette.chances().await;
    println!("Current Members ({})", rows.len());
    if rows.is_empty() {
        println!("  Add some team members to get started!");
        return;
    }
    for row in rows {
        println!(
            "  {:>6}  {:<20} {}",
            row.chance, row.member.name, row.member.id
        );
    }
}
