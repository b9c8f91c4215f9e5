use std::{path::PathBuf, process::ExitCode};

use clap::Parser;
use colored::Colorize;
use rackbook_lib::{Origin, RecordStore, config::CoreConfig};
use tracing::warn;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

mod render;
mod server;

#[derive(Parser, Debug)]
#[command(name = "rackbook")]
#[command(author, version, about)]
struct Cli {
    #[command(subcommand)]
    command: server::Command,

    /// Override the directory server snapshots are stored in
    #[arg(short, long, global = true)]
    data_dir: Option<PathBuf>,
}

fn main() -> ExitCode {
    // Human friendly panicking in release mode
    human_panic::setup_panic!();

    // Logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to install logger: {err}");
    }

    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            err.exit_code().into()
        }
    }
}

fn run(cli: &Cli) -> Result<(), server::Error> {
    let mut cfg = CoreConfig::load()?;
    if let Some(dir) = &cli.data_dir {
        cfg.storage_dir = Some(dir.clone());
    }

    let mut store = RecordStore::open(&cfg)?;

    if let Origin::Recovered { backup_key, reason } = store.origin() {
        warn!("Stored servers were unreadable ({reason}); a copy was kept as '{backup_key}'");
    }

    server::handle(&mut store, &cli.command)
}
