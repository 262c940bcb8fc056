use std::process::ExitCode;

use clap::Parser;
use engine::{FileStore, Tracker};

use crate::{cli::Cli, error::Result};

mod cli;
mod commands;
mod config;
mod error;

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = config::load(&cli.global)?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "bashy={level},engine={level}",
            level = settings.level
        ))
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(
        data_dir = %settings.data_dir,
        persistence = ?settings.persistence,
        "opening store"
    );
    let store = FileStore::open(&settings.data_dir)?;
    let mut tracker = Tracker::builder(store)
        .persistence(settings.persistence)
        .build()?;

    let today = settings.today()?;
    let mut stdout = std::io::stdout().lock();
    commands::run(&mut tracker, cli.command, today, &mut stdout)?;

    tracker.flush()?;
    Ok(())
}
