use clap::Parser;
use ledger::{DbStore, Ledger, MemoryStore, Store};

use crate::{
    cli::Cli,
    commands::{Output, ResultApp},
    settings::{Settings, Storage},
};

mod cli;
mod commands;
mod settings;

#[tokio::main]
async fn main() -> ResultApp<()> {
    let cli = Cli::parse();
    let mut settings = Settings::load(cli.config.as_deref())?;
    if cli.memory {
        settings.storage = Storage::Memory;
    } else if let Some(path) = cli.database {
        settings.storage = Storage::Sqlite(path);
    }

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(format!(
            "fairshare={level},ledger={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let out = Output {
        json: cli.json,
        currency: settings.display.currency.clone(),
    };

    match settings.database_url() {
        None => {
            tracing::info!("using in-memory storage");
            let ledger = Ledger::new(MemoryStore::new());
            execute(ledger, cli.command, &out, settings.seed_participants).await
        }
        Some(url) => {
            tracing::info!("using {url}");
            let ledger = Ledger::new(DbStore::connect(&url).await?);
            execute(ledger, cli.command, &out, settings.seed_participants).await
        }
    }
}

async fn execute<S: Store>(
    mut ledger: Ledger<S>,
    command: cli::Command,
    out: &Output,
    seed_participants: bool,
) -> ResultApp<()> {
    if seed_participants && ledger.seed_default_participants().await? {
        tracing::info!("created the default roster");
    }
    commands::run(&mut ledger, command, out, seed_participants).await
}
