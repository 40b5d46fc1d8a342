use std::process::ExitCode;

use clap::Parser;
use exn::ResultExt;
use folio_cache::{Database, Repository};
use folio_config::Config;
use folio_provider::client::connect;
use folio_sync::Sources;
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::{ErrorKind, Result};

mod cli;
mod commands;
mod error;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err:?}");
            ExitCode::FAILURE
        },
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::load(cli.config.as_deref()).or_raise(|| ErrorKind::Config)?;
    if let Some(parent) = config.database.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).or_raise(|| ErrorKind::Cache)?;
    }
    debug!(path = %config.database.display(), "opening page cache");
    let db = Database::connect(&config.database).await.or_raise(|| ErrorKind::Cache)?;

    let mut sources = Sources::new(Repository::from(&db)).with_prefetch_distance(config.paging.prefetch_distance);
    for id in config.enabled_providers() {
        let provider = connect(id, &config.http_options(id)).or_raise(|| ErrorKind::Provider(id.to_string()))?;
        sources.register(provider);
    }
    if sources.providers().next().is_none() {
        warn!("no providers are enabled");
    }

    let result = match cli.command {
        Command::Providers => commands::providers(&sources),
        Command::Browse(args) => commands::browse(&sources, args).await,
        Command::Cached => commands::cached(&Repository::from(&db)).await,
        Command::Forget(args) => commands::forget(&sources, args).await,
        Command::Overview(args) => commands::overview(&sources, args).await,
        Command::Chapters(args) => commands::list(sources.chapters(args.provider, &args.link).await),
        Command::Pages(args) => commands::list(sources.pages(args.provider, &args.link).await),
        Command::Authors(args) => commands::list(sources.authors(args.provider, &args.link).await),
        Command::Genres(args) => commands::list(sources.genres(args.provider, &args.link).await),
    };
    db.close().await;
    result
}
