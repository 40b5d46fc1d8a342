use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use folio_extract::models::ProviderId;
use folio_provider::CategoryKind;

#[derive(Debug, Parser)]
#[command(name = "folio", version, about = "Cached, paginated browsing of manga providers")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON).
    #[arg(short, long, global = true, env = "FOLIO_CONFIG")]
    pub config: Option<PathBuf>,
    /// Increase log verbosity (-v debug, -vv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List enabled providers and the categories they offer.
    Providers,
    /// Show a category, loading pages as needed.
    Browse(BrowseArgs),
    /// List cached partitions.
    Cached,
    /// Drop a cached partition.
    Forget(PartitionArgs),
    /// Show a title's overview.
    Overview(LookupArgs),
    /// List a title's chapters.
    Chapters(LookupArgs),
    /// List a chapter's page images.
    Pages(LookupArgs),
    /// List a title's authors.
    Authors(LookupArgs),
    /// List a title's genres.
    Genres(LookupArgs),
}

#[derive(Debug, Args)]
pub struct PartitionArgs {
    #[arg(value_parser = parse_provider)]
    pub provider: ProviderId,
    /// recent, trending, genre, author or search.
    #[arg(value_parser = parse_category)]
    pub category: CategoryKind,
    /// Genre name, author name or search terms.
    pub query: Option<String>,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub partition: PartitionArgs,
    /// Load at least this many pages beyond what's cached.
    #[arg(short, long, default_value_t = 1)]
    pub pages: usize,
    /// Discard the cached pages and start over from the first page.
    #[arg(short, long)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct LookupArgs {
    #[arg(value_parser = parse_provider)]
    pub provider: ProviderId,
    /// Link to the title or chapter, as shown by `browse`.
    pub link: String,
}

fn parse_provider(value: &str) -> Result<ProviderId, String> {
    value.parse::<ProviderId>().map_err(|err| (*err).to_string())
}

fn parse_category(value: &str) -> Result<CategoryKind, String> {
    value.parse::<CategoryKind>().map_err(|err| (*err).to_string())
}
