use exn::ResultExt;
use folio_cache::Repository;
use folio_extract::models::Record;
use folio_provider::Category;
use folio_sync::{LoadDirection, LoadOutcome, Pager, Sources};
use tracing::info;

use crate::cli::{BrowseArgs, LookupArgs, PartitionArgs};
use crate::error::{ErrorKind, Result};

pub fn providers(sources: &Sources) -> Result<()> {
    for provider in sources.providers() {
        let categories: Vec<_> = sources.categories(provider).iter().map(|kind| kind.as_str()).collect();
        println!("{provider}: {}", categories.join(", "));
    }
    Ok(())
}

fn category(args: &PartitionArgs) -> Result<Category> {
    Category::from_parts(args.category, args.query.clone().unwrap_or_default())
        .or_raise(|| ErrorKind::Invalid(format!("{} needs a query", args.category.as_str())))
}

pub async fn browse(sources: &Sources, args: BrowseArgs) -> Result<()> {
    let pager = sources.pager(args.partition.provider, category(&args.partition)?);
    if !pager.is_supported() {
        exn::bail!(ErrorKind::Invalid(format!("{} is not available", pager.partition())));
    }
    tokio::select! {
        result = load_pages(&pager, args.pages, args.refresh) => result?,
        _ = tokio::signal::ctrl_c() => {
            pager.cancel();
            info!("interrupted; showing what's already cached");
        },
    }
    let records = pager.snapshot().await.or_raise(|| ErrorKind::Cache)?;
    for (index, record) in records.iter().enumerate() {
        println!("{:>5}  {record}  <{}>", index + 1, record.link);
    }
    Ok(())
}

async fn load_pages(pager: &Pager, pages: usize, refresh: bool) -> Result<()> {
    let cursor = pager.cursor().await.or_raise(|| ErrorKind::Cache)?;
    let mut direction = match cursor {
        Some(_) if !refresh => LoadDirection::Append,
        _ => LoadDirection::Refresh,
    };
    for _ in 0..pages {
        match pager.request_load(direction).await {
            LoadOutcome::Success { end_reached: true } => {
                info!(partition = %pager.partition(), "no more pages");
                break;
            },
            LoadOutcome::Success { end_reached: false } => direction = LoadDirection::Append,
            LoadOutcome::Error(err) => exn::bail!(ErrorKind::Load((**err).to_string())),
        }
    }
    Ok(())
}

pub async fn cached(cache: &Repository) -> Result<()> {
    for partition in cache.partitions().await.or_raise(|| ErrorKind::Cache)? {
        let count = cache.record_count(&partition).await.or_raise(|| ErrorKind::Cache)?;
        println!("{partition}: {count} records");
    }
    Ok(())
}

pub async fn forget(sources: &Sources, args: PartitionArgs) -> Result<()> {
    sources.forget(args.provider, category(&args)?).await.or_raise(|| ErrorKind::Cache)
}

pub async fn overview(sources: &Sources, args: LookupArgs) -> Result<()> {
    match sources.overview(args.provider, &args.link).await.or_raise(|| ErrorKind::Lookup)? {
        Some(record) => list(Ok(vec![record])),
        None => exn::bail!(ErrorKind::Invalid(format!("no overview found at {}", args.link))),
    }
}

pub fn list(records: folio_sync::error::Result<Vec<Record>>) -> Result<()> {
    for record in records.or_raise(|| ErrorKind::Lookup)? {
        println!("{record}");
        for media in &record.media {
            println!("    {media}");
        }
    }
    Ok(())
}
