use scraper::Html;

use super::{Dialect, attr, count, element_text, first_image, image_source, inverted_ordinal, require, skip, text};
use crate::consts;
use crate::error::Result;
use crate::models::{Details, ProviderId, Record, RecordKind};

const PROVIDER: ProviderId = ProviderId::SenManga;

pub(crate) struct SenManga;

impl Dialect for SenManga {
    fn supports(&self, kind: RecordKind) -> bool {
        // SenManga has no search page worth scraping.
        !matches!(kind, RecordKind::SearchHits)
    }

    fn extract(&self, document: &Html, origin: &str, kind: RecordKind) -> Result<Vec<Record>> {
        match kind {
            RecordKind::Listing => listing(document),
            RecordKind::Overview => overview(document, origin),
            RecordKind::Authors => linked(document, RecordKind::Authors),
            RecordKind::Genres => linked(document, RecordKind::Genres),
            RecordKind::Chapters => chapters(document),
            RecordKind::Pages => pages(document),
            RecordKind::SearchHits => Ok(Vec::new()),
        }
    }
}

fn listing(document: &Html) -> Result<Vec<Record>> {
    require(document, &consts::SENMANGA_LISTING_CONTAINER, "listing")?;
    let mut records = Vec::new();
    for (index, item) in document.select(&consts::SENMANGA_LISTING_ITEM).enumerate() {
        let Some(link) = attr(item, &consts::SENMANGA_LISTING_LINK, "href") else {
            skip(RecordKind::Listing, index, "no link");
            continue;
        };
        let mut title = text(item, &consts::SENMANGA_LISTING_TITLE);
        if title.is_empty() {
            title = attr(item, &consts::SENMANGA_LISTING_LINK, "title").unwrap_or_default();
        }
        let details = Details::Listing {
            latest_chapter: text(item, &consts::SENMANGA_LISTING_CHAPTER),
            view_count: item.select(&consts::SENMANGA_LISTING_VIEWS).next().and_then(|v| count(&element_text(v))),
        };
        records.push(Record::new(PROVIDER, link, title, details).with_media(first_image(item).unwrap_or_default()));
    }
    Ok(records)
}

fn overview(document: &Html, origin: &str) -> Result<Vec<Record>> {
    let content = require(document, &consts::SENMANGA_OVERVIEW_CONTAINER, "overview")?;
    let details = Details::Overview {
        alternative_title: text(content, &consts::SENMANGA_OVERVIEW_ALT_TITLE),
        summary: text(content, &consts::SENMANGA_OVERVIEW_SUMMARY),
        status: text(content, &consts::SENMANGA_OVERVIEW_STATUS),
    };
    let title = text(content, &consts::SENMANGA_OVERVIEW_TITLE);
    let cover = content.select(&consts::SENMANGA_OVERVIEW_COVER).find_map(image_source).unwrap_or_default();
    Ok(vec![Record::new(PROVIDER, origin, title, details).with_media(cover)])
}

/// Authors and genres are both plain link lists inside the description block.
fn linked(document: &Html, kind: RecordKind) -> Result<Vec<Record>> {
    require(document, &consts::SENMANGA_OVERVIEW_CONTAINER, "overview")?;
    let (selector, details) = match kind {
        RecordKind::Authors => (&*consts::SENMANGA_AUTHOR_ITEM, Details::Author),
        _ => (&*consts::SENMANGA_GENRE_ITEM, Details::Genre),
    };
    Ok(document
        .select(selector)
        .filter_map(|anchor| {
            let link = anchor.value().attr("href")?;
            Some(Record::new(PROVIDER, link, element_text(anchor), details.clone()))
        })
        .collect())
}

fn chapters(document: &Html) -> Result<Vec<Record>> {
    require(document, &consts::SENMANGA_CHAPTER_CONTAINER, "chapters")?;
    let items: Vec<_> = document.select(&consts::SENMANGA_CHAPTER_ITEM).collect();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(anchor) = item.select(&consts::ANCHOR_HREF).next() else {
            skip(RecordKind::Chapters, index, "no link");
            continue;
        };
        let link = anchor.value().attr("href").unwrap_or_default();
        let date = item
            .select(&consts::SENMANGA_CHAPTER_DATE)
            .next()
            .map(|time| time.value().attr("datetime").map(str::to_string).unwrap_or_else(|| element_text(time)))
            .unwrap_or_default();
        let details = Details::Chapter { number: inverted_ordinal(items.len(), index), date };
        records.push(Record::new(PROVIDER, link, element_text(anchor), details));
    }
    Ok(records)
}

fn pages(document: &Html) -> Result<Vec<Record>> {
    require(document, &consts::SENMANGA_PAGE_CONTAINER, "pages")?;
    let mut records = Vec::new();
    for (index, image) in document.select(&consts::SENMANGA_PAGE_ITEM).enumerate() {
        let Some(source) = image_source(image) else {
            skip(RecordKind::Pages, index, "no image source");
            continue;
        };
        // Pages are numbered by what was actually found, SenManga's reader
        // pads chapters with empty placeholders.
        let number = u32::try_from(records.len() + 1).unwrap_or(u32::MAX);
        let record = Record::new(PROVIDER, source.clone(), number.to_string(), Details::Page { number });
        records.push(record.with_media(source));
    }
    Ok(records)
}
