use scraper::{ElementRef, Html};

use super::{Dialect, attr, background_url, element_text, first_image, inverted_ordinal, own_text, require, skip, text};
use crate::consts;
use crate::error::Result;
use crate::models::{Details, ProviderId, Record, RecordKind};

const PROVIDER: ProviderId = ProviderId::Dm5;

pub(crate) struct Dm5;

impl Dialect for Dm5 {
    fn supports(&self, kind: RecordKind) -> bool {
        // Page images are assembled by an obfuscated script, not markup.
        !matches!(kind, RecordKind::Pages)
    }

    fn extract(&self, document: &Html, origin: &str, kind: RecordKind) -> Result<Vec<Record>> {
        match kind {
            RecordKind::Listing | RecordKind::SearchHits => listing(document, kind),
            RecordKind::Overview => overview(document, origin),
            RecordKind::Authors => linked(document, RecordKind::Authors),
            RecordKind::Genres => linked(document, RecordKind::Genres),
            RecordKind::Chapters => chapters(document),
            RecordKind::Pages => Ok(Vec::new()),
        }
    }
}

/// Browsing and search result pages share the same `mh-list` grid; the only
/// difference is that search results credit the author.
fn listing(document: &Html, kind: RecordKind) -> Result<Vec<Record>> {
    require(document, &consts::DM5_LISTING_CONTAINER, "mh-list")?;
    let mut records = Vec::new();
    for (index, item) in document.select(&consts::DM5_LISTING_ITEM).enumerate() {
        let Some(anchor) = item.select(&consts::DM5_LISTING_TITLE).next() else {
            skip(kind, index, "no link");
            continue;
        };
        let link = anchor.value().attr("href").unwrap_or_default();
        let title = anchor.value().attr("title").map(str::to_string).unwrap_or_else(|| element_text(anchor));
        let latest_chapter = text(item, &consts::DM5_LISTING_CHAPTER);
        let details = match kind {
            RecordKind::SearchHits => Details::SearchHit {
                latest_chapter,
                author: Some(text(item, &consts::DM5_LISTING_AUTHOR)).filter(|a| !a.is_empty()),
            },
            _ => Details::Listing { latest_chapter, view_count: None },
        };
        records.push(Record::new(PROVIDER, link, title, details).with_media(cover(item).unwrap_or_default()));
    }
    Ok(records)
}

fn cover(item: ElementRef<'_>) -> Option<String> {
    item.select(&consts::DM5_LISTING_COVER)
        .filter_map(|p| p.value().attr("style"))
        .find_map(background_url)
        .or_else(|| first_image(item))
}

fn overview(document: &Html, origin: &str) -> Result<Vec<Record>> {
    let content = require(document, &consts::DM5_OVERVIEW_CONTAINER, "banner_detail_form")?;
    let details = Details::Overview {
        // Not exposed.
        alternative_title: String::new(),
        summary: text(content, &consts::DM5_OVERVIEW_SUMMARY),
        status: text(content, &consts::DM5_OVERVIEW_STATUS),
    };
    // The title paragraph also holds the rating widget.
    let title = own_text(content, &consts::DM5_OVERVIEW_TITLE);
    let cover = attr(content, &consts::DM5_OVERVIEW_COVER, "src").unwrap_or_default();
    Ok(vec![Record::new(PROVIDER, origin, title, details).with_media(cover)])
}

fn linked(document: &Html, kind: RecordKind) -> Result<Vec<Record>> {
    require(document, &consts::DM5_OVERVIEW_CONTAINER, "banner_detail_form")?;
    let (selector, details) = match kind {
        RecordKind::Authors => (&*consts::DM5_AUTHOR_ITEM, Details::Author),
        _ => (&*consts::DM5_GENRE_ITEM, Details::Genre),
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
    require(document, &consts::DM5_CHAPTER_CONTAINER, "chapterlistload")?;
    let anchors: Vec<_> = document.select(&consts::DM5_CHAPTER_ITEM).collect();
    Ok(anchors
        .iter()
        .enumerate()
        .map(|(index, anchor)| {
            let link = anchor.value().attr("href").unwrap_or_default();
            let details = Details::Chapter {
                number: inverted_ordinal(anchors.len(), index),
                // DM5 doesn't date individual chapters.
                date: String::new(),
            };
            Record::new(PROVIDER, link, element_text(*anchor), details)
        })
        .collect())
}
