use scraper::Html;

use super::{Dialect, attr, element_text, first_image, image_source, inverted_ordinal, own_text, require, skip, text};
use crate::consts;
use crate::error::Result;
use crate::models::{Details, ProviderId, Record, RecordKind};

const PROVIDER: ProviderId = ProviderId::ReadManga;

pub(crate) struct ReadManga;

impl Dialect for ReadManga {
    fn supports(&self, kind: RecordKind) -> bool {
        !matches!(kind, RecordKind::SearchHits)
    }

    fn extract(&self, document: &Html, origin: &str, kind: RecordKind) -> Result<Vec<Record>> {
        match kind {
            RecordKind::Listing => listing(document),
            RecordKind::Overview => overview(document, origin),
            RecordKind::Genres => genres(document),
            RecordKind::Authors => authors(document),
            RecordKind::Chapters => chapters(document),
            RecordKind::Pages => pages(document),
            RecordKind::SearchHits => Ok(Vec::new()),
        }
    }
}

fn listing(document: &Html) -> Result<Vec<Record>> {
    require(document, &consts::READMANGA_LISTING_CONTAINER, "listing")?;
    let mut records = Vec::new();
    for (index, item) in document.select(&consts::READMANGA_LISTING_ITEM).enumerate() {
        let Some(link) = attr(item, &consts::ANCHOR_HREF, "href") else {
            skip(RecordKind::Listing, index, "no link");
            continue;
        };
        let title = attr(item, &consts::ANCHOR, "title").unwrap_or_default();
        // Neither the latest chapter nor the view count are rendered on
        // ReadManga's thumbnail grids.
        let details = Details::Listing { latest_chapter: String::new(), view_count: None };
        records.push(Record::new(PROVIDER, link, title, details).with_media(first_image(item).unwrap_or_default()));
    }
    Ok(records)
}

fn overview(document: &Html, origin: &str) -> Result<Vec<Record>> {
    let content = require(document, &consts::READMANGA_OVERVIEW_CONTAINER, "overview")?;
    let details = Details::Overview {
        alternative_title: own_text(content, &consts::READMANGA_OVERVIEW_ALT_TITLE),
        summary: text(content, &consts::READMANGA_OVERVIEW_SUMMARY),
        status: own_text(content, &consts::READMANGA_OVERVIEW_STATUS),
    };
    let title = text(content, &consts::READMANGA_OVERVIEW_TITLE);
    let cover = first_image(content).unwrap_or_default();
    Ok(vec![Record::new(PROVIDER, origin, title, details).with_media(cover)])
}

fn genres(document: &Html) -> Result<Vec<Record>> {
    let container = require(document, &consts::READMANGA_GENRE_CONTAINER, "genres")?;
    let mut records = Vec::new();
    for (index, anchor) in container.select(&consts::ANCHOR).enumerate() {
        let Some(link) = anchor.value().attr("href") else {
            skip(RecordKind::Genres, index, "no link");
            continue;
        };
        records.push(Record::new(PROVIDER, link, element_text(anchor), Details::Genre));
    }
    Ok(records)
}

fn authors(document: &Html) -> Result<Vec<Record>> {
    let container = require(document, &consts::READMANGA_AUTHOR_CONTAINER, "authors")?;
    let Some(link) = attr(container, &consts::ANCHOR_HREF, "href") else {
        skip(RecordKind::Authors, 0, "no link");
        return Ok(Vec::new());
    };
    let name = text(container, &consts::READMANGA_AUTHOR_NAME);
    Ok(vec![Record::new(PROVIDER, link, name, Details::Author)])
}

fn chapters(document: &Html) -> Result<Vec<Record>> {
    require(document, &consts::READMANGA_CHAPTER_CONTAINER, "chapters")?;
    // Newest chapter first in the markup.
    let items: Vec<_> = document.select(&consts::READMANGA_CHAPTER_ITEM).collect();
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Some(href) = attr(*item, &consts::ANCHOR_HREF, "href") else {
            skip(RecordKind::Chapters, index, "no link");
            continue;
        };
        let details = Details::Chapter {
            number: inverted_ordinal(items.len(), index),
            date: attr(*item, &consts::READMANGA_CHAPTER_DATE, "title").unwrap_or_default(),
        };
        let title = text(*item, &consts::READMANGA_CHAPTER_TITLE);
        records.push(Record::new(PROVIDER, format!("{href}/all-pages"), title, details));
    }
    Ok(records)
}

fn pages(document: &Html) -> Result<Vec<Record>> {
    require(document, &consts::READMANGA_PAGE_CONTAINER, "pages")?;
    let mut records = Vec::new();
    for (index, image) in document.select(&consts::READMANGA_PAGE_ITEM).enumerate() {
        let Some(source) = image_source(image) else {
            skip(RecordKind::Pages, index, "no image source");
            continue;
        };
        // Numbered by kept images so the reader's pages stay contiguous.
        let number = u32::try_from(records.len() + 1).unwrap_or(u32::MAX);
        let record = Record::new(PROVIDER, source.clone(), number.to_string(), Details::Page { number });
        records.push(record.with_media(source));
    }
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Extractor;

    const LISTING: &str = r#"
        <div class="style-thumbnail">
            <ul class="clearfix">
                <li><a href="https://readmng.com/one-piece" title="One Piece"><img src="https://cdn.readmng.com/one-piece.jpg"></a></li>
                <li><a href="https://readmng.com/berserk" title="Berserk"><img src="https://cdn.readmng.com/berserk.jpg"></a></li>
                <li><span>Advertisement</span></li>
            </ul>
        </div>
    "#;

    const OVERVIEW: &str = r#"
        <div class="panel panel-primary">
            <div class="panel-heading"><h1>One Piece</h1></div>
            <img src="https://cdn.readmng.com/one-piece.jpg">
            <div class="movie-detail"><p>Gol D. Roger was known as the Pirate King.</p></div>
            <dl>
                <dt>Alternative Name:</dt><dd><b>Alt:</b> ワンピース</dd>
                <dt>Status:</dt><dd>Ongoing</dd>
                <dt>Genres:</dt><dd><a href="https://readmng.com/category/action">Action</a>, <a href="https://readmng.com/category/comedy">Comedy</a></dd>
            </dl>
            <div class="director">
                <a href="https://readmng.com/people/oda-eiichiro">
                    <ul><li>Oda Eiichiro</li><li>Author</li></ul>
                </a>
            </div>
        </div>
    "#;

    const CHAPTERS: &str = r#"
        <ul class="chp_lst">
            <li><a href="https://readmng.com/one-piece/3"><span class="val">Chapter 3</span><span class="dte" title="2 days ago"></span></a></li>
            <li><a href="https://readmng.com/one-piece/2"><span class="val">Chapter 2</span><span class="dte" title="1 week ago"></span></a></li>
            <li><a href="https://readmng.com/one-piece/1"><span class="val">Chapter 1</span><span class="dte" title="1 year ago"></span></a></li>
        </ul>
    "#;

    fn records(html: &str, kind: RecordKind) -> Vec<Record> {
        Extractor::from_html(PROVIDER, html)
            .with_origin("https://readmng.com/one-piece")
            .records(kind)
            .unwrap()
    }

    #[test]
    fn test_listing() {
        let records = records(LISTING, RecordKind::Listing);
        // The advertisement has no link and is skipped, not fatal.
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "One Piece");
        assert_eq!(records[0].link, "https://readmng.com/one-piece");
        assert_eq!(records[0].media, vec!["https://cdn.readmng.com/one-piece.jpg".to_string()]);
        assert_eq!(records[1].title, "Berserk");
        assert_eq!(records[1].details, Details::Listing { latest_chapter: String::new(), view_count: None });
    }

    #[test]
    fn test_empty_listing_container_is_not_an_error() {
        let html = r#"<div class="style-thumbnail"><ul class="clearfix"></ul></div>"#;
        assert!(records(html, RecordKind::Listing).is_empty());
    }

    #[test]
    fn test_overview() {
        let records = records(OVERVIEW, RecordKind::Overview);
        assert_eq!(records.len(), 1);
        let overview = &records[0];
        assert_eq!(overview.title, "One Piece");
        assert_eq!(overview.link, "https://readmng.com/one-piece");
        assert_eq!(
            overview.details,
            Details::Overview {
                alternative_title: "ワンピース".to_string(),
                summary: "Gol D. Roger was known as the Pirate King.".to_string(),
                status: "Ongoing".to_string(),
            }
        );
    }

    #[test]
    fn test_genres_and_authors() {
        let genres = records(OVERVIEW, RecordKind::Genres);
        let names: Vec<_> = genres.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(names, ["Action", "Comedy"]);
        let authors = records(OVERVIEW, RecordKind::Authors);
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].title, "Oda Eiichiro");
        assert_eq!(authors[0].link, "https://readmng.com/people/oda-eiichiro");
    }

    #[test]
    fn test_chapter_ordinals_are_inverted() {
        let records = records(CHAPTERS, RecordKind::Chapters);
        let numbered: Vec<_> = records
            .iter()
            .map(|r| match &r.details {
                Details::Chapter { number, .. } => (r.title.as_str(), *number),
                other => panic!("unexpected details: {other:?}"),
            })
            .collect();
        // Markup-last is the earliest chapter.
        assert_eq!(numbered, [("Chapter 3", 3.0), ("Chapter 2", 2.0), ("Chapter 1", 1.0)]);
        assert_eq!(records[2].link, "https://readmng.com/one-piece/1/all-pages");
        assert_eq!(
            records[0].details,
            Details::Chapter { number: 3.0, date: "2 days ago".to_string() }
        );
    }

    #[test]
    fn test_pages_are_numbered_contiguously() {
        let html = r#"
            <div class="content-list">
                <img src="https://cdn.readmng.com/1.jpg">
                <img src="">
                <img data-src="https://cdn.readmng.com/3.jpg" src="">
            </div>
        "#;
        let records = records(html, RecordKind::Pages);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].details, Details::Page { number: 1 });
        assert_eq!(records[1].details, Details::Page { number: 2 });
        assert_eq!(records[1].title, "2");
        assert_eq!(records[1].link, "https://cdn.readmng.com/3.jpg");
    }

    #[test]
    fn test_search_is_unsupported() {
        assert!(!crate::supports(PROVIDER, RecordKind::SearchHits));
        assert!(records(LISTING, RecordKind::SearchHits).is_empty());
    }
}
