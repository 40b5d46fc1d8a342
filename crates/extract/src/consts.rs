use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

// Shared
selector!(ANCHOR, "a");
selector!(ANCHOR_HREF, "a[href]");
selector!(IMAGE, "img");
regex!(DIGITS_REGEX, r"(\d{1,3}(?:,?\d{3})*)");
regex!(BACKGROUND_URL_REGEX, r#"url\(\s*['"]?([^'")]+)['"]?\s*\)"#);

// ReadManga
selector!(READMANGA_LISTING_CONTAINER, ".style-thumbnail");
selector!(READMANGA_LISTING_ITEM, ".style-thumbnail > .clearfix > li");
selector!(READMANGA_OVERVIEW_CONTAINER, ".panel-primary");
selector!(READMANGA_OVERVIEW_TITLE, ".panel-heading > h1");
selector!(READMANGA_OVERVIEW_SUMMARY, ".movie-detail > p");
selector!(READMANGA_OVERVIEW_ALT_TITLE, "dl > dd:nth-child(2)");
selector!(READMANGA_OVERVIEW_STATUS, "dl > dd:nth-child(4)");
selector!(READMANGA_GENRE_CONTAINER, "dl > dd:nth-child(6)");
selector!(READMANGA_AUTHOR_CONTAINER, ".director");
selector!(READMANGA_AUTHOR_NAME, "ul > li:nth-child(1)");
selector!(READMANGA_CHAPTER_CONTAINER, ".chp_lst");
selector!(READMANGA_CHAPTER_ITEM, ".chp_lst > li");
selector!(READMANGA_CHAPTER_TITLE, ".val");
selector!(READMANGA_CHAPTER_DATE, ".dte");
selector!(READMANGA_PAGE_CONTAINER, ".content-list");
selector!(READMANGA_PAGE_ITEM, ".content-list > img");

// SenManga
selector!(SENMANGA_LISTING_CONTAINER, ".series-list");
selector!(SENMANGA_LISTING_ITEM, ".series-list .item");
selector!(SENMANGA_LISTING_LINK, "a.series[href]");
selector!(SENMANGA_LISTING_TITLE, ".series-title");
selector!(SENMANGA_LISTING_CHAPTER, ".chapter a");
selector!(SENMANGA_LISTING_VIEWS, ".views");
selector!(SENMANGA_OVERVIEW_CONTAINER, ".series-desc");
selector!(SENMANGA_OVERVIEW_TITLE, "h1.series");
selector!(SENMANGA_OVERVIEW_ALT_TITLE, ".alt-name");
selector!(SENMANGA_OVERVIEW_SUMMARY, ".summary");
selector!(SENMANGA_OVERVIEW_STATUS, ".info .status");
selector!(SENMANGA_OVERVIEW_COVER, ".cover img");
selector!(SENMANGA_AUTHOR_ITEM, ".series-desc .author a[href]");
selector!(SENMANGA_GENRE_ITEM, ".series-desc .genre a[href]");
selector!(SENMANGA_CHAPTER_CONTAINER, "ul.chapter-list");
selector!(SENMANGA_CHAPTER_ITEM, "ul.chapter-list > li");
selector!(SENMANGA_CHAPTER_DATE, "time");
selector!(SENMANGA_PAGE_CONTAINER, ".reader");
selector!(SENMANGA_PAGE_ITEM, ".reader img.picture");

// DM5
selector!(DM5_LISTING_CONTAINER, "ul.mh-list");
selector!(DM5_LISTING_ITEM, "ul.mh-list > li");
selector!(DM5_LISTING_TITLE, "h2.title a[href]");
selector!(DM5_LISTING_COVER, "p.mh-cover");
selector!(DM5_LISTING_CHAPTER, "p.chapter a");
selector!(DM5_LISTING_AUTHOR, "p.author a");
selector!(DM5_OVERVIEW_CONTAINER, ".banner_detail_form");
selector!(DM5_OVERVIEW_TITLE, ".info p.title");
selector!(DM5_OVERVIEW_SUMMARY, ".info p.content");
selector!(DM5_OVERVIEW_STATUS, ".info p.tip span.block > span");
selector!(DM5_OVERVIEW_COVER, ".cover img");
selector!(DM5_AUTHOR_ITEM, ".banner_detail_form p.subtitle a[href]");
selector!(DM5_GENRE_ITEM, ".banner_detail_form p.tip a[href]");
selector!(DM5_CHAPTER_CONTAINER, "#chapterlistload");
selector!(DM5_CHAPTER_ITEM, "#chapterlistload li > a[href]");
