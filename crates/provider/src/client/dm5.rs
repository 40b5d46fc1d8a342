use async_trait::async_trait;
use exn::ResultExt;
use facet_json::from_str as from_json;
use time::UtcDateTime;
use tracing::{debug, instrument};

use super::{HttpClient, Provider, page_number, parse, scrape};
use crate::category::{Category, CategoryKind};
use crate::error::{ErrorKind, Result};
use crate::key::{KeyScheme, PageKey};
use crate::page::Page;
use folio_extract::models::{Details, ProviderId, Record, RecordKind};

const CATEGORIES: &[CategoryKind] = &[
    CategoryKind::Recent,
    CategoryKind::Trending,
    CategoryKind::Genre,
    CategoryKind::Search,
];

/// Day offset for the update feed; `0` is today (the feed accepts `0..=6`).
const UPDATE_DAY: u8 = 0;

/// DM5: HTML grids for most categories, a JSON update feed for recent
/// releases.
pub struct Dm5 {
    http: HttpClient,
    page_size: u32,
}

impl Dm5 {
    pub fn new(http: HttpClient, page_size: u32) -> Self {
        Self { http, page_size }
    }

    async fn updates(&self, page: u32) -> Result<Page> {
        let url = self.http.url("manhua-new/dm5.ashx");
        let millis = UtcDateTime::now().unix_timestamp_nanos() / 1_000_000;
        let query = [("d", millis.to_string()), ("action", "getupdatecomics".to_string())];
        let form = [
            ("DK", UPDATE_DAY.to_string()),
            ("page", page.to_string()),
            ("pagesize", self.page_size.to_string()),
        ];
        let body = self.http.post_form(&url, &query, &form).await?;
        let payload = from_json::<UpdateFeed>(&body).or_raise(|| ErrorKind::MalformedSource)?;
        debug!(items = payload.items.len(), "decoded update feed");
        let records = payload
            .items
            .into_iter()
            .filter(|item| !item.url_key.trim().is_empty())
            .map(|item| self.update_record(item))
            .collect();
        Ok(Page::new(records))
    }

    fn update_record(&self, item: UpdateItem) -> Record {
        let link = self.http.url(&format!("{}/", item.url_key.trim_matches('/')));
        let details = Details::Listing {
            latest_chapter: item.latest_chapter,
            view_count: None,
        };
        Record::new(ProviderId::Dm5, link, item.title, details).with_media(item.cover)
    }

    fn route(category: &Category, page: u32) -> Route {
        match category {
            Category::Recent => Route::UpdateFeed,
            Category::Trending => Route::Grid(format!("manhua-list-s2-p{page}/"), Vec::new()),
            Category::Genre(genre) => Route::Grid(format!("manhua-list-tag{}-p{page}/", genre.trim()), Vec::new()),
            Category::Search(query) => Route::Grid(
                "search".to_string(),
                vec![("title", query.trim().to_string()), ("page", page.to_string())],
            ),
            // The site search only matches titles.
            Category::Author(_) => Route::Unsupported,
        }
    }
}

enum Route {
    UpdateFeed,
    Grid(String, Vec<(&'static str, String)>),
    Unsupported,
}

/// Shape of the `getupdatecomics` response; only the fields we keep.
#[derive(facet::Facet)]
struct UpdateFeed {
    #[facet(rename = "UpdateComicItems", default)]
    items: Vec<UpdateItem>,
}

#[derive(facet::Facet)]
struct UpdateItem {
    #[facet(rename = "Title", default)]
    title: String,
    #[facet(rename = "UrlKey", default)]
    url_key: String,
    #[facet(rename = "ShowPicUrlB", default)]
    cover: String,
    #[facet(rename = "ShowLastPartName", default)]
    latest_chapter: String,
}

#[async_trait]
impl Provider for Dm5 {
    fn id(&self) -> ProviderId {
        ProviderId::Dm5
    }

    fn key_scheme(&self) -> KeyScheme {
        KeyScheme::Numbered { start: 1 }
    }

    fn categories(&self) -> &[CategoryKind] {
        CATEGORIES
    }

    #[instrument(skip(self), fields(provider = %self.id()))]
    async fn fetch(&self, category: &Category, key: &PageKey) -> Result<Page> {
        let page = page_number(key)?;
        let (path, query) = match Self::route(category, page) {
            Route::UpdateFeed => return self.updates(page).await,
            Route::Grid(path, query) => (path, query),
            Route::Unsupported => return Ok(Page::empty()),
        };
        let url = self.http.url(&path);
        let html = self.http.get(&url, &query).await?;
        Ok(Page::new(parse(self.id(), &url, &html, category.record_kind())?))
    }

    #[instrument(skip(self), fields(provider = %self.id()))]
    async fn lookup(&self, kind: RecordKind, link: &str) -> Result<Vec<Record>> {
        scrape(&self.http, self.id(), link, kind).await
    }
}
