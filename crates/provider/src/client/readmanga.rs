use async_trait::async_trait;
use tracing::instrument;

use super::{HttpClient, Provider, page_number, parse, scrape};
use crate::category::{Category, CategoryKind};
use crate::error::Result;
use crate::key::{KeyScheme, PageKey};
use crate::page::Page;
use folio_extract::models::{ProviderId, Record, RecordKind};

const CATEGORIES: &[CategoryKind] = &[CategoryKind::Recent, CategoryKind::Trending, CategoryKind::Genre];

/// ReadManga: plain HTML listings, numbered from page 1.
pub struct ReadManga {
    http: HttpClient,
}

impl ReadManga {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    fn listing_path(category: &Category, page: u32) -> Option<String> {
        match category {
            Category::Recent => Some(format!("latest-releases/{page}")),
            Category::Trending => Some(format!("popular-manga/{page}")),
            Category::Genre(genre) => Some(format!("category/{}/watch/{page}", genre.trim().to_lowercase())),
            Category::Author(_) | Category::Search(_) => None,
        }
    }
}

#[async_trait]
impl Provider for ReadManga {
    fn id(&self) -> ProviderId {
        ProviderId::ReadManga
    }

    fn key_scheme(&self) -> KeyScheme {
        KeyScheme::Numbered { start: 1 }
    }

    fn categories(&self) -> &[CategoryKind] {
        CATEGORIES
    }

    #[instrument(skip(self), fields(provider = %self.id()))]
    async fn fetch(&self, category: &Category, key: &PageKey) -> Result<Page> {
        let Some(path) = Self::listing_path(category, page_number(key)?) else {
            return Ok(Page::empty());
        };
        let url = self.http.url(&path);
        let html = self.http.get(&url, &[]).await?;
        Ok(Page::new(parse(self.id(), &url, &html, category.record_kind())?))
    }

    #[instrument(skip(self), fields(provider = %self.id()))]
    async fn lookup(&self, kind: RecordKind, link: &str) -> Result<Vec<Record>> {
        scrape(&self.http, self.id(), link, kind).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::HttpOptions;
    use crate::error::ErrorKind;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LISTING: &str = r#"
        <div class="style-thumbnail">
            <ul class="clearfix">
                <li><a href="/one-piece" title="One Piece"><img src="/one-piece.jpg"></a></li>
                <li><a href="/berserk" title="Berserk"><img src="/berserk.jpg"></a></li>
            </ul>
        </div>
    "#;

    async fn provider(server: &MockServer) -> ReadManga {
        let http = HttpClient::new(&HttpOptions {
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
            user_agent: "folio-test".to_string(),
            page_size: 30,
        })
        .unwrap();
        ReadManga::new(http)
    }

    #[tokio::test]
    async fn test_fetch_recent_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/latest-releases/2"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .expect(1)
            .mount(&server)
            .await;

        let page = provider(&server).await.fetch(&Category::Recent, &PageKey::from(2)).await.unwrap();
        let titles: Vec<_> = page.records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, ["One Piece", "Berserk"]);
        assert_eq!(page.next, None);
    }

    #[tokio::test]
    async fn test_fetch_genre_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/category/action/watch/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(LISTING))
            .mount(&server)
            .await;

        let page = provider(&server)
            .await
            .fetch(&Category::Genre("Action".into()), &PageKey::from(1))
            .await
            .unwrap();
        assert_eq!(page.len(), 2);
    }

    #[tokio::test]
    async fn test_unsupported_category_does_not_hit_network() {
        let server = MockServer::start().await;
        let provider = provider(&server).await;
        assert!(!provider.supports(&Category::Search("x".into())));
        let page = provider.fetch(&Category::Search("x".into()), &PageKey::from(1)).await.unwrap();
        assert!(page.is_empty());
        assert!(server.received_requests().await.unwrap_or_default().is_empty());
    }

    #[tokio::test]
    async fn test_error_page_is_malformed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Under maintenance</h1>"))
            .mount(&server)
            .await;

        let err = provider(&server).await.fetch(&Category::Trending, &PageKey::from(1)).await.unwrap_err();
        assert_eq!(*err, ErrorKind::MalformedSource);
    }

    #[tokio::test]
    async fn test_rejects_token_keys() {
        let server = MockServer::start().await;
        let err = provider(&server).await.fetch(&Category::Recent, &PageKey::from("abc")).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidKey(_)));
    }
}
