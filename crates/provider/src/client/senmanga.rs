use async_trait::async_trait;
use tracing::instrument;

use super::{HttpClient, Provider, page_number, parse, scrape};
use crate::category::{Category, CategoryKind};
use crate::error::Result;
use crate::key::{KeyScheme, PageKey};
use crate::page::Page;
use folio_extract::models::{ProviderId, Record, RecordKind};

const CATEGORIES: &[CategoryKind] = &[CategoryKind::Recent, CategoryKind::Trending];

/// SenManga: HTML directory listings with a `page` query parameter. No
/// search.
pub struct SenManga {
    http: HttpClient,
}

impl SenManga {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Provider for SenManga {
    fn id(&self) -> ProviderId {
        ProviderId::SenManga
    }

    fn key_scheme(&self) -> KeyScheme {
        KeyScheme::Numbered { start: 1 }
    }

    fn categories(&self) -> &[CategoryKind] {
        CATEGORIES
    }

    #[instrument(skip(self), fields(provider = %self.id()))]
    async fn fetch(&self, category: &Category, key: &PageKey) -> Result<Page> {
        let path = match category {
            Category::Recent => "directory/last_update",
            Category::Trending => "directory/popular",
            _ => return Ok(Page::empty()),
        };
        let page = page_number(key)?;
        let url = self.http.url(path);
        let html = self.http.get(&url, &[("page", page.to_string())]).await?;
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
    use folio_extract::models::Details;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn provider(server: &MockServer) -> SenManga {
        let http = HttpClient::new(&HttpOptions {
            base_url: server.uri(),
            timeout: Duration::from_secs(2),
            user_agent: "folio-test".to_string(),
            page_size: 40,
        })
        .unwrap();
        SenManga::new(http)
    }

    #[tokio::test]
    async fn test_fetch_popular() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/directory/popular"))
            .and(query_param("page", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"<div class="series-list">
                    <div class="item">
                        <a class="series" href="/kingdom" title="Kingdom"></a>
                        <div class="chapter"><a href="/kingdom/780">Chapter 780</a></div>
                    </div>
                </div>"#,
            ))
            .mount(&server)
            .await;

        let page = provider(&server).await.fetch(&Category::Trending, &PageKey::from(3)).await.unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page.records[0].title, "Kingdom");
        assert!(matches!(&page.records[0].details, Details::Listing { latest_chapter, .. } if latest_chapter == "Chapter 780"));
    }

    #[tokio::test]
    async fn test_past_the_end_is_an_empty_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/directory/last_update"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"<div class="series-list"></div>"#))
            .mount(&server)
            .await;

        let page = provider(&server).await.fetch(&Category::Recent, &PageKey::from(99)).await.unwrap();
        assert!(page.is_empty());
    }

    #[tokio::test]
    async fn test_search_is_unsupported() {
        let server = MockServer::start().await;
        let provider = provider(&server).await;
        assert_eq!(provider.categories(), [CategoryKind::Recent, CategoryKind::Trending]);
        let page = provider.fetch(&Category::Search("kingdom".into()), &PageKey::from(1)).await.unwrap();
        assert!(page.is_empty());
    }
}
