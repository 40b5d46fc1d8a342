use std::time::Duration;

use exn::ResultExt;
use reqwest::{Client, RequestBuilder};
use tracing::{debug, instrument};

use crate::error::{ErrorKind, Result};

/// Transport settings for one provider.
#[derive(Debug, Clone)]
pub struct HttpOptions {
    pub base_url: String,
    pub timeout: Duration,
    pub user_agent: String,
    /// Requested page size, for providers whose API takes one.
    pub page_size: u32,
}

/// Thin wrapper around a [`reqwest::Client`] bound to one provider's base
/// URL, mapping transport faults onto [`ErrorKind`].
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
}

impl HttpClient {
    pub fn new(options: &HttpOptions) -> Result<Self> {
        let base_url = options.base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            exn::bail!(ErrorKind::Configuration(format!("base URL must be absolute: {}", options.base_url)));
        }
        let client = Client::builder()
            .timeout(options.timeout)
            .user_agent(options.user_agent.as_str())
            .build()
            .or_raise(|| ErrorKind::Configuration("could not build HTTP client".to_string()))?;
        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Resolve a provider-relative path (or pass an absolute URL through).
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        }
    }

    #[instrument(skip(self, query))]
    pub async fn get(&self, url: &str, query: &[(&str, String)]) -> Result<String> {
        self.send(self.client.get(url).query(query)).await
    }

    #[instrument(skip(self, query, form))]
    pub async fn post_form(&self, url: &str, query: &[(&str, String)], form: &[(&str, String)]) -> Result<String> {
        self.send(self.client.post(url).query(query).form(form)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<String> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if !status.is_success() {
            debug!(%status, "upstream rejected request");
            exn::bail!(ErrorKind::Protocol(status.as_u16()));
        }
        let body = response.text().await.map_err(transport)?;
        debug!(body_size = body.len(), "fetched document");
        Ok(body)
    }
}

fn transport(err: reqwest::Error) -> exn::Exn<ErrorKind> {
    let kind = if err.is_timeout() {
        ErrorKind::Timeout
    } else {
        ErrorKind::Transport(err.to_string())
    };
    exn::Exn::from(err).raise(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn options(base_url: &str) -> HttpOptions {
        HttpOptions {
            base_url: base_url.to_string(),
            timeout: Duration::from_millis(500),
            user_agent: "folio-test".to_string(),
            page_size: 30,
        }
    }

    #[test]
    fn test_rejects_relative_base_url() {
        let err = HttpClient::new(&options("example.com")).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Configuration(_)));
    }

    #[test]
    fn test_url_resolution() {
        let client = HttpClient::new(&options("https://example.com/")).unwrap();
        assert_eq!(client.url("/manga/one"), "https://example.com/manga/one");
        assert_eq!(client.url("manga/one"), "https://example.com/manga/one");
        assert_eq!(client.url("https://cdn.example.com/x"), "https://cdn.example.com/x");
    }

    #[tokio::test]
    async fn test_get_with_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/list"))
            .and(query_param("page", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let client = HttpClient::new(&options(&server.uri())).unwrap();
        let body = client.get(&client.url("list"), &[("page", "2".to_string())]).await.unwrap();
        assert_eq!(body, "<html></html>");
    }

    #[tokio::test]
    async fn test_status_maps_to_protocol() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = HttpClient::new(&options(&server.uri())).unwrap();
        let err = client.get(&client.url("anything"), &[]).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Protocol(503));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_slow_upstream_maps_to_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = HttpClient::new(&options(&server.uri())).unwrap();
        let err = client.get(&client.url("slow"), &[]).await.unwrap_err();
        assert_eq!(*err, ErrorKind::Timeout);
    }

    #[tokio::test]
    async fn test_unreachable_maps_to_transport() {
        // Port 9 (discard) is never served in the test environment.
        let client = HttpClient::new(&options("http://127.0.0.1:9")).unwrap();
        let err = client.get(&client.url("x"), &[]).await.unwrap_err();
        assert!(matches!(&*err, ErrorKind::Transport(_)));
    }
}
