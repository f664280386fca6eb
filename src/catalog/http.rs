//! HTTP catalog backed by the TMDB v3 REST API.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::{Catalog, CatalogError, GenreTable, Payload, QueryKey, ResultPage};
use crate::config::ApiSettings;

/// A catalog that issues read-only GET requests against a TMDB-style API.
///
/// Authentication is a static `api_key` query parameter taken from the
/// injected [`ApiSettings`].
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    language: Option<String>,
    description: String,
}

impl HttpCatalog {
    /// Build a catalog client from settings.
    ///
    /// Fails with [`CatalogError::MissingApiKey`] when no key is configured.
    pub fn new(settings: &ApiSettings) -> Result<Self, CatalogError> {
        if settings.key.trim().is_empty() {
            return Err(CatalogError::MissingApiKey);
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self::with_client(client, settings))
    }

    /// Build a catalog reusing an existing [`reqwest::Client`].
    pub fn with_client(client: reqwest::Client, settings: &ApiSettings) -> Self {
        let base_url = settings.base_url.trim_end_matches('/').to_string();
        let description = format!("catalog: {}", base_url);
        Self {
            client,
            base_url,
            api_key: settings.key.trim().to_string(),
            language: settings.language.clone(),
            description,
        }
    }

    /// Full request URL for a key, without query parameters.
    pub fn url_for(&self, key: &QueryKey) -> String {
        format!("{}/{}", self.base_url, key.endpoint())
    }

    async fn get<T: DeserializeOwned>(&self, key: &QueryKey) -> Result<T, CatalogError> {
        let mut params: Vec<(&str, &str)> = vec![("api_key", self.api_key.as_str())];
        if let Some(ref language) = self.language {
            params.push(("language", language.as_str()));
        }
        if let QueryKey::Search { keyword, .. } = key {
            params.push(("query", keyword.as_str()));
        }

        tracing::debug!(endpoint = %key, "fetching from catalog");

        let response = self.client.get(self.url_for(key)).query(&params).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "<unreadable body>".to_string());
            tracing::warn!(endpoint = %key, status = status.as_u16(), "catalog request failed");
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl Catalog for HttpCatalog {
    async fn fetch(&self, key: &QueryKey) -> Result<Payload, CatalogError> {
        if key.is_genres() {
            let table: GenreTable = self.get(key).await?;
            Ok(Payload::Genres(Arc::new(table)))
        } else {
            let page: ResultPage = self.get(key).await?;
            tracing::debug!(endpoint = %key, items = page.results.len(), "catalog page received");
            Ok(Payload::Page(Arc::new(page)))
        }
    }

    fn description(&self) -> &str {
        &self.description
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Collection, MediaKind};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    /// Serve one canned HTTP response and return the request head that was received.
    async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                head.extend_from_slice(&buf[..n]);
            }

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.ok();

            String::from_utf8_lossy(&head).lines().next().unwrap_or_default().to_string()
        });

        (format!("http://{}", addr), handle)
    }

    fn settings(base_url: String) -> ApiSettings {
        ApiSettings {
            base_url,
            key: "secret".to_string(),
            language: None,
            timeout_secs: 5,
        }
    }

    fn local_catalog(base_url: String) -> HttpCatalog {
        let client = reqwest::Client::builder().no_proxy().build().unwrap();
        HttpCatalog::with_client(client, &settings(base_url))
    }

    #[test]
    fn test_missing_api_key_is_rejected() {
        let mut settings = settings("http://localhost".to_string());
        settings.key = "  ".to_string();
        assert!(matches!(HttpCatalog::new(&settings), Err(CatalogError::MissingApiKey)));
    }

    #[test]
    fn test_url_for_trims_trailing_slash() {
        let catalog = HttpCatalog::new(&settings("https://api.example.org/3/".to_string())).unwrap();
        let key = QueryKey::collection(MediaKind::Tv, Collection::Popular);
        assert_eq!(catalog.url_for(&key), "https://api.example.org/3/tv/popular");
        assert_eq!(catalog.description(), "catalog: https://api.example.org/3");
    }

    #[tokio::test]
    async fn test_fetch_collection_page() {
        let (base, server) = serve_once(
            "200 OK",
            r#"{"page":1,"results":[{"id":7,"title":"Heat"}],"total_pages":1,"total_results":1}"#,
        )
        .await;
        let catalog = local_catalog(base);

        let payload = catalog
            .fetch(&QueryKey::collection(MediaKind::Movie, Collection::TopRated))
            .await
            .unwrap();
        let Payload::Page(page) = payload else {
            panic!("expected a result page");
        };
        assert_eq!(page.results[0].title, "Heat");

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /movie/top_rated?api_key=secret"));
    }

    #[tokio::test]
    async fn test_search_sends_encoded_query() {
        let (base, server) = serve_once("200 OK", r#"{"page":1,"results":[]}"#).await;
        let catalog = local_catalog(base);

        catalog.fetch(&QueryKey::search(MediaKind::Tv, "the office")).await.unwrap();

        let request_line = server.await.unwrap();
        assert!(request_line.starts_with("GET /search/tv?"));
        assert!(request_line.contains("query=the+office"));
    }

    #[tokio::test]
    async fn test_fetch_genres() {
        let (base, _server) =
            serve_once("200 OK", r#"{"genres":[{"id":18,"name":"Drama"}]}"#).await;
        let catalog = local_catalog(base);

        let payload = catalog.fetch(&QueryKey::Genres(MediaKind::Tv)).await.unwrap();
        let Payload::Genres(table) = payload else {
            panic!("expected a genre table");
        };
        assert_eq!(table.genres[0].name, "Drama");
    }

    #[tokio::test]
    async fn test_non_success_status_is_an_error() {
        let (base, _server) =
            serve_once("401 Unauthorized", r#"{"status_message":"Invalid API key"}"#).await;
        let catalog = local_catalog(base);

        let err = catalog
            .fetch(&QueryKey::collection(MediaKind::Movie, Collection::Upcoming))
            .await
            .unwrap_err();
        match err {
            CatalogError::Status { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_connection_refused_is_an_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let catalog = local_catalog(base);
        let result = catalog.fetch(&QueryKey::Genres(MediaKind::Movie)).await;
        assert!(matches!(result, Err(CatalogError::Request(_))));
    }
}
