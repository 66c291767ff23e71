//! HTTP Client Wrapper
//!
//! Issues authenticated GET/POST calls against the configured backend origin
//! and decodes the JSON body. Failures are logged and handed back unchanged;
//! there is no retry.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use super::error::{ClientError, ClientResult};
use crate::config::BackendConfig;
use crate::session::Session;

/// CRM backend REST client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client with the given configuration
    pub fn new(config: &BackendConfig) -> ClientResult<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        // Reject malformed origins up front rather than on the first call
        Url::parse(&config.url)?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
        })
    }

    /// Create a client for the given origin with default settings
    pub fn with_base_url(base_url: impl Into<String>) -> ClientResult<Self> {
        Self::new(&BackendConfig {
            url: base_url.into(),
            ..Default::default()
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build `<base URL><path>` with the given query parameters
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> ClientResult<Url> {
        let mut url = Url::parse(&format!("{}{}", self.base_url, path))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Authenticated GET, decoding the response body as `T`
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        token: &str,
    ) -> ClientResult<T> {
        let url = self.url(path, query)?;
        let request = self.client.request(Method::GET, url).bearer_auth(token);
        self.execute(Method::GET, path, request).await
    }

    /// Authenticated POST with a JSON body, decoding the response body as `T`
    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
        token: &str,
    ) -> ClientResult<T> {
        let url = self.url(path, &[])?;
        let request = self
            .client
            .request(Method::POST, url)
            .bearer_auth(token)
            .json(body);
        self.execute(Method::POST, path, request).await
    }

    /// GET using the session's token
    pub async fn get_with<T: DeserializeOwned>(
        &self,
        session: &Session,
        path: &str,
        query: &[(&str, String)],
    ) -> ClientResult<T> {
        self.get(path, query, session.token()).await
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        request: RequestBuilder,
    ) -> ClientResult<T> {
        let start = std::time::Instant::now();

        let response = request.send().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Request failed before a response arrived");
            ClientError::Network(e)
        })?;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::warn!(
                %method,
                path,
                status = status.as_u16(),
                duration_ms,
                "Backend returned an error status"
            );
            return Err(ClientError::Status {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Failed to read response body");
            ClientError::Network(e)
        })?;

        let body = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::warn!(%method, path, error = %e, "Unexpected response body");
            ClientError::Decode(e)
        })?;

        tracing::debug!(%method, path, status = status.as_u16(), duration_ms, "Request completed");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ApiClient::with_base_url("http://localhost:3000/api/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000/api");

        let url = client.url("/contacts", &[]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:3000/api/contacts");
    }

    #[test]
    fn test_invalid_base_url() {
        let err = ApiClient::with_base_url("not a url").unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[test]
    fn test_query_pairs_encoded_in_order() {
        let client = ApiClient::with_base_url("http://localhost:3000").unwrap();
        let url = client
            .url(
                "/contacts",
                &[
                    ("limit", "20".to_string()),
                    ("nextPage", "p2".to_string()),
                    ("search", "john smith".to_string()),
                ],
            )
            .unwrap();

        assert_eq!(url.path(), "/contacts");
        assert_eq!(url.query(), Some("limit=20&nextPage=p2&search=john+smith"));
    }

    #[test]
    fn test_no_query_string_when_empty() {
        let client = ApiClient::with_base_url("http://localhost:3000").unwrap();
        let url = client.url("/contacts/all", &[]).unwrap();
        assert_eq!(url.query(), None);
    }
}
