//! Dashboard Stats and Cross-Entity Search

use super::error::ClientResult;
use super::http::ApiClient;
use super::types::SearchResults;
use crate::session::Session;

impl ApiClient {
    /// Fetch dashboard statistics; the body is returned untransformed
    pub async fn get_stats(&self, session: &Session) -> ClientResult<serde_json::Value> {
        self.get_with(session, "/stats", &[]).await.map_err(|e| {
            tracing::error!(error = %e, "Error fetching stats");
            e
        })
    }

    /// Free-text search across every entity type
    pub async fn dynamic_search(&self, session: &Session, query: &str) -> ClientResult<SearchResults> {
        let params = [("query", query.to_string())];
        self.get_with(session, "/dynamic-search", &params)
            .await
            .map_err(|e| {
                tracing::error!(query, error = %e, "Error calling dynamic search");
                e
            })
    }
}
