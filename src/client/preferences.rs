//! Field Preferences
//!
//! Unlike the entity endpoints, preference calls take their bearer token from
//! the token store at call time instead of from a [`Session`] argument. The
//! store is passed explicitly so the dependency stays visible.
//!
//! [`Session`]: crate::session::Session

use serde::Serialize;

use super::error::{ClientError, ClientResult};
use super::http::ApiClient;
use super::types::{Preference, PreferencesResponse};
use crate::session::TokenStore;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SavePreferencesRequest<'a> {
    category: &'a str,
    selected_fields: &'a [String],
}

impl ApiClient {
    /// Fetch the stored preference for `category`
    ///
    /// Returns `None` when the user has not saved one yet. With no token in
    /// `store` this fails with [`ClientError::NoToken`] and sends nothing,
    /// instead of letting the backend answer 401.
    pub async fn fetch_preferences(
        &self,
        store: &dyn TokenStore,
        category: &str,
    ) -> ClientResult<Option<Preference>> {
        let result: ClientResult<Option<Preference>> = async {
            let token = stored_token(store)?;
            let query = [("category", category.to_string())];
            self.get::<PreferencesResponse>("/preferences", &query, &token)
                .await
                .map(|r| r.preferences)
        }
        .await;

        result.map_err(|e| {
            tracing::error!(category, error = %e, "Error fetching preferences");
            e
        })
    }

    /// Save the selected fields for `category`, returning the response body
    ///
    /// Fails with [`ClientError::NoToken`] before any request when `store`
    /// holds no token.
    pub async fn save_preferences(
        &self,
        store: &dyn TokenStore,
        category: &str,
        selected_fields: &[String],
    ) -> ClientResult<serde_json::Value> {
        let result: ClientResult<serde_json::Value> = async {
            let token = stored_token(store)?;
            let body = SavePreferencesRequest {
                category,
                selected_fields,
            };
            self.post("/preferences", &body, &token).await
        }
        .await;

        result.map_err(|e| {
            tracing::error!(category, error = %e, "Error saving preferences");
            e
        })
    }
}

fn stored_token(store: &dyn TokenStore) -> ClientResult<String> {
    store.load()?.ok_or(ClientError::NoToken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryTokenStore;

    #[test]
    fn test_save_request_wire_format() {
        let fields = vec!["email".to_string(), "phone".to_string()];
        let body = SavePreferencesRequest {
            category: "contacts",
            selected_fields: &fields,
        };
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            serde_json::json!({"category": "contacts", "selectedFields": ["email", "phone"]})
        );
    }

    #[tokio::test]
    async fn test_fetch_without_stored_token() {
        // Unroutable origin: the call must fail before any request is made
        let api = ApiClient::with_base_url("http://127.0.0.1:9").unwrap();
        let store = MemoryTokenStore::new();

        let err = api.fetch_preferences(&store, "contacts").await.unwrap_err();
        assert!(matches!(err, ClientError::NoToken));

        let err = api
            .save_preferences(&store, "contacts", &["email".to_string()])
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::NoToken));
    }
}
