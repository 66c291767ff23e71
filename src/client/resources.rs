//! Entity Resource Access
//!
//! Every CRM entity exposes the same three endpoints:
//!
//! - `GET /<entity>` - one page of records
//! - `GET /<entity>/user/fields` - displayable field descriptors
//! - `GET /<entity>/all` - unpaginated bulk listing for export
//!
//! [`EntityClient`] implements them once, keyed by [`EntityKind`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::ClientResult;
use super::http::ApiClient;
use super::types::{Cursor, ExportResponse, FieldDescriptor, FieldsResponse, Page};
use crate::session::Session;

/// Page size used when none is given
pub const DEFAULT_LIMIT: u32 = 10;

/// CRM entity types served by the backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Contacts,
    Companies,
    Deals,
    Products,
    Quotes,
    Payments,
    Invoices,
    Subscriptions,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Contacts,
        EntityKind::Companies,
        EntityKind::Deals,
        EntityKind::Products,
        EntityKind::Quotes,
        EntityKind::Payments,
        EntityKind::Invoices,
        EntityKind::Subscriptions,
    ];

    /// Path segment, also used as the preference category
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Contacts => "contacts",
            EntityKind::Companies => "companies",
            EntityKind::Deals => "deals",
            EntityKind::Products => "products",
            EntityKind::Quotes => "quotes",
            EntityKind::Payments => "payments",
            EntityKind::Invoices => "invoices",
            EntityKind::Subscriptions => "subscriptions",
        }
    }

    pub fn path(&self) -> String {
        format!("/{}", self.as_str())
    }

    /// Singular noun used in log messages
    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Contacts => "contact",
            EntityKind::Companies => "company",
            EntityKind::Deals => "deal",
            EntityKind::Products => "product",
            EntityKind::Quotes => "quote",
            EntityKind::Payments => "payment",
            EntityKind::Invoices => "invoice",
            EntityKind::Subscriptions => "subscription",
        }
    }

    /// Whether list endpoints accept a `search` parameter
    pub fn supports_search(&self) -> bool {
        matches!(
            self,
            EntityKind::Contacts | EntityKind::Companies | EntityKind::Deals | EntityKind::Products
        )
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        EntityKind::ALL
            .into_iter()
            .find(|k| k.as_str() == s || k.singular() == s)
            .ok_or_else(|| format!("Unknown entity type: {}", s))
    }
}

/// Pagination and search arguments of a list call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListParams {
    pub limit: u32,
    pub next_page: Option<Cursor>,
    pub search: String,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            next_page: None,
            search: String::new(),
        }
    }
}

impl ListParams {
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn next_page(mut self, cursor: impl Into<Cursor>) -> Self {
        self.next_page = Some(cursor.into());
        self
    }

    pub fn search(mut self, search: impl Into<String>) -> Self {
        self.search = search.into();
        self
    }

    /// Query parameters for `kind`'s list endpoint
    ///
    /// `limit` is always sent; `nextPage` only when present and non-empty; `search` only
    /// when non-empty and supported by the entity.
    pub fn query_pairs(&self, kind: EntityKind) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.limit.to_string())];

        if let Some(cursor) = self.next_page.as_ref().filter(|c| !c.is_empty()) {
            pairs.push(("nextPage", cursor.as_str().to_string()));
        }

        if !self.search.is_empty() {
            if kind.supports_search() {
                pairs.push(("search", self.search.clone()));
            } else {
                tracing::debug!(entity = %kind, "Search is not supported, ignoring search term");
            }
        }

        pairs
    }
}

/// Resource access for a single entity type
#[derive(Debug, Clone, Copy)]
pub struct EntityClient<'a> {
    api: &'a ApiClient,
    kind: EntityKind,
}

impl<'a> EntityClient<'a> {
    pub fn new(api: &'a ApiClient, kind: EntityKind) -> Self {
        Self { api, kind }
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Fetch one page of records
    pub async fn list(&self, session: &Session, params: &ListParams) -> ClientResult<Page> {
        let query = params.query_pairs(self.kind);
        self.api
            .get_with(session, &self.kind.path(), &query)
            .await
            .map_err(|e| {
                tracing::error!(entity = %self.kind, error = %e, "Error fetching {}", self.kind);
                e
            })
    }

    /// Fetch the displayable field descriptors
    pub async fn fetch_fields(&self, session: &Session) -> ClientResult<Vec<FieldDescriptor>> {
        let path = format!("{}/user/fields", self.kind.path());
        self.api
            .get_with::<FieldsResponse>(session, &path, &[])
            .await
            .map(|r| r.fields)
            .map_err(|e| {
                tracing::error!(
                    entity = %self.kind,
                    error = %e,
                    "Error fetching {} fields",
                    self.kind.singular()
                );
                e
            })
    }

    /// Fetch every record for bulk export
    pub async fn export_all(&self, session: &Session) -> ClientResult<ExportResponse> {
        let path = format!("{}/all", self.kind.path());
        self.api
            .get_with(session, &path, &[])
            .await
            .map_err(|e| {
                tracing::error!(entity = %self.kind, error = %e, "Error fetching all {}", self.kind);
                e
            })
    }

    /// Fetch a page and the field descriptors concurrently
    pub async fn list_with_fields(
        &self,
        session: &Session,
        params: &ListParams,
    ) -> ClientResult<(Page, Vec<FieldDescriptor>)> {
        futures_util::future::try_join(self.list(session, params), self.fetch_fields(session))
            .await
    }
}

impl ApiClient {
    pub fn entity(&self, kind: EntityKind) -> EntityClient<'_> {
        EntityClient::new(self, kind)
    }

    pub fn contacts(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Contacts)
    }

    pub fn companies(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Companies)
    }

    pub fn deals(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Deals)
    }

    pub fn products(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Products)
    }

    pub fn quotes(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Quotes)
    }

    pub fn payments(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Payments)
    }

    pub fn invoices(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Invoices)
    }

    pub fn subscriptions(&self) -> EntityClient<'_> {
        self.entity(EntityKind::Subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(pairs: &[(&'static str, String)]) -> Vec<&'static str> {
        pairs.iter().map(|(k, _)| *k).collect()
    }

    #[test]
    fn test_default_params_send_only_limit() {
        for kind in EntityKind::ALL {
            let pairs = ListParams::default().query_pairs(kind);
            assert_eq!(pairs, vec![("limit", "10".to_string())]);
        }
    }

    #[test]
    fn test_all_params_for_searchable_entities() {
        let params = ListParams::default().limit(20).next_page("p2").search("john");

        for kind in EntityKind::ALL.into_iter().filter(|k| k.supports_search()) {
            let pairs = params.query_pairs(kind);
            assert_eq!(
                pairs,
                vec![
                    ("limit", "20".to_string()),
                    ("nextPage", "p2".to_string()),
                    ("search", "john".to_string()),
                ]
            );
        }
    }

    #[test]
    fn test_search_dropped_for_stub_entities() {
        let params = ListParams::default().search("john");

        for kind in [
            EntityKind::Quotes,
            EntityKind::Payments,
            EntityKind::Invoices,
            EntityKind::Subscriptions,
        ] {
            assert_eq!(keys(&params.query_pairs(kind)), vec!["limit"]);
        }
    }

    #[test]
    fn test_cursor_without_search() {
        let params = ListParams::default().next_page("cursor-xyz");
        let pairs = params.query_pairs(EntityKind::Deals);
        assert_eq!(keys(&pairs), vec!["limit", "nextPage"]);
        assert_eq!(pairs[1].1, "cursor-xyz");
    }

    #[test]
    fn test_empty_cursor_not_sent() {
        let params = ListParams::default().next_page("");
        assert_eq!(keys(&params.query_pairs(EntityKind::Contacts)), vec!["limit"]);
    }

    #[test]
    fn test_entity_kind_parsing() {
        assert_eq!("contacts".parse::<EntityKind>().unwrap(), EntityKind::Contacts);
        assert_eq!("Company".parse::<EntityKind>().unwrap(), EntityKind::Companies);
        assert_eq!(" deals ".parse::<EntityKind>().unwrap(), EntityKind::Deals);
        assert!("widgets".parse::<EntityKind>().is_err());
    }

    #[test]
    fn test_entity_paths() {
        assert_eq!(EntityKind::Contacts.path(), "/contacts");
        assert_eq!(EntityKind::Subscriptions.path(), "/subscriptions");
        assert_eq!(EntityKind::Invoices.to_string(), "invoices");
    }
}
