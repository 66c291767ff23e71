//! Wire Types
//!
//! Response envelopes shared by every entity endpoint. Records themselves are
//! schemaless JSON objects and are passed through untouched.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// A single CRM record
pub type Record = serde_json::Map<String, serde_json::Value>;

/// Opaque pagination position issued by the server
///
/// Accepted as a JSON string or number and always sent back as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Cursor(String);

impl Cursor {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty cursor means the same as no cursor
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Cursor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Cursor {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Cursor {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Cursor(s),
            Raw::Number(n) => Cursor(n.to_string()),
        })
    }
}

/// One page of a paginated listing
///
/// Top-level keys beyond the standard envelope are kept in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_page: Option<Cursor>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Page {
    pub fn has_more(&self) -> bool {
        self.next_page.as_ref().is_some_and(|c| !c.is_empty())
    }
}

/// Unpaginated bulk listing used for exports
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub total: u64,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Describes one displayable attribute of a record type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    pub field_key: String,
    pub field_label: String,
}

impl FieldDescriptor {
    pub fn new(key: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            field_key: key.into(),
            field_label: label.into(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct FieldsResponse {
    #[serde(default)]
    pub fields: Vec<FieldDescriptor>,
}

/// A user's selected fields for one category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preference {
    pub category: String,
    #[serde(default)]
    pub selected_fields: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct PreferencesResponse {
    #[serde(default)]
    pub preferences: Option<Preference>,
}

/// Schema-agnostic results of a cross-entity search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResults {
    #[serde(default)]
    pub all_fields: Vec<FieldDescriptor>,
    #[serde(default)]
    pub results: Vec<Record>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub next_page: Option<Cursor>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_page_decodes_camel_case() {
        let page: Page = serde_json::from_value(json!({
            "message": "Deals fetched successfully",
            "results": [{"id": "1", "dealname": "Renewal"}],
            "total": 42,
            "nextPage": "abc"
        }))
        .unwrap();

        assert_eq!(page.total, 42);
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.next_page, Some(Cursor::new("abc")));
        assert!(page.has_more());
    }

    #[test]
    fn test_page_null_cursor() {
        let page: Page = serde_json::from_value(json!({
            "message": "ok",
            "results": [],
            "total": 0,
            "nextPage": null
        }))
        .unwrap();

        assert!(!page.has_more());
    }

    #[test]
    fn test_empty_cursor_means_no_more_pages() {
        let page: Page = serde_json::from_value(json!({
            "message": "ok",
            "results": [],
            "total": 3,
            "nextPage": ""
        }))
        .unwrap();

        assert!(!page.has_more());
    }

    #[test]
    fn test_unknown_envelope_keys_kept() {
        let body = json!({
            "message": "Contacts fetched successfully",
            "results": [{"id": "101"}],
            "total": 1,
            "nextPage": null,
            "requestId": "req-7"
        });
        let page: Page = serde_json::from_value(body.clone()).unwrap();
        assert_eq!(page.extra.get("requestId"), Some(&json!("req-7")));
        assert_eq!(serde_json::to_value(&page).unwrap(), body);

        let export: ExportResponse = serde_json::from_value(json!({
            "message": "ok",
            "results": [],
            "total": 0,
            "exportedAt": 1720000000
        }))
        .unwrap();
        assert_eq!(export.extra.get("exportedAt"), Some(&json!(1720000000)));
    }

    #[test]
    fn test_numeric_cursor_kept_verbatim() {
        let page: Page = serde_json::from_value(json!({"nextPage": 1720}))
            .unwrap();
        assert_eq!(page.next_page.unwrap().as_str(), "1720");
    }

    #[test]
    fn test_cursor_serializes_as_string() {
        let value = serde_json::to_value(Cursor::new("p2")).unwrap();
        assert_eq!(value, json!("p2"));
    }

    #[test]
    fn test_preference_wire_names() {
        let pref = Preference {
            category: "contacts".into(),
            selected_fields: vec!["email".into(), "firstname".into()],
        };
        let value = serde_json::to_value(&pref).unwrap();
        assert_eq!(
            value,
            json!({"category": "contacts", "selectedFields": ["email", "firstname"]})
        );
    }

    #[test]
    fn test_search_results_decode() {
        let results: SearchResults = serde_json::from_value(json!({
            "allFields": [{"fieldKey": "name", "fieldLabel": "Name"}],
            "results": [{"id": 1, "name": "John Doe"}],
            "total": 1,
            "nextPage": null
        }))
        .unwrap();

        assert_eq!(results.all_fields, vec![FieldDescriptor::new("name", "Name")]);
        assert_eq!(results.total, 1);
    }
}
