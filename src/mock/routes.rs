//! Mock Backend Handlers
//!
//! Cursors are stringified offsets into the record list. Search is a
//! case-insensitive substring match over every scalar value of a record.

use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::error::{MockError, MockResult};
use super::state::MockState;
use super::BearerToken;
use crate::client::{EntityKind, ExportResponse, FieldDescriptor, Page, Preference, Record};

/// Largest page the mock serves
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub limit: Option<usize>,
    #[serde(rename = "nextPage")]
    pub next_page: Option<String>,
    pub search: Option<String>,
}

/// GET /<entity>
pub async fn list_records(
    kind: EntityKind,
    state: Arc<MockState>,
    params: ListQuery,
) -> MockResult<Json<Page>> {
    let limit = params.limit.unwrap_or(10).clamp(1, MAX_LIMIT);

    let offset = match params.next_page.as_deref() {
        None | Some("") => 0,
        Some(cursor) => cursor
            .parse::<usize>()
            .map_err(|_| MockError::Validation(format!("Invalid nextPage cursor: {}", cursor)))?,
    };

    let search = params
        .search
        .filter(|s| kind.supports_search() && !s.is_empty());

    let matching: Vec<&Record> = state
        .records(kind)
        .iter()
        .filter(|r| search.as_deref().map_or(true, |s| matches_search(r, s)))
        .collect();

    let total = matching.len();
    let results: Vec<Record> = matching
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect();

    let end = offset + results.len();
    let next_page = (end < total).then(|| end.to_string().into());

    Ok(Json(Page {
        message: format!("{} fetched successfully", title(kind)),
        results,
        total: total as u64,
        next_page,
        extra: Default::default(),
    }))
}

/// GET /<entity>/user/fields
pub async fn list_fields(kind: EntityKind, state: Arc<MockState>) -> Json<Value> {
    Json(json!({ "fields": state.fields(kind) }))
}

/// GET /<entity>/all
pub async fn export_records(kind: EntityKind, state: Arc<MockState>) -> Json<ExportResponse> {
    let results = state.records(kind).to_vec();
    Json(ExportResponse {
        message: format!("All {} fetched successfully", kind),
        total: results.len() as u64,
        results,
        extra: Default::default(),
    })
}

#[derive(Debug, Deserialize)]
pub struct PreferencesQuery {
    pub category: Option<String>,
}

/// GET /preferences?category=<c>
pub async fn get_preferences(
    State(state): State<Arc<MockState>>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Query(params): Query<PreferencesQuery>,
) -> MockResult<Json<Value>> {
    let category = params
        .category
        .filter(|c| !c.is_empty())
        .ok_or_else(|| MockError::Validation("category is required".to_string()))?;

    let preferences = state.preferences.read().await;
    let preference = preferences
        .get(&(token, category.clone()))
        .map(|selected_fields| Preference {
            category,
            selected_fields: selected_fields.clone(),
        });

    Ok(Json(json!({ "preferences": preference })))
}

/// POST /preferences
pub async fn save_preferences(
    State(state): State<Arc<MockState>>,
    Extension(BearerToken(token)): Extension<BearerToken>,
    Json(preference): Json<Preference>,
) -> MockResult<Json<Value>> {
    if preference.category.is_empty() {
        return Err(MockError::Validation("category is required".to_string()));
    }

    state.preferences.write().await.insert(
        (token, preference.category.clone()),
        preference.selected_fields.clone(),
    );

    tracing::debug!(category = %preference.category, "Preferences saved");

    Ok(Json(json!({
        "message": "Preferences saved successfully",
        "preferences": preference,
    })))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub query: String,
}

/// GET /dynamic-search?query=<q>
pub async fn dynamic_search(
    State(state): State<Arc<MockState>>,
    Query(params): Query<SearchQuery>,
) -> Json<Value> {
    let term = params.query.trim();

    let mut all_fields: Vec<FieldDescriptor> = Vec::new();
    let mut results: Vec<Record> = Vec::new();

    if !term.is_empty() {
        for kind in EntityKind::ALL {
            let hits: Vec<&Record> = state
                .records(kind)
                .iter()
                .filter(|r| matches_search(r, term))
                .collect();

            if hits.is_empty() {
                continue;
            }

            for field in state.fields(kind) {
                if !all_fields.iter().any(|f| f.field_key == field.field_key) {
                    all_fields.push(field.clone());
                }
            }

            results.extend(hits.into_iter().map(|r| {
                let mut record = r.clone();
                record.insert("objectType".to_string(), Value::String(kind.to_string()));
                record
            }));
        }
    }

    Json(json!({
        "allFields": all_fields,
        "total": results.len(),
        "results": results,
        "nextPage": Value::Null,
    }))
}

/// GET /stats
pub async fn stats(State(state): State<Arc<MockState>>) -> Json<Value> {
    let totals: serde_json::Map<String, Value> = EntityKind::ALL
        .into_iter()
        .map(|kind| (kind.to_string(), json!(state.records(kind).len())))
        .collect();

    Json(json!({
        "message": "Stats fetched successfully",
        "totals": totals,
    }))
}

fn matches_search(record: &Record, term: &str) -> bool {
    let needle = term.to_lowercase();
    record.values().any(|value| match value {
        Value::String(s) => s.to_lowercase().contains(&needle),
        Value::Number(n) => n.to_string().contains(&needle),
        _ => false,
    })
}

fn title(kind: EntityKind) -> String {
    let name = kind.as_str();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_search_case_insensitive() {
        let record = json!({"firstname": "John", "age": 42, "vip": true})
            .as_object()
            .cloned()
            .unwrap();

        assert!(matches_search(&record, "joh"));
        assert!(matches_search(&record, "JOHN"));
        assert!(matches_search(&record, "42"));
        assert!(!matches_search(&record, "true"));
        assert!(!matches_search(&record, "jane"));
    }

    #[test]
    fn test_title() {
        assert_eq!(title(EntityKind::Deals), "Deals");
        assert_eq!(title(EntityKind::Subscriptions), "Subscriptions");
    }
}
