//! CRM Backend Client
//!
//! Thin REST client for the CRM backend.
//!
//! ## Architecture
//!
//! - **ApiClient**: authenticated GET/POST against the configured origin
//! - **EntityClient**: list / fields / export for one entity type
//! - **Preferences**: per-category field selection, token read from the store
//! - **Search**: dashboard stats and cross-entity search
//!
//! Every call logs failures with the operation that failed and returns the
//! error to the caller unchanged.

mod error;
mod http;
mod preferences;
mod resources;
mod search;
mod types;

pub use error::{ClientError, ClientResult};
pub use http::ApiClient;
pub use resources::{EntityClient, EntityKind, ListParams, DEFAULT_LIMIT};
pub use types::{
    Cursor, ExportResponse, FieldDescriptor, Page, Preference, Record, SearchResults,
};
