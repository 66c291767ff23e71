//! # crmdash
//!
//! Client side of a CRM dashboard: an authenticated REST client for the CRM
//! backend, the route guard deciding which views a visitor may open, and the
//! bulk export pipeline.
//!
//! ## Modules
//!
//! - [`client`]: HTTP client and per-entity resource calls
//! - [`session`]: Token persistence and login callback handling
//! - [`navigation`]: Route table and authentication guard
//! - [`export`]: CSV / JSON / NDJSON rendering of fetched records
//! - [`mock`]: In-memory backend for development and contract tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use crmdash::client::{ApiClient, ListParams};
//! use crmdash::session::{FileTokenStore, Session};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api = ApiClient::with_base_url("http://localhost:3000")?;
//!     let store = FileTokenStore::new("storage.json");
//!
//!     let session = Session::from_store(&store)?.ok_or("not logged in")?;
//!
//!     // First page of contacts matching "john"
//!     let page = api
//!         .contacts()
//!         .list(&session, &ListParams::default().limit(20).search("john"))
//!         .await?;
//!
//!     println!("{} of {} contacts", page.results.len(), page.total);
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod export;
pub mod logging;
pub mod mock;
pub mod navigation;
pub mod session;

// Re-export top-level types for convenience
pub use client::{
    ApiClient, ClientError, ClientResult, Cursor, EntityClient, EntityKind, ExportResponse,
    FieldDescriptor, ListParams, Page, Preference, Record, SearchResults,
};

pub use config::{Config, ConfigError, LogFormat, LoggingConfig};

pub use export::{ExportError, ExportFormat};

pub use navigation::{guard, navigate, GuardDecision, Navigation, Route, RouteMeta, View};

pub use session::{FileTokenStore, MemoryTokenStore, Session, StoreError, TokenStore};

pub use mock::{MockError, MockState};
