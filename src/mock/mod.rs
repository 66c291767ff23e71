//! Mock CRM Backend
//!
//! In-memory implementation of the backend contract, built with Axum. Used
//! for local development (`crmdash-mock`) and for contract tests.
//!
//! # Endpoints
//!
//! ## Entities (contacts, companies, deals, products, quotes, payments, invoices, subscriptions)
//! - `GET /<entity>?limit=&nextPage=&search=` - One page of records
//! - `GET /<entity>/user/fields` - Field descriptors
//! - `GET /<entity>/all` - Every record
//!
//! ## Preferences
//! - `GET /preferences?category=<c>` - Saved field selection
//! - `POST /preferences` - Save a field selection
//!
//! ## Dashboard
//! - `GET /stats` - Record counts per entity
//! - `GET /dynamic-search?query=<q>` - Cross-entity search
//!
//! Every endpoint requires `Authorization: Bearer <token>`.

mod error;
mod fixtures;
mod routes;
mod state;

pub use error::{MockError, MockResult};
pub use state::{MockState, RecordedRequest};

use axum::{
    extract::{Query, Request, State},
    http::header,
    middleware::{self, Next},
    response::Response,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::client::EntityKind;

/// Bearer token of the current request, set by the auth middleware
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

/// Build the mock router with all routes and middleware
pub fn build_router(state: Arc<MockState>) -> Router {
    let mut router = Router::new()
        .route(
            "/preferences",
            get(routes::get_preferences).post(routes::save_preferences),
        )
        .route("/stats", get(routes::stats))
        .route("/dynamic-search", get(routes::dynamic_search));

    for kind in EntityKind::ALL {
        router = router
            .route(
                &kind.path(),
                get(
                    move |State(state): State<Arc<MockState>>,
                          Query(params): Query<routes::ListQuery>| async move {
                        routes::list_records(kind, state, params).await
                    },
                ),
            )
            .route(
                &format!("{}/user/fields", kind.path()),
                get(move |State(state): State<Arc<MockState>>| async move {
                    routes::list_fields(kind, state).await
                }),
            )
            .route(
                &format!("{}/all", kind.path()),
                get(move |State(state): State<Arc<MockState>>| async move {
                    routes::export_records(kind, state).await
                }),
            );
    }

    router
        .route_layer(middleware::from_fn_with_state(
            Arc::clone(&state),
            record_and_authorize,
        ))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Record the request if enabled, then require a bearer token the backend accepts
async fn record_and_authorize(
    State(state): State<Arc<MockState>>,
    mut request: Request,
    next: Next,
) -> MockResult<Response> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if state.is_recording() {
        let query: Vec<(String, String)> = request
            .uri()
            .query()
            .map(|q| {
                url::form_urlencoded::parse(q.as_bytes())
                    .into_owned()
                    .collect()
            })
            .unwrap_or_default();

        state.record_request(RecordedRequest {
            method: request.method().to_string(),
            path: request.uri().path().to_string(),
            query,
            authorization: authorization.clone(),
        });
    }

    let token = authorization
        .as_deref()
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .ok_or_else(|| MockError::Unauthorized("missing bearer token".to_string()))?;

    if !state.accepts(token) {
        return Err(MockError::Unauthorized("invalid token".to_string()));
    }

    request
        .extensions_mut()
        .insert(BearerToken(token.to_string()));

    Ok(next.run(request).await)
}

/// Bind `addr` and serve until Ctrl+C / SIGTERM
pub async fn serve(state: Arc<MockState>, addr: &str) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Mock CRM backend listening on {}", listener.local_addr()?);

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Mock CRM backend shut down gracefully");
    Ok(())
}

/// Serve on an ephemeral localhost port in the background
pub async fn spawn(state: Arc<MockState>) -> std::io::Result<(SocketAddr, JoinHandle<()>)> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let router = build_router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, router).await {
            tracing::error!(error = %e, "Mock CRM backend stopped");
        }
    });

    Ok((addr, handle))
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
