//! HTTP API server for the marketplace workflows.
//!
//! Exposes one endpoint per transactional workflow, with structured logging
//! (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get, patch, post};
use document_store::DocumentStore;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use workflows::{InMemoryPaymentGateway, Workflows};

/// Shared application state accessible from all handlers.
pub struct AppState<S> {
    pub workflows: Workflows<S, InMemoryPaymentGateway>,
}

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<S>(state: Arc<AppState<S>>, metrics_handle: PrometheusHandle) -> Router
where
    S: DocumentStore + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    Router::new()
        .route("/health", get(routes::health::check))
        .route("/orders", post(routes::orders::place::<S>))
        .route("/payments", post(routes::orders::record_payment::<S>))
        .route("/payments/intent", post(routes::orders::payment_intent::<S>))
        .route(
            "/shops/{id}/follow",
            post(routes::catalog::follow::<S>).delete(routes::catalog::unfollow::<S>),
        )
        .route("/shops/{id}", delete(routes::catalog::delete_shop::<S>))
        .route(
            "/shops/{id}/blacklist",
            patch(routes::catalog::toggle_blacklist::<S>),
        )
        .route(
            "/categories/{id}",
            delete(routes::catalog::delete_category::<S>),
        )
        .route("/users/{id}", delete(routes::users::delete::<S>))
        .with_state(state)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

/// Creates the application state around a store and the in-memory payment gateway.
pub fn create_default_state<S: DocumentStore>(store: S) -> Arc<AppState<S>> {
    Arc::new(AppState {
        workflows: Workflows::new(store, InMemoryPaymentGateway::new()),
    })
}
