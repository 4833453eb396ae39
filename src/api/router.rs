//! Router Configuration
//!
//! Route configuration for the REST API.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::get,
};
use tower_http::trace::TraceLayer;

use crate::api::{handlers, state::AppState};

/// Create the main router with all routes mounted under `/api`.
pub fn create_router(state: AppState, max_body_bytes: usize) -> Router {
    let api = Router::new()
        .route(
            "/companies",
            get(handlers::companies::list_companies).post(handlers::companies::create_company),
        )
        .route(
            "/companies/{company_id}",
            get(handlers::companies::get_company)
                .put(handlers::companies::update_company)
                .delete(handlers::companies::delete_company),
        )
        .route(
            "/companies/{company_id}/documents",
            get(handlers::documents::list_documents).post(handlers::documents::upload_document),
        )
        .route(
            "/companies/{company_id}/documents/{document_id}",
            get(handlers::documents::get_document).delete(handlers::documents::delete_document),
        )
        .route(
            "/reports/entity-summary",
            get(handlers::reports::entity_summary),
        );

    Router::new()
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
