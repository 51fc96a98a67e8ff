//! API route configuration.
//!
//! Callers are identified by the gateway-forwarded `X-User-Id` header (see
//! [`crate::api::middleware::identity`]); handlers that need an owner reject
//! requests without it.

use crate::api::handlers::{
    bulk_shorten_handler, dashboard_handler, delete_link_handler, export_analytics_handler,
    link_analytics_handler, link_details_handler, list_links_handler, shorten_handler,
    update_link_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// Link management routes, nested under `/api/urls`.
///
/// # Endpoints
///
/// - `POST   /shorten` - Create one short link (anonymous allowed)
/// - `POST   /bulk`    - Create up to 50 short links
/// - `GET    /`        - List the caller's links (paginated)
/// - `GET    /{code}`  - Link details
/// - `PUT    /{code}`  - Update title, tags, active flag, or expiry
/// - `DELETE /{code}`  - Delete a link and its clicks
pub fn url_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_links_handler))
        .route("/shorten", post(shorten_handler))
        .route("/bulk", post(bulk_shorten_handler))
        .route(
            "/{code}",
            get(link_details_handler)
                .put(update_link_handler)
                .delete(delete_link_handler),
        )
}

/// Analytics routes, nested under `/api/analytics`.
///
/// # Endpoints
///
/// - `GET /dashboard`      - Overview of the caller's links
/// - `GET /{code}`         - Click analytics for one link
/// - `GET /{code}/export`  - CSV download of every click
pub fn analytics_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_handler))
        .route("/{code}", get(link_analytics_handler))
        .route("/{code}/export", get(export_analytics_handler))
}
