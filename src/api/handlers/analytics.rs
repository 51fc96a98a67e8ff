//! Handlers for click analytics endpoints.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::api::dto::analytics::{AnalyticsQuery, DashboardResponse, LinkAnalyticsResponse};
use crate::api::dto::links::LinkResponse;
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click analytics for one link.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}?days=30`
///
/// `days` must be between 1 and 365. Only the owner or an admin may read it.
pub async fn link_analytics_handler(
    State(state): State<AppState>,
    identity: Identity,
    Path(code): Path<String>,
    Query(query): Query<AnalyticsQuery>,
) -> Result<Json<LinkAnalyticsResponse>, AppError> {
    let analytics = state
        .stats_service
        .link_analytics(&code, &identity, query.days())
        .await?;

    let short_url = state.link_service.short_url(&analytics.link.code);
    let link = LinkResponse::from_link(analytics.link, short_url);

    Ok(Json(LinkAnalyticsResponse::new(
        link,
        analytics.days,
        analytics.summary,
    )))
}

/// Downloads every click of a link as CSV.
///
/// # Endpoint
///
/// `GET /api/analytics/{code}/export`
///
/// # Errors
///
/// Returns 404 if the link has no clicks.
pub async fn export_analytics_handler(
    State(state): State<AppState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Response, AppError> {
    let export = state.stats_service.export_csv(&code, &identity).await?;

    let disposition = HeaderValue::from_str(&format!(
        "attachment; filename=\"{}\"",
        export.file_name
    ))
    .map_err(|_| AppError::internal("Invalid export file name", json!({ "code": code })))?;

    Ok((
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/csv; charset=utf-8"),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        export.body,
    )
        .into_response())
}

/// Overview of the caller's links.
///
/// # Endpoint
///
/// `GET /api/analytics/dashboard`
pub async fn dashboard_handler(
    State(state): State<AppState>,
    identity: Identity,
) -> Result<Json<DashboardResponse>, AppError> {
    let dashboard = state.stats_service.dashboard(&identity).await?;

    let top_links = dashboard
        .top_links
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(DashboardResponse {
        total_links: dashboard.total_links,
        total_clicks: dashboard.total_clicks,
        clicks_last_30_days: dashboard.clicks_last_30_days,
        top_links,
        clicks_by_date: dashboard.clicks_by_date.into_iter().map(Into::into).collect(),
    }))
}
