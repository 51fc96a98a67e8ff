//! Handlers for owner link management (list, details, update, delete).

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use validator::Validate;

use crate::api::dto::links::{LinkListResponse, LinkResponse, UpdateLinkRequest};
use crate::api::dto::pagination::{PaginationInfo, PaginationParams};
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Lists the caller's links, newest first.
///
/// # Endpoint
///
/// `GET /api/urls?page=1&limit=20`
pub async fn list_links_handler(
    State(state): State<AppState>,
    identity: Identity,
    Query(params): Query<PaginationParams>,
) -> Result<Json<LinkListResponse>, AppError> {
    let (page, limit) = params.resolve()?;
    let result = state
        .link_service
        .list_for_owner(&identity, page, limit)
        .await?;

    let pages = result.pages();
    let items = result
        .items
        .into_iter()
        .map(|link| {
            let short_url = state.link_service.short_url(&link.code);
            LinkResponse::from_link(link, short_url)
        })
        .collect();

    Ok(Json(LinkListResponse {
        items,
        pagination: PaginationInfo {
            page: result.page,
            limit: result.limit,
            total: result.total,
            pages,
        },
    }))
}

/// `GET /api/urls/{code}`
pub async fn link_details_handler(
    State(state): State<AppState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<Json<LinkResponse>, AppError> {
    let link = state.link_service.details(&code, &identity).await?;
    let short_url = state.link_service.short_url(&link.code);
    Ok(Json(LinkResponse::from_link(link, short_url)))
}

/// Partially updates a link owned by the caller.
///
/// # Endpoint
///
/// `PUT /api/urls/{code}`
///
/// # Errors
///
/// - 400 if no fields are provided
/// - 403 if the caller does not own the link
/// - 404 if the code does not exist
pub async fn update_link_handler(
    State(state): State<AppState>,
    identity: Identity,
    Path(code): Path<String>,
    Json(payload): Json<UpdateLinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    payload.validate()?;

    let link = state
        .link_service
        .update(&code, &identity, payload.into())
        .await?;
    let short_url = state.link_service.short_url(&link.code);
    Ok(Json(LinkResponse::from_link(link, short_url)))
}

/// Deletes a link and its click history.
///
/// # Endpoint
///
/// `DELETE /api/urls/{code}`
///
/// Returns 204 No Content on success.
pub async fn delete_link_handler(
    State(state): State<AppState>,
    identity: Identity,
    Path(code): Path<String>,
) -> Result<StatusCode, AppError> {
    state.link_service.delete(&code, &identity).await?;
    Ok(StatusCode::NO_CONTENT)
}
