//! Handlers for link shortening endpoints.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::links::LinkResponse;
use crate::api::dto::shorten::{
    BatchSummary, BulkShortenRequest, BulkShortenResponse, ShortenRequest, ShortenResultItem,
};
use crate::domain::entities::Identity;
use crate::error::AppError;
use crate::state::AppState;

/// Creates one short link.
///
/// # Endpoint
///
/// `POST /api/urls/shorten`
///
/// Anonymous callers may shorten; with an `X-User-Id` header the link is
/// owned by that user.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/page",
///   "custom_alias": "my-link",            // optional
///   "title": "Landing page",               // optional
///   "tags": ["marketing"],                 // optional
///   "expires_at": "2030-01-01T00:00:00Z"   // optional
/// }
/// ```
///
/// # Errors
///
/// - 400 for an invalid URL, alias, or past expiry
/// - 409 if the alias is taken
/// - 503 with `Retry-After` if no free code was found
pub async fn shorten_handler(
    State(state): State<AppState>,
    identity: Option<Identity>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<LinkResponse>), AppError> {
    payload.validate()?;

    let owner = identity.map(|i| i.user_id);
    let link = state.link_service.shorten(payload.into_input(owner)).await?;
    let short_url = state.link_service.short_url(&link.code);

    Ok((
        StatusCode::CREATED,
        Json(LinkResponse::from_link(link, short_url)),
    ))
}

/// Creates short links for up to 50 URLs.
///
/// # Endpoint
///
/// `POST /api/urls/bulk`
///
/// Processes URLs independently. If one fails, others continue processing.
/// Each result includes either success data or error information.
pub async fn bulk_shorten_handler(
    State(state): State<AppState>,
    identity: Identity,
    Json(payload): Json<BulkShortenRequest>,
) -> Result<Json<BulkShortenResponse>, AppError> {
    payload.validate()?;

    let total = payload.urls.len();
    let outcome = state
        .link_service
        .bulk_shorten(&identity, payload.urls)
        .await?;

    let successful = outcome.successful.len();
    let failed = outcome.failed.len();

    let mut items = Vec::with_capacity(total);
    items.extend(outcome.successful.into_iter().map(|link| {
        let short_url = state.link_service.short_url(&link.code);
        ShortenResultItem::Success {
            long_url: link.target_url,
            code: link.code,
            short_url,
        }
    }));
    items.extend(
        outcome
            .failed
            .into_iter()
            .map(|failure| ShortenResultItem::Error {
                long_url: failure.url,
                error: failure.error.to_error_info(),
            }),
    );

    Ok(Json(BulkShortenResponse {
        summary: BatchSummary {
            total,
            successful,
            failed,
        },
        items,
    }))
}
