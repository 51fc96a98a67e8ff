//! Caller identity forwarded by the authenticating gateway.
//!
//! The service does not authenticate on its own. A trusted gateway in front
//! of it verifies the caller and forwards:
//!
//! ```text
//! X-User-Id: <opaque user id>
//! X-User-Role: admin        (optional)
//! ```
//!
//! Handlers take [`Identity`] to require a caller, or `Option<Identity>`
//! when anonymous use is allowed.

use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::domain::entities::{Identity, Role};
use crate::error::AppError;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_ROLE_HEADER: &str = "x-user-role";

const MAX_USER_ID_LEN: usize = 128;

/// Reads the identity headers.
///
/// Returns `Ok(None)` when no user id is present.
///
/// # Errors
///
/// Returns [`AppError::Unauthorized`] for a blank, oversized, or non-ASCII user id.
pub fn identity_from_headers(headers: &HeaderMap) -> Result<Option<Identity>, AppError> {
    let Some(raw) = headers.get(USER_ID_HEADER) else {
        return Ok(None);
    };

    let user_id = raw
        .to_str()
        .map(str::trim)
        .map_err(|_| AppError::unauthorized("Invalid user id header"))?;

    if user_id.is_empty() || user_id.len() > MAX_USER_ID_LEN {
        return Err(AppError::unauthorized("Invalid user id header"));
    }

    let role = match headers.get(USER_ROLE_HEADER).and_then(|v| v.to_str().ok()) {
        Some(r) if r.trim().eq_ignore_ascii_case("admin") => Role::Admin,
        _ => Role::User,
    };

    Ok(Some(Identity {
        user_id: user_id.to_string(),
        role,
    }))
}

impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        identity_from_headers(&parts.headers)?
            .ok_or_else(|| AppError::unauthorized("Authentication required"))
    }
}

impl<S> OptionalFromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> Result<Option<Self>, Self::Rejection> {
        identity_from_headers(&parts.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &'static str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_static(value));
        }
        map
    }

    #[test]
    fn test_no_header_is_anonymous() {
        assert_eq!(identity_from_headers(&HeaderMap::new()).unwrap(), None);
    }

    #[test]
    fn test_user_and_admin_roles() {
        let user = identity_from_headers(&headers(&[(USER_ID_HEADER, "alice")]))
            .unwrap()
            .unwrap();
        assert_eq!(user, Identity::user("alice"));

        let admin = identity_from_headers(&headers(&[
            (USER_ID_HEADER, "ops"),
            (USER_ROLE_HEADER, "Admin"),
        ]))
        .unwrap()
        .unwrap();
        assert!(admin.is_admin());
    }

    #[test]
    fn test_blank_user_id_is_rejected() {
        let result = identity_from_headers(&headers(&[(USER_ID_HEADER, "   ")]));
        assert!(matches!(result, Err(AppError::Unauthorized { .. })));
    }
}
