//! Link creation, lookup, and owner management.

use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::application::services::code_allocator::CodeAllocator;
use crate::domain::entities::{Identity, LinkPatch, NewLink, OwnerSummary, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::code_generator::validate_custom_alias;
use crate::utils::url_normalizer::normalize_target_url;

/// Aliases that would shadow fixed routes.
const RESERVED_ALIASES: &[&str] = &["api", "health"];

/// Inserts attempted for a generated code when the store reports a race.
const MAX_INSERT_ATTEMPTS: u32 = 3;

/// Maximum URLs accepted by [`LinkService::bulk_shorten`].
pub const MAX_BULK_URLS: usize = 50;

/// A shorten request after HTTP decoding.
#[derive(Debug, Clone, Default)]
pub struct ShortenInput {
    pub target_url: String,
    pub custom_alias: Option<String>,
    pub owner: Option<String>,
    pub title: Option<String>,
    pub tags: Vec<String>,
    pub expires_at: Option<chrono::DateTime<Utc>>,
}

impl ShortenInput {
    pub fn new(target_url: impl Into<String>) -> Self {
        Self {
            target_url: target_url.into(),
            ..Default::default()
        }
    }
}

/// One failed entry of a bulk request.
#[derive(Debug)]
pub struct BulkFailure {
    pub url: String,
    pub error: AppError,
}

/// Result of [`LinkService::bulk_shorten`].
#[derive(Debug, Default)]
pub struct BulkOutcome {
    pub successful: Vec<ShortLink>,
    pub failed: Vec<BulkFailure>,
}

/// A page of an owner's links.
#[derive(Debug, Clone)]
pub struct LinkPage {
    pub items: Vec<ShortLink>,
    pub page: u32,
    pub limit: u32,
    pub total: i64,
}

impl LinkPage {
    pub fn pages(&self) -> i64 {
        let limit = i64::from(self.limit.max(1));
        (self.total + limit - 1) / limit
    }
}

/// Service for creating and managing short links.
///
/// Generated codes come from the [`CodeAllocator`]; custom aliases are
/// validated and pre-checked here. Either way the final insert may still hit
/// the store's unique constraint.
pub struct LinkService<L: LinkRepository + ?Sized> {
    links: Arc<L>,
    allocator: CodeAllocator<L>,
    base_url: String,
}

impl<L: LinkRepository + ?Sized> LinkService<L> {
    /// Creates a new link service.
    ///
    /// `base_url` is the public address short codes are appended to.
    pub fn new(links: Arc<L>, allocator: CodeAllocator<L>, base_url: impl Into<String>) -> Self {
        Self {
            links,
            allocator,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a short link.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] for a malformed target or an expiry in the past
    /// - [`AppError::InvalidAlias`] for a custom alias with disallowed characters
    /// - [`AppError::AliasTaken`] if the custom alias exists
    /// - [`AppError::CodeExhausted`] if no free generated code was found
    pub async fn shorten(&self, input: ShortenInput) -> Result<ShortLink, AppError> {
        let target_url = normalize_target_url(&input.target_url).map_err(|e| {
            AppError::bad_request("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        if let Some(expires_at) = input.expires_at
            && expires_at <= Utc::now()
        {
            return Err(AppError::bad_request(
                "Expiry must be in the future",
                json!({ "expires_at": expires_at }),
            ));
        }

        let draft = NewLink {
            code: String::new(),
            target_url,
            owner: input.owner,
            title: input.title,
            tags: input.tags,
            custom: input.custom_alias.is_some(),
            expires_at: input.expires_at,
        };

        let link = match input.custom_alias {
            Some(alias) => self.insert_with_alias(alias, draft).await?,
            None => self.insert_with_generated_code(draft).await?,
        };

        info!(code = %link.code, custom = link.custom, "Short link created");
        Ok(link)
    }

    async fn insert_with_alias(&self, alias: String, draft: NewLink) -> Result<ShortLink, AppError> {
        validate_custom_alias(&alias)?;

        if RESERVED_ALIASES.contains(&alias.to_ascii_lowercase().as_str()) {
            return Err(AppError::invalid_alias(alias, "alias is reserved"));
        }

        if self.links.find_by_code(&alias).await?.is_some() {
            return Err(AppError::AliasTaken { alias });
        }

        let new_link = NewLink {
            code: alias.clone(),
            ..draft
        };

        match self.links.insert(new_link).await {
            Err(AppError::DuplicateKey { .. }) => Err(AppError::AliasTaken { alias }),
            other => other,
        }
    }

    async fn insert_with_generated_code(&self, draft: NewLink) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_INSERT_ATTEMPTS {
            let code = self.allocator.allocate().await?;
            let new_link = NewLink {
                code,
                ..draft.clone()
            };

            match self.links.insert(new_link).await {
                Err(AppError::DuplicateKey { code }) => {
                    debug!(%code, attempt, "Insert lost a race on generated code");
                }
                other => return other,
            }
        }

        warn!(
            attempts = MAX_INSERT_ATTEMPTS,
            "Generated codes kept colliding on insert"
        );
        Err(AppError::CodeExhausted {
            attempts: MAX_INSERT_ATTEMPTS,
        })
    }

    /// Shortens up to [`MAX_BULK_URLS`] URLs for one owner.
    ///
    /// Entries are processed independently; one failure does not stop the rest.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an empty or oversized batch.
    pub async fn bulk_shorten(
        &self,
        owner: &Identity,
        urls: Vec<String>,
    ) -> Result<BulkOutcome, AppError> {
        if urls.is_empty() || urls.len() > MAX_BULK_URLS {
            return Err(AppError::bad_request(
                format!("Provide between 1 and {MAX_BULK_URLS} URLs"),
                json!({ "provided": urls.len() }),
            ));
        }

        let mut outcome = BulkOutcome::default();
        for url in urls {
            let input = ShortenInput {
                owner: Some(owner.user_id.clone()),
                ..ShortenInput::new(url.clone())
            };

            match self.shorten(input).await {
                Ok(link) => outcome.successful.push(link),
                Err(error) => outcome.failed.push(BulkFailure { url, error }),
            }
        }

        Ok(outcome)
    }

    /// Lists the caller's links, newest first.
    pub async fn list_for_owner(
        &self,
        owner: &Identity,
        page: u32,
        limit: u32,
    ) -> Result<LinkPage, AppError> {
        let offset = i64::from(page.saturating_sub(1)) * i64::from(limit);
        let items = self
            .links
            .list_by_owner(&owner.user_id, offset, i64::from(limit))
            .await?;
        let OwnerSummary { total_links, .. } = self.links.owner_summary(&owner.user_id).await?;

        Ok(LinkPage {
            items,
            page,
            limit,
            total: total_links,
        })
    }

    /// Returns a link the caller may see.
    ///
    /// Links without an owner are visible to everyone.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] if absent, [`AppError::Forbidden`] if owned by someone else.
    pub async fn details(&self, code: &str, requester: &Identity) -> Result<ShortLink, AppError> {
        let link = self.get_by_code(code).await?;

        match &link.owner {
            Some(owner) if owner != &requester.user_id && !requester.is_admin() => Err(
                AppError::forbidden("Not authorized to access this link", json!({ "code": code })),
            ),
            _ => Ok(link),
        }
    }

    /// Applies an owner edit.
    ///
    /// # Errors
    ///
    /// [`AppError::Forbidden`] unless the caller owns the link;
    /// [`AppError::Validation`] for an empty patch.
    pub async fn update(
        &self,
        code: &str,
        requester: &Identity,
        patch: LinkPatch,
    ) -> Result<ShortLink, AppError> {
        if patch.is_empty() {
            return Err(AppError::bad_request("No fields to update", json!({})));
        }

        let link = self.owned_link(code, requester, "update").await?;
        self.links.update(link.id, patch).await
    }

    /// Deletes a link and its click history.
    pub async fn delete(&self, code: &str, requester: &Identity) -> Result<(), AppError> {
        let link = self.owned_link(code, requester, "delete").await?;

        if !self.links.delete(link.id).await? {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "code": code }),
            ));
        }

        info!(%code, "Short link deleted");
        Ok(())
    }

    /// Looks up a link for redirecting.
    ///
    /// # Errors
    ///
    /// [`AppError::NotFound`] if absent, [`AppError::Gone`] if deactivated or expired.
    pub async fn resolve(&self, code: &str) -> Result<ShortLink, AppError> {
        let link = self.get_by_code(code).await?;

        if !link.active {
            return Err(AppError::gone(
                "This link has been deactivated",
                json!({ "code": code }),
            ));
        }
        if link.is_expired() {
            return Err(AppError::gone(
                "This link has expired",
                json!({ "code": code, "expires_at": link.expires_at }),
            ));
        }

        Ok(link)
    }

    /// Returns the link with this code regardless of owner.
    pub async fn get_by_code(&self, code: &str) -> Result<ShortLink, AppError> {
        self.links
            .find_by_code(code)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "code": code })))
    }

    /// Full public URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Checks that the underlying store is reachable.
    pub async fn ping(&self) -> Result<(), AppError> {
        self.links.ping().await
    }

    async fn owned_link(
        &self,
        code: &str,
        requester: &Identity,
        action: &str,
    ) -> Result<ShortLink, AppError> {
        let link = self.get_by_code(code).await?;

        if !link.is_owned_by(&requester.user_id) {
            return Err(AppError::forbidden(
                format!("Not authorized to {action} this link"),
                json!({ "code": code }),
            ));
        }

        Ok(link)
    }
}
