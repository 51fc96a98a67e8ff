//! Repository trait for short link storage.

use crate::domain::entities::{LinkPatch, NewLink, OwnerSummary, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Persistent store of short links.
///
/// The store enforces uniqueness of `code`: a concurrent insert of an
/// existing code fails with [`AppError::DuplicateKey`] even if an earlier
/// [`LinkRepository::find_by_code`] reported it free.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL
/// - [`crate::infrastructure::persistence::MemoryStore`] - in-process, for tests and local runs
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new link.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateKey`] if the code already exists.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn insert(&self, new_link: NewLink) -> Result<ShortLink, AppError>;

    /// Finds a link by its exact, case-sensitive code.
    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Lists an owner's links, newest first.
    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError>;

    /// Returns an owner's links with the most clicks first.
    async fn top_by_clicks(&self, owner: &str, limit: i64) -> Result<Vec<ShortLink>, AppError>;

    /// Counts an owner's links and sums their click counters.
    async fn owner_summary(&self, owner: &str) -> Result<OwnerSummary, AppError>;

    /// Applies an owner edit.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    async fn update(&self, id: i64, patch: LinkPatch) -> Result<ShortLink, AppError>;

    /// Deletes a link and all of its clicks.
    ///
    /// Returns `Ok(false)` if the link did not exist.
    async fn delete(&self, id: i64) -> Result<bool, AppError>;

    /// Increments the click counter by one.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    async fn increment_clicks(&self, id: i64) -> Result<(), AppError>;

    /// Round-trips to the store; used by the health check.
    async fn ping(&self) -> Result<(), AppError>;
}
