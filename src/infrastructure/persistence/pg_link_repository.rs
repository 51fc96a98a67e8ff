//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{LinkPatch, NewLink, OwnerSummary, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_code;

const LINK_COLUMNS: &str = "id, code, target_url, owner, title, tags, custom, active, \
                            click_count, created_at, expires_at";

#[derive(Debug, FromRow)]
struct LinkRow {
    id: i64,
    code: String,
    target_url: String,
    owner: Option<String>,
    title: Option<String>,
    tags: Vec<String>,
    custom: bool,
    active: bool,
    click_count: i64,
    created_at: DateTime<Utc>,
    expires_at: Option<DateTime<Utc>>,
}

impl From<LinkRow> for ShortLink {
    fn from(row: LinkRow) -> Self {
        Self {
            id: row.id,
            code: row.code,
            target_url: row.target_url,
            owner: row.owner,
            title: row.title,
            tags: row.tags,
            custom: row.custom,
            active: row.active,
            click_count: row.click_count,
            created_at: row.created_at,
            expires_at: row.expires_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct SummaryRow {
    total_links: i64,
    total_clicks: i64,
}

/// PostgreSQL repository for link storage and retrieval.
///
/// Code uniqueness is enforced by the `links_code_key` constraint; a
/// violating insert surfaces as [`AppError::DuplicateKey`].
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn link_not_found(id: i64) -> AppError {
        AppError::not_found("Short link not found", json!({ "id": id }))
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert(&self, new_link: NewLink) -> Result<ShortLink, AppError> {
        let sql = format!(
            "INSERT INTO links (code, target_url, owner, title, tags, custom, expires_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(&new_link.code)
            .bind(&new_link.target_url)
            .bind(&new_link.owner)
            .bind(&new_link.title)
            .bind(&new_link.tags)
            .bind(new_link.custom)
            .bind(new_link.expires_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation_on_code(&e) {
                    AppError::DuplicateKey {
                        code: new_link.code.clone(),
                    }
                } else {
                    e.into()
                }
            })?;

        Ok(row.into())
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE code = $1");

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(code)
            .fetch_optional(self.pool.as_ref())
            .await?;

        Ok(row.map(Into::into))
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(owner)
            .bind(limit)
            .bind(offset)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn top_by_clicks(&self, owner: &str, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links \
             WHERE owner = $1 \
             ORDER BY click_count DESC, created_at DESC \
             LIMIT $2"
        );

        let rows = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(owner)
            .bind(limit)
            .fetch_all(self.pool.as_ref())
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn owner_summary(&self, owner: &str) -> Result<OwnerSummary, AppError> {
        let row = sqlx::query_as::<_, SummaryRow>(
            r#"
            SELECT COUNT(*)::BIGINT AS total_links,
                   COALESCE(SUM(click_count), 0)::BIGINT AS total_clicks
            FROM links
            WHERE owner = $1
            "#,
        )
        .bind(owner)
        .fetch_one(self.pool.as_ref())
        .await?;

        Ok(OwnerSummary {
            total_links: row.total_links,
            total_clicks: row.total_clicks,
        })
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<ShortLink, AppError> {
        // Boolean flags distinguish "leave unchanged" from "set to NULL".
        let sql = format!(
            "UPDATE links SET \
                 title = CASE WHEN $2 THEN $3 ELSE title END, \
                 tags = COALESCE($4, tags), \
                 active = COALESCE($5, active), \
                 expires_at = CASE WHEN $6 THEN $7 ELSE expires_at END \
             WHERE id = $1 \
             RETURNING {LINK_COLUMNS}"
        );

        let row = sqlx::query_as::<_, LinkRow>(&sql)
            .bind(id)
            .bind(patch.title.is_some())
            .bind(patch.title.flatten())
            .bind(patch.tags)
            .bind(patch.active)
            .bind(patch.expires_at.is_some())
            .bind(patch.expires_at.flatten())
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Into::into).ok_or_else(|| Self::link_not_found(id))
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM links WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn increment_clicks(&self, id: i64) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE links SET click_count = click_count + 1 WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(Self::link_not_found(id));
        }
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
