//! PostgreSQL implementation of statistics repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use std::sync::Arc;

use crate::domain::entities::{Click, DeviceClass, NewClick};
use crate::domain::repositories::StatsRepository;
use crate::error::AppError;
use crate::utils::db_error::is_missing_link_reference;

#[derive(Debug, FromRow)]
struct ClickRow {
    id: i64,
    link_id: i64,
    clicked_at: DateTime<Utc>,
    ip: String,
    user_agent: String,
    referrer: String,
    country: String,
    city: String,
    device: String,
    browser: String,
    os: String,
}

impl From<ClickRow> for Click {
    fn from(row: ClickRow) -> Self {
        Self {
            id: row.id,
            link_id: row.link_id,
            clicked_at: row.clicked_at,
            ip: row.ip,
            user_agent: row.user_agent,
            referrer: row.referrer,
            country: row.country,
            city: row.city,
            device: DeviceClass::parse(&row.device),
            browser: row.browser,
            os: row.os,
        }
    }
}

/// PostgreSQL repository for click records.
pub struct PgStatsRepository {
    pool: Arc<PgPool>,
}

impl PgStatsRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StatsRepository for PgStatsRepository {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let row = sqlx::query_as::<_, ClickRow>(
            r#"
            INSERT INTO link_clicks
                (link_id, clicked_at, ip, user_agent, referrer, country, city, device, browser, os)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, link_id, clicked_at, ip, user_agent, referrer,
                      country, city, device, browser, os
            "#,
        )
        .bind(new_click.link_id)
        .bind(new_click.clicked_at)
        .bind(&new_click.ip)
        .bind(&new_click.user_agent)
        .bind(&new_click.referrer)
        .bind(&new_click.country)
        .bind(&new_click.city)
        .bind(new_click.device.as_str())
        .bind(&new_click.browser)
        .bind(&new_click.os)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_missing_link_reference(&e) {
                AppError::not_found("Link not found", json!({ "link_id": new_click.link_id }))
            } else {
                e.into()
            }
        })?;

        Ok(row.into())
    }

    async fn clicks_for_link(
        &self,
        link_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT id, link_id, clicked_at, ip, user_agent, referrer,
                   country, city, device, browser, os
            FROM link_clicks
            WHERE link_id = $1
              AND ($2::timestamptz IS NULL OR clicked_at >= $2)
            ORDER BY clicked_at DESC, id DESC
            "#,
        )
        .bind(link_id)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn clicks_for_owner(
        &self,
        owner: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        let rows = sqlx::query_as::<_, ClickRow>(
            r#"
            SELECT c.id, c.link_id, c.clicked_at, c.ip, c.user_agent, c.referrer,
                   c.country, c.city, c.device, c.browser, c.os
            FROM link_clicks c
            JOIN links l ON l.id = c.link_id
            WHERE l.owner = $1
              AND ($2::timestamptz IS NULL OR c.clicked_at >= $2)
            ORDER BY c.clicked_at DESC, c.id DESC
            "#,
        )
        .bind(owner)
        .bind(since)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
