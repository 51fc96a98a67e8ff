//! In-process link and click store.
//!
//! Backs local runs without PostgreSQL (`STORAGE=memory`) and the HTTP
//! integration tests. Behaves like the SQL store: codes are unique and
//! case-sensitive, and deleting a link removes its clicks.

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::RwLock;

use crate::domain::entities::{Click, LinkPatch, NewClick, NewLink, OwnerSummary, ShortLink};
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::error::AppError;

#[derive(Default)]
struct Inner {
    links: BTreeMap<i64, ShortLink>,
    codes: HashMap<String, i64>,
    clicks: Vec<Click>,
    next_link_id: i64,
    next_click_id: i64,
}

impl Inner {
    fn link_mut(&mut self, id: i64) -> Result<&mut ShortLink, AppError> {
        self.links
            .get_mut(&id)
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))
    }
}

/// Both repositories over one lock.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn newest_first(clicks: &mut [Click]) {
    clicks.sort_by(|a, b| b.clicked_at.cmp(&a.clicked_at).then(b.id.cmp(&a.id)));
}

#[async_trait]
impl LinkRepository for MemoryStore {
    async fn insert(&self, new_link: NewLink) -> Result<ShortLink, AppError> {
        let mut inner = self.inner.write().await;

        if inner.codes.contains_key(&new_link.code) {
            return Err(AppError::DuplicateKey {
                code: new_link.code,
            });
        }

        inner.next_link_id += 1;
        let id = inner.next_link_id;
        let link = ShortLink::from_new(id, new_link, Utc::now());

        inner.codes.insert(link.code.clone(), id);
        inner.links.insert(id, link.clone());
        Ok(link)
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<ShortLink>, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .codes
            .get(code)
            .and_then(|id| inner.links.get(id))
            .cloned())
    }

    async fn list_by_owner(
        &self,
        owner: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<ShortLink>, AppError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&ShortLink> = inner
            .links
            .values()
            .filter(|l| l.is_owned_by(owner))
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(owned
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(0))
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn top_by_clicks(&self, owner: &str, limit: i64) -> Result<Vec<ShortLink>, AppError> {
        let inner = self.inner.read().await;
        let mut owned: Vec<&ShortLink> = inner
            .links
            .values()
            .filter(|l| l.is_owned_by(owner))
            .collect();
        owned.sort_by(|a, b| {
            b.click_count
                .cmp(&a.click_count)
                .then(b.created_at.cmp(&a.created_at))
        });

        Ok(owned
            .into_iter()
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }

    async fn owner_summary(&self, owner: &str) -> Result<OwnerSummary, AppError> {
        let inner = self.inner.read().await;
        Ok(inner
            .links
            .values()
            .filter(|l| l.is_owned_by(owner))
            .fold(OwnerSummary::default(), |mut acc, l| {
                acc.total_links += 1;
                acc.total_clicks += l.click_count;
                acc
            }))
    }

    async fn update(&self, id: i64, patch: LinkPatch) -> Result<ShortLink, AppError> {
        let mut inner = self.inner.write().await;
        let link = inner.link_mut(id)?;
        patch.apply_to(link);
        Ok(link.clone())
    }

    async fn delete(&self, id: i64) -> Result<bool, AppError> {
        let mut inner = self.inner.write().await;

        let Some(link) = inner.links.remove(&id) else {
            return Ok(false);
        };
        inner.codes.remove(&link.code);
        inner.clicks.retain(|c| c.link_id != id);
        Ok(true)
    }

    async fn increment_clicks(&self, id: i64) -> Result<(), AppError> {
        let mut inner = self.inner.write().await;
        inner.link_mut(id)?.click_count += 1;
        Ok(())
    }

    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}

#[async_trait]
impl StatsRepository for MemoryStore {
    async fn record_click(&self, new_click: NewClick) -> Result<Click, AppError> {
        let mut inner = self.inner.write().await;

        if !inner.links.contains_key(&new_click.link_id) {
            return Err(AppError::not_found(
                "Link not found",
                json!({ "link_id": new_click.link_id }),
            ));
        }

        inner.next_click_id += 1;
        let click = Click::from_new(inner.next_click_id, new_click);
        inner.clicks.push(click.clone());
        Ok(click)
    }

    async fn clicks_for_link(
        &self,
        link_id: i64,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        let inner = self.inner.read().await;
        let mut clicks: Vec<Click> = inner
            .clicks
            .iter()
            .filter(|c| c.link_id == link_id)
            .filter(|c| since.is_none_or(|s| c.clicked_at >= s))
            .cloned()
            .collect();
        newest_first(&mut clicks);
        Ok(clicks)
    }

    async fn clicks_for_owner(
        &self,
        owner: &str,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<Click>, AppError> {
        let inner = self.inner.read().await;
        let mut clicks: Vec<Click> = inner
            .clicks
            .iter()
            .filter(|c| {
                inner
                    .links
                    .get(&c.link_id)
                    .is_some_and(|l| l.is_owned_by(owner))
            })
            .filter(|c| since.is_none_or(|s| c.clicked_at >= s))
            .cloned()
            .collect();
        newest_first(&mut clicks);
        Ok(clicks)
    }
}
