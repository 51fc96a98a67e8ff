//! Shared application state injected into every handler.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::{CodeAllocator, LinkService, StatsService};
use crate::application::services::code_allocator::AllocatorSettings;
use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{LinkRepository, StatsRepository};

pub type DynLinkService = LinkService<dyn LinkRepository>;
pub type DynStatsService = StatsService<dyn StatsRepository, dyn LinkRepository>;

#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<DynLinkService>,
    pub stats_service: Arc<DynStatsService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for the client address.
    pub behind_proxy: bool,
}

impl AppState {
    /// Wires services over the given repositories.
    pub fn new(
        links: Arc<dyn LinkRepository>,
        stats: Arc<dyn StatsRepository>,
        settings: AllocatorSettings,
        base_url: &str,
        click_sender: mpsc::Sender<ClickEvent>,
        behind_proxy: bool,
    ) -> Self {
        let allocator = CodeAllocator::new(links.clone(), settings);
        Self::with_allocator(links, stats, allocator, base_url, click_sender, behind_proxy)
    }

    /// Like [`AppState::new`], with a preconfigured allocator (custom clock
    /// or random source).
    pub fn with_allocator(
        links: Arc<dyn LinkRepository>,
        stats: Arc<dyn StatsRepository>,
        allocator: CodeAllocator<dyn LinkRepository>,
        base_url: &str,
        click_sender: mpsc::Sender<ClickEvent>,
        behind_proxy: bool,
    ) -> Self {
        Self {
            link_service: Arc::new(LinkService::new(links.clone(), allocator, base_url)),
            stats_service: Arc::new(StatsService::new(stats, links)),
            click_sender,
            behind_proxy,
        }
    }
}
