//! Background worker persisting click events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::{LinkRepository, StatsRepository};
use crate::error::AppError;
use crate::utils::geoip::GeoLookup;

/// Retries after the first failed attempt.
const MAX_RETRIES: usize = 3;

fn retry_strategy() -> impl Iterator<Item = Duration> {
    ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .map(jitter)
        .take(MAX_RETRIES)
}

/// Consumes click events until every sender is dropped.
///
/// Each event is enriched, recorded, and counted on its link. Transient
/// storage failures are retried with exponential backoff; a click whose link
/// was deleted in the meantime is discarded.
pub async fn run_click_worker<S, L>(
    mut rx: mpsc::Receiver<ClickEvent>,
    stats: Arc<S>,
    links: Arc<L>,
    geo: Option<Arc<dyn GeoLookup>>,
) where
    S: StatsRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    while let Some(event) = rx.recv().await {
        let result = process_event(&event, stats.as_ref(), links.as_ref(), geo.as_deref()).await;
        if let Err(e) = result {
            error!(link_id = event.link_id, error = %e, "Failed to persist click");
        }
    }
    debug!("Click channel closed, worker exiting");
}

/// Persists one click and bumps the link's counter.
pub async fn process_event<S, L>(
    event: &ClickEvent,
    stats: &S,
    links: &L,
    geo: Option<&dyn GeoLookup>,
) -> Result<(), AppError>
where
    S: StatsRepository + ?Sized,
    L: LinkRepository + ?Sized,
{
    let new_click = event.enrich(geo);

    RetryIf::start(
        retry_strategy(),
        || stats.record_click(new_click.clone()),
        AppError::is_retryable,
    )
    .await?;

    RetryIf::start(
        retry_strategy(),
        || links.increment_clicks(event.link_id),
        AppError::is_retryable,
    )
    .await?;

    debug!(link_id = event.link_id, "Click recorded");
    Ok(())
}
