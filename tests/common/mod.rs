#![allow(dead_code)]

use axum::{Router, extract::ConnectInfo};
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use shortlink::application::services::code_allocator::Clock;
use shortlink::application::services::{AllocatorSettings, CodeAllocator};
use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::click_worker::process_event;
use shortlink::domain::entities::{NewLink, ShortLink};
use shortlink::domain::repositories::LinkRepository;
use shortlink::infrastructure::persistence::MemoryStore;
use shortlink::routes::router;
use shortlink::state::AppState;
use shortlink::utils::code_generator::RandomSource;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tower::Layer;

pub const BASE_URL: &str = "https://sho.rt";
pub const PEER_ADDR: &str = "127.0.0.1:12345";

#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = PEER_ADDR.parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}

/// Clock stuck at one millisecond value.
pub struct FrozenClock(pub u64);

impl Clock for FrozenClock {
    fn now_millis(&self) -> u64 {
        self.0
    }
}

/// Random source that always picks the same symbol.
pub struct ConstantRandom(pub usize);

impl RandomSource for ConstantRandom {
    fn next_index(&self, bound: usize) -> usize {
        self.0 % bound
    }
}

pub struct TestApp {
    pub server: TestServer,
    pub store: Arc<MemoryStore>,
    pub clicks: mpsc::Receiver<ClickEvent>,
}

impl TestApp {
    /// Runs every queued click through the worker pipeline.
    pub async fn drain_clicks(&mut self) -> usize {
        let mut processed = 0;
        while let Ok(event) = self.clicks.try_recv() {
            process_event(&event, self.store.as_ref(), self.store.as_ref(), None)
                .await
                .unwrap();
            processed += 1;
        }
        processed
    }
}

pub fn create_test_state(
    settings: AllocatorSettings,
    queue_capacity: usize,
    behind_proxy: bool,
) -> (AppState, mpsc::Receiver<ClickEvent>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let (tx, rx) = mpsc::channel(queue_capacity);

    let state = AppState::new(
        store.clone(),
        store.clone(),
        settings,
        BASE_URL,
        tx,
        behind_proxy,
    );

    (state, rx, store)
}

pub fn app_from_state(state: AppState) -> Router {
    router(state).layer(MockConnectInfoLayer)
}

pub fn spawn_app() -> TestApp {
    spawn_app_with(AllocatorSettings::default(), 100, false)
}

pub fn spawn_app_with(
    settings: AllocatorSettings,
    queue_capacity: usize,
    behind_proxy: bool,
) -> TestApp {
    let (state, clicks, store) = create_test_state(settings, queue_capacity, behind_proxy);
    let server = TestServer::new(app_from_state(state)).unwrap();

    TestApp {
        server,
        store,
        clicks,
    }
}

/// Spawns an app whose code allocator is built by `build` over the app's store.
pub fn spawn_app_with_allocator(
    build: impl FnOnce(Arc<dyn LinkRepository>) -> CodeAllocator<dyn LinkRepository>,
) -> TestApp {
    let store = Arc::new(MemoryStore::new());
    let (tx, clicks) = mpsc::channel(100);
    let links: Arc<dyn LinkRepository> = store.clone();

    let state = AppState::with_allocator(
        links.clone(),
        store.clone(),
        build(links),
        BASE_URL,
        tx,
        false,
    );
    let server = TestServer::new(app_from_state(state)).unwrap();

    TestApp {
        server,
        store,
        clicks,
    }
}

pub async fn create_test_link(
    store: &MemoryStore,
    code: &str,
    url: &str,
    owner: Option<&str>,
) -> ShortLink {
    store
        .insert(NewLink {
            code: code.to_string(),
            target_url: url.to_string(),
            owner: owner.map(str::to_string),
            title: None,
            tags: vec![],
            custom: true,
            expires_at: None,
        })
        .await
        .unwrap()
}

pub async fn create_expiring_link(
    store: &MemoryStore,
    code: &str,
    owner: Option<&str>,
    expires_at: DateTime<Utc>,
) -> ShortLink {
    store
        .insert(NewLink {
            code: code.to_string(),
            target_url: "https://example.com/".to_string(),
            owner: owner.map(str::to_string),
            title: None,
            tags: vec![],
            custom: true,
            expires_at: Some(expires_at),
        })
        .await
        .unwrap()
}
