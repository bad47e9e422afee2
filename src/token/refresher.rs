// src/token/refresher.rs
use super::source::TokenSource;
use crate::page::{Page, Visibility};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tokio::time::{interval_at, Duration, Instant, MissedTickBehavior};
use tracing::{debug, error, info};

pub const DEFAULT_REFRESH_INTERVAL: Duration = Duration::from_secs(20 * 60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    Periodic,
    Visible,
    Manual,
}

/// Keeps the anti-forgery token in a page's form fields from going stale.
pub struct TokenRefresher {
    source: Arc<dyn TokenSource>,
    page: Arc<Page>,
    field_name: String,
    interval: Duration,
    last_refreshed: RwLock<Option<DateTime<Utc>>>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
}

impl TokenRefresher {
    pub fn new(source: Arc<dyn TokenSource>, page: Arc<Page>, field_name: impl Into<String>) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        Self {
            source,
            page,
            field_name: field_name.into(),
            interval: DEFAULT_REFRESH_INTERVAL,
            last_refreshed: RwLock::new(None),
            shutdown_tx,
            shutdown_rx,
        }
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    pub async fn last_refreshed(&self) -> Option<DateTime<Utc>> {
        *self.last_refreshed.read().await
    }

    /// Run until [`shutdown`](Self::shutdown). Refreshes on every interval
    /// tick and whenever the page comes back to the foreground; each refresh
    /// runs as its own task.
    pub async fn start(self: Arc<Self>) {
        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut visibility_rx = self.page.subscribe_visibility();
        let mut shutdown_rx = self.shutdown_rx.clone();

        info!(
            "Token refresher started for field '{}' with interval: {:?}",
            self.field_name, self.interval
        );

        loop {
            let trigger = tokio::select! {
                _ = ticker.tick() => RefreshTrigger::Periodic,
                _ = visibility_rx.changed() => {
                    if *visibility_rx.borrow_and_update() != Visibility::Visible {
                        continue;
                    }
                    RefreshTrigger::Visible
                }
                _ = shutdown_rx.changed() => {
                    if *shutdown_rx.borrow() {
                        info!("Token refresher shutting down");
                        break;
                    }
                    continue;
                }
            };

            let refresher = self.clone();
            tokio::spawn(async move {
                refresher.refresh(trigger).await;
            });
        }
    }

    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }

    /// Fetch a fresh token and write it into every matching field. Failures
    /// are logged and leave the fields as they were.
    pub async fn refresh(&self, trigger: RefreshTrigger) {
        debug!("Refreshing CSRF token ({:?})", trigger);

        match self.source.fetch_token().await {
            Ok(token) => {
                let written = self.page.write_named(&self.field_name, &token);
                *self.last_refreshed.write().await = Some(Utc::now());
                info!("CSRF token refreshed in {} field(s)", written);
            }
            Err(e) => {
                error!("Failed to refresh CSRF token: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Hands out scripted tokens, each after its own delay.
    struct ScriptedSource {
        replies: Mutex<VecDeque<(Duration, Result<String, TokenError>)>>,
        calls: AtomicUsize,
    }

    impl ScriptedSource {
        fn new(replies: Vec<(Duration, Result<String, TokenError>)>) -> Arc<Self> {
            Arc::new(Self {
                replies: Mutex::new(replies.into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl TokenSource for ScriptedSource {
        async fn fetch_token(&self) -> Result<String, TokenError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let reply = self.replies.lock().unwrap().pop_front();
            match reply {
                Some((delay, result)) => {
                    tokio::time::sleep(delay).await;
                    result
                }
                None => Err(TokenError::MissingToken),
            }
        }
    }

    fn page_with_fields() -> Arc<Page> {
        let page = Arc::new(Page::new("meta"));
        page.add_field("csrf_token", "stale");
        page.add_field("csrf_token", "stale");
        page.add_field("comment", "hello");
        page
    }

    async fn wait_for_calls(source: &ScriptedSource, n: usize) {
        for _ in 0..200 {
            if source.calls.load(Ordering::SeqCst) >= n {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("expected {} token requests", n);
    }

    #[tokio::test]
    async fn test_refresh_overwrites_matching_fields() {
        let source = ScriptedSource::new(vec![(Duration::ZERO, Ok("fresh".to_string()))]);
        let page = page_with_fields();
        let refresher = TokenRefresher::new(source, page.clone(), "csrf_token");

        refresher.refresh(RefreshTrigger::Manual).await;

        assert_eq!(page.values_named("csrf_token"), vec!["fresh", "fresh"]);
        assert_eq!(page.values_named("comment"), vec!["hello"]);
        assert!(refresher.last_refreshed().await.is_some());
    }

    #[tokio::test]
    async fn test_failed_refresh_leaves_fields_untouched() {
        let source = ScriptedSource::new(vec![(
            Duration::ZERO,
            Err(TokenError::HttpStatus(reqwest::StatusCode::INTERNAL_SERVER_ERROR)),
        )]);
        let page = page_with_fields();
        let refresher = TokenRefresher::new(source, page.clone(), "csrf_token");

        refresher.refresh(RefreshTrigger::Manual).await;

        assert_eq!(page.values_named("csrf_token"), vec!["stale", "stale"]);
        assert!(refresher.last_refreshed().await.is_none());
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_keep_last_resolved_token() {
        let source = ScriptedSource::new(vec![
            (Duration::from_millis(60), Ok("slow".to_string())),
            (Duration::from_millis(5), Ok("fast".to_string())),
        ]);
        let page = page_with_fields();
        let refresher = TokenRefresher::new(source, page.clone(), "csrf_token");

        tokio::join!(
            refresher.refresh(RefreshTrigger::Periodic),
            refresher.refresh(RefreshTrigger::Visible),
        );

        assert_eq!(page.values_named("csrf_token"), vec!["slow", "slow"]);
    }

    #[tokio::test]
    async fn test_periodic_trigger() {
        let source = ScriptedSource::new(vec![
            (Duration::ZERO, Ok("one".to_string())),
            (Duration::ZERO, Ok("two".to_string())),
        ]);
        let page = page_with_fields();
        let refresher = Arc::new(
            TokenRefresher::new(source.clone(), page.clone(), "csrf_token")
                .with_interval(Duration::from_millis(20)),
        );

        let handle = tokio::spawn(refresher.clone().start());
        wait_for_calls(&source, 2).await;
        refresher.shutdown();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(page.values_named("csrf_token"), vec!["two", "two"]);
    }

    #[tokio::test]
    async fn test_visibility_trigger() {
        let source = ScriptedSource::new(vec![(Duration::ZERO, Ok("visible".to_string()))]);
        let page = page_with_fields();
        let refresher = Arc::new(TokenRefresher::new(source.clone(), page.clone(), "csrf_token"));

        let handle = tokio::spawn(refresher.clone().start());
        tokio::time::sleep(Duration::from_millis(10)).await;

        page.set_visibility(Visibility::Hidden);
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);

        page.set_visibility(Visibility::Visible);
        wait_for_calls(&source, 1).await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        refresher.shutdown();
        handle.await.unwrap();

        assert_eq!(page.values_named("csrf_token"), vec!["visible", "visible"]);
    }

    #[tokio::test]
    async fn test_already_visible_page_does_not_refresh() {
        let source = ScriptedSource::new(vec![(Duration::ZERO, Ok("unexpected".to_string()))]);
        let page = page_with_fields();
        let refresher = Arc::new(TokenRefresher::new(source.clone(), page.clone(), "csrf_token"));

        let handle = tokio::spawn(refresher.clone().start());
        tokio::time::sleep(Duration::from_millis(10)).await;

        page.set_visibility(Visibility::Visible);
        page.set_visibility(Visibility::Visible);
        tokio::time::sleep(Duration::from_millis(30)).await;

        refresher.shutdown();
        handle.await.unwrap();

        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(page.values_named("csrf_token"), vec!["stale", "stale"]);
    }
}
