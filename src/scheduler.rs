//! Round-robin feed aggregation.
//!
//! Every tick picks the feed that was fetched longest ago (never-fetched feeds
//! first), marks it fetched, then downloads and stores its posts. Marking
//! happens before the fetch, so a feed that keeps failing still waits its turn
//! behind every other feed instead of monopolizing the rotation.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};

use crate::app::Result;
use crate::domain::Feed;
use crate::fetcher::{FetchError, Fetcher, RssDocument};
use crate::gateway::{save_post, SaveOutcome};
use crate::normalizer::Normalizer;
use crate::store::Store;

/// Scheduler configuration
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time between the start of consecutive ticks
    pub interval: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
        }
    }
}

impl SchedulerConfig {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Parse interval strings like "30s", "1m", "1h30m", "500ms" or bare seconds.
    pub fn parse_interval(s: &str) -> std::result::Result<Duration, String> {
        let s = s.trim().to_lowercase();
        if s.is_empty() {
            return Err("Empty interval".to_string());
        }

        let total = match s.parse::<u64>() {
            Ok(secs) => Duration::from_secs(secs),
            Err(_) => Self::parse_compound(&s)?,
        };

        if total.is_zero() {
            return Err(format!("Interval must be greater than zero: {}", s));
        }
        Ok(total)
    }

    fn parse_compound(s: &str) -> std::result::Result<Duration, String> {
        let invalid = || format!("Invalid interval: {}. Use format like '30s', '1m', '1h30m'", s);

        let mut total = Duration::ZERO;
        let mut rest = s;

        while !rest.is_empty() {
            let digits = rest
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(rest.len());
            if digits == 0 {
                return Err(invalid());
            }
            let value: u64 = rest[..digits].parse().map_err(|_| invalid())?;
            rest = &rest[digits..];

            let unit_len = rest.find(|c: char| c.is_ascii_digit()).unwrap_or(rest.len());
            let unit = &rest[..unit_len];
            rest = &rest[unit_len..];

            let part = match unit {
                "ms" => Some(Duration::from_millis(value)),
                "s" => Some(Duration::from_secs(value)),
                "m" => value.checked_mul(60).map(Duration::from_secs),
                "h" => value.checked_mul(3600).map(Duration::from_secs),
                "d" => value.checked_mul(86400).map(Duration::from_secs),
                _ => return Err(invalid()),
            };
            total = part
                .and_then(|p| total.checked_add(p))
                .ok_or_else(|| format!("Interval too large: {}", s))?;
        }

        Ok(total)
    }

    /// Format interval for display
    pub fn format_interval(interval: Duration) -> String {
        let secs = interval.as_secs();
        if interval.subsec_millis() != 0 {
            format!("{}ms", interval.as_millis())
        } else if secs >= 86400 && secs % 86400 == 0 {
            format!("{}d", secs / 86400)
        } else if secs >= 3600 && secs % 3600 == 0 {
            format!("{}h", secs / 3600)
        } else if secs >= 60 && secs % 60 == 0 {
            format!("{}m", secs / 60)
        } else {
            format!("{}s", secs)
        }
    }
}

/// Per-item results of ingesting one feed document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub saved: usize,
    pub duplicates: usize,
    /// Items without a link
    pub skipped: usize,
    /// Items the store refused for a reason other than a duplicate URL
    pub failed: usize,
}

#[derive(Debug)]
pub enum TickOutcome {
    /// There are no feeds to fetch
    Idle,
    Ingested { feed: Feed, report: IngestReport },
    FetchFailed { feed: Feed, error: FetchError },
}

pub struct Scheduler<S> {
    store: Arc<S>,
    fetcher: Arc<dyn Fetcher + Send + Sync>,
    normalizer: Normalizer,
    config: SchedulerConfig,
}

impl<S: Store + Send + Sync> Scheduler<S> {
    pub fn new(
        store: Arc<S>,
        fetcher: Arc<dyn Fetcher + Send + Sync>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            store,
            fetcher,
            normalizer: Normalizer::new(),
            config,
        }
    }

    /// Poll feeds until `shutdown` flips to true or its sender goes away.
    ///
    /// The first tick runs immediately. Errors are logged and never end the loop.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let period = self.config.interval.max(Duration::from_millis(1));
        tracing::info!(
            "Collecting feeds every {}",
            SchedulerConfig::format_interval(period)
        );

        let mut timer = interval(period);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown.borrow() {
                break;
            }

            tokio::select! {
                _ = timer.tick() => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
            }

            if *shutdown.borrow() {
                break;
            }

            if let Err(e) = self.tick().await {
                tracing::error!("Tick failed: {}", e);
            }
        }

        tracing::info!("Aggregation stopped");
        Ok(())
    }

    /// Run a single fetch cycle against the stalest feed.
    ///
    /// Only store failures while picking or marking the feed are returned as
    /// errors; fetch failures are part of the outcome.
    pub async fn tick(&self) -> Result<TickOutcome> {
        let Some(feed) = self.store.next_feed_to_fetch()? else {
            tracing::debug!("No feeds to fetch");
            return Ok(TickOutcome::Idle);
        };

        let now = Utc::now();
        if !self.store.mark_feed_fetched(feed.id, now)? {
            tracing::warn!(
                "Could not mark {} as fetched at {}: it was already marked later",
                feed.display_name(),
                now
            );
        }

        let document = match self.fetcher.fetch(&feed.url).await {
            Ok(document) => document,
            Err(error) => {
                tracing::error!("Error fetching {}: {}", feed.display_name(), error);
                return Ok(TickOutcome::FetchFailed { feed, error });
            }
        };

        tracing::info!(
            "Fetched {} ({}): {} items",
            feed.display_name(),
            document.channel.title,
            document.channel.items.len()
        );

        let report = self.ingest(&feed, &document);
        tracing::info!(
            "Finished {}: {} saved, {} already stored, {} skipped, {} failed",
            feed.display_name(),
            report.saved,
            report.duplicates,
            report.skipped,
            report.failed
        );

        Ok(TickOutcome::Ingested { feed, report })
    }

    fn ingest(&self, feed: &Feed, document: &RssDocument) -> IngestReport {
        let mut report = IngestReport::default();

        for item in &document.channel.items {
            let Some(post) = self.normalizer.normalize_item(feed.id, item) else {
                report.skipped += 1;
                continue;
            };

            match save_post(self.store.as_ref(), &post) {
                Ok(SaveOutcome::Saved(_)) => {
                    tracing::info!("Saved: {} ({})", post.title, post.url);
                    report.saved += 1;
                }
                Ok(SaveOutcome::AlreadyExists) => {
                    tracing::debug!("Post already exists: {}", post.url);
                    report.duplicates += 1;
                }
                Err(e) => {
                    tracing::error!("Error saving post {}: {}", post.url, e);
                    report.failed += 1;
                }
            }
        }

        report
    }
}

/// A shutdown flag that flips to true on SIGINT or SIGTERM.
pub fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        wait_for_signal().await;
        tracing::info!("Shutdown signal received");
        let _ = tx.send(true);
    });

    rx
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
        }
        _ => {
            tracing::warn!("Failed to set up SIGTERM/SIGINT handlers, using Ctrl-C only");
            wait_for_ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    wait_for_ctrl_c().await;
}

async fn wait_for_ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
}
