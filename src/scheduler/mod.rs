//! The ingestion scheduler: on a fixed interval, fetch the single
//! most-overdue feed, normalize its items and persist the new ones.
//!
//! Fetching is strictly sequential, one feed per tick. A feed-level
//! failure ends the pass; an item-level failure skips that item only.

use std::time::Duration;

use chrono::Utc;
use tokio::time::MissedTickBehavior;

use crate::app::{AppContext, Result};
use crate::domain::NewPost;
use crate::normalizer;
use crate::store::Store;

pub struct Scheduler {
    interval: Duration,
}

impl Scheduler {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    /// Run until Ctrl-C. The first pass starts immediately; a pass that
    /// finishes late delays the next tick rather than skipping it, and the
    /// shutdown signal aborts an in-flight fetch promptly.
    pub async fn run(&self, ctx: &AppContext) -> Result<()> {
        let mut timer = tokio::time::interval(self.interval);
        timer.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let shutdown = tokio::signal::ctrl_c();
        tokio::pin!(shutdown);

        tracing::info!(interval = ?self.interval, "starting feed aggregation");

        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = timer.tick() => {}
            }

            tokio::select! {
                _ = &mut shutdown => break,
                result = scrape_once(ctx) => {
                    if let Err(e) = result {
                        tracing::warn!(error = %e, "scrape pass failed");
                    }
                }
            }
        }

        tracing::info!("feed aggregation stopped");
        Ok(())
    }
}

/// One scrape pass: select the most-overdue feed, fetch it, and persist
/// whatever items survive normalization. Returns the number of new posts.
pub async fn scrape_once(ctx: &AppContext) -> Result<usize> {
    let Some(feed) = ctx.store.get_oldest_fetched_feed()? else {
        tracing::info!("no feeds to fetch");
        return Ok(0);
    };

    // Advance the marker before fetching so a broken source rotates to the
    // back of the queue instead of being retried every tick.
    ctx.store.mark_feed_fetched(feed.id, Utc::now())?;

    tracing::debug!(feed = %feed.name, url = %feed.url, "fetching feed");
    let document = ctx.fetcher.fetch(&feed.url).await?;

    let mut new_posts = 0;
    for item in &document.items {
        let published_at = match normalizer::normalize(&item.pub_date) {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(item = %item.title, error = %e, "skipping item");
                continue;
            }
        };

        let post = NewPost {
            feed_id: feed.id,
            title: item.title.clone(),
            url: item.link.clone(),
            description: item.description.clone(),
            published_at,
        };

        match ctx.store.create_post(&post) {
            Ok(true) => new_posts += 1,
            Ok(false) => {}
            // Skip-and-continue: one bad row must not abort the rest of
            // the document.
            Err(e) => tracing::warn!(item = %item.title, error = %e, "failed to store post"),
        }
    }

    tracing::info!(feed = %feed.name, new_posts, "scrape pass complete");
    Ok(new_posts)
}

/// Parse an interval string like "1h", "30m", "90s", "2d" or raw seconds.
pub fn parse_interval(s: &str) -> std::result::Result<Duration, String> {
    let s = s.trim().to_lowercase();

    let secs = if let Some(hours) = s.strip_suffix('h') {
        hours
            .parse::<u64>()
            .map(|h| h * 3600)
            .map_err(|_| format!("Invalid hours: {}", hours))?
    } else if let Some(minutes) = s.strip_suffix('m') {
        minutes
            .parse::<u64>()
            .map(|m| m * 60)
            .map_err(|_| format!("Invalid minutes: {}", minutes))?
    } else if let Some(days) = s.strip_suffix('d') {
        days.parse::<u64>()
            .map(|d| d * 86400)
            .map_err(|_| format!("Invalid days: {}", days))?
    } else if let Some(secs) = s.strip_suffix('s') {
        secs.parse::<u64>()
            .map_err(|_| format!("Invalid seconds: {}", secs))?
    } else {
        s.parse::<u64>()
            .map_err(|_| format!("Invalid interval: {}. Use format like '1h', '30m', '90s'", s))?
    };

    if secs == 0 {
        return Err("Interval must be positive".to_string());
    }

    Ok(Duration::from_secs(secs))
}
