pub mod date;

use chrono::{DateTime, Utc};

use crate::domain::NewPost;
use crate::fetcher::RssItem;

pub use date::{parse_date, parse_date_or, try_parse_date};

/// Turns decoded feed items into post records ready for the store.
#[derive(Clone, Default)]
pub struct Normalizer;

impl Normalizer {
    pub fn new() -> Self {
        Self
    }

    /// Build a post from `item`, or `None` if it has no link to dedup on.
    pub fn normalize_item(&self, feed_id: i64, item: &RssItem) -> Option<NewPost> {
        self.normalize_item_at(feed_id, item, Utc::now())
    }

    /// Like [`normalize_item`](Self::normalize_item), with an explicit fallback time.
    pub fn normalize_item_at(
        &self,
        feed_id: i64,
        item: &RssItem,
        now: DateTime<Utc>,
    ) -> Option<NewPost> {
        let url = item.link.trim();
        if url.is_empty() {
            tracing::warn!("Skipping item without link: {:?}", item.title);
            return None;
        }

        let published_at = parse_date_or(&item.pub_date, now);

        let description = item.description.trim();

        Some(NewPost {
            feed_id,
            title: item.title.trim().to_string(),
            url: url.to_string(),
            description: (!description.is_empty()).then(|| description.to_string()),
            published_at,
        })
    }
}
