use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feed {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl Feed {
    pub fn new(name: String, url: String, user_id: i64) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            name,
            url,
            user_id,
            created_at: now,
            updated_at: now,
            last_fetched_at: None,
        }
    }

    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.url
        } else {
            &self.name
        }
    }
}

/// A feed together with the name of the user who added it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedListing {
    pub feed: Feed,
    pub owner_name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_feed_is_unfetched() {
        let feed = Feed::new("Blog".into(), "https://example.com/rss".into(), 7);
        assert_eq!(feed.id, 0);
        assert_eq!(feed.user_id, 7);
        assert!(feed.last_fetched_at.is_none());
        assert_eq!(feed.created_at, feed.updated_at);
    }

    #[test]
    fn test_display_name_falls_back_to_url() {
        let feed = Feed::new(String::new(), "https://example.com/rss".into(), 1);
        assert_eq!(feed.display_name(), "https://example.com/rss");
    }
}
