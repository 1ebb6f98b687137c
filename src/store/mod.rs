pub mod sqlite;

use chrono::{DateTime, Utc};

use crate::app::Result;
use crate::domain::{Feed, FeedFollow, FeedListing, FollowedFeed, NewPost, Post, User};

pub use sqlite::SqliteStore;

/// Relational persistence for users, feeds, posts and follow edges.
///
/// Constraint violations surface as [`BrookError::Constraint`](crate::app::BrookError::Constraint)
/// so callers can tell a duplicate apart from a real failure.
pub trait Store {
    // User operations
    fn add_user(&self, user: &User) -> Result<i64>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_name(&self, name: &str) -> Result<Option<User>>;
    fn get_all_users(&self) -> Result<Vec<User>>;
    fn reset_users(&self) -> Result<usize>;

    // Feed operations
    fn add_feed(&self, feed: &Feed) -> Result<i64>;
    fn get_feed(&self, id: i64) -> Result<Option<Feed>>;
    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>>;
    fn get_all_feeds(&self) -> Result<Vec<FeedListing>>;
    /// The feed with the oldest `last_fetched_at`; never-fetched feeds first, ties by id.
    fn next_feed_to_fetch(&self) -> Result<Option<Feed>>;
    /// Returns false when the feed is missing or already marked later than `at`.
    fn mark_feed_fetched(&self, id: i64, at: DateTime<Utc>) -> Result<bool>;

    // Post operations
    fn insert_post(&self, post: &NewPost) -> Result<i64>;
    fn get_post_by_url(&self, url: &str) -> Result<Option<Post>>;
    fn get_posts_by_feed(&self, feed_id: i64) -> Result<Vec<Post>>;
    fn get_posts_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<Post>>;

    // Follow operations
    fn add_follow(&self, follow: &FeedFollow) -> Result<i64>;
    fn delete_follow(&self, user_id: i64, feed_id: i64) -> Result<usize>;
    fn get_follows_for_user(&self, user_id: i64) -> Result<Vec<FollowedFeed>>;
    fn count_follows(&self) -> Result<i64>;
}
