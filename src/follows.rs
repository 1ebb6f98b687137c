//! Follow graph: which users subscribe to which feeds, and what they see.

use crate::app::{BrookError, ConstraintKind, Result};
use crate::domain::{Feed, FeedFollow, FollowedFeed, Post};
use crate::store::Store;

pub const DEFAULT_BROWSE_LIMIT: usize = 2;

/// Follow the feed registered under `feed_url`.
pub fn follow<S: Store + ?Sized>(store: &S, user_id: i64, feed_url: &str) -> Result<FeedFollow> {
    let feed = find_feed(store, feed_url)?;
    follow_feed(store, user_id, &feed)
}

pub fn follow_feed<S: Store + ?Sized>(store: &S, user_id: i64, feed: &Feed) -> Result<FeedFollow> {
    let mut edge = FeedFollow::new(user_id, feed.id);
    match store.add_follow(&edge) {
        Ok(id) => {
            edge.id = id;
            Ok(edge)
        }
        Err(e) => Err(match e.constraint_kind() {
            Some(ConstraintKind::Unique) => BrookError::AlreadyFollowing {
                user_id,
                feed_url: feed.url.clone(),
            },
            Some(ConstraintKind::ForeignKey) => BrookError::UserNotFound(format!("id {}", user_id)),
            _ => e,
        }),
    }
}

/// Remove the follow edge. Unfollowing a feed that isn't followed is an error.
pub fn unfollow<S: Store + ?Sized>(store: &S, user_id: i64, feed_url: &str) -> Result<()> {
    let feed = find_feed(store, feed_url)?;
    if store.delete_follow(user_id, feed.id)? == 0 {
        return Err(BrookError::NotFollowing {
            user_id,
            feed_url: feed.url,
        });
    }
    Ok(())
}

pub fn list_followed<S: Store + ?Sized>(store: &S, user_id: i64) -> Result<Vec<FollowedFeed>> {
    store.get_follows_for_user(user_id)
}

/// Most recent posts from followed feeds, newest first.
pub fn browse<S: Store + ?Sized>(store: &S, user_id: i64, limit: usize) -> Result<Vec<Post>> {
    store.get_posts_for_user(user_id, limit)
}

fn find_feed<S: Store + ?Sized>(store: &S, feed_url: &str) -> Result<Feed> {
    store
        .get_feed_by_url(feed_url)?
        .ok_or_else(|| BrookError::FeedNotFound(feed_url.to_string()))
}
