use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use rusqlite_migration::{Migrations, M};

use crate::app::{BrookError, Result};
use crate::domain::{Feed, FeedFollow, FeedListing, FollowedFeed, NewPost, Post, User};
use crate::store::Store;

const FEED_COLUMNS: &str =
    "f.id, f.name, f.url, f.user_id, f.created_at, f.updated_at, f.last_fetched_at";

const POST_COLUMNS: &str = "p.id, p.feed_id, p.title, p.url, p.description, p.published_at, \
     p.created_at, p.updated_at";

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.conn()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations.to_latest(&mut conn)?;

        Ok(())
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| BrookError::LockPoisoned)
    }

    /// Fixed-width UTC timestamps, so text order in SQLite is chronological order.
    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| s.parse::<DateTime<Utc>>().ok())
    }

    fn required_datetime(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
        Ok(row
            .get::<_, String>(idx)
            .ok()
            .and_then(|s| Self::parse_datetime(&s))
            .unwrap_or_else(Utc::now))
    }

    fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            created_at: Self::required_datetime(row, 2)?,
            updated_at: Self::required_datetime(row, 3)?,
        })
    }

    fn feed_from_row(row: &Row<'_>) -> rusqlite::Result<Feed> {
        Ok(Feed {
            id: row.get(0)?,
            name: row.get(1)?,
            url: row.get(2)?,
            user_id: row.get(3)?,
            created_at: Self::required_datetime(row, 4)?,
            updated_at: Self::required_datetime(row, 5)?,
            last_fetched_at: row
                .get::<_, Option<String>>(6)?
                .and_then(|s| Self::parse_datetime(&s)),
        })
    }

    fn post_from_row(row: &Row<'_>) -> rusqlite::Result<Post> {
        Ok(Post {
            id: row.get(0)?,
            feed_id: row.get(1)?,
            title: row.get(2)?,
            url: row.get(3)?,
            description: row.get(4)?,
            published_at: Self::required_datetime(row, 5)?,
            created_at: Self::required_datetime(row, 6)?,
            updated_at: Self::required_datetime(row, 7)?,
        })
    }
}

impl Store for SqliteStore {
    fn add_user(&self, user: &User) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO users (name, created_at, updated_at) VALUES (?1, ?2, ?3)",
            params![
                user.name,
                Self::format_datetime(&user.created_at),
                Self::format_datetime(&user.updated_at)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE id = ?1",
                params![id],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_user_by_name(&self, name: &str) -> Result<Option<User>> {
        let conn = self.conn()?;
        let user = conn
            .query_row(
                "SELECT id, name, created_at, updated_at FROM users WHERE name = ?1",
                params![name],
                Self::user_from_row,
            )
            .optional()?;
        Ok(user)
    }

    fn get_all_users(&self) -> Result<Vec<User>> {
        let conn = self.conn()?;
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY name")?;
        let users = stmt
            .query_map([], Self::user_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(users)
    }

    fn reset_users(&self) -> Result<usize> {
        let conn = self.conn()?;
        Ok(conn.execute("DELETE FROM users", [])?)
    }

    fn add_feed(&self, feed: &Feed) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO feeds (name, url, user_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                feed.name,
                feed.url,
                feed.user_id,
                Self::format_datetime(&feed.created_at),
                Self::format_datetime(&feed.updated_at)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_feed(&self, id: i64) -> Result<Option<Feed>> {
        let conn = self.conn()?;
        let feed = conn
            .query_row(
                &format!("SELECT {FEED_COLUMNS} FROM feeds f WHERE f.id = ?1"),
                params![id],
                Self::feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    fn get_feed_by_url(&self, url: &str) -> Result<Option<Feed>> {
        let conn = self.conn()?;
        let feed = conn
            .query_row(
                &format!("SELECT {FEED_COLUMNS} FROM feeds f WHERE f.url = ?1"),
                params![url],
                Self::feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    fn get_all_feeds(&self) -> Result<Vec<FeedListing>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FEED_COLUMNS}, u.name FROM feeds f
             JOIN users u ON u.id = f.user_id
             ORDER BY f.name, f.url"
        ))?;
        let feeds = stmt
            .query_map([], |row| {
                Ok(FeedListing {
                    feed: Self::feed_from_row(row)?,
                    owner_name: row.get(7)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(feeds)
    }

    fn next_feed_to_fetch(&self) -> Result<Option<Feed>> {
        let conn = self.conn()?;
        let feed = conn
            .query_row(
                &format!(
                    "SELECT {FEED_COLUMNS} FROM feeds f
                     ORDER BY f.last_fetched_at IS NOT NULL, f.last_fetched_at ASC, f.id ASC
                     LIMIT 1"
                ),
                [],
                Self::feed_from_row,
            )
            .optional()?;
        Ok(feed)
    }

    fn mark_feed_fetched(&self, id: i64, at: DateTime<Utc>) -> Result<bool> {
        let conn = self.conn()?;
        let updated = conn.execute(
            "UPDATE feeds SET last_fetched_at = ?1, updated_at = ?1
             WHERE id = ?2 AND (last_fetched_at IS NULL OR last_fetched_at <= ?1)",
            params![Self::format_datetime(&at), id],
        )?;
        Ok(updated > 0)
    }

    fn insert_post(&self, post: &NewPost) -> Result<i64> {
        let conn = self.conn()?;
        let now = Self::format_datetime(&Utc::now());
        conn.execute(
            "INSERT INTO posts (feed_id, title, url, description, published_at, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?6)",
            params![
                post.feed_id,
                post.title,
                post.url,
                post.description,
                Self::format_datetime(&post.published_at),
                now
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn get_post_by_url(&self, url: &str) -> Result<Option<Post>> {
        let conn = self.conn()?;
        let post = conn
            .query_row(
                &format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.url = ?1"),
                params![url],
                Self::post_from_row,
            )
            .optional()?;
        Ok(post)
    }

    fn get_posts_by_feed(&self, feed_id: i64) -> Result<Vec<Post>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts p
             WHERE p.feed_id = ?1
             ORDER BY p.published_at DESC, p.id DESC"
        ))?;
        let posts = stmt
            .query_map(params![feed_id], Self::post_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn get_posts_for_user(&self, user_id: i64, limit: usize) -> Result<Vec<Post>> {
        let conn = self.conn()?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = conn.prepare(&format!(
            "SELECT {POST_COLUMNS} FROM posts p
             JOIN feed_follows ff ON ff.feed_id = p.feed_id
             WHERE ff.user_id = ?1
             ORDER BY p.published_at DESC, p.id DESC
             LIMIT ?2"
        ))?;
        let posts = stmt
            .query_map(params![user_id, limit], Self::post_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(posts)
    }

    fn add_follow(&self, follow: &FeedFollow) -> Result<i64> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO feed_follows (user_id, feed_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                follow.user_id,
                follow.feed_id,
                Self::format_datetime(&follow.created_at),
                Self::format_datetime(&follow.updated_at)
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    fn delete_follow(&self, user_id: i64, feed_id: i64) -> Result<usize> {
        let conn = self.conn()?;
        let deleted = conn.execute(
            "DELETE FROM feed_follows WHERE user_id = ?1 AND feed_id = ?2",
            params![user_id, feed_id],
        )?;
        Ok(deleted)
    }

    fn get_follows_for_user(&self, user_id: i64) -> Result<Vec<FollowedFeed>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT f.id, f.name, f.url FROM feed_follows ff
             JOIN feeds f ON f.id = ff.feed_id
             WHERE ff.user_id = ?1
             ORDER BY f.name, f.url",
        )?;
        let follows = stmt
            .query_map(params![user_id], |row| {
                Ok(FollowedFeed {
                    feed_id: row.get(0)?,
                    name: row.get(1)?,
                    url: row.get(2)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(follows)
    }

    fn count_follows(&self) -> Result<i64> {
        let conn = self.conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM feed_follows", [], |row| row.get(0))?;
        Ok(count)
    }
}
