//! # Brook
//!
//! A multi-user RSS aggregator backed by SQLite.
//!
//! ## Architecture
//!
//! Aggregation runs as a single polling loop:
//!
//! ```text
//! Scheduler → Fetcher → Normalizer → Gateway → Store
//! ```
//!
//! Every tick takes the feed that was fetched longest ago, downloads it and
//! stores any posts whose URL has not been seen before. Users follow feeds and
//! browse the newest posts from the feeds they follow.
//!
//! ## Quick Start
//!
//! ```bash
//! brook register alice
//! brook addfeed "Rust Blog" https://blog.rust-lang.org/feed.xml
//! brook agg 1m
//! brook browse 5
//! ```
//!
//! ## Modules
//!
//! - [`app`]: Application context and error types
//! - [`cli`]: Command-line interface definitions and handlers
//! - [`config`]: TOML configuration file
//! - [`domain`]: Core domain models (User, Feed, Post, FeedFollow)
//! - [`fetcher`]: HTTP fetching and RSS decoding
//! - [`follows`]: Follow graph and browsing
//! - [`gateway`]: Deduplicating post persistence
//! - [`normalizer`]: Date parsing and item normalization
//! - [`scheduler`]: Round-robin aggregation loop
//! - [`store`]: Database persistence

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires together the store,
/// fetcher and configuration.
pub mod app;

/// Command-line interface using clap.
pub mod cli;

/// Configuration file at `~/.config/brook/config.toml`.
pub mod config;

/// Core domain models.
///
/// - [`User`](domain::User): A registered user
/// - [`Feed`](domain::Feed): An RSS source and its fetch state
/// - [`Post`](domain::Post): A stored feed item, unique by URL
/// - [`FeedFollow`](domain::FeedFollow): A user's subscription to a feed
pub mod domain;

/// HTTP fetching and RSS decoding.
///
/// - [`Fetcher`](fetcher::Fetcher): Async trait for feed fetching
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

/// Follow graph and browsing.
///
/// Users follow feeds by URL; [`browse`](follows::browse) returns the newest
/// posts from followed feeds, [`DEFAULT_BROWSE_LIMIT`](follows::DEFAULT_BROWSE_LIMIT)
/// at a time by default.
pub mod follows;

/// Deduplicating post persistence.
///
/// [`save_post`](gateway::save_post) treats a post whose URL is already stored
/// as [`AlreadyExists`](gateway::SaveOutcome::AlreadyExists), not as a failure.
pub mod gateway;

/// Publication date parsing and item normalization.
pub mod normalizer;

/// Round-robin aggregation loop.
///
/// - [`Scheduler`](scheduler::Scheduler): One feed per tick, stalest first
/// - [`SchedulerConfig`](scheduler::SchedulerConfig): Tick interval parsing
/// - [`shutdown_signal`](scheduler::shutdown_signal): SIGINT/SIGTERM as a watch flag
pub mod scheduler;

/// SQLite persistence layer.
///
/// - [`Store`](store::Store): Trait defining storage operations
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;
