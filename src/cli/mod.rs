pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "brook", version)]
#[command(about = "A multi-user RSS aggregator", long_about = None)]
pub struct Cli {
    /// Database file (overrides db_path from the config file)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.config/brook/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Create a user and log in as them
    Register {
        name: String,
    },
    /// Log in as an existing user
    Login {
        name: String,
    },
    /// List registered users
    Users,
    /// Delete every user along with their feeds, follows and posts
    Reset,
    /// Add a feed and follow it
    #[command(name = "addfeed")]
    AddFeed {
        /// Display name for the feed
        name: String,
        /// URL of the RSS document
        url: String,
    },
    /// List all feeds
    Feeds,
    /// Follow an existing feed
    Follow {
        url: String,
    },
    /// Stop following a feed
    Unfollow {
        url: String,
    },
    /// List the feeds you follow
    Following,
    /// Show the most recent posts from followed feeds
    Browse {
        /// Number of posts to show
        limit: Option<usize>,
    },
    /// Fetch feeds continuously until interrupted
    Agg {
        /// Time between fetches (e.g., "30s", "1m", "1h30m")
        interval: Option<String>,
    },
}
