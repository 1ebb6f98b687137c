use crate::app::{AppContext, BrookError, ConstraintKind, Result};
use crate::cli::Commands;
use crate::domain::{Feed, User};
use crate::follows::{self, DEFAULT_BROWSE_LIMIT};
use crate::scheduler::{shutdown_signal, Scheduler, SchedulerConfig};
use crate::store::Store;

/// Run one parsed command against `ctx`.
pub async fn dispatch(ctx: &mut AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Register { name } => register(ctx, &name),
        Commands::Login { name } => login(ctx, &name),
        Commands::Users => list_users(ctx),
        Commands::Reset => reset(ctx),
        Commands::AddFeed { name, url } => add_feed(ctx, &name, &url),
        Commands::Feeds => list_feeds(ctx),
        Commands::Follow { url } => follow(ctx, &url),
        Commands::Unfollow { url } => unfollow(ctx, &url),
        Commands::Following => list_following(ctx),
        Commands::Browse { limit } => browse(ctx, limit.unwrap_or(DEFAULT_BROWSE_LIMIT)),
        Commands::Agg { interval } => aggregate(ctx, interval.as_deref()).await,
    }
}

pub fn register(ctx: &mut AppContext, name: &str) -> Result<()> {
    let name = name.trim();
    if name.is_empty() {
        return Err(BrookError::Other("User name cannot be empty".into()));
    }

    match ctx.store.add_user(&User::new(name.to_string())) {
        Ok(_) => {}
        Err(e) if e.is_unique_violation() => return Err(BrookError::UserExists(name.to_string())),
        Err(e) => return Err(e),
    }
    ctx.config.set_user(name)?;

    tracing::info!("Registered user {}", name);
    println!("User created: {}", name);
    Ok(())
}

pub fn login(ctx: &mut AppContext, name: &str) -> Result<()> {
    let name = name.trim();
    if ctx.store.get_user_by_name(name)?.is_none() {
        return Err(BrookError::UserNotFound(name.to_string()));
    }
    ctx.config.set_user(name)?;

    println!("Logged in as {}", name);
    Ok(())
}

pub fn list_users(ctx: &AppContext) -> Result<()> {
    let users = ctx.store.get_all_users()?;

    if users.is_empty() {
        println!("No users");
        return Ok(());
    }

    let current = ctx.config.current_user.as_deref();
    for user in users {
        if current == Some(user.name.as_str()) {
            println!("* {} (current)", user.name);
        } else {
            println!("* {}", user.name);
        }
    }

    Ok(())
}

pub fn reset(ctx: &AppContext) -> Result<()> {
    let deleted = ctx.store.reset_users()?;
    tracing::info!("Reset removed {} users", deleted);
    println!("Deleted {} users", deleted);
    Ok(())
}

pub fn add_feed(ctx: &AppContext, name: &str, url: &str) -> Result<()> {
    let user = ctx.current_user()?;
    let feed = create_feed(ctx.store.as_ref(), name, url, user.id)?;

    println!("Added feed: {} ({})", feed.display_name(), feed.url);
    println!("{} now follows {}", user.name, feed.display_name());
    Ok(())
}

/// Register a feed owned by `owner_id` and subscribe the owner to it.
pub fn create_feed<S: Store + ?Sized>(
    store: &S,
    name: &str,
    url: &str,
    owner_id: i64,
) -> Result<Feed> {
    let url = url.trim();
    url::Url::parse(url)?;

    let mut feed = Feed::new(name.trim().to_string(), url.to_string(), owner_id);
    feed.id = match store.add_feed(&feed) {
        Ok(id) => id,
        Err(e) => {
            return Err(match e.constraint_kind() {
                Some(ConstraintKind::Unique) => BrookError::FeedExists(feed.url),
                Some(ConstraintKind::ForeignKey) => {
                    BrookError::UserNotFound(format!("id {}", owner_id))
                }
                _ => e,
            })
        }
    };

    follows::follow_feed(store, owner_id, &feed)?;
    tracing::info!("Added feed {} ({})", feed.display_name(), feed.url);
    Ok(feed)
}

pub fn list_feeds(ctx: &AppContext) -> Result<()> {
    let feeds = ctx.store.get_all_feeds()?;

    if feeds.is_empty() {
        println!("No feeds");
        return Ok(());
    }

    for listing in feeds {
        let fetched = listing
            .feed
            .last_fetched_at
            .map(|d| d.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "never".to_string());

        println!(
            "{} (added by {}, last fetched {})\n  {}",
            listing.feed.display_name(),
            listing.owner_name,
            fetched,
            listing.feed.url
        );
    }

    Ok(())
}

pub fn follow(ctx: &AppContext, url: &str) -> Result<()> {
    let user = ctx.current_user()?;
    follows::follow(ctx.store.as_ref(), user.id, url.trim())?;

    println!("{} now follows {}", user.name, url.trim());
    Ok(())
}

pub fn unfollow(ctx: &AppContext, url: &str) -> Result<()> {
    let user = ctx.current_user()?;
    follows::unfollow(ctx.store.as_ref(), user.id, url.trim())?;

    println!("{} unfollowed {}", user.name, url.trim());
    Ok(())
}

pub fn list_following(ctx: &AppContext) -> Result<()> {
    let user = ctx.current_user()?;
    let feeds = follows::list_followed(ctx.store.as_ref(), user.id)?;

    if feeds.is_empty() {
        println!("{} is not following any feeds", user.name);
        return Ok(());
    }

    for feed in feeds {
        println!("* {}", feed.name);
    }

    Ok(())
}

pub fn browse(ctx: &AppContext, limit: usize) -> Result<()> {
    let user = ctx.current_user()?;
    let posts = follows::browse(ctx.store.as_ref(), user.id, limit)?;

    if posts.is_empty() {
        println!("No posts");
        return Ok(());
    }

    for post in posts {
        println!(
            "{} {}\n  {}",
            post.published_at.format("%Y-%m-%d"),
            post.display_title(),
            post.url
        );
        let description = post.display_description();
        if !description.is_empty() {
            println!("  {}", description);
        }
    }

    Ok(())
}

/// Run the scheduler until SIGINT/SIGTERM.
pub async fn aggregate(ctx: &AppContext, interval: Option<&str>) -> Result<()> {
    let interval = resolve_interval(ctx, interval)?;
    let scheduler = Scheduler::new(
        ctx.store.clone(),
        ctx.fetcher.clone(),
        SchedulerConfig::new(interval),
    );

    println!(
        "Collecting feeds every {}",
        SchedulerConfig::format_interval(interval)
    );
    scheduler.run(shutdown_signal()).await
}

fn resolve_interval(ctx: &AppContext, interval: Option<&str>) -> Result<std::time::Duration> {
    let raw = interval.unwrap_or(ctx.config.aggregation.interval.as_str());
    SchedulerConfig::parse_interval(raw).map_err(BrookError::Other)
}
