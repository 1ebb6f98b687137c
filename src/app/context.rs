use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{BrookError, Result};
use crate::config::Config;
use crate::domain::User;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::store::{SqliteStore, Store};

pub struct AppContext {
    pub store: Arc<SqliteStore>,
    pub fetcher: Arc<dyn Fetcher + Send + Sync>,
    pub config: Config,
}

impl AppContext {
    /// Open the database named by `db_path`, or the one from `config`.
    pub fn new(config: Config, db_path: Option<PathBuf>) -> Result<Self> {
        let db_path = match db_path {
            Some(p) => p,
            None => config.database_path()?,
        };
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        tracing::debug!("Opening database at {}", db_path.display());

        let store = Arc::new(SqliteStore::new(&db_path)?);
        Self::with_store(config, store)
    }

    pub fn in_memory(config: Config) -> Result<Self> {
        let store = Arc::new(SqliteStore::in_memory()?);
        Self::with_store(config, store)
    }

    fn with_store(config: Config, store: Arc<SqliteStore>) -> Result<Self> {
        let fetcher: Arc<dyn Fetcher + Send + Sync> = Arc::new(HttpFetcher::new(&config.fetch)?);
        Ok(Self {
            store,
            fetcher,
            config,
        })
    }

    /// The logged-in user recorded in the config file.
    pub fn current_user(&self) -> Result<User> {
        let name = self
            .config
            .current_user
            .as_deref()
            .ok_or(BrookError::NotLoggedIn)?;
        self.store
            .get_user_by_name(name)?
            .ok_or_else(|| BrookError::UserNotFound(name.to_string()))
    }
}
