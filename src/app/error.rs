use rusqlite::ffi;
use thiserror::Error;

use crate::config::ConfigError;
use crate::fetcher::FetchError;

/// Which constraint a failed statement tripped over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    Unique,
    ForeignKey,
    NotNull,
    Other,
}

#[derive(Error, Debug)]
pub enum BrookError {
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    #[error("Constraint violation ({kind:?}): {source}")]
    Constraint {
        kind: ConstraintKind,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Migration error: {0}")]
    Migration(#[from] rusqlite_migration::Error),

    #[error("Database connection lock poisoned")]
    LockPoisoned,

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Feed not found: {0}")]
    FeedNotFound(String),

    #[error("Feed already exists: {0}")]
    FeedExists(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("User already exists: {0}")]
    UserExists(String),

    #[error("User {user_id} is not following {feed_url}")]
    NotFollowing { user_id: i64, feed_url: String },

    #[error("User {user_id} already follows {feed_url}")]
    AlreadyFollowing { user_id: i64, feed_url: String },

    #[error("Not logged in (run `brook login <name>` first)")]
    NotLoggedIn,

    #[error("{0}")]
    Other(String),
}

impl BrookError {
    pub fn constraint_kind(&self) -> Option<ConstraintKind> {
        match self {
            BrookError::Constraint { kind, .. } => Some(*kind),
            _ => None,
        }
    }

    pub fn is_unique_violation(&self) -> bool {
        self.constraint_kind() == Some(ConstraintKind::Unique)
    }
}

impl From<rusqlite::Error> for BrookError {
    fn from(err: rusqlite::Error) -> Self {
        match classify_constraint(&err) {
            Some(kind) => BrookError::Constraint { kind, source: err },
            None => BrookError::Database(err),
        }
    }
}

fn classify_constraint(err: &rusqlite::Error) -> Option<ConstraintKind> {
    let rusqlite::Error::SqliteFailure(failure, _) = err else {
        return None;
    };
    if failure.code != rusqlite::ErrorCode::ConstraintViolation {
        return None;
    }

    let kind = match failure.extended_code {
        ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
            ConstraintKind::Unique
        }
        ffi::SQLITE_CONSTRAINT_FOREIGNKEY => ConstraintKind::ForeignKey,
        ffi::SQLITE_CONSTRAINT_NOTNULL => ConstraintKind::NotNull,
        _ => ConstraintKind::Other,
    };
    Some(kind)
}

pub type Result<T> = std::result::Result<T, BrookError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sqlite_failure(extended_code: i32) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(ffi::Error::new(extended_code), None)
    }

    #[test]
    fn test_unique_violation_is_classified() {
        let err = BrookError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_UNIQUE));
        assert!(err.is_unique_violation());
    }

    #[test]
    fn test_foreign_key_violation_is_not_unique() {
        let err = BrookError::from(sqlite_failure(ffi::SQLITE_CONSTRAINT_FOREIGNKEY));
        assert_eq!(err.constraint_kind(), Some(ConstraintKind::ForeignKey));
        assert!(!err.is_unique_violation());
    }

    #[test]
    fn test_non_constraint_failure_stays_database_error() {
        let err = BrookError::from(sqlite_failure(ffi::SQLITE_BUSY));
        assert!(matches!(err, BrookError::Database(_)));
        assert_eq!(err.constraint_kind(), None);
    }
}
