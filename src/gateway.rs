//! Dedup/persist gateway for ingested posts.
//!
//! The unique index on `posts.url` is the only dedup mechanism: inserting a
//! post whose URL is already stored is an expected outcome, not a failure.

use crate::app::Result;
use crate::domain::NewPost;
use crate::store::Store;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Newly stored, with the new post id
    Saved(i64),
    /// A post with the same URL is already stored
    AlreadyExists,
}

pub fn save_post<S: Store + ?Sized>(store: &S, post: &NewPost) -> Result<SaveOutcome> {
    match store.insert_post(post) {
        Ok(id) => Ok(SaveOutcome::Saved(id)),
        Err(e) if e.is_unique_violation() => Ok(SaveOutcome::AlreadyExists),
        Err(e) => Err(e),
    }
}
