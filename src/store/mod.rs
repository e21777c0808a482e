// ============================================================================
// User Store - Data access for users and their embedded posts
// ============================================================================
//
// `UserStorer` is the seam callers program against:
// - `MongoUserStore` sends one filter/update per call to a MongoDB collection
// - `MemoryUserStore` keeps records in-process with the same outcomes
//
// ============================================================================

pub mod errors;
pub mod memory_store;
pub mod mongo_store;
pub mod queries;

use async_trait::async_trait;

use crate::models::{Post, User};

pub use errors::{StoreError, StoreResult, ValidationError};
pub use memory_store::MemoryUserStore;
pub use mongo_store::MongoUserStore;

/// Result of a write that found its target.
///
/// A write whose target is missing fails with `StoreError::NotFound` instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Modified,
    /// Target found but the stored value already equaled the new one
    Unchanged,
}

impl WriteOutcome {
    pub(crate) fn from_modified_count(modified: u64) -> Self {
        if modified == 0 {
            WriteOutcome::Unchanged
        } else {
            WriteOutcome::Modified
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOutcome::Modified => "modified",
            WriteOutcome::Unchanged => "unchanged",
        }
    }

    /// Treat `Unchanged` as a failure, for callers that require every write to change state
    pub fn ensure_modified(self, user_id: &str) -> StoreResult<()> {
        match self {
            WriteOutcome::Modified => Ok(()),
            WriteOutcome::Unchanged => Err(StoreError::NotModified {
                user_id: user_id.to_string(),
            }),
        }
    }
}

#[async_trait]
pub trait UserStorer: Send + Sync {
    /// Store a new user and return it with its assigned id
    async fn insert(&self, user: User) -> StoreResult<User>;

    async fn find_by_id(&self, id: &str) -> StoreResult<User>;

    /// Append `posts` to the end of the user's posts, in order, as one update
    async fn add_posts(&self, user_id: &str, posts: &[Post]) -> StoreResult<WriteOutcome>;

    /// Replace the post identified by `post_id` with `post` wholesale
    async fn update_post(&self, user_id: &str, post_id: &str, post: Post) -> StoreResult<WriteOutcome>;

    async fn delete_post(&self, user_id: &str, post_id: &str) -> StoreResult<WriteOutcome>;
}
