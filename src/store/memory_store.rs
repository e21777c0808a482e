use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use tokio::sync::RwLock;

use crate::models::{Post, User, UserDocument};

use super::errors::{StoreError, StoreResult, ValidationError};
use super::queries;
use super::{UserStorer, WriteOutcome};

// ============================================================================
// In-Memory User Store
// ============================================================================
//
// Same observable behavior as `MongoUserStore`: ObjectId keys, positional
// replace of the first matching post, NotFound on zero matches, Unchanged
// when a matched write leaves the record equal.
//
// ============================================================================

#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<ObjectId, UserDocument>>,
    round_trips: AtomicU64,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of calls that reached the backing map
    pub fn round_trips(&self) -> u64 {
        self.round_trips.load(Ordering::SeqCst)
    }

    pub async fn is_empty(&self) -> bool {
        self.users.read().await.is_empty()
    }

    fn touch(&self) {
        self.round_trips.fetch_add(1, Ordering::SeqCst);
    }

    async fn write_user<F>(&self, oid: ObjectId, not_found: StoreError, apply: F) -> StoreResult<WriteOutcome>
    where
        F: FnOnce(&mut Vec<Post>) -> Option<bool>,
    {
        self.touch();
        let mut users = self.users.write().await;

        let record = match users.get_mut(&oid) {
            Some(record) => record,
            None => return Err(not_found),
        };

        match apply(&mut record.posts) {
            None => Err(not_found),
            Some(true) => Ok(WriteOutcome::Modified),
            Some(false) => Ok(WriteOutcome::Unchanged),
        }
    }
}

#[async_trait]
impl UserStorer for MemoryUserStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        queries::validate_posts(&user.posts)?;
        self.touch();

        let oid = ObjectId::new();
        let mut record = UserDocument::for_insert(&user);
        record.id = Some(oid);

        self.users.write().await.insert(oid, record);

        tracing::debug!(user_id = %oid, username = %user.username, "Inserted user in memory");

        Ok(User {
            id: oid.to_hex(),
            ..user
        })
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<User> {
        let oid = queries::parse_user_id(id)?;
        self.touch();

        self.users
            .read()
            .await
            .get(&oid)
            .cloned()
            .map(User::from)
            .ok_or_else(|| StoreError::user_not_found(id))
    }

    async fn add_posts(&self, user_id: &str, posts: &[Post]) -> StoreResult<WriteOutcome> {
        let oid = queries::parse_user_id(user_id)?;
        if posts.is_empty() {
            return Err(ValidationError::EmptyPosts.into());
        }
        queries::validate_posts(posts)?;

        self.write_user(oid, StoreError::user_not_found(user_id), |existing| {
            existing.extend_from_slice(posts);
            Some(true)
        })
        .await
    }

    async fn update_post(&self, user_id: &str, post_id: &str, post: Post) -> StoreResult<WriteOutcome> {
        let oid = queries::parse_user_id(user_id)?;
        queries::validate_posts(std::slice::from_ref(&post))?;

        self.write_user(oid, StoreError::post_not_found(user_id, post_id), |existing| {
            let slot = existing.iter_mut().find(|p| p.id == post_id)?;
            if *slot == post {
                return Some(false);
            }
            *slot = post;
            Some(true)
        })
        .await
    }

    async fn delete_post(&self, user_id: &str, post_id: &str) -> StoreResult<WriteOutcome> {
        let oid = queries::parse_user_id(user_id)?;

        self.write_user(oid, StoreError::post_not_found(user_id, post_id), |existing| {
            let before = existing.len();
            existing.retain(|p| p.id != post_id);
            if existing.len() == before {
                None
            } else {
                Some(true)
            }
        })
        .await
    }
}
