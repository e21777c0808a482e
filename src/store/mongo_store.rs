use std::future::{Future, IntoFuture};
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mongodb::bson::Document;
use mongodb::Collection;

use crate::metrics::Metrics;
use crate::models::{Post, User, UserDocument};

use super::errors::{StoreError, StoreResult, ValidationError};
use super::queries;
use super::{UserStorer, WriteOutcome};

// ============================================================================
// MongoDB User Store
// ============================================================================
//
// One round trip per call:
// - insert       -> insertOne
// - find_by_id   -> findOne { _id }
// - add_posts    -> updateOne $push/$each
// - update_post  -> updateOne { _id, posts._id } $set posts.$
// - delete_post  -> updateOne { _id, posts._id } $pull
//
// matched_count == 0 means the target is missing; modified_count == 0 on a
// match means the write changed nothing. Failures are returned as-is.
//
// ============================================================================

pub struct MongoUserStore {
    users: Collection<UserDocument>,
    operation_timeout: Duration,
    metrics: Option<Arc<Metrics>>,
}

impl MongoUserStore {
    pub fn new(users: Collection<UserDocument>, operation_timeout: Duration) -> Self {
        Self {
            users,
            operation_timeout,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Run a driver call under the operation timeout
    async fn bounded<T, F>(&self, operation: &'static str, call: F) -> StoreResult<T>
    where
        F: Future<Output = Result<T, mongodb::error::Error>>,
    {
        match tokio::time::timeout(self.operation_timeout, call).await {
            Ok(result) => Ok(result?),
            Err(_) => Err(StoreError::Timeout {
                operation,
                after: self.operation_timeout,
            }),
        }
    }

    async fn apply_update<N>(
        &self,
        operation: &'static str,
        filter: Document,
        update: Document,
        not_found: N,
    ) -> StoreResult<WriteOutcome>
    where
        N: FnOnce() -> StoreError,
    {
        tracing::debug!(operation, filter = %filter, update = %update, "Sending update");

        let result = self
            .bounded(operation, self.users.update_one(filter, update).into_future())
            .await?;

        if result.matched_count == 0 {
            return Err(not_found());
        }

        Ok(WriteOutcome::from_modified_count(result.modified_count))
    }

    fn observe<T, L>(&self, operation: &'static str, started: Instant, result: &StoreResult<T>, label: L)
    where
        L: FnOnce(&T) -> &'static str,
    {
        let outcome = match result {
            Ok(value) => label(value),
            Err(e) => {
                tracing::warn!(operation, error = %e, "Store operation failed");
                error_label(e)
            }
        };

        if let Some(metrics) = &self.metrics {
            metrics.record_operation(operation, outcome, started.elapsed().as_secs_f64());
        }
    }
}

fn error_label(err: &StoreError) -> &'static str {
    match err {
        StoreError::Validation(_) => "invalid",
        StoreError::NotFound { .. } => "not_found",
        StoreError::NotModified { .. } => "not_modified",
        StoreError::Timeout { .. } => "timeout",
        _ => "error",
    }
}

#[async_trait]
impl UserStorer for MongoUserStore {
    async fn insert(&self, user: User) -> StoreResult<User> {
        let started = Instant::now();

        let result: StoreResult<User> = async {
            queries::validate_posts(&user.posts)?;
            let record = UserDocument::for_insert(&user);
            let inserted = self
                .bounded("insert", self.users.insert_one(&record).into_future())
                .await?;

            let oid = inserted
                .inserted_id
                .as_object_id()
                .ok_or_else(|| StoreError::UnexpectedInsertedId(inserted.inserted_id.to_string()))?;

            Ok(User {
                id: oid.to_hex(),
                ..user
            })
        }
        .await;

        self.observe("insert", started, &result, |_| "ok");

        if let Ok(created) = &result {
            tracing::info!(
                user_id = %created.id,
                username = %created.username,
                post_count = created.posts.len(),
                "✅ Inserted user"
            );
        }

        result
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<User> {
        let started = Instant::now();

        let result: StoreResult<User> = async {
            let oid = queries::parse_user_id(id)?;
            let found = self
                .bounded("find_by_id", self.users.find_one(queries::user_filter(oid)).into_future())
                .await?;

            found
                .map(User::from)
                .ok_or_else(|| StoreError::user_not_found(id))
        }
        .await;

        self.observe("find_by_id", started, &result, |_| "ok");

        if let Ok(user) = &result {
            tracing::debug!(user_id = %user.id, post_count = user.posts.len(), "Loaded user");
        }

        result
    }

    async fn add_posts(&self, user_id: &str, posts: &[Post]) -> StoreResult<WriteOutcome> {
        let started = Instant::now();

        let result: StoreResult<WriteOutcome> = async {
            let oid = queries::parse_user_id(user_id)?;
            if posts.is_empty() {
                return Err(ValidationError::EmptyPosts.into());
            }
            queries::validate_posts(posts)?;

            let update = queries::push_posts_update(posts)?;
            self.apply_update("add_posts", queries::user_filter(oid), update, || {
                StoreError::user_not_found(user_id)
            })
            .await
        }
        .await;

        self.observe("add_posts", started, &result, WriteOutcome::as_str);

        if let Ok(outcome) = &result {
            if let Some(metrics) = &self.metrics {
                metrics.record_posts_appended(posts.len());
            }
            tracing::info!(
                user_id,
                post_count = posts.len(),
                outcome = outcome.as_str(),
                "Appended posts"
            );
        }

        result
    }

    async fn update_post(&self, user_id: &str, post_id: &str, post: Post) -> StoreResult<WriteOutcome> {
        let started = Instant::now();

        let result: StoreResult<WriteOutcome> = async {
            let oid = queries::parse_user_id(user_id)?;
            queries::validate_posts(std::slice::from_ref(&post))?;
            let update = queries::replace_post_update(&post)?;
            self.apply_update(
                "update_post",
                queries::user_post_filter(oid, post_id),
                update,
                || StoreError::post_not_found(user_id, post_id),
            )
            .await
        }
        .await;

        self.observe("update_post", started, &result, WriteOutcome::as_str);

        if let Ok(outcome) = &result {
            tracing::info!(user_id, post_id, outcome = outcome.as_str(), "Updated post");
        }

        result
    }

    async fn delete_post(&self, user_id: &str, post_id: &str) -> StoreResult<WriteOutcome> {
        let started = Instant::now();

        let result: StoreResult<WriteOutcome> = async {
            let oid = queries::parse_user_id(user_id)?;
            self.apply_update(
                "delete_post",
                queries::user_post_filter(oid, post_id),
                queries::pull_post_update(post_id),
                || StoreError::post_not_found(user_id, post_id),
            )
            .await
        }
        .await;

        self.observe("delete_post", started, &result, WriteOutcome::as_str);

        if let Ok(outcome) = &result {
            tracing::info!(user_id, post_id, outcome = outcome.as_str(), "Deleted post");
        }

        result
    }
}
