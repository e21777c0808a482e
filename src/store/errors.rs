use std::time::Duration;

use mongodb::bson;

// ============================================================================
// Store Errors
// ============================================================================

/// Input rejected before any round trip to the store
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Malformed identifier {id:?}: {reason}")]
    MalformedId { id: String, reason: String },

    #[error("At least one post is required")]
    EmptyPosts,

    /// Likes are stored as a signed 64-bit integer
    #[error("Post {post_id:?} has {likes} likes, above the storable maximum")]
    LikesOutOfRange { post_id: String, likes: u64 },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// The filter matched no document: the user, or the post inside it, is absent.
    #[error("Not found: user {user_id}{}", post_suffix(.post_id))]
    NotFound {
        user_id: String,
        post_id: Option<String>,
    },

    /// A write matched its target but left it untouched
    #[error("No document modified for user {user_id}")]
    NotModified { user_id: String },

    #[error("Operation {operation} timed out after {after:?}")]
    Timeout {
        operation: &'static str,
        after: Duration,
    },

    #[error("Storage error: {0}")]
    Storage(#[from] mongodb::error::Error),

    #[error("Failed to encode record: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("Store returned a non-ObjectId key: {0}")]
    UnexpectedInsertedId(String),
}

fn post_suffix(post_id: &Option<String>) -> String {
    match post_id {
        Some(id) => format!(", post {}", id),
        None => String::new(),
    }
}

impl StoreError {
    pub fn user_not_found(user_id: &str) -> Self {
        Self::NotFound {
            user_id: user_id.to_string(),
            post_id: None,
        }
    }

    pub fn post_not_found(user_id: &str, post_id: &str) -> Self {
        Self::NotFound {
            user_id: user_id.to_string(),
            post_id: Some(post_id.to_string()),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_modified(&self) -> bool {
        matches!(self, Self::NotModified { .. })
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_messages() {
        let user_only = StoreError::user_not_found("abc");
        assert_eq!(user_only.to_string(), "Not found: user abc");

        let with_post = StoreError::post_not_found("abc", "p1");
        assert_eq!(with_post.to_string(), "Not found: user abc, post p1");
        assert!(with_post.is_not_found());
        assert!(!with_post.is_validation());
    }

    #[test]
    fn test_validation_converts_into_store_error() {
        let err: StoreError = ValidationError::EmptyPosts.into();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Validation failed: At least one post is required");
    }

    #[test]
    fn test_timeout_message_names_operation() {
        let err = StoreError::Timeout {
            operation: "find_by_id",
            after: Duration::from_millis(250),
        };
        assert_eq!(err.to_string(), "Operation find_by_id timed out after 250ms");
    }
}
