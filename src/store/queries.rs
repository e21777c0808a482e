use mongodb::bson::{self, doc, oid::ObjectId, Document};

use crate::models::Post;

use super::errors::{StoreResult, ValidationError};

// ============================================================================
// Filter / Update Documents
// ============================================================================
//
// Each store operation is one filter plus (for writes) one update document.
// Kept free of I/O so the exact shape sent to MongoDB is testable.
//
// ============================================================================

/// Parse a user id in its hex form
pub fn parse_user_id(id: &str) -> Result<ObjectId, ValidationError> {
    ObjectId::parse_str(id).map_err(|e| ValidationError::MalformedId {
        id: id.to_string(),
        reason: e.to_string(),
    })
}

/// Largest like count a record can hold
pub const MAX_LIKES: u64 = i64::MAX as u64;

/// Reject posts whose fields cannot be stored as-is
pub fn validate_posts(posts: &[Post]) -> Result<(), ValidationError> {
    match posts.iter().find(|p| p.likes > MAX_LIKES) {
        Some(p) => Err(ValidationError::LikesOutOfRange {
            post_id: p.id.clone(),
            likes: p.likes,
        }),
        None => Ok(()),
    }
}

pub fn user_filter(user_id: ObjectId) -> Document {
    doc! { "_id": user_id }
}

/// Matches the user only if it currently holds a post with `post_id`
pub fn user_post_filter(user_id: ObjectId, post_id: &str) -> Document {
    doc! { "_id": user_id, "posts._id": post_id }
}

pub fn push_posts_update(posts: &[Post]) -> StoreResult<Document> {
    let each = bson::to_bson(posts)?;
    Ok(doc! { "$push": { "posts": { "$each": each } } })
}

/// Positional replace of the post matched by `user_post_filter`
pub fn replace_post_update(post: &Post) -> StoreResult<Document> {
    let replacement = bson::to_bson(post)?;
    Ok(doc! { "$set": { "posts.$": replacement } })
}

pub fn pull_post_update(post_id: &str) -> Document {
    doc! { "$pull": { "posts": { "_id": post_id } } }
}
