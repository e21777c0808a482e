use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

// ============================================================================
// Domain Models
// ============================================================================

/// A user with its posts embedded inline.
///
/// `id` is the hex form of the store-assigned ObjectId and stays empty until
/// the user has been inserted.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Default)]
pub struct User {
    pub id: String,
    pub username: String,
    pub posts: Vec<Post>,
}

impl User {
    pub fn new(username: impl Into<String>, posts: Vec<Post>) -> Self {
        Self {
            id: String::new(),
            username: username.into(),
            posts,
        }
    }

    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == post_id)
    }
}

/// A post owned by exactly one user. The id is chosen by the caller.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Default)]
pub struct Post {
    #[serde(rename = "_id", default)]
    pub id: String,
    pub title: String,
    pub body: String,
    pub likes: u64,
}

impl Post {
    /// Build a post with a freshly generated id
    pub fn new(title: impl Into<String>, body: impl Into<String>, likes: u64) -> Self {
        Self {
            id: ObjectId::new().to_hex(),
            title: title.into(),
            body: body.into(),
            likes,
        }
    }
}

// ============================================================================
// Persisted Record
// ============================================================================

/// Shape of a user as stored in the collection.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub username: String,
    #[serde(default)]
    pub posts: Vec<Post>,
}

impl UserDocument {
    /// Build the record to insert. Any id already on the user is dropped so
    /// the store assigns one.
    pub fn for_insert(user: &User) -> Self {
        Self {
            id: None,
            username: user.username.clone(),
            posts: user.posts.clone(),
        }
    }
}

impl From<UserDocument> for User {
    fn from(doc: UserDocument) -> Self {
        Self {
            id: doc.id.map(|oid| oid.to_hex()).unwrap_or_default(),
            username: doc.username,
            posts: doc.posts,
        }
    }
}
