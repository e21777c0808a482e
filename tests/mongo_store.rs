//! Round trips against a live MongoDB.
//!
//! Ignored by default. Point CRUDS_MONGODB_URI at a disposable deployment and
//! run `cargo test -- --ignored`.

use std::time::{SystemTime, UNIX_EPOCH};

use mongo_cruds::store::WriteOutcome;
use mongo_cruds::{MongoSession, MongoUserStore, Post, StoreConfig, User, UserStorer};

fn post(id: &str, title: &str, likes: u64) -> Post {
    Post {
        id: id.to_string(),
        title: title.to_string(),
        body: format!("body of {}", id),
        likes,
    }
}

async fn scratch_session(name: &str) -> MongoSession {
    let nanos = SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_nanos();
    let mut config = StoreConfig::from_env().unwrap();
    config.database = format!("cruds_test_{}_{}", name, nanos);
    MongoSession::connect(&config).await.unwrap()
}

async fn teardown(session: MongoSession) {
    session.drop_database().await.unwrap();
    session.close().await;
}

fn store_for(session: &MongoSession) -> MongoUserStore {
    MongoUserStore::new(session.users(), StoreConfig::default().operation_timeout)
}

fn post_ids(user: &User) -> Vec<String> {
    user.posts.iter().map(|p| p.id.clone()).collect()
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_full_post_lifecycle() {
    let session = scratch_session("lifecycle").await;
    let store = store_for(&session);

    let input = User::new("tira", vec![post("p1", "aaaa", 999)]);
    let user = store.insert(input.clone()).await.unwrap();
    assert!(!user.id.is_empty());
    assert_eq!(store.find_by_id(&user.id).await.unwrap(), user);

    let outcome = store
        .add_posts(&user.id, &[post("p2", "bbbb", 1111), post("p3", "cccc", 2222)])
        .await
        .unwrap();
    assert_eq!(outcome, WriteOutcome::Modified);
    let found = store.find_by_id(&user.id).await.unwrap();
    assert_eq!(post_ids(&found), vec!["p1", "p2", "p3"]);

    let replacement = post("p3", "my updated title", 2222);
    let outcome = store.update_post(&user.id, "p3", replacement.clone()).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Modified);
    let outcome = store.update_post(&user.id, "p3", replacement.clone()).await.unwrap();
    assert_eq!(outcome, WriteOutcome::Unchanged);

    let found = store.find_by_id(&user.id).await.unwrap();
    assert_eq!(found.posts[2], replacement);
    assert_eq!(found.posts[0], input.posts[0]);

    store.delete_post(&user.id, "p2").await.unwrap();
    let found = store.find_by_id(&user.id).await.unwrap();
    assert_eq!(post_ids(&found), vec!["p1", "p3"]);

    teardown(session).await;
}

#[tokio::test]
#[ignore = "requires a running MongoDB"]
async fn test_missing_targets_are_not_found() {
    let session = scratch_session("missing").await;
    let store = store_for(&session);

    let missing = "65a000000000000000000000";
    assert!(store.find_by_id(missing).await.unwrap_err().is_not_found());
    assert!(store.add_posts(missing, &[post("p1", "t", 1)]).await.unwrap_err().is_not_found());
    assert!(store.update_post(missing, "p1", post("p1", "t", 1)).await.unwrap_err().is_not_found());
    assert!(store.delete_post(missing, "p1").await.unwrap_err().is_not_found());

    let user = store.insert(User::new("tira", vec![])).await.unwrap();
    assert!(store.delete_post(&user.id, "ghost").await.unwrap_err().is_not_found());

    assert!(store.find_by_id("xyz").await.unwrap_err().is_validation());

    teardown(session).await;
}
