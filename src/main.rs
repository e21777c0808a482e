use std::sync::Arc;

use anyhow::Context;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use mongo_cruds::metrics::{self, Metrics};
use mongo_cruds::{MongoSession, MongoUserStore, Post, StoreConfig, User, UserStorer, WriteOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    // Example: RUST_LOG=debug cargo run
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,mongo_cruds=debug"))
        )
        .init();

    tracing::info!("🚀 Starting MongoDB users/posts CRUD demo");

    let config = StoreConfig::from_env()?;

    // === 1. Metrics ===
    let metrics = Arc::new(Metrics::new()?);
    if let Some(port) = config.metrics_port {
        let registry = Arc::new(metrics.registry().clone());
        std::thread::spawn(move || {
            let result = actix_web::rt::System::new()
                .block_on(metrics::start_metrics_server(registry, port));
            if let Err(e) = result {
                tracing::error!("Metrics server error: {}", e);
            }
        });
    }

    // === 2. Session + store ===
    let session = MongoSession::connect(&config).await?;
    let store = MongoUserStore::new(session.users(), config.operation_timeout)
        .with_metrics(metrics.clone());

    let outcome = run_demo(&store).await;

    // === 3. Teardown, regardless of how the demo went ===
    if config.drop_on_exit {
        if let Err(e) = session.drop_database().await {
            tracing::error!(error = %e, "Failed to drop database");
        }
    }
    session.close().await;

    outcome?;
    tracing::info!("🎉 Done. Bye!");
    Ok(())
}

async fn run_demo(store: &dyn UserStorer) -> anyhow::Result<()> {
    let user = store
        .insert(User::new("tira", vec![Post::new("aaaa", "abccdcasc", 999)]))
        .await
        .context("store.insert")?;
    log_user("Inserted", &user);

    let another_post = Post::new("bbbb", "qqqqqq", 1111);
    let mut another_post2 = Post::new("cccc", "wwwwww", 2222);

    store
        .add_posts(&user.id, &[another_post, another_post2.clone()])
        .await
        .context("store.add_posts")?
        .ensure_modified(&user.id)
        .context("store.add_posts")?;
    log_user("After add_posts", &reload(store, &user.id).await?);

    another_post2.title = "my updated title".to_string();
    another_post2.body = "my updated body".to_string();
    let outcome = store
        .update_post(&user.id, &another_post2.id, another_post2.clone())
        .await
        .context("store.update_post")?;
    if outcome == WriteOutcome::Unchanged {
        tracing::info!(post_id = %another_post2.id, "Post already up to date");
    }
    log_user("After update_post", &reload(store, &user.id).await?);

    store
        .delete_post(&user.id, &another_post2.id)
        .await
        .context("store.delete_post")?;
    log_user("After delete_post", &reload(store, &user.id).await?);

    Ok(())
}

async fn reload(store: &dyn UserStorer, user_id: &str) -> anyhow::Result<User> {
    store
        .find_by_id(user_id)
        .await
        .with_context(|| format!("store.find_by_id {}", user_id))
}

fn log_user(step: &str, user: &User) {
    match serde_json::to_string(user) {
        Ok(json) => tracing::info!(step, post_count = user.posts.len(), user = %json, "User state"),
        Err(e) => tracing::warn!(step, error = %e, "Could not render user"),
    }
}
