// ============================================================================
// mongo_cruds - Users with embedded posts on MongoDB
// ============================================================================
//
// - models:  User / Post and the persisted record shape
// - store:   UserStorer trait, MongoDB and in-memory implementations
// - db:      scoped MongoDB session (client + database)
// - config:  CRUDS_* environment configuration
// - metrics: Prometheus instrumentation for store calls
//
// ============================================================================

pub mod config;
pub mod db;
pub mod metrics;
pub mod models;
pub mod store;

pub use config::StoreConfig;
pub use db::MongoSession;
pub use models::{Post, User};
pub use store::{MemoryUserStore, MongoUserStore, StoreError, UserStorer, WriteOutcome};
