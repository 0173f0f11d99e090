//! PostgreSQL persistence adapters using Diesel.
//!
//! Adapters only translate between Diesel rows and domain types. Row structs
//! (`models.rs`) and table definitions (`schema.rs`) stay private to this
//! module; every database failure is mapped onto the matching port error.
//!
//! ```ignore
//! use conduit::outbound::persistence::{DbPool, DieselUserRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/conduit")).await?;
//! let users = DieselUserRepository::new(pool);
//! ```

mod diesel_article_repository;
mod diesel_error_mapping;
mod diesel_follow_repository;
mod diesel_session_store;
mod diesel_user_repository;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_article_repository::DieselArticleRepository;
pub use diesel_follow_repository::DieselFollowRepository;
pub use diesel_session_store::DieselSessionStore;
pub use diesel_user_repository::DieselUserRepository;
pub use migrations::{MigrationError, run_pending_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
