//! Domain ports and supporting types for the hexagonal boundary.
//!
//! Driven adapters (Diesel-backed stores in production, in-memory fakes in
//! tests) implement these traits. Each port reports failures through its own
//! typed error so services can map them onto HTTP-facing [`crate::domain::Error`]
//! values without inspecting adapter internals.

mod macros;
pub(crate) use macros::define_port_error;

mod article_repository;
mod follow_repository;
mod session_store;
mod user_repository;

#[cfg(test)]
pub use article_repository::MockArticleRepository;
pub use article_repository::{ArticleRepository, ArticleRepositoryError};
#[cfg(test)]
pub use follow_repository::MockFollowRepository;
pub use follow_repository::{FollowRepository, FollowRepositoryError};
#[cfg(test)]
pub use session_store::MockSessionStore;
pub use session_store::{SessionStore, SessionStoreError};
#[cfg(test)]
pub use user_repository::MockUserRepository;
pub use user_repository::{UserPersistenceError, UserRepository};
