//! Port for follow edges between users.
use async_trait::async_trait;

use crate::domain::UserId;

use super::define_port_error;

define_port_error! {
    /// Errors raised by follow repository adapters.
    pub enum FollowRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "follow repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "follow repository query failed: {message}",
        /// No edge exists between the pair.
        NotFound => "subscription not found",
    }
}

/// Directed follow edges. `follower` follows `target`; at most one edge per
/// ordered pair.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FollowRepository: Send + Sync {
    /// Create the edge. Following twice is a no-op.
    async fn follow(&self, follower: &UserId, target: &UserId)
    -> Result<(), FollowRepositoryError>;

    /// Remove the edge, reporting [`FollowRepositoryError::NotFound`] when absent.
    async fn unfollow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<(), FollowRepositoryError>;

    /// Whether the edge exists.
    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, FollowRepositoryError>;
}

impl From<FollowRepositoryError> for crate::domain::Error {
    fn from(value: FollowRepositoryError) -> Self {
        match value {
            FollowRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("follow repository unavailable: {message}"))
            }
            other => Self::internal(format!("follow repository error: {other}")),
        }
    }
}
