//! Port for the server-side session store.
//!
//! Every issued bearer token has a record here; the authentication gate
//! only admits tokens the store knows about. Adapters keep at most one
//! record per user: inserting for a user that already has one replaces it.

use async_trait::async_trait;

use crate::domain::{SessionRecord, UserId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by session store adapters.
    pub enum SessionStoreError {
        /// Token or user id was empty.
        EmptyInput => "token or user id not provided",
        /// No record holds the given token.
        NotFound => "token not found",
        /// The user has no session record.
        NoResult => "no session for user",
        /// Store connection could not be established.
        Connection { message: String } => "session store connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "session store query failed: {message}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Record `token` for `user_id`, valid for the session lifetime from now.
    async fn insert(&self, token: &str, user_id: &UserId)
    -> Result<SessionRecord, SessionStoreError>;

    /// Look a record up by its token.
    async fn by_token(&self, token: &str) -> Result<SessionRecord, SessionStoreError>;

    /// Look the user's record up.
    async fn by_user(&self, user_id: &UserId) -> Result<SessionRecord, SessionStoreError>;

    /// Remove the record holding `token`.
    async fn delete(&self, token: &str) -> Result<(), SessionStoreError>;
}

impl From<SessionStoreError> for crate::domain::Error {
    fn from(value: SessionStoreError) -> Self {
        match value {
            SessionStoreError::Connection { message } => {
                Self::service_unavailable(format!("session store unavailable: {message}"))
            }
            other => Self::internal(format!("session store error: {other}")),
        }
    }
}
