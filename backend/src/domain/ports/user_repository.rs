//! Port abstraction for account persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{AccountRecord, User, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection { message: String } => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "user repository query failed: {message}",
        /// Another account already holds the username.
        UsernameTaken => "username already exists",
        /// Another account already holds the email.
        EmailTaken => "email already exists",
        /// No account with the given identifier.
        NotFound => "user not found",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account.
    async fn create(&self, account: &AccountRecord) -> Result<(), UserPersistenceError>;

    /// Fetch an account, including its verifier, by email.
    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by username.
    async fn find_by_username(&self, username: &str)
    -> Result<Option<User>, UserPersistenceError>;

    /// Overwrite the mutable profile columns of an existing user.
    async fn update(&self, user: &User) -> Result<(), UserPersistenceError>;
}

impl From<UserPersistenceError> for crate::domain::Error {
    fn from(value: UserPersistenceError) -> Self {
        match value {
            UserPersistenceError::Connection { message } => {
                Self::service_unavailable(format!("user repository unavailable: {message}"))
            }
            other => Self::internal(format!("user repository error: {other}")),
        }
    }
}
