//! Account use-cases: registration, login, session validation, profile
//! updates and logout.
//!
//! The service composes the user repository, the session store and the token
//! engine. Password derivation and verification run on the blocking pool.

use std::sync::Arc;

use mockable::Clock;
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::domain::ports::{SessionStore, SessionStoreError, UserPersistenceError, UserRepository};
use crate::domain::{
    AccountRecord, Error, LoginCredentials, PasswordVerifier, Registration, TokenEngine, User,
    UserId, UserUpdate, password,
};

pub(crate) const INVALID_CREDENTIALS: &str = "Invalid credentials";
pub(crate) const INVALID_OR_EXPIRED_TOKEN: &str = "Invalid or expired token";
pub(crate) const FAILED_TO_VALIDATE_TOKEN: &str = "Failed to validate token";
pub(crate) const FAILED_TO_RETRIEVE_USER: &str = "Failed to retrieve user data";

/// A user paired with the bearer token the client should present.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedAccount {
    pub user: User,
    pub token: String,
}

/// Account service backed by the user repository and session store.
#[derive(Clone)]
pub struct AccountService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionStore>,
    tokens: TokenEngine,
    clock: Arc<dyn Clock>,
}

impl AccountService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionStore>,
        tokens: TokenEngine,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            users,
            sessions,
            tokens,
            clock,
        }
    }

    /// Create an account and open its first session.
    pub async fn register(&self, registration: Registration) -> Result<AuthenticatedAccount, Error> {
        let secret = Zeroizing::new(registration.password().to_owned());
        let verifier = run_blocking(move || password::derive(&secret))
            .await?
            .map_err(|err| Error::internal(format!("password derivation failed: {err}")))?;

        let now = self.clock.utc();
        let user = User {
            id: UserId::random(),
            username: registration.username().to_owned(),
            email: registration.email().to_owned(),
            bio: None,
            image: None,
            created_at: now,
            updated_at: now,
        };
        let account = AccountRecord {
            user: user.clone(),
            verifier,
        };
        self.users.create(&account).await.map_err(|err| match err {
            UserPersistenceError::UsernameTaken | UserPersistenceError::EmailTaken => {
                warn!(username = %user.username, error = %err, "registration conflict");
                Error::validation_failed("Failed to register user")
            }
            other => other.into(),
        })?;

        let token = self.open_session(&user.id).await?;
        info!(user_id = %user.id, username = %user.username, "user registered");
        Ok(AuthenticatedAccount { user, token })
    }

    /// Check credentials and return the user's live token, minting one when
    /// the user has none or it has lapsed.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<AuthenticatedAccount, Error> {
        let Some(AccountRecord { user, verifier }) =
            self.users.find_by_email(credentials.email()).await?
        else {
            info!("login attempt for unknown email");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };

        if !check_password(credentials.password(), verifier).await? {
            info!(user_id = %user.id, "login attempt with wrong password");
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }

        let token = self.current_or_new_token(&user.id).await?;
        info!(user_id = %user.id, "user logged in");
        Ok(AuthenticatedAccount { user, token })
    }

    /// Validate a presented bearer token against the engine and the store.
    pub async fn authenticate(&self, token: &str) -> Result<UserId, Error> {
        let uid = self.tokens.decode(token).map_err(|err| {
            info!(error = %err, "bearer token rejected");
            Error::unauthorized(INVALID_OR_EXPIRED_TOKEN)
        })?;

        let record = self.sessions.by_token(token).await.map_err(|err| {
            warn!(user_id = %uid, error = %err, "session lookup failed");
            Error::unauthorized(FAILED_TO_VALIDATE_TOKEN)
        })?;

        if record.user_id != uid || !record.is_active_at(self.clock.utc()) {
            info!(user_id = %uid, "session mismatch or expired");
            return Err(Error::unauthorized(INVALID_OR_EXPIRED_TOKEN));
        }
        Ok(uid)
    }

    /// Fetch the authenticated user's account.
    pub async fn current_user(&self, user_id: &UserId) -> Result<User, Error> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| Error::unauthorized(FAILED_TO_RETRIEVE_USER))
    }

    /// Apply `update` to the authenticated user's profile.
    pub async fn update(&self, user_id: &UserId, update: UserUpdate) -> Result<User, Error> {
        let mut user = self.current_user(user_id).await?;
        let UserUpdate {
            email,
            username,
            bio,
            image,
        } = update;
        if let Some(email) = email {
            user.email = email;
        }
        if let Some(username) = username {
            user.username = username;
        }
        if bio.is_some() {
            user.bio = bio;
        }
        if image.is_some() {
            user.image = image;
        }
        user.updated_at = self.clock.utc();

        self.users.update(&user).await.map_err(|err| match err {
            UserPersistenceError::UsernameTaken
            | UserPersistenceError::EmailTaken
            | UserPersistenceError::NotFound => {
                warn!(user_id = %user_id, error = %err, "profile update rejected");
                Error::invalid_request("Failed to update user data")
            }
            other => other.into(),
        })?;
        Ok(user)
    }

    /// End the session holding `token`.
    pub async fn logout(&self, token: &str) -> Result<(), Error> {
        self.sessions.delete(token).await.map_err(|err| match err {
            SessionStoreError::NotFound => Error::invalid_request("Failed to logout user"),
            other => other.into(),
        })
    }

    async fn current_or_new_token(&self, user_id: &UserId) -> Result<String, Error> {
        match self.sessions.by_user(user_id).await {
            Ok(record) if record.is_active_at(self.clock.utc()) => Ok(record.token),
            Ok(_) | Err(SessionStoreError::NoResult) => self.open_session(user_id).await,
            Err(err) => Err(err.into()),
        }
    }

    async fn open_session(&self, user_id: &UserId) -> Result<String, Error> {
        let token = self
            .tokens
            .mint(user_id)
            .map_err(|err| Error::internal(format!("token minting failed: {err}")))?;
        self.sessions.insert(&token, user_id).await?;
        Ok(token)
    }
}

async fn check_password(candidate: &str, verifier: PasswordVerifier) -> Result<bool, Error> {
    let candidate = Zeroizing::new(candidate.to_owned());
    run_blocking(move || verifier.matches(&candidate)).await
}

async fn run_blocking<T, F>(work: F) -> Result<T, Error>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| Error::internal(format!("blocking task failed: {err}")))
}

#[cfg(test)]
#[path = "account_service_tests.rs"]
mod tests;
