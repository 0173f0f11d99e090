//! Domain primitives, services and ports.
//!
//! Purpose: hold the transport-agnostic core of the service. Inbound
//! adapters translate requests into the validated types defined here and
//! call the services; outbound adapters implement [`ports`].
//!
//! Public surface:
//! - Error / ErrorCode: transport-agnostic failure payload.
//! - TraceId: request-scoped correlation identifier.
//! - User / UserId / Profile / AccountRecord: account data model.
//! - Registration / LoginCredentials / UserUpdate: validated account inputs.
//! - Article / ArticleDraft / ArticleFilter: article data model.
//! - SessionRecord: server-side record of an issued token.
//! - TokenEngine / TokenKey: bearer token minting and decoding.
//! - AccountService / ProfileService / ArticleService: use-cases.

pub mod account_service;
pub mod article;
pub mod article_service;
pub mod auth;
pub mod error;
pub mod password;
pub mod ports;
pub mod profile_service;
pub mod session;
pub mod slug;
pub mod token;
pub mod trace_id;
pub mod user;

pub use self::account_service::{AccountService, AuthenticatedAccount};
pub use self::article::{Article, ArticleDraft, ArticleFilter, ArticleValidationError};
pub use self::article_service::ArticleService;
pub use self::auth::{
    CredentialValidationError, LoginCredentials, MIN_CREDENTIAL_LEN, Registration, UserUpdate,
};
pub use self::error::{Error, ErrorCode};
pub use self::password::{PasswordError, PasswordVerifier};
pub use self::profile_service::ProfileService;
pub use self::session::{SessionRecord, session_lifetime};
pub use self::token::{TokenEngine, TokenError, TokenKey, TokenKeyError};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{AccountRecord, Profile, User, UserId, UserValidationError};

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use conduit::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("Profile user not found"))
/// }
/// assert!(handler().is_err());
/// ```
pub type ApiResult<T> = Result<T, Error>;
