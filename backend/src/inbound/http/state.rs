//! Shared HTTP adapter state.
//!
//! Handlers receive this through `actix_web::web::Data` and only talk to the
//! domain services, so tests can wire in-memory ports without any I/O.

use std::sync::Arc;

use mockable::Clock;

use crate::domain::ports::{ArticleRepository, FollowRepository, SessionStore, UserRepository};
use crate::domain::{AccountService, ArticleService, ProfileService, TokenEngine};

/// Parameter object bundling the driven ports and shared collaborators.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub users: Arc<dyn UserRepository>,
    pub sessions: Arc<dyn SessionStore>,
    pub follows: Arc<dyn FollowRepository>,
    pub articles: Arc<dyn ArticleRepository>,
    pub tokens: TokenEngine,
    pub clock: Arc<dyn Clock>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub accounts: AccountService,
    pub profiles: ProfileService,
    pub articles: ArticleService,
}

impl HttpState {
    pub fn new(accounts: AccountService, profiles: ProfileService, articles: ArticleService) -> Self {
        Self {
            accounts,
            profiles,
            articles,
        }
    }
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            users,
            sessions,
            follows,
            articles,
            tokens,
            clock,
        } = ports;
        Self::new(
            AccountService::new(users.clone(), sessions, tokens, clock.clone()),
            ProfileService::new(users.clone(), follows),
            ArticleService::new(articles, users, clock),
        )
    }
}
