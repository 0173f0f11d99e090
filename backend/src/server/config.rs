//! HTTP server configuration object.

use std::net::SocketAddr;

use conduit::domain::TokenKey;
use conduit::outbound::persistence::DbPool;

/// Everything the server needs beyond the route table.
pub struct ServerConfig {
    pub(crate) bind_addr: SocketAddr,
    pub(crate) db_pool: DbPool,
    pub(crate) token_key: TokenKey,
}

impl ServerConfig {
    #[must_use]
    pub fn new(bind_addr: SocketAddr, db_pool: DbPool, token_key: TokenKey) -> Self {
        Self {
            bind_addr,
            db_pool,
            token_key,
        }
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
