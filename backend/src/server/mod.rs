//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use std::sync::Arc;

use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use mockable::{Clock, DefaultClock};

use conduit::Trace;
#[cfg(debug_assertions)]
use conduit::doc::ApiDoc;
use conduit::domain::TokenEngine;
use conduit::inbound::http::configure;
use conduit::inbound::http::state::{HttpState, HttpStatePorts};
use conduit::outbound::persistence::{
    DieselArticleRepository, DieselFollowRepository, DieselSessionStore, DieselUserRepository,
};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Wire the Diesel adapters behind the domain services.
fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let clock: Arc<dyn Clock> = Arc::new(DefaultClock);
    let pool = config.db_pool.clone();
    let ports = HttpStatePorts {
        users: Arc::new(DieselUserRepository::new(pool.clone())),
        sessions: Arc::new(DieselSessionStore::new(pool.clone(), clock.clone())),
        follows: Arc::new(DieselFollowRepository::new(pool.clone())),
        articles: Arc::new(DieselArticleRepository::new(pool)),
        tokens: TokenEngine::new(config.token_key.clone(), clock.clone()),
        clock,
    };
    web::Data::new(HttpState::from(ports))
}

fn build_app(
    http_state: web::Data<HttpState>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let app = App::new()
        .app_data(http_state)
        .wrap(Trace)
        .configure(configure);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server over the configured database pool.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(config: ServerConfig) -> std::io::Result<Server> {
    let http_state = build_http_state(&config);
    let server = HttpServer::new(move || build_app(http_state.clone()))
        .bind(config.bind_addr())?
        .run();
    Ok(server)
}
