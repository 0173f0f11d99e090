//! Test helpers for inbound HTTP components.
//!
//! [`TestContext`] wires the HTTP state over the in-memory ports and a
//! [`MutableClock`], keeping handles on the stores so tests can inspect them
//! after a request.

use std::sync::Arc;

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, Error, test as actix_test, web};
use chrono::{DateTime, TimeZone, Utc};
use mockable::Clock;
use serde_json::{Value, json};

use crate::Trace;
use crate::domain::{TokenEngine, TokenKey};
use crate::inbound::http::configure;
use crate::inbound::http::state::{HttpState, HttpStatePorts};
use crate::test_support::{
    InMemoryArticleRepository, InMemoryFollowRepository, InMemorySessionStore,
    InMemoryUserRepository, MutableClock,
};

pub(crate) const TEST_KEY: [u8; TokenKey::LEN] = [7; TokenKey::LEN];

pub(crate) fn epoch() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0)
        .single()
        .expect("valid fixed instant")
}

/// HTTP state plus handles on the stores behind it.
pub(crate) struct TestContext {
    pub state: web::Data<HttpState>,
    pub clock: Arc<MutableClock>,
    pub sessions: Arc<InMemorySessionStore>,
    pub follows: Arc<InMemoryFollowRepository>,
    pub articles: Arc<InMemoryArticleRepository>,
}

impl TestContext {
    pub(crate) fn new() -> Self {
        let clock = Arc::new(MutableClock::new(epoch()));
        let shared_clock: Arc<dyn Clock> = clock.clone();
        let key = TokenKey::from_bytes(&TEST_KEY).expect("test key");
        let sessions = Arc::new(InMemorySessionStore::new(shared_clock.clone()));
        let follows = Arc::new(InMemoryFollowRepository::default());
        let articles = Arc::new(InMemoryArticleRepository::default());
        let state = HttpState::from(HttpStatePorts {
            users: Arc::new(InMemoryUserRepository::default()),
            sessions: sessions.clone(),
            follows: follows.clone(),
            articles: articles.clone(),
            tokens: TokenEngine::new(key, shared_clock.clone()),
            clock: shared_clock,
        });
        Self {
            state: web::Data::new(state),
            clock,
            sessions,
            follows,
            articles,
        }
    }

    /// The application under test, routed exactly as in production.
    ///
    /// The returned app owns a clone of the state, so it does not borrow
    /// `self`.
    pub(crate) fn app(
        &self,
    ) -> App<
        impl ServiceFactory<
            ServiceRequest,
            Config = (),
            Response = ServiceResponse<impl MessageBody + use<>>,
            Error = Error,
            InitError = (),
        > + use<>,
    > {
        App::new()
            .app_data(self.state.clone())
            .wrap(Trace)
            .configure(configure)
    }
}

/// Call `app` and decode the JSON response body.
pub(crate) async fn call_json<S, B>(app: &S, req: Request) -> (u16, Value)
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let response = actix_test::call_service(app, req).await;
    let status = response.status().as_u16();
    let body = actix_test::read_body(response).await;
    let value = if body.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body).expect("JSON body")
    };
    (status, value)
}

/// Register `username` with a derived email and the password `secret`,
/// returning the issued token.
pub(crate) async fn register<S, B>(app: &S, username: &str) -> String
where
    S: Service<Request, Response = ServiceResponse<B>, Error = Error>,
    B: MessageBody,
{
    let req = actix_test::TestRequest::post()
        .uri("/users")
        .set_json(json!({"user": {
            "username": username,
            "email": format!("{username}@example.com"),
            "password": "secret",
        }}))
        .to_request();
    let (status, body) = call_json(app, req).await;
    assert_eq!(status, 201, "registration of {username} failed: {body}");
    body["user"]["token"]
        .as_str()
        .expect("token in registration response")
        .to_owned()
}

pub(crate) fn bearer(token: &str) -> (&'static str, String) {
    ("Authorization", format!("Bearer {token}"))
}

pub(crate) fn error_message(body: &Value) -> Option<&str> {
    body["errors"]["body"][0].as_str()
}
