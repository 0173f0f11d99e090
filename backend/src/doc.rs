//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint with its request and response
//! shapes plus the bearer token security scheme. The document backs Swagger
//! UI in debug builds and is exported by `cargo run --bin openapi-dump`.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::inbound::http::articles::{
    ArticleBody, ArticleListResponse, ArticleResponse, AuthorBody, CreateArticleRequest,
    NewArticle,
};
use crate::inbound::http::error::{ErrorEnvelope, ErrorMessages};
use crate::inbound::http::profiles::{ProfileBody, ProfileResponse};
use crate::inbound::http::users::{
    LoginRequest, LoginUser, NewUser, RegisterRequest, UpdateUser, UpdateUserRequest, UserBody,
    UserResponse,
};

pub(crate) const BEARER_SCHEME: &str = "BearerToken";

/// Enrich the generated document with the bearer token security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            BEARER_SCHEME,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("PASETO")
                    .build(),
            ),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "Conduit API",
        description = "Blogging backend: accounts, bearer sessions, follows, and articles."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("BearerToken" = [])),
    paths(
        crate::inbound::http::users::register,
        crate::inbound::http::users::login,
        crate::inbound::http::users::current_user,
        crate::inbound::http::users::update_user,
        crate::inbound::http::users::logout,
        crate::inbound::http::profiles::get_profile,
        crate::inbound::http::profiles::follow,
        crate::inbound::http::profiles::unfollow,
        crate::inbound::http::articles::list_articles,
        crate::inbound::http::articles::create_article,
    ),
    components(schemas(
        ErrorEnvelope,
        ErrorMessages,
        RegisterRequest,
        NewUser,
        LoginRequest,
        LoginUser,
        UpdateUserRequest,
        UpdateUser,
        UserResponse,
        UserBody,
        ProfileResponse,
        ProfileBody,
        CreateArticleRequest,
        NewArticle,
        ArticleResponse,
        ArticleListResponse,
        ArticleBody,
        AuthorBody,
    )),
    tags(
        (name = "users", description = "Registration, login, and the caller's account"),
        (name = "profiles", description = "Public profiles and follow edges"),
        (name = "articles", description = "Publishing and listing articles")
    )
)]
pub struct ApiDoc;
