//! Account endpoints.
//!
//! ```text
//! POST /users         {"user":{"username":"alice1","email":"a@x.io","password":"secret"}}
//! POST /users/login   {"user":{"email":"a@x.io","password":"secret"}}
//! GET  /users
//! PUT  /users         {"user":{"bio":"hello"}}
//! POST /users/logout
//! ```

use actix_web::{HttpResponse, get, post, put, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    ApiResult, AuthenticatedAccount, Error, LoginCredentials, Registration, User, UserUpdate,
};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

const USERNAME: FieldName = FieldName::new("username");
const EMAIL: FieldName = FieldName::new("email");
const PASSWORD: FieldName = FieldName::new("password");

/// Registration payload. Every field is required.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct RegisterRequest {
    pub user: NewUser,
}

impl TryFrom<NewUser> for Registration {
    type Error = Error;

    fn try_from(value: NewUser) -> Result<Self, Self::Error> {
        let username = require(value.username, USERNAME)?;
        let email = require(value.email, EMAIL)?;
        let password = require(value.password, PASSWORD)?;
        Ok(Self::try_from_parts(&username, &email, &password)?)
    }
}

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct LoginUser {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct LoginRequest {
    pub user: LoginUser,
}

impl TryFrom<LoginUser> for LoginCredentials {
    type Error = Error;

    fn try_from(value: LoginUser) -> Result<Self, Self::Error> {
        let email = require(value.email, EMAIL)?;
        let password = require(value.password, PASSWORD)?;
        Ok(Self::try_from_parts(&email, &password)?)
    }
}

/// Profile update payload. Absent or empty fields are left unchanged.
#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdateUser {
    pub email: Option<String>,
    pub username: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct UpdateUserRequest {
    pub user: UpdateUser,
}

impl TryFrom<UpdateUser> for UserUpdate {
    type Error = Error;

    fn try_from(value: UpdateUser) -> Result<Self, Self::Error> {
        Ok(Self::try_from_parts(
            value.email.as_deref(),
            value.username.as_deref(),
            value.bio.as_deref(),
            value.image.as_deref(),
        )?)
    }
}

/// The caller's account together with their bearer token.
///
/// Absent bio and image render as empty strings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserBody {
    pub id: String,
    pub email: String,
    pub username: String,
    pub bio: String,
    pub image: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub token: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct UserResponse {
    pub user: UserBody,
}

impl UserResponse {
    fn new(user: User, token: String) -> Self {
        Self {
            user: UserBody {
                id: user.id.to_string(),
                email: user.email,
                username: user.username,
                bio: user.bio.unwrap_or_default(),
                image: user.image.unwrap_or_default(),
                created_at: user.created_at,
                updated_at: user.updated_at,
                token,
            },
        }
    }
}

impl From<AuthenticatedAccount> for UserResponse {
    fn from(account: AuthenticatedAccount) -> Self {
        Self::new(account.user, account.token)
    }
}

/// Register a new account and open its first session.
#[utoipa::path(
    post,
    path = "/users",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = UserResponse),
        (status = 422, description = "Invalid payload or taken username/email", body = ErrorEnvelope),
        (status = 503, description = "Database unavailable", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "register",
    security([])
)]
#[post("/users")]
pub async fn register(
    state: web::Data<HttpState>,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let registration = Registration::try_from(payload.into_inner().user)?;
    let account = state.accounts.register(registration).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(account)))
}

/// Exchange credentials for a bearer token.
#[utoipa::path(
    post,
    path = "/users/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = UserResponse),
        (status = 401, description = "Invalid credentials", body = ErrorEnvelope),
        (status = 422, description = "Invalid payload", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "login",
    security([])
)]
#[post("/users/login")]
pub async fn login(
    state: web::Data<HttpState>,
    payload: web::Json<LoginRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let credentials = LoginCredentials::try_from(payload.into_inner().user)?;
    let account = state.accounts.login(credentials).await?;
    Ok(web::Json(account.into()))
}

/// Return the authenticated user.
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "currentUser"
)]
#[get("/users")]
pub async fn current_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<web::Json<UserResponse>> {
    let user = state.accounts.current_user(caller.user_id()).await?;
    Ok(web::Json(UserResponse::new(user, caller.token().to_owned())))
}

/// Update the authenticated user's profile.
#[utoipa::path(
    put,
    path = "/users",
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "Updated user", body = UserResponse),
        (status = 400, description = "Username or email already taken", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 422, description = "Invalid payload", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "updateUser"
)]
#[put("/users")]
pub async fn update_user(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<UpdateUserRequest>,
) -> ApiResult<web::Json<UserResponse>> {
    let update = UserUpdate::try_from(payload.into_inner().user)?;
    let user = state.accounts.update(caller.user_id(), update).await?;
    Ok(web::Json(UserResponse::new(user, caller.token().to_owned())))
}

/// End the session behind the presented token.
#[utoipa::path(
    post,
    path = "/users/logout",
    responses(
        (status = 200, description = "Logged out"),
        (status = 400, description = "Session already gone", body = ErrorEnvelope),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope)
    ),
    tags = ["users"],
    operation_id = "logout"
)]
#[post("/users/logout")]
pub async fn logout(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
) -> ApiResult<HttpResponse> {
    state.accounts.logout(caller.token()).await?;
    Ok(HttpResponse::Ok().finish())
}
