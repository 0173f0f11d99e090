//! Profile and follow endpoints.

use actix_web::{delete, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{ApiResult, Profile};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;

/// Public view of a user as seen by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileBody {
    pub id: String,
    pub username: String,
    pub bio: String,
    pub image: String,
    pub following: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub profile: ProfileBody,
}

impl From<Profile> for ProfileResponse {
    fn from(Profile { user, following }: Profile) -> Self {
        Self {
            profile: ProfileBody {
                id: user.id.to_string(),
                username: user.username,
                bio: user.bio.unwrap_or_default(),
                image: user.image.unwrap_or_default(),
                following,
                created_at: user.created_at,
                updated_at: user.updated_at,
            },
        }
    }
}

#[utoipa::path(
    get,
    path = "/profiles/{username}",
    params(("username" = String, Path, description = "Profile owner")),
    responses(
        (status = 200, description = "Profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 404, description = "No such user", body = ErrorEnvelope)
    ),
    tags = ["profiles"],
    operation_id = "getProfile"
)]
#[get("/profiles/{username}")]
pub async fn get_profile(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile = state.profiles.profile(caller.user_id(), &path).await?;
    Ok(web::Json(profile.into()))
}

/// Follow `username`. Following twice is harmless.
#[utoipa::path(
    post,
    path = "/profiles/{username}/follow",
    params(("username" = String, Path, description = "User to follow")),
    responses(
        (status = 200, description = "Followed profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 404, description = "No such user", body = ErrorEnvelope)
    ),
    tags = ["profiles"],
    operation_id = "followProfile"
)]
#[post("/profiles/{username}/follow")]
pub async fn follow(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile = state.profiles.follow(caller.user_id(), &path).await?;
    Ok(web::Json(profile.into()))
}

/// Stop following `username`. Succeeds when no edge exists.
#[utoipa::path(
    delete,
    path = "/profiles/{username}/unfollow",
    params(("username" = String, Path, description = "User to unfollow")),
    responses(
        (status = 200, description = "Unfollowed profile", body = ProfileResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 404, description = "No such user", body = ErrorEnvelope)
    ),
    tags = ["profiles"],
    operation_id = "unfollowProfile"
)]
#[delete("/profiles/{username}/unfollow")]
pub async fn unfollow(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    path: web::Path<String>,
) -> ApiResult<web::Json<ProfileResponse>> {
    let profile = state.profiles.unfollow(caller.user_id(), &path).await?;
    Ok(web::Json(profile.into()))
}
