//! Profile lookups and follow relationships.

use std::sync::Arc;

use tracing::{info, warn};

use crate::domain::ports::{FollowRepository, FollowRepositoryError, UserRepository};
use crate::domain::{Error, Profile, User, UserId};

/// Profile service backed by the user and follow repositories.
#[derive(Clone)]
pub struct ProfileService {
    users: Arc<dyn UserRepository>,
    follows: Arc<dyn FollowRepository>,
}

impl ProfileService {
    pub fn new(users: Arc<dyn UserRepository>, follows: Arc<dyn FollowRepository>) -> Self {
        Self { users, follows }
    }

    /// Show `username` as seen by `viewer`.
    ///
    /// A failing follow probe is logged and reported as "not following".
    pub async fn profile(&self, viewer: &UserId, username: &str) -> Result<Profile, Error> {
        let user = self.target(username, "Profile user not found").await?;
        let following = match self.follows.is_following(viewer, &user.id).await {
            Ok(following) => following,
            Err(err) => {
                warn!(user_id = %viewer, username, error = %err, "follow status check failed");
                false
            }
        };
        Ok(Profile { user, following })
    }

    /// Make `viewer` follow `username`. Following twice is harmless.
    pub async fn follow(&self, viewer: &UserId, username: &str) -> Result<Profile, Error> {
        let user = self.target(username, "User to follow not found").await?;
        self.follows.follow(viewer, &user.id).await?;
        info!(user_id = %viewer, username, "user followed");
        Ok(Profile {
            user,
            following: true,
        })
    }

    /// Make `viewer` stop following `username`. A missing edge is not an error.
    pub async fn unfollow(&self, viewer: &UserId, username: &str) -> Result<Profile, Error> {
        let user = self.target(username, "User to unfollow not found").await?;
        match self.follows.unfollow(viewer, &user.id).await {
            Ok(()) | Err(FollowRepositoryError::NotFound) => {}
            Err(err) => return Err(err.into()),
        }
        info!(user_id = %viewer, username, "user unfollowed");
        Ok(Profile {
            user,
            following: false,
        })
    }

    async fn target(&self, username: &str, missing: &str) -> Result<User, Error> {
        self.users
            .find_by_username(username)
            .await?
            .ok_or_else(|| Error::not_found(missing))
    }
}
