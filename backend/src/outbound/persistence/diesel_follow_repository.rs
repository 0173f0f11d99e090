//! PostgreSQL-backed `FollowRepository` over the `subscriptions` table.

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::UserId;
use crate::domain::ports::{FollowRepository, FollowRepositoryError};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::SubscriptionRow;
use super::pool::{DbPool, PoolError};
use super::schema::subscriptions;

/// Diesel adapter for follow edges.
#[derive(Clone)]
pub struct DieselFollowRepository {
    pool: DbPool,
}

impl DieselFollowRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> FollowRepositoryError {
    FollowRepositoryError::connection(error.into_message())
}

fn map_diesel_error(
    operation: &'static str,
) -> impl Fn(diesel::result::Error) -> FollowRepositoryError {
    move |error| match classify(error, operation) {
        DieselFailure::Connection { message } => FollowRepositoryError::connection(message),
        other => FollowRepositoryError::query(other.into_message()),
    }
}

#[async_trait]
impl FollowRepository for DieselFollowRepository {
    async fn follow(&self, follower: &UserId, target: &UserId) -> Result<(), FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(subscriptions::table)
            .values(SubscriptionRow {
                sub_id: *follower.as_uuid(),
                target_user_id: *target.as_uuid(),
            })
            .on_conflict_do_nothing()
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("insert subscription"))
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<(), FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(subscriptions::table.find((follower.as_uuid(), target.as_uuid())))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("delete subscription"))?;
        if deleted == 0 {
            return Err(FollowRepositoryError::NotFound);
        }
        Ok(())
    }

    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(
            subscriptions::table.find((follower.as_uuid(), target.as_uuid())),
        ))
        .get_result(&mut conn)
        .await
        .map_err(map_diesel_error("probe subscription"))
    }
}
