//! PostgreSQL-backed `SessionStore` over the `tokens` table.
//!
//! `insert` upserts on the `user_id` unique constraint, so logging in again
//! replaces the user's previous record instead of adding a second one.

use std::sync::Arc;

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::upsert::excluded;
use diesel_async::RunQueryDsl;
use mockable::Clock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::{SessionRecord, UserId, session_lifetime};

use super::diesel_error_mapping::{DieselFailure, classify};
use super::models::{NewTokenRow, TokenRow};
use super::pool::{DbPool, PoolError};
use super::schema::tokens;

/// Diesel adapter for session records.
#[derive(Clone)]
pub struct DieselSessionStore {
    pool: DbPool,
    clock: Arc<dyn Clock>,
}

impl DieselSessionStore {
    /// `clock` stamps `created_at` and derives `end_date`.
    pub fn new(pool: DbPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }
}

fn map_pool_error(error: PoolError) -> SessionStoreError {
    SessionStoreError::connection(error.into_message())
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> SessionStoreError {
    move |error| match classify(error, operation) {
        DieselFailure::Connection { message } => SessionStoreError::connection(message),
        other => SessionStoreError::query(other.into_message()),
    }
}

#[async_trait]
impl SessionStore for DieselSessionStore {
    async fn insert(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<SessionRecord, SessionStoreError> {
        if token.is_empty() || user_id.as_ref().is_empty() {
            return Err(SessionStoreError::EmptyInput);
        }

        let now = self.clock.utc();
        let row = NewTokenRow {
            id: Uuid::new_v4(),
            token,
            created_at: now,
            end_date: now + session_lifetime(),
            user_id: *user_id.as_uuid(),
        };

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let stored: TokenRow = diesel::insert_into(tokens::table)
            .values(&row)
            .on_conflict(tokens::user_id)
            .do_update()
            .set((
                tokens::id.eq(excluded(tokens::id)),
                tokens::token.eq(excluded(tokens::token)),
                tokens::created_at.eq(excluded(tokens::created_at)),
                tokens::end_date.eq(excluded(tokens::end_date)),
            ))
            .returning(TokenRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("upsert session"))?;

        debug!(user_id = %user_id, end_date = %stored.end_date, "session stored");
        Ok(stored.into())
    }

    async fn by_token(&self, token: &str) -> Result<SessionRecord, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        tokens::table
            .filter(tokens::token.eq(token))
            .select(TokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("select session by token"))?
            .map(SessionRecord::from)
            .ok_or(SessionStoreError::NotFound)
    }

    async fn by_user(&self, user_id: &UserId) -> Result<SessionRecord, SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        tokens::table
            .filter(tokens::user_id.eq(user_id.as_uuid()))
            .select(TokenRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("select session by user"))?
            .map(SessionRecord::from)
            .ok_or(SessionStoreError::NoResult)
    }

    async fn delete(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(tokens::table.filter(tokens::token.eq(token)))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("delete session"))?;
        if deleted == 0 {
            return Err(SessionStoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        assert_eq!(
            map_pool_error(PoolError::build("bad url")),
            SessionStoreError::connection("bad url")
        );
    }

    #[rstest]
    fn diesel_not_found_is_a_query_error() {
        let err = map_diesel_error("select session")(diesel::result::Error::NotFound);
        assert_eq!(err, SessionStoreError::query("record not found"));
    }

    #[rstest]
    fn token_row_converts_to_record() {
        let now = chrono::Utc::now();
        let user = Uuid::new_v4();
        let record: SessionRecord = TokenRow {
            id: Uuid::new_v4(),
            token: "v2.local.x".to_owned(),
            created_at: now,
            end_date: now + session_lifetime(),
            user_id: user,
        }
        .into();

        assert_eq!(record.user_id.as_uuid(), &user);
        assert!(record.is_active_at(now));
    }
}
