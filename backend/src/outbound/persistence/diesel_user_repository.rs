//! PostgreSQL-backed `UserRepository`.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{AccountRecord, User, UserId};

use super::diesel_error_mapping::{DieselFailure, classify, constraints};
use super::models::{NewUserRow, UserChangeset, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel adapter for account rows.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

fn map_failure(failure: DieselFailure) -> UserPersistenceError {
    if failure.violates(constraints::USERS_USERNAME) {
        return UserPersistenceError::UsernameTaken;
    }
    if failure.violates(constraints::USERS_EMAIL) {
        return UserPersistenceError::EmailTaken;
    }
    match failure {
        DieselFailure::Connection { message } => UserPersistenceError::connection(message),
        other => UserPersistenceError::query(other.into_message()),
    }
}

fn map_diesel_error(operation: &'static str) -> impl Fn(diesel::result::Error) -> UserPersistenceError {
    move |error| map_failure(classify(error, operation))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn create(&self, account: &AccountRecord) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(users::table)
            .values(NewUserRow::from(account))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("insert user"))
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("select user by email"))?;
        Ok(row.map(UserRow::into_account))
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .find(id.as_uuid())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("select user by id"))?;
        Ok(row.map(UserRow::into_user))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<UserRow> = users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("select user by username"))?;
        Ok(row.map(UserRow::into_user))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(users::table.find(user.id.as_uuid()))
            .set(UserChangeset::from(user))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("update user"))?;
        if updated == 0 {
            return Err(UserPersistenceError::NotFound);
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
        let err = map_pool_error(PoolError::checkout("connection refused"));
        assert_eq!(err, UserPersistenceError::connection("connection refused"));
    }

    #[rstest]
    #[case(constraints::USERS_USERNAME, UserPersistenceError::UsernameTaken)]
    #[case(constraints::USERS_EMAIL, UserPersistenceError::EmailTaken)]
    fn unique_violations_name_the_taken_field(
        #[case] constraint: &str,
        #[case] expected: UserPersistenceError,
    ) {
        let failure = DieselFailure::UniqueViolation {
            constraint: Some(constraint.to_owned()),
        };
        assert_eq!(map_failure(failure), expected);
    }

    #[rstest]
    fn unknown_constraint_is_a_query_error() {
        let failure = DieselFailure::UniqueViolation {
            constraint: Some("users_pkey".to_owned()),
        };
        assert!(matches!(
            map_failure(failure),
            UserPersistenceError::Query { .. }
        ));
    }

    #[rstest]
    fn not_found_maps_to_query_error() {
        let err = map_diesel_error("select user")(diesel::result::Error::NotFound);
        assert_eq!(err, UserPersistenceError::query("record not found"));
    }
}
