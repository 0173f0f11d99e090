//! In-memory port adapters.
//!
//! Each store mirrors the constraints of the PostgreSQL schema (unique
//! usernames, emails, tokens, slugs, one session per user) so handler and
//! scenario tests exercise the same failure paths as the Diesel adapters.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::Clock;
use uuid::Uuid;

use crate::domain::ports::{
    ArticleRepository, ArticleRepositoryError, FollowRepository, FollowRepositoryError,
    SessionStore, SessionStoreError, UserPersistenceError, UserRepository,
};
use crate::domain::{
    AccountRecord, Article, ArticleFilter, SessionRecord, User, UserId, session_lifetime,
};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(_) => panic!("in-memory store mutex"),
    }
}

/// Accounts keyed by user id.
#[derive(Default)]
pub struct InMemoryUserRepository {
    accounts: Mutex<HashMap<UserId, AccountRecord>>,
}

impl InMemoryUserRepository {
    fn conflict(
        accounts: &HashMap<UserId, AccountRecord>,
        user: &User,
    ) -> Option<UserPersistenceError> {
        let others = accounts.values().filter(|a| a.user.id != user.id);
        for other in others {
            if other.user.username == user.username {
                return Some(UserPersistenceError::UsernameTaken);
            }
            if other.user.email == user.email {
                return Some(UserPersistenceError::EmailTaken);
            }
        }
        None
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, account: &AccountRecord) -> Result<(), UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        if let Some(conflict) = Self::conflict(&accounts, &account.user) {
            return Err(conflict);
        }
        accounts.insert(account.user.id.clone(), account.clone());
        Ok(())
    }

    async fn find_by_email(
        &self,
        email: &str,
    ) -> Result<Option<AccountRecord>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .values()
            .find(|a| a.user.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.accounts).get(id).map(|a| a.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(lock(&self.accounts)
            .values()
            .find(|a| a.user.username == username)
            .map(|a| a.user.clone()))
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut accounts = lock(&self.accounts);
        if let Some(conflict) = Self::conflict(&accounts, user) {
            return Err(conflict);
        }
        let account = accounts
            .get_mut(&user.id)
            .ok_or(UserPersistenceError::NotFound)?;
        account.user = user.clone();
        Ok(())
    }
}

/// Session records, at most one per user.
pub struct InMemorySessionStore {
    clock: Arc<dyn Clock>,
    records: Mutex<Vec<SessionRecord>>,
}

impl InMemorySessionStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            records: Mutex::new(Vec::new()),
        }
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(
        &self,
        token: &str,
        user_id: &UserId,
    ) -> Result<SessionRecord, SessionStoreError> {
        if token.is_empty() || user_id.as_ref().is_empty() {
            return Err(SessionStoreError::EmptyInput);
        }
        let mut records = lock(&self.records);
        if records
            .iter()
            .any(|r| r.token == token && r.user_id != *user_id)
        {
            return Err(SessionStoreError::query("duplicate token"));
        }
        records.retain(|r| r.user_id != *user_id);

        let now = self.clock.utc();
        let record = SessionRecord {
            id: Uuid::new_v4(),
            token: token.to_owned(),
            created_at: now,
            end_date: now + session_lifetime(),
            user_id: user_id.clone(),
        };
        records.push(record.clone());
        Ok(record)
    }

    async fn by_token(&self, token: &str) -> Result<SessionRecord, SessionStoreError> {
        lock(&self.records)
            .iter()
            .find(|r| r.token == token)
            .cloned()
            .ok_or(SessionStoreError::NotFound)
    }

    async fn by_user(&self, user_id: &UserId) -> Result<SessionRecord, SessionStoreError> {
        lock(&self.records)
            .iter()
            .find(|r| r.user_id == *user_id)
            .cloned()
            .ok_or(SessionStoreError::NoResult)
    }

    async fn delete(&self, token: &str) -> Result<(), SessionStoreError> {
        let mut records = lock(&self.records);
        let before = records.len();
        records.retain(|r| r.token != token);
        if records.len() == before {
            return Err(SessionStoreError::NotFound);
        }
        Ok(())
    }
}

/// Follow edges as (follower, target) pairs.
#[derive(Default)]
pub struct InMemoryFollowRepository {
    edges: Mutex<HashSet<(UserId, UserId)>>,
}

impl InMemoryFollowRepository {
    /// Number of stored edges.
    pub fn len(&self) -> usize {
        lock(&self.edges).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl FollowRepository for InMemoryFollowRepository {
    async fn follow(&self, follower: &UserId, target: &UserId) -> Result<(), FollowRepositoryError> {
        lock(&self.edges).insert((follower.clone(), target.clone()));
        Ok(())
    }

    async fn unfollow(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<(), FollowRepositoryError> {
        if lock(&self.edges).remove(&(follower.clone(), target.clone())) {
            Ok(())
        } else {
            Err(FollowRepositoryError::NotFound)
        }
    }

    async fn is_following(
        &self,
        follower: &UserId,
        target: &UserId,
    ) -> Result<bool, FollowRepositoryError> {
        Ok(lock(&self.edges).contains(&(follower.clone(), target.clone())))
    }
}

/// Articles in insertion order.
///
/// Slugs registered with [`Self::hide_from_probe`] are reported free by
/// `slug_exists` but rejected by `insert`, simulating a concurrent writer
/// that claimed the slug between probe and insert.
#[derive(Default)]
pub struct InMemoryArticleRepository {
    articles: Mutex<Vec<Article>>,
    hidden: Mutex<HashSet<String>>,
}

impl InMemoryArticleRepository {
    pub fn hide_from_probe(&self, slug: impl Into<String>) {
        lock(&self.hidden).insert(slug.into());
    }
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ArticleRepositoryError> {
        Ok(lock(&self.articles).iter().any(|a| a.slug == slug))
    }

    async fn insert(&self, article: &Article) -> Result<(), ArticleRepositoryError> {
        if lock(&self.hidden).remove(&article.slug) {
            return Err(ArticleRepositoryError::slug_taken(article.slug.clone()));
        }
        let mut articles = lock(&self.articles);
        if articles.iter().any(|a| a.slug == article.slug) {
            return Err(ArticleRepositoryError::slug_taken(article.slug.clone()));
        }
        articles.push(article.clone());
        Ok(())
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>, ArticleRepositoryError> {
        let mut matching: Vec<Article> = lock(&self.articles)
            .iter()
            .filter(|a| filter.matches(a))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, ArticleRepositoryError> {
        Ok(lock(&self.articles).iter().find(|a| a.slug == slug).cloned())
    }

    async fn update(&self, article: &Article) -> Result<(), ArticleRepositoryError> {
        let mut articles = lock(&self.articles);
        let stored = articles
            .iter_mut()
            .find(|a| a.slug == article.slug)
            .ok_or_else(|| ArticleRepositoryError::not_found(article.slug.clone()))?;
        *stored = article.clone();
        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<(), ArticleRepositoryError> {
        let mut articles = lock(&self.articles);
        let before = articles.len();
        articles.retain(|a| a.slug != slug);
        if articles.len() == before {
            return Err(ArticleRepositoryError::not_found(slug));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArticleDraft;
    use crate::test_support::MutableClock;
    use chrono::{TimeDelta, Utc};
    use rstest::rstest;

    fn article(slug: &str) -> Article {
        ArticleDraft::try_from_parts("T", "d", "b", vec!["x".into()])
            .expect("draft")
            .into_article(slug.to_owned(), "alice1", Utc::now())
    }

    #[rstest]
    #[tokio::test]
    async fn session_insert_replaces_previous_record_for_user() {
        let clock = Arc::new(MutableClock::new(Utc::now()));
        let store = InMemorySessionStore::new(clock.clone());
        let user = UserId::random();

        store.insert("first", &user).await.expect("insert");
        clock.advance(TimeDelta::minutes(1));
        let second = store.insert("second", &user).await.expect("insert");

        assert_eq!(store.len(), 1);
        assert_eq!(store.by_user(&user).await.expect("record"), second);
        assert_eq!(store.by_token("first").await, Err(SessionStoreError::NotFound));
        assert_eq!(second.end_date - second.created_at, session_lifetime());
    }

    #[rstest]
    #[tokio::test]
    async fn session_insert_rejects_empty_token() {
        let store = InMemorySessionStore::new(Arc::new(MutableClock::new(Utc::now())));
        assert_eq!(
            store.insert("", &UserId::random()).await,
            Err(SessionStoreError::EmptyInput)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn article_store_round_trips_update_and_delete() {
        let store = InMemoryArticleRepository::default();
        let mut stored = article("t-1");
        store.insert(&stored).await.expect("insert");

        stored.body = "edited".to_owned();
        store.update(&stored).await.expect("update");
        let found = store.find_by_slug("t-1").await.expect("find");
        assert_eq!(found.map(|a| a.body), Some("edited".to_owned()));

        store.delete("t-1").await.expect("delete");
        assert_eq!(
            store.delete("t-1").await,
            Err(ArticleRepositoryError::not_found("t-1"))
        );
        assert_eq!(
            store.update(&stored).await,
            Err(ArticleRepositoryError::not_found("t-1"))
        );
    }

    #[rstest]
    #[tokio::test]
    async fn hidden_slug_is_free_to_probe_but_taken_on_insert() {
        let store = InMemoryArticleRepository::default();
        store.hide_from_probe("t-1");

        assert!(!store.slug_exists("t-1").await.expect("probe"));
        assert_eq!(
            store.insert(&article("t-1")).await,
            Err(ArticleRepositoryError::slug_taken("t-1"))
        );
    }
}
