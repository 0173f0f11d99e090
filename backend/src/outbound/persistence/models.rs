//! Internal Diesel row structs.
//!
//! These never leave the persistence layer; adapters convert them to and from
//! domain types at the port boundary.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{article, subscriptions, tokens, users};
use crate::domain::{AccountRecord, Article, PasswordVerifier, SessionRecord, User, UserId};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub password_salt: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRow {
    pub(crate) fn into_user(self) -> User {
        User {
            id: UserId::from_uuid(self.id),
            username: self.username,
            email: self.email,
            bio: self.bio,
            image: self.image,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub(crate) fn into_account(self) -> AccountRecord {
        let verifier = PasswordVerifier::new(&self.password_hash, &self.password_salt);
        AccountRecord {
            user: self.into_user(),
            verifier,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub id: Uuid,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub password_salt: &'a str,
    pub bio: Option<&'a str>,
    pub image: Option<&'a str>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a AccountRecord> for NewUserRow<'a> {
    fn from(account: &'a AccountRecord) -> Self {
        let user = &account.user;
        Self {
            id: *user.id.as_uuid(),
            username: &user.username,
            email: &user.email,
            password_hash: account.verifier.hash(),
            password_salt: account.verifier.salt(),
            bio: user.bio.as_deref(),
            image: user.image.as_deref(),
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Profile columns overwritten by an account update. `None` writes NULL.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
#[diesel(treat_none_as_null = true)]
pub(crate) struct UserChangeset<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub bio: Option<&'a str>,
    pub image: Option<&'a str>,
    pub updated_at: DateTime<Utc>,
}

impl<'a> From<&'a User> for UserChangeset<'a> {
    fn from(user: &'a User) -> Self {
        Self {
            username: &user.username,
            email: &user.email,
            bio: user.bio.as_deref(),
            image: user.image.as_deref(),
            updated_at: user.updated_at,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = tokens)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct TokenRow {
    pub id: Uuid,
    pub token: String,
    pub created_at: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_id: Uuid,
}

impl From<TokenRow> for SessionRecord {
    fn from(row: TokenRow) -> Self {
        Self {
            id: row.id,
            token: row.token,
            created_at: row.created_at,
            end_date: row.end_date,
            user_id: UserId::from_uuid(row.user_id),
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = tokens)]
pub(crate) struct NewTokenRow<'a> {
    pub id: Uuid,
    pub token: &'a str,
    pub created_at: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub user_id: Uuid,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subscriptions)]
pub(crate) struct SubscriptionRow {
    pub sub_id: Uuid,
    pub target_user_id: Uuid,
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = article)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct ArticleRow {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub taglist: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorites_count: i32,
    pub author: String,
}

impl From<ArticleRow> for Article {
    fn from(row: ArticleRow) -> Self {
        Self {
            slug: row.slug,
            title: row.title,
            description: row.description,
            body: row.body,
            tag_list: row.taglist,
            author: row.author,
            favorites_count: row.favorites_count,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insert and full-overwrite shape of an article.
#[derive(Debug, Clone, Insertable, AsChangeset)]
#[diesel(table_name = article)]
#[diesel(primary_key(slug))]
pub(crate) struct ArticleRecordRow<'a> {
    pub slug: &'a str,
    pub title: &'a str,
    pub description: &'a str,
    pub body: &'a str,
    pub taglist: &'a [String],
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub favorites_count: i32,
    pub author: &'a str,
}

impl<'a> From<&'a Article> for ArticleRecordRow<'a> {
    fn from(value: &'a Article) -> Self {
        Self {
            slug: &value.slug,
            title: &value.title,
            description: &value.description,
            body: &value.body,
            taglist: &value.tag_list,
            created_at: value.created_at,
            updated_at: value.updated_at,
            favorites_count: value.favorites_count,
            author: &value.author,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user_row() -> UserRow {
        let now = Utc::now();
        UserRow {
            id: Uuid::new_v4(),
            username: "alice1".to_owned(),
            email: "a@x.io".to_owned(),
            password_hash: "hash".to_owned(),
            password_salt: "salt".to_owned(),
            bio: None,
            image: Some("https://img".to_owned()),
            created_at: now,
            updated_at: now,
        }
    }

    #[rstest]
    fn user_row_keeps_verifier_columns_in_account() {
        let row = user_row();
        let id = row.id;
        let account = row.into_account();

        assert_eq!(account.user.id.as_uuid(), &id);
        assert_eq!(account.verifier.hash(), "hash");
        assert_eq!(account.verifier.salt(), "salt");
        assert_eq!(account.user.image.as_deref(), Some("https://img"));
    }

    #[rstest]
    fn new_user_row_borrows_account_fields() {
        let account = user_row().into_account();
        let row = NewUserRow::from(&account);

        assert_eq!(row.id, *account.user.id.as_uuid());
        assert_eq!(row.password_hash, "hash");
        assert_eq!(row.bio, None);
    }

    #[rstest]
    fn article_row_maps_taglist_to_tag_list() {
        let now = Utc::now();
        let article: Article = ArticleRow {
            slug: "t-1".to_owned(),
            title: "T".to_owned(),
            description: "d".to_owned(),
            body: "b".to_owned(),
            taglist: vec!["rust".to_owned()],
            created_at: now,
            updated_at: now,
            favorites_count: 0,
            author: "alice1".to_owned(),
        }
        .into();

        assert_eq!(article.tag_list, vec!["rust".to_owned()]);
        assert_eq!(ArticleRecordRow::from(&article).taglist, ["rust".to_owned()]);
    }
}
