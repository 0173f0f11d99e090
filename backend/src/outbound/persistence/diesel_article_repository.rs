//! PostgreSQL-backed `ArticleRepository`.
//!
//! The `article_slug_key` primary key is the authority on slug uniqueness;
//! a violation on insert surfaces as [`ArticleRepositoryError::SlugTaken`].

use async_trait::async_trait;
use diesel::dsl::exists;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError};
use crate::domain::{Article, ArticleFilter};

use super::diesel_error_mapping::{DieselFailure, classify, constraints};
use super::models::{ArticleRecordRow, ArticleRow};
use super::pool::{DbPool, PoolError};
use super::schema::article;

/// Diesel adapter for articles.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticleRepositoryError {
    ArticleRepositoryError::connection(error.into_message())
}

fn map_failure(failure: DieselFailure, slug: &str) -> ArticleRepositoryError {
    if failure.violates(constraints::ARTICLE_SLUG) {
        return ArticleRepositoryError::slug_taken(slug);
    }
    match failure {
        DieselFailure::Connection { message } => ArticleRepositoryError::connection(message),
        other => ArticleRepositoryError::query(other.into_message()),
    }
}

fn map_diesel_error<'a>(
    operation: &'static str,
    slug: &'a str,
) -> impl Fn(diesel::result::Error) -> ArticleRepositoryError + 'a {
    move |error| map_failure(classify(error, operation), slug)
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    async fn slug_exists(&self, slug: &str) -> Result<bool, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::select(exists(article::table.find(slug)))
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error("probe slug", slug))
    }

    async fn insert(&self, value: &Article) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::insert_into(article::table)
            .values(ArticleRecordRow::from(value))
            .execute(&mut conn)
            .await
            .map(|_| ())
            .map_err(map_diesel_error("insert article", &value.slug))
    }

    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let mut query = article::table
            .select(ArticleRow::as_select())
            .order(article::created_at.desc())
            .into_boxed();
        if let Some(author) = filter.author.as_deref() {
            query = query.filter(article::author.eq(author));
        }
        if let Some(tag) = filter.tag.as_deref() {
            query = query.filter(article::taglist.contains(vec![tag.to_owned()]));
        }
        let rows: Vec<ArticleRow> = query
            .load(&mut conn)
            .await
            .map_err(map_diesel_error("list articles", ""))?;
        Ok(rows.into_iter().map(Article::from).collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row: Option<ArticleRow> = article::table
            .find(slug)
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error("select article", slug))?;
        Ok(row.map(Article::from))
    }

    async fn update(&self, value: &Article) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let updated = diesel::update(article::table.find(&value.slug))
            .set(ArticleRecordRow::from(value))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("update article", &value.slug))?;
        if updated == 0 {
            return Err(ArticleRepositoryError::not_found(value.slug.as_str()));
        }
        Ok(())
    }

    async fn delete(&self, slug: &str) -> Result<(), ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let deleted = diesel::delete(article::table.find(slug))
            .execute(&mut conn)
            .await
            .map_err(map_diesel_error("delete article", slug))?;
        if deleted == 0 {
            return Err(ArticleRepositoryError::not_found(slug));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn slug_constraint_violation_is_slug_taken() {
        let failure = DieselFailure::UniqueViolation {
            constraint: Some(constraints::ARTICLE_SLUG.to_owned()),
        };
        assert_eq!(
            map_failure(failure, "hello-world-1"),
            ArticleRepositoryError::slug_taken("hello-world-1")
        );
    }

    #[rstest]
    #[case(DieselFailure::Connection { message: "closed".to_owned() }, true)]
    #[case(DieselFailure::Query { message: "syntax".to_owned() }, false)]
    fn other_failures_keep_their_class(#[case] failure: DieselFailure, #[case] connection: bool) {
        let err = map_failure(failure, "s-1");
        assert_eq!(
            matches!(err, ArticleRepositoryError::Connection { .. }),
            connection
        );
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        assert_eq!(
            map_pool_error(PoolError::checkout("timed out")),
            ArticleRepositoryError::connection("timed out")
        );
    }
}
