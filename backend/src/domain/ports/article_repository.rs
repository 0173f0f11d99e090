//! Port for article persistence.
//!
//! Slug uniqueness is the adapter's responsibility: `insert` must fail with
//! [`ArticleRepositoryError::SlugTaken`] when the slug already exists, even
//! if an earlier `slug_exists` probe reported it free.

use async_trait::async_trait;

use crate::domain::{Article, ArticleFilter};

use super::define_port_error;

define_port_error! {
    /// Errors raised by article repository adapters.
    pub enum ArticleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } => "article repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } => "article repository query failed: {message}",
        /// The slug is already in use.
        SlugTaken { slug: String } => "slug already exists: {slug}",
        /// No article carries the slug.
        NotFound { slug: String } => "article not found: {slug}",
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Whether an article already uses `slug`.
    async fn slug_exists(&self, slug: &str) -> Result<bool, ArticleRepositoryError>;

    /// Insert a new article.
    async fn insert(&self, article: &Article) -> Result<(), ArticleRepositoryError>;

    /// Articles matching `filter`, newest first.
    async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>, ArticleRepositoryError>;

    /// Fetch one article.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Article>, ArticleRepositoryError>;

    /// Overwrite the stored article with the same slug.
    async fn update(&self, article: &Article) -> Result<(), ArticleRepositoryError>;

    /// Remove the article with `slug`.
    async fn delete(&self, slug: &str) -> Result<(), ArticleRepositoryError>;
}

impl From<ArticleRepositoryError> for crate::domain::Error {
    fn from(value: ArticleRepositoryError) -> Self {
        match value {
            ArticleRepositoryError::Connection { message } => {
                Self::service_unavailable(format!("article repository unavailable: {message}"))
            }
            other => Self::internal(format!("article repository error: {other}")),
        }
    }
}
