//! Article publication and listing.
//!
//! Creation allocates the slug: candidates `<stem>-1`, `<stem>-2`, ... are
//! probed in order and the first free one is inserted. The probe is only an
//! optimisation; the repository's unique constraint is what guarantees
//! uniqueness, so an insert that loses a race with a concurrent writer moves
//! on to the next index.

use std::sync::Arc;

use mockable::Clock;
use tracing::{debug, info};

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError, UserRepository};
use crate::domain::{Article, ArticleDraft, ArticleFilter, Error, UserId, slug};

/// Article service backed by the article and user repositories.
#[derive(Clone)]
pub struct ArticleService {
    articles: Arc<dyn ArticleRepository>,
    users: Arc<dyn UserRepository>,
    clock: Arc<dyn Clock>,
}

impl ArticleService {
    pub fn new(
        articles: Arc<dyn ArticleRepository>,
        users: Arc<dyn UserRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            articles,
            users,
            clock,
        }
    }

    /// Publish `draft` as `author`, allocating a unique slug.
    pub async fn create(&self, author: &UserId, draft: ArticleDraft) -> Result<Article, Error> {
        let author = self
            .users
            .find_by_id(author)
            .await?
            .ok_or_else(|| Error::unauthorized("User not found"))?;

        let stem = slug::normalize_title(draft.title());
        let mut index: u32 = 1;
        loop {
            let candidate = slug::candidate(&stem, index);
            if self.articles.slug_exists(&candidate).await? {
                index += 1;
                continue;
            }

            let article = draft
                .clone()
                .into_article(candidate, &author.username, self.clock.utc());
            match self.articles.insert(&article).await {
                Ok(()) => {
                    info!(slug = %article.slug, username = %author.username, "article created");
                    return Ok(article);
                }
                Err(ArticleRepositoryError::SlugTaken { slug }) => {
                    debug!(%slug, "slug claimed concurrently; trying next index");
                    index += 1;
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    /// Articles matching `filter`.
    pub async fn list(&self, filter: &ArticleFilter) -> Result<Vec<Article>, Error> {
        let articles = self.articles.list(filter).await?;
        debug!(count = articles.len(), "articles listed");
        Ok(articles)
    }
}

#[cfg(test)]
#[path = "article_service_tests.rs"]
mod tests;
