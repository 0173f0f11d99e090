//! Article data model.

use std::fmt;

use chrono::{DateTime, Utc};

/// Domain error returned when an article payload is invalid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleValidationError {
    /// Title was missing or blank once trimmed.
    EmptyTitle,
}

impl fmt::Display for ArticleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
        }
    }
}

impl std::error::Error for ArticleValidationError {}

/// Stored article.
///
/// `author` holds the author's username at creation time. `favorites_count`
/// stays at zero because favouriting is not offered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub author: String,
    pub favorites_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Validated input for a new article; the slug is allocated on creation.
///
/// # Examples
/// ```
/// use conduit::domain::ArticleDraft;
///
/// let draft = ArticleDraft::try_from_parts("Hello World!", "d", "b", vec!["x".into()]).unwrap();
/// assert_eq!(draft.title(), "Hello World!");
/// assert!(ArticleDraft::try_from_parts("  ", "d", "b", Vec::new()).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleDraft {
    title: String,
    description: String,
    body: String,
    tag_list: Vec<String>,
}

impl ArticleDraft {
    pub fn try_from_parts(
        title: &str,
        description: &str,
        body: &str,
        tag_list: Vec<String>,
    ) -> Result<Self, ArticleValidationError> {
        if title.trim().is_empty() {
            return Err(ArticleValidationError::EmptyTitle);
        }
        Ok(Self {
            title: title.to_owned(),
            description: description.to_owned(),
            body: body.to_owned(),
            tag_list,
        })
    }

    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    pub fn description(&self) -> &str {
        self.description.as_str()
    }

    pub fn body(&self) -> &str {
        self.body.as_str()
    }

    pub fn tag_list(&self) -> &[String] {
        self.tag_list.as_slice()
    }

    /// Materialise the stored article under `slug`.
    pub fn into_article(self, slug: String, author: &str, now: DateTime<Utc>) -> Article {
        Article {
            slug,
            title: self.title,
            description: self.description,
            body: self.body,
            tag_list: self.tag_list,
            author: author.to_owned(),
            favorites_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Listing filter. Both criteria are optional and combine with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    pub author: Option<String>,
    pub tag: Option<String>,
}

impl ArticleFilter {
    /// Build a filter, treating empty strings as absent.
    pub fn from_query(author: Option<&str>, tag: Option<&str>) -> Self {
        let present = |value: Option<&str>| value.filter(|v| !v.is_empty()).map(str::to_owned);
        Self {
            author: present(author),
            tag: present(tag),
        }
    }

    /// Whether `article` passes this filter.
    pub fn matches(&self, article: &Article) -> bool {
        let author_ok = self
            .author
            .as_deref()
            .is_none_or(|author| article.author == author);
        let tag_ok = self
            .tag
            .as_deref()
            .is_none_or(|tag| article.tag_list.iter().any(|t| t == tag));
        author_ok && tag_ok
    }
}
