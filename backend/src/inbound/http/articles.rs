//! Article endpoints.
//!
//! Listing is public; publishing requires a session. Slugs are derived from
//! the title and made unique with a numeric suffix.

use actix_web::{HttpResponse, get, post, web};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::{ApiResult, Article, ArticleDraft, ArticleFilter};
use crate::inbound::http::auth::AuthenticatedUser;
use crate::inbound::http::error::ErrorEnvelope;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, require};

const TITLE: FieldName = FieldName::new("title");

#[derive(Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NewArticle {
    pub title: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub body: String,
    #[serde(default)]
    pub tag_list: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct CreateArticleRequest {
    pub article: NewArticle,
}

impl TryFrom<NewArticle> for ArticleDraft {
    type Error = crate::domain::Error;

    fn try_from(value: NewArticle) -> Result<Self, Self::Error> {
        let title = require(value.title, TITLE)?;
        Ok(Self::try_from_parts(
            &title,
            &value.description,
            &value.body,
            value.tag_list,
        )?)
    }
}

/// Listing filters; both are exact matches and combine with AND.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArticleQuery {
    /// Author username.
    pub author: Option<String>,
    /// Tag the article must carry.
    pub tag: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct AuthorBody {
    pub username: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleBody {
    pub slug: String,
    pub title: String,
    pub description: String,
    pub body: String,
    pub tag_list: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Always `false`; favouriting is not supported.
    pub favorited: bool,
    pub favorites_count: i32,
    pub author: AuthorBody,
}

impl From<Article> for ArticleBody {
    fn from(article: Article) -> Self {
        Self {
            slug: article.slug,
            title: article.title,
            description: article.description,
            body: article.body,
            tag_list: article.tag_list,
            created_at: article.created_at,
            updated_at: article.updated_at,
            favorited: false,
            favorites_count: article.favorites_count,
            author: AuthorBody {
                username: article.author,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
pub struct ArticleResponse {
    pub article: ArticleBody,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ArticleListResponse {
    pub articles: Vec<ArticleBody>,
    pub articles_count: usize,
}

impl From<Vec<Article>> for ArticleListResponse {
    fn from(articles: Vec<Article>) -> Self {
        let articles: Vec<ArticleBody> = articles.into_iter().map(ArticleBody::from).collect();
        Self {
            articles_count: articles.len(),
            articles,
        }
    }
}

/// List articles, newest first.
#[utoipa::path(
    get,
    path = "/articles",
    params(ArticleQuery),
    responses(
        (status = 200, description = "Matching articles", body = ArticleListResponse),
        (status = 503, description = "Database unavailable", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "listArticles",
    security([])
)]
#[get("/articles")]
pub async fn list_articles(
    state: web::Data<HttpState>,
    query: web::Query<ArticleQuery>,
) -> ApiResult<web::Json<ArticleListResponse>> {
    let ArticleQuery { author, tag } = query.into_inner();
    let filter = ArticleFilter::from_query(author.as_deref(), tag.as_deref());
    let articles = state.articles.list(&filter).await?;
    Ok(web::Json(articles.into()))
}

/// Publish an article authored by the caller.
#[utoipa::path(
    post,
    path = "/articles",
    request_body = CreateArticleRequest,
    responses(
        (status = 201, description = "Article created", body = ArticleResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorEnvelope),
        (status = 422, description = "Invalid payload", body = ErrorEnvelope)
    ),
    tags = ["articles"],
    operation_id = "createArticle"
)]
#[post("/articles")]
pub async fn create_article(
    state: web::Data<HttpState>,
    caller: AuthenticatedUser,
    payload: web::Json<CreateArticleRequest>,
) -> ApiResult<HttpResponse> {
    let draft = ArticleDraft::try_from(payload.into_inner().article)?;
    let article = state.articles.create(caller.user_id(), draft).await?;
    Ok(HttpResponse::Created().json(ArticleResponse {
        article: article.into(),
    }))
}

#[cfg(test)]
#[path = "articles_tests.rs"]
mod tests;
