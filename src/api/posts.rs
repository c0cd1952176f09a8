use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::app::AppState;
use crate::auth::credential::AdminCredential;
use crate::db::post_repository::PostRepository;
use crate::error::AppError;
use crate::models::post::{NewPost, Post, PostFilter, PostUpdate};
use crate::slug::{derive_excerpt, derive_slug};

/// Request body for creating or updating a post.
///
/// Every field is optional at the wire level; presence rules are enforced by
/// [`process_create_post`] and [`process_update_post`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPayload {
    pub title: Option<String>,
    pub excerpt: Option<String>,
    pub body: Option<String>,
    pub author: Option<String>,
    pub tags: Option<Vec<String>>,
    pub featured_image: Option<String>,
    pub published: Option<bool>,
    pub trending: Option<bool>,
    pub category: Option<String>,
}

/// Query parameters for `GET /posts`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsQuery {
    #[serde(default)]
    pub trending_only: bool,
    #[serde(default)]
    pub exclude_trending: bool,
    pub category: Option<String>,
}

/// Standard `{success, data}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn ok(data: T) -> axum::Json<Self> {
        axum::Json(Self {
            success: true,
            data,
        })
    }
}

const RESERVED_SLUG: &str = "slug";

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn require_title(title: &str) -> Result<String, AppError> {
    if title.trim().is_empty() {
        return Err(AppError::Validation("Title is required".into()));
    }
    let slug = derive_slug(title);
    if slug.is_empty() {
        return Err(AppError::Validation(
            "Title must contain at least one letter or digit".into(),
        ));
    }
    // `/posts/slug/...` is the lookup route, so this slug could never be engaged with
    if slug == RESERVED_SLUG {
        return Err(AppError::Validation(format!(
            "Title may not produce the reserved slug '{}'",
            RESERVED_SLUG
        )));
    }
    Ok(slug)
}

fn require_body(body: &str) -> Result<(), AppError> {
    if body.trim().is_empty() {
        return Err(AppError::Validation("Body is required".into()));
    }
    Ok(())
}

/// Validate a draft, derive slug and excerpt, apply defaults and persist it.
pub async fn process_create_post(
    repo: &dyn PostRepository,
    request: PostPayload,
    default_author: &str,
) -> Result<Post, AppError> {
    let title = request.title.unwrap_or_default();
    let body = request.body.unwrap_or_default();

    let slug = require_title(&title)?;
    require_body(&body)?;

    let excerpt = non_blank(request.excerpt).unwrap_or_else(|| derive_excerpt(&body));
    let author = non_blank(request.author).unwrap_or_else(|| default_author.to_string());

    let post = repo
        .insert(NewPost {
            title,
            slug,
            excerpt,
            body,
            author,
            tags: request.tags.unwrap_or_default(),
            featured_image: request.featured_image.unwrap_or_default(),
            published: request.published.unwrap_or(false),
            trending: request.trending.unwrap_or(false),
            category: non_blank(request.category),
        })
        .await?;

    tracing::info!(slug = %post.slug, published = post.published, "post created");
    Ok(post)
}

/// Apply a partial update to a post.
///
/// A new title re-derives the slug. The excerpt is re-derived whenever the
/// request leaves it empty but carries a body, or explicitly clears it.
pub async fn process_update_post(
    repo: &dyn PostRepository,
    id: &str,
    request: PostPayload,
) -> Result<Post, AppError> {
    let existing = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    let slug = request.title.as_deref().map(require_title).transpose()?;
    if let Some(body) = &request.body {
        require_body(body)?;
    }

    let clears_excerpt = matches!(&request.excerpt, Some(e) if e.trim().is_empty());
    let excerpt = match (non_blank(request.excerpt), &request.body) {
        (Some(excerpt), _) => Some(excerpt),
        (None, Some(body)) => Some(derive_excerpt(body)),
        (None, None) if clears_excerpt => Some(derive_excerpt(&existing.body)),
        (None, None) => None,
    };

    let update = PostUpdate {
        title: request.title,
        slug,
        excerpt,
        body: request.body,
        author: non_blank(request.author),
        tags: request.tags,
        featured_image: request.featured_image,
        published: request.published,
        trending: request.trending,
        category: request.category.map(|c| non_blank(Some(c))),
    };

    let post = repo
        .update(id, update)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))?;

    tracing::info!(slug = %post.slug, "post updated");
    Ok(post)
}

pub async fn process_delete_post(repo: &dyn PostRepository, id: &str) -> Result<(), AppError> {
    if !repo.delete(id).await? {
        return Err(AppError::NotFound("Post not found".into()));
    }
    tracing::info!(id, "post deleted");
    Ok(())
}

pub async fn process_get_post(repo: &dyn PostRepository, id: &str) -> Result<Post, AppError> {
    repo.find_by_id(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

/// Public lookup: unpublished posts are indistinguishable from missing ones.
pub async fn process_get_published_by_slug(
    repo: &dyn PostRepository,
    slug: &str,
) -> Result<Post, AppError> {
    repo.find_by_slug(slug, true)
        .await?
        .ok_or_else(|| AppError::NotFound("Post not found".into()))
}

pub async fn process_list_published(
    repo: &dyn PostRepository,
    query: ListPostsQuery,
) -> Result<Vec<Post>, AppError> {
    if query.trending_only && query.exclude_trending {
        return Err(AppError::Validation(
            "trendingOnly and excludeTrending cannot both be set".into(),
        ));
    }

    let filter = PostFilter {
        trending_only: query.trending_only,
        exclude_trending: query.exclude_trending,
        category: non_blank(query.category),
    };
    repo.list_published(&filter).await
}

/// `GET /posts`
pub async fn list_posts_handler(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<axum::Json<DataResponse<Vec<Post>>>, AppError> {
    let posts = process_list_published(state.post_repo.as_ref(), query).await?;
    Ok(DataResponse::ok(posts))
}

/// `POST /posts` (admin)
pub async fn create_post_handler(
    State(state): State<AppState>,
    credential: AdminCredential,
    payload: Result<axum::Json<PostPayload>, JsonRejection>,
) -> Result<(StatusCode, axum::Json<DataResponse<Post>>), AppError> {
    state.admin_gate.authorize(&credential)?;
    let axum::Json(request) = payload?;
    let post = process_create_post(state.post_repo.as_ref(), request, &state.default_author).await?;
    Ok((StatusCode::CREATED, DataResponse::ok(post)))
}

/// `GET /posts/{id}`
pub async fn get_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<axum::Json<DataResponse<Post>>, AppError> {
    let post = process_get_post(state.post_repo.as_ref(), &id).await?;
    Ok(DataResponse::ok(post))
}

/// `PUT /posts/{id}` (admin)
pub async fn update_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    credential: AdminCredential,
    payload: Result<axum::Json<PostPayload>, JsonRejection>,
) -> Result<axum::Json<DataResponse<Post>>, AppError> {
    state.admin_gate.authorize(&credential)?;
    let axum::Json(request) = payload?;
    let post = process_update_post(state.post_repo.as_ref(), &id, request).await?;
    Ok(DataResponse::ok(post))
}

/// `DELETE /posts/{id}` (admin)
pub async fn delete_post_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    credential: AdminCredential,
) -> Result<axum::Json<DataResponse<serde_json::Value>>, AppError> {
    state.admin_gate.authorize(&credential)?;
    process_delete_post(state.post_repo.as_ref(), &id).await?;
    Ok(DataResponse::ok(serde_json::json!({})))
}

/// `GET /posts/slug/{slug}`
pub async fn get_post_by_slug_handler(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<axum::Json<DataResponse<Post>>, AppError> {
    let post = process_get_published_by_slug(state.post_repo.as_ref(), &slug).await?;
    Ok(DataResponse::ok(post))
}

/// `GET /admin/posts` (admin): every post including drafts.
pub async fn list_all_posts_handler(
    State(state): State<AppState>,
    credential: AdminCredential,
) -> Result<axum::Json<DataResponse<Vec<Post>>>, AppError> {
    state.admin_gate.authorize(&credential)?;
    let posts = state.post_repo.list_all().await?;
    Ok(DataResponse::ok(posts))
}
