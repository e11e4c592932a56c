//! Public blog and testimonials.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use gear_core::entities::{BlogComment, BlogPost, Testimonial};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

const DEFAULT_POST_LIMIT: u32 = 20;
const RELATED_POSTS: u32 = 3;

#[derive(Debug, Deserialize)]
pub struct PostListParams {
    limit: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct PostDetail {
    pub post: BlogPost,
    pub comments: Vec<BlogComment>,
    pub latest: Vec<BlogPost>,
}

#[derive(Debug, Deserialize)]
pub struct CommentForm {
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    pub body: String,
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(params): Query<PostListParams>,
) -> Result<Json<Vec<BlogPost>>, ApiError> {
    let limit = params.limit.unwrap_or(DEFAULT_POST_LIMIT);
    Ok(Json(state.service.list_published_posts(limit).await?))
}

pub async fn post_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = state.service.get_published_post(&slug).await?;
    let comments = state.service.list_approved_comments(&post.id).await?;
    let latest = state
        .service
        .latest_posts_excluding(&post.id, RELATED_POSTS)
        .await?;
    Ok(Json(PostDetail {
        post,
        comments,
        latest,
    }))
}

/// Comments are held until staff approve them.
pub async fn add_comment(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(form): Json<CommentForm>,
) -> Result<(StatusCode, Json<BlogComment>), ApiError> {
    let post = state.service.get_published_post(&slug).await?;
    let comment = state
        .service
        .add_blog_comment(&post.id, &form.name, form.email.as_deref(), &form.body)
        .await?;
    Ok((StatusCode::CREATED, Json(comment)))
}

pub async fn testimonials(
    State(state): State<AppState>,
) -> Result<Json<Vec<Testimonial>>, ApiError> {
    Ok(Json(state.service.list_published_testimonials().await?))
}
