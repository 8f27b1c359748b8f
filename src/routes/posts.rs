use crate::{
    error::Result,
    models::post::{
        CreatePostRequest, PaginatedPosts, Post, PostListQuery, PostResponse, TagSearchQuery,
        UpdatePostRequest,
    },
    models::vote::VoteKind,
    services::auth::AuthUser,
    state::AppState,
    utils::pagination::{PageInfo, PageRequest},
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(create_post))
        .route("/:post_id", delete(delete_post).patch(update_post))
        .route("/get-post/:post_id", get(get_post))
        .route("/get-all-posts-by-user/:user_id", get(get_all_posts_by_user))
        .route("/get-all-posts", get(get_all_posts))
        .route("/search", get(search_posts))
        .route("/upvote/:post_id", post(upvote_post))
        .route("/delete-upvote/:post_id", delete(delete_upvote))
        .route("/downvote/:post_id", post(downvote_post))
        .route("/delete-downvote/:post_id", delete(delete_downvote))
        .route("/upvote-count/:post_id", get(upvote_count))
        .route("/downvote-count/:post_id", get(downvote_count))
        .route("/tags", get(popular_tags))
}

/// POST /api/v1/posts
async fn create_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Json(request): Json<CreatePostRequest>,
) -> Result<impl IntoResponse> {
    let post = state.post_service.create_post(&user.id, request).await?;
    let response = post.to_response(user.to_public());

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Post created successfully",
            "post": response,
        })),
    ))
}

/// PATCH /api/v1/posts/:post_id
async fn update_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Json(request): Json<UpdatePostRequest>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .update_post(&post_id, &user.id, request)
        .await?;
    // Ownership was checked, so the requester is the author.
    let response = post.to_response(user.to_public());

    Ok(Json(json!({
        "message": "Post updated successfully",
        "post": response,
    })))
}

/// DELETE /api/v1/posts/:post_id
async fn delete_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    state.post_service.delete_post(&post_id, &user.id).await?;

    Ok(Json(json!({
        "message": "Post deleted successfully",
    })))
}

/// GET /api/v1/posts/get-post/:post_id
async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state.post_service.get_post(&post_id).await?;
    let comments = state.comment_service.comment_tree(&post_id).await?;

    let mut response = expand_author(&state, post).await?;
    response.comments = Some(comments);

    Ok(Json(json!({
        "message": "Post fetched successfully",
        "post": response,
    })))
}

/// GET /api/v1/posts/get-all-posts-by-user/:user_id?page&limit
async fn get_all_posts_by_user(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Value>> {
    let page = page_request(&state, query.page, query.limit);
    let (posts, info) = state.post_service.posts_by_author(&user_id, page).await?;

    paginated_body(&state, posts, info).await.map(Json)
}

/// GET /api/v1/posts/get-all-posts?page&limit&tags
async fn get_all_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostListQuery>,
) -> Result<Json<Value>> {
    let page = page_request(&state, query.page, query.limit);
    let (posts, info) = state
        .post_service
        .list_posts(query.tags.as_deref(), page)
        .await?;

    paginated_body(&state, posts, info).await.map(Json)
}

/// GET /api/v1/posts/search?tag&page&limit
async fn search_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<TagSearchQuery>,
) -> Result<Json<Value>> {
    let page = page_request(&state, query.page, query.limit);
    let (posts, info) = state
        .post_service
        .search_posts(query.tag.as_deref().unwrap_or_default(), page)
        .await?;

    paginated_body(&state, posts, info).await.map(Json)
}

/// POST /api/v1/posts/upvote/:post_id
async fn upvote_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .cast_vote(&post_id, &user.id, VoteKind::Up)
        .await?;

    Ok(Json(json!({
        "message": "Post upvoted successfully",
        "post": expand_author(&state, post).await?,
    })))
}

/// POST /api/v1/posts/downvote/:post_id
async fn downvote_post(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .cast_vote(&post_id, &user.id, VoteKind::Down)
        .await?;

    Ok(Json(json!({
        "message": "Post downvoted successfully",
        "post": expand_author(&state, post).await?,
    })))
}

/// DELETE /api/v1/posts/delete-upvote/:post_id
async fn delete_upvote(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .retract_vote(&post_id, &user.id, VoteKind::Up)
        .await?;

    Ok(Json(json!({
        "message": "Post upvote deleted successfully",
        "post": expand_author(&state, post).await?,
    })))
}

/// DELETE /api/v1/posts/delete-downvote/:post_id
async fn delete_downvote(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state
        .post_service
        .retract_vote(&post_id, &user.id, VoteKind::Down)
        .await?;

    Ok(Json(json!({
        "message": "Post downvote deleted successfully",
        "post": expand_author(&state, post).await?,
    })))
}

/// GET /api/v1/posts/upvote-count/:post_id
async fn upvote_count(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state.post_service.get_post(&post_id).await?;

    Ok(Json(json!({ "upvoteCount": post.upvote.len() })))
}

/// GET /api/v1/posts/downvote-count/:post_id
async fn downvote_count(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let post = state.post_service.get_post(&post_id).await?;

    Ok(Json(json!({ "downvoteCount": post.downvote.len() })))
}

/// GET /api/v1/posts/tags
async fn popular_tags(State(state): State<Arc<AppState>>) -> Result<Json<Value>> {
    let tags = state.post_service.popular_tags().await?;

    Ok(Json(json!({
        "message": "Most popular tags fetched successfully",
        "tags": tags,
    })))
}

fn page_request(state: &AppState, page: Option<usize>, limit: Option<usize>) -> PageRequest {
    PageRequest::from_query(page, limit, state.config.default_posts_per_page)
}

async fn expand_author(state: &AppState, post: Post) -> Result<PostResponse> {
    let profiles = state
        .user_service
        .public_profiles(&[post.author.as_str()])
        .await?;
    let author = profiles.get(&post.author).cloned().unwrap_or_default();

    Ok(post.to_response(author))
}

async fn expand_authors(state: &AppState, posts: Vec<Post>) -> Result<Vec<PostResponse>> {
    let author_ids: Vec<&str> = posts.iter().map(|post| post.author.as_str()).collect();
    let profiles = state.user_service.public_profiles(&author_ids).await?;

    Ok(posts
        .into_iter()
        .map(|post| {
            let author = profiles.get(&post.author).cloned().unwrap_or_default();
            post.to_response(author)
        })
        .collect())
}

async fn paginated_body(state: &AppState, posts: Vec<Post>, info: PageInfo) -> Result<Value> {
    let envelope = PaginatedPosts {
        posts: expand_authors(state, posts).await?,
        total_posts: info.total,
        current_page: info.current_page,
        total_pages: info.total_pages,
        is_last_page: info.is_last_page,
    };

    let mut body = serde_json::to_value(envelope)?;
    body["message"] = json!("Posts fetched successfully");
    Ok(body)
}
