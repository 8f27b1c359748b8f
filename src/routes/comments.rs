use crate::{
    error::Result,
    models::comment::{Comment, CommentResponse, CreateCommentRequest, UpdateCommentRequest},
    models::vote::VoteKind,
    services::auth::AuthUser,
    state::AppState,
};
use axum::{
    extract::{Path, State},
    response::Json,
    routing::{delete, get, post},
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/:id", post(create_comment).delete(delete_comment).patch(update_comment))
        .route("/:id/reply", post(create_reply))
        .route("/get-all-comments/:id", get(get_all_comments))
        .route("/get-comment/:id", get(get_comment))
        .route("/upvote/:id", post(upvote_comment))
        .route("/delete-upvote/:id", delete(delete_upvote))
        .route("/downvote/:id", post(downvote_comment))
        .route("/delete-downvote/:id", delete(delete_downvote))
}

/// POST /api/v1/comments/:post_id
async fn create_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(post_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .create_comment(&post_id, &user.id, request)
        .await?;
    let response = comment.to_response(user.to_public(), Vec::new());

    Ok(Json(json!({
        "message": "Comment created successfully",
        "comment": response,
    })))
}

/// POST /api/v1/comments/:comment_id/reply
async fn create_reply(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
    Json(request): Json<CreateCommentRequest>,
) -> Result<Json<Value>> {
    let reply = state
        .comment_service
        .create_reply(&comment_id, &user.id, request)
        .await?;
    let response = reply.to_response(user.to_public(), Vec::new());

    Ok(Json(json!({
        "message": "Comment replied successfully",
        "comment": response,
    })))
}

/// PATCH /api/v1/comments/:comment_id
async fn update_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
    Json(request): Json<UpdateCommentRequest>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .update_comment(&comment_id, &user.id, request)
        .await?;
    // Ownership was checked, so the requester is the commenter.
    let response = comment.to_response(user.to_public(), Vec::new());

    Ok(Json(json!({
        "message": "Comment updated successfully",
        "comment": response,
    })))
}

/// DELETE /api/v1/comments/:comment_id
async fn delete_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    state
        .comment_service
        .delete_comment(&comment_id, &user.id)
        .await?;

    Ok(Json(json!({
        "message": "Comment deleted successfully",
    })))
}

/// GET /api/v1/comments/get-all-comments/:post_id
async fn get_all_comments(
    State(state): State<Arc<AppState>>,
    Path(post_id): Path<String>,
) -> Result<Json<Value>> {
    let comments = state.comment_service.comment_tree(&post_id).await?;

    Ok(Json(json!({ "comments": comments })))
}

/// GET /api/v1/comments/get-comment/:comment_id
async fn get_comment(
    State(state): State<Arc<AppState>>,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .comment_with_commenter(&comment_id)
        .await?;

    Ok(Json(json!({ "comment": comment })))
}

/// POST /api/v1/comments/upvote/:comment_id
async fn upvote_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .cast_vote(&comment_id, &user.id, VoteKind::Up)
        .await?;

    Ok(Json(json!({
        "message": "Comment upvoted successfully",
        "comment": expand_commenter(&state, comment).await?,
    })))
}

/// POST /api/v1/comments/downvote/:comment_id
async fn downvote_comment(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .cast_vote(&comment_id, &user.id, VoteKind::Down)
        .await?;

    Ok(Json(json!({
        "message": "Comment downvoted successfully",
        "comment": expand_commenter(&state, comment).await?,
    })))
}

/// DELETE /api/v1/comments/delete-upvote/:comment_id
async fn delete_upvote(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .retract_vote(&comment_id, &user.id, VoteKind::Up)
        .await?;

    Ok(Json(json!({
        "message": "Upvote removed successfully",
        "comment": expand_commenter(&state, comment).await?,
    })))
}

/// DELETE /api/v1/comments/delete-downvote/:comment_id
async fn delete_downvote(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Path(comment_id): Path<String>,
) -> Result<Json<Value>> {
    let comment = state
        .comment_service
        .retract_vote(&comment_id, &user.id, VoteKind::Down)
        .await?;

    Ok(Json(json!({
        "message": "Downvote removed successfully",
        "comment": expand_commenter(&state, comment).await?,
    })))
}

async fn expand_commenter(state: &AppState, comment: Comment) -> Result<CommentResponse> {
    let profiles = state
        .user_service
        .public_profiles(&[comment.commenter.as_str()])
        .await?;
    let commenter = profiles.get(&comment.commenter).cloned().unwrap_or_default();

    Ok(comment.to_response(commenter, Vec::new()))
}
