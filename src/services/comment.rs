use crate::{
    error::{AppError, Result},
    models::comment::{Comment, CommentResponse, CreateCommentRequest, UpdateCommentRequest},
    models::post::Post,
    models::user::UserPublic,
    models::vote::VoteKind,
    services::{Database, UserService},
    utils::validation,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct CommentService {
    db: Arc<Database>,
    users: UserService,
}

impl CommentService {
    pub async fn new(db: Arc<Database>, users: UserService) -> Result<Self> {
        Ok(Self { db, users })
    }

    /// Creates a top-level comment on an existing post.
    pub async fn create_comment(
        &self,
        post_id: &str,
        user_id: &str,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        validation::require_non_blank(&request.comment_content, "Comment content is required")?;
        validation::validate_record_id(post_id)?;

        let post: Option<Post> = self.db.get_by_id("post", post_id).await?;
        if post.is_none() {
            return Err(AppError::not_found("Post"));
        }

        let comment = Comment::new_top_level(user_id, post_id, request.comment_content);
        let created = self.db.create("comment", &comment.id, &comment).await?;

        debug!("Created comment: {} on post: {}", created.id, post_id);
        Ok(created)
    }

    /// Creates a reply under a top-level comment. Replies cannot be nested
    /// further; the reply inherits its post from the parent.
    pub async fn create_reply(
        &self,
        parent_comment_id: &str,
        user_id: &str,
        request: CreateCommentRequest,
    ) -> Result<Comment> {
        validation::require_non_blank(&request.comment_content, "Comment content is required")?;

        let parent = self.get_comment(parent_comment_id).await?;
        if parent.is_reply() {
            return Err(AppError::validation("Cannot reply to a reply"));
        }

        let reply = Comment::new_reply(user_id, &parent, request.comment_content);
        let created = self.db.create("comment", &reply.id, &reply).await?;

        debug!("Created reply: {} under comment: {}", created.id, parent_comment_id);
        Ok(created)
    }

    pub async fn update_comment(
        &self,
        comment_id: &str,
        user_id: &str,
        request: UpdateCommentRequest,
    ) -> Result<Comment> {
        validation::require_non_blank(&request.comment_content, "Comment content is required")?;

        let comment = self.get_comment(comment_id).await?;
        if comment.commenter != user_id {
            return Err(AppError::unauthorized("Unauthorized"));
        }

        let updates = json!({
            "comment_content": request.comment_content,
            "updated_at": Utc::now(),
        });

        self.db
            .update_by_id_with_json("comment", comment_id, updates)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))
    }

    /// Deletes a comment after an ownership check. Deleting a top-level
    /// comment cascades to its replies; deleting a reply removes only itself.
    pub async fn delete_comment(&self, comment_id: &str, user_id: &str) -> Result<()> {
        let comment = self.get_comment(comment_id).await?;
        if comment.commenter != user_id {
            return Err(AppError::unauthorized("Unauthorized"));
        }

        if !comment.is_reply() {
            self.db
                .query_with_params(
                    "DELETE comment WHERE parent_comment = $comment",
                    json!({ "comment": comment_id }),
                )
                .await?;
        }
        self.db.delete_by_id("comment", comment_id).await?;

        info!("Deleted comment: {}", comment_id);
        Ok(())
    }

    pub async fn get_comment(&self, comment_id: &str) -> Result<Comment> {
        validation::validate_record_id(comment_id)?;

        self.db
            .get_by_id("comment", comment_id)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))
    }

    /// One comment with its commenter expanded.
    pub async fn comment_with_commenter(&self, comment_id: &str) -> Result<CommentResponse> {
        let comment = self.get_comment(comment_id).await?;
        let profiles = self.users.public_profiles(&[&comment.commenter]).await?;
        let commenter = profiles.get(&comment.commenter).cloned().unwrap_or_default();

        Ok(comment.to_response(commenter, Vec::new()))
    }

    /// All comments of a post as a two-level tree: top-level comments in
    /// creation order, each carrying its replies, every commenter expanded.
    pub async fn comment_tree(&self, post_id: &str) -> Result<Vec<CommentResponse>> {
        validation::validate_record_id(post_id)?;

        let post: Option<Post> = self.db.get_by_id("post", post_id).await?;
        if post.is_none() {
            return Err(AppError::not_found("Post"));
        }

        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM comment WHERE parent_post = $post ORDER BY created_at ASC",
                json!({ "post": post_id }),
            )
            .await?;
        let comments: Vec<Comment> = response.take(0)?;

        let commenter_ids: Vec<&str> = comments.iter().map(|c| c.commenter.as_str()).collect();
        let profiles = self.users.public_profiles(&commenter_ids).await?;

        Ok(build_tree(comments, &profiles))
    }

    pub async fn cast_vote(&self, comment_id: &str, user_id: &str, kind: VoteKind) -> Result<Comment> {
        let mut comment = self.get_comment(comment_id).await?;
        comment.cast_vote(user_id, kind)?;
        self.persist_votes(&comment).await
    }

    pub async fn retract_vote(
        &self,
        comment_id: &str,
        user_id: &str,
        kind: VoteKind,
    ) -> Result<Comment> {
        let mut comment = self.get_comment(comment_id).await?;
        comment.retract_vote(user_id, kind)?;
        self.persist_votes(&comment).await
    }

    async fn persist_votes(&self, comment: &Comment) -> Result<Comment> {
        let updates = json!({
            "upvote": comment.upvote,
            "downvote": comment.downvote,
            "updated_at": comment.updated_at,
        });

        self.db
            .update_by_id_with_json("comment", &comment.id, updates)
            .await?
            .ok_or_else(|| AppError::not_found("Comment"))
    }
}

/// Groups a post's comments into top-level comments with nested replies,
/// preserving the given (creation) order at both levels.
fn build_tree(
    comments: Vec<Comment>,
    profiles: &HashMap<String, UserPublic>,
) -> Vec<CommentResponse> {
    let commenter = |comment: &Comment| {
        profiles
            .get(&comment.commenter)
            .cloned()
            .unwrap_or_default()
    };

    let (top_level, replies): (Vec<Comment>, Vec<Comment>) =
        comments.into_iter().partition(|comment| !comment.is_reply());

    let mut replies_by_parent: HashMap<String, Vec<CommentResponse>> = HashMap::new();
    for reply in replies {
        let profile = commenter(&reply);
        if let Some(parent_id) = reply.parent_comment.clone() {
            replies_by_parent
                .entry(parent_id)
                .or_default()
                .push(reply.to_response(profile, Vec::new()));
        }
    }

    top_level
        .into_iter()
        .map(|comment| {
            let profile = commenter(&comment);
            let replies = replies_by_parent.remove(&comment.id).unwrap_or_default();
            comment.to_response(profile, replies)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str) -> UserPublic {
        UserPublic {
            id: id.to_string(),
            username: format!("user-{}", id),
            profile_pic: None,
        }
    }

    #[test]
    fn replies_nest_under_their_parent() {
        let first = Comment::new_top_level("u1", "p1", "first".to_string());
        let second = Comment::new_top_level("u2", "p1", "second".to_string());
        let reply_a = Comment::new_reply("u2", &first, "re: first".to_string());
        let reply_b = Comment::new_reply("u1", &first, "also re: first".to_string());

        let profiles = HashMap::from([
            ("u1".to_string(), profile("u1")),
            ("u2".to_string(), profile("u2")),
        ]);

        let tree = build_tree(
            vec![first.clone(), second, reply_a.clone(), reply_b.clone()],
            &profiles,
        );

        assert_eq!(tree.len(), 2);
        assert_eq!(tree[0].id, first.id);
        assert_eq!(tree[0].replies.len(), 2);
        assert_eq!(tree[0].replies[0].id, reply_a.id);
        assert_eq!(tree[0].replies[1].id, reply_b.id);
        assert!(tree[1].replies.is_empty());
    }

    #[test]
    fn commenters_are_expanded() {
        let comment = Comment::new_top_level("u1", "p1", "hello".to_string());
        let profiles = HashMap::from([("u1".to_string(), profile("u1"))]);

        let tree = build_tree(vec![comment], &profiles);
        assert_eq!(tree[0].commenter.username, "user-u1");
    }

    #[test]
    fn a_vanished_commenter_falls_back_to_a_placeholder() {
        let comment = Comment::new_top_level("gone", "p1", "hello".to_string());

        let tree = build_tree(vec![comment], &HashMap::new());
        assert_eq!(tree[0].commenter.username, "");
    }
}
