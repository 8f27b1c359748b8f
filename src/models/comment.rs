use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::user::UserPublic;
use crate::models::vote::{self, VoteKind};

/// Stored comment document. `parent_comment` is present iff the comment is a
/// reply; reply lists are derived by querying on it rather than stored on the
/// parent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: String,
    pub comment_content: String,
    pub commenter: String,
    pub parent_post: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<String>,
    pub upvote: Vec<String>,
    pub downvote: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn new_top_level(commenter_id: &str, post_id: &str, content: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            comment_content: content,
            commenter: commenter_id.to_string(),
            parent_post: post_id.to_string(),
            parent_comment: None,
            upvote: Vec::new(),
            downvote: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// A reply inherits its post from the parent comment.
    pub fn new_reply(commenter_id: &str, parent: &Comment, content: String) -> Self {
        let mut reply = Self::new_top_level(commenter_id, &parent.parent_post, content);
        reply.parent_comment = Some(parent.id.clone());
        reply
    }

    pub fn is_reply(&self) -> bool {
        self.parent_comment.is_some()
    }

    pub fn cast_vote(&mut self, user_id: &str, kind: VoteKind) -> Result<()> {
        vote::cast(kind, "comment", &mut self.upvote, &mut self.downvote, user_id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn retract_vote(&mut self, user_id: &str, kind: VoteKind) -> Result<()> {
        vote::retract(kind, "comment", &mut self.upvote, &mut self.downvote, user_id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn to_response(&self, commenter: UserPublic, replies: Vec<CommentResponse>) -> CommentResponse {
        CommentResponse {
            id: self.id.clone(),
            comment_content: self.comment_content.clone(),
            commenter,
            parent_post: self.parent_post.clone(),
            parent_comment: self.parent_comment.clone(),
            upvote: self.upvote.clone(),
            downvote: self.downvote.clone(),
            replies,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub comment_content: String,
    pub commenter: UserPublic,
    pub parent_post: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_comment: Option<String>,
    pub upvote: Vec<String>,
    pub downvote: Vec<String>,
    pub replies: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    pub comment_content: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCommentRequest {
    pub comment_content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn a_reply_inherits_the_parent_post() {
        let top = Comment::new_top_level("u1", "p1", "hello".to_string());
        let reply = Comment::new_reply("u2", &top, "hi back".to_string());

        assert_eq!(reply.parent_post, "p1");
        assert_eq!(reply.parent_comment.as_deref(), Some(top.id.as_str()));
        assert!(reply.is_reply());
        assert!(!top.is_reply());
    }

    #[test]
    fn top_level_comment_omits_parent_comment_on_the_wire() {
        let top = Comment::new_top_level("u1", "p1", "hello".to_string());
        let value = serde_json::to_value(&top).unwrap();
        assert!(value.get("parent_comment").is_none());

        let response = serde_json::to_value(top.to_response(UserPublic::default(), Vec::new())).unwrap();
        assert!(response.get("parentComment").is_none());
        assert_eq!(response["parentPost"], "p1");
        assert_eq!(response["commentContent"], "hello");
    }
}
