use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::Result;
use crate::models::comment::CommentResponse;
use crate::models::user::UserPublic;
use crate::models::vote::{self, VoteKind};

/// Stored post document. `author` and the vote sets hold user ids; comments
/// are not embedded — they reference their post via `Comment::parent_post`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub author: String,
    pub upvote: Vec<String>,
    pub downvote: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn new(
        author_id: &str,
        title: String,
        content: String,
        image: Option<String>,
        tags: Vec<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            content,
            image,
            tags,
            author: author_id.to_string(),
            upvote: Vec::new(),
            downvote: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn cast_vote(&mut self, user_id: &str, kind: VoteKind) -> Result<()> {
        vote::cast(kind, "post", &mut self.upvote, &mut self.downvote, user_id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn retract_vote(&mut self, user_id: &str, kind: VoteKind) -> Result<()> {
        vote::retract(kind, "post", &mut self.upvote, &mut self.downvote, user_id)?;
        self.updated_at = Utc::now();
        Ok(())
    }

    pub fn to_response(&self, author: UserPublic) -> PostResponse {
        PostResponse {
            id: self.id.clone(),
            title: self.title.clone(),
            content: self.content.clone(),
            image: self.image.clone(),
            tags: self.tags.clone(),
            author,
            upvote: self.upvote.clone(),
            downvote: self.downvote.clone(),
            comments: None,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostResponse {
    pub id: String,
    pub title: String,
    pub content: String,
    pub image: Option<String>,
    pub tags: Vec<String>,
    pub author: UserPublic,
    pub upvote: Vec<String>,
    pub downvote: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<CommentResponse>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreatePostRequest {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update; absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdatePostRequest {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PostListQuery {
    pub page: Option<usize>,
    pub limit: Option<usize>,
    /// Comma-separated tag filters, AND semantics.
    pub tags: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct TagSearchQuery {
    pub tag: Option<String>,
    pub page: Option<usize>,
    pub limit: Option<usize>,
}

/// Pagination envelope shared by the post list endpoints.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginatedPosts {
    pub posts: Vec<PostResponse>,
    pub total_posts: usize,
    pub current_page: usize,
    pub total_pages: usize,
    pub is_last_page: bool,
}

/// Tag with its occurrence count across all posts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagCount {
    pub tag: String,
    pub count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn casting_a_vote_bumps_updated_at() {
        let mut post = Post::new("u1", "Hi".to_string(), String::new(), None, vec!["a".into()]);
        let before = post.updated_at;

        post.cast_vote("u2", VoteKind::Up).unwrap();
        assert!(post.updated_at >= before);
        assert_eq!(post.upvote, vec!["u2"]);
    }

    #[test]
    fn response_serializes_camel_case_and_omits_absent_comments() {
        let post = Post::new("u1", "Hi".to_string(), String::new(), None, vec!["a".into()]);
        let value = serde_json::to_value(post.to_response(UserPublic::default())).unwrap();

        assert!(value.get("createdAt").is_some());
        assert!(value.get("created_at").is_none());
        assert!(value.get("comments").is_none());
    }
}
