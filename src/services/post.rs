use crate::{
    error::{AppError, Result},
    models::post::{CreatePostRequest, Post, TagCount, UpdatePostRequest},
    models::vote::VoteKind,
    services::{AssetService, Database},
    utils::{
        pagination::{paginate, PageInfo, PageRequest},
        tags, validation,
    },
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Clone)]
pub struct PostService {
    db: Arc<Database>,
    assets: AssetService,
}

impl PostService {
    pub async fn new(db: Arc<Database>, assets: AssetService) -> Result<Self> {
        Ok(Self { db, assets })
    }

    /// Creates a post owned by the requester. An attached image is uploaded
    /// to the asset host first; the document is only written once the upload
    /// has succeeded.
    pub async fn create_post(&self, author_id: &str, request: CreatePostRequest) -> Result<Post> {
        debug!("Creating post for user: {}", author_id);

        validation::require_non_blank(&request.title, "Title is required")?;
        validation::validate_tags(&request.tags, self.db.config.max_tags_per_post)?;

        let image = match request.image.as_deref() {
            Some(data_url) => Some(self.assets.upload(data_url).await?),
            None => None,
        };

        let post = Post::new(
            author_id,
            request.title,
            request.content.unwrap_or_default(),
            image,
            request.tags,
        );

        let created = self.db.create("post", &post.id, &post).await?;

        info!("Created post: {} by user: {}", created.id, author_id);
        Ok(created)
    }

    /// Replaces the provided fields after an ownership check. A new image
    /// discards the previously-stored asset before the replacement is
    /// uploaded.
    pub async fn update_post(
        &self,
        post_id: &str,
        user_id: &str,
        request: UpdatePostRequest,
    ) -> Result<Post> {
        let post = self.get_post(post_id).await?;

        if post.author != user_id {
            return Err(AppError::unauthorized("Unauthorized"));
        }

        if let Some(title) = request.title.as_deref() {
            validation::require_non_blank(title, "Title is required")?;
        }
        if let Some(tags) = request.tags.as_deref() {
            validation::validate_tags(tags, self.db.config.max_tags_per_post)?;
        }

        let mut updates = json!({ "updated_at": Utc::now() });

        if let Some(data_url) = request.image.as_deref() {
            if let Some(old_image) = post.image.as_deref() {
                self.discard_asset(old_image).await;
            }
            updates["image"] = json!(self.assets.upload(data_url).await?);
        }

        if let Some(title) = request.title {
            updates["title"] = json!(title);
        }
        if let Some(content) = request.content {
            updates["content"] = json!(content);
        }
        if let Some(tags) = request.tags {
            updates["tags"] = json!(tags);
        }

        let updated: Post = self
            .db
            .update_by_id_with_json("post", post_id, updates)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))?;

        info!("Updated post: {}", post_id);
        Ok(updated)
    }

    /// Deletes a post after an ownership check, cascading to every comment of
    /// the post (top-level and replies) and discarding its stored image.
    pub async fn delete_post(&self, post_id: &str, user_id: &str) -> Result<()> {
        let post = self.get_post(post_id).await?;

        if post.author != user_id {
            return Err(AppError::unauthorized("Unauthorized"));
        }

        if let Some(image) = post.image.as_deref() {
            self.discard_asset(image).await;
        }

        self.db
            .query_with_params(
                "DELETE comment WHERE parent_post = $post",
                json!({ "post": post_id }),
            )
            .await?;
        self.db.delete_by_id("post", post_id).await?;

        info!("Deleted post: {} and its comments", post_id);
        Ok(())
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        validation::validate_record_id(post_id)?;

        self.db
            .get_by_id("post", post_id)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    /// Posts by one author, newest first.
    pub async fn posts_by_author(
        &self,
        author_id: &str,
        page: PageRequest,
    ) -> Result<(Vec<Post>, PageInfo)> {
        validation::validate_record_id(author_id)?;

        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM post WHERE author = $author ORDER BY created_at DESC",
                json!({ "author": author_id }),
            )
            .await?;
        let posts: Vec<Post> = response.take(0)?;

        Ok(paginate(posts, page))
    }

    /// All posts, newest first, optionally narrowed by comma-separated tag
    /// filters (every filter must match).
    pub async fn list_posts(
        &self,
        tag_filters: Option<&str>,
        page: PageRequest,
    ) -> Result<(Vec<Post>, PageInfo)> {
        let filters: Vec<&str> = tag_filters
            .map(|raw| raw.split(',').filter(|f| !f.trim().is_empty()).collect())
            .unwrap_or_default();

        let posts = self.filtered_posts(&filters).await?;
        Ok(paginate(posts, page))
    }

    /// Free-text tag search: whitespace-separated tokens, all of which must
    /// match.
    pub async fn search_posts(
        &self,
        tag_query: &str,
        page: PageRequest,
    ) -> Result<(Vec<Post>, PageInfo)> {
        let tokens = tags::query_tokens(tag_query);
        if tokens.is_empty() {
            return Err(AppError::validation("Tag not given"));
        }

        let posts = self.filtered_posts(&tokens).await?;
        Ok(paginate(posts, page))
    }

    pub async fn cast_vote(&self, post_id: &str, user_id: &str, kind: VoteKind) -> Result<Post> {
        let mut post = self.get_post(post_id).await?;
        post.cast_vote(user_id, kind)?;
        self.persist_votes(&post).await
    }

    pub async fn retract_vote(&self, post_id: &str, user_id: &str, kind: VoteKind) -> Result<Post> {
        let mut post = self.get_post(post_id).await?;
        post.retract_vote(user_id, kind)?;
        self.persist_votes(&post).await
    }

    /// The ten most frequent tags across all posts, descending.
    pub async fn popular_tags(&self) -> Result<Vec<TagCount>> {
        #[derive(Debug, Deserialize)]
        struct TagsField {
            tags: Vec<String>,
        }

        let mut response = self.db.query_with_params("SELECT tags FROM post", json!({})).await?;
        let tag_lists: Vec<TagsField> = response.take(0)?;

        Ok(tags::top_tags(tag_lists.iter().map(|record| &record.tags), 10)
            .into_iter()
            .map(|(tag, count)| TagCount { tag, count })
            .collect())
    }

    async fn filtered_posts(&self, filters: &[&str]) -> Result<Vec<Post>> {
        let patterns = tags::compile_patterns(filters.iter().copied())?;

        let mut response = self
            .db
            .query_with_params(
                "SELECT *, meta::id(id) AS id FROM post ORDER BY created_at DESC",
                json!({}),
            )
            .await?;
        let posts: Vec<Post> = response.take(0)?;

        Ok(posts
            .into_iter()
            .filter(|post| tags::matches_all(&post.tags, &patterns))
            .collect())
    }

    async fn persist_votes(&self, post: &Post) -> Result<Post> {
        let updates = json!({
            "upvote": post.upvote,
            "downvote": post.downvote,
            "updated_at": post.updated_at,
        });

        self.db
            .update_by_id_with_json("post", &post.id, updates)
            .await?
            .ok_or_else(|| AppError::not_found("Post"))
    }

    /// Asset cleanup is best-effort: a host failure is logged and the delete
    /// or update proceeds.
    async fn discard_asset(&self, asset_url: &str) {
        if let Err(e) = self.assets.destroy(asset_url).await {
            warn!("Failed to discard image asset {}: {}", asset_url, e);
        }
    }
}
