use crate::{
    error::{AppError, Result},
    models::user::{User, UserPublic},
    services::Database,
    utils::validation,
};
use chrono::Utc;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Clone)]
pub struct UserService {
    db: Arc<Database>,
}

impl UserService {
    pub async fn new(db: Arc<Database>) -> Result<Self> {
        Ok(Self { db })
    }

    /// Creates a user with an already-hashed password. Usernames are unique.
    pub async fn create(&self, username: &str, password_hash: &str) -> Result<User> {
        validation::require_non_blank(username, "All fields are required")?;

        let existing: Option<User> = self.db.find_one("user", "username", username).await?;
        if existing.is_some() {
            return Err(AppError::validation("Username already exists"));
        }

        let user = User::new(username.to_string(), password_hash.to_string());
        let created = self.db.create("user", &user.id, &user).await?;

        info!("Created user: {}", created.id);
        Ok(created)
    }

    pub async fn find_by_username(&self, username: &str) -> Result<Option<User>> {
        self.db.find_one("user", "username", username).await
    }

    pub async fn get(&self, user_id: &str) -> Result<Option<User>> {
        self.db.get_by_id("user", user_id).await
    }

    pub async fn update_profile_pic(&self, user_id: &str, profile_pic: &str) -> Result<User> {
        validation::require_non_blank(profile_pic, "All fields are required")?;

        let user: Option<User> = self.db.get_by_id("user", user_id).await?;
        if user.is_none() {
            return Err(AppError::not_found("User"));
        }

        let updates = json!({
            "profile_pic": profile_pic,
            "updated_at": Utc::now(),
        });

        let updated: User = self
            .db
            .update_by_id_with_json("user", user_id, updates)
            .await?
            .ok_or_else(|| AppError::internal("Failed to update user"))?;

        debug!("Updated profile picture for user: {}", user_id);
        Ok(updated)
    }

    /// Resolves a set of user ids to their public shapes for embedding in
    /// post and comment responses. Vanished users fall back to an empty
    /// placeholder rather than failing the read.
    pub async fn public_profiles(&self, user_ids: &[&str]) -> Result<HashMap<String, UserPublic>> {
        let mut distinct: Vec<&str> = user_ids.to_vec();
        distinct.sort_unstable();
        distinct.dedup();

        let lookups = distinct
            .iter()
            .map(|id| self.db.get_by_id::<User>("user", id));
        let users = futures::future::try_join_all(lookups).await?;

        Ok(users
            .into_iter()
            .flatten()
            .map(|user| (user.id.clone(), user.to_public()))
            .collect())
    }
}
