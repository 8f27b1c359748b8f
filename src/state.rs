use crate::{
    config::Config,
    services::{
        auth::AuthService, comment::CommentService, post::PostService, user::UserService,
    },
};

/// Shared application state: configuration plus one instance of each service.
/// The asset host client lives inside [`PostService`], which owns every image
/// lifecycle decision.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,

    pub auth_service: AuthService,

    pub user_service: UserService,

    pub post_service: PostService,

    pub comment_service: CommentService,
}
