use axum::{
    http::{HeaderValue, Method},
    middleware,
    routing::{get, Router},
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    trace::TraceLayer,
};
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod error;
mod models;
mod routes;
mod services;
mod state;
mod utils;

use crate::{
    config::Config,
    services::{AssetService, AuthService, CommentService, Database, PostService, UserService},
    state::AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("LOG_LEVEL").unwrap_or_else(|_| "bantr=debug,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Bantr service...");

    dotenv::dotenv().ok();
    let config = Config::from_env()?;

    let db = Arc::new(match Database::new(&config).await {
        Ok(db) => {
            db.verify_connection().await?;
            info!("Database connection established successfully");
            db
        }
        Err(e) => {
            error!("Failed to create database connection: {}", e);
            return Err(anyhow::anyhow!("Database initialization failed"));
        }
    });

    let auth_service = AuthService::new(&config, db.clone()).await?;
    let user_service = UserService::new(db.clone()).await?;
    let asset_service = AssetService::new(&config).await?;
    let post_service = PostService::new(db.clone(), asset_service).await?;
    let comment_service = CommentService::new(db.clone(), user_service.clone()).await?;

    let app_state = Arc::new(AppState {
        config: config.clone(),
        auth_service,
        user_service,
        post_service,
        comment_service,
    });

    // Session cookies require credentialed CORS, so origins are listed
    // explicitly rather than allowing any.
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .allow_credentials(true)
        .allow_origin(
            config
                .cors_allowed_origins
                .split(',')
                .map(|origin| origin.parse::<HeaderValue>().unwrap())
                .collect::<Vec<_>>(),
        );

    let mut app = Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api/v1/users", routes::users::router())
        .nest("/api/v1/posts", routes::posts::router())
        .nest("/api/v1/comments", routes::comments::router())
        .layer(middleware::from_fn_with_state(
            app_state.clone(),
            utils::middleware::auth_context,
        ))
        .layer(cors)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http());

    if config.rate_limit_requests > 0 {
        app = app.layer(middleware::from_fn_with_state(
            app_state.clone(),
            utils::middleware::rate_limit,
        ));
    }

    let app = app.with_state(app_state);

    let addr = format!("{}:{}", config.server_host, config.server_port);
    info!("Starting server on http://{}", addr);

    axum::Server::bind(&addr.parse()?)
        .serve(app.into_make_service())
        .await?;

    Ok(())
}

async fn health_check() -> &'static str {
    "Bantr is running!"
}
