use crate::{error::AppError, state::AppState};
use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::Next,
    response::Response,
};
use governor::{
    clock::DefaultClock,
    state::keyed::DashMapStateStore,
    Quota, RateLimiter,
};
use std::{num::NonZeroU32, sync::Arc};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

type KeyedRateLimiter = RateLimiter<String, DashMapStateStore<String>, DefaultClock>;
static RATE_LIMITER: OnceCell<KeyedRateLimiter> = OnceCell::const_new();

/// Makes the auth service available to the [`crate::services::auth::AuthUser`]
/// extractor on every request. The session gate itself runs in the extractor,
/// so public reads never pay for it.
pub async fn auth_context(
    State(app_state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next<Body>,
) -> Response {
    request
        .extensions_mut()
        .insert(Arc::new(app_state.auth_service.clone()));

    next.run(request).await
}

/// Per-IP rate limiting. Only mounted when `RATE_LIMIT_REQUESTS` is set to a
/// non-zero value.
pub async fn rate_limit(
    State(app_state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next<Body>,
) -> Result<Response, AppError> {
    let requests_per_minute = app_state.config.rate_limit_requests;

    let rate_limiter = RATE_LIMITER
        .get_or_init(|| async move {
            let quota = Quota::per_minute(
                NonZeroU32::new(requests_per_minute).unwrap_or(NonZeroU32::MIN),
            );
            RateLimiter::dashmap(quota)
        })
        .await;

    let client_ip = client_ip(&request);

    match rate_limiter.check_key(&client_ip) {
        Ok(_) => {
            debug!("Rate limit check passed for IP: {}", client_ip);
            Ok(next.run(request).await)
        }
        Err(_) => {
            warn!("Rate limit exceeded for IP: {}", client_ip);
            Err(AppError::RateLimitExceeded)
        }
    }
}

fn client_ip(request: &Request<Body>) -> String {
    let headers = request.headers();

    if let Some(forwarded_for) = headers.get("x-forwarded-for") {
        if let Ok(value) = forwarded_for.to_str() {
            if let Some(ip) = value.split(',').next() {
                return ip.trim().to_string();
            }
        }
    }

    if let Some(real_ip) = headers.get("x-real-ip") {
        if let Ok(value) = real_ip.to_str() {
            return value.to_string();
        }
    }

    "unknown".to_string()
}
