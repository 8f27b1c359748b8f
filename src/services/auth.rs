use crate::{
    config::Config,
    error::{AppError, Result},
    models::user::User,
    services::Database,
};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header, request::Parts, HeaderMap},
    Extension, RequestPartsExt,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

/// Name of the HTTP-only session cookie.
pub const SESSION_COOKIE: &str = "jwt";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

/// Identity and session gate: issues and verifies session tokens and resolves
/// them to stored users. Stateless apart from the database lookup.
#[derive(Clone)]
pub struct AuthService {
    config: Config,
    db: Arc<Database>,
}

impl AuthService {
    pub async fn new(config: &Config, db: Arc<Database>) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            db,
        })
    }

    pub fn hash_password(&self, password: &str) -> Result<String> {
        hash_password(password)
    }

    pub fn verify_password(&self, password: &str, hash: &str) -> bool {
        verify_password(password, hash)
    }

    pub fn issue_token(&self, user_id: &str) -> Result<String> {
        encode_token(&self.config.jwt_secret, user_id, self.config.session_ttl_days)
    }

    /// Verifies the token and resolves it to a stored user. The password hash
    /// stays on the struct but is never serialized to clients.
    pub async fn authenticate(&self, token: &str) -> Result<User> {
        let claims = decode_token(&self.config.jwt_secret, token)?;

        let user: Option<User> = self.db.get_by_id("user", &claims.sub).await?;
        user.ok_or_else(|| AppError::unauthorized("Unauthorized - User not found"))
    }

    /// `Set-Cookie` value carrying the session token, 6-day expiry by default.
    pub fn session_cookie(&self, token: &str) -> String {
        let max_age = self.config.session_ttl_days * 24 * 60 * 60;
        format!(
            "{}={}; HttpOnly; Path=/; Max-Age={}; SameSite={}{}",
            SESSION_COOKIE,
            token,
            max_age,
            self.same_site(),
            self.secure_attribute()
        )
    }

    /// `Set-Cookie` value that clears the session cookie.
    pub fn expired_session_cookie(&self) -> String {
        format!(
            "{}=; HttpOnly; Path=/; Max-Age=0; SameSite={}{}",
            SESSION_COOKIE,
            self.same_site(),
            self.secure_attribute()
        )
    }

    fn same_site(&self) -> &'static str {
        // Cross-site frontends need SameSite=None, which browsers only accept
        // over HTTPS.
        if self.config.is_production() {
            "None"
        } else {
            "Strict"
        }
    }

    fn secure_attribute(&self) -> &'static str {
        if self.config.is_production() {
            "; Secure"
        } else {
            ""
        }
    }
}

/// Extracts the session token from the request's `Cookie` header.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(&format!("Failed to hash password: {}", e)))
}

fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash)
        .map(|parsed| {
            Argon2::default()
                .verify_password(password.as_bytes(), &parsed)
                .is_ok()
        })
        .unwrap_or(false)
}

fn encode_token(secret: &str, user_id: &str, ttl_days: i64) -> Result<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::days(ttl_days)).timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_ref()),
    )
    .map_err(AppError::from)
}

fn decode_token(secret: &str, token: &str) -> Result<Claims> {
    let validation = Validation::new(Algorithm::HS256);
    match decode::<Claims>(token, &DecodingKey::from_secret(secret.as_ref()), &validation) {
        Ok(data) => Ok(data.claims),
        Err(e) => {
            debug!("JWT verification failed: {}", e);
            Err(AppError::unauthorized("Unauthorized - Invalid Token"))
        }
    }
}

/// Extractor for handlers that require an authenticated user. Missing cookie,
/// failed verification, and a vanished user all reject with 401.
pub struct AuthUser(pub User);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self> {
        let token = session_token(&parts.headers)
            .ok_or_else(|| AppError::unauthorized("Unauthorized - No token Provided"))?;

        let Extension(auth_service) = parts
            .extract::<Extension<Arc<AuthService>>>()
            .await
            .map_err(|_| AppError::internal("Auth service not found in request extensions"))?;

        let user = auth_service.authenticate(&token).await?;
        Ok(AuthUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret";

    #[test]
    fn token_round_trip_resolves_the_subject() {
        let token = encode_token(SECRET, "user-1", 6).unwrap();
        let claims = decode_token(SECRET, &token).unwrap();

        assert_eq!(claims.sub, "user-1");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn garbage_and_wrong_key_tokens_are_rejected() {
        assert!(decode_token(SECRET, "not-a-token").is_err());

        let token = encode_token("other-secret", "user-1", 6).unwrap();
        let err = decode_token(SECRET, &token).unwrap_err();
        assert!(err.to_string().contains("Invalid Token"));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let token = encode_token(SECRET, "user-1", -1).unwrap();
        assert!(decode_token(SECRET, &token).is_err());
    }

    #[test]
    fn password_hash_verifies_and_rejects() {
        let hash = hash_password("hunter42").unwrap();

        assert_ne!(hash, "hunter42");
        assert!(verify_password("hunter42", &hash));
        assert!(!verify_password("hunter43", &hash));
        assert!(!verify_password("hunter42", "not-a-hash"));
    }

    #[test]
    fn session_token_is_read_from_the_cookie_header() {
        let mut headers = HeaderMap::new();
        assert_eq!(session_token(&headers), None);

        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; jwt=abc.def.ghi; other=1"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("abc.def.ghi"));
    }
}
