//! Bearer-token authentication.
//!
//! HS256 JWTs whose subject is the user id. The boundary middleware
//! [`require_auth`] verifies the `Authorization: Bearer` header and injects
//! [`AuthUser`] as a request extension; handlers never see raw tokens.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::store::Store;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    /// Expiration time (Unix timestamp)
    pub exp: usize,
    /// Issued at (Unix timestamp)
    pub iat: usize,
}

/// Authenticated user extracted from a verified token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i64,
}

/// Token issuer/verifier. Cheap to clone; shared through [`AppState`].
#[derive(Clone)]
pub struct Tokens {
    secret: String,
    ttl_secs: i64,
}

impl Tokens {
    pub fn new(secret: impl Into<String>, ttl_secs: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_secs,
        }
    }

    /// Sign a token for the given user.
    pub fn issue(&self, user_id: i64) -> Result<String> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now as usize,
            exp: (now + self.ttl_secs) as usize,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;
        Ok(token)
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<i64> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::new(Algorithm::HS256),
        )
        .map_err(|_| AppError::InvalidToken)?;

        data.claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::InvalidToken)
    }
}

/// Middleware that requires valid bearer authentication.
pub async fn require_auth<S: Store>(
    State(state): State<AppState<S>>,
    mut request: Request,
    next: Next,
) -> Result<Response> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let user_id = state.tokens.verify(token)?;
    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}
