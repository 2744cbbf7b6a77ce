//! Bearer-token authentication and role gating.
//!
//! Tokens are HS256 JWTs signed with the shared `JWT_SECRET`. Handlers receive
//! the decoded [`Principal`] through the [`AuthUser`] and [`RequireTeacher`]
//! extractors; nothing is stashed on the request.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::headers::authorization::Bearer;
use axum_extra::headers::Authorization;
use axum_extra::TypedHeader;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Forbidden};
use crate::state::AppState;

pub const DEFAULT_TOKEN_EXPIRY_HOURS: i64 = 24;

/// Roles allowed to author courses.
pub const AUTHOR_ROLES: &[Role] = &[Role::Teacher, Role::Admin];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub id: Uuid,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Principal {
    fn from(claims: Claims) -> Self {
        Principal {
            id: claims.id,
            role: claims.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("No token provided")]
    NoCredential,
    #[error("Token format invalid")]
    Malformed,
    #[error("Invalid token")]
    Invalid,
    #[error("Token expired")]
    Expired,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub expiry_hours: i64,
}

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            expiry_hours: DEFAULT_TOKEN_EXPIRY_HOURS,
        }
    }
}

/// Mint a token for `id`/`role`. Login lives in another service; this is
/// used by tooling and tests.
pub fn issue_token(
    id: Uuid,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        id,
        role,
        iat: now,
        exp: now + config.expiry_hours * 3600,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

pub fn verify_token(token: &str, config: &JwtConfig) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AuthError::Expired,
        _ => AuthError::Invalid,
    })
}

/// Check that a principal exists and holds one of `allowed`.
pub fn require_role(principal: Option<&Principal>, allowed: &[Role]) -> Result<(), Forbidden> {
    let principal = principal.ok_or(Forbidden::NotAuthenticated)?;
    if allowed.contains(&principal.role) {
        Ok(())
    } else {
        Err(Forbidden::InsufficientRole)
    }
}

/// Any caller with a valid token.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub Principal);

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|rejection| {
                    if rejection.is_missing() {
                        AuthError::NoCredential
                    } else {
                        AuthError::Malformed
                    }
                })?;

        let claims = verify_token(bearer.token(), &state.jwt).map_err(|e| {
            tracing::debug!(error = %e, "rejected bearer token");
            e
        })?;
        Ok(AuthUser(claims.into()))
    }
}

/// A caller with the teacher or admin role.
#[derive(Debug, Clone, Copy)]
pub struct RequireTeacher(pub Principal);

#[axum::async_trait]
impl FromRequestParts<AppState> for RequireTeacher {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(principal) = AuthUser::from_request_parts(parts, state).await?;
        require_role(Some(&principal), AUTHOR_ROLES).map_err(|reason| {
            tracing::info!(user_id = %principal.id, role = ?principal.role, "role check failed");
            reason
        })?;
        Ok(RequireTeacher(principal))
    }
}
