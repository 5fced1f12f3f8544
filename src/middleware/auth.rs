use crate::api::{messages, response::failure};
use crate::config::JwtConfig;
use crate::entities::{role, user};
use crate::error::ServiceError;
use crate::identity;
use crate::middleware::logging::ApiError;
use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

/// Only administrators.
pub const ADMIN_ONLY: &[&str] = &[role::ADMIN];
/// Administrators and vendors.
pub const CATALOG_EDITORS: &[&str] = &[role::ADMIN, role::VENDOR];
/// Any authenticated, active user.
pub const ANY_ROLE: &[&str] = &[];

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: Request,
    next: Next,
) -> Response {
    let token = match bearer_token(req.headers()) {
        Some(token) => token.to_owned(),
        None => {
            return failure(
                StatusCode::UNAUTHORIZED,
                messages::UNAUTHORIZED,
                ApiError::Unauthorized("Missing bearer token".to_owned()),
            )
        }
    };

    let claims = match validate_token(&state.db, &state.jwt, &token, state.roles).await {
        Ok(claims) => claims,
        Err(AuthMiddlewareError::RoleNotAllowed) => {
            return failure(
                StatusCode::FORBIDDEN,
                messages::ACCESS_DENIED,
                ApiError::Forbidden,
            )
        }
        Err(AuthMiddlewareError::Database(err)) => {
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                messages::INTERNAL_SERVER_ERROR,
                ApiError::DbError(err.to_string()),
            )
        }
        Err(err) => {
            return failure(
                StatusCode::UNAUTHORIZED,
                messages::UNAUTHORIZED,
                ApiError::Unauthorized(err.to_string()),
            )
        }
    };

    debug!(user_id = %claims.sub, roles = ?claims.roles, "Authenticated request");
    req.extensions_mut().insert(claims);
    next.run(req).await
}

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub given_name: String,
    pub family_name: String,
    pub jti: Uuid,
    pub roles: Vec<String>,
    pub iss: String,
    pub aud: String,
    pub iat: usize,
    pub exp: usize,
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }

    pub fn is_admin(&self) -> bool {
        self.has_role(role::ADMIN)
    }

    /// Callers may address their own records; administrators may address anyone's.
    pub fn ensure_self_or_admin(&self, user_id: Uuid) -> Result<(), ServiceError> {
        if self.sub == user_id || self.is_admin() {
            Ok(())
        } else {
            Err(ServiceError::Forbidden)
        }
    }
}

#[derive(Clone, Debug)]
pub struct AuthState {
    pub db: Arc<DatabaseConnection>,
    pub jwt: Arc<JwtConfig>,
    /// Empty means any role.
    pub roles: &'static [&'static str],
}

impl AuthState {
    pub fn new(
        db: Arc<DatabaseConnection>,
        jwt: Arc<JwtConfig>,
        roles: &'static [&'static str],
    ) -> AuthState {
        AuthState { db, jwt, roles }
    }
}

#[derive(Clone, Debug)]
pub struct IssuedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

pub fn generate_token(
    jwt: &JwtConfig,
    user: &user::Model,
    roles: Vec<String>,
) -> Result<IssuedToken, AuthMiddlewareError> {
    let now = Utc::now();
    let expires_at = now
        .checked_add_signed(jwt.validity())
        .ok_or(AuthMiddlewareError::GenerationFail)?;

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        given_name: user.first_name.clone(),
        family_name: user.last_name.clone(),
        jti: Uuid::new_v4(),
        roles,
        iss: jwt.issuer.clone(),
        aud: jwt.audience.clone(),
        iat: now.timestamp() as usize,
        exp: expires_at.timestamp() as usize,
    };

    let token = encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt.secret.as_bytes()),
    )
    .map_err(|_| AuthMiddlewareError::GenerationFail)?;

    Ok(IssuedToken { token, expires_at })
}

/// Checks signature, issuer, audience and expiry. No clock skew is allowed.
pub fn decode_claims(jwt: &JwtConfig, token: &str) -> Result<Claims, AuthMiddlewareError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = true;
    validation.leeway = 0;
    validation.set_issuer(&[&jwt.issuer]);
    validation.set_audience(&[&jwt.audience]);

    decode::<Claims>(
        token,
        &DecodingKey::from_secret(jwt.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|err| AuthMiddlewareError::ValidationFail(err.to_string()))
}

/// Decodes the token, then re-reads the account so that deactivated users and
/// revoked roles lose access before the token expires.
pub async fn validate_token(
    db: &DatabaseConnection,
    jwt: &JwtConfig,
    token: &str,
    allowed_roles: &[&str],
) -> Result<Claims, AuthMiddlewareError> {
    let mut claims = decode_claims(jwt, token)?;

    let user = match identity::find_by_id(db, claims.sub).await? {
        Some(user) if user.is_active => user,
        _ => return Err(AuthMiddlewareError::InvalidUser),
    };

    claims.roles = identity::get_roles_for_user(db, &user).await?;

    if !allowed_roles.is_empty() && !allowed_roles.iter().any(|role| claims.has_role(role)) {
        return Err(AuthMiddlewareError::RoleNotAllowed);
    }

    Ok(claims)
}

#[derive(Error, Debug)]
pub enum AuthMiddlewareError {
    #[error("Unknown or inactive user")]
    InvalidUser,
    #[error("Role not allowed for this route")]
    RoleNotAllowed,
    #[error("Failed to validate token: {0}")]
    ValidationFail(String),
    #[error("Failed to generate token")]
    GenerationFail,
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jwt() -> JwtConfig {
        JwtConfig {
            secret: "unit-test-secret".to_owned(),
            issuer: "storefront".to_owned(),
            audience: "storefront".to_owned(),
            valid_hours: 8,
        }
    }

    fn user() -> user::Model {
        user::Model {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_owned(),
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            address: String::new(),
            password_hash: None,
            access_failed_count: 0,
            lockout_end: None,
            created_by: None,
            created_on: None,
            modified_by: None,
            modified_on: None,
            is_active: true,
        }
    }

    #[test]
    fn issued_token_decodes_with_roles_and_eight_hour_window() {
        let user = user();
        let issued = generate_token(&jwt(), &user, vec!["Customer".to_owned()])
            .expect("token generation failed");

        let claims = decode_claims(&jwt(), &issued.token).expect("token should decode");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "jane@example.com");
        assert!(claims.has_role("Customer"));
        assert!(!claims.is_admin());
        assert_eq!(claims.exp - claims.iat, 8 * 60 * 60);
    }

    #[test]
    fn token_signed_with_other_secret_is_rejected() {
        let issued = generate_token(&jwt(), &user(), vec![]).expect("token generation failed");
        let other = JwtConfig {
            secret: "another-secret".to_owned(),
            ..jwt()
        };
        assert!(decode_claims(&other, &issued.token).is_err());
    }

    #[test]
    fn token_for_other_audience_is_rejected() {
        let issued = generate_token(&jwt(), &user(), vec![]).expect("token generation failed");
        let other = JwtConfig {
            audience: "someone-else".to_owned(),
            ..jwt()
        };
        assert!(decode_claims(&other, &issued.token).is_err());
    }

    #[test]
    fn bearer_token_requires_the_scheme() {
        let mut headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Basic abc".parse().expect("header"));
        assert_eq!(bearer_token(&headers), None);

        headers.insert(header::AUTHORIZATION, "Bearer abc ".parse().expect("header"));
        assert_eq!(bearer_token(&headers), Some("abc"));
    }

    #[test]
    fn only_admins_may_address_other_users() {
        let mut claims = decode_claims(
            &jwt(),
            &generate_token(&jwt(), &user(), vec![]).expect("token generation failed").token,
        )
        .expect("token should decode");

        assert!(claims.ensure_self_or_admin(claims.sub).is_ok());
        assert!(claims.ensure_self_or_admin(Uuid::new_v4()).is_err());

        claims.roles.push(role::ADMIN.to_owned());
        assert!(claims.ensure_self_or_admin(Uuid::new_v4()).is_ok());
    }
}
