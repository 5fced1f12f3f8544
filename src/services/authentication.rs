use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{DatabaseConnection, TransactionTrait};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::config::{JwtConfig, LockoutPolicy};
use crate::entities::{
    role,
    user::{self, UserDetails},
};
use crate::error::{Resource, ServiceError, ServiceResult};
use crate::identity::{self, NewUser, PasswordCheck};
use crate::middleware::auth::generate_token;

static ROLE_NAME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z][A-Za-z0-9_-]{1,49}$").unwrap());

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct NewRole {
    #[validate(regex(path = *ROLE_NAME_REGEX))]
    pub role_name: String,
    #[validate(length(max = 500))]
    pub description: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    pub password: String,
    #[validate(regex(path = *ROLE_NAME_REGEX))]
    pub role: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    pub expiration: DateTime<Utc>,
    pub user_id: Uuid,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserDetails {
    pub user_id: Uuid,
    #[validate(length(min = 1, max = 100))]
    pub first_name: String,
    #[validate(length(min = 1, max = 100))]
    pub last_name: String,
    #[validate(email)]
    pub email: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub address: String,
    /// Empty keeps the current password.
    #[serde(default)]
    pub new_password: String,
    #[serde(default)]
    #[validate(must_match(other = "new_password", message = "Passwords do not match"))]
    pub confirm_password: String,
}

pub async fn create_role(
    db: &DatabaseConnection,
    payload: NewRole,
    actor: Uuid,
) -> ServiceResult<role::Model> {
    payload.validate()?;
    let role =
        identity::create_role(db, &payload.role_name, payload.description, Some(actor)).await?;
    info!(role = %role.name, "Created role");
    Ok(role)
}

pub async fn active_roles(db: &DatabaseConnection) -> ServiceResult<Vec<role::Model>> {
    Ok(identity::active_roles(db).await?)
}

/// Only an administrator may hand out the `Admin` role.
pub fn ensure_may_register(role_name: &str, registrar: Option<Uuid>) -> ServiceResult<()> {
    if role_name == role::ADMIN && registrar.is_none() {
        return Err(ServiceError::Forbidden);
    }
    Ok(())
}

/// Creates the account and its role membership atomically. Customers start
/// inactive until an administrator enables them. `registrar` is the
/// administrator making the request, if any.
pub async fn register(
    db: &DatabaseConnection,
    payload: RegisterUser,
    registrar: Option<Uuid>,
) -> ServiceResult<UserDetails> {
    payload.validate()?;
    if let Err(err) = ensure_may_register(&payload.role, registrar) {
        warn!(
            email = %payload.email,
            role = %payload.role,
            "Refused privileged self-registration"
        );
        return Err(err);
    }

    let txn = db.begin().await?;

    if identity::find_role_by_name(&txn, &payload.role).await?.is_none() {
        return Err(ServiceError::NotFound(Resource::Role));
    }

    let new_user = NewUser {
        email: payload.email,
        first_name: payload.first_name,
        last_name: payload.last_name,
        address: payload.address,
        created_by: registrar,
        is_active: payload.role != role::CUSTOMER,
    };
    let user = identity::create_user(&txn, new_user, &payload.password).await?;
    identity::add_to_role(&txn, &user, &payload.role).await?;

    txn.commit().await?;
    info!(user_id = %user.id, role = %payload.role, "Registered user");

    Ok(user.into())
}

pub async fn login(
    db: &DatabaseConnection,
    jwt: &JwtConfig,
    lockout: LockoutPolicy,
    payload: LoginRequest,
) -> ServiceResult<LoginResponse> {
    payload
        .validate()
        .map_err(|_| ServiceError::Unauthorized)?;

    let user = match identity::find_by_email(db, &payload.email).await? {
        Some(user) if user.is_active => user,
        Some(user) => {
            warn!(user_id = %user.id, "Login attempt for inactive user");
            return Err(ServiceError::Unauthorized);
        }
        None => return Err(ServiceError::Unauthorized),
    };

    match identity::check_password(db, &user, &payload.password, lockout).await? {
        PasswordCheck::Success => {}
        PasswordCheck::Failed => return Err(ServiceError::Unauthorized),
        PasswordCheck::LockedOut => {
            warn!(user_id = %user.id, "Login attempt for locked out user");
            return Err(ServiceError::Unauthorized);
        }
    }

    let roles = identity::get_roles_for_user(db, &user).await?;
    let issued = generate_token(jwt, &user, roles)
        .map_err(|err| ServiceError::Internal(err.to_string()))?;

    info!(user_id = %user.id, "User logged in");
    Ok(LoginResponse {
        token: issued.token,
        expiration: issued.expires_at,
        user_id: user.id,
        email: user.email,
    })
}

pub async fn users_by_role(
    db: &DatabaseConnection,
    role_name: &str,
) -> ServiceResult<Vec<UserDetails>> {
    let users = identity::users_in_role(db, role_name).await?;
    Ok(users.into_iter().map(UserDetails::from).collect())
}

pub async fn user_details(db: &DatabaseConnection, user_id: Uuid) -> ServiceResult<UserDetails> {
    identity::find_by_id(db, user_id)
        .await?
        .map(UserDetails::from)
        .ok_or(ServiceError::NotFound(Resource::User))
}

/// Enables or disables an account.
pub async fn update_user_status(
    db: &DatabaseConnection,
    user_id: Uuid,
    is_active: bool,
    actor: Uuid,
) -> ServiceResult<UserDetails> {
    let user = identity::find_by_id(db, user_id)
        .await?
        .ok_or(ServiceError::NotFound(Resource::User))?;

    let updated = identity::update_user(
        db,
        user::Model {
            is_active,
            modified_by: Some(actor),
            ..user
        },
    )
    .await?;

    info!(user_id = %updated.id, is_active, "Updated user status");
    Ok(updated.into())
}

/// Updates the profile and, when `newPassword` is set, replaces the password.
/// The new password is checked against the policy before anything is written.
pub async fn update_user_details(
    db: &DatabaseConnection,
    payload: UpdateUserDetails,
    actor: Uuid,
) -> ServiceResult<UserDetails> {
    payload.validate()?;
    let change_password = !payload.new_password.is_empty();
    if change_password {
        identity::password::check_policy(&payload.new_password)
            .map_err(ServiceError::Validation)?;
    }

    let txn = db.begin().await?;

    let user = identity::find_by_id(&txn, payload.user_id)
        .await?
        .ok_or(ServiceError::NotFound(Resource::User))?;

    let mut updated = identity::update_user(
        &txn,
        user::Model {
            email: payload.email,
            first_name: payload.first_name,
            last_name: payload.last_name,
            address: payload.address,
            modified_by: Some(actor),
            ..user
        },
    )
    .await?;

    if change_password {
        updated = identity::remove_password(&txn, updated).await?;
        updated = identity::add_password(&txn, updated, &payload.new_password).await?;
    }

    txn.commit().await?;
    info!(user_id = %updated.id, change_password, "Updated user details");

    Ok(updated.into())
}
