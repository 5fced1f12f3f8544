//! User, role and credential store.
//!
//! Everything the workflows need from identity goes through these functions:
//! lookups, account creation, password checks with lockout, and role
//! membership. Hashing is argon2; nothing here rolls its own crypto.

pub mod password;

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, ModelTrait, QueryFilter,
    QueryOrder, Set,
};
use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::LockoutPolicy;
use crate::entities::{
    role::{self, Entity as RoleEntity},
    user::{self, Entity as UserEntity},
    user_role,
};

#[derive(Error, Debug)]
pub enum IdentityError {
    #[error("Email is already registered")]
    DuplicateEmail,
    #[error("Role already exists")]
    DuplicateRole,
    #[error("Role {0} does not exist")]
    RoleNotFound(String),
    #[error("User does not exist")]
    UserNotFound,
    #[error("{0}")]
    PasswordPolicy(String),
    #[error("User already has a password set")]
    PasswordAlreadySet,
    #[error("Failed to hash password: {0}")]
    Hash(String),
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

#[derive(Clone, Debug)]
pub struct NewUser {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub address: String,
    pub created_by: Option<Uuid>,
    pub is_active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PasswordCheck {
    Success,
    Failed,
    LockedOut,
}

pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_by_email<C: ConnectionTrait>(
    db: &C,
    email: &str,
) -> Result<Option<user::Model>, DbErr> {
    UserEntity::find()
        .filter(user::Column::Email.eq(normalize_email(email)))
        .one(db)
        .await
}

pub async fn find_by_id<C: ConnectionTrait>(
    db: &C,
    id: Uuid,
) -> Result<Option<user::Model>, DbErr> {
    UserEntity::find_by_id(id).one(db).await
}

pub async fn create_user<C: ConnectionTrait>(
    db: &C,
    new_user: NewUser,
    password: &str,
) -> Result<user::Model, IdentityError> {
    password::check_policy(password).map_err(IdentityError::PasswordPolicy)?;

    if find_by_email(db, &new_user.email).await?.is_some() {
        return Err(IdentityError::DuplicateEmail);
    }

    let password_hash =
        password::hash_password(password).map_err(|err| IdentityError::Hash(err.to_string()))?;
    let now = Utc::now();

    let model = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(normalize_email(&new_user.email)),
        first_name: Set(new_user.first_name),
        last_name: Set(new_user.last_name),
        address: Set(new_user.address),
        password_hash: Set(Some(password_hash)),
        access_failed_count: Set(0),
        lockout_end: Set(None),
        created_by: Set(new_user.created_by),
        created_on: Set(Some(now)),
        modified_by: Set(new_user.created_by),
        modified_on: Set(Some(now)),
        is_active: Set(new_user.is_active),
    };

    Ok(model.insert(db).await?)
}

/// Verifies a password and keeps the failed-attempt counter and lockout window
/// up to date.
pub async fn check_password<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
    password: &str,
    policy: LockoutPolicy,
) -> Result<PasswordCheck, IdentityError> {
    let now = Utc::now();
    if user.is_locked_out(now) {
        return Ok(PasswordCheck::LockedOut);
    }

    let matches = user
        .password_hash
        .as_deref()
        .map(|hash| password::verify_password(password, hash))
        .unwrap_or(false);

    let mut entry: user::ActiveModel = user.clone().into();

    if matches {
        if user.access_failed_count != 0 || user.lockout_end.is_some() {
            entry.access_failed_count = Set(0);
            entry.lockout_end = Set(None);
            entry.update(db).await?;
        }
        return Ok(PasswordCheck::Success);
    }

    let failed = user.access_failed_count + 1;
    if failed >= policy.max_failed_attempts {
        warn!(user_id = %user.id, "Too many failed logins, locking account");
        entry.access_failed_count = Set(0);
        entry.lockout_end = Set(Some(now + policy.window()));
    } else {
        entry.access_failed_count = Set(failed);
    }
    entry.update(db).await?;

    Ok(PasswordCheck::Failed)
}

/// Persists profile changes (names, email, address, active flag, audit
/// stamps). Moving the email onto another account's is rejected.
pub async fn update_user<C: ConnectionTrait>(
    db: &C,
    updated: user::Model,
) -> Result<user::Model, IdentityError> {
    let email = normalize_email(&updated.email);
    if let Some(existing) = find_by_email(db, &email).await? {
        if existing.id != updated.id {
            return Err(IdentityError::DuplicateEmail);
        }
    }

    let current = find_by_id(db, updated.id)
        .await?
        .ok_or(IdentityError::UserNotFound)?;

    let mut entry: user::ActiveModel = current.into();
    entry.email = Set(email);
    entry.first_name = Set(updated.first_name);
    entry.last_name = Set(updated.last_name);
    entry.address = Set(updated.address);
    entry.is_active = Set(updated.is_active);
    entry.modified_by = Set(updated.modified_by);
    entry.modified_on = Set(Some(Utc::now()));

    Ok(entry.update(db).await?)
}

pub async fn remove_password<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
) -> Result<user::Model, IdentityError> {
    let mut entry: user::ActiveModel = user.into();
    entry.password_hash = Set(None);
    entry.modified_on = Set(Some(Utc::now()));
    Ok(entry.update(db).await?)
}

/// Only valid for accounts without a password; pair with [`remove_password`].
pub async fn add_password<C: ConnectionTrait>(
    db: &C,
    user: user::Model,
    password: &str,
) -> Result<user::Model, IdentityError> {
    if user.password_hash.is_some() {
        return Err(IdentityError::PasswordAlreadySet);
    }
    password::check_policy(password).map_err(IdentityError::PasswordPolicy)?;
    let password_hash =
        password::hash_password(password).map_err(|err| IdentityError::Hash(err.to_string()))?;

    let mut entry: user::ActiveModel = user.into();
    entry.password_hash = Set(Some(password_hash));
    entry.modified_on = Set(Some(Utc::now()));
    Ok(entry.update(db).await?)
}

pub async fn find_role_by_name<C: ConnectionTrait>(
    db: &C,
    name: &str,
) -> Result<Option<role::Model>, DbErr> {
    RoleEntity::find()
        .filter(role::Column::Name.eq(name))
        .one(db)
        .await
}

pub async fn create_role<C: ConnectionTrait>(
    db: &C,
    name: &str,
    description: Option<String>,
    created_by: Option<Uuid>,
) -> Result<role::Model, IdentityError> {
    if find_role_by_name(db, name).await?.is_some() {
        return Err(IdentityError::DuplicateRole);
    }
    let now = Utc::now();
    let model = role::ActiveModel {
        id: Set(Uuid::new_v4()),
        name: Set(name.to_owned()),
        description: Set(description),
        created_by: Set(created_by),
        created_on: Set(Some(now)),
        modified_by: Set(created_by),
        modified_on: Set(Some(now)),
        is_active: Set(true),
    };
    Ok(model.insert(db).await?)
}

pub async fn active_roles<C: ConnectionTrait>(db: &C) -> Result<Vec<role::Model>, DbErr> {
    RoleEntity::find()
        .filter(role::Column::IsActive.eq(true))
        .order_by_asc(role::Column::Name)
        .all(db)
        .await
}

pub async fn add_to_role<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
    role_name: &str,
) -> Result<(), IdentityError> {
    let role = find_role_by_name(db, role_name)
        .await?
        .ok_or_else(|| IdentityError::RoleNotFound(role_name.to_owned()))?;

    let already_member = user_role::Entity::find_by_id((user.id, role.id))
        .one(db)
        .await?
        .is_some();
    if already_member {
        return Ok(());
    }

    user_role::ActiveModel {
        user_id: Set(user.id),
        role_id: Set(role.id),
    }
    .insert(db)
    .await?;
    info!(user_id = %user.id, role = role_name, "Added user to role");

    Ok(())
}

pub async fn get_roles_for_user<C: ConnectionTrait>(
    db: &C,
    user: &user::Model,
) -> Result<Vec<String>, DbErr> {
    let roles = user
        .find_related(RoleEntity)
        .order_by_asc(role::Column::Name)
        .all(db)
        .await?;
    Ok(roles.into_iter().map(|role| role.name).collect())
}

pub async fn users_in_role<C: ConnectionTrait>(
    db: &C,
    role_name: &str,
) -> Result<Vec<user::Model>, IdentityError> {
    let role = find_role_by_name(db, role_name)
        .await?
        .ok_or_else(|| IdentityError::RoleNotFound(role_name.to_owned()))?;

    Ok(role
        .find_related(UserEntity)
        .order_by_asc(user::Column::Email)
        .all(db)
        .await?)
}
