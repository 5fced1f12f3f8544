use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    extract::{ApiJson, ApiQuery},
    messages,
    response::{failure, service_failure, success},
};
use crate::config::Config;
use crate::error::{Resource, ServiceError};
use crate::middleware::auth::{
    auth_middleware, bearer_token, validate_token, AuthState, Claims, ADMIN_ONLY, ANY_ROLE,
};
use crate::middleware::logging::ApiError;
use crate::services::authentication::{
    self as auth_service, LoginRequest, NewRole, RegisterUser, UpdateUserDetails,
};

//ROUTERS
pub fn authentication_router(db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let jwt = Arc::new(config.jwt.clone());

    let admin = Router::new()
        .route("/create-role", post(create_role))
        .route("/users-by-role", get(get_users_by_role))
        .route("/update-user", put(update_user_status))
        .route_layer(from_fn_with_state(
            AuthState::new(db.clone(), jwt.clone(), ADMIN_ONLY),
            auth_middleware,
        ));

    let users = Router::new()
        .route("/user-details", get(get_user_details))
        .route("/update-user-details", put(update_user_details))
        .route_layer(from_fn_with_state(
            AuthState::new(db.clone(), jwt, ANY_ROLE),
            auth_middleware,
        ));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/active-roles", get(get_active_roles))
        .merge(admin)
        .merge(users)
        .layer(Extension(db))
        .layer(Extension(config))
}

//ROUTES
/// Public, but a valid Admin bearer token lets the caller create accounts
/// with the `Admin` role.
async fn register(
    headers: HeaderMap,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    ApiJson(payload): ApiJson<RegisterUser>,
) -> Response {
    let registrar = match bearer_token(&headers) {
        Some(token) => validate_token(&db, &config.jwt, token, ADMIN_ONLY)
            .await
            .ok()
            .map(|claims| claims.sub),
        None => None,
    };

    match auth_service::register(&db, payload, registrar).await {
        Ok(user) => success(messages::USER_CREATION_SUCCESS, user),
        Err(err) => service_failure(err, messages::USER_CREATION_FAILED),
    }
}

async fn login(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(config): Extension<Arc<Config>>,
    ApiJson(payload): ApiJson<LoginRequest>,
) -> Response {
    match auth_service::login(&db, &config.jwt, config.lockout, payload).await {
        Ok(session) => success(messages::USER_LOGIN_SUCCESS, session),
        Err(err) => service_failure(err, messages::INVALID_CREDENTIALS),
    }
}

async fn create_role(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<NewRole>,
) -> Response {
    match auth_service::create_role(&db, payload, claims.sub).await {
        Ok(role) => success(messages::ROLE_CREATION_SUCCESS, role),
        Err(err) => service_failure(err, messages::ROLE_CREATION_FAILED),
    }
}

async fn get_active_roles(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match auth_service::active_roles(&db).await {
        Ok(roles) => success(messages::ROLES_RETRIEVAL_SUCCESS, roles),
        Err(err) => service_failure(err, messages::ROLE_NOT_EXIST),
    }
}

async fn get_users_by_role(
    ApiQuery(params): ApiQuery<RoleQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match auth_service::users_by_role(&db, &params.role_name).await {
        Ok(users) => success(messages::USERS_BY_ROLE_RETRIEVAL_SUCCESS, users),
        Err(ServiceError::NotFound(Resource::Role)) => failure(
            StatusCode::NOT_FOUND,
            messages::USERS_BY_ROLE_NOT_FOUND,
            ApiError::NotFound(params.role_name),
        ),
        Err(err) => service_failure(err, messages::USERS_BY_ROLE_NOT_FOUND),
    }
}

async fn get_user_details(
    ApiQuery(params): ApiQuery<UserIdQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(params.user_id) {
        return service_failure(err, messages::USER_NOT_EXIST);
    }

    match auth_service::user_details(&db, params.user_id).await {
        Ok(user) => success(messages::USER_DETAILS_RETRIEVAL_SUCCESS, user),
        Err(err) => service_failure(err, messages::USER_NOT_EXIST),
    }
}

async fn update_user_status(
    ApiQuery(params): ApiQuery<UpdateUserStatusQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    match auth_service::update_user_status(&db, params.id, params.is_active, claims.sub).await {
        Ok(user) => success(messages::USER_UPDATE_SUCCESS, user),
        Err(err) => service_failure(err, messages::USER_UPDATE_FAILED),
    }
}

async fn update_user_details(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<UpdateUserDetails>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(payload.user_id) {
        return service_failure(err, messages::USER_UPDATE_FAILED);
    }

    match auth_service::update_user_details(&db, payload, claims.sub).await {
        Ok(user) => success(messages::USER_UPDATE_SUCCESS, user),
        Err(err) => service_failure(err, messages::USER_UPDATE_FAILED),
    }
}

//Structs
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RoleQuery {
    role_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserIdQuery {
    user_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateUserStatusQuery {
    id: Uuid,
    is_active: bool,
}
