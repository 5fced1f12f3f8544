use axum::{
    extract::Extension,
    middleware::from_fn_with_state,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::product::UserQuery;
use crate::api::{
    extract::{ApiJson, ApiPath, ApiQuery},
    messages,
    response::{service_failure, success, success_empty},
};
use crate::config::JwtConfig;
use crate::middleware::auth::{auth_middleware, AuthState, Claims, ADMIN_ONLY};
use crate::services::category::{
    self as category_service, NewCategory, UpdateCategory, UpdateCategoryStatus,
};

//ROUTERS
pub fn category_router(db: Arc<DatabaseConnection>, jwt: Arc<JwtConfig>) -> Router {
    let admin = Router::new()
        .route("/", post(add_category))
        .route("/update-category", put(update_category))
        .route("/update-category-status", put(update_category_status))
        .route("/:id", delete(delete_category))
        .route_layer(from_fn_with_state(
            AuthState::new(db.clone(), jwt, ADMIN_ONLY),
            auth_middleware,
        ));

    Router::new()
        .route("/all-categories", get(get_all_categories))
        .route("/active-categories", get(get_active_categories))
        .route("/:id", get(get_category))
        .merge(admin)
        .layer(Extension(db))
}

//ROUTES
async fn get_all_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match category_service::all_categories(&db).await {
        Ok(categories) => success(messages::CATEGORIES_RETRIEVAL_SUCCESS, categories),
        Err(err) => service_failure(err, messages::CATEGORY_NOT_EXIST),
    }
}

async fn get_active_categories(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match category_service::active_categories(&db).await {
        Ok(categories) => success(messages::CATEGORIES_RETRIEVAL_SUCCESS, categories),
        Err(err) => service_failure(err, messages::CATEGORY_NOT_EXIST),
    }
}

async fn get_category(
    ApiPath(id): ApiPath<Uuid>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match category_service::get_category(&db, id).await {
        Ok(category) => success(messages::CATEGORY_RETRIEVAL_SUCCESS, category),
        Err(err) => service_failure(err, messages::CATEGORY_NOT_EXIST),
    }
}

async fn add_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<NewCategory>,
) -> Response {
    match category_service::create_category(&db, payload, claims.sub).await {
        Ok(category) => success(messages::CATEGORY_CREATION_SUCCESS, category),
        Err(err) => service_failure(err, messages::CATEGORY_UPDATE_FAILED),
    }
}

async fn update_category(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<UpdateCategory>,
) -> Response {
    match category_service::update_category(&db, payload, claims.sub).await {
        Ok(()) => success_empty(messages::CATEGORY_UPDATE_SUCCESS),
        Err(err) => service_failure(err, messages::CATEGORY_UPDATE_FAILED),
    }
}

async fn update_category_status(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<UpdateCategoryStatus>,
) -> Response {
    match category_service::update_category_status(&db, payload, claims.sub).await {
        Ok(()) => success_empty(messages::CATEGORY_STATUS_UPDATE_SUCCESS),
        Err(err) => service_failure(err, messages::CATEGORY_STATUS_UPDATE_FAILED),
    }
}

async fn delete_category(
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<UserQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let actor = params.user_id.unwrap_or(claims.sub);
    if let Err(err) = claims.ensure_self_or_admin(actor) {
        return service_failure(err, messages::CATEGORY_REMOVE_FAILED);
    }

    match category_service::delete_category(&db, id, actor).await {
        Ok(()) => success_empty(messages::CATEGORY_REMOVE_SUCCESS),
        Err(err) => service_failure(err, messages::CATEGORY_REMOVE_FAILED),
    }
}
