use axum::{
    extract::Extension,
    middleware::from_fn_with_state,
    response::Response,
    routing::{delete, get, post, put},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::{
    extract::{ApiJson, ApiPath, ApiQuery},
    messages,
    response::{service_failure, success},
};
use crate::config::JwtConfig;
use crate::middleware::auth::{auth_middleware, AuthState, Claims, CATALOG_EDITORS};
use crate::services::product::{self as product_service, Editor, NewProduct, UpdateProduct};

//ROUTERS
pub fn product_router(db: Arc<DatabaseConnection>, jwt: Arc<JwtConfig>) -> Router {
    let editors = Router::new()
        .route("/", post(add_product))
        .route("/update-product", put(update_product))
        .route("/:id", delete(delete_product))
        .route_layer(from_fn_with_state(
            AuthState::new(db.clone(), jwt, CATALOG_EDITORS),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(get_all_products))
        .route("/get-product", get(get_product))
        .route("/get-vendor-products", get(get_vendor_products))
        .merge(editors)
        .layer(Extension(db))
}

//ROUTES
async fn get_all_products(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match product_service::list_products(&db).await {
        Ok(products) => success(messages::PRODUCTS_RETRIEVAL_SUCCESS, products),
        Err(err) => service_failure(err, messages::PRODUCT_NOT_EXIST),
    }
}

async fn get_product(
    ApiQuery(params): ApiQuery<IdQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match product_service::get_product(&db, params.id).await {
        Ok(product) => success(messages::PRODUCT_RETRIEVAL_SUCCESS, product),
        Err(err) => service_failure(err, messages::PRODUCT_NOT_EXIST),
    }
}

async fn get_vendor_products(
    ApiQuery(params): ApiQuery<IdQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
) -> Response {
    match product_service::list_vendor_products(&db, params.id).await {
        Ok(products) => success(messages::PRODUCTS_RETRIEVAL_SUCCESS, products),
        Err(err) => service_failure(err, messages::PRODUCT_NOT_EXIST),
    }
}

async fn add_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<NewProduct>,
) -> Response {
    if let Err(err) = product_service::create_product(&db, payload, claims.sub).await {
        return service_failure(err, messages::PRODUCT_CREATION_FAILED);
    }

    // Callers get the refreshed catalog back.
    match product_service::list_products(&db).await {
        Ok(products) => success(messages::PRODUCT_CREATION_SUCCESS, products),
        Err(err) => service_failure(err, messages::PRODUCT_CREATION_FAILED),
    }
}

async fn update_product(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<UpdateProduct>,
) -> Response {
    let editor = Editor {
        id: claims.sub,
        is_admin: claims.is_admin(),
    };
    if let Err(err) = product_service::update_product(&db, payload, editor).await {
        return service_failure(err, messages::PRODUCT_UPDATE_FAILED);
    }

    match product_service::list_products(&db).await {
        Ok(products) => success(messages::PRODUCT_UPDATE_SUCCESS, products),
        Err(err) => service_failure(err, messages::PRODUCT_UPDATE_FAILED),
    }
}

async fn delete_product(
    ApiPath(id): ApiPath<Uuid>,
    ApiQuery(params): ApiQuery<UserQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let actor = params.user_id.unwrap_or(claims.sub);
    if let Err(err) = claims.ensure_self_or_admin(actor) {
        return service_failure(err, messages::PRODUCT_REMOVE_FAILED);
    }

    let editor = Editor {
        id: actor,
        is_admin: claims.is_admin(),
    };
    if let Err(err) = product_service::delete_product(&db, id, editor).await {
        return service_failure(err, messages::PRODUCT_REMOVE_FAILED);
    }

    match product_service::list_products(&db).await {
        Ok(products) => success(messages::PRODUCT_REMOVE_SUCCESS, products),
        Err(err) => service_failure(err, messages::PRODUCT_REMOVE_FAILED),
    }
}

//Structs
#[derive(Deserialize)]
pub(crate) struct IdQuery {
    pub(crate) id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct UserQuery {
    pub(crate) user_id: Option<Uuid>,
}
