use axum::{
    extract::Extension,
    middleware::from_fn_with_state,
    response::Response,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::api::product::IdQuery;
use crate::api::{
    extract::{ApiJson, ApiQuery},
    messages,
    response::{service_failure, success, success_empty},
};
use crate::config::JwtConfig;
use crate::error::{Resource, ServiceError};
use crate::middleware::auth::{auth_middleware, AuthState, Claims, ADMIN_ONLY, ANY_ROLE};
use crate::services::order::{self as order_service, NewCartItem, NewOrder, NewStatus};

//ROUTERS
pub fn order_router(db: Arc<DatabaseConnection>, jwt: Arc<JwtConfig>) -> Router {
    let customers = Router::new()
        .route("/get-cart-items", get(get_cart_items))
        .route("/add-item-to-cart", post(add_item_to_cart))
        .route("/remove-item-from-cart", post(remove_item_from_cart))
        .route("/create-order", post(create_order))
        .route("/get-customer-orders", get(get_customer_orders))
        .route("/get-order", get(get_order))
        .route("/cancel-order", post(cancel_order))
        .route_layer(from_fn_with_state(
            AuthState::new(db.clone(), jwt.clone(), ANY_ROLE),
            auth_middleware,
        ));

    let admin = Router::new()
        .route("/create-status", post(create_status))
        .route_layer(from_fn_with_state(
            AuthState::new(db.clone(), jwt, ADMIN_ONLY),
            auth_middleware,
        ));

    Router::new()
        .route("/active-statuses", get(get_active_statuses))
        .merge(customers)
        .merge(admin)
        .layer(Extension(db))
}

//ROUTES
async fn get_cart_items(
    ApiQuery(params): ApiQuery<IdQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(params.id) {
        return service_failure(err, messages::CART_ITEM_NOT_FOUND);
    }

    match order_service::cart_items(&db, params.id).await {
        Ok(items) => success(messages::CART_ITEMS_RETRIEVAL_SUCCESS, items),
        Err(err) => service_failure(err, messages::CART_ITEM_NOT_FOUND),
    }
}

async fn add_item_to_cart(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<NewCartItem>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(payload.customer_id) {
        return service_failure(err, messages::CART_ITEM_NOT_FOUND);
    }

    match order_service::add_to_cart(&db, payload, claims.sub).await {
        Ok(item) => success(messages::ADD_ITEM_TO_CART_SUCCESS, item),
        Err(err) => service_failure(err, messages::CART_ITEM_NOT_FOUND),
    }
}

async fn remove_item_from_cart(
    ApiQuery(params): ApiQuery<RemoveCartItemQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(params.customer_id) {
        return service_failure(err, messages::CART_ITEM_REMOVAL_FAILED);
    }

    match order_service::remove_from_cart(&db, params.customer_id, params.cart_item_id, claims.sub)
        .await
    {
        Ok(()) => success_empty(messages::CART_ITEM_REMOVAL_SUCCESS),
        Err(err) => service_failure(err, messages::CART_ITEM_REMOVAL_FAILED),
    }
}

async fn create_order(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<NewOrder>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(payload.customer_id) {
        return service_failure(err, messages::ORDER_CREATION_FAILED);
    }

    match order_service::create_order(&db, payload, claims.sub).await {
        Ok(order) => success(messages::ORDER_CREATION_SUCCESS, order),
        Err(err) => service_failure(err, messages::ORDER_CREATION_FAILED),
    }
}

async fn get_customer_orders(
    ApiQuery(params): ApiQuery<IdQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(params.id) {
        return service_failure(err, messages::ORDER_NOT_FOUND);
    }

    match order_service::customer_orders(&db, params.id).await {
        Ok(orders) => success(messages::ORDER_RETRIEVAL_SUCCESS, orders),
        Err(err) => service_failure(err, messages::ORDER_NOT_FOUND),
    }
}

async fn get_order(
    ApiQuery(params): ApiQuery<IdQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    let order = match order_service::get_order(&db, params.id).await {
        Ok(order) => order,
        Err(err) => return service_failure(err, messages::ORDER_NOT_FOUND),
    };

    // Someone else's order is reported as missing.
    if claims.ensure_self_or_admin(order.customer_id).is_err() {
        return service_failure(ServiceError::NotFound(Resource::Order), messages::ORDER_NOT_FOUND);
    }
    success(messages::ORDER_RETRIEVAL_SUCCESS, order)
}

async fn cancel_order(
    ApiQuery(params): ApiQuery<CancelOrderQuery>,
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
) -> Response {
    if let Err(err) = claims.ensure_self_or_admin(params.customer_id) {
        return service_failure(err, messages::ORDER_CANCEL_FAILED);
    }

    match order_service::cancel_order(&db, params.customer_id, params.order_id, claims.sub).await {
        Ok(()) => success_empty(messages::ORDER_CANCEL_SUCCESS),
        Err(err) => service_failure(err, messages::ORDER_CANCEL_FAILED),
    }
}

async fn create_status(
    Extension(db): Extension<Arc<DatabaseConnection>>,
    Extension(claims): Extension<Claims>,
    ApiJson(payload): ApiJson<NewStatus>,
) -> Response {
    match order_service::create_status(&db, payload, claims.sub).await {
        Ok(status) => success(messages::STATUS_CREATION_SUCCESS, status),
        Err(err) => service_failure(err, messages::STATUSES_NOT_FOUND),
    }
}

async fn get_active_statuses(Extension(db): Extension<Arc<DatabaseConnection>>) -> Response {
    match order_service::active_statuses(&db).await {
        Ok(statuses) => success(messages::STATUS_RETRIEVAL_SUCCESS, statuses),
        Err(err) => service_failure(err, messages::STATUSES_NOT_FOUND),
    }
}

//Structs
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RemoveCartItemQuery {
    customer_id: Uuid,
    cart_item_id: Uuid,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CancelOrderQuery {
    customer_id: Uuid,
    order_id: Uuid,
}
