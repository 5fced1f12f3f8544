pub mod authentication;
pub mod category;
pub mod extract;
pub mod messages;
pub mod order;
pub mod product;
pub mod response;

use axum::{
    http::{HeaderValue, StatusCode},
    middleware::from_fn,
    response::Response,
    Router,
};
use sea_orm::DatabaseConnection;
use std::{any::Any as PanicPayload, sync::Arc};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, warn};

use crate::config::Config;
use crate::middleware::logging::{logging_middleware, ApiError};
use response::failure;
use authentication::authentication_router;
use category::category_router;
use order::order_router;
use product::product_router;

pub fn create_api_router(shared_db: Arc<DatabaseConnection>, config: Arc<Config>) -> Router {
    let jwt = Arc::new(config.jwt.clone());

    let router = Router::new()
        .nest("/Product", product_router(shared_db.clone(), jwt.clone()))
        .nest("/Category", category_router(shared_db.clone(), jwt.clone()))
        .nest("/Order", order_router(shared_db.clone(), jwt))
        .nest(
            "/Authentication",
            authentication_router(shared_db, config.clone()),
        );

    with_middleware(router, &config.cors_origin)
}

/// Panics are turned into the 500 envelope inside the logging layer, so they
/// are logged like any other failed request.
fn with_middleware(router: Router, cors_origin: &str) -> Router {
    router
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(from_fn(logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origin))
}

fn panic_response(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "Unknown panic payload".to_owned()
    };
    error!(detail = %detail, "Handler panicked");

    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        messages::INTERNAL_SERVER_ERROR,
        ApiError::General(detail),
    )
}

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin.parse::<HeaderValue>() {
        Ok(origin) => cors.allow_origin(origin),
        Err(_) => {
            warn!(origin, "Invalid CORS origin, cross-origin requests stay disabled");
            cors
        }
    }
}
