use axum::{http::StatusCode, response::Response, Json};
use serde::Serialize;
use serde_json::json;
use tracing::error;

use crate::api::messages;
use crate::error::{Resource, ServiceError};
use crate::middleware::logging::{to_response, ApiError};

/// Uniform body returned by every endpoint.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub code: u16,
    pub status: &'static str,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

pub fn success<T: Serialize>(message: &str, data: T) -> Response {
    let body = Envelope {
        code: StatusCode::OK.as_u16(),
        status: messages::SUCCESS,
        message: message.to_owned(),
        data: Some(data),
    };
    to_response((StatusCode::OK, Json(body)), Ok(()))
}

pub fn success_empty(message: &str) -> Response {
    let body: Envelope<()> = Envelope {
        code: StatusCode::OK.as_u16(),
        status: messages::SUCCESS,
        message: message.to_owned(),
        data: None,
    };
    to_response((StatusCode::OK, Json(body)), Ok(()))
}

pub fn failure(status: StatusCode, message: &str, ext: ApiError) -> Response {
    let body: Envelope<()> = Envelope {
        code: status.as_u16(),
        status: messages::ERROR,
        message: message.to_owned(),
        data: None,
    };
    to_response((status, Json(body)), Err(ext))
}

/// Maps a workflow failure onto the envelope. `write_failed` is the message
/// for the operation at hand when its write matched but changed nothing.
pub fn service_failure(err: ServiceError, write_failed: &str) -> Response {
    match err {
        ServiceError::NotFound(resource) => failure(
            StatusCode::NOT_FOUND,
            not_found_message(resource),
            ApiError::NotFound(resource.to_string()),
        ),
        ServiceError::Conflict(resource) => failure(
            StatusCode::CONFLICT,
            conflict_message(resource),
            ApiError::Conflict(resource.to_string()),
        ),
        ServiceError::Validation(detail) => {
            let body: Envelope<serde_json::Value> = Envelope {
                code: StatusCode::BAD_REQUEST.as_u16(),
                status: messages::ERROR,
                message: messages::VALIDATION_FAILED.to_owned(),
                data: Some(json!({ "errors": detail })),
            };
            to_response(
                (StatusCode::BAD_REQUEST, Json(body)),
                Err(ApiError::Validation(detail)),
            )
        }
        ServiceError::WriteFailed => {
            failure(StatusCode::BAD_REQUEST, write_failed, ApiError::WriteFailed)
        }
        ServiceError::Unauthorized => failure(
            StatusCode::UNAUTHORIZED,
            messages::INVALID_CREDENTIALS,
            ApiError::Unauthorized("Invalid credentials".to_owned()),
        ),
        ServiceError::Forbidden => failure(
            StatusCode::FORBIDDEN,
            messages::ACCESS_DENIED,
            ApiError::Forbidden,
        ),
        ServiceError::Database(err) => {
            error!("Database error: {err}");
            failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                messages::INTERNAL_SERVER_ERROR,
                ApiError::DbError(err.to_string()),
            )
        }
        ServiceError::Internal(detail) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            messages::INTERNAL_SERVER_ERROR,
            ApiError::General(detail),
        ),
    }
}

fn not_found_message(resource: Resource) -> &'static str {
    match resource {
        Resource::Product => messages::PRODUCT_NOT_EXIST,
        Resource::Category => messages::CATEGORY_NOT_EXIST,
        Resource::CartItem => messages::CART_ITEM_NOT_FOUND,
        Resource::Status => messages::STATUSES_NOT_FOUND,
        Resource::Order => messages::ORDER_NOT_FOUND,
        Resource::Role => messages::ROLE_NOT_EXIST,
        Resource::User => messages::USER_NOT_EXIST,
    }
}

fn conflict_message(resource: Resource) -> &'static str {
    match resource {
        Resource::User => messages::USER_ALREADY_EXIST,
        Resource::Role => messages::ROLE_ALREADY_EXIST,
        Resource::Status => messages::STATUS_ALREADY_EXIST,
        _ => messages::ALREADY_EXISTS,
    }
}
