use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::{fmt, time::Instant};
use tracing::{error, info, warn};

pub async fn logging_middleware(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let start = Instant::now();

    let response = next.run(req).await;

    let status = response.status();
    let elapsed = start.elapsed();
    match response.extensions().get::<Result<(), ApiError>>() {
        Some(Ok(())) => info!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request"
        ),
        Some(Err(value)) if status.is_server_error() => error!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            value = %value,
            "Failed to process request"
        ),
        Some(Err(value)) => warn!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            value = %value,
            "Rejected request"
        ),
        None => warn!(
            method = %method,
            uri = %uri,
            status = %status,
            elapsed = ?elapsed,
            "Processed request, but no Response extension is set"
        ),
    }

    response
}

/// Detail attached to a response for the logging middleware only. It is never
/// serialized to the client.
#[derive(Clone, Debug)]
pub enum ApiError {
    NotFound(String),
    Validation(String),
    Conflict(String),
    WriteFailed,
    Unauthorized(String),
    Forbidden,
    DbError(String),
    General(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::NotFound(value) => write!(f, "Not found: {value}"),
            ApiError::Validation(value) => write!(f, "Failed to validate: {value}"),
            ApiError::Conflict(value) => write!(f, "Conflict: {value}"),
            ApiError::WriteFailed => f.write_str("Write matched but modified nothing"),
            ApiError::Unauthorized(value) => write!(f, "Unauthorized: {value}"),
            ApiError::Forbidden => f.write_str("Forbidden"),
            ApiError::DbError(value) => write!(f, "Database error: {value}"),
            ApiError::General(value) => f.write_str(value),
        }
    }
}

pub fn to_response<T: IntoResponse>(
    response: T,               //The response that we are sending + StatusCode
    ext: Result<(), ApiError>, //The extension, that we want to give logging middleware
) -> Response {
    let mut response = response.into_response();

    response.extensions_mut().insert(ext);

    response
}
