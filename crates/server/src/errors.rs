use axum::extract::rejection::JsonRejection;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use service::auth::TOKEN_SCHEME;
use service::coverage::schema::FieldErrors;
use service::errors::ServiceError;
use tracing::error;

/// JSON error envelope: `{"message": "...", "detail": {...}}`.
#[derive(Debug)]
pub struct JsonApiError {
    pub status: StatusCode,
    pub message: String,
    pub detail: Value,
}

impl JsonApiError {
    pub fn new(status: StatusCode, message: impl Into<String>, detail: Option<Value>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: detail.unwrap_or_else(|| json!({})),
        }
    }

    /// Error whose message is the status' canonical reason.
    pub fn from_status(status: StatusCode) -> Self {
        Self::new(status, status.canonical_reason().unwrap_or("Error"), None)
    }

    pub fn unauthorized() -> Self {
        Self::from_status(StatusCode::UNAUTHORIZED)
    }

    pub fn not_found() -> Self {
        Self::from_status(StatusCode::NOT_FOUND)
    }

    pub fn internal() -> Self {
        Self::from_status(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        let body = Json(json!({"message": self.message, "detail": self.detail}));
        let mut response = (self.status, body).into_response();
        if self.status == StatusCode::UNAUTHORIZED {
            let challenge = format!("{TOKEN_SCHEME} header=\"{}\"", service::auth::TOKEN_HEADER);
            if let Ok(value) = HeaderValue::from_str(&challenge) {
                response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
            }
        }
        response
    }
}

impl From<FieldErrors> for JsonApiError {
    fn from(errors: FieldErrors) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, "Validation error", Some(errors.to_detail()))
    }
}

impl From<ServiceError> for JsonApiError {
    fn from(e: ServiceError) -> Self {
        match e {
            ServiceError::Validation(errors) => errors.into(),
            ServiceError::NotFound(_) => Self::not_found(),
            ServiceError::PreconditionFailed(msg) => Self::new(StatusCode::BAD_REQUEST, msg, None),
            ServiceError::Db(msg) => {
                // details stay in the log, the caller gets a generic message
                error!(event = "storage_error", error = %msg, "storage operation failed");
                Self::internal()
            }
        }
    }
}

impl From<JsonRejection> for JsonApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = rejection.status();
        Self::new(
            status,
            status.canonical_reason().unwrap_or("Bad Request"),
            Some(json!({"error": rejection.body_text()})),
        )
    }
}
