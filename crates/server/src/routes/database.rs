use std::collections::HashMap;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Extension, Json,
};
use common::types::Message;
use serde_json::json;
use service::auth::AuthUser;
use service::coverage::schema;
use service::errors::ServiceError;
use tracing::warn;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

const CONFIRM_HINT: &str = "check the API for how to confirm";

/// Drop and recreate the coverage table, then insert the sample records.
#[utoipa::path(
    post, path = "/database/recreate", tag = "database",
    params(("confirmation" = Option<bool>, Query, description = "Must be true, default false")),
    security(("ApiKey" = [])),
    responses(
        (status = 200, description = "Recreated", body = crate::openapi::MessageDoc),
        (status = 400, description = "Confirmation missing"),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn recreate(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Message>, JsonApiError> {
    let confirmation = schema::parse_recreate_query(&params)?;
    warn!(user = %user.username, confirmation, "database recreate requested");
    match state.coverages.recreate(confirmation).await {
        Ok(_) => Ok(Json(Message::new("database recreated"))),
        Err(ServiceError::PreconditionFailed(msg)) => Err(JsonApiError::new(
            StatusCode::BAD_REQUEST,
            msg,
            Some(json!({"error": CONFIRM_HINT})),
        )),
        Err(e) => Err(e.into()),
    }
}
