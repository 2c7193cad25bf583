use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use service::auth::{TokenTable, TOKEN_HEADER};
use service::coverage::CoverageService;
use tracing::{debug, warn};

use crate::errors::JsonApiError;

#[derive(Clone)]
pub struct ServerState {
    pub coverages: CoverageService,
    pub tokens: Arc<TokenTable>,
}

impl ServerState {
    pub fn new(coverages: CoverageService, tokens: TokenTable) -> Self {
        Self { coverages, tokens: Arc::new(tokens) }
    }
}

/// Middleware: require a valid `API_TOKEN` header. On success the resolved
/// [`service::auth::AuthUser`] is stored in the request extensions; on failure
/// the request never reaches a handler.
pub async fn require_api_token(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, JsonApiError> {
    let presented = req
        .headers()
        .get(TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    match state.tokens.authenticate(presented) {
        Ok(user) => {
            debug!(user = %user.username, "authenticated");
            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(reason) => {
            warn!(event = "auth_failed", %reason, method = %req.method(), path = %req.uri().path(), "rejected request");
            Err(JsonApiError::unauthorized())
        }
    }
}
