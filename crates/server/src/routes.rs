use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use common::types::Message;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

pub mod auth;
pub mod coverages;
pub mod database;

use crate::openapi::ApiDoc;
use auth::ServerState;

/// Greeting; also the liveness probe of the hosting platform.
#[utoipa::path(get, path = "/", tag = "health", responses((status = 200, description = "Greeting", body = crate::openapi::MessageDoc)))]
pub async fn health() -> Json<Message> {
    Json(Message::greeting())
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router: public health/doc routes and the
/// token-protected coverage API.
pub fn build_router(state: ServerState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/", get(health))
        .route("/openapi.json", get(openapi_json));

    // the key segment is a GBG substring for GET and the primary key for DELETE
    let api = Router::new()
        .route("/coverages", get(coverages::list).post(coverages::create))
        .route("/coverages/gbg/:key", get(coverages::get_by_gbg).delete(coverages::delete))
        .route("/coverages/name/:name", get(coverages::get_by_name))
        .route("/database/recreate", post(database::recreate))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_api_token,
        ));

    public
        .merge(api)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}
