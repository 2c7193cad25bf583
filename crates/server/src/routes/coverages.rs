use std::collections::HashMap;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use models::coverage::Model;
use serde_json::Value;
use service::auth::AuthUser;
use service::coverage::schema::{self, CoveragePage};
use tracing::info;

use crate::errors::JsonApiError;
use crate::routes::auth::ServerState;

#[utoipa::path(
    get, path = "/coverages/gbg/{key}", tag = "coverages",
    params(("key" = String, Path, description = "Case-insensitive substring of the GBG")),
    security(("ApiKey" = [])),
    responses(
        (status = 200, description = "First matching record, or null", body = crate::openapi::CoverageOut),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_by_gbg(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(gbg): Path<String>,
) -> Result<Json<Option<Model>>, JsonApiError> {
    let found = state.coverages.get_by_gbg(&gbg).await?;
    info!(user = %user.username, %gbg, found = found.is_some(), "coverage_get_by_gbg");
    Ok(Json(found))
}

#[utoipa::path(
    get, path = "/coverages/name/{name}", tag = "coverages",
    params(("name" = String, Path, description = "Case-insensitive substring of the short name; `+` matches any single character")),
    security(("ApiKey" = [])),
    responses(
        (status = 200, description = "First matching record, or null", body = crate::openapi::CoverageOut),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_by_name(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(name): Path<String>,
) -> Result<Json<Option<Model>>, JsonApiError> {
    let found = state.coverages.get_by_name(&name).await?;
    info!(user = %user.username, %name, found = found.is_some(), "coverage_get_by_name");
    Ok(Json(found))
}

#[utoipa::path(
    get, path = "/coverages", tag = "coverages",
    params(
        ("page" = Option<u64>, Query, description = "1-based page, default 1"),
        ("per_page" = Option<u64>, Query, description = "Page size, default 20, at most 255")
    ),
    security(("ApiKey" = [])),
    responses(
        (status = 200, description = "One page of records", body = crate::openapi::CoveragePageDoc),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn list(
    State(state): State<ServerState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<CoveragePage>, JsonApiError> {
    let pagination = schema::parse_list_query(&params)?;
    let page = state.coverages.list(pagination).await?;
    info!(page = pagination.page, per_page = pagination.per_page, count = page.coverages.len(), "list coverages");
    Ok(Json(page))
}

#[utoipa::path(
    post, path = "/coverages", tag = "coverages",
    request_body = crate::openapi::CoverageIn,
    security(("ApiKey" = [])),
    responses(
        (status = 201, description = "Created", body = crate::openapi::CoverageOut),
        (status = 401, description = "Unauthorized"),
        (status = 422, description = "Validation error")
    )
)]
pub async fn create(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Model>), JsonApiError> {
    let Json(body) = payload?;
    let created = state.coverages.create(&body).await?;
    info!(user = %user.username, cid = created.cid, "created coverage");
    Ok((StatusCode::CREATED, Json(created)))
}

/// The path segment is matched against the primary key `cid`, not the GBG.
/// Anything that is not an integer cannot name a row and yields 404.
#[utoipa::path(
    delete, path = "/coverages/gbg/{key}", tag = "coverages",
    params(("key" = i32, Path, description = "Primary key `cid` of the record, not a GBG")),
    security(("ApiKey" = [])),
    responses(
        (status = 204, description = "Deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete(
    State(state): State<ServerState>,
    Extension(user): Extension<AuthUser>,
    Path(cid): Path<String>,
) -> Result<StatusCode, JsonApiError> {
    let Ok(cid) = cid.parse::<i32>() else {
        return Err(JsonApiError::not_found());
    };
    state.coverages.delete(cid).await?;
    info!(user = %user.username, cid, "deleted coverage");
    Ok(StatusCode::NO_CONTENT)
}
