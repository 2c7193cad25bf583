use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use models::coverage::{CoverageFields, Model, Page};
use service::auth::TokenTable;
use service::coverage::{CoverageRepository, CoverageService};
use service::errors::ServiceError;
use tower::ServiceExt;

use server::routes::{self, auth::ServerState};

/// Repository that only counts how often it was reached.
#[derive(Default)]
struct CountingRepository {
    calls: AtomicUsize,
}

impl CountingRepository {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CoverageRepository for CountingRepository {
    async fn find_by_gbg(&self, _needle: &str) -> Result<Option<Model>, ServiceError> {
        self.hit();
        Ok(None)
    }

    async fn find_by_shortname(&self, _needle: &str) -> Result<Option<Model>, ServiceError> {
        self.hit();
        Ok(None)
    }

    async fn list_paged(&self, _page: u64, _per_page: u64) -> Result<Page, ServiceError> {
        self.hit();
        Ok(Page { items: Vec::new(), total: 0, pages: 0 })
    }

    async fn insert(&self, _fields: CoverageFields) -> Result<Model, ServiceError> {
        self.hit();
        Err(ServiceError::Db("not supported".into()))
    }

    async fn delete(&self, _cid: i32) -> Result<bool, ServiceError> {
        self.hit();
        Ok(false)
    }

    async fn recreate(&self, rows: Vec<CoverageFields>) -> Result<usize, ServiceError> {
        self.hit();
        Ok(rows.len())
    }
}

fn app(repo: Arc<CountingRepository>) -> axum::Router {
    let state = ServerState::new(CoverageService::new(repo), TokenTable::single("gate-token"));
    routes::build_router(state, tower_http::cors::CorsLayer::very_permissive())
}

fn request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("API_TOKEN", token);
    }
    if method == "POST" {
        builder = builder.header("content-type", "application/json");
        return builder.body(Body::from("{}")).unwrap();
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn rejected_requests_never_reach_storage() {
    let repo = Arc::new(CountingRepository::default());
    let cases = [
        ("GET", "/coverages"),
        ("POST", "/coverages"),
        ("GET", "/coverages/gbg/abc"),
        ("DELETE", "/coverages/gbg/1"),
        ("GET", "/coverages/name/abc"),
        ("POST", "/database/recreate?confirmation=true"),
    ];
    for (method, uri) in cases {
        for token in [None, Some(""), Some("wrong")] {
            let res = app(Arc::clone(&repo)).oneshot(request(method, uri, token)).await.unwrap();
            assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{method} {uri} {token:?}");
        }
    }
    assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn accepted_requests_reach_storage_once() {
    let repo = Arc::new(CountingRepository::default());
    let res = app(Arc::clone(&repo))
        .oneshot(request("GET", "/coverages/gbg/abc", Some("gate-token")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&body[..], b"null");
    assert_eq!(repo.calls.load(Ordering::SeqCst), 1);

    let res = app(Arc::clone(&repo))
        .oneshot(request("POST", "/database/recreate?confirmation=false", Some("gate-token")))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(repo.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn health_needs_no_token() {
    let repo = Arc::new(CountingRepository::default());
    let res = app(Arc::clone(&repo)).oneshot(request("GET", "/", None)).await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
}
