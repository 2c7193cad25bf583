use std::sync::Arc;

use models::coverage::{self, Model};
use serde_json::Value;
use tracing::{info, instrument, warn};

use super::repository::CoverageRepository;
use super::schema::{self, CoveragePage};
use crate::errors::ServiceError;
use crate::pagination::{Pagination, PaginationMeta};

/// Path the pagination links point at.
pub const LIST_PATH: &str = "/coverages";

/// Application service for coverage records. Each call performs at most one
/// repository operation; recreation is the only multi-statement one.
#[derive(Clone)]
pub struct CoverageService {
    repo: Arc<dyn CoverageRepository>,
}

impl CoverageService {
    pub fn new(repo: Arc<dyn CoverageRepository>) -> Self { Self { repo } }

    /// First record whose GBG contains `needle` (case-insensitive). `None` is
    /// a normal result, not an error.
    pub async fn get_by_gbg(&self, needle: &str) -> Result<Option<Model>, ServiceError> {
        self.repo.find_by_gbg(needle).await
    }

    /// First record whose short name contains `needle`; `+` matches any
    /// single character.
    pub async fn get_by_name(&self, needle: &str) -> Result<Option<Model>, ServiceError> {
        self.repo.find_by_shortname(needle).await
    }

    pub async fn list(&self, p: Pagination) -> Result<CoveragePage, ServiceError> {
        let page = self.repo.list_paged(p.page, p.per_page).await?;
        Ok(CoveragePage {
            coverages: page.items,
            pagination: PaginationMeta::build(p, page.total, page.pages, LIST_PATH),
        })
    }

    /// Validate a JSON body and insert it as a new row.
    #[instrument(skip_all)]
    pub async fn create(&self, body: &Value) -> Result<Model, ServiceError> {
        let fields = schema::parse_create_payload(body)?;
        let created = self.repo.insert(fields).await?;
        info!(cid = created.cid, "coverage_created");
        Ok(created)
    }

    /// Delete by primary key.
    pub async fn delete(&self, cid: i32) -> Result<(), ServiceError> {
        if self.repo.delete(cid).await? {
            info!(cid, "coverage_deleted");
            Ok(())
        } else {
            Err(ServiceError::not_found("coverage"))
        }
    }

    /// Wipe the table and seed the sample rows. Refused unless `confirmation`
    /// is true.
    pub async fn recreate(&self, confirmation: bool) -> Result<usize, ServiceError> {
        if !confirmation {
            warn!("recreate_refused_without_confirmation");
            return Err(ServiceError::PreconditionFailed("confirmation is missing".into()));
        }
        let inserted = self.repo.recreate(coverage::sample_rows()).await?;
        info!(inserted, "coverage_table_recreated");
        Ok(inserted)
    }
}
