use async_trait::async_trait;
use models::coverage::{self, CoverageFields, Model, Page};
use sea_orm::DatabaseConnection;

use crate::errors::ServiceError;

/// Row-level access to the coverage table.
#[async_trait]
pub trait CoverageRepository: Send + Sync {
    async fn find_by_gbg(&self, needle: &str) -> Result<Option<Model>, ServiceError>;
    async fn find_by_shortname(&self, needle: &str) -> Result<Option<Model>, ServiceError>;
    async fn list_paged(&self, page: u64, per_page: u64) -> Result<Page, ServiceError>;
    async fn insert(&self, fields: CoverageFields) -> Result<Model, ServiceError>;
    /// `Ok(false)` when no row has that key.
    async fn delete(&self, cid: i32) -> Result<bool, ServiceError>;
    /// Drop, recreate and seed the table; returns the number of seeded rows.
    async fn recreate(&self, rows: Vec<CoverageFields>) -> Result<usize, ServiceError>;
}

/// SeaORM-backed repository implementation.
#[derive(Clone)]
pub struct SeaOrmCoverageRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmCoverageRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl CoverageRepository for SeaOrmCoverageRepository {
    async fn find_by_gbg(&self, needle: &str) -> Result<Option<Model>, ServiceError> {
        Ok(coverage::find_by_gbg_contains(&self.db, needle).await?)
    }

    async fn find_by_shortname(&self, needle: &str) -> Result<Option<Model>, ServiceError> {
        Ok(coverage::find_by_shortname_contains(&self.db, needle).await?)
    }

    async fn list_paged(&self, page: u64, per_page: u64) -> Result<Page, ServiceError> {
        Ok(coverage::list_paged(&self.db, page, per_page).await?)
    }

    async fn insert(&self, fields: CoverageFields) -> Result<Model, ServiceError> {
        Ok(coverage::insert(&self.db, fields).await?)
    }

    async fn delete(&self, cid: i32) -> Result<bool, ServiceError> {
        Ok(coverage::delete_by_cid(&self.db, cid).await?)
    }

    async fn recreate(&self, rows: Vec<CoverageFields>) -> Result<usize, ServiceError> {
        Ok(coverage::recreate_schema(&self.db, rows).await?)
    }
}
