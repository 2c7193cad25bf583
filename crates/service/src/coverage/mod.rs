//! Coverage records: input/output schemas, storage seam and business rules.

pub mod repository;
pub mod schema;
pub mod service;

pub use repository::{CoverageRepository, SeaOrmCoverageRepository};
pub use service::CoverageService;
