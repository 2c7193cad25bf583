/// Field table and entity mapping checks
pub mod mapping_tests;


use sea_orm::DatabaseConnection;

/// Fresh in-memory database with an empty coverage table.
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let db = crate::db::connect("sqlite::memory:").await?;
    crate::coverage::ensure_schema(&db).await?;
    Ok(db)
}
