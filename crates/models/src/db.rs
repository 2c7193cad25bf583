use std::time::Duration;

use configs::DatabaseConfig;
use sea_orm::{ConnectOptions, ConnectionTrait, Database, DatabaseConnection};
use tracing::info;

/// Open a pooled connection described by `cfg`.
///
/// The optional schema qualifier becomes the PostgreSQL `search_path`, so the
/// entity keeps its fixed table name and every statement resolves to
/// `<schema>.SERVICECOVERAGES`.
pub async fn connect_with_config(cfg: &DatabaseConfig) -> anyhow::Result<DatabaseConnection> {
    let mut opt = ConnectOptions::new(cfg.url.clone());
    let (max, min) = if is_in_memory(&cfg.url) {
        // every pooled connection would otherwise get its own empty database
        (1, 1)
    } else {
        (cfg.max_connections, cfg.min_connections)
    };
    opt.max_connections(max)
        .min_connections(min)
        .connect_timeout(Duration::from_secs(cfg.connect_timeout_secs))
        .acquire_timeout(Duration::from_secs(cfg.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(cfg.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(cfg.max_lifetime_secs))
        .sqlx_logging(cfg.sqlx_logging);
    if let Some(schema) = &cfg.schema {
        opt.set_schema_search_path(schema.clone());
    }
    let db = Database::connect(opt).await?;
    info!(event = "db_connected", backend = ?db.get_database_backend(), schema = ?cfg.schema, "database connection established");
    Ok(db)
}

/// Connect to `url` with default pool settings.
pub async fn connect(url: &str) -> anyhow::Result<DatabaseConnection> {
    let cfg = DatabaseConfig { url: url.to_string(), ..DatabaseConfig::default() };
    connect_with_config(&cfg).await
}

fn is_in_memory(url: &str) -> bool {
    url.starts_with("sqlite:") && url.contains(":memory:")
}
