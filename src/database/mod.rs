use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, Connection, PgConnection, PgPool};
use tracing::info;
use uuid::Uuid;

use crate::config::{AppConfig, DbConfig};

/// Contains the Postgres connection pool, cheaply cloneable.
#[derive(Clone, Debug)]
pub struct DbManager {
    db: PgPool,
}

impl DbManager {
    pub async fn init(config: &AppConfig) -> Result<Self> {
        info!("{:<20} - Initializing the DB pool", "init_db");
        let db = init_pool(&config.db_config, 5).await?;

        Ok(Self { db })
    }

    /// Creates a fresh, randomly named database, runs the migrations against it
    /// and connects to it. Used by the integration tests.
    pub async fn test_init(config: &AppConfig) -> Result<Self> {
        let mut db_config = config.db_config.clone();
        db_config.db_name = Uuid::new_v4().to_string();

        let mut connection =
            PgConnection::connect_with(&db_config.connection_options_without_db()).await?;
        let sql = format!(r#"CREATE DATABASE "{}";"#, db_config.db_name);
        sqlx::query(&sql).execute(&mut connection).await?;

        let db = init_pool(&db_config, 5).await?;
        sqlx::migrate!("./migrations").run(&db).await?;
        info!("{:<20} - Migrated test DB: {}", "test_init", db_config.db_name);

        Ok(Self { db })
    }

    /// Runs the pending migrations from `./migrations`.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.db).await?;
        Ok(())
    }

    pub fn db(&self) -> &PgPool {
        &self.db
    }
}

async fn init_pool(db_config: &DbConfig, max_cons: u32) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(max_cons)
        .acquire_timeout(Duration::from_millis(500))
        .connect_with(db_config.connection_options())
        .await
        .map_err(|ex| Error::FailToCreatePool(ex.to_string()))
}

// ###################################
// ->   ERROR
// ###################################
pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to create db pool: {0}")]
    FailToCreatePool(String),
    #[error("sqlx error: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("sqlx migration error: {0}")]
    SqlxMigrate(#[from] sqlx::migrate::MigrateError),
}
