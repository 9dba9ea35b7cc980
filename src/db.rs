use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::{error, info};

use crate::config::DatabaseConfig;

/// Opens the pool and proves the server answers before anything is served.
pub async fn connect(cfg: &DatabaseConfig) -> anyhow::Result<PgPool> {
    let db = PgPoolOptions::new()
        .max_connections(cfg.max_connections)
        .connect(&cfg.url)
        .await
        .map_err(|e| {
            report_connect_failure(&e);
            e
        })
        .context("connect to database")?;

    sqlx::query("SELECT 1")
        .execute(&db)
        .await
        .context("database connectivity probe")?;

    info!("connected to database");
    Ok(db)
}

/// Creates the `users` table if it is missing. Safe to run on every start.
pub async fn ensure_schema(db: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations")
        .run(db)
        .await
        .context("apply migrations")?;
    info!(table = "users", "schema ready");
    Ok(())
}

fn is_auth_failure(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db_err) => {
            matches!(db_err.code().as_deref(), Some("28000") | Some("28P01"))
        }
        _ => false,
    }
}

fn report_connect_failure(e: &sqlx::Error) {
    if is_auth_failure(e) {
        error!(
            error = %e,
            "database authentication failed; check DB_USER/DB_PASSWORD \
             or the server's auth method for this host"
        );
    } else {
        error!(error = %e, "database connection failed");
    }
}
