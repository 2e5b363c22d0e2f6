//! Binary entry point: wire both stores together and run one migration
//! pass.
//!
//! Startup order: honor a local `.env`, initialize logging, resolve the
//! two connection URLs, connect both stores (either failure is fatal),
//! run the scan, then release both handles -- on the error path too.

use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

use mj_task_migrate::migrate::{MigrationReport, Migrator};
use mj_task_migrate::sink::MySqlSink;
use mj_task_migrate::source::RedisSource;
use mj_task_migrate::{Config, MigrateError};

async fn run() -> Result<MigrationReport, MigrateError> {
    let config = Config::from_env()?;
    debug!(
        redis_url = %config.redis_url,
        mysql_url = %config.mysql_url,
        "resolved store endpoints"
    );

    let source = RedisSource::connect(&config.redis_url).await?;
    // If MySQL fails here, the Redis handle opened above is released by drop.
    let sink = MySqlSink::connect(&config.mysql_url).await?;

    let migrator = Migrator::new(source, sink);
    let result = migrator.run().await;
    migrator.shutdown().await;
    Ok(result?)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("starting task record migration");
    match run().await {
        Ok(report) => {
            info!(
                pages = report.pages,
                keys = report.keys_scanned,
                attempted = report.rows_attempted,
                inserted = report.rows_inserted,
                dropped = report.values_dropped,
                skipped_pages = report.pages_skipped,
                "finished"
            );
            Ok(())
        }
        Err(err) => {
            error!(error = %err, "migration aborted");
            Err(err.into())
        }
    }
}
