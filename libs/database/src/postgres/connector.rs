use sea_orm::{Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use tracing::{info, instrument};

use super::PostgresConfig;
use crate::common::{DatabaseError, DatabaseResult, RetryPolicy, retry_when};

/// Open a pool with the given settings, failing on the first error
#[instrument(skip(config), fields(url = %config.redacted_url()))]
pub async fn connect_from_config(config: PostgresConfig) -> DatabaseResult<DatabaseConnection> {
    let db = Database::connect(config.into_connect_options()).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// Open a pool, retrying connection-level failures with backoff.
///
/// Errors that retrying cannot fix (bad scheme, auth rejected by sea-orm's
/// URL parsing) are returned after the first attempt. Passing `None` uses
/// [`RetryPolicy::default`].
///
/// ```ignore
/// use core_config::FromEnv;
/// use database::common::RetryPolicy;
/// use database::postgres::{PostgresConfig, connect_from_config_with_retry};
///
/// let config = PostgresConfig::from_env()?;
/// let db = connect_from_config_with_retry(config, Some(RetryPolicy::new().with_max_attempts(10))).await?;
/// ```
#[instrument(skip(config, policy), fields(url = %config.redacted_url()))]
pub async fn connect_from_config_with_retry(
    config: PostgresConfig,
    policy: Option<RetryPolicy>,
) -> DatabaseResult<DatabaseConnection> {
    let policy = policy.unwrap_or_default();
    let options = config.into_connect_options();

    let result = retry_when(
        &policy,
        || {
            let options = options.clone();
            async move { Ok::<_, DatabaseError>(Database::connect(options).await?) }
        },
        DatabaseError::is_transient,
    )
    .await;

    match result {
        Ok(db) => {
            info!("Connected to PostgreSQL");
            Ok(db)
        }
        Err(err) if err.is_transient() => Err(DatabaseError::ConnectionFailed {
            attempts: policy.max_attempts,
            message: err.to_string(),
        }),
        Err(err) => Err(err),
    }
}

/// Apply every pending migration of `M`
#[instrument(skip(db))]
pub async fn run_migrations<M: MigratorTrait>(db: &DatabaseConnection) -> DatabaseResult<()> {
    let pending = M::get_pending_migrations(db)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?
        .len();

    if pending == 0 {
        info!("Schema is up to date");
        return Ok(());
    }

    info!(pending, "Applying migrations");
    M::up(db, None)
        .await
        .map_err(|e| DatabaseError::Migration(e.to_string()))?;
    info!(applied = pending, "Migrations completed");
    Ok(())
}
