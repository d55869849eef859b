use std::time::Instant;

use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};
use serde::Serialize;
use tracing::debug;

use crate::common::{DatabaseError, DatabaseResult};

const PING: &str = "SELECT 1";
const PRODUCTS_TABLE: &str = "SELECT to_regclass('public.products') IS NOT NULL AS present";

/// Round-trip a trivial query through the pool
pub async fn check_health(db: &DatabaseConnection) -> DatabaseResult<()> {
    debug!("Running PostgreSQL health check");

    let stmt = Statement::from_string(DatabaseBackend::Postgres, PING);
    db.query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    Ok(())
}

async fn products_table_present(db: &DatabaseConnection) -> DatabaseResult<bool> {
    let stmt = Statement::from_string(DatabaseBackend::Postgres, PRODUCTS_TABLE);
    let row = db
        .query_one_raw(stmt)
        .await
        .map_err(|e| DatabaseError::HealthCheckFailed(e.to_string()))?;

    match row {
        Some(row) => Ok(row.try_get::<bool>("", "present")?),
        None => Ok(false),
    }
}

/// Probe result printed by operators and readiness checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    /// Whether the `products` table exists, i.e. migrations have run
    pub schema_ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub response_time_ms: u64,
}

impl HealthStatus {
    pub fn healthy(schema_ready: bool, response_time_ms: u64) -> Self {
        let message = (!schema_ready).then(|| "products table missing; run migrations".to_string());
        Self {
            healthy: true,
            schema_ready,
            message,
            response_time_ms,
        }
    }

    pub fn unhealthy(message: String, response_time_ms: u64) -> Self {
        Self {
            healthy: false,
            schema_ready: false,
            message: Some(message),
            response_time_ms,
        }
    }
}

/// Ping the database and check that the catalog schema is in place
pub async fn check_health_detailed(db: &DatabaseConnection) -> HealthStatus {
    let start = Instant::now();
    let elapsed = || start.elapsed().as_millis() as u64;

    if let Err(e) = check_health(db).await {
        return HealthStatus::unhealthy(e.to_string(), elapsed());
    }

    match products_table_present(db).await {
        Ok(present) => HealthStatus::healthy(present, elapsed()),
        Err(e) => HealthStatus::unhealthy(e.to_string(), elapsed()),
    }
}
