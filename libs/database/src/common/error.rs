/// Errors raised while connecting to, migrating or probing the store
#[derive(Debug, thiserror::Error)]
pub enum DatabaseError {
    #[cfg(feature = "postgres")]
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sea_orm::DbErr),

    /// Gave up after the retry policy ran out
    #[error("Connection failed after {attempts} attempt(s): {message}")]
    ConnectionFailed { attempts: u32, message: String },

    #[error("Health check failed: {0}")]
    HealthCheckFailed(String),

    #[cfg(feature = "config")]
    #[error(transparent)]
    Config(#[from] core_config::ConfigError),

    #[error("Migration error: {0}")]
    Migration(String),
}

impl DatabaseError {
    /// Whether trying the same operation again may succeed.
    ///
    /// Only connection-level failures qualify; a bad URL scheme or a failed
    /// query will fail the same way every time.
    pub fn is_transient(&self) -> bool {
        match self {
            #[cfg(feature = "postgres")]
            DatabaseError::Postgres(err) => matches!(
                err,
                sea_orm::DbErr::Conn(_) | sea_orm::DbErr::ConnectionAcquire(_)
            ),
            DatabaseError::HealthCheckFailed(_) => true,
            _ => false,
        }
    }
}

pub type DatabaseResult<T> = Result<T, DatabaseError>;
