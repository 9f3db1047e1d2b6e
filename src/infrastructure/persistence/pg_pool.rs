use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, instrument, warn};

use crate::application::ports::RepositoryError;
use crate::config::DatabaseSettings;

const INITIAL_CONNECT_DELAY: Duration = Duration::from_millis(500);

/// Connects with doubling delays between attempts, giving up after
/// `connect_retries` retries.
#[instrument(skip(settings), fields(max_connections = settings.max_connections))]
pub async fn create_pool(settings: &DatabaseSettings) -> Result<PgPool, RepositoryError> {
    let mut retries_left = settings.connect_retries;
    let mut delay = INITIAL_CONNECT_DELAY;

    loop {
        match PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .connect(&settings.url)
            .await
        {
            Ok(pool) => {
                info!("PostgreSQL connection pool established");
                return Ok(pool);
            }
            Err(e) if retries_left > 0 => {
                retries_left -= 1;
                warn!(
                    error = %e,
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    "PostgreSQL connection failed, retrying"
                );
                tokio::time::sleep(delay).await;
                delay *= 2;
            }
            Err(e) => return Err(RepositoryError::ConnectionFailed(e.to_string())),
        }
    }
}
