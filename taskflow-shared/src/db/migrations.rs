/// Database migration runner
///
/// Migrations live in `taskflow-shared/migrations/` and are embedded into
/// the binary with `sqlx::migrate!`. Each migration is a reversible pair,
/// `{version}_{name}.up.sql` and `{version}_{name}.down.sql`.

use sqlx::PgPool;
use tracing::{info, warn};

/// Runs all pending migrations
///
/// Idempotent: already-applied migrations are skipped.
///
/// # Errors
///
/// Returns an error if a migration fails to execute or a previously
/// applied migration's checksum no longer matches.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    info!("Running database migrations");

    match sqlx::migrate!("./migrations").run(pool).await {
        Ok(()) => {
            info!("Database migrations up to date");
            Ok(())
        }
        Err(e) => {
            warn!("Migration failed: {e}");
            Err(e)
        }
    }
}
