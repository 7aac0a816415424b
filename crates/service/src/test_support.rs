#![cfg(test)]
use migration::MigratorTrait;
use models::db::connect;
use sea_orm::DatabaseConnection;
use tokio::sync::OnceCell;

// Ensure migrations run only once across the entire test process
static MIGRATED: OnceCell<()> = OnceCell::const_new();

/// Database tests run only against a configured PostgreSQL.
pub fn db_available() -> bool {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return false;
    }
    let _ = dotenvy::dotenv();
    std::env::var("DB_URL").is_ok() || std::env::var("DATABASE_URL").is_ok()
}

pub async fn get_db() -> Result<DatabaseConnection, anyhow::Error> {
    // Run migrations exactly once, with a throwaway connection
    MIGRATED
        .get_or_try_init(|| async {
            let db = connect().await?;
            migration::Migrator::up(&db, None).await?;
            drop(db);
            Ok::<(), anyhow::Error>(())
        })
        .await?;

    // Return a fresh connection for the current test's runtime
    connect().await
}
