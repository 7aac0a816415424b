
/// CRUD operations tests for the subscription entity
pub mod crud_tests;

/// Tests talk to a real PostgreSQL; skip unless one is configured.
pub(crate) fn db_available() -> bool {
    if std::env::var("SKIP_DB_TESTS").is_ok() {
        return false;
    }
    let _ = dotenvy::dotenv();
    std::env::var("DB_URL").is_ok() || std::env::var("DATABASE_URL").is_ok()
}
