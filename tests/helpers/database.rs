use sqlx::SqlitePool;

use testloom::adapters::sqlite::{all_embedded_migrations, create_test_pool, Migrator};

/// Create an in-memory SQLite database with the schema applied.
///
/// Each call creates a completely isolated database instance.
pub async fn setup_test_db() -> SqlitePool {
    let pool = create_test_pool()
        .await
        .expect("failed to create test database");

    Migrator::new(pool.clone())
        .run_embedded_migrations(all_embedded_migrations())
        .await
        .expect("failed to run migrations");

    pool
}
