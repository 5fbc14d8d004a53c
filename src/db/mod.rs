pub mod models;
pub mod repository;

pub use models::*;
pub use repository::{MovieRepository, ShowtimeRepository, TheaterRepository};

#[cfg(test)]
pub(crate) async fn test_pool() -> sqlx::SqlitePool {
    use sqlx::sqlite::SqlitePoolOptions;

    // A single connection keeps the in-memory database alive for the
    // whole test; a second connection would see an empty schema.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("Failed to open in-memory database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    pool
}
