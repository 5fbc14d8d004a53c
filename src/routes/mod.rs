pub mod cinema;
pub mod health;
pub mod movies;
pub mod sync;
pub mod theaters;
pub mod webhooks;

#[cfg(test)]
pub(crate) async fn test_state() -> std::sync::Arc<crate::AppState> {
    use crate::config::Config;
    use crate::services::tmdb::TmdbClient;

    let config = Config::default();
    std::sync::Arc::new(crate::AppState {
        db: crate::db::test_pool().await,
        tmdb: TmdbClient::new(&config).expect("client"),
        config,
        started_at: std::time::Instant::now(),
    })
}
