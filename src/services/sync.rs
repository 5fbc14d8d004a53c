use serde::Serialize;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::db::models::{CreateMovie, Movie};
use crate::db::repository::MovieRepository;
use crate::error::AppResult;
use crate::services::catalog::{curated_catalog, CatalogEntry};
use crate::services::schedule::ScheduleManager;
use crate::services::tmdb::{TmdbClient, EXTERNAL_ID_PREFIX};
use crate::AppState;

pub struct CatalogSyncManager;

#[derive(Debug, Default)]
pub struct SyncSummary {
    pub imported: usize,
    pub failed: usize,
    pub pruned: u64,
}

impl CatalogSyncManager {
    /// Brings the movies table in line with the given catalog feed: every
    /// entry is upserted by external id, then movies absent from the feed
    /// are pruned. One bad entry does not abort the rest.
    pub async fn reconcile(
        pool: &SqlitePool,
        catalog: &[CatalogEntry],
    ) -> AppResult<SyncSummary> {
        let mut summary = SyncSummary::default();
        let mut touched = Vec::with_capacity(catalog.len());

        for entry in catalog {
            let create = create_from_entry(entry);
            match MovieRepository::upsert_by_external_id(pool, &entry.external_id, &create).await
            {
                Ok((movie, created)) => {
                    if created {
                        tracing::info!("Added movie from catalog: {}", movie.title);
                    } else {
                        tracing::debug!("Refreshed movie from catalog: {}", movie.title);
                    }
                    touched.push(movie.id);
                    summary.imported += 1;
                }
                Err(e) => {
                    tracing::warn!("Failed to sync catalog movie {}: {:?}", entry.title, e);
                    summary.failed += 1;
                }
            }
        }

        summary.pruned = MovieRepository::prune_stale(pool, &touched).await?;
        if summary.pruned > 0 {
            tracing::info!("Pruned {} movies no longer in the catalog", summary.pruned);
        }

        Ok(summary)
    }

    /// Imports one movie from TMDB. Returns the already-stored movie when it
    /// was imported before, so repeated imports cannot create duplicates.
    pub async fn import_by_tmdb_id(
        pool: &SqlitePool,
        tmdb: &TmdbClient,
        tmdb_id: i64,
    ) -> AppResult<Movie> {
        let external_id = format!("{}{}", EXTERNAL_ID_PREFIX, tmdb_id);

        if let Some(existing) = MovieRepository::find_by_external_id(pool, &external_id).await? {
            tracing::debug!("Movie {} already imported", external_id);
            return Ok(existing);
        }

        let summary = tmdb.movie_details(tmdb_id).await?;
        let movie = MovieRepository::insert(pool, &summary.into_create_movie()).await?;
        tracing::info!("Imported movie from TMDB: {} ({})", movie.title, external_id);

        Ok(movie)
    }
}

fn create_from_entry(entry: &CatalogEntry) -> CreateMovie {
    CreateMovie {
        title: entry.title.clone(),
        description: entry.description.clone(),
        genre: entry.genre.clone(),
        duration: entry.duration,
        poster: entry.poster.clone(),
        release_date: entry.release_date,
        external_id: Some(entry.external_id.clone()),
        rating: entry.rating,
    }
}

/// What one full sync cycle did.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CycleSummary {
    pub imported: usize,
    pub failed: usize,
    pub pruned: u64,
    pub theaters_seeded: usize,
    pub showtimes_generated: u64,
}

/// Owns the background worker that keeps the catalog and schedule fresh.
pub struct SyncScheduler {
    state: Arc<AppState>,
    shutdown: broadcast::Sender<()>,
    handle: Option<JoinHandle<()>>,
}

impl SyncScheduler {
    pub fn new(state: Arc<AppState>, shutdown: broadcast::Sender<()>) -> Self {
        Self {
            state,
            shutdown,
            handle: None,
        }
    }

    /// Starts the periodic sync worker: one cycle immediately, then one per
    /// configured interval. Cycles never overlap. Calling start on a running
    /// scheduler is a no-op.
    pub fn start(&mut self) {
        if self.handle.is_some() {
            tracing::warn!("Sync scheduler already running, ignoring start");
            return;
        }

        let interval =
            std::time::Duration::from_secs(self.state.config.sync.interval_seconds);
        let state = self.state.clone();
        let mut shutdown_rx = self.shutdown.subscribe();

        self.handle = Some(tokio::spawn(async move {
            loop {
                Self::run_cycle(&state).await;

                tokio::select! {
                    _ = shutdown_rx.recv() => {
                        tracing::info!("Sync scheduler shutting down");
                        break;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }
            }
        }));

        tracing::info!(
            "Sync scheduler started (interval: {}s)",
            self.state.config.sync.interval_seconds
        );
    }

    /// One reconcile-seed-generate pass. Failures in one stage are logged
    /// and leave the stage's counters at zero; the other stages still run.
    pub async fn run_cycle(state: &Arc<AppState>) -> CycleSummary {
        let mut cycle = CycleSummary::default();

        tracing::info!("Starting catalog sync cycle");

        let catalog = curated_catalog();
        match CatalogSyncManager::reconcile(&state.db, &catalog).await {
            Ok(summary) => {
                cycle.imported = summary.imported;
                cycle.failed = summary.failed;
                cycle.pruned = summary.pruned;
            }
            Err(e) => {
                tracing::warn!("Catalog reconciliation failed: {:?}", e);
            }
        }

        match ScheduleManager::ensure_theaters(&state.db).await {
            Ok(seeded) => cycle.theaters_seeded = seeded,
            Err(e) => {
                tracing::warn!("Theater seeding failed: {:?}", e);
            }
        }

        match ScheduleManager::generate(&state.db).await {
            Ok(generated) => cycle.showtimes_generated = generated,
            Err(e) => {
                tracing::warn!("Showtime generation failed: {:?}", e);
            }
        }

        tracing::info!(
            "Sync cycle complete: {} imported, {} failed, {} pruned, {} showtimes generated",
            cycle.imported,
            cycle.failed,
            cycle.pruned,
            cycle.showtimes_generated
        );

        cycle
    }

    /// Signals the worker and waits for any in-flight cycle to finish.
    pub async fn stop(&mut self) {
        let Some(handle) = self.handle.take() else {
            return;
        };

        let _ = self.shutdown.send(());
        match tokio::time::timeout(std::time::Duration::from_secs(15), handle).await {
            Ok(Ok(())) => tracing::info!("Sync scheduler stopped"),
            Ok(Err(e)) => tracing::warn!("Sync scheduler task ended with error: {:?}", e),
            Err(_) => tracing::warn!("Sync scheduler did not stop within 15s"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::db::repository::{ShowtimeRepository, TheaterRepository};
    use crate::db::test_pool;
    use chrono::NaiveDate;

    async fn test_state() -> Arc<AppState> {
        Arc::new(AppState {
            db: test_pool().await,
            config: Config::default(),
            tmdb: TmdbClient::new(&Config::default()).unwrap(),
            started_at: std::time::Instant::now(),
        })
    }

    fn tmdb_movie(title: &str, external_id: &str) -> CreateMovie {
        CreateMovie {
            title: title.to_string(),
            description: "Imported on demand".to_string(),
            genre: "Sci-Fi".to_string(),
            duration: 169,
            poster: "https://example.com/poster.jpg".to_string(),
            release_date: NaiveDate::from_ymd_opt(2014, 11, 7).unwrap(),
            external_id: Some(external_id.to_string()),
            rating: Some(8.4),
        }
    }

    #[tokio::test]
    async fn reconcile_imports_the_whole_catalog() {
        let pool = test_pool().await;

        let summary = CatalogSyncManager::reconcile(&pool, &curated_catalog())
            .await
            .unwrap();

        assert_eq!(summary.imported, 16);
        assert_eq!(summary.failed, 0);
        assert_eq!(summary.pruned, 0);
        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn reconcile_twice_changes_nothing() {
        let pool = test_pool().await;
        let catalog = curated_catalog();

        CatalogSyncManager::reconcile(&pool, &catalog).await.unwrap();
        let mut first_ids: Vec<String> = MovieRepository::list_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        first_ids.sort();

        let summary = CatalogSyncManager::reconcile(&pool, &catalog).await.unwrap();

        assert_eq!(summary.imported, 16);
        assert_eq!(summary.pruned, 0);
        let mut second_ids: Vec<String> = MovieRepository::list_all(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        second_ids.sort();
        assert_eq!(first_ids, second_ids);
    }

    #[tokio::test]
    async fn reconcile_prunes_entries_dropped_from_the_feed() {
        let pool = test_pool().await;
        let catalog = curated_catalog();

        CatalogSyncManager::reconcile(&pool, &catalog).await.unwrap();
        let trimmed = &catalog[..catalog.len() - 1];
        let summary = CatalogSyncManager::reconcile(&pool, trimmed).await.unwrap();

        assert_eq!(summary.imported, 15);
        assert_eq!(summary.pruned, 1);
        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 15);
    }

    #[tokio::test]
    async fn tmdb_imports_survive_reconcile() {
        let pool = test_pool().await;

        MovieRepository::insert(&pool, &tmdb_movie("Interstellar", "tmdb_157336"))
            .await
            .unwrap();
        let summary = CatalogSyncManager::reconcile(&pool, &curated_catalog())
            .await
            .unwrap();

        assert_eq!(summary.pruned, 0);
        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 17);
        assert!(MovieRepository::find_by_external_id(&pool, "tmdb_157336")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn import_returns_existing_movie_without_contacting_tmdb() {
        let pool = test_pool().await;
        // No API key configured: a remote lookup would fail loudly.
        let tmdb = TmdbClient::new(&Config::default()).unwrap();

        let stored = MovieRepository::insert(&pool, &tmdb_movie("Interstellar", "tmdb_157336"))
            .await
            .unwrap();
        let imported = CatalogSyncManager::import_by_tmdb_id(&pool, &tmdb, 157336)
            .await
            .unwrap();

        assert_eq!(imported.id, stored.id);
        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn import_of_unknown_movie_without_api_key_fails() {
        let pool = test_pool().await;
        let tmdb = TmdbClient::new(&Config::default()).unwrap();

        let result = CatalogSyncManager::import_by_tmdb_id(&pool, &tmdb, 157336).await;

        assert!(matches!(result, Err(crate::error::AppError::Config(_))));
        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn run_cycle_populates_an_empty_database() {
        let state = test_state().await;

        let cycle = SyncScheduler::run_cycle(&state).await;

        assert_eq!(cycle.imported, 16);
        assert_eq!(cycle.failed, 0);
        assert_eq!(cycle.theaters_seeded, 3);
        // 16 movies x 3 theaters x 4 screenings x 7 days.
        assert_eq!(cycle.showtimes_generated, 1344);
    }

    #[tokio::test]
    async fn second_cycle_leaves_schedule_untouched() {
        let state = test_state().await;

        SyncScheduler::run_cycle(&state).await;
        let before = ShowtimeRepository::count(&state.db).await.unwrap();

        let cycle = SyncScheduler::run_cycle(&state).await;

        assert_eq!(cycle.theaters_seeded, 0);
        assert_eq!(cycle.showtimes_generated, 0);
        assert_eq!(ShowtimeRepository::count(&state.db).await.unwrap(), before);
        assert_eq!(TheaterRepository::count(&state.db).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn scheduler_runs_first_cycle_on_start() {
        let state = test_state().await;
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut scheduler = SyncScheduler::new(state.clone(), shutdown_tx);

        scheduler.start();
        // Second start must not spawn a competing worker.
        scheduler.start();
        scheduler.stop().await;

        assert_eq!(MovieRepository::count(&state.db).await.unwrap(), 16);
        assert_eq!(TheaterRepository::count(&state.db).await.unwrap(), 3);
        assert_eq!(
            ShowtimeRepository::count(&state.db).await.unwrap(),
            1344
        );
    }

    #[tokio::test]
    async fn stop_without_start_is_a_no_op() {
        let state = test_state().await;
        let (shutdown_tx, _) = broadcast::channel(1);
        let mut scheduler = SyncScheduler::new(state, shutdown_tx);

        scheduler.stop().await;
    }
}
