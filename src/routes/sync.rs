use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDateTime;
use serde::Serialize;

use crate::db::repository::{MovieRepository, ShowtimeRepository, TheaterRepository};
use crate::error::{AppError, AppResult};
use crate::services::sync::{CycleSummary, SyncScheduler};
use crate::AppState;

#[derive(Serialize)]
pub struct SyncStatus {
    pub movies: i64,
    pub theaters: i64,
    pub showtimes: i64,
    pub last_synced_at: Option<NaiveDateTime>,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", post(trigger_sync))
        .route("/status", get(sync_status))
}

/// Runs one sync cycle on demand, independent of the scheduler's timer.
async fn trigger_sync(State(state): State<Arc<AppState>>) -> Json<CycleSummary> {
    Json(SyncScheduler::run_cycle(&state).await)
}

async fn sync_status(State(state): State<Arc<AppState>>) -> AppResult<Json<SyncStatus>> {
    let movies = MovieRepository::count(&state.db).await?;
    let theaters = TheaterRepository::count(&state.db).await?;
    let showtimes = ShowtimeRepository::count(&state.db).await?;
    let last_synced_at: Option<NaiveDateTime> =
        sqlx::query_scalar("SELECT MAX(updated_at) FROM movies")
            .fetch_one(&state.db)
            .await
            .map_err(AppError::Database)?;

    Ok(Json(SyncStatus {
        movies,
        theaters,
        showtimes,
        last_synced_at,
    }))
}
