use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use crate::db::models::Movie;
use crate::error::{AppError, AppResult};
use crate::services::sync::CatalogSyncManager;
use crate::services::tmdb::TmdbMovieSummary;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub tmdb_id: i64,
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/search", get(search_movies))
        .route("/import", post(import_movie))
}

async fn search_movies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<TmdbMovieSummary>>> {
    let query = params.query.trim();
    if query.is_empty() {
        return Err(AppError::BadRequest(
            "Search query must not be empty".to_string(),
        ));
    }

    Ok(Json(state.tmdb.search_movies(query).await))
}

async fn import_movie(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ImportRequest>,
) -> AppResult<Json<Movie>> {
    let movie = CatalogSyncManager::import_by_tmdb_id(&state.db, &state.tmdb, body.tmdb_id).await?;
    Ok(Json(movie))
}
