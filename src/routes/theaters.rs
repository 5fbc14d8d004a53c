use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::db::models::{ShowtimeWithTheater, Theater};
use crate::db::repository::{ShowtimeRepository, TheaterRepository};
use crate::error::AppResult;
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_theaters))
        .route("/showtimes/:movie_id", get(movie_showtimes))
}

async fn list_theaters(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Theater>>> {
    let theaters = TheaterRepository::list_all(&state.db).await?;
    Ok(Json(theaters))
}

/// Showtimes for one movie across all theaters, soonest first. A movie
/// without showtimes yields an empty list rather than an error.
async fn movie_showtimes(
    State(state): State<Arc<AppState>>,
    Path(movie_id): Path<String>,
) -> AppResult<Json<Vec<ShowtimeWithTheater>>> {
    let showtimes = ShowtimeRepository::list_by_movie(&state.db, &movie_id).await?;
    Ok(Json(showtimes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::schedule::ScheduleManager;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(state: Arc<AppState>) -> Router {
        Router::new()
            .nest("/api/theaters", router())
            .with_state(state)
    }

    #[tokio::test]
    async fn list_returns_seeded_theaters_with_screens() {
        let state = crate::routes::test_state().await;
        ScheduleManager::ensure_theaters(&state.db).await.unwrap();

        let response = app(state)
            .oneshot(Request::get("/api/theaters").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        let theaters = json.as_array().unwrap();
        assert_eq!(theaters.len(), 3);
        assert!(theaters
            .iter()
            .all(|t| !t["screens"].as_array().unwrap().is_empty()));
    }

    #[tokio::test]
    async fn showtimes_for_unknown_movie_are_empty() {
        let state = crate::routes::test_state().await;

        let response = app(state)
            .oneshot(
                Request::get("/api/theaters/showtimes/no-such-movie")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!([]));
    }
}
