use std::sync::Arc;

use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};

use crate::db::models::Movie;
use crate::db::repository::MovieRepository;
use crate::error::{AppError, AppResult};
use crate::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_movies))
        .route("/:id", get(get_movie))
}

async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<Movie>>> {
    let movies = MovieRepository::list_all(&state.db).await?;
    Ok(Json(movies))
}

async fn get_movie(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Movie>> {
    let movie = MovieRepository::find_by_id(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Movie {} not found", id)))?;

    Ok(Json(movie))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::CreateMovie;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(state: Arc<AppState>) -> Router {
        Router::new().nest("/api/movies", router()).with_state(state)
    }

    fn sample_movie(title: &str) -> CreateMovie {
        CreateMovie {
            title: title.to_string(),
            description: "A test feature".to_string(),
            genre: "Drama".to_string(),
            duration: 120,
            poster: "https://example.com/poster.jpg".to_string(),
            release_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            external_id: None,
            rating: None,
        }
    }

    #[tokio::test]
    async fn list_returns_stored_movies() {
        let state = crate::routes::test_state().await;
        MovieRepository::insert(&state.db, &sample_movie("Listed"))
            .await
            .unwrap();

        let response = app(state)
            .oneshot(Request::get("/api/movies").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["title"], "Listed");
    }

    #[tokio::test]
    async fn get_unknown_movie_returns_404() {
        let state = crate::routes::test_state().await;

        let response = app(state)
            .oneshot(
                Request::get("/api/movies/no-such-id")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn get_returns_movie_by_id() {
        let state = crate::routes::test_state().await;
        let stored = MovieRepository::insert(&state.db, &sample_movie("Fetched"))
            .await
            .unwrap();

        let response = app(state)
            .oneshot(
                Request::get(format!("/api/movies/{}", stored.id))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["id"], stored.id.as_str());
        assert_eq!(json["title"], "Fetched");
    }
}
