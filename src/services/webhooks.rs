use serde::Deserialize;
use sqlx::SqlitePool;

use crate::db::models::{CreateMovie, UpdateMovie};
use crate::db::repository::MovieRepository;

const ACTION_CREATE: &str = "create";
const ACTION_UPDATE: &str = "update";
const ACTION_DELETE: &str = "delete";

/// Inbound change notification from the upstream catalog.
#[derive(Debug, Deserialize)]
pub struct CinemaEventPayload {
    pub action: String,
    pub movie: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct DeleteTarget {
    external_id: Option<String>,
}

pub struct WebhookService;

impl WebhookService {
    /// Applies one upstream delta on a best-effort basis. Malformed or
    /// unmatched deltas are logged and dropped; this never fails the caller.
    pub async fn apply_delta(pool: &SqlitePool, action: &str, movie: &serde_json::Value) {
        match action {
            ACTION_CREATE => Self::handle_create(pool, movie).await,
            ACTION_UPDATE => Self::handle_update(pool, movie).await,
            ACTION_DELETE => Self::handle_delete(pool, movie).await,
            other => {
                tracing::warn!("Unhandled webhook action: {}", other);
            }
        }
    }

    async fn handle_create(pool: &SqlitePool, movie: &serde_json::Value) {
        let create: CreateMovie = match serde_json::from_value(movie.clone()) {
            Ok(create) => create,
            Err(e) => {
                tracing::warn!("Dropping malformed create payload: {}", e);
                return;
            }
        };

        match MovieRepository::insert(pool, &create).await {
            Ok(created) => {
                tracing::info!("Webhook created movie: {}", created.title);
            }
            Err(e) => {
                tracing::warn!("Webhook create failed for {}: {:?}", create.title, e);
            }
        }
    }

    async fn handle_update(pool: &SqlitePool, movie: &serde_json::Value) {
        let update: UpdateMovie = match serde_json::from_value(movie.clone()) {
            Ok(update) => update,
            Err(e) => {
                tracing::warn!("Dropping malformed update payload: {}", e);
                return;
            }
        };

        let Some(external_id) = update.external_id.clone() else {
            tracing::warn!("Dropping update without an external id");
            return;
        };

        match MovieRepository::update_by_external_id(pool, &external_id, &update).await {
            Ok(Some(updated)) => {
                tracing::info!("Webhook updated movie: {}", updated.title);
            }
            Ok(None) => {
                tracing::debug!("Dropping update for unknown movie: {}", external_id);
            }
            Err(e) => {
                tracing::warn!("Webhook update failed for {}: {:?}", external_id, e);
            }
        }
    }

    async fn handle_delete(pool: &SqlitePool, movie: &serde_json::Value) {
        let target: DeleteTarget = match serde_json::from_value(movie.clone()) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!("Dropping malformed delete payload: {}", e);
                return;
            }
        };

        let Some(external_id) = target.external_id else {
            tracing::warn!("Dropping delete without an external id");
            return;
        };

        match MovieRepository::delete_by_external_id(pool, &external_id).await {
            Ok(0) => {
                tracing::debug!("Delete for unknown movie: {}", external_id);
            }
            Ok(_) => {
                tracing::info!("Webhook deleted movie: {}", external_id);
            }
            Err(e) => {
                tracing::warn!("Webhook delete failed for {}: {:?}", external_id, e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_pool;
    use serde_json::json;

    fn movie_payload(title: &str) -> serde_json::Value {
        json!({
            "title": title,
            "description": "Pushed by the feed",
            "genre": "Action",
            "duration": 110,
            "poster": "https://example.com/poster.jpg",
            "release_date": "2025-01-10"
        })
    }

    #[tokio::test]
    async fn create_inserts_a_movie() {
        let pool = test_pool().await;

        WebhookService::apply_delta(&pool, "create", &movie_payload("Pushed Movie")).await;

        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn create_is_not_deduplicated() {
        let pool = test_pool().await;
        let payload = movie_payload("Same Movie");

        WebhookService::apply_delta(&pool, "create", &payload).await;
        WebhookService::apply_delta(&pool, "create", &payload).await;

        // Creates are applied verbatim; dedup is the feed's job.
        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn malformed_create_is_dropped() {
        let pool = test_pool().await;

        WebhookService::apply_delta(&pool, "create", &json!({ "title": "No Other Fields" }))
            .await;

        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_for_unknown_movie_writes_nothing() {
        let pool = test_pool().await;

        WebhookService::apply_delta(
            &pool,
            "update",
            &json!({ "external_id": "feed_404", "title": "Ghost" }),
        )
        .await;

        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn update_patches_only_provided_fields() {
        let pool = test_pool().await;

        let mut payload = movie_payload("Original");
        payload["external_id"] = json!("feed_001");
        WebhookService::apply_delta(&pool, "create", &payload).await;

        WebhookService::apply_delta(
            &pool,
            "update",
            &json!({ "external_id": "feed_001", "rating": 9.1 }),
        )
        .await;

        let movie = MovieRepository::find_by_external_id(&pool, "feed_001")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(movie.title, "Original");
        assert_eq!(movie.rating, Some(9.1));
        assert_eq!(movie.duration, 110);
    }

    #[tokio::test]
    async fn update_without_external_id_is_dropped() {
        let pool = test_pool().await;

        let mut payload = movie_payload("Target");
        payload["external_id"] = json!("feed_002");
        WebhookService::apply_delta(&pool, "create", &payload).await;

        WebhookService::apply_delta(&pool, "update", &json!({ "title": "Renamed" })).await;

        let movie = MovieRepository::find_by_external_id(&pool, "feed_002")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(movie.title, "Target");
    }

    #[tokio::test]
    async fn delete_removes_matching_movie() {
        let pool = test_pool().await;

        let mut payload = movie_payload("Doomed");
        payload["external_id"] = json!("feed_003");
        WebhookService::apply_delta(&pool, "create", &payload).await;

        WebhookService::apply_delta(&pool, "delete", &json!({ "external_id": "feed_003" }))
            .await;

        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn delete_of_unknown_movie_is_a_no_op() {
        let pool = test_pool().await;

        WebhookService::apply_delta(&pool, "delete", &json!({ "external_id": "feed_404" }))
            .await;

        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn unknown_action_is_ignored() {
        let pool = test_pool().await;

        WebhookService::apply_delta(&pool, "upsert", &movie_payload("Ignored")).await;

        assert_eq!(MovieRepository::count(&pool).await.unwrap(), 0);
    }
}
