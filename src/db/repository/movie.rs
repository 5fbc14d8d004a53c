use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::db::models::{CreateMovie, Movie, UpdateMovie};
use crate::error::{AppError, AppResult};

pub struct MovieRepository;

impl MovieRepository {
    pub async fn find_by_id(pool: &SqlitePool, id: &str) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, duration, poster, release_date,
                   external_id, rating, created_at, updated_at
            FROM movies
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(movie)
    }

    pub async fn find_by_external_id(
        pool: &SqlitePool,
        external_id: &str,
    ) -> AppResult<Option<Movie>> {
        let movie = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, duration, poster, release_date,
                   external_id, rating, created_at, updated_at
            FROM movies
            WHERE external_id = ?
            "#,
        )
        .bind(external_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(movie)
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Movie>> {
        let movies = sqlx::query_as::<_, Movie>(
            r#"
            SELECT id, title, description, genre, duration, poster, release_date,
                   external_id, rating, created_at, updated_at
            FROM movies
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(movies)
    }

    pub async fn count(pool: &SqlitePool) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM movies")
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count.0)
    }

    pub async fn insert(pool: &SqlitePool, create: &CreateMovie) -> AppResult<Movie> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let movie = sqlx::query_as::<_, Movie>(
            r#"
            INSERT INTO movies (id, title, description, genre, duration, poster,
                                release_date, external_id, rating, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id, title, description, genre, duration, poster, release_date,
                      external_id, rating, created_at, updated_at
            "#,
        )
        .bind(&id)
        .bind(&create.title)
        .bind(&create.description)
        .bind(&create.genre)
        .bind(create.duration)
        .bind(&create.poster)
        .bind(create.release_date)
        .bind(&create.external_id)
        .bind(create.rating)
        .bind(now)
        .bind(now)
        .fetch_one(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(movie)
    }

    /// Inserts the movie, or refreshes the existing row carrying the same
    /// external id. Returns the stored movie and whether it was created.
    pub async fn upsert_by_external_id(
        pool: &SqlitePool,
        external_id: &str,
        create: &CreateMovie,
    ) -> AppResult<(Movie, bool)> {
        let existing = Self::find_by_external_id(pool, external_id).await?;

        match existing {
            Some(current) => {
                let now = Utc::now().naive_utc();

                let movie = sqlx::query_as::<_, Movie>(
                    r#"
                    UPDATE movies
                    SET title = ?, description = ?, genre = ?, duration = ?, poster = ?,
                        release_date = ?, rating = ?, updated_at = ?
                    WHERE id = ?
                    RETURNING id, title, description, genre, duration, poster, release_date,
                              external_id, rating, created_at, updated_at
                    "#,
                )
                .bind(&create.title)
                .bind(&create.description)
                .bind(&create.genre)
                .bind(create.duration)
                .bind(&create.poster)
                .bind(create.release_date)
                .bind(create.rating)
                .bind(now)
                .bind(&current.id)
                .fetch_one(pool)
                .await
                .map_err(AppError::Database)?;

                Ok((movie, false))
            }
            None => {
                let mut create = create.clone();
                create.external_id = Some(external_id.to_string());
                let movie = Self::insert(pool, &create).await?;
                Ok((movie, true))
            }
        }
    }

    /// Applies a partial update to the movie carrying the given external id.
    /// Returns `None` when no such movie exists.
    pub async fn update_by_external_id(
        pool: &SqlitePool,
        external_id: &str,
        update: &UpdateMovie,
    ) -> AppResult<Option<Movie>> {
        let now = Utc::now().naive_utc();

        let movie = sqlx::query_as::<_, Movie>(
            r#"
            UPDATE movies
            SET title = COALESCE(?, title),
                description = COALESCE(?, description),
                genre = COALESCE(?, genre),
                duration = COALESCE(?, duration),
                poster = COALESCE(?, poster),
                release_date = COALESCE(?, release_date),
                rating = COALESCE(?, rating),
                updated_at = ?
            WHERE external_id = ?
            RETURNING id, title, description, genre, duration, poster, release_date,
                      external_id, rating, created_at, updated_at
            "#,
        )
        .bind(&update.title)
        .bind(&update.description)
        .bind(&update.genre)
        .bind(update.duration)
        .bind(&update.poster)
        .bind(update.release_date)
        .bind(update.rating)
        .bind(now)
        .bind(external_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(movie)
    }

    pub async fn delete_by_external_id(pool: &SqlitePool, external_id: &str) -> AppResult<u64> {
        let result = sqlx::query("DELETE FROM movies WHERE external_id = ?")
            .bind(external_id)
            .execute(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }

    /// Deletes movies that were not part of the latest catalog feed.
    ///
    /// Movies imported on demand (external id prefixed `tmdb_`) and movies
    /// still referenced by a showtime are kept regardless.
    pub async fn prune_stale(pool: &SqlitePool, keep_ids: &[String]) -> AppResult<u64> {
        let keep = serde_json::to_string(keep_ids).map_err(|e| AppError::Internal(e.into()))?;

        // The underscore in the prefix is escaped so LIKE reads it literally.
        let result = sqlx::query(
            r#"
            DELETE FROM movies
            WHERE id NOT IN (SELECT value FROM json_each(?))
              AND (external_id IS NULL OR external_id NOT LIKE 'tmdb\_%' ESCAPE '\')
              AND id NOT IN (SELECT movie_id FROM showtimes)
            "#,
        )
        .bind(keep)
        .execute(pool)
        .await
        .map_err(AppError::Database)?;

        Ok(result.rows_affected())
    }
}
