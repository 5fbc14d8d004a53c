use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::{CreateShowtime, Seat, ShowtimeWithTheater};
use crate::error::{AppError, AppResult};

pub struct ShowtimeRepository;

impl ShowtimeRepository {
    pub async fn count(pool: &SqlitePool) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM showtimes")
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count.0)
    }

    /// Inserts a batch of showtimes in one transaction. Either the whole
    /// schedule lands or none of it does.
    pub async fn insert_many(pool: &SqlitePool, showtimes: &[CreateShowtime]) -> AppResult<u64> {
        if showtimes.is_empty() {
            return Ok(0);
        }

        let now = Utc::now().naive_utc();
        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        for showtime in showtimes {
            let id = Uuid::new_v4().to_string();
            let seats_json = serde_json::to_string(&showtime.seats)
                .map_err(|e| AppError::Internal(e.into()))?;

            sqlx::query(
                r#"
                INSERT INTO showtimes (id, movie_id, theater_id, screen, start_time,
                                       seats_json, created_at, updated_at)
                VALUES (?, ?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(&id)
            .bind(&showtime.movie_id)
            .bind(&showtime.theater_id)
            .bind(&showtime.screen)
            .bind(showtime.start_time)
            .bind(seats_json)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(showtimes.len() as u64)
    }

    pub async fn list_by_movie(
        pool: &SqlitePool,
        movie_id: &str,
    ) -> AppResult<Vec<ShowtimeWithTheater>> {
        let rows = sqlx::query(
            r#"
            SELECT s.id, s.movie_id, s.theater_id, t.name AS theater_name,
                   t.location AS theater_location, s.screen, s.start_time, s.seats_json
            FROM showtimes s
            JOIN theaters t ON t.id = s.theater_id
            WHERE s.movie_id = ?
            ORDER BY s.start_time ASC
            "#,
        )
        .bind(movie_id)
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        let mut showtimes = Vec::with_capacity(rows.len());
        for row in rows {
            let seats_json: String = row.get("seats_json");
            let seats: Vec<Seat> =
                serde_json::from_str(&seats_json).map_err(|e| AppError::Internal(e.into()))?;

            showtimes.push(ShowtimeWithTheater {
                id: row.get("id"),
                movie_id: row.get("movie_id"),
                theater_id: row.get("theater_id"),
                theater_name: row.get("theater_name"),
                theater_location: row.get("theater_location"),
                screen: row.get("screen"),
                start_time: row.get("start_time"),
                seats,
            });
        }

        Ok(showtimes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::models::{CreateMovie, CreateScreen, CreateTheater};
    use crate::db::repository::{MovieRepository, TheaterRepository};
    use crate::db::test_pool;
    use chrono::NaiveDate;

    async fn seed_movie_and_theater(pool: &SqlitePool) -> (String, String) {
        let movie = MovieRepository::insert(
            pool,
            &CreateMovie {
                title: "Feature".to_string(),
                description: "A test feature".to_string(),
                genre: "Drama".to_string(),
                duration: 120,
                poster: "https://example.com/poster.jpg".to_string(),
                release_date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                external_id: None,
                rating: None,
            },
        )
        .await
        .unwrap();

        let theater = TheaterRepository::insert(
            pool,
            &CreateTheater {
                name: "Single Screen".to_string(),
                location: "Chennai".to_string(),
                screens: vec![CreateScreen {
                    name: "Main".to_string(),
                    capacity: 50,
                }],
            },
        )
        .await
        .unwrap();

        (movie.id, theater.id)
    }

    fn seats() -> Vec<Seat> {
        vec![
            Seat {
                row: "A".to_string(),
                number: 1,
                booked: false,
                price: 150,
            },
            Seat {
                row: "A".to_string(),
                number: 2,
                booked: false,
                price: 150,
            },
        ]
    }

    #[tokio::test]
    async fn insert_many_persists_batch() {
        let pool = test_pool().await;
        let (movie_id, theater_id) = seed_movie_and_theater(&pool).await;

        let start = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let batch: Vec<CreateShowtime> = (0..3)
            .map(|i| CreateShowtime {
                movie_id: movie_id.clone(),
                theater_id: theater_id.clone(),
                screen: "Main".to_string(),
                start_time: start + chrono::Duration::hours(4 * i),
                seats: seats(),
            })
            .collect();

        let inserted = ShowtimeRepository::insert_many(&pool, &batch).await.unwrap();

        assert_eq!(inserted, 3);
        assert_eq!(ShowtimeRepository::count(&pool).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn list_by_movie_joins_theater_and_restores_seats() {
        let pool = test_pool().await;
        let (movie_id, theater_id) = seed_movie_and_theater(&pool).await;

        let start = NaiveDate::from_ymd_opt(2026, 3, 1)
            .unwrap()
            .and_hms_opt(14, 0, 0)
            .unwrap();
        ShowtimeRepository::insert_many(
            &pool,
            &[CreateShowtime {
                movie_id: movie_id.clone(),
                theater_id,
                screen: "Main".to_string(),
                start_time: start,
                seats: seats(),
            }],
        )
        .await
        .unwrap();

        let listed = ShowtimeRepository::list_by_movie(&pool, &movie_id)
            .await
            .unwrap();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].theater_name, "Single Screen");
        assert_eq!(listed[0].theater_location, "Chennai");
        assert_eq!(listed[0].seats, seats());
        assert_eq!(listed[0].start_time, start);
    }

    #[tokio::test]
    async fn insert_many_with_empty_batch_is_a_no_op() {
        let pool = test_pool().await;

        let inserted = ShowtimeRepository::insert_many(&pool, &[]).await.unwrap();

        assert_eq!(inserted, 0);
        assert_eq!(ShowtimeRepository::count(&pool).await.unwrap(), 0);
    }
}
