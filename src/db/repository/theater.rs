use chrono::Utc;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::models::{CreateTheater, Screen, Theater};
use crate::error::{AppError, AppResult};

pub struct TheaterRepository;

impl TheaterRepository {
    pub async fn count(pool: &SqlitePool) -> AppResult<i64> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM theaters")
            .fetch_one(pool)
            .await
            .map_err(AppError::Database)?;

        Ok(count.0)
    }

    /// Inserts a theater together with its screens in one transaction.
    pub async fn insert(pool: &SqlitePool, create: &CreateTheater) -> AppResult<Theater> {
        let theater_id = Uuid::new_v4().to_string();
        let now = Utc::now().naive_utc();

        let mut tx = pool.begin().await.map_err(AppError::Database)?;

        sqlx::query(
            r#"
            INSERT INTO theaters (id, name, location, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&theater_id)
        .bind(&create.name)
        .bind(&create.location)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(AppError::Database)?;

        let mut screens = Vec::with_capacity(create.screens.len());
        for (position, screen) in create.screens.iter().enumerate() {
            let screen_id = Uuid::new_v4().to_string();

            sqlx::query(
                r#"
                INSERT INTO screens (id, theater_id, name, capacity, position)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&screen_id)
            .bind(&theater_id)
            .bind(&screen.name)
            .bind(screen.capacity)
            .bind(position as i64)
            .execute(&mut *tx)
            .await
            .map_err(AppError::Database)?;

            screens.push(Screen {
                id: screen_id,
                theater_id: theater_id.clone(),
                name: screen.name.clone(),
                capacity: screen.capacity,
                position: position as i64,
            });
        }

        tx.commit().await.map_err(AppError::Database)?;

        Ok(Theater {
            id: theater_id,
            name: create.name.clone(),
            location: create.location.clone(),
            screens,
            created_at: now,
            updated_at: now,
        })
    }

    pub async fn list_all(pool: &SqlitePool) -> AppResult<Vec<Theater>> {
        let theater_rows = sqlx::query(
            r#"
            SELECT id, name, location, created_at, updated_at
            FROM theaters
            ORDER BY created_at ASC, name ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        let screens = sqlx::query_as::<_, Screen>(
            r#"
            SELECT id, theater_id, name, capacity, position
            FROM screens
            ORDER BY theater_id ASC, position ASC
            "#,
        )
        .fetch_all(pool)
        .await
        .map_err(AppError::Database)?;

        let mut theaters: Vec<Theater> = theater_rows
            .into_iter()
            .map(|row| Theater {
                id: row.get("id"),
                name: row.get("name"),
                location: row.get("location"),
                screens: Vec::new(),
                created_at: row.get("created_at"),
                updated_at: row.get("updated_at"),
            })
            .collect();

        for screen in screens {
            if let Some(theater) = theaters.iter_mut().find(|t| t.id == screen.theater_id) {
                theater.screens.push(screen);
            }
        }

        Ok(theaters)
    }
}
