use chrono::{Duration, Local, NaiveDate};
use sqlx::SqlitePool;

use crate::db::models::{CreateScreen, CreateShowtime, CreateTheater, Seat};
use crate::db::repository::{MovieRepository, ShowtimeRepository, TheaterRepository};
use crate::error::AppResult;

const SHOWTIME_HOURS: [u32; 4] = [10, 14, 18, 22];
const SCHEDULE_HORIZON_DAYS: i64 = 7;
const SEAT_ROWS: [&str; 10] = ["A", "B", "C", "D", "E", "F", "G", "H", "I", "J"];
const SEATS_PER_ROW: i64 = 10;
const DEFAULT_SEAT_PRICE: i64 = 150;

pub struct ScheduleManager;

impl ScheduleManager {
    /// Seeds the default theaters if none exist yet. Returns how many
    /// theaters were created.
    pub async fn ensure_theaters(pool: &SqlitePool) -> AppResult<usize> {
        if TheaterRepository::count(pool).await? > 0 {
            return Ok(0);
        }

        let defaults = default_theaters();
        for theater in &defaults {
            TheaterRepository::insert(pool, theater).await?;
            tracing::info!("Seeded theater: {}", theater.name);
        }

        Ok(defaults.len())
    }

    /// Generates a week of showtimes starting on today's local date. See
    /// [`Self::generate_from`].
    pub async fn generate(pool: &SqlitePool) -> AppResult<u64> {
        Self::generate_from(pool, Local::now().date_naive()).await
    }

    /// Generates showtimes for every movie in every theater: four screenings
    /// a day on the first screen, for seven days from `start_date`.
    ///
    /// If any showtime already exists the whole generation is skipped, so
    /// repeated sync cycles do not pile up duplicate schedules.
    pub async fn generate_from(pool: &SqlitePool, start_date: NaiveDate) -> AppResult<u64> {
        if ShowtimeRepository::count(pool).await? > 0 {
            tracing::debug!("Showtimes already exist, skipping schedule generation");
            return Ok(0);
        }

        let movies = MovieRepository::list_all(pool).await?;
        if movies.is_empty() {
            tracing::debug!("No movies in catalog, skipping schedule generation");
            return Ok(0);
        }

        let theaters = TheaterRepository::list_all(pool).await?;
        if theaters.is_empty() {
            tracing::warn!("No theaters present, cannot generate showtimes");
            return Ok(0);
        }

        let mut batch = Vec::new();
        for movie in &movies {
            for theater in &theaters {
                let Some(screen) = theater.screens.first() else {
                    tracing::warn!("Theater {} has no screens, skipping", theater.name);
                    continue;
                };
                let seats = build_seats(screen.capacity);

                for day in 0..SCHEDULE_HORIZON_DAYS {
                    let date = start_date + Duration::days(day);
                    for &hour in &SHOWTIME_HOURS {
                        let Some(start_time) = date.and_hms_opt(hour, 0, 0) else {
                            continue;
                        };
                        batch.push(CreateShowtime {
                            movie_id: movie.id.clone(),
                            theater_id: theater.id.clone(),
                            screen: screen.name.clone(),
                            start_time,
                            seats: seats.clone(),
                        });
                    }
                }
            }
        }

        let total = ShowtimeRepository::insert_many(pool, &batch).await?;
        tracing::info!(
            "Generated {} showtimes for {} movies across {} theaters",
            total,
            movies.len(),
            theaters.len()
        );

        Ok(total)
    }
}

fn default_theaters() -> Vec<CreateTheater> {
    vec![
        CreateTheater {
            name: "PVR Cinemas".to_string(),
            location: "Chennai".to_string(),
            screens: vec![
                CreateScreen {
                    name: "Screen 1".to_string(),
                    capacity: 100,
                },
                CreateScreen {
                    name: "Screen 2".to_string(),
                    capacity: 120,
                },
            ],
        },
        CreateTheater {
            name: "Sathyam Cinemas".to_string(),
            location: "Chennai".to_string(),
            screens: vec![
                CreateScreen {
                    name: "Sathyam".to_string(),
                    capacity: 200,
                },
                CreateScreen {
                    name: "Seasons".to_string(),
                    capacity: 150,
                },
            ],
        },
        CreateTheater {
            name: "IMAX".to_string(),
            location: "Chennai".to_string(),
            screens: vec![CreateScreen {
                name: "IMAX Screen".to_string(),
                capacity: 250,
            }],
        },
    ]
}

/// Lays out seats row by row (A1..A10, B1..) up to the screen capacity.
/// The layout tops out at a hundred seats regardless of capacity.
fn build_seats(capacity: i64) -> Vec<Seat> {
    let limit = capacity.clamp(0, SEAT_ROWS.len() as i64 * SEATS_PER_ROW) as usize;
    let mut seats = Vec::with_capacity(limit);

    'rows: for row in SEAT_ROWS {
        for number in 1..=SEATS_PER_ROW {
            if seats.len() >= limit {
                break 'rows;
            }
            seats.push(Seat {
                row: row.to_string(),
                number,
                booked: false,
                price: DEFAULT_SEAT_PRICE,
            });
        }
    }

    seats
}
