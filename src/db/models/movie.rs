use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Movie {
    pub id: String,
    pub title: String,
    pub description: String,
    pub genre: String,
    pub duration: i64,
    pub poster: String,
    pub release_date: NaiveDate,
    /// Stable identifier of the upstream record, when the movie came
    /// from a catalog feed or a TMDB import.
    pub external_id: Option<String>,
    pub rating: Option<f64>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMovie {
    pub title: String,
    pub description: String,
    pub genre: String,
    pub duration: i64,
    pub poster: String,
    pub release_date: NaiveDate,
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub rating: Option<f64>,
}

/// Partial update, matched against a movie by external id. Fields left
/// as `None` keep the stored value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateMovie {
    #[serde(default)]
    pub external_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub duration: Option<i64>,
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
    #[serde(default)]
    pub rating: Option<f64>,
}
