use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theater {
    pub id: String,
    pub name: String,
    pub location: String,
    pub screens: Vec<Screen>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Screen {
    pub id: String,
    pub theater_id: String,
    pub name: String,
    pub capacity: i64,
    /// Order within the theater; the scheduler targets position 0.
    pub position: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTheater {
    pub name: String,
    pub location: String,
    pub screens: Vec<CreateScreen>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateScreen {
    pub name: String,
    pub capacity: i64,
}
