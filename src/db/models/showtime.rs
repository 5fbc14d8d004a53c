use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Seat {
    pub row: String,
    pub number: i64,
    pub booked: bool,
    pub price: i64,
}

#[derive(Debug, Clone)]
pub struct CreateShowtime {
    pub movie_id: String,
    pub theater_id: String,
    pub screen: String,
    pub start_time: NaiveDateTime,
    pub seats: Vec<Seat>,
}

/// Showtime joined with its theater, as served to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ShowtimeWithTheater {
    pub id: String,
    pub movie_id: String,
    pub theater_id: String,
    pub theater_name: String,
    pub theater_location: String,
    pub screen: String,
    pub start_time: NaiveDateTime,
    pub seats: Vec<Seat>,
}
