pub mod movie;
pub mod showtime;
pub mod theater;

pub use movie::{CreateMovie, Movie, UpdateMovie};
pub use showtime::{CreateShowtime, Seat, ShowtimeWithTheater};
pub use theater::{CreateScreen, CreateTheater, Screen, Theater};
