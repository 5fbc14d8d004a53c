pub mod movie;
pub mod showtime;
pub mod theater;

pub use movie::MovieRepository;
pub use showtime::ShowtimeRepository;
pub use theater::TheaterRepository;
