pub mod catalog;
pub mod init;
pub mod schedule;
pub mod sync;
pub mod tmdb;
pub mod webhooks;
