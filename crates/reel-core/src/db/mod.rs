//! Database layer for Reel

mod connection;
mod migrations;
mod repository;

pub use connection::Database;
pub use repository::{FlagSnapshot, LibSqlMovieRepository, MovieRepository};
