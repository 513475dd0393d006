//! Data models for Reel

mod movie;

pub use movie::{Movie, MovieFilter, MovieId, NewMovie, RemoteMovie};
