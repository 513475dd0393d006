//! reel-core - Core library for Reel
//!
//! This crate contains the shared models, local store, remote client,
//! synchronization logic, and view-model layer used by Reel interfaces.

pub mod api;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod services;
pub mod sync;
pub mod util;
pub mod viewmodel;

pub use error::{Error, Result};
pub use models::{Movie, MovieFilter, MovieId, NewMovie, RemoteMovie};
