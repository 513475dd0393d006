//! Shared services used across clients.

mod live;
mod movies;
mod store;

pub use live::{MovieListStream, MovieStream};
pub use movies::MovieService;
pub use store::{MovieStore, StoreChange};
