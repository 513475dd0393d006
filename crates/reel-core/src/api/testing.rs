//! In-process `RemoteSource` used by unit tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use tokio::sync::OwnedMutexGuard;

use super::{ApiError, ApiResult, RemoteSource};
use crate::models::{MovieId, NewMovie, RemoteMovie};

#[derive(Default)]
struct FakeState {
    catalogue: Vec<RemoteMovie>,
    next_id: i64,
    offline: bool,
    searches: Vec<String>,
}

/// Shared-state fake: clones observe the same catalogue and call log.
#[derive(Clone, Default)]
pub struct FakeRemote {
    state: Arc<Mutex<FakeState>>,
    fetch_gate: Arc<tokio::sync::Mutex<()>>,
    fetches_started: Arc<AtomicUsize>,
}

impl FakeRemote {
    pub fn with_movies(movies: Vec<RemoteMovie>) -> Self {
        let next_id = movies.iter().map(|m| m.id.get()).max().unwrap_or(0) + 1;
        Self {
            state: Arc::new(Mutex::new(FakeState {
                catalogue: movies,
                next_id,
                ..FakeState::default()
            })),
            ..Self::default()
        }
    }

    /// Block `fetch_all` calls until the returned guard is dropped.
    pub async fn hold_fetches(&self) -> OwnedMutexGuard<()> {
        Arc::clone(&self.fetch_gate).lock_owned().await
    }

    /// Number of `fetch_all` calls that have begun, including blocked ones.
    pub fn fetches_started(&self) -> usize {
        self.fetches_started.load(Ordering::SeqCst)
    }

    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn set_catalogue(&self, movies: Vec<RemoteMovie>) {
        self.state.lock().unwrap().catalogue = movies;
    }

    pub fn searches(&self) -> Vec<String> {
        self.state.lock().unwrap().searches.clone()
    }

    fn check_online(state: &FakeState) -> ApiResult<()> {
        if state.offline {
            Err(ApiError::Api("service unavailable (503)".to_string()))
        } else {
            Ok(())
        }
    }
}

pub fn remote_movie(id: i64, title: &str, year: i32) -> RemoteMovie {
    RemoteMovie {
        id: MovieId::new(id),
        title: title.to_string(),
        year,
        image_url: format!("https://img.example.com/{id}.jpg"),
    }
}

impl RemoteSource for FakeRemote {
    async fn fetch_all(&self) -> ApiResult<Vec<RemoteMovie>> {
        self.fetches_started.fetch_add(1, Ordering::SeqCst);
        let _open = self.fetch_gate.lock().await;
        let state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        Ok(state.catalogue.clone())
    }

    async fn search(&self, query: &str) -> ApiResult<Vec<RemoteMovie>> {
        let mut state = self.state.lock().unwrap();
        state.searches.push(query.to_string());
        Self::check_online(&state)?;
        let needle = query.to_lowercase();
        Ok(state
            .catalogue
            .iter()
            .filter(|movie| movie.title.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn fetch_by_id(&self, id: MovieId) -> ApiResult<RemoteMovie> {
        let state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        state
            .catalogue
            .iter()
            .find(|movie| movie.id == id)
            .cloned()
            .ok_or_else(|| ApiError::Api(format!("movie {id} not found (404)")))
    }

    async fn add(&self, movie: &NewMovie) -> ApiResult<RemoteMovie> {
        let mut state = self.state.lock().unwrap();
        Self::check_online(&state)?;
        let id = state.next_id.max(1);
        state.next_id = id + 1;
        let created = remote_movie(id, &movie.title, movie.year);
        state.catalogue.push(created.clone());
        Ok(created)
    }
}
