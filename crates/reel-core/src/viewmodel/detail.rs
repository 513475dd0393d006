use tokio::sync::{broadcast, watch};

use super::{UiEvent, UiState, ViewState};
use crate::api::RemoteSource;
use crate::models::{Movie, MovieId};
use crate::services::MovieService;
use crate::Result;

type DetailState = UiState<Option<Movie>>;

/// Live view of one movie. `Success(None)` means the id is not stored.
pub struct DetailViewModel<R> {
    service: MovieService<R>,
    id: MovieId,
    view: ViewState<DetailState>,
}

impl<R: RemoteSource + 'static> DetailViewModel<R> {
    pub fn new(service: MovieService<R>, id: MovieId) -> Self {
        let view_model = Self {
            service,
            id,
            view: ViewState::new(UiState::Idle),
        };
        view_model.load();
        view_model
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.view.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<UiEvent> {
        self.view.events()
    }

    pub fn current(&self) -> DetailState {
        self.view.borrow().clone()
    }

    pub fn load(&self) {
        let publisher = self.view.supersede();
        publisher.publish(|state| *state = UiState::Loading);

        let mut stream = self.service.movie_by_id(self.id);
        self.view.spawn(async move {
            loop {
                match stream.next().await {
                    Ok(movie) => {
                        publisher.publish(|state| *state = UiState::Success(movie));
                    }
                    Err(error) => {
                        tracing::warn!(id = %stream.id(), "movie subscription failed: {error}");
                        let message = error.to_string();
                        publisher.notify(UiEvent::ShowError(format!(
                            "Failed to load movie details: {message}"
                        )));
                        publisher.publish(|state| *state = UiState::Error(message));
                        break;
                    }
                }
            }
        });
    }

    pub fn retry(&self) {
        self.load();
    }

    /// Flip the favorite flag of the loaded movie. Does nothing until a
    /// movie is loaded.
    pub async fn toggle_favorite(&self) -> Result<()> {
        let Some(movie) = self.loaded() else {
            return Ok(());
        };
        self.service
            .toggle_favorite(movie.id, !movie.is_favorite)
            .await
    }

    /// Flip the watched flag of the loaded movie. Does nothing until a
    /// movie is loaded.
    pub async fn toggle_watched(&self) -> Result<()> {
        let Some(movie) = self.loaded() else {
            return Ok(());
        };
        self.service
            .toggle_watched(movie.id, !movie.is_watched)
            .await
    }

    fn loaded(&self) -> Option<Movie> {
        self.view.borrow().data().cloned().flatten()
    }
}
