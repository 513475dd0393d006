use tokio::sync::{broadcast, watch};

use super::{UiEvent, UiState, ViewState};
use crate::api::RemoteSource;
use crate::models::{Movie, MovieFilter};
use crate::services::MovieService;
use crate::Result;

type ListState = UiState<Vec<Movie>>;

/// Live movie list for one filter.
///
/// The list starts loading on construction. A storage error ends the
/// subscription with `UiState::Error` and a `UiEvent::ShowError`; `retry`
/// starts a new one.
pub struct MoviesViewModel<R> {
    service: MovieService<R>,
    filter: MovieFilter,
    view: ViewState<ListState>,
}

impl<R: RemoteSource + 'static> MoviesViewModel<R> {
    pub fn new(service: MovieService<R>, filter: MovieFilter) -> Self {
        let view_model = Self {
            service,
            filter,
            view: ViewState::new(UiState::Idle),
        };
        view_model.load();
        view_model
    }

    pub fn subscribe(&self) -> watch::Receiver<ListState> {
        self.view.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<UiEvent> {
        self.view.events()
    }

    pub fn current(&self) -> ListState {
        self.view.borrow().clone()
    }

    pub fn load(&self) {
        let publisher = self.view.supersede();
        publisher.publish(|state| *state = UiState::Loading);

        let mut stream = self.service.movies(self.filter);
        let filter = self.filter;
        self.view.spawn(async move {
            loop {
                match stream.next().await {
                    Ok(movies) => {
                        publisher.publish(|state| *state = UiState::Success(movies));
                    }
                    Err(error) => {
                        tracing::warn!(?filter, "movie list subscription failed: {error}");
                        let message = error.to_string();
                        publisher.notify(UiEvent::ShowError(format!(
                            "Failed to load movies: {message}"
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

    pub async fn toggle_favorite(&self, movie: &Movie) -> Result<()> {
        self.service
            .toggle_favorite(movie.id, !movie.is_favorite)
            .await
    }

    pub async fn toggle_watched(&self, movie: &Movie) -> Result<()> {
        self.service
            .toggle_watched(movie.id, !movie.is_watched)
            .await
    }
}
