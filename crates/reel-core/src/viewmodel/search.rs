use std::time::Duration;

use tokio::sync::{broadcast, watch};

use super::{Publisher, UiEvent, UiState, ViewState};
use crate::api::RemoteSource;
use crate::models::Movie;
use crate::services::MovieService;

/// Shortest query that triggers a remote search.
pub const MIN_QUERY_LEN: usize = 2;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchState {
    pub query: String,
    pub results: UiState<Vec<Movie>>,
}

/// Search-as-you-type over the remote catalogue.
///
/// Every query change supersedes the pending search. Each scheduled search
/// carries a generation number and only publishes while it is still the
/// latest one, so an aborted or overtaken search never shows its results.
pub struct SearchViewModel<R> {
    service: MovieService<R>,
    debounce: Duration,
    view: ViewState<SearchState>,
}

impl<R: RemoteSource + 'static> SearchViewModel<R> {
    pub fn new(service: MovieService<R>) -> Self {
        Self::with_debounce(service, DEFAULT_DEBOUNCE)
    }

    pub fn with_debounce(service: MovieService<R>, debounce: Duration) -> Self {
        Self {
            service,
            debounce,
            view: ViewState::new(SearchState::default()),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.view.subscribe()
    }

    pub fn events(&self) -> broadcast::Receiver<UiEvent> {
        self.view.events()
    }

    pub fn current(&self) -> SearchState {
        self.view.borrow().clone()
    }

    pub fn update_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        let publisher = self.view.supersede();

        let searchable = is_searchable(&query);
        let is_empty = query.is_empty();
        self.view.modify(|state| {
            state.query.clone_from(&query);
            if is_empty {
                state.results = UiState::Idle;
            }
        });

        if searchable {
            self.spawn_search(publisher, query, Some(self.debounce));
        }
    }

    pub fn clear_search(&self) {
        self.view.supersede();
        self.view.modify(|state| *state = SearchState::default());
    }

    /// Search the current query now, skipping the debounce.
    pub fn perform_search(&self) {
        let query = self.view.borrow().query.clone();
        if !is_searchable(&query) {
            return;
        }
        let publisher = self.view.supersede();
        self.spawn_search(publisher, query, None);
    }

    fn spawn_search(
        &self,
        publisher: Publisher<SearchState>,
        query: String,
        delay: Option<Duration>,
    ) {
        let service = self.service.clone();
        self.view.spawn(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            publisher.publish(|state| state.results = UiState::Loading);
            let results = match service.search(&query).await {
                Ok(movies) => UiState::Success(movies),
                Err(error) => {
                    tracing::warn!(query = %query, "search failed: {error}");
                    publisher.notify(UiEvent::ShowError(format!("Search failed: {error}")));
                    UiState::Error(error.to_string())
                }
            };
            publisher.publish(|state| state.results = results);
        });
    }
}

fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_LEN
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{remote_movie, FakeRemote};
    use crate::services::MovieStore;
    use pretty_assertions::assert_eq;
    use tokio::time::{sleep, timeout};

    async fn setup(debounce: Duration) -> (SearchViewModel<FakeRemote>, FakeRemote) {
        let store = MovieStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::with_movies(vec![
            remote_movie(1, "Cat People", 1942),
            remote_movie(2, "Heat", 1995),
            remote_movie(3, "Catch Me If You Can", 2002),
        ]);
        let service = MovieService::new(store, remote.clone());
        (SearchViewModel::with_debounce(service, debounce), remote)
    }

    async fn wait_for(
        view_model: &SearchViewModel<FakeRemote>,
        accept: impl FnMut(&SearchState) -> bool,
    ) -> SearchState {
        let mut receiver = view_model.subscribe();
        let state = timeout(Duration::from_secs(2), receiver.wait_for(accept))
            .await
            .expect("state did not arrive in time")
            .unwrap()
            .clone();
        state
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn typing_within_debounce_runs_only_latest_query() {
        let (view_model, remote) = setup(Duration::from_millis(50)).await;

        view_model.update_search_query("ca");
        view_model.update_search_query("cat");
        sleep(Duration::from_millis(300)).await;

        assert_eq!(remote.searches(), vec!["cat".to_string()]);
        let state = view_model.current();
        assert_eq!(state.query, "cat");
        let titles = state
            .results
            .data()
            .unwrap()
            .iter()
            .map(|m| m.title.as_str())
            .collect::<Vec<_>>();
        assert_eq!(titles, vec!["Cat People", "Catch Me If You Can"]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn short_query_does_not_search() {
        let (view_model, remote) = setup(Duration::from_millis(10)).await;

        view_model.update_search_query("c");
        view_model.perform_search();
        sleep(Duration::from_millis(100)).await;

        assert!(remote.searches().is_empty());
        assert_eq!(view_model.current().results, UiState::Idle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn empty_query_resets_results() {
        let (view_model, _) = setup(Duration::from_millis(10)).await;

        view_model.update_search_query("heat");
        wait_for(&view_model, |s| s.results.data().is_some()).await;

        view_model.update_search_query("");
        assert_eq!(view_model.current(), SearchState::default());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn clear_search_cancels_pending_search() {
        let (view_model, remote) = setup(Duration::from_millis(50)).await;

        view_model.update_search_query("heat");
        view_model.clear_search();
        sleep(Duration::from_millis(200)).await;

        assert!(remote.searches().is_empty());
        assert_eq!(view_model.current(), SearchState::default());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn perform_search_skips_debounce() {
        let (view_model, remote) = setup(Duration::from_secs(60)).await;

        view_model.update_search_query("heat");
        view_model.perform_search();
        let state = wait_for(&view_model, |s| s.results.data().is_some()).await;

        assert_eq!(remote.searches(), vec!["heat".to_string()]);
        assert_eq!(state.results.data().unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn remote_failure_is_published_as_error() {
        let (view_model, remote) = setup(Duration::from_millis(10)).await;
        remote.set_offline(true);

        let mut events = view_model.events();
        view_model.update_search_query("heat");
        let state = wait_for(&view_model, |s| s.results.error().is_some()).await;

        assert!(state.results.error().unwrap().contains("503"));
        let event = timeout(Duration::from_secs(2), events.recv())
            .await
            .expect("no error event")
            .unwrap();
        assert!(
            matches!(event, UiEvent::ShowError(message) if message.starts_with("Search failed"))
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn superseded_search_never_publishes() {
        let (view_model, _) = setup(Duration::from_millis(10)).await;
        let mut events = view_model.events();
        let stale = view_model.view.supersede();
        view_model.view.supersede();

        assert!(!stale.publish(|state| state.results = UiState::Success(Vec::new())));
        stale.notify(UiEvent::ShowError("stale".to_string()));
        assert_eq!(view_model.current().results, UiState::Idle);
        assert!(events.try_recv().is_err());
    }
}
