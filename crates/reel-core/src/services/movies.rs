//! Read/write surface over the local store and the synchronizer.

use std::sync::Arc;

use super::live::{MovieListStream, MovieStream};
use super::store::MovieStore;
use crate::api::RemoteSource;
use crate::models::{Movie, MovieFilter, MovieId};
use crate::sync::Synchronizer;
use crate::Result;

/// Entry point for clients. Reads go straight to the store; anything that
/// touches the remote goes through the synchronizer.
pub struct MovieService<R> {
    store: MovieStore,
    sync: Arc<Synchronizer<R>>,
}

impl<R> Clone for MovieService<R> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            sync: Arc::clone(&self.sync),
        }
    }
}

impl<R: RemoteSource> MovieService<R> {
    pub fn new(store: MovieStore, remote: R) -> Self {
        let sync = Synchronizer::new(remote, store.clone());
        Self {
            store,
            sync: Arc::new(sync),
        }
    }

    pub const fn store(&self) -> &MovieStore {
        &self.store
    }

    pub fn all_movies(&self) -> MovieListStream {
        self.store.watch_list(MovieFilter::All)
    }

    pub fn favorite_movies(&self) -> MovieListStream {
        self.store.watch_list(MovieFilter::Favorites)
    }

    pub fn watched_movies(&self) -> MovieListStream {
        self.store.watch_list(MovieFilter::Watched)
    }

    pub fn movies(&self, filter: MovieFilter) -> MovieListStream {
        self.store.watch_list(filter)
    }

    pub fn movie_by_id(&self, id: MovieId) -> MovieStream {
        self.store.watch_movie(id)
    }

    /// Set the favorite flag. Unknown ids are ignored.
    pub async fn toggle_favorite(&self, id: MovieId, is_favorite: bool) -> Result<()> {
        if !self.store.set_favorite(id, is_favorite).await? {
            tracing::debug!("toggle_favorite: movie {id} is not stored");
        }
        Ok(())
    }

    /// Set the watched flag. Unknown ids are ignored.
    pub async fn toggle_watched(&self, id: MovieId, is_watched: bool) -> Result<()> {
        if !self.store.set_watched(id, is_watched).await? {
            tracing::debug!("toggle_watched: movie {id} is not stored");
        }
        Ok(())
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Movie>> {
        self.sync.search_and_merge(query).await
    }

    pub async fn refresh(&self) -> bool {
        self.sync.refresh().await
    }

    pub async fn refresh_movie(&self, id: MovieId) -> bool {
        self.sync.refresh_movie(id).await
    }

    pub async fn add(&self, title: &str, year: i32) -> Option<Movie> {
        self.sync.add_record(title, year).await
    }

    /// Remove every locally stored movie, flags included.
    pub async fn reset(&self) -> Result<u64> {
        let removed = self.store.clear().await?;
        tracing::info!("Cleared {removed} movies from local store");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{remote_movie, FakeRemote};
    use std::time::Duration;
    use tokio::time::{sleep, timeout};

    async fn service() -> MovieService<FakeRemote> {
        let store = MovieStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::with_movies(vec![
            remote_movie(1, "Alien", 1979),
            remote_movie(2, "Aliens", 1986),
            remote_movie(3, "Heat", 1995),
        ]);
        MovieService::new(store, remote)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn toggle_favorite_is_visible_in_favorites_stream() {
        let service = service().await;
        assert!(service.refresh().await);

        service.toggle_favorite(MovieId::new(2), true).await.unwrap();
        let favorites = service.favorite_movies().next().await.unwrap();
        assert_eq!(favorites.iter().map(|m| m.id).collect::<Vec<_>>(), vec![MovieId::new(2)]);

        service.toggle_favorite(MovieId::new(2), false).await.unwrap();
        assert!(service.favorite_movies().next().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn toggle_watched_is_visible_in_watched_stream() {
        let service = service().await;
        assert!(service.refresh().await);

        service.toggle_watched(MovieId::new(3), true).await.unwrap();
        let watched = service.watched_movies().next().await.unwrap();
        assert_eq!(watched.len(), 1);
        assert_eq!(watched[0].title, "Heat");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn toggle_unknown_id_is_a_noop() {
        let service = service().await;
        service.toggle_favorite(MovieId::new(404), true).await.unwrap();
        assert!(service.all_movies().next().await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn all_movies_stream_follows_refresh_and_add() {
        let service = service().await;
        let mut all = service.all_movies();
        assert!(all.next().await.unwrap().is_empty());

        assert!(service.refresh().await);
        assert_eq!(all.next().await.unwrap().len(), 3);

        let added = service.add("Thief", 1981).await.unwrap();
        let snapshot = all.next().await.unwrap();
        assert_eq!(snapshot.last(), Some(&added));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn movie_by_id_reflects_flag_changes() {
        let service = service().await;
        assert!(service.refresh().await);

        let mut detail = service.movie_by_id(MovieId::new(1));
        assert!(!detail.next().await.unwrap().unwrap().is_favorite);

        service.toggle_favorite(MovieId::new(1), true).await.unwrap();
        assert!(detail.next().await.unwrap().unwrap().is_favorite);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn search_routes_through_synchronizer() {
        let service = service().await;
        let hits = service.search("alien").await.unwrap();
        assert_eq!(hits.len(), 2);
        // Search results are persisted locally
        assert_eq!(service.movies(MovieFilter::All).next().await.unwrap().len(), 2);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn toggle_during_refresh_survives_reconcile() {
        let store = MovieStore::open_in_memory().await.unwrap();
        let remote = FakeRemote::with_movies(vec![remote_movie(1, "Alien: Director's Cut", 2003)]);
        let service = MovieService::new(store.clone(), remote.clone());
        store
            .upsert(&Movie {
                id: MovieId::new(1),
                title: "Alien".to_string(),
                year: 1979,
                image_url: String::new(),
                is_favorite: false,
                is_watched: false,
            })
            .await
            .unwrap();

        let gate = remote.hold_fetches().await;
        let refresh = tokio::spawn({
            let service = service.clone();
            async move { service.refresh().await }
        });
        timeout(Duration::from_secs(2), async {
            while remote.fetches_started() == 0 {
                sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("refresh never reached the remote");

        // Refresh is parked inside the remote fetch
        service.toggle_favorite(MovieId::new(1), true).await.unwrap();
        drop(gate);
        assert!(refresh.await.unwrap());

        let stored = store.get(MovieId::new(1)).await.unwrap().unwrap();
        assert!(stored.is_favorite);
        assert_eq!(stored.title, "Alien: Director's Cut");
        assert_eq!(stored.year, 2003);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn reset_clears_store() {
        let service = service().await;
        assert!(service.refresh().await);
        assert_eq!(service.reset().await.unwrap(), 3);
        assert!(service.all_movies().next().await.unwrap().is_empty());
    }
}
