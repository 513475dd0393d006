//! Reconciliation of remote movie data into the local store.
//!
//! The remote service owns title/year/image; the local store owns the
//! favorite and watched flags. Every write of remote data goes through
//! [`merge_remote`], which carries flags forward by id and defaults them to
//! false for ids the store has never seen. Rows the remote no longer returns
//! are left alone.

use crate::api::RemoteSource;
use crate::db::FlagSnapshot;
use crate::models::{Movie, MovieFilter, MovieId, NewMovie, RemoteMovie};
use crate::services::MovieStore;
use crate::Result;

/// Combine remote records with the local flags in `snapshot`.
pub fn merge_remote(snapshot: &FlagSnapshot, remote: Vec<RemoteMovie>) -> Vec<Movie> {
    remote
        .into_iter()
        .map(|record| {
            let (is_favorite, is_watched) = snapshot.flags_for(record.id);
            Movie::from_remote_with_flags(record, is_favorite, is_watched)
        })
        .collect()
}

pub struct Synchronizer<R> {
    remote: R,
    store: MovieStore,
}

impl<R: RemoteSource> Synchronizer<R> {
    pub const fn new(remote: R, store: MovieStore) -> Self {
        Self { remote, store }
    }

    /// Merge `remote` into the store in one transaction.
    ///
    /// Returns `false` if the write failed; nothing from this attempt is
    /// committed in that case.
    pub async fn reconcile(&self, remote: Vec<RemoteMovie>) -> bool {
        match self
            .store
            .reconcile_with(|snapshot| merge_remote(snapshot, remote))
            .await
        {
            Ok(merged) => {
                tracing::info!("Reconciled {} movies into local store", merged.len());
                true
            }
            Err(error) => {
                tracing::warn!("Reconcile failed, local store unchanged: {error}");
                false
            }
        }
    }

    /// Fetch the full catalogue and reconcile it.
    ///
    /// Any failure is reported as `false`; there is no retry.
    pub async fn refresh(&self) -> bool {
        match self.remote.fetch_all().await {
            Ok(remote) => self.reconcile(remote).await,
            Err(error) => {
                tracing::warn!("Refresh failed, could not fetch movies: {error}");
                false
            }
        }
    }

    /// Fetch and reconcile a single movie.
    pub async fn refresh_movie(&self, id: MovieId) -> bool {
        match self.remote.fetch_by_id(id).await {
            Ok(remote) => self.reconcile(vec![remote]).await,
            Err(error) => {
                tracing::warn!("Refresh of movie {id} failed: {error}");
                false
            }
        }
    }

    /// Search the remote, merge the hits, and return them as stored.
    ///
    /// Unlike `refresh`, failures propagate to the caller.
    pub async fn search_and_merge(&self, query: &str) -> Result<Vec<Movie>> {
        let remote = self.remote.search(query).await?;
        let hit_ids = remote.iter().map(|movie| movie.id).collect::<Vec<_>>();
        tracing::debug!(query, hits = hit_ids.len(), "remote search returned");

        self.store
            .reconcile_with(|snapshot| merge_remote(snapshot, remote))
            .await?;

        let stored = self.store.list(MovieFilter::All).await?;
        Ok(stored
            .into_iter()
            .filter(|movie| hit_ids.contains(&movie.id))
            .collect())
    }

    /// Create a movie on the remote and store the canonical record.
    ///
    /// Returns `None` if the remote call or the local write fails. A remote
    /// failure leaves the store untouched.
    pub async fn add_record(&self, title: &str, year: i32) -> Option<Movie> {
        let created = match self.remote.add(&NewMovie::new(title, year)).await {
            Ok(created) => created,
            Err(error) => {
                tracing::warn!("Adding movie {title:?} failed: {error}");
                return None;
            }
        };

        // A freshly assigned id cannot have local flags yet
        let movie = Movie::from_remote(created);
        match self.store.upsert(&movie).await {
            Ok(()) => {
                tracing::info!("Added movie {} ({})", movie.id, movie.title);
                Some(movie)
            }
            Err(error) => {
                tracing::warn!("Movie {} was created remotely but not stored: {error}", movie.id);
                None
            }
        }
    }
}
