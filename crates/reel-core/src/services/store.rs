//! Shared local movie store used across clients.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::{broadcast, Mutex};

use super::live::{MovieListStream, MovieStream};
use crate::db::{Database, FlagSnapshot, LibSqlMovieRepository, MovieRepository};
use crate::models::{Movie, MovieFilter, MovieId};
use crate::Result;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A committed mutation of the local store, published to live queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    Upserted(Vec<MovieId>),
    FlagChanged(MovieId),
    Deleted(MovieId),
    Cleared,
}

impl StoreChange {
    /// Whether this change can alter the row for `id`.
    pub fn touches(&self, id: MovieId) -> bool {
        match self {
            Self::Upserted(ids) => ids.contains(&id),
            Self::FlagChanged(changed) | Self::Deleted(changed) => *changed == id,
            Self::Cleared => true,
        }
    }
}

/// Thread-safe handle to the local movie store.
///
/// All reads and writes go through one connection behind a mutex, so writes
/// are serialized and a reconcile's snapshot-then-write cannot interleave
/// with another write.
#[derive(Clone)]
pub struct MovieStore {
    db: Arc<Mutex<Database>>,
    changes: broadcast::Sender<StoreChange>,
}

impl MovieStore {
    fn from_database(db: Database) -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            db: Arc::new(Mutex::new(db)),
            changes,
        }
    }

    /// Open a store at the given filesystem path, creating parent directories.
    ///
    /// A file that is not a valid database is moved aside and a fresh
    /// database is created in its place.
    pub async fn open_path(db_path: impl Into<PathBuf>) -> Result<Self> {
        let db_path = db_path.into();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = match Database::open(&db_path).await {
            Ok(db) => db,
            Err(error) if Self::is_corrupted_db_error(&error) => {
                tracing::warn!(
                    "Local movie database at {} is unreadable: {}. Moving it aside and starting fresh.",
                    db_path.display(),
                    error
                );
                Self::quarantine_corrupted_db_files(&db_path)?;
                Database::open(&db_path).await?
            }
            Err(error) => return Err(error),
        };

        Ok(Self::from_database(db))
    }

    /// Open an in-memory store (primarily for tests).
    pub async fn open_in_memory() -> Result<Self> {
        let db = Database::open_in_memory().await?;
        Ok(Self::from_database(db))
    }

    fn is_corrupted_db_error(error: &crate::Error) -> bool {
        let message = error.to_string().to_ascii_lowercase();
        message.contains("file is not a database") || message.contains("database disk image is malformed")
    }

    fn quarantine_corrupted_db_files(db_path: &Path) -> Result<()> {
        let Some(base_name) = db_path.file_name().and_then(|name| name.to_str()) else {
            return Ok(());
        };

        if db_path.exists() {
            let timestamp = std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map_or(0, |duration| duration.as_millis());
            let backup_path = db_path.with_file_name(format!("{base_name}.corrupt-{timestamp}"));

            std::fs::rename(db_path, &backup_path)?;
            tracing::warn!(
                "Moved corrupted movie database from {} to {}",
                db_path.display(),
                backup_path.display()
            );
        }

        let Some(parent) = db_path.parent() else {
            return Ok(());
        };
        let parent = if parent.as_os_str().is_empty() {
            Path::new(".")
        } else {
            parent
        };
        let sidecar_prefix = format!("{base_name}-");

        for entry in std::fs::read_dir(parent)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();
            if file_name.starts_with(&sidecar_prefix) {
                let path = entry.path();
                std::fs::remove_file(&path)?;
                tracing::warn!("Removed stale database sidecar {}", path.display());
            }
        }

        Ok(())
    }

    fn notify(&self, change: StoreChange) {
        tracing::debug!(?change, "movie store changed");
        // No live queries is not an error
        let _ = self.changes.send(change);
    }

    /// Subscribe to raw change notifications.
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }

    /// List movies passing `filter`, in insertion order.
    pub async fn list(&self, filter: MovieFilter) -> Result<Vec<Movie>> {
        let db = self.db.lock().await;
        let repo = LibSqlMovieRepository::new(db.connection());
        repo.list(filter).await
    }

    /// Fetch a movie by id.
    pub async fn get(&self, id: MovieId) -> Result<Option<Movie>> {
        let db = self.db.lock().await;
        let repo = LibSqlMovieRepository::new(db.connection());
        repo.get(id).await
    }

    /// Insert or replace a single movie.
    pub async fn upsert(&self, movie: &Movie) -> Result<()> {
        {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            repo.upsert(movie).await?;
        }
        self.notify(StoreChange::Upserted(vec![movie.id]));
        Ok(())
    }

    /// Insert or replace many movies in one transaction.
    pub async fn upsert_many(&self, movies: &[Movie]) -> Result<()> {
        if movies.is_empty() {
            return Ok(());
        }
        {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            repo.upsert_many(movies).await?;
        }
        self.notify(StoreChange::Upserted(movies.iter().map(|m| m.id).collect()));
        Ok(())
    }

    /// Snapshot local flags, build rows with `merge`, and write them, all
    /// under one lock acquisition and one transaction.
    ///
    /// Returns the rows that were written.
    pub async fn reconcile_with<F>(&self, merge: F) -> Result<Vec<Movie>>
    where
        F: FnOnce(&FlagSnapshot) -> Vec<Movie> + Send,
    {
        let merged = {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            let snapshot = repo.flag_snapshot().await?;
            let merged = merge(&snapshot);
            repo.upsert_many(&merged).await?;
            merged
        };

        if !merged.is_empty() {
            self.notify(StoreChange::Upserted(merged.iter().map(|m| m.id).collect()));
        }
        Ok(merged)
    }

    /// Set the favorite flag. Unknown ids are a no-op; returns whether a row
    /// was updated.
    pub async fn set_favorite(&self, id: MovieId, is_favorite: bool) -> Result<bool> {
        let updated = {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            repo.set_favorite(id, is_favorite).await?
        };
        if updated {
            self.notify(StoreChange::FlagChanged(id));
        }
        Ok(updated)
    }

    /// Set the watched flag. Unknown ids are a no-op; returns whether a row
    /// was updated.
    pub async fn set_watched(&self, id: MovieId, is_watched: bool) -> Result<bool> {
        let updated = {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            repo.set_watched(id, is_watched).await?
        };
        if updated {
            self.notify(StoreChange::FlagChanged(id));
        }
        Ok(updated)
    }

    /// Delete one movie; returns whether it existed.
    pub async fn delete(&self, id: MovieId) -> Result<bool> {
        let deleted = {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            repo.delete(id).await?
        };
        if deleted {
            self.notify(StoreChange::Deleted(id));
        }
        Ok(deleted)
    }

    /// Delete every movie; returns how many were removed.
    pub async fn clear(&self) -> Result<u64> {
        let removed = {
            let db = self.db.lock().await;
            let repo = LibSqlMovieRepository::new(db.connection());
            repo.clear().await?
        };
        self.notify(StoreChange::Cleared);
        Ok(removed)
    }

    /// Live list of movies passing `filter`, re-emitted on every mutation.
    pub fn watch_list(&self, filter: MovieFilter) -> MovieListStream {
        MovieListStream::new(self.clone(), filter, self.subscribe())
    }

    /// Live view of one movie, re-emitted when that id is mutated.
    pub fn watch_movie(&self, id: MovieId) -> MovieStream {
        MovieStream::new(self.clone(), id, self.subscribe())
    }

    #[cfg(test)]
    pub(crate) async fn execute_raw(&self, sql: &str) -> Result<()> {
        let db = self.db.lock().await;
        db.connection().execute(sql, ()).await?;
        Ok(())
    }
}
