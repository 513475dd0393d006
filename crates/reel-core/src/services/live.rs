//! Live queries over the local store.
//!
//! A live query is a subscription handle: the first `next()` yields the
//! current snapshot, every later `next()` waits for a relevant committed
//! change and yields a fresh snapshot. Dropping the handle unsubscribes.

use tokio::sync::broadcast::{self, error::RecvError};

use super::store::{MovieStore, StoreChange};
use crate::models::{Movie, MovieFilter, MovieId};
use crate::Result;

struct ChangeListener {
    changes: broadcast::Receiver<StoreChange>,
    primed: bool,
}

impl ChangeListener {
    const fn new(changes: broadcast::Receiver<StoreChange>) -> Self {
        Self {
            changes,
            primed: false,
        }
    }

    /// Resolve immediately on first use, then on the next change accepted
    /// by `relevant`.
    async fn wait(&mut self, relevant: impl Fn(&StoreChange) -> bool) {
        if !self.primed {
            self.primed = true;
            return;
        }

        loop {
            match self.changes.recv().await {
                Ok(change) if relevant(&change) => return,
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "live query lagged; re-querying");
                    return;
                }
                // Unreachable while this listener's store handle is alive
                Err(RecvError::Closed) => return,
            }
        }
    }
}

/// Live list of movies for one filter.
pub struct MovieListStream {
    store: MovieStore,
    filter: MovieFilter,
    listener: ChangeListener,
}

impl MovieListStream {
    pub(crate) const fn new(
        store: MovieStore,
        filter: MovieFilter,
        changes: broadcast::Receiver<StoreChange>,
    ) -> Self {
        Self {
            store,
            filter,
            listener: ChangeListener::new(changes),
        }
    }

    /// Next snapshot. A storage error is yielded as `Err` and the stream
    /// stays usable.
    pub async fn next(&mut self) -> Result<Vec<Movie>> {
        self.listener.wait(|_| true).await;
        self.store.list(self.filter).await
    }
}

/// Live view of a single movie, `None` while it is absent.
pub struct MovieStream {
    store: MovieStore,
    id: MovieId,
    listener: ChangeListener,
}

impl MovieStream {
    pub(crate) const fn new(
        store: MovieStore,
        id: MovieId,
        changes: broadcast::Receiver<StoreChange>,
    ) -> Self {
        Self {
            store,
            id,
            listener: ChangeListener::new(changes),
        }
    }

    pub const fn id(&self) -> MovieId {
        self.id
    }

    pub async fn next(&mut self) -> Result<Option<Movie>> {
        let id = self.id;
        self.listener.wait(|change| change.touches(id)).await;
        self.store.get(id).await
    }
}
