//! Presentation state for movie screens.
//!
//! View-models own background tasks that feed a `tokio::sync::watch`
//! channel; a UI subscribes to the channel and renders whatever `UiState`
//! it holds. One-shot notifications such as error toasts ride a separate
//! `broadcast` of [`UiEvent`]s. Tasks are aborted when the view-model is
//! dropped, so they must be created inside a tokio runtime.

mod detail;
mod list;
mod search;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

pub use detail::DetailViewModel;
pub use list::MoviesViewModel;
pub use search::{SearchState, SearchViewModel, DEFAULT_DEBOUNCE, MIN_QUERY_LEN};

/// State of one piece of screen data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiState<T> {
    Idle,
    Loading,
    Success(T),
    Error(String),
}

impl<T> Default for UiState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> UiState<T> {
    pub const fn data(&self) -> Option<&T> {
        match self {
            Self::Success(data) => Some(data),
            Self::Idle | Self::Loading | Self::Error(_) => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Error(message) => Some(message),
            Self::Idle | Self::Loading | Self::Success(_) => None,
        }
    }
}

/// One-shot notification for the UI, delivered once to current subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    ShowError(String),
}

const EVENT_CHANNEL_CAPACITY: usize = 16;

/// Screen state, its event stream, and the task that feeds them.
///
/// Each background task gets a [`Publisher`] stamped with a generation.
/// `supersede` bumps the generation before aborting the running task, so a
/// task that is mid-write when aborted can no longer change the state.
struct ViewState<S> {
    state: Arc<watch::Sender<S>>,
    events: broadcast::Sender<UiEvent>,
    latest: Arc<AtomicU64>,
    task: TaskSlot,
}

impl<S> ViewState<S> {
    fn new(initial: S) -> Self {
        let (state, _) = watch::channel(initial);
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(state),
            events,
            latest: Arc::new(AtomicU64::new(0)),
            task: TaskSlot::default(),
        }
    }

    fn subscribe(&self) -> watch::Receiver<S> {
        self.state.subscribe()
    }

    fn events(&self) -> broadcast::Receiver<UiEvent> {
        self.events.subscribe()
    }

    fn borrow(&self) -> watch::Ref<'_, S> {
        self.state.borrow()
    }

    fn modify(&self, update: impl FnOnce(&mut S)) {
        self.state.send_modify(update);
    }

    /// Invalidate and abort the running task.
    fn supersede(&self) -> Publisher<S> {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        self.task.cancel();
        Publisher {
            state: Arc::clone(&self.state),
            events: self.events.clone(),
            latest: Arc::clone(&self.latest),
            generation,
        }
    }

    fn spawn(&self, task: impl Future<Output = ()> + Send + 'static) {
        self.task.replace(Some(tokio::spawn(task)));
    }
}

struct Publisher<S> {
    state: Arc<watch::Sender<S>>,
    events: broadcast::Sender<UiEvent>,
    latest: Arc<AtomicU64>,
    generation: u64,
}

impl<S> Publisher<S> {
    fn is_current(&self) -> bool {
        self.latest.load(Ordering::SeqCst) == self.generation
    }

    /// Apply `update` unless a newer task has taken over. Returns whether
    /// the state changed.
    fn publish(&self, update: impl FnOnce(&mut S)) -> bool {
        self.state.send_if_modified(|state| {
            if !self.is_current() {
                return false;
            }
            update(state);
            true
        })
    }

    fn notify(&self, event: UiEvent) {
        if self.is_current() {
            // Nobody listening is fine
            let _ = self.events.send(event);
        }
    }
}

/// At most one running task; replacing or dropping aborts the previous one.
#[derive(Default)]
struct TaskSlot {
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl TaskSlot {
    fn replace(&self, handle: Option<JoinHandle<()>>) {
        let mut slot = self.handle.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = std::mem::replace(&mut *slot, handle) {
            previous.abort();
        }
    }

    fn cancel(&self) {
        self.replace(None);
    }
}

impl Drop for TaskSlot {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::oneshot;
    use tokio::time::timeout;

    #[test]
    fn ui_state_accessors() {
        let idle: UiState<u8> = UiState::default();
        assert_eq!(idle, UiState::Idle);
        assert_eq!(UiState::<u8>::Loading.data(), None);
        assert_eq!(UiState::Success(3).data(), Some(&3));
        assert_eq!(UiState::<u8>::Error("boom".to_string()).error(), Some("boom"));
        assert_eq!(UiState::Success(3).error(), None);
    }

    /// A task that never finishes on its own; the receiver closes once the
    /// task is dropped, which only happens on abort.
    fn parked_task() -> (JoinHandle<()>, oneshot::Receiver<()>) {
        let (alive, dropped) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let _alive = alive;
            std::future::pending::<()>().await;
        });
        (handle, dropped)
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn task_slot_aborts_replaced_task() {
        let slot = TaskSlot::default();
        let (first, first_dropped) = parked_task();
        slot.replace(Some(first));
        slot.replace(Some(tokio::spawn(async {})));

        let closed = timeout(Duration::from_secs(2), first_dropped).await;
        assert!(matches!(closed, Ok(Err(_))), "replaced task was not aborted");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn superseded_publisher_is_silenced() {
        let view = ViewState::new(0_u8);
        let mut events = view.events();
        let stale = view.supersede();
        let current = view.supersede();

        assert!(!stale.publish(|value| *value = 1));
        stale.notify(UiEvent::ShowError("stale".to_string()));
        assert!(current.publish(|value| *value = 2));
        current.notify(UiEvent::ShowError("fresh".to_string()));

        assert_eq!(*view.borrow(), 2);
        assert_eq!(events.recv().await.unwrap(), UiEvent::ShowError("fresh".to_string()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn task_slot_aborts_on_drop() {
        let slot = TaskSlot::default();
        let (task, dropped) = parked_task();
        slot.replace(Some(task));
        drop(slot);

        let closed = timeout(Duration::from_secs(2), dropped).await;
        assert!(matches!(closed, Ok(Err(_))), "task outlived its slot");
    }
}
