//! Playback session store
//!
//! Owns the one [`PlaybackState`] of the process. Reads return snapshots,
//! writes go through [`PlaybackStore::dispatch`] and are announced to
//! subscribers after the state lock is released.

use crate::state::{PlaybackAction, PlaybackState};
use crate::types::PlaybackConfig;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};

/// Callback invoked with each applied action and the resulting state
pub type Listener = Arc<dyn Fn(&PlaybackAction, &PlaybackState) + Send + Sync>;

/// Single source of truth for the playback session
pub struct PlaybackStore {
    state: RwLock<PlaybackState>,
    listeners: Mutex<Vec<(u64, Listener)>>,
    next_listener_id: AtomicU64,
}

impl PlaybackStore {
    /// Create a store holding a fresh session
    pub fn new(config: &PlaybackConfig) -> Self {
        Self::with_state(PlaybackState::new(config))
    }

    /// Create a store holding `state`
    pub fn with_state(state: PlaybackState) -> Self {
        Self {
            state: RwLock::new(state),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
        }
    }

    /// Snapshot of the current state
    pub fn state(&self) -> PlaybackState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Apply `action` and notify subscribers
    ///
    /// Returns the state right after the action was applied.
    pub fn dispatch(&self, action: PlaybackAction) -> PlaybackState {
        let snapshot = {
            let mut state = self.write_state();
            state.apply(&action);
            state.clone()
        };

        self.notify(&action, &snapshot);
        snapshot
    }

    /// Apply `action` only if `predicate` holds for the current state
    ///
    /// The check and the write happen under the same lock, so no other
    /// dispatch can slip in between. Returns whether the action was applied.
    pub fn dispatch_if<P>(&self, predicate: P, action: PlaybackAction) -> bool
    where
        P: FnOnce(&PlaybackState) -> bool,
    {
        let snapshot = {
            let mut state = self.write_state();
            if !predicate(&state) {
                return false;
            }
            state.apply(&action);
            state.clone()
        };

        self.notify(&action, &snapshot);
        true
    }

    /// Register a listener
    ///
    /// The listener stays registered until the returned guard is dropped or
    /// [`Subscription::unsubscribe`] is called. Listeners run on the
    /// dispatching thread; order across concurrent dispatches is not defined.
    pub fn subscribe<F>(self: &Arc<Self>, listener: F) -> Subscription
    where
        F: Fn(&PlaybackAction, &PlaybackState) + Send + Sync + 'static,
    {
        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        self.lock_listeners().push((id, Arc::new(listener)));

        Subscription {
            store: Arc::downgrade(self),
            id,
            active: true,
        }
    }

    /// Number of registered listeners
    pub fn listener_count(&self) -> usize {
        self.lock_listeners().len()
    }

    fn remove_listener(&self, id: u64) {
        self.lock_listeners().retain(|(listener_id, _)| *listener_id != id);
    }

    fn notify(&self, action: &PlaybackAction, state: &PlaybackState) {
        // Clone out so listeners may subscribe or unsubscribe while running
        let listeners: Vec<Listener> = self
            .lock_listeners()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(action, state);
        }
    }

    fn write_state(&self) -> std::sync::RwLockWriteGuard<'_, PlaybackState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn lock_listeners(&self) -> MutexGuard<'_, Vec<(u64, Listener)>> {
        self.listeners.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for PlaybackStore {
    fn default() -> Self {
        Self::new(&PlaybackConfig::default())
    }
}

/// Keeps a listener registered while alive
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
    store: Weak<PlaybackStore>,
    id: u64,
    active: bool,
}

impl Subscription {
    /// Remove the listener now
    pub fn unsubscribe(mut self) {
        self.release();
    }

    /// Keep the listener for the rest of the session
    pub fn detach(mut self) {
        self.active = false;
    }

    fn release(&mut self) {
        if !self.active {
            return;
        }
        self.active = false;
        if let Some(store) = self.store.upgrade() {
            store.remove_listener(self.id);
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}
