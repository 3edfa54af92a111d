//! Registry of live sessions, keyed by venue.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use lupus_core::error::DomainError;
use lupus_core::id::VenueId;
use tokio::sync::watch;
use tracing::debug;

use super::query_handlers::SessionView;
use crate::domain::session::Session;

#[derive(Debug)]
struct Entry {
    cancel: watch::Sender<bool>,
    view: SessionView,
}

/// Live sessions per venue. Cloning shares the same registry.
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    entries: Arc<Mutex<HashMap<VenueId, Entry>>>,
}

impl SessionStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a session for `venue`. The returned ticket removes the
    /// registration when dropped.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionAlreadyRunning` if the venue is taken.
    pub fn open(&self, venue: VenueId) -> Result<SessionTicket, DomainError> {
        let mut entries = self.lock()?;
        if entries.contains_key(&venue) {
            return Err(DomainError::SessionAlreadyRunning(venue));
        }
        let (cancel, cancelled) = watch::channel(false);
        entries.insert(
            venue,
            Entry {
                cancel,
                view: SessionView::pending(venue),
            },
        );
        debug!(%venue, "session registered");
        Ok(SessionTicket {
            venue,
            store: self.clone(),
            cancelled,
        })
    }

    /// Asks the session in `venue` to stop.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session runs in the venue.
    pub fn cancel(&self, venue: VenueId) -> Result<(), DomainError> {
        let entries = self.lock()?;
        let entry = entries
            .get(&venue)
            .ok_or(DomainError::SessionNotFound(venue))?;
        entry.cancel.send_replace(true);
        debug!(%venue, "session cancellation requested");
        Ok(())
    }

    /// Whether a session is registered for `venue`.
    #[must_use]
    pub fn is_active(&self, venue: VenueId) -> bool {
        self.lock().is_ok_and(|entries| entries.contains_key(&venue))
    }

    /// Latest published view of the session in `venue`.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::SessionNotFound` if no session runs in the venue.
    pub fn view(&self, venue: VenueId) -> Result<SessionView, DomainError> {
        self.lock()?
            .get(&venue)
            .map(|entry| entry.view.clone())
            .ok_or(DomainError::SessionNotFound(venue))
    }

    fn publish(&self, venue: VenueId, view: SessionView) {
        if let Ok(mut entries) = self.lock() {
            if let Some(entry) = entries.get_mut(&venue) {
                entry.view = view;
            }
        }
    }

    fn close(&self, venue: VenueId) {
        if let Ok(mut entries) = self.lock() {
            entries.remove(&venue);
            debug!(%venue, "session unregistered");
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<VenueId, Entry>>, DomainError> {
        self.entries
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("session store poisoned: {e}")))
    }
}

/// A venue's registration in the [`SessionStore`].
#[derive(Debug)]
pub struct SessionTicket {
    venue: VenueId,
    store: SessionStore,
    cancelled: watch::Receiver<bool>,
}

impl SessionTicket {
    /// The registered venue.
    #[must_use]
    pub fn venue(&self) -> VenueId {
        self.venue
    }

    /// Resolves once cancellation is requested.
    pub async fn cancelled(&self) {
        let mut cancelled = self.cancelled.clone();
        if cancelled.wait_for(|requested| *requested).await.is_err() {
            std::future::pending::<()>().await;
        }
    }

    /// Publishes the current state of `session` to the store.
    pub fn publish(&self, session: &Session) {
        self.store.publish(self.venue, SessionView::from(session));
    }
}

impl Drop for SessionTicket {
    fn drop(&mut self) {
        self.store.close(self.venue);
    }
}
