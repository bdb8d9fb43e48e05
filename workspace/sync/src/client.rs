use std::sync::{Mutex, MutexGuard, PoisonError};

use common::{AbsenceAction, AbsenceMap};
use tracing::{debug, info, instrument, warn};

use crate::error::TransportError;
use crate::state::{IgnoreReason, SyncState};
use crate::transport::AbsenceTransport;

/// What happened to a tap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationStatus {
    /// No request was sent.
    Ignored(IgnoreReason),
    /// The server applied the mutation.
    Confirmed,
    /// The server refused the mutation.
    Rejected(TransportError),
    /// The request never completed.
    NetworkFailure(TransportError),
}

/// Drives [`SyncState`] against a server.
///
/// The state lock is only held for the synchronous transitions, never across a request,
/// so other modules stay usable while one is waiting on the network.
pub struct SyncClient<T: AbsenceTransport> {
    transport: T,
    state: Mutex<SyncState>,
}

impl<T: AbsenceTransport> SyncClient<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            state: Mutex::new(SyncState::new()),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> SyncState {
        self.lock().clone()
    }

    pub fn displayed(&self, module_id: i32) -> u32 {
        self.lock().displayed(module_id)
    }

    pub fn displayed_counts(&self) -> AbsenceMap {
        self.lock().displayed_counts()
    }

    /// Fetches the full mapping and makes it the new base of every module.
    /// On failure the error flag is raised so the next drain retries.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<(), TransportError> {
        let result = self.transport.fetch_absences().await;

        let mut state = self.lock();
        match result {
            Ok(server) => {
                debug!("Loaded {} absence counters", server.len());
                state.apply_snapshot(&server);
                Ok(())
            }
            Err(e) => {
                warn!("Failed to fetch absences: {}", e);
                state.mark_error();
                Err(e)
            }
        }
    }

    pub async fn request_add(&self, module_id: i32) -> MutationStatus {
        self.request(module_id, AbsenceAction::Add).await
    }

    pub async fn request_remove(&self, module_id: i32) -> MutationStatus {
        self.request(module_id, AbsenceAction::Remove).await
    }

    #[instrument(skip(self))]
    async fn request(&self, module_id: i32, action: AbsenceAction) -> MutationStatus {
        let begun = self.lock().begin(module_id, action);
        if let Err(reason) = begun {
            debug!("Ignoring {} on module {}: {:?}", action, module_id, reason);
            return MutationStatus::Ignored(reason);
        }

        let result = self.transport.mutate(module_id, action).await;

        let (status, reconcile) = {
            let mut state = self.lock();
            match result {
                Ok(server) => {
                    let reconcile = state.confirm(module_id, action, &server);
                    (MutationStatus::Confirmed, reconcile)
                }
                Err(e) if e.is_network() => {
                    warn!("Network failure on module {}: {}", module_id, e);
                    let reconcile = state.network_failure(module_id, action);
                    (MutationStatus::NetworkFailure(e), reconcile)
                }
                Err(e) => {
                    warn!("Server rejected {} on module {}: {}", action, module_id, e);
                    let reconcile = state.reject(module_id, action);
                    (MutationStatus::Rejected(e), reconcile)
                }
            }
        };

        if reconcile {
            info!("Reconciling absences with the server");
            if let Err(e) = self.refresh().await {
                warn!("Reconciliation failed, will retry on next drain: {}", e);
            }
        }

        status
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
