//! Client-side synchronization of absence counters.
//!
//! [`SyncState`] is the pure state machine: optimistic deltas, one request in flight per
//! module and reconciliation with the server mapping. [`SyncClient`] drives it over an
//! [`AbsenceTransport`], normally the reqwest based [`HttpTransport`].

pub mod client;
pub mod error;
pub mod state;
pub mod transport;

pub use client::{MutationStatus, SyncClient};
pub use error::{SyncError, TransportError};
pub use state::{IgnoreReason, ModuleState, SyncState};
pub use transport::{AbsenceTransport, HttpTransport};
