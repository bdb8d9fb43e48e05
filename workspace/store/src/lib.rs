//! Persistence layer of the attendance tracker.
//!
//! [`AbsenceStore`] owns the absence counters and their log. Reference data and
//! user registration are plain functions over a connection.

pub mod absences;
pub mod error;
pub mod reference;
pub mod users;

#[cfg(test)]
pub(crate) mod testing;

pub use absences::{AbsenceStore, MutationOutcome};
pub use error::{StoreError, StoreResult};
