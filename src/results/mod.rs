//! Attempt records and the result store.
//!
//! The store is the single source of truth for displayed results: the
//! dispatcher pushes one pending attempt per service and settles it once;
//! renderers read snapshots or subscribe to change events.

mod attempt;
mod headers;
mod store;

pub use attempt::{
    attempt_key, Attempt, AttemptOutcome, AttemptState, FailureDetails, StatusClass,
    SuccessDetails,
};
pub use headers::ResponseHeaders;
pub use store::{group_by_service, ResultStore, SharedResultStore, StoreEvent};
