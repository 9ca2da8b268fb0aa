//! # Status Store
//!
//! Durable, file-addressable records describing the outcome of a single
//! podcast pipeline run. Each run is keyed by a slug derived from the
//! episode subject and the run timestamp; the audio artifact for the run
//! lives next to its record under the same key.
//!
//! The [`StatusStore`] trait is the seam the pipeline runner and the
//! polling endpoint depend on. [`FsStatusStore`] persists records as JSON
//! files in a single directory.

mod domain;
mod store;

pub use domain::{ErrorKind, PublishOutcome, PublishStage, RunStage, RunState, StatusRecord};
pub use store::fs::FsStatusStore;
pub use store::{is_valid_key, StatusStore};
