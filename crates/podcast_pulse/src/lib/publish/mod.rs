pub mod host;

use std::{future::Future, path::Path};

use podcast_status::PublishOutcome;

/// Hosting platform upload. Failures are reported in the outcome, never raised,
/// so callers can record partial success.
pub trait Publisher {
    fn publish(
        &self,
        audio_path: &Path,
        subject: &str,
    ) -> impl Future<Output = PublishOutcome> + Send;
}
