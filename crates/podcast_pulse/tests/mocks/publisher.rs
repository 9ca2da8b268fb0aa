use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use podcast_pulse::Publisher;
use podcast_status::{PublishOutcome, PublishStage};

#[derive(Clone)]
pub struct MockPublisher {
    pub outcome: PublishOutcome,
    pub calls: Arc<Mutex<Vec<(PathBuf, String)>>>,
}

impl MockPublisher {
    pub fn published() -> Self {
        Self {
            outcome: PublishOutcome::Published {
                media_id: "media-42".to_string(),
                episode_id: "episode-7".to_string(),
            },
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Upload succeeds, episode creation fails
    pub fn failing_episode(msg: &str) -> Self {
        Self {
            outcome: PublishOutcome::Failed {
                stage: PublishStage::CreateEpisode,
                error: msg.to_string(),
                media_id: Some("media-42".to_string()),
            },
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Publisher for MockPublisher {
    async fn publish(&self, audio_path: &Path, subject: &str) -> PublishOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((audio_path.to_path_buf(), subject.to_string()));
        self.outcome.clone()
    }
}
