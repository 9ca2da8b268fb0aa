use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle stage a run had reached when its record was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStage {
    Synthesis,
    Publishing,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    Pending,
    Completed,
    Failed,
}

impl RunState {
    /// No further writes are accepted for a key once its record is terminal
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Completed | RunState::Failed)
    }
}

/// Closed set of failure categories attached to a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Transport,
    Configuration,
    Parse,
    PartialPublish,
    Storage,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishStage {
    Authenticate,
    Upload,
    CreateEpisode,
}

/// Result of the authenticate -> upload -> create-episode sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published {
        media_id: String,
        episode_id: String,
    },
    Failed {
        stage: PublishStage,
        error: String,
        /// Set when the upload went through but episode creation did not
        #[serde(default, skip_serializing_if = "Option::is_none")]
        media_id: Option<String>,
    },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusRecord {
    pub key: String,
    pub subject: String,
    pub timestamp: DateTime<Utc>,
    pub stage: RunStage,
    pub status: RunState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_file: Option<String>,
    pub retries: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub publishing: Option<PublishOutcome>,
}

impl StatusRecord {
    /// Record written when synthesis begins
    pub fn pending(
        key: impl Into<String>,
        subject: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        StatusRecord {
            key: key.into(),
            subject: subject.into(),
            timestamp,
            stage: RunStage::Synthesis,
            status: RunState::Pending,
            audio_file: None,
            retries: 0,
            error: None,
            error_kind: None,
            publishing: None,
        }
    }

    pub fn fail(mut self, kind: ErrorKind, error: impl Into<String>) -> Self {
        self.status = RunState::Failed;
        self.error_kind = Some(kind);
        self.error = Some(error.into());
        self
    }

    pub fn complete(mut self) -> Self {
        self.stage = RunStage::Finished;
        self.status = RunState::Completed;
        self
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }
}
