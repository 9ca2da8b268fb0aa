use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::script::RunKey;

/// A single post returned by the search provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourcePost {
    pub id: String,
    pub text: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Raw `GET /2/tweets/search/recent` payload
#[derive(Debug, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub data: Vec<SourcePost>,
    pub meta: Option<SearchMeta>,
}

#[derive(Debug, Deserialize)]
pub struct SearchMeta {
    pub result_count: u32,
    pub newest_id: Option<String>,
}

impl SearchResponse {
    /// Results are newest first; only the most recent post is acted upon
    pub fn into_latest(self) -> Option<SourcePost> {
        self.data.into_iter().next()
    }
}

/// Monologue produced by the text generation stage
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedScript {
    pub text: String,
    /// Subject parsed for the run key; `None` when the key fell back
    pub subject: Option<String>,
}

impl GeneratedScript {
    pub fn new(text: impl Into<String>, run_key: &RunKey) -> Self {
        GeneratedScript {
            text: text.into(),
            subject: run_key.subject.clone(),
        }
    }
}
