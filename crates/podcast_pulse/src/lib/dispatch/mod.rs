//! # Fetch-Generate-Dispatch
//!
//! The request-time half of the pipeline. Finds the most recent matching
//! post, generates a monologue from it (once, synchronously, no retries)
//! and enqueues a [`PipelineJob`] for the background worker. The caller
//! gets the post, the script and the status key to poll straight away.

pub mod worker;

use chrono::{DateTime, Utc};

use crate::{
    error::DispatchError,
    script::{derive_key, RunKey},
    types::{GeneratedScript, SourcePost},
    x::PostSearcher,
    JobSender, ScriptWriter,
};

/// Run descriptor handed from the dispatcher to the background worker
#[derive(Debug, Clone)]
pub struct PipelineJob {
    pub script: String,
    pub started_at: DateTime<Utc>,
}

impl PipelineJob {
    pub fn new(script: impl Into<String>, started_at: DateTime<Utc>) -> Self {
        PipelineJob {
            script: script.into(),
            started_at,
        }
    }

    pub fn key(&self) -> RunKey {
        derive_key(&self.script, self.started_at)
    }
}

#[derive(Debug)]
pub enum DispatchOutcome {
    NotFound,
    Dispatched {
        post: SourcePost,
        script: GeneratedScript,
        status_key: String,
    },
}

pub struct Dispatcher<S, W>
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
{
    searcher: S,
    writer: W,
    jobs: JobSender,
}

impl<S, W> Dispatcher<S, W>
where
    S: PostSearcher + Send + Sync + 'static,
    W: ScriptWriter + Send + Sync + 'static,
{
    pub fn new(searcher: S, writer: W, jobs: JobSender) -> Self {
        Dispatcher {
            searcher,
            writer,
            jobs,
        }
    }

    /// Starts at most one background run per call
    #[tracing::instrument(skip(self), fields(model = W::WRITER_MODEL))]
    pub async fn dispatch(&self) -> Result<DispatchOutcome, DispatchError> {
        let post = match self.searcher.latest_post().await {
            Ok(Some(post)) => post,
            Ok(None) => {
                tracing::info!("No matching posts in the search window");
                return Ok(DispatchOutcome::NotFound);
            }
            Err(e) => {
                tracing::error!(error = %e, "Search failed");
                return Err(DispatchError::Search(e.to_string()));
            }
        };
        tracing::info!(post_id = %post.id, "Found post");

        let text = self
            .writer
            .write_script(&post)
            .await
            .map_err(|e| DispatchError::Generation(e.to_string()))
            .inspect_err(|e| tracing::error!(error = %e, "Script generation failed"))?;

        let job = PipelineJob::new(text, Utc::now());
        let run_key = job.key();
        let script = GeneratedScript::new(job.script.clone(), &run_key);
        let status_key = run_key.key;

        self.jobs.send(job).map_err(|_| {
            tracing::error!("Job channel is closed");
            DispatchError::QueueClosed
        })?;
        tracing::info!(%status_key, "Background run queued");

        Ok(DispatchOutcome::Dispatched {
            post,
            script,
            status_key,
        })
    }
}
