pub mod builder;

use std::{
    any::Any,
    panic::AssertUnwindSafe,
    path::{Path, PathBuf},
};

use futures::FutureExt;
use podcast_status::{ErrorKind, PublishOutcome, RunStage, StatusRecord, StatusStore};

use crate::{
    script::RunKey, synthesize_with_retry, PipelineJob, Publisher, RetryPolicy, SpeechSynthesizer,
};

/// Background half of the pipeline: synthesis, audio persistence, publishing
/// and the status record describing how far a run got.
#[derive(Debug)]
pub struct PipelineRunner<T, P, D>
where
    T: SpeechSynthesizer + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    audio_dir: PathBuf,
    voice: String,
    retry_policy: RetryPolicy,
    synthesizer: T,
    publisher: Option<P>,
    store: D,
}

impl<T, P, D> PipelineRunner<T, P, D>
where
    T: SpeechSynthesizer + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    pub fn audio_path(&self, key: &str) -> PathBuf {
        self.audio_dir.join(format!("{key}.mp3"))
    }

    pub fn store(&self) -> &D {
        &self.store
    }

    /// Runs one job to a terminal status record.
    ///
    /// Never returns an error and never panics: every failure, including a
    /// panic inside a stage, ends up in the record that is written and
    /// returned.
    #[tracing::instrument(skip_all, fields(key = tracing::field::Empty))]
    pub async fn run(&self, job: PipelineJob) -> StatusRecord {
        let run_key = job.key();
        tracing::Span::current().record("key", run_key.key.as_str());

        let pending = StatusRecord::pending(
            &run_key.key,
            run_key.subject_or_unknown(),
            job.started_at,
        );
        if let Err(e) = self.store.write(&pending).await {
            tracing::warn!(error = ?e, "Failed to write pending status record");
        }

        let record = match AssertUnwindSafe(self.execute(&job.script, &run_key, pending.clone()))
            .catch_unwind()
            .await
        {
            Ok(record) => record,
            Err(panic) => {
                let message = panic_message(&*panic);
                tracing::error!(%message, "Pipeline run panicked");
                pending.fail(ErrorKind::Internal, message)
            }
        };

        if let Err(e) = self.store.write(&record).await {
            tracing::error!(error = ?e, "Failed to write terminal status record");
        }

        tracing::info!(
            status = ?record.status,
            stage = ?record.stage,
            retries = record.retries,
            "Pipeline run finished"
        );

        record
    }

    async fn execute(&self, script: &str, run_key: &RunKey, mut record: StatusRecord) -> StatusRecord {
        let synthesized =
            match synthesize_with_retry(&self.synthesizer, script, &self.voice, self.retry_policy)
                .await
            {
                Ok(synthesized) => synthesized,
                Err(failure) => {
                    record.retries = failure.retries();
                    return record.fail(failure.error.kind(), failure.error.to_string());
                }
            };
        record.retries = synthesized.retries;

        let audio_path = self.audio_path(&run_key.key);
        if let Err(e) = self.save_audio(&audio_path, &synthesized.audio).await {
            return record.fail(ErrorKind::Storage, format!("Failed to save audio: {e}"));
        }
        record.audio_file = Some(audio_path.display().to_string());

        let Some(publisher) = &self.publisher else {
            tracing::debug!("No show configured, skipping publishing");
            return record.complete();
        };

        record.stage = RunStage::Publishing;
        let outcome = publisher
            .publish(&audio_path, run_key.subject_or_unknown())
            .await;

        // the audio exists, so a publishing failure is a partial success
        if let PublishOutcome::Failed { error, .. } = &outcome {
            record.error_kind = Some(ErrorKind::PartialPublish);
            record.error = Some(error.clone());
        }
        record.publishing = Some(outcome);

        record.complete()
    }

    #[tracing::instrument(skip(self, audio), fields(bytes = audio.len()))]
    async fn save_audio(&self, path: &Path, audio: &[u8]) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.audio_dir).await?;
        tokio::fs::write(path, audio)
            .await
            .inspect_err(|e| tracing::error!(error = ?e, "Failed to write audio file"))
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "Pipeline run panicked".to_string())
}
