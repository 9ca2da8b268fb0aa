use std::sync::Arc;

use podcast_status::StatusStore;
use tokio::{sync::mpsc, task::JoinHandle};
use tokio_util::{sync::CancellationToken, task::TaskTracker};

use crate::{PipelineJob, PipelineRunner, Publisher, SpeechSynthesizer};

pub type JobSender = mpsc::UnboundedSender<PipelineJob>;
pub type JobReceiver = mpsc::UnboundedReceiver<PipelineJob>;

pub fn job_channel() -> (JobSender, JobReceiver) {
    mpsc::unbounded_channel()
}

/// Consumes jobs until the channel closes or `shutdown` fires, running each
/// job on its own task. Runs already started are not cancelled: the returned
/// handle resolves only once every in-flight run has written its terminal
/// record.
pub fn spawn_worker<T, P, D>(
    runner: Arc<PipelineRunner<T, P, D>>,
    mut jobs: JobReceiver,
    shutdown: CancellationToken,
) -> JoinHandle<()>
where
    T: SpeechSynthesizer + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    tokio::spawn(async move {
        let runs = TaskTracker::new();
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::info!("Worker shutting down");
                    break;
                }
                job = jobs.recv() => {
                    let Some(job) = job else {
                        tracing::info!("Job channel closed, worker exiting");
                        break;
                    };
                    let runner = Arc::clone(&runner);
                    runs.spawn(async move {
                        runner.run(job).await;
                    });
                }
            }
        }

        runs.close();
        if !runs.is_empty() {
            tracing::info!(in_flight = runs.len(), "Waiting for in-flight runs to finish");
        }
        runs.wait().await;
    })
}
