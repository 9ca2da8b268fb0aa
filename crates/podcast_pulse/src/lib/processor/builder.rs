use std::path::PathBuf;

use podcast_status::StatusStore;

use crate::{PipelineRunner, Publisher, RetryPolicy, SpeechSynthesizer};

pub struct PipelineRunnerBuilder<T = (), P = (), D = ()> {
    audio_dir: PathBuf,
    voice: String,
    retry_policy: RetryPolicy,
    synthesizer: T,
    publisher: Option<P>,
    store: D,
}

impl PipelineRunnerBuilder {
    pub fn new(audio_dir: impl Into<PathBuf>, voice: impl Into<String>) -> Self {
        Self {
            audio_dir: audio_dir.into(),
            voice: voice.into(),
            retry_policy: RetryPolicy::default(),
            synthesizer: (),
            publisher: None,
            store: (),
        }
    }
}

impl<T, P, D> PipelineRunnerBuilder<T, P, D> {
    pub fn synthesizer<T2: SpeechSynthesizer + Send + Sync + 'static>(
        self,
        synthesizer: T2,
    ) -> PipelineRunnerBuilder<T2, P, D> {
        PipelineRunnerBuilder {
            audio_dir: self.audio_dir,
            voice: self.voice,
            retry_policy: self.retry_policy,
            synthesizer,
            publisher: self.publisher,
            store: self.store,
        }
    }

    /// `None` disables publishing; runs complete once the audio is saved
    pub fn publisher<P2: Publisher + Send + Sync + 'static>(
        self,
        publisher: Option<P2>,
    ) -> PipelineRunnerBuilder<T, P2, D> {
        PipelineRunnerBuilder {
            audio_dir: self.audio_dir,
            voice: self.voice,
            retry_policy: self.retry_policy,
            synthesizer: self.synthesizer,
            publisher,
            store: self.store,
        }
    }

    pub fn store<D2: StatusStore + Send + Sync + 'static>(
        self,
        store: D2,
    ) -> PipelineRunnerBuilder<T, P, D2> {
        PipelineRunnerBuilder {
            audio_dir: self.audio_dir,
            voice: self.voice,
            retry_policy: self.retry_policy,
            synthesizer: self.synthesizer,
            publisher: self.publisher,
            store,
        }
    }

    pub fn retry_policy(mut self, retry_policy: RetryPolicy) -> Self {
        self.retry_policy = retry_policy;
        self
    }
}

impl<T, P, D> PipelineRunnerBuilder<T, P, D>
where
    T: SpeechSynthesizer + Send + Sync + 'static,
    P: Publisher + Send + Sync + 'static,
    D: StatusStore + Send + Sync + 'static,
{
    pub fn build(self) -> PipelineRunner<T, P, D> {
        PipelineRunner {
            audio_dir: self.audio_dir,
            voice: self.voice,
            retry_policy: self.retry_policy,
            synthesizer: self.synthesizer,
            publisher: self.publisher,
            store: self.store,
        }
    }
}
