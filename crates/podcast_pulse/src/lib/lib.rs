mod dispatch;
mod error;
mod llm;
mod processor;
mod publish;
pub mod script;
pub mod server;
pub mod tracing;
mod tts;
pub mod types;
pub mod x;

pub use dispatch::{
    worker::{job_channel, spawn_worker, JobReceiver, JobSender},
    DispatchOutcome, Dispatcher, PipelineJob,
};
pub use error::{DispatchError, Error};
pub use llm::{openai, writer::ScriptWriter};
pub use processor::{builder::PipelineRunnerBuilder, PipelineRunner};
pub use publish::{host, Publisher};
pub use tts::{
    elevenlabs,
    retry::{synthesize_with_retry, RetryPolicy, SynthesisFailure, Synthesized},
    SpeechSynthesizer,
};
