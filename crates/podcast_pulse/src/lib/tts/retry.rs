use std::time::Duration;

use crate::{error::Error, SpeechSynthesizer};

/// Bounded, fixed-delay retry around a synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_attempts: 3,
            delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug)]
pub struct Synthesized {
    pub audio: Vec<u8>,
    /// Failed attempts before the successful one
    pub retries: u32,
}

#[derive(Debug, thiserror::Error)]
#[error("Speech synthesis failed after {attempts} attempt(s): {error}")]
pub struct SynthesisFailure {
    pub error: Error,
    pub attempts: u32,
}

impl SynthesisFailure {
    pub fn retries(&self) -> u32 {
        self.attempts.saturating_sub(1)
    }
}

#[tracing::instrument(skip(synthesizer, text), fields(input_len = text.len()))]
pub async fn synthesize_with_retry<T: SpeechSynthesizer>(
    synthesizer: &T,
    text: &str,
    voice: &str,
    policy: RetryPolicy,
) -> Result<Synthesized, SynthesisFailure> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match synthesizer.synthesize(text, voice).await {
            Ok(audio) => {
                return Ok(Synthesized {
                    audio,
                    retries: attempt - 1,
                })
            }
            Err(error) if attempt < max_attempts && error.is_retryable() => {
                tracing::warn!(
                    error = %error,
                    attempt,
                    max_attempts,
                    "Speech synthesis attempt failed, retrying"
                );
                tokio::time::sleep(policy.delay).await;
                attempt += 1;
            }
            Err(error) => {
                tracing::error!(error = %error, attempt, "Speech synthesis failed");
                return Err(SynthesisFailure {
                    error,
                    attempts: attempt,
                });
            }
        }
    }
}
