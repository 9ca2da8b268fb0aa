pub mod elevenlabs;
pub mod retry;

use std::future::Future;

use crate::error::Error;

pub trait SpeechSynthesizer {
    /// Returns the encoded audio (mp3) for `text` read by `voice`
    fn synthesize(
        &self,
        text: &str,
        voice: &str,
    ) -> impl Future<Output = Result<Vec<u8>, Error>> + Send;
}

impl<T: SpeechSynthesizer + Send + Sync> SpeechSynthesizer for &T {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, Error> {
        (**self).synthesize(text, voice).await
    }
}
