use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use podcast_pulse::{Error, SpeechSynthesizer};

pub const MOCK_AUDIO: &[u8] = b"ID3\x04\x00mock-audio";

#[derive(Clone, Copy)]
enum Behaviour {
    /// Fails this many times, then succeeds
    Flaky(usize),
    AlwaysFails,
    MissingKey,
    Panics,
    /// Succeeds after holding the call open
    Slow(Duration),
}

#[derive(Clone)]
pub struct MockSynthesizer {
    behaviour: Behaviour,
    pub calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockSynthesizer {
    fn with(behaviour: Behaviour) -> Self {
        Self {
            behaviour,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn new() -> Self {
        Self::with(Behaviour::Flaky(0))
    }

    pub fn flaky(failures: usize) -> Self {
        Self::with(Behaviour::Flaky(failures))
    }

    pub fn failing() -> Self {
        Self::with(Behaviour::AlwaysFails)
    }

    pub fn misconfigured() -> Self {
        Self::with(Behaviour::MissingKey)
    }

    pub fn panicking() -> Self {
        Self::with(Behaviour::Panics)
    }

    pub fn slow(delay: Duration) -> Self {
        Self::with(Behaviour::Slow(delay))
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>, Error> {
        let attempt = {
            let mut calls = self.calls.lock().unwrap();
            calls.push((text.to_string(), voice.to_string()));
            calls.len()
        };

        match self.behaviour {
            Behaviour::Flaky(failures) if attempt <= failures => Err(Error::Api {
                status: 503,
                message: format!("voice service unavailable (attempt {attempt})"),
            }),
            Behaviour::Flaky(_) => Ok(MOCK_AUDIO.to_vec()),
            Behaviour::AlwaysFails => Err(Error::Api {
                status: 503,
                message: "voice service unavailable".to_string(),
            }),
            Behaviour::MissingKey => Err(Error::MissingConfig("ELEVENLABS_API_KEY")),
            Behaviour::Panics => panic!("synthesizer exploded"),
            Behaviour::Slow(delay) => {
                tokio::time::sleep(delay).await;
                Ok(MOCK_AUDIO.to_vec())
            }
        }
    }
}
