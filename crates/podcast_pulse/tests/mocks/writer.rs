use std::sync::{Arc, Mutex};

use podcast_pulse::{types::SourcePost, ScriptWriter};

#[derive(Clone)]
pub struct MockWriter {
    pub script: String,
    pub calls: Arc<Mutex<Vec<String>>>,
    pub fail_with: Option<String>,
}

impl MockWriter {
    pub fn new(script: &str) -> Self {
        Self {
            script: script.to_string(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            script: String::new(),
            calls: Arc::new(Mutex::new(Vec::new())),
            fail_with: Some(msg.to_string()),
        }
    }
}

impl ScriptWriter for MockWriter {
    const WRITER_MODEL: &'static str = "mock-gpt";
    type Error = anyhow::Error;

    async fn write_script(&self, post: &SourcePost) -> anyhow::Result<String> {
        self.calls.lock().unwrap().push(post.text.clone());
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.script.clone())
    }
}
