use std::sync::{Arc, Mutex};

use podcast_pulse::{types::SourcePost, x::PostSearcher};

#[derive(Clone)]
pub struct MockSearcher {
    pub post: Option<SourcePost>,
    pub calls: Arc<Mutex<usize>>,
    pub fail_with: Option<String>,
}

impl MockSearcher {
    pub fn new(text: &str) -> Self {
        Self {
            post: Some(SourcePost {
                id: "1846000000000000001".to_string(),
                text: text.to_string(),
                created_at: None,
            }),
            calls: Arc::new(Mutex::new(0)),
            fail_with: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            post: None,
            calls: Arc::new(Mutex::new(0)),
            fail_with: None,
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            fail_with: Some(msg.to_string()),
            ..Self::empty()
        }
    }
}

impl PostSearcher for MockSearcher {
    type Error = anyhow::Error;

    async fn latest_post(&self) -> anyhow::Result<Option<SourcePost>> {
        *self.calls.lock().unwrap() += 1;
        if let Some(ref msg) = self.fail_with {
            return Err(anyhow::anyhow!("{}", msg));
        }
        Ok(self.post.clone())
    }
}
